/// Publication status stored as a plain integer.
pub type Status = i32;

pub trait Publishable {
    fn status(&self) -> Status;
}
