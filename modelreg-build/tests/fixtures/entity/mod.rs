mod base;
mod book;
mod status;
mod user;

pub mod models;

pub use book::Book;
pub use status::{Publishable, Status};
pub use user::User;
