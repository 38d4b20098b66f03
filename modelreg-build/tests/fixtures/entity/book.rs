use super::base::Model;

#[derive(Debug, Clone, Default)]
pub struct Book {
    pub model: Model,
    pub name: String,
    pub author: String,
}
