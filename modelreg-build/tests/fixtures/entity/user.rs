use super::base::Model;

#[derive(Debug, Clone, Default)]
pub struct User {
    pub model: Model,
    pub user_name: String,
    pub password: String,
}

impl User {
    pub fn new(user_name: impl Into<String>) -> Self {
        struct Draft {
            name: String,
        }

        let draft = Draft { name: user_name.into() };
        Self {
            user_name: draft.name,
            ..Default::default()
        }
    }
}
