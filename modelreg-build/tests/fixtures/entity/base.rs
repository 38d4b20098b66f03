#[derive(Debug, Clone, Default)]
pub struct Model {
    pub id: u64,
    pub created_at: i64,
    pub updated_at: i64,
}
