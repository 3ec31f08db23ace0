/// Database row types: these map directly to SQLite rows.
/// Kept free of contract types so the schema can evolve independently.

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub owner: String,
    pub text: String,
    pub updated_at: String,
}
