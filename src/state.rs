use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Externally configured moderator identity, if any.
    pub admin_user_id: Option<String>,
}
