use std::env;

/// Runtime configuration, read once at startup.
///
/// The administrator identity is externally configured rather than baked into
/// code; when unset, no caller has moderation rights.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub admin_user_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sectionswap.db".to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let admin_user_id = env::var("SWAP_ADMIN_USER_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            database_url,
            bind_addr,
            admin_user_id,
        }
    }
}
