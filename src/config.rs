use std::time::Duration;

/// Runtime settings shared by the core and the HTTP layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_username: String,
    pub admin_password: String,
    pub session_ttl: Duration,
    /// Card numbers outside this prefix are refused before reaching the ledger
    pub card_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            session_ttl: Duration::from_secs(30 * 60),
            card_prefix: "4".to_string(),
        }
    }
}
