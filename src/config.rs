/// Process configuration, read once at startup and passed down explicitly.
/// The scoring pipeline never touches the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            log_level: std::env::var("RISK_RADAR_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
