use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings
    pub database_url: String,

    // Downstream mirror settings. No URL means mirroring is disabled.
    pub redis_url: Option<String>,
    pub commentary_topic: String,
    pub commentary_stream_key: String,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://stumpcast.db?mode=rwc".to_string()),

            redis_url: env::var("REDIS_URL").ok(),
            commentary_topic: env::var("COMMENTARY_TOPIC")
                .unwrap_or_else(|_| "cricket-commentary".to_string()),
            commentary_stream_key: env::var("COMMENTARY_STREAM_KEY")
                .unwrap_or_else(|_| "commentary-key".to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}
