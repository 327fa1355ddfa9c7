/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Postgres connection string. Reports stay in memory when unset.
    pub database_url: Option<String>,
    /// JSON file holding the initial master record and audit configuration.
    pub seed_path: String,
    /// Webhook endpoints every alert is forwarded to.
    pub alert_webhook_urls: Vec<String>,
    /// Upper bound on a single platform fetch attempt.
    pub fetch_timeout_secs: u64,
    pub fetch_max_attempts: u32,
    /// Serve platform snapshots from this JSON file instead of fetching them.
    pub fixture_path: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `3000`                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                    |
    /// | `DATABASE_URL`         | unset                    |
    /// | `SEED_PATH`            | `config/seed.json`       |
    /// | `ALERT_WEBHOOK_URLS`   | empty                    |
    /// | `FETCH_TIMEOUT_SECS`   | `15`                     |
    /// | `FETCH_MAX_ATTEMPTS`   | `3`                      |
    /// | `FIXTURE_PATH`         | unset                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let seed_path = std::env::var("SEED_PATH").unwrap_or_else(|_| "config/seed.json".into());

        let alert_webhook_urls =
            split_list(&std::env::var("ALERT_WEBHOOK_URLS").unwrap_or_default());

        let fetch_timeout_secs: u64 = std::env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("FETCH_TIMEOUT_SECS must be a valid u64");

        let fetch_max_attempts: u32 = std::env::var("FETCH_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("FETCH_MAX_ATTEMPTS must be a valid u32");

        let fixture_path = std::env::var("FIXTURE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            seed_path,
            alert_webhook_urls,
            fetch_timeout_secs,
            fetch_max_attempts,
            fixture_path,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
