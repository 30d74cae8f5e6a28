use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. When unset, the service runs on
    /// the in-memory store (useful for local development and tests).
    #[serde(default)]
    pub database_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum accepted password length
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,

    /// Session idle lifetime in seconds (extended on each authenticated request)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// TMDB API key; catalogue import is disabled when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_password_min_length() -> usize {
    8
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.password_min_length, 8);
        assert_eq!(config.session_ttl_secs, 1800);
        assert!(config.database_url.is_none());
        assert!(config.tmdb_api_key.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("PASSWORD_MIN_LENGTH".to_string(), "12".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.password_min_length, 12);
    }
}
