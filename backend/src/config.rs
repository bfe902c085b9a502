use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration, read once at startup.
///
/// `DATABASE_URL` and `DATA_DIR` are the two required connection
/// parameters (relational store and asset store); starting without them
/// is a configuration error, not something to limp along through.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URL for the relational store, e.g. `sqlite:quotations.db`
    pub database_url: String,
    /// Directory uploaded assets (company logos) are stored under
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Base URL uploaded assets are served from
    pub public_base_url: String,
    /// Origin allowed to call the API from a browser
    pub allowed_origin: String,
}

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("Missing required environment variable DATABASE_URL")?;
        let data_dir: PathBuf = env::var("DATA_DIR")
            .context("Missing required environment variable DATA_DIR")?
            .into();

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", bind_addr))
            .trim_end_matches('/')
            .to_string();

        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Config {
            database_url,
            data_dir,
            bind_addr,
            public_base_url,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            "DATABASE_URL",
            "DATA_DIR",
            "BIND_ADDR",
            "PUBLIC_BASE_URL",
            "ALLOWED_ORIGIN",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DATA_DIR", "/tmp/quotation-data");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn missing_data_dir_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DATABASE_URL", "sqlite::memory:");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DATA_DIR"));
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DATABASE_URL", "sqlite::memory:");
        env::set_var("DATA_DIR", "/tmp/quotation-data");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.public_base_url, format!("http://{}", DEFAULT_BIND_ADDR));
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
    }

    #[test]
    fn public_base_url_is_normalized() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DATABASE_URL", "sqlite::memory:");
        env::set_var("DATA_DIR", "/tmp/quotation-data");
        env::set_var("PUBLIC_BASE_URL", "https://quotes.example.com/");

        let config = Config::from_env().unwrap();
        assert_eq!(config.public_base_url, "https://quotes.example.com");
    }
}
