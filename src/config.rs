use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_addr: String,

    pub api_prefix: String,
    pub cors_allow_origin: String,

    // Rate limiting, 0 turns the limiter off
    pub rate_per_min: u32,

    pub log_dir: String,
    pub seed_fees_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://school.db?mode=rwc".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_default(),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string()),

            rate_per_min: parse_var("RATE_PER_MIN", 0)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            seed_fees_on_startup: parse_var("SEED_FEES_ON_STARTUP", false)?,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let value: u32 = parse_var("SCHOOL_FEES_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_var_rejects_garbage() {
        // SAFETY: the variable name is unique to this test
        unsafe { env::set_var("SCHOOL_FEES_TEST_BAD_NUMBER", "many") };
        let result: Result<u32> = parse_var("SCHOOL_FEES_TEST_BAD_NUMBER", 1);
        assert!(result.is_err());
    }
}
