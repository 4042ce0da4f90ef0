use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub enum StorageConfig {
    /// Files written under `base_path` and served at `public_url`.
    Local { base_path: PathBuf, public_url: String },
    /// Remote blob store reached over HTTP.
    Blob { api_url: String, token: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_secs: u64,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
    pub enable_database_console: bool,
    pub admin_email: String,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let storage = match optional("STORAGE_BACKEND").as_deref() {
            None | Some("local") => StorageConfig::Local {
                base_path: optional("STORAGE_LOCAL_PATH")
                    .unwrap_or_else(|| "./files".to_string())
                    .into(),
                public_url: optional("STORAGE_PUBLIC_URL").unwrap_or_else(|| "/files".to_string()),
            },
            Some("blob") => StorageConfig::Blob {
                api_url: required("BLOB_API_URL")?,
                token: required("BLOB_TOKEN")?,
            },
            Some(other) => {
                return Err(AppError::Config(format!(
                    "STORAGE_BACKEND must be 'local' or 'blob', got '{other}'"
                )));
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_connect_timeout_secs: parse_or("DB_CONNECT_TIMEOUT_SECS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24)?,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", 3000)?,
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 15)?,
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            storage,
            enable_database_console: parse_or("ENABLE_DATABASE_CONSOLE", false)?,
            admin_email: optional("ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@tunisia-directory.tn".to_string()),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> AppResult<String> {
    optional(key).ok_or_else(|| AppError::Config(format!("{key} must be set")))
}

fn parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, optional(key), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_defaults_when_unset() {
        assert_eq!(parse_value::<u16>("SERVER_PORT", None, 3000).unwrap(), 3000);
    }

    #[test]
    fn test_parse_value_reads_and_trims() {
        assert_eq!(parse_value::<u64>("X", Some(" 30 ".into()), 15).unwrap(), 30);
        assert!(parse_value::<bool>("X", Some("true".into()), false).unwrap());
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<u16>("SERVER_PORT", Some("eighty".into()), 3000).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("SERVER_PORT")));
    }
}
