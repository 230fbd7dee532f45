use crate::utils::AppError;
use std::{env, fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDB),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}' (expected mongodb or memory)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database_name: String,
    pub store_backend: StoreBackend,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mongo_uri = lookup("MONGO_URI").unwrap_or_else(|| {
            log::info!("MONGO_URI not set, using local MongoDB");
            "mongodb://localhost:27017/".to_string()
        });

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Config(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 5007)?,
            mongo_uri,
            database_name: lookup("MONGO_DATABASE").unwrap_or_else(|| "form_app".to_string()),
            store_backend: parse_or(&lookup, "STORE_BACKEND", StoreBackend::MongoDB)?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            bcrypt_cost,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_local_mongodb_on_fixed_port() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017/");
        assert_eq!(config.database_name, "form_app");
        assert_eq!(config.port, 5007);
        assert_eq!(config.store_backend, StoreBackend::MongoDB);
        assert!(!config.cookie_secure);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn remote_uri_and_overrides() {
        let config = config_from(&[
            ("MONGO_URI", "mongodb+srv://cluster.example.net/"),
            ("PORT", "8080"),
            ("STORE_BACKEND", "memory"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(config.mongo_uri, "mongodb+srv://cluster.example.net/");
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.cookie_secure);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(config_from(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("STORE_BACKEND", "redis")]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("BCRYPT_COST", "2")]), Err(AppError::Config(_))));
    }
}
