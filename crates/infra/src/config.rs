//! Storage configuration, read from the environment.

use std::str::FromStr;

use thiserror::Error;

/// Environment variable selecting the backend (`memory` or `relational`).
pub const BACKEND_VAR: &str = "STOCKROOM_BACKEND";
/// Environment variable controlling whether the default wares are seeded.
pub const SEED_DEFAULTS_VAR: &str = "STOCKROOM_SEED_DEFAULTS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Where wares live. Chosen once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    /// Live wares on the command bus; the store is authoritative.
    #[default]
    Memory,
    /// One wide table keyed by id; the bus and store are bypassed.
    Relational,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(Backend::Memory),
            "relational" | "sql" => Ok(Backend::Relational),
            _ => Err(ConfigError::Invalid {
                var: BACKEND_VAR,
                value: s.to_string(),
                expected: "memory | relational",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: Backend,
    pub seed_defaults: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            seed_defaults: true,
        }
    }
}

impl StorageConfig {
    /// Read configuration from process environment variables.
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup(BACKEND_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };
        let seed_defaults = match lookup(SEED_DEFAULTS_VAR) {
            Some(raw) => parse_flag(SEED_DEFAULTS_VAR, &raw)?,
            None => defaults.seed_defaults,
        };

        Ok(Self {
            backend,
            seed_defaults,
        })
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            expected: "true | false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_to_seeded_memory_backend() {
        let config = StorageConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorageConfig::default());
        assert_eq!(config.backend, Backend::Memory);
        assert!(config.seed_defaults);
    }

    #[test]
    fn reads_backend_and_seed_flag() {
        let config = StorageConfig::from_lookup(lookup(&[
            (BACKEND_VAR, " Relational "),
            (SEED_DEFAULTS_VAR, "no"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Relational);
        assert!(!config.seed_defaults);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = StorageConfig::from_lookup(lookup(&[(BACKEND_VAR, "redis")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: BACKEND_VAR, .. }));

        let err = StorageConfig::from_lookup(lookup(&[(SEED_DEFAULTS_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: SEED_DEFAULTS_VAR, .. }));
    }
}
