//! Environment configuration.

use std::path::PathBuf;

use cognita_session::SessionSettings;
use cognita_session::domain::settings::DEFAULT_ARITHMETIC_ROUNDS;

use crate::error::AppError;

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path to the YAML or JSON flow document.
    pub flow_file: PathBuf,
    /// Locale the translation rows are filtered to.
    pub locale: String,
    /// Seed for the session RNG.
    pub seed: u64,
    /// Settings every session in the replay runs with.
    pub settings: SessionSettings,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `COGNITA_FLOW_FILE` is unset or any
    /// value fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let flow_file = lookup("COGNITA_FLOW_FILE")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::Config("COGNITA_FLOW_FILE environment variable must be set".into())
            })?;
        let locale = lookup("COGNITA_LOCALE").unwrap_or_else(|| "en".to_string());
        let seed: u64 = lookup("COGNITA_SEED")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("COGNITA_SEED must be a valid u64: {e}")))?;
        let rounds: u32 = match lookup("COGNITA_ARITHMETIC_ROUNDS") {
            Some(value) => value.parse().map_err(|e| {
                AppError::Config(format!("COGNITA_ARITHMETIC_ROUNDS must be a valid u32: {e}"))
            })?,
            None => DEFAULT_ARITHMETIC_ROUNDS,
        };
        let time_limit_ms = lookup("COGNITA_TIME_LIMIT_MS")
            .map(|value| {
                value.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("COGNITA_TIME_LIMIT_MS must be a valid u64: {e}"))
                })
            })
            .transpose()?;
        let settings = SessionSettings::new(rounds, time_limit_ms)
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            flow_file: PathBuf::from(flow_file),
            locale,
            seed,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_applies_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("COGNITA_FLOW_FILE", "flow.yaml")])).unwrap();

        assert_eq!(config.flow_file, PathBuf::from("flow.yaml"));
        assert_eq!(config.locale, "en");
        assert_eq!(config.seed, 0);
        assert_eq!(config.settings, SessionSettings::default());
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("COGNITA_FLOW_FILE", "flow.json"),
            ("COGNITA_LOCALE", "es"),
            ("COGNITA_SEED", "42"),
            ("COGNITA_ARITHMETIC_ROUNDS", "3"),
            ("COGNITA_TIME_LIMIT_MS", "60000"),
        ]))
        .unwrap();

        assert_eq!(config.locale, "es");
        assert_eq!(config.seed, 42);
        assert_eq!(config.settings.arithmetic_rounds(), 3);
        assert_eq!(config.settings.time_limit_ms(), Some(60_000));
    }

    #[test]
    fn test_from_lookup_requires_flow_file() {
        let result = AppConfig::from_lookup(lookup(&[]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_from_lookup_rejects_unparseable_seed() {
        let result = AppConfig::from_lookup(lookup(&[
            ("COGNITA_FLOW_FILE", "flow.yaml"),
            ("COGNITA_SEED", "-1"),
        ]));

        match result {
            Err(AppError::Config(message)) => assert!(message.contains("COGNITA_SEED")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_rejects_zero_rounds() {
        let result = AppConfig::from_lookup(lookup(&[
            ("COGNITA_FLOW_FILE", "flow.yaml"),
            ("COGNITA_ARITHMETIC_ROUNDS", "0"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
