use std::time::Duration;

use envconfig::Envconfig;
use serde::Deserialize;

use crate::retry::Linear;

/// Retry settings, loadable from the environment through [`Envconfig`]
/// or deserialized from any `serde` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Envconfig, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of retries after the first failed attempt.
    #[envconfig(from = "DISPATCH_RETRY_MAX_RETRIES", default = "3")]
    pub max_retries: u32,

    /// Milliseconds to wait before each retry.
    #[envconfig(from = "DISPATCH_RETRY_INTERVAL_MS", default = "0")]
    pub interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval_ms: 0,
        }
    }
}

impl Config {
    /// Returns the [Linear] strategy described by these settings.
    #[must_use]
    pub fn strategy(&self) -> Linear {
        Linear::new(self.max_retries, Duration::from_millis(self.interval_ms))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn it_loads_from_environment_variables() {
        let env = HashMap::from([
            ("DISPATCH_RETRY_MAX_RETRIES".to_owned(), "5".to_owned()),
            ("DISPATCH_RETRY_INTERVAL_MS".to_owned(), "250".to_owned()),
        ]);

        let config = Config::init_from_hashmap(&env).expect("config should be loaded");

        assert_eq!(
            Config {
                max_retries: 5,
                interval_ms: 250,
            },
            config
        );
        assert_eq!(
            Linear::new(5, Duration::from_millis(250)),
            config.strategy()
        );
    }

    #[test]
    fn missing_environment_variables_fall_back_to_defaults() {
        let config = Config::init_from_hashmap(&HashMap::default()).expect("config should be loaded");

        assert_eq!(Config::default(), config);
    }

    #[test]
    fn it_deserializes_partial_settings() {
        let config: Config =
            serde_json::from_str(r#"{ "max_retries": 1 }"#).expect("config should deserialize");

        assert_eq!(1, config.max_retries);
        assert_eq!(0, config.interval_ms);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let env = HashMap::from([("DISPATCH_RETRY_MAX_RETRIES".to_owned(), "many".to_owned())]);

        assert!(Config::init_from_hashmap(&env).is_err());
    }
}
