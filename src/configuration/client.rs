use std::collections::HashMap;

use crate::configuration::config::Config;
use crate::error_handling::types::ConfigError;

/// Point lookups against the platform's configuration service.
///
/// Models the `GET_CONFIG_ITEM <key>` request/response exchange: the call
/// is synchronous and blocks the ingestion loop until answered. A stalled
/// configuration service stalls ingestion, which is the intended
/// backpressure point.
pub trait ConfigClient: Send + Sync {
    fn get_item(&self, key: &str) -> Result<String, ConfigError>;

    /// Convenience accessor for boolean items. Anything other than
    /// "true"/"false" points at a misconfigured platform and is an error,
    /// not a silent `false`.
    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.get_item(key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::InvalidItem(format!("{} = '{}'", key, value))),
        }
    }
}

pub const IGNORE_FAILED_BAIT_SESSION: &str = "ignore_failed_bait_session";

/// In-process `ConfigClient` answering from the loaded configuration file.
pub struct StaticConfigClient {
    items: HashMap<String, String>,
}

impl StaticConfigClient {
    pub fn new(items: HashMap<String, String>) -> Self {
        Self { items }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut items = HashMap::new();
        items.insert(
            IGNORE_FAILED_BAIT_SESSION.to_owned(),
            config.ignore_failed_bait_session.to_string(),
        );
        Self { items }
    }
}

impl ConfigClient for StaticConfigClient {
    fn get_item(&self, key: &str) -> Result<String, ConfigError> {
        self.items
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::MissingItem(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_known_items() {
        let config = Config {
            ignore_failed_bait_session: true,
            ..Config::default()
        };
        let client = StaticConfigClient::from_config(&config);
        assert!(client.get_bool(IGNORE_FAILED_BAIT_SESSION).unwrap());
    }

    #[test]
    fn unknown_items_are_an_error() {
        let client = StaticConfigClient::new(HashMap::new());
        assert!(matches!(
            client.get_item("no_such_item"),
            Err(ConfigError::MissingItem(_))
        ));
    }

    #[test]
    fn malformed_boolean_items_are_an_error() {
        let mut items = HashMap::new();
        items.insert("flag_a".to_owned(), "yes".to_owned());
        items.insert("flag_b".to_owned(), " FALSE ".to_owned());
        let client = StaticConfigClient::new(items);
        assert!(matches!(
            client.get_bool("flag_a"),
            Err(ConfigError::InvalidItem(_))
        ));
        assert!(!client.get_bool("flag_b").unwrap());
    }
}
