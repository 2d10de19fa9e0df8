//! Store Configuration
//!
//! Which store endpoint to talk to and which data set (`live` or `test`) to
//! tag requests with. Production is detected from the hostname the client is
//! served from; without a hostname the build flavour decides.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://xuz0-tsfm-drds.n7.xano.io/api:VHWtgrOF";
pub const DEFAULT_COLLECTION: &str = "shopping_item";
pub const PRODUCTION_DOMAIN: &str = "your-custom-domain.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Test,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Test => "test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Some(DataSource::Live),
            "test" => Some(DataSource::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Production when served from GitHub Pages or the custom domain
    pub fn from_hostname(hostname: &str) -> Self {
        if hostname.contains("github.io") || hostname == PRODUCTION_DOMAIN {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// Build-time fallback: `CHECKLIST_ENV` at compile time, else the build profile
    pub fn from_build() -> Self {
        match option_env!("CHECKLIST_ENV") {
            Some("production") => Environment::Production,
            Some(_) => Environment::Development,
            None if cfg!(debug_assertions) => Environment::Development,
            None => Environment::Production,
        }
    }

    pub fn data_source(&self) -> DataSource {
        match self {
            Environment::Development => DataSource::Test,
            Environment::Production => DataSource::Live,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub base_url: String,
    pub collection: String,
    pub data_source: DataSource,
    pub environment: Environment,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::from_build())
    }
}

impl AppConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            data_source: environment.data_source(),
            environment,
        }
    }

    pub fn for_hostname(hostname: &str) -> Self {
        Self::for_environment(Environment::from_hostname(hostname))
    }

    /// Resolve from the process environment
    ///
    /// `CHECKLIST_HOSTNAME` selects the environment; `CHECKLIST_API_BASE_URL`
    /// and `CHECKLIST_DATA_SOURCE` override the derived values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("CHECKLIST_HOSTNAME") {
            Some(host) if !host.trim().is_empty() => Self::for_hostname(host.trim()),
            _ => Self::default(),
        };
        if let Some(url) = lookup("CHECKLIST_API_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(source) = lookup("CHECKLIST_DATA_SOURCE").and_then(|s| DataSource::parse(&s)) {
            config.data_source = source;
        }
        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// `<base_url>/<collection>`
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_hostname_selects_environment() {
        assert_eq!(Environment::from_hostname("someone.github.io"), Environment::Production);
        assert_eq!(Environment::from_hostname(PRODUCTION_DOMAIN), Environment::Production);
        assert_eq!(Environment::from_hostname("localhost"), Environment::Development);
        assert_eq!(Environment::from_hostname("192.168.1.9"), Environment::Development);
    }

    #[test]
    fn test_data_source_follows_environment() {
        assert_eq!(AppConfig::for_hostname("localhost").data_source, DataSource::Test);
        assert_eq!(AppConfig::for_hostname("me.github.io").data_source, DataSource::Live);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CHECKLIST_HOSTNAME", "me.github.io"),
            ("CHECKLIST_API_BASE_URL", "http://127.0.0.1:9000/api/"),
            ("CHECKLIST_DATA_SOURCE", "test"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert!(config.is_production());
        assert_eq!(config.data_source, DataSource::Test);
        assert_eq!(config.collection_url(), "http://127.0.0.1:9000/api/shopping_item");
    }
}
