use std::path::Path;

use extract::{ResolverConfig, SummarizerConfig};
use registry::{RegistryConfig, RequestPolicy};
use score::ScoringConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub requests: RequestPolicy,
    pub resolver: ResolverConfig,
    pub summarizer: SummarizerConfig,
    pub scoring: ScoringConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    /// Fetch registry documents for records that have no stored text yet.
    pub fetch_missing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            requests: RequestPolicy::default(),
            resolver: ResolverConfig::default(),
            summarizer: SummarizerConfig::default(),
            scoring: ScoringConfig::default(),
            cache: CacheConfig::default(),
            store: StoreConfig::default(),
            fetch_missing: true,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Sections left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Offline mode: only records with stored text are processed.
    pub fn offline(mut self) -> Self {
        self.fetch_missing = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_follow_the_registry_policy() {
        let config = AppConfig::default();
        assert_eq!(config.requests.max_requests_per_second, 5);
        assert_eq!(config.requests.max_attempts, 3);
        assert!(!config.registry.accept_invalid_certs);
        assert!(config.fetch_missing);
        assert!(config.cache.enabled);
    }

    #[test]
    fn partial_files_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"requests": {{"max_requests_per_second": 2}}, "summarizer": {{"model": "llama3"}}, "fetch_missing": false}}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.requests.max_requests_per_second, 2);
        assert_eq!(config.requests.max_attempts, 3);
        assert_eq!(config.summarizer.model, "llama3");
        assert!(config.summarizer.enabled);
        assert!(!config.fetch_missing);
        assert_eq!(config.registry.resource_namespace, "raa/lamning");
    }

    #[test]
    fn unreadable_and_malformed_files_are_reported() {
        let missing = AppConfig::from_file(Path::new("/nonexistent/heritage.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
