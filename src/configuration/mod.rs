use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

mod error;

pub use error::Error;

/// Engine configuration, loaded from a TOML file.
#[derive(Clone, Debug, Deserialize)]
pub struct Configuration {
    pub backend: BackendConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend, without a trailing path.
    pub base_url: String,
    /// Per-request timeout for the profile endpoint, in seconds.
    #[serde(default = "BackendConfig::default_request_timeout")]
    pub request_timeout: u64,
}

impl BackendConfig {
    fn default_request_timeout() -> u64 {
        30
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PollerConfig {
    /// Interval between status re-checks on the waiting-room view, in seconds.
    #[serde(default = "PollerConfig::default_interval")]
    pub interval: u64,
}

impl PollerConfig {
    fn default_interval() -> u64 {
        5
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            interval: PollerConfig::default_interval(),
        }
    }
}

impl Configuration {
    pub fn load(path: impl AsRef<Path>) -> Result<Configuration, Error> {
        let raw = fs::read_to_string(path)?;
        let config: Configuration = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if let Err(e) = reqwest::Url::parse(&self.backend.base_url) {
            return Err(Error::Validation(format!(
                "Invalid backend base_url '{}': {e}",
                self.backend.base_url
            )));
        }

        if self.poller.interval == 0 {
            return Err(Error::Validation(
                "Poller interval must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = write_config(
            r#"
            [backend]
            base_url = "https://lost-items-backend.example.com"
            "#,
        );

        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.backend.request_timeout, 30);
        assert_eq!(config.poller.interval, 5);
        assert_eq!(config.poller.interval_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [backend]
            base_url = "http://localhost:4000"
            request_timeout = 10

            [poller]
            interval = 15
            "#,
        );

        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:4000");
        assert_eq!(config.backend.request_timeout, 10);
        assert_eq!(config.poller.interval, 15);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_config(
            r#"
            [backend]
            base_url = "not a url"
            "#,
        );

        assert!(matches!(
            Configuration::load(file.path()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let file = write_config(
            r#"
            [backend]
            base_url = "http://localhost:4000"

            [poller]
            interval = 0
            "#,
        );

        assert!(matches!(
            Configuration::load(file.path()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Configuration::load("/does/not/exist.toml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_unparseable_toml() {
        let file = write_config("backend = ???");
        assert!(matches!(
            Configuration::load(file.path()),
            Err(Error::Parse(_))
        ));
    }
}
