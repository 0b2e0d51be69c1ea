use std::{num::NonZeroU32, path::Path, time::Duration};

use config::ConfigError;
use secrecy::SecretBox;
use serde::Deserialize;

use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Debug, Deserialize)]
pub struct Config {
    pub base_api_url: String,
    /// Bearer token for the API. Only needed for private resources.
    #[serde(default)]
    pub access_token: Option<SecretBox<String>>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub notification_duration_ms: u64,
}

impl Config {
    /// Embedded defaults, without any user file or environment override
    pub fn defaults() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }

    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir())
    }

    /// Defaults, then any `config.*` file in `config_dir`, then `POSTBOARD_*` variables
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = Self::defaults()?;
        let mut builder = config::Config::builder()
            .set_default("base_api_url", default_config.base_api_url)?
            .set_default("page_size", u64::from(default_config.page_size))?
            .set_default("request_timeout_secs", default_config.request_timeout_secs)?
            .set_default(
                "notification_duration_ms",
                default_config.notification_duration_ms,
            )?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix(&utils::paths::PROJECT_NAME));

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            log::error!("page_size must be greater than zero");
            return Err(ConfigError::Message(String::from(
                "page_size must be greater than zero",
            )));
        }
        if self.base_api_url.trim().is_empty() {
            return Err(ConfigError::NotFound(String::from("base_api_url")));
        }
        Ok(())
    }

    pub fn page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.page_size).unwrap_or(NonZeroU32::MIN)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() -> Result<(), ConfigError> {
        let cfg = Config::defaults()?;
        assert_eq!(cfg.base_api_url, "https://gorest.co.in/public/v2");
        assert_eq!(cfg.page_size().get(), 10);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.notification_duration(), Duration::from_millis(2000));
        assert!(cfg.access_token.is_none());
        Ok(())
    }

    #[test]
    fn test_zero_page_size_is_rejected() -> Result<(), ConfigError> {
        let mut cfg = Config::defaults()?;
        cfg.page_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));
        Ok(())
    }

    #[test]
    fn test_user_file_overrides_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join(format!("postboard-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("config.toml"), "page_size = 25\nrequest_timeout_secs = 3\n")?;

        let cfg = Config::load_from(&dir);
        std::fs::remove_dir_all(&dir)?;
        let cfg = cfg?;

        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.base_api_url, "https://gorest.co.in/public/v2");
        Ok(())
    }

    #[test]
    fn test_config() {
        // Every field has a default, so a missing user file is fine. A user
        // environment may still override fields with invalid values.
        match Config::new() {
            Ok(cfg) => assert!(cfg.page_size > 0),
            Err(e) => println!("Config failed with local overrides: {e:?}"),
        }
    }
}
