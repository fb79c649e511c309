use anyhow::Result;
use ephemeral_artifact_store::{ArtifactStore, RetentionPolicy, StoreError};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use defaults::*;

/// Environment variable prefix; nested keys use `__` (e.g. `QR_FORGE_WEB__PORT`)
pub const ENV_PREFIX: &str = "QR_FORGE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub barcode: BarcodeConfig,
    #[serde(default)]
    pub logo: LogoConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeConfig {
    /// Pixels per module side
    #[serde(default = "default_module_size")]
    pub module_size: u32,
    /// Light border width in modules
    #[serde(default = "default_quiet_zone")]
    pub quiet_zone: u32,
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoConfig {
    /// Longest logo side as a fraction of the barcode's shorter side
    #[serde(default = "default_logo_scale")]
    pub scale: f32,
    #[serde(default = "default_max_logo_bytes")]
    pub max_upload_bytes: usize,
    /// Longest accepted logo side in pixels
    #[serde(default = "default_max_logo_dimension")]
    pub max_dimension: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_ttl", with = "duration_serde::duration")]
    pub ttl: Duration,
    /// Derived from the TTL when unset
    #[serde(
        default,
        with = "duration_serde::option_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub reap_interval: Option<Duration>,
    #[serde(default = "default_reap_on_insert")]
    pub reap_on_insert: bool,
    /// How long reaped ids report "expired"; defaults to the TTL
    #[serde(
        default,
        with = "duration_serde::option_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub tombstone_retention: Option<Duration>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_request_size() -> usize {
    DEFAULT_MAX_REQUEST_SIZE
}

fn default_module_size() -> u32 {
    DEFAULT_MODULE_SIZE
}

fn default_quiet_zone() -> u32 {
    DEFAULT_QUIET_ZONE
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

fn default_logo_scale() -> f32 {
    DEFAULT_LOGO_SCALE
}

fn default_max_logo_bytes() -> usize {
    DEFAULT_MAX_LOGO_BYTES
}

fn default_max_logo_dimension() -> u32 {
    DEFAULT_MAX_LOGO_DIMENSION
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

fn default_reap_on_insert() -> bool {
    DEFAULT_REAP_ON_INSERT
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_size: default_max_request_size(),
        }
    }
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            module_size: default_module_size(),
            quiet_zone: default_quiet_zone(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            scale: default_logo_scale(),
            max_upload_bytes: default_max_logo_bytes(),
            max_dimension: default_max_logo_dimension(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            reap_interval: None,
            reap_on_insert: default_reap_on_insert(),
            tombstone_retention: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            barcode: BarcodeConfig::default(),
            logo: LogoConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl StorageConfig {
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new().ttl(self.ttl)
    }

    /// Build the artifact store described by this section.
    pub fn build_store(&self) -> Result<ArtifactStore, StoreError> {
        let mut builder = ArtifactStore::builder()
            .retention_policy(self.retention_policy())
            .reap_on_insert(self.reap_on_insert);

        if let Some(interval) = self.reap_interval {
            builder = builder.reap_interval(interval);
        }
        if let Some(retention) = self.tombstone_retention {
            builder = builder.tombstone_retention(retention);
        }

        builder.build()
    }
}

impl Config {
    /// Layered load: defaults, then the TOML file, then `QR_FORGE_*` env vars.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
        }

        let config = Self::figment(config_file).extract()?;
        Ok(config)
    }

    fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.web.port == 0 {
            return Err(AppError::configuration("web.port must be non-zero"));
        }
        if self.barcode.module_size == 0 || self.barcode.module_size > MAX_MODULE_SIZE {
            return Err(AppError::configuration(format!(
                "barcode.module_size must be between 1 and {MAX_MODULE_SIZE}, got {}",
                self.barcode.module_size
            )));
        }
        if self.barcode.quiet_zone > MAX_QUIET_ZONE {
            return Err(AppError::configuration(format!(
                "barcode.quiet_zone must be at most {MAX_QUIET_ZONE}, got {}",
                self.barcode.quiet_zone
            )));
        }
        if self.barcode.max_text_chars == 0 || self.barcode.max_text_chars > MAX_TEXT_CHARS_LIMIT {
            return Err(AppError::configuration(format!(
                "barcode.max_text_chars must be between 1 and {MAX_TEXT_CHARS_LIMIT}, got {}",
                self.barcode.max_text_chars
            )));
        }
        if !(self.logo.scale > 0.0 && self.logo.scale <= MAX_LOGO_SCALE) {
            return Err(AppError::configuration(format!(
                "logo.scale must be in (0, {MAX_LOGO_SCALE}], got {}",
                self.logo.scale
            )));
        }
        if self.logo.max_dimension == 0 || self.logo.max_dimension > MAX_LOGO_DIMENSION_LIMIT {
            return Err(AppError::configuration(format!(
                "logo.max_dimension must be between 1 and {MAX_LOGO_DIMENSION_LIMIT}, got {}",
                self.logo.max_dimension
            )));
        }
        if self.storage.ttl.is_zero() {
            return Err(AppError::configuration("storage.ttl must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.ttl, Duration::from_secs(3600));
        assert_eq!(config.web.max_request_size, 5 * 1024 * 1024);
        assert_eq!(config.logo.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.logo.max_dimension, 4096);
    }

    #[rstest]
    #[case::zero_port(|c: &mut Config| c.web.port = 0)]
    #[case::zero_module(|c: &mut Config| c.barcode.module_size = 0)]
    #[case::huge_module(|c: &mut Config| c.barcode.module_size = 65)]
    #[case::huge_quiet_zone(|c: &mut Config| c.barcode.quiet_zone = 100_000)]
    #[case::zero_text(|c: &mut Config| c.barcode.max_text_chars = 0)]
    #[case::over_cap_text(|c: &mut Config| c.barcode.max_text_chars = 1001)]
    #[case::zero_scale(|c: &mut Config| c.logo.scale = 0.0)]
    #[case::big_scale(|c: &mut Config| c.logo.scale = 0.31)]
    #[case::nan_scale(|c: &mut Config| c.logo.scale = f32::NAN)]
    #[case::zero_logo_dimension(|c: &mut Config| c.logo.max_dimension = 0)]
    #[case::huge_logo_dimension(|c: &mut Config| c.logo.max_dimension = 20_000)]
    #[case::zero_ttl(|c: &mut Config| c.storage.ttl = Duration::ZERO)]
    fn test_validate_rejects(#[case] mutate: fn(&mut Config)) {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_upper_bounds() {
        let mut config = Config::default();
        config.barcode.quiet_zone = MAX_QUIET_ZONE;
        config.barcode.module_size = MAX_MODULE_SIZE;
        config.logo.max_dimension = MAX_LOGO_DIMENSION_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layering_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [web]
                port = 9000

                [storage]
                ttl = "10m"
                reap_interval = "30s"
                "#,
            )?;
            jail.set_env("QR_FORGE_WEB__PORT", "9100");
            jail.set_env("QR_FORGE_LOGO__SCALE", "0.25");

            let config: Config = Config::figment("config.toml").extract()?;
            assert_eq!(config.web.port, 9100);
            assert_eq!(config.web.host, DEFAULT_HOST);
            assert_eq!(config.logo.scale, 0.25);
            assert_eq!(config.storage.ttl, Duration::from_secs(600));
            assert_eq!(config.storage.reap_interval, Some(Duration::from_secs(30)));
            assert_eq!(config.storage.tombstone_retention, None);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("fresh.toml");
            let path = path.to_string_lossy().to_string();

            let config = Config::load_from_file(&path).map_err(|e| e.to_string())?;
            assert!(Path::new(&path).exists());
            assert_eq!(config.barcode.module_size, DEFAULT_MODULE_SIZE);
            assert_eq!(config.storage.ttl, DEFAULT_TTL);
            Ok(())
        });
    }

    #[test]
    fn test_storage_builds_store() {
        let storage = StorageConfig {
            ttl: Duration::from_secs(30),
            reap_interval: None,
            reap_on_insert: false,
            tombstone_retention: Some(Duration::from_secs(300)),
        };
        let store = storage.build_store().unwrap();
        assert_eq!(store.retention_policy().ttl, Duration::from_secs(30));
        assert_eq!(store.reap_interval(), Duration::from_secs(1));
    }
}
