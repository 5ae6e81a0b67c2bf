//! Configuration file management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use geogallery_store::geocode::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};

/// Longest geocoding timeout accepted from configuration.
pub const MAX_GEOCODE_TIMEOUT_SECS: u64 = 60;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Reverse geocoding settings.
    pub geocoding: GeocodingConfig,
    /// Search defaults.
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.storage.validate());
        errors.extend(self.geocoding.validate());
        errors.extend(self.search.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: geogallery_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Reverse geocoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Resolve place names for new locations.
    pub enabled: bool,
    /// Nominatim base URL.
    pub endpoint: String,
    /// User-Agent sent with every lookup.
    pub user_agent: String,
    /// Upper bound on a single lookup, in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 5,
        }
    }
}

impl GeocodingConfig {
    /// Lookup timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate geocoding configuration.
    ///
    /// Endpoint and user agent are only checked while geocoding is enabled.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.timeout_secs == 0 || self.timeout_secs > MAX_GEOCODE_TIMEOUT_SECS {
            errors.push(ValidationError {
                field: "geocoding.timeout_secs".to_string(),
                message: format!(
                    "timeout must be between 1 and {} seconds, got {}",
                    MAX_GEOCODE_TIMEOUT_SECS, self.timeout_secs
                ),
            });
        }

        if !self.enabled {
            return errors;
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            errors.push(ValidationError {
                field: "geocoding.endpoint".to_string(),
                message: format!(
                    "endpoint must start with http:// or https://, got '{}'",
                    self.endpoint
                ),
            });
        }

        if self.user_agent.trim().is_empty() {
            errors.push(ValidationError {
                field: "geocoding.user_agent".to_string(),
                message: "user agent cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius used by `near` when `--radius` is not given.
    pub default_radius_km: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 10.0,
        }
    }
}

impl SearchConfig {
    /// Validate search configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.default_radius_km.is_finite() && self.default_radius_km > 0.0) {
            errors.push(ValidationError {
                field: "search.default_radius_km".to_string(),
                message: format!(
                    "radius must be a positive number of kilometers, got {}",
                    self.default_radius_km
                ),
            });
        }

        errors
    }
}

/// Errors from loading, saving or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field path (e.g., `geocoding.timeout_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
///
/// - Linux: `~/.config/geogallery/config.toml`
/// - macOS: `~/Library/Application Support/geogallery/config.toml`
/// - Windows: `C:\Users\<user>\AppData\Roaming\geogallery\config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geogallery")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.storage.path, geogallery_store::default_db_path());
        assert!(config.geocoding.enabled);
        assert_eq!(config.geocoding.endpoint, DEFAULT_NOMINATIM_URL);
        assert_eq!(config.geocoding.timeout(), Duration::from_secs(5));
        assert_eq!(config.search.default_radius_km, 10.0);
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml = r#"
            [geocoding]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.geocoding.enabled);
        assert_eq!(config.geocoding.timeout_secs, 5);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            storage: StorageConfig {
                path: PathBuf::from("/tmp/photos.db"),
            },
            geocoding: GeocodingConfig {
                enabled: false,
                endpoint: "http://localhost:8088".to_string(),
                user_agent: "tests".to_string(),
                timeout_secs: 2,
            },
            search: SearchConfig {
                default_radius_km: 2.5,
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Config::load(temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[search\ndefault_radius_km = ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = Config {
            storage: StorageConfig {
                path: PathBuf::new(),
            },
            geocoding: GeocodingConfig {
                timeout_secs: 61,
                endpoint: "nominatim.local".to_string(),
                user_agent: " ".to_string(),
                ..Default::default()
            },
            search: SearchConfig {
                default_radius_km: -1.0,
            },
        };

        let fields = field_names(config.validate().unwrap_err());
        assert_eq!(
            fields,
            vec![
                "storage.path",
                "geocoding.timeout_secs",
                "geocoding.endpoint",
                "geocoding.user_agent",
                "search.default_radius_km",
            ]
        );
    }

    #[test]
    fn test_disabled_geocoding_skips_endpoint_checks() {
        let geocoding = GeocodingConfig {
            enabled: false,
            endpoint: String::new(),
            user_agent: String::new(),
            timeout_secs: 5,
        };
        assert!(geocoding.validate().is_empty());
    }

    #[test]
    fn test_timeout_bounds() {
        for (secs, ok) in [(0, false), (1, true), (60, true), (61, false)] {
            let geocoding = GeocodingConfig {
                timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(geocoding.validate().is_empty(), ok, "timeout {}", secs);
        }
    }

    #[test]
    fn test_loaded_file_rejects_bad_radius() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndefault_radius_km = 0.0\n").unwrap();

        let config = Config::load(&path).unwrap();
        let fields = field_names(config.validate().unwrap_err());
        assert_eq!(fields, vec!["search.default_radius_km"]);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![ValidationError {
            field: "storage.path".to_string(),
            message: "database path cannot be empty".to_string(),
        }]);
        assert_eq!(
            err.to_string(),
            "Configuration validation failed:\n  - storage.path: database path cannot be empty"
        );
    }
}
