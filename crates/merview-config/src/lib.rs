//! Configuration management for merview.
//!
//! Parses `merview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. User settings
//! that change at runtime (the diagram theme) are not part of the file; they
//! are persisted separately through [`Settings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `renderer.kroki_url`
//! - `renderer.command`

mod expand;
mod settings;
mod theme;

use std::path::{Path, PathBuf};

use merview_store::{FileStore, StoreError};
use serde::Deserialize;

pub use settings::{SETTINGS_KEY, Settings};
pub use theme::{SecurityLevel, Theme};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override renderer backend.
    pub backend: Option<BackendKind>,
    /// Override Kroki URL.
    pub kroki_url: Option<String>,
    /// Pin the theme, ignoring persisted settings.
    pub theme: Option<Theme>,
    /// Override export directory.
    pub export_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "merview.toml";

/// Longest renderer timeout accepted, in seconds.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer configuration.
    pub renderer: RendererConfig,
    /// Export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,
    /// Settings storage configuration (paths are relative strings from TOML).
    settings: SettingsConfigRaw,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Resolved settings storage configuration (set after loading).
    #[serde(skip)]
    pub settings_resolved: SettingsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Which external renderer turns diagram source into SVG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Kroki HTTP service.
    #[default]
    Kroki,
    /// Local mermaid CLI (`mmdc`).
    Command,
}

/// Renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Backend used for rendering.
    pub backend: BackendKind,
    /// Kroki server URL.
    pub kroki_url: String,
    /// Executable for the command backend.
    pub command: String,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
    /// Security level passed to the renderer.
    pub security_level: SecurityLevel,
    /// Theme pinned in the config file. Overrides persisted settings.
    pub theme: Option<Theme>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            kroki_url: "https://kroki.io".to_owned(),
            command: "mmdc".to_owned(),
            timeout_secs: 30,
            security_level: SecurityLevel::default(),
            theme: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    dir: Option<String>,
}

/// Resolved export configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ExportConfig {
    /// Directory exported PNG and SVG files are written to.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SettingsConfigRaw {
    dir: Option<String>,
}

/// Resolved settings storage configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SettingsConfig {
    /// Directory holding `settings.json`.
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`renderer.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
    /// Settings store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `merview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated again so overrides cannot bypass validation.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(backend) = settings.backend {
            self.renderer.backend = backend;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.renderer.kroki_url.clone_from(kroki_url);
        }
        if let Some(theme) = settings.theme {
            self.renderer.theme = Some(theme);
        }
        if let Some(export_dir) = &settings.export_dir {
            self.export_resolved.dir.clone_from(export_dir);
        }
    }

    /// Store for persisted [`Settings`].
    #[must_use]
    pub fn settings_store(&self) -> FileStore {
        FileStore::new(self.settings_resolved.dir.clone())
    }

    /// Theme for the next render: the pinned theme if any, else the
    /// persisted one.
    #[must_use]
    pub fn effective_theme(&self, settings: &Settings) -> Theme {
        self.renderer.theme.unwrap_or(settings.theme)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            renderer: RendererConfig::default(),
            export: ExportConfigRaw::default(),
            settings: SettingsConfigRaw::default(),
            export_resolved: ExportConfig {
                dir: base.to_path_buf(),
            },
            settings_resolved: SettingsConfig {
                dir: base.join(".merview"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_renderer()
    }

    fn validate_renderer(&self) -> Result<(), ConfigError> {
        let renderer = &self.renderer;
        match renderer.backend {
            BackendKind::Kroki => {
                require_non_empty(&renderer.kroki_url, "renderer.kroki_url")?;
                require_http_url(&renderer.kroki_url, "renderer.kroki_url")?;
            }
            BackendKind::Command => {
                require_non_empty(&renderer.command, "renderer.command")?;
            }
        }

        if renderer.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "renderer.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if renderer.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "renderer.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.renderer.kroki_url = expand::expand_env(&self.renderer.kroki_url, "renderer.kroki_url")?;
        self.renderer.command = expand::expand_env(&self.renderer.command, "renderer.command")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.export_resolved = ExportConfig {
            dir: resolve(self.export.dir.as_deref(), "."),
        };
        self.settings_resolved = SettingsConfig {
            dir: resolve(self.settings.dir.as_deref(), ".merview"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.renderer.backend, BackendKind::Kroki);
        assert_eq!(config.renderer.kroki_url, "https://kroki.io");
        assert_eq!(config.renderer.command, "mmdc");
        assert_eq!(config.renderer.timeout_secs, 30);
        assert_eq!(config.renderer.security_level, SecurityLevel::Loose);
        assert_eq!(config.renderer.theme, None);
        assert_eq!(config.export_resolved.dir, PathBuf::from("/test"));
        assert_eq!(config.settings_resolved.dir, PathBuf::from("/test/.merview"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.renderer.backend, BackendKind::Kroki);
        assert_eq!(config.renderer.timeout_secs, 30);
    }

    #[test]
    fn test_parse_renderer_config() {
        let toml = r#"
[renderer]
backend = "command"
command = "/usr/local/bin/mmdc"
timeout_secs = 120
security_level = "strict"
theme = "dark"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.renderer.backend, BackendKind::Command);
        assert_eq!(config.renderer.command, "/usr/local/bin/mmdc");
        assert_eq!(config.renderer.timeout_secs, 120);
        assert_eq!(config.renderer.security_level, SecurityLevel::Strict);
        assert_eq!(config.renderer.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_parse_unknown_backend_fails() {
        let toml = r#"
[renderer]
backend = "phantomjs"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[export]
dir = "exports"

[settings]
dir = "state"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.export_resolved.dir, PathBuf::from("/project/exports"));
        assert_eq!(config.settings_resolved.dir, PathBuf::from("/project/state"));
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.export_resolved.dir, PathBuf::from("/project/."));
        assert_eq!(
            config.settings_resolved.dir,
            PathBuf::from("/project/.merview")
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[renderer]
kroki_url = "http://localhost:8000"

[export]
dir = "out"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.renderer.kroki_url, "http://localhost:8000");
        assert_eq!(config.export_resolved.dir, tmp.path().join("out"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[renderer]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_apply_cli_settings_backend_and_url() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            backend: Some(BackendKind::Command),
            kroki_url: Some("http://kroki.local".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.renderer.backend, BackendKind::Command);
        assert_eq!(config.renderer.kroki_url, "http://kroki.local");
        assert_eq!(config.renderer.command, "mmdc"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_theme_and_export_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            theme: Some(Theme::Forest),
            export_dir: Some(PathBuf::from("/tmp/exports")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.renderer.theme, Some(Theme::Forest));
        assert_eq!(config.export_resolved.dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.renderer.backend, BackendKind::Kroki);
        assert_eq!(config.export_resolved.dir, PathBuf::from("/test"));
    }

    #[test]
    fn test_effective_theme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = Settings { theme: Theme::Dark };
        assert_eq!(config.effective_theme(&settings), Theme::Dark);

        config.renderer.theme = Some(Theme::Neutral);
        assert_eq!(config.effective_theme(&settings), Theme::Neutral);
    }

    #[test]
    fn test_expand_env_vars_kroki_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_MERVIEW_KROKI_URL", "https://kroki.test.com");
        }

        let toml = r#"
[renderer]
kroki_url = "${TEST_MERVIEW_KROKI_URL}"
command = "${TEST_MERVIEW_MMDC:-mmdc}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.renderer.kroki_url, "https://kroki.test.com");
        assert_eq!(config.renderer.command, "mmdc");

        unsafe {
            std::env::remove_var("TEST_MERVIEW_KROKI_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_MERVIEW_TEST");
        }

        let toml = r#"
[renderer]
kroki_url = "${MISSING_VAR_MERVIEW_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_MERVIEW_TEST"));
        assert!(err.to_string().contains("renderer.kroki_url"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_kroki_url_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.renderer.kroki_url = String::new();
        assert_validation_error(&config, &["kroki_url", "empty"]);
    }

    #[test]
    fn test_validate_kroki_url_invalid_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.renderer.kroki_url = "ftp://kroki.io".to_owned();
        assert_validation_error(&config, &["kroki_url", "http"]);
    }

    #[test]
    fn test_validate_kroki_url_ignored_for_command_backend() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.renderer.backend = BackendKind::Command;
        config.renderer.kroki_url = "not a url".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_command_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.renderer.backend = BackendKind::Command;
        config.renderer.command = "  ".to_owned();
        assert_validation_error(&config, &["renderer.command", "empty"]);
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.renderer.timeout_secs = 0;
        assert_validation_error(&config, &["timeout_secs", "greater than 0"]);

        config.renderer.timeout_secs = 601;
        assert_validation_error(&config, &["timeout_secs", "600"]);

        config.renderer.timeout_secs = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_store_location() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.settings_store().root(),
            Path::new("/test/.merview")
        );
    }
}
