//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/argspec/argspec.toml`
//! 3. Environment variables: `ARGSPEC_*` prefix
//! 4. Command-line options `--width` and `--file` ([`Settings::with_overrides`])

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;

pub const DEFAULT_OUTPUT_WIDTH: usize = 80;

/// Narrower output cannot hold `usage: <command>` plus one fragment.
pub const MIN_OUTPUT_WIDTH: usize = 20;

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub output_width: Option<usize>,
    pub commands_file: Option<PathBuf>,
}

/// Unified configuration for argspec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Column limit for rendered usage blocks
    pub output_width: usize,
    /// TOML file holding the user-defined commands
    pub commands_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            commands_file: global_config_dir()
                .map(|dir| dir.join("commands.toml"))
                .unwrap_or_else(|| PathBuf::from("commands.toml")),
        }
    }
}

/// Get the XDG config directory for argspec.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "argspec").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("argspec.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e.message()),
    })
}

impl Settings {
    /// Load settings from the XDG config file and the process environment.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(
            global_config_path().as_deref(),
            Environment::with_prefix("ARGSPEC"),
        )
    }

    /// Load settings from an explicit global config file and env source.
    ///
    /// A missing global file is skipped; a malformed one is an error naming the path.
    #[instrument(level = "debug", skip(env))]
    pub fn load_from(global: Option<&Path>, env: Environment) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global.filter(|p| p.exists()) {
            debug!("Reading global config {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply command-line overrides on top of the loaded settings.
    pub fn with_overrides(
        self,
        output_width: Option<usize>,
        commands_file: Option<PathBuf>,
    ) -> Result<Self, ApplicationError> {
        let mut settings = self.merge_with(&RawSettings {
            output_width,
            commands_file,
        });
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.output_width < MIN_OUTPUT_WIDTH {
            return Err(ApplicationError::Config {
                message: format!(
                    "output_width must be at least {MIN_OUTPUT_WIDTH}, got {}",
                    self.output_width
                ),
            });
        }
        Ok(())
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.commands_file.to_string_lossy().as_ref());
        self.commands_file = PathBuf::from(expanded);
    }

    /// Scalar options: overlay wins if Some, otherwise keep base.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output_width: overlay.output_width.unwrap_or(self.output_width),
            commands_file: overlay
                .commands_file
                .clone()
                .unwrap_or_else(|| self.commands_file.clone()),
        }
    }

    /// Apply ARGSPEC_* environment variables as explicit overrides.
    ///
    /// Keys are flat, so `ARGSPEC_OUTPUT_WIDTH` maps to `output_width`.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_width") {
            settings.output_width = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("ARGSPEC_OUTPUT_WIDTH: not a number: \"{val}\""),
            })?;
        }
        if let Ok(val) = config.get_string("commands_file") {
            settings.commands_file = PathBuf::from(val);
        }

        Ok(settings)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("ARGSPEC").source(Some(source))
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, env_with(&[])).expect("load defaults");
        assert_eq!(settings.output_width, DEFAULT_OUTPUT_WIDTH);
        assert!(settings.commands_file.ends_with("commands.toml"));
    }

    #[test]
    fn given_global_file_when_loading_then_overrides_defaults() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("argspec.toml");
        fs::write(&path, "output_width = 100\ncommands_file = \"/etc/argspec/cmds.toml\"\n").unwrap();

        // Act
        let settings = Settings::load_from(Some(&path), env_with(&[])).unwrap();

        // Assert
        assert_eq!(settings.output_width, 100);
        assert_eq!(settings.commands_file, PathBuf::from("/etc/argspec/cmds.toml"));
    }

    #[test]
    fn given_env_var_when_loading_then_env_wins_over_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("argspec.toml");
        fs::write(&path, "output_width = 100\n").unwrap();

        let settings =
            Settings::load_from(Some(&path), env_with(&[("ARGSPEC_OUTPUT_WIDTH", "132")])).unwrap();

        assert_eq!(settings.output_width, 132);
    }

    #[test]
    fn given_env_commands_file_when_loading_then_env_wins_over_file() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("argspec.toml");
        fs::write(&path, "commands_file = \"/etc/argspec/cmds.toml\"\n").unwrap();

        // Act
        let settings = Settings::load_from(
            Some(&path),
            env_with(&[("ARGSPEC_COMMANDS_FILE", "/srv/argspec/commands.toml")]),
        )
        .unwrap();

        // Assert
        assert_eq!(settings.commands_file, PathBuf::from("/srv/argspec/commands.toml"));
        assert_eq!(settings.output_width, DEFAULT_OUTPUT_WIDTH);
    }

    #[test]
    fn given_double_underscore_prefix_then_not_an_override() {
        let settings =
            Settings::load_from(None, env_with(&[("ARGSPEC__OUTPUT_WIDTH", "132")])).unwrap();
        assert_eq!(settings.output_width, DEFAULT_OUTPUT_WIDTH);
    }

    #[test]
    fn given_non_numeric_env_width_then_config_error() {
        let err = Settings::load_from(None, env_with(&[("ARGSPEC_OUTPUT_WIDTH", "wide")]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_narrow_width_then_config_error() {
        let err = Settings::load_from(None, env_with(&[("ARGSPEC_OUTPUT_WIDTH", "19")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "config error: output_width must be at least 20, got 19"
        );
    }

    #[test]
    fn given_unknown_key_in_file_then_error_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("argspec.toml");
        fs::write(&path, "colour = true\n").unwrap();

        let err = Settings::load_from(Some(&path), env_with(&[])).unwrap_err();

        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn given_missing_global_file_then_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        assert!(Settings::load_from(Some(&path), env_with(&[])).is_ok());
    }

    #[test]
    fn given_tilde_in_commands_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output_width: 80,
            commands_file: PathBuf::from("~/argspec/commands.toml"),
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.commands_file.starts_with(&home));
    }

    #[test]
    fn given_cli_overrides_then_replace_loaded_values() {
        let settings = Settings::default()
            .with_overrides(Some(40), Some(PathBuf::from("/tmp/cmds.toml")))
            .unwrap();
        assert_eq!(settings.output_width, 40);
        assert_eq!(settings.commands_file, PathBuf::from("/tmp/cmds.toml"));

        assert!(Settings::default().with_overrides(Some(5), None).is_err());
    }
}
