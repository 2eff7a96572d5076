use crate::cli::error::{InteractiveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the listing tool
pub const TOOL_ENV_VAR: &str = "TOOLCASE_TOOL";

/// Configuration settings for the toolcase CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default verbosity level
    #[serde(default)]
    pub verbose: bool,

    /// Default quiet mode
    #[serde(default)]
    pub quiet: bool,

    /// Custom data directory (if not using system default)
    pub data_dir: Option<PathBuf>,

    /// Tool whose `tool list` output builds the catalog
    #[serde(default = "default_tool_command")]
    pub tool_command: String,

    /// Shell used to run cases (platform shell when unset)
    pub shell: Option<String>,

    /// Keybinding synchronization settings
    #[serde(default)]
    pub keybindings: KeybindingDefaults,

    /// Output formatting preferences
    #[serde(default)]
    pub output: OutputDefaults,
}

/// Where and how keybindings are mirrored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingDefaults {
    /// External keybinding list (defaults to `<data dir>/keybindings.json`)
    pub path: Option<PathBuf>,

    /// Action id written into each mirrored entry
    #[serde(default = "default_keybinding_command")]
    pub command: String,

    /// Scoping condition written into each mirrored entry
    #[serde(default = "default_keybinding_when")]
    pub when: String,
}

/// Output formatting defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Enable colored output by default
    #[serde(default = "default_true")]
    pub color: bool,

    /// Print the command string next to each case
    #[serde(default = "default_true")]
    pub show_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            data_dir: None,
            tool_command: default_tool_command(),
            shell: None,
            keybindings: KeybindingDefaults::default(),
            output: OutputDefaults::default(),
        }
    }
}

impl Default for KeybindingDefaults {
    fn default() -> Self {
        Self {
            path: None,
            command: default_keybinding_command(),
            when: default_keybinding_when(),
        }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            color: default_true(),
            show_commands: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from file, with fallback to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            // Create default config file
            let config = Self::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            InteractiveError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            InteractiveError::configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = crate::cli::ensure_data_dir()?;
        Ok(data_dir.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from_file(path)
    }

    /// Merge with command-line arguments, giving priority to CLI args
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::cli::Cli) -> Self {
        if cli_args.verbose {
            self.verbose = true;
        }
        if cli_args.quiet {
            self.quiet = true;
        }
        if cli_args.no_color {
            self.output.color = false;
        }
        if let Some(ref data_dir) = cli_args.data_dir {
            self.data_dir = Some(data_dir.clone());
        }

        self
    }

    /// Listing tool, honoring the environment override
    pub fn tool(&self) -> String {
        match std::env::var(TOOL_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => self.tool_command.clone(),
        }
    }

    /// External keybinding file for the given data directory
    pub fn keybindings_path(&self, data_dir: &Path) -> PathBuf {
        self.keybindings
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join("keybindings.json"))
    }

    /// Update a single setting by its dotted name
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "verbose" => self.verbose = parse_bool(key, value)?,
            "quiet" => self.quiet = parse_bool(key, value)?,
            "tool_command" => self.tool_command = value.to_string(),
            "shell" => self.shell = non_empty(value),
            "keybindings.path" => self.keybindings.path = non_empty(value).map(PathBuf::from),
            "keybindings.command" => self.keybindings.command = value.to_string(),
            "keybindings.when" => self.keybindings.when = value.to_string(),
            "output.color" => self.output.color = parse_bool(key, value)?,
            "output.show_commands" => self.output.show_commands = parse_bool(key, value)?,
            _ => {
                return Err(InteractiveError::invalid_input(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| {
        InteractiveError::invalid_input(format!("{} expects true or false, got '{}'", key, value))
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Helper functions for default values
fn default_tool_command() -> String {
    "uv".to_string()
}

fn default_keybinding_command() -> String {
    "toolcase.runCaseWithKeybinding".to_string()
}

fn default_keybinding_when() -> String {
    "view == toolcase".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.verbose);
        assert!(!config.quiet);
        assert_eq!(config.tool_command, "uv");
        assert_eq!(config.keybindings.command, "toolcase.runCaseWithKeybinding");
        assert_eq!(config.keybindings.when, "view == toolcase");
        assert!(config.output.color);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.verbose = true;
        config.tool_command = "uvx".to_string();
        config.keybindings.path = Some(PathBuf::from("/tmp/keys.json"));

        config.save_to_file(&config_path).unwrap();
        let loaded_config = Config::load_from_file(&config_path).unwrap();

        assert!(loaded_config.verbose);
        assert_eq!(loaded_config.tool_command, "uvx");
        assert_eq!(
            loaded_config.keybindings.path,
            Some(PathBuf::from("/tmp/keys.json"))
        );
    }

    #[test]
    fn test_config_file_creation() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        // Should create default config file if it doesn't exist
        let config = Config::load_from_file(&config_path).unwrap();

        assert!(config_path.exists());
        assert_eq!(config.tool_command, default_tool_command());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "quiet = true\n[keybindings]\nwhen = \"always\"\n").unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert!(config.quiet);
        assert_eq!(config.keybindings.when, "always");
        assert_eq!(config.keybindings.command, default_keybinding_command());
        assert_eq!(config.tool_command, "uv");
    }

    #[test]
    fn test_invalid_config_is_configuration_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "verbose = [").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, InteractiveError::Configuration(_)));
    }

    #[test]
    fn test_keybindings_path_default() {
        let config = Config::default();
        let data_dir = PathBuf::from("/data");
        assert_eq!(
            config.keybindings_path(&data_dir),
            PathBuf::from("/data/keybindings.json")
        );
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("output.color", "false").unwrap();
        config.set_value("shell", "bash").unwrap();
        config.set_value("shell", "").unwrap();
        assert!(!config.output.color);
        assert!(config.shell.is_none());

        assert!(matches!(
            config.set_value("verbose", "maybe"),
            Err(InteractiveError::InvalidInput(_))
        ));
        assert!(matches!(
            config.set_value("nope", "1"),
            Err(InteractiveError::InvalidInput(_))
        ));
    }
}
