//! Configuration types for promptbox.
//!
//! This module defines the configuration schema: which backend command
//! answers prompts, which chord opens the widget, and a few presentation
//! defaults. Every field has a default so a partial file is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Directory (relative to the working directory) holding config and logs.
pub const PROMPTBOX_DIR: &str = ".promptbox";

/// Config file name inside [`PROMPTBOX_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Main configuration for promptbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend that answers prompts.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Chord that opens the widget, e.g. `ctrl+alt+p`.
    #[serde(default = "default_hotkey")]
    pub hotkey: String,

    /// Whether the widget opens as soon as the host starts.
    #[serde(default = "default_open_on_start")]
    pub open_on_start: bool,

    /// Guidance shown in the empty prompt field.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_hotkey() -> String {
    "ctrl+alt+p".into()
}

fn default_open_on_start() -> bool {
    true
}

fn default_placeholder() -> String {
    "Enter prompt, then press Enter...".into()
}

/// How the prompt text reaches the backend process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptDelivery {
    /// Write the prompt to the child's stdin and close it.
    #[default]
    Stdin,
    /// Pass the prompt as an argument. Any argument equal to
    /// [`PROMPT_PLACEHOLDER`] is replaced; otherwise it is appended.
    Argument,
}

/// Argument placeholder replaced by the prompt under [`PromptDelivery::Argument`].
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Configuration for the text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Display name used in logs and error messages.
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// Command and arguments to invoke the backend.
    #[serde(default = "default_command_argv")]
    pub command_argv: Vec<String>,

    /// How the prompt is handed to the command.
    #[serde(default)]
    pub prompt_delivery: PromptDelivery,

    /// Timeout in seconds for a single generation.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_backend_name() -> String {
    "ollama".into()
}

fn default_command_argv() -> Vec<String> {
    vec!["ollama".into(), "run".into(), "llama3.2".into()]
}

fn default_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            command_argv: default_command_argv(),
            prompt_delivery: PromptDelivery::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Create a default configuration for a known backend CLI.
    pub fn default_for(name: &str) -> Self {
        match name {
            "ollama" => Self::default(),
            "llm" => Self {
                name: "llm".into(),
                command_argv: vec!["llm".into(), PROMPT_PLACEHOLDER.into()],
                prompt_delivery: PromptDelivery::Argument,
                timeout_seconds: default_timeout(),
            },
            "claude" => Self {
                name: "claude".into(),
                command_argv: vec![
                    "claude".into(),
                    "-p".into(),
                    "--output-format".into(),
                    "text".into(),
                ],
                prompt_delivery: PromptDelivery::Stdin,
                timeout_seconds: 300,
            },
            "gemini" => Self {
                name: "gemini".into(),
                command_argv: vec!["gemini".into(), "-p".into()],
                prompt_delivery: PromptDelivery::Argument,
                timeout_seconds: 300,
            },
            _ => Self {
                name: name.into(),
                command_argv: vec![name.into()],
                prompt_delivery: PromptDelivery::Stdin,
                timeout_seconds: default_timeout(),
            },
        }
    }

    /// Program to execute, if the argv is non-empty.
    pub fn program(&self) -> Option<&str> {
        self.command_argv.first().map(String::as_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            hotkey: default_hotkey(),
            open_on_start: default_open_on_start(),
            placeholder: default_placeholder(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, or use defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.command_argv.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        self.parsed_hotkey()?;
        Ok(())
    }

    /// The configured hotkey, parsed.
    pub fn parsed_hotkey(&self) -> Result<Hotkey, ConfigError> {
        Hotkey::parse(&self.hotkey)
    }
}

/// A modifier-plus-key chord such as `ctrl+alt+p`.
///
/// Letter keys are stored lowercase and matched case-insensitively, so
/// holding shift does not break the chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: char,
}

impl Hotkey {
    /// Parse a `+`-separated chord. Modifiers may appear in any order; the
    /// final component must be a single character.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidHotkey {
            hotkey: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut parts: Vec<&str> = spec.split('+').map(str::trim).collect();
        let key_part = parts.pop().filter(|k| !k.is_empty()).ok_or_else(|| invalid("missing key"))?;

        let mut chars = key_part.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_lowercase(),
            _ => return Err(invalid("key must be a single character")),
        };

        let mut hotkey = Self {
            ctrl: false,
            alt: false,
            shift: false,
            key,
        };
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => hotkey.ctrl = true,
                "alt" | "option" => hotkey.alt = true,
                "shift" => hotkey.shift = true,
                other => return Err(invalid(&format!("unknown modifier '{other}'"))),
            }
        }

        if !hotkey.ctrl && !hotkey.alt {
            return Err(invalid("chord needs ctrl or alt"));
        }

        Ok(hotkey)
    }

    /// Whether a key press with the given modifiers matches this chord.
    ///
    /// Shift is only required when the chord names it.
    pub fn matches(&self, key: char, ctrl: bool, alt: bool, shift: bool) -> bool {
        self.key == key.to_ascii_lowercase()
            && self.ctrl == ctrl
            && self.alt == alt
            && (!self.shift || shift)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Backend command is empty.
    #[error("Backend command_argv must not be empty")]
    EmptyCommand,

    /// Hotkey could not be parsed.
    #[error("Invalid hotkey '{hotkey}': {reason}")]
    InvalidHotkey { hotkey: String, reason: String },
}
