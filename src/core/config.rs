//! Invocation configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then CLI flags (applied by the frontend). The
//! resulting `Config` is passed explicitly into the model client, prompt
//! builder and runner; nothing reads configuration globally.

use crate::core::error::{Result, TaiError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_TEMPLATE_NAME: &str = "command_synthesis.txt";
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Environment variables consulted by [`Config::apply_env`]
pub const ENV_API_KEY: &str = "TERMINAL_AI_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_URL: &str = "TERMINAL_AI_API_URL";
pub const ENV_MODEL: &str = "TERMINAL_AI_MODEL";
pub const ENV_PROMPTS_DIR: &str = "TERMINAL_AI_PROMPTS_DIR";
pub const ENV_SHELL: &str = "TERMINAL_AI_SHELL";

/// Configuration for one invocation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API key for the model endpoint; checked by the client before sending
    pub api_key: Option<String>,

    /// Endpoint or base URL; the client appends `/chat/completions` or
    /// `/messages` when no endpoint path is given
    pub api_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Directory holding prompt template overrides
    pub prompt_dir: Option<PathBuf>,

    /// File name looked up inside `prompt_dir`
    pub template_name: String,

    /// Shell used to run the generated command (`<shell> -c <command>`)
    pub shell: String,

    /// Working directory for the generated command; inherits when unset
    pub cwd: Option<PathBuf>,

    /// Sampling temperature (0.0 keeps answers stable)
    pub temperature: f32,

    /// Upper bound on the model round trip, in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            prompt_dir: None,
            template_name: DEFAULT_TEMPLATE_NAME.into(),
            shell: DEFAULT_SHELL.into(),
            cwd: None,
            temperature: 0.0,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TaiError::Config(e.to_string()))
    }

    /// Load a TOML config file that must exist
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| TaiError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Default config location: `<config_dir>/terminal-ai/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("terminal-ai").join("config.toml"))
    }

    /// Load from an explicit file, or from the default location when present
    ///
    /// An explicit path that cannot be read is an error; a missing file at
    /// the default location just means "defaults".
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Overlay environment values using the supplied lookup
    ///
    /// Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY).or_else(|| get(ENV_OPENAI_API_KEY)) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(dir) = get(ENV_PROMPTS_DIR) {
            self.prompt_dir = Some(PathBuf::from(dir));
        }
        if let Some(shell) = get(ENV_SHELL) {
            self.shell = shell;
        }
    }

    /// True when a non-blank API key is configured
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TaiError::Config(format!(
                "temperature ({}) must be within 0.0..=2.0",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(TaiError::Config("timeout_secs must be positive".into()));
        }
        if self.model.trim().is_empty() {
            return Err(TaiError::Config("model must not be empty".into()));
        }
        if self.shell.trim().is_empty() {
            return Err(TaiError::Config("shell must not be empty".into()));
        }
        Ok(())
    }
}
