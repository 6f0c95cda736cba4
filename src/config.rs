//! Configuration read from `.issueboard/issueboard.toml`.
//!
//! Settings are layered: file, then environment, then CLI arguments.
//!
//! ```toml
//! [api]
//! base_url = "https://tracker.example.com"
//! api_key_env = "ISSUEBOARD_API_KEY"
//! timeout_secs = 30
//!
//! [local]
//! state_file = ".issueboard/local_filters.json"
//!
//! [logging]
//! format = "pretty"
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogFormat;

pub const CONFIG_DIR: &str = ".issueboard";
pub const CONFIG_FILE: &str = "issueboard.toml";
/// Overrides `[api] base_url`.
pub const API_URL_ENV: &str = "ISSUEBOARD_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_key_env() -> String {
    "ISSUEBOARD_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Storage for workspace virtual-view filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSection {
    /// Relative paths resolve against the project directory.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

fn default_state_file() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("local_filters.json")
}

impl Default for LocalSection {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
        }
    }
}

/// Contents of `issueboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueboardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub local: LocalSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl IssueboardToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse issueboard.toml")
    }

    /// Load `issueboard.toml` from `config_dir`, or defaults when it is absent.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize issueboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// API base URL, with the environment taking precedence over the file.
    pub fn base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "Invalid base_url '{}': should start with http:// or https://",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("timeout_secs is 0: every request would time out".to_string());
        }
        if self.api.api_key_env.trim().is_empty() {
            warnings.push("api_key_env is empty: requests will be unauthenticated".to_string());
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            warnings.push(format!(
                "Invalid logging level '{}': should be one of error, warn, info, debug, trace",
                self.logging.level
            ));
        }

        warnings
    }
}

/// Effective configuration: file settings plus environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: IssueboardToml,
    /// CLI override for the local filter file.
    pub cli_state_file: Option<PathBuf>,
}

impl Config {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = IssueboardToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            cli_state_file: None,
        })
    }

    pub fn with_cli_args(project_dir: PathBuf, state_file: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.cli_state_file = state_file;
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Local filter file (CLI → file → default), resolved against the project directory.
    pub fn state_file(&self) -> PathBuf {
        let path = self
            .cli_state_file
            .clone()
            .unwrap_or_else(|| self.toml.local.state_file.clone());
        if path.is_absolute() {
            path
        } else {
            self.project_dir.join(path)
        }
    }

    pub fn base_url(&self) -> String {
        self.toml.base_url()
    }

    pub fn api_key(&self) -> Option<String> {
        self.toml.api_key()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs)
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = IssueboardToml::parse("").unwrap();
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.api.api_key_env, "ISSUEBOARD_API_KEY");
        assert_eq!(
            toml.local.state_file,
            PathBuf::from(".issueboard/local_filters.json")
        );
        assert_eq!(toml.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[api]
base_url = "https://tracker.example.com"
timeout_secs = 5

[logging]
format = "json"
level = "debug"
"#;
        let toml = IssueboardToml::parse(content).unwrap();
        assert_eq!(toml.api.base_url, "https://tracker.example.com");
        assert_eq!(toml.api.timeout_secs, 5);
        assert_eq!(toml.logging.format, LogFormat::Json);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_bad_values() {
        let content = r#"
[api]
base_url = "tracker.example.com"
timeout_secs = 0

[logging]
level = "loud"
"#;
        let warnings = IssueboardToml::parse(content).unwrap().validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("Invalid base_url"));
        assert!(warnings[1].contains("timeout_secs"));
        assert!(warnings[2].contains("Invalid logging level"));
    }

    #[test]
    fn test_base_url_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = std::env::var(API_URL_ENV).ok();

        unsafe { std::env::remove_var(API_URL_ENV) };
        let toml = IssueboardToml::default();
        assert_eq!(toml.base_url(), "http://localhost:8000");

        unsafe { std::env::set_var(API_URL_ENV, "https://env.example.com") };
        assert_eq!(toml.base_url(), "https://env.example.com");

        match saved {
            Some(val) => unsafe { std::env::set_var(API_URL_ENV, val) },
            None => unsafe { std::env::remove_var(API_URL_ENV) },
        }
    }

    #[test]
    fn test_api_key_read_from_named_variable() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut toml = IssueboardToml::default();
        toml.api.api_key_env = "ISSUEBOARD_TEST_KEY_VAR".to_string();

        unsafe { std::env::remove_var("ISSUEBOARD_TEST_KEY_VAR") };
        assert!(toml.api_key().is_none());
        unsafe { std::env::set_var("ISSUEBOARD_TEST_KEY_VAR", "secret") };
        assert_eq!(toml.api_key().as_deref(), Some("secret"));
        unsafe { std::env::remove_var("ISSUEBOARD_TEST_KEY_VAR") };
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut toml = IssueboardToml::default();
        toml.api.timeout_secs = 12;
        toml.save(&path).unwrap();

        let loaded = IssueboardToml::load(&path).unwrap();
        assert_eq!(loaded.api.timeout_secs, 12);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = IssueboardToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.api.timeout_secs, 30);
    }

    #[test]
    fn test_state_file_resolution() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).unwrap();
        assert!(config.state_file().ends_with(".issueboard/local_filters.json"));
        assert!(config.state_file().is_absolute());

        let config =
            Config::with_cli_args(dir.path().to_path_buf(), Some(PathBuf::from("views.json")))
                .unwrap();
        assert!(config.state_file().ends_with("views.json"));
        assert!(config.config_file().ends_with(".issueboard/issueboard.toml"));
    }
}
