//! Configuration file management for giaoan.
//!
//! Provides a TOML-based config file at `~/.config/giaoan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > stored key > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use giaoan_core::generation::GeminiConfig;
use giaoan_store::config::StoreConfig;
use giaoan_store::queries::api_key;

// -----------------------------------------------------------------------
// Environment variables
// -----------------------------------------------------------------------

pub const API_KEY_ENV: &str = "GIAOAN_API_KEY";
/// Fallback key variable shared with other Gemini tools.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GIAOAN_MODEL";
pub const CREDENTIALS_URL_ENV: &str = "GIAOAN_CREDENTIALS_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api: ApiSection,
    pub storage: StorageSection,
    pub access: AccessSection,
    pub teacher: TeacherSection,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Gemini API key. Prefer the environment or `giaoan api-key set`.
    pub key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding saved plans and login state.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSection {
    /// CSV of `username,password` lines. Unset disables the login gate.
    pub credentials_url: Option<String>,
}

/// Defaults for the teacher and school fields of new plans.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherSection {
    pub name: Option<String>,
    pub school: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the giaoan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/giaoan` or `~/.config/giaoan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("giaoan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("giaoan")
}

/// Return the path to the giaoan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`. A missing file yields `None`.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file at `path`, creating parent dirs as
/// needed. Sets file permissions to 0600 on Unix.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct GiaoanConfig {
    pub gemini: GeminiConfig,
    pub store: StoreConfig,
    pub credentials_url: Option<String>,
    pub teacher_name: String,
    pub school_name: String,
}

/// Read an environment variable, treating blank values as unset.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl GiaoanConfig {
    /// Resolve configuration from the default config file location.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = load_config_from(&config_path())?.unwrap_or_default();
        Ok(Self::resolve_with(overrides, file))
    }

    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > stored key > default.
    ///
    /// - API key: `--api-key` > `GIAOAN_API_KEY` > `GEMINI_API_KEY` >
    ///   `[api].key` > key saved with `giaoan api-key set`
    /// - Model: `--model` > `GIAOAN_MODEL` > `[api].model` > built-in default
    /// - Data dir: `--data-dir` > `GIAOAN_DATA_DIR` > `[storage].dir` >
    ///   platform data dir
    /// - Credentials URL: `GIAOAN_CREDENTIALS_URL` > `[access].credentials_url`
    pub fn resolve_with(overrides: &Overrides, file: ConfigFile) -> Self {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| std::env::var_os(StoreConfig::ENV_VAR).map(PathBuf::from))
            .or(file.storage.dir)
            .unwrap_or_else(StoreConfig::default_dir);
        let store = StoreConfig::new(data_dir);

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env_value(API_KEY_ENV))
            .or_else(|| env_value(GEMINI_API_KEY_ENV))
            .or(file.api.key.filter(|k| !k.trim().is_empty()))
            .or_else(|| stored_api_key(&store));

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key,
            model: overrides
                .model
                .clone()
                .or_else(|| env_value(MODEL_ENV))
                .or(file.api.model)
                .unwrap_or(defaults.model),
            base_url: file.api.base_url.unwrap_or(defaults.base_url),
            timeout: file
                .api
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Self {
            gemini,
            store,
            credentials_url: env_value(CREDENTIALS_URL_ENV).or(file.access.credentials_url),
            teacher_name: file.teacher.name.unwrap_or_default(),
            school_name: file.teacher.school.unwrap_or_default(),
        }
    }

    /// Whether commands must check for a recorded login.
    pub fn access_required(&self) -> bool {
        self.credentials_url.is_some()
    }
}

fn stored_api_key(store: &StoreConfig) -> Option<String> {
    match api_key::get_api_key(&store.open()) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "could not read stored API key");
            None
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        for var in [
            API_KEY_ENV,
            GEMINI_API_KEY_ENV,
            MODEL_ENV,
            CREDENTIALS_URL_ENV,
            StoreConfig::ENV_VAR,
        ] {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn file_with_key(dir: &Path) -> ConfigFile {
        ConfigFile {
            api: ApiSection {
                key: Some("file-key".to_string()),
                model: Some("file-model".to_string()),
                base_url: None,
                timeout_secs: Some(30),
            },
            storage: StorageSection {
                dir: Some(dir.to_path_buf()),
            },
            access: AccessSection {
                credentials_url: Some("https://example.test/users.csv".to_string()),
            },
            teacher: TeacherSection {
                name: Some("Nguyễn Thị An".to_string()),
                school: Some("MN Ánh Dương".to_string()),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("giaoan").join("config.toml");
        let original = file_with_key(tmp.path());

        save_config_to(&path, &original).unwrap();
        let loaded = load_config_from(&path).unwrap().expect("file exists");

        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config_from(&tmp.path().join("nope.toml")).unwrap().is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[teacher]\nname = \"Cô Lan\"\n").unwrap();

        let loaded = load_config_from(&path).unwrap().unwrap();
        assert_eq!(loaded.teacher.name.as_deref(), Some("Cô Lan"));
        assert!(loaded.api.key.is_none());
        assert!(loaded.access.credentials_url.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[api\nkey = 1").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&path, &ConfigFile::default()).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        unsafe { std::env::set_var(MODEL_ENV, "env-model") };

        let overrides = Overrides {
            api_key: Some("cli-key".to_string()),
            model: Some("cli-model".to_string()),
            data_dir: Some(tmp.path().join("cli-data")),
        };
        let config = GiaoanConfig::resolve_with(&overrides, file_with_key(tmp.path()));
        clear_env();

        assert_eq!(config.gemini.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.gemini.model, "cli-model");
        assert_eq!(config.store.data_dir, tmp.path().join("cli-data"));
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var(GEMINI_API_KEY_ENV, "gemini-env-key") };
        unsafe { std::env::set_var(CREDENTIALS_URL_ENV, "https://env.test/u.csv") };

        let config = GiaoanConfig::resolve_with(&Overrides::default(), file_with_key(tmp.path()));
        clear_env();

        assert_eq!(config.gemini.api_key.as_deref(), Some("gemini-env-key"));
        assert_eq!(config.gemini.model, "file-model");
        assert_eq!(config.gemini.timeout, Duration::from_secs(30));
        assert_eq!(config.credentials_url.as_deref(), Some("https://env.test/u.csv"));
        assert_eq!(config.teacher_name, "Nguyễn Thị An");
    }

    #[test]
    fn giaoan_key_env_wins_over_gemini_key_env() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(API_KEY_ENV, "ours") };
        unsafe { std::env::set_var(GEMINI_API_KEY_ENV, "shared") };

        let config = GiaoanConfig::resolve_with(&Overrides::default(), ConfigFile::default());
        clear_env();

        assert_eq!(config.gemini.api_key.as_deref(), Some("ours"));
    }

    #[test]
    fn resolve_falls_back_to_stored_key() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StoreConfig::new(tmp.path()).open();
        api_key::set_api_key(&store, "stored-key").unwrap();

        let overrides = Overrides {
            data_dir: Some(tmp.path().to_path_buf()),
            ..Overrides::default()
        };
        let config = GiaoanConfig::resolve_with(&overrides, ConfigFile::default());

        assert_eq!(config.gemini.api_key.as_deref(), Some("stored-key"));
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let overrides = Overrides {
            data_dir: Some(tmp.path().to_path_buf()),
            ..Overrides::default()
        };

        let config = GiaoanConfig::resolve_with(&overrides, ConfigFile::default());

        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.model, GeminiConfig::DEFAULT_MODEL);
        assert_eq!(config.gemini.base_url, GeminiConfig::DEFAULT_BASE_URL);
        assert!(!config.access_required());
        assert!(config.teacher_name.is_empty());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("giaoan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
