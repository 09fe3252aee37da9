//! Configuration management for dox.
//!
//! Parses `dox.toml` with serde and resolves it into a [`PublishConfig`]
//! that is built once per run and passed by reference to the publisher.
//! Credentials are never read from the file; see [`Credentials::from_env`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`:
//! - `uri`
//! - `space`
//! - `browse_url_base`
//! - `root_id`
//! - `root_title`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "dox.toml";

/// Environment variable holding the remote user name.
pub const USERNAME_VAR: &str = "DOX_USERNAME";

/// Environment variable holding the remote password or API token.
pub const PASSWORD_VAR: &str = "DOX_PASSWORD";

/// Raw configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    uri: Option<String>,
    space: Option<String>,
    browse_url_base: Option<String>,
    root_id: Option<String>,
    root_title: Option<String>,
}

/// Resolved and validated publish configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Remote store base URL, without a trailing slash.
    pub uri: String,
    /// Target space key.
    pub space: String,
    /// Source browse URL template (`%s` is replaced by the repo-relative path).
    pub browse_url_base: String,
    /// Identity of the synthesized root page, when the tree has no `ROOT.md`.
    pub root_id: Option<String>,
    /// Title of the synthesized root page.
    pub root_title: Option<String>,
    /// Path of the file this configuration was loaded from.
    pub config_path: Option<PathBuf>,
}

/// Credentials for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// Password or API token.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read credentials from `DOX_USERNAME` and `DOX_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] naming the first unset or empty variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingCredential(var))
        };
        Ok(Self {
            username: require(USERNAME_VAR)?,
            password: require(PASSWORD_VAR)?,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No configuration file in the repository or any parent of the working directory.
    #[error("No dox.toml found (searched {} and the working directory)", .0.display())]
    NotDiscovered(PathBuf),
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
        /// Config field name (e.g., "`browse_url_base`").
        field: String,
        /// Error message (e.g., "${`DOX_BRANCH`} not set").
        message: String,
    },
    /// Credential missing from the environment.
    #[error("{0} must be set")]
    MissingCredential(&'static str),
}

/// Require a field to be present and non-empty.
fn require(value: Option<String>, field: &str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Validation(format!(
            "{field} must be set in {CONFIG_FILENAME}"
        ))),
    }
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

/// Expand an optional field in place.
fn expand_opt(value: Option<String>, field: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand::expand_env(&v, field)).transpose()
}

impl PublishConfig {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise looks for
    /// `dox.toml` in `repo_root`, then in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is found, it cannot be parsed, or a
    /// required setting is missing or invalid.
    pub fn load(config_path: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        let path = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            path.to_path_buf()
        } else {
            Self::discover(repo_root)
                .ok_or_else(|| ConfigError::NotDiscovered(repo_root.to_path_buf()))?
        };
        Self::load_from_file(&path)
    }

    /// Search the repository root, then the working directory and its parents.
    fn discover(repo_root: &Path) -> Option<PathBuf> {
        let candidate = repo_root.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse, expand, and validate configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a setting is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let uri = expand::expand_env(&require(raw.uri, "uri")?, "uri")?;
        require_http_url(&uri, "uri")?;
        let space = expand::expand_env(&require(raw.space, "space")?, "space")?;
        let browse_url_base = expand::expand_env(
            &require(raw.browse_url_base, "browse_url_base")?,
            "browse_url_base",
        )?;
        require_http_url(&browse_url_base, "browse_url_base")?;
        if browse_url_base.matches("%s").count() > 1 {
            return Err(ConfigError::Validation(
                "browse_url_base may contain at most one %s placeholder".to_owned(),
            ));
        }

        let root_id = expand_opt(raw.root_id, "root_id")?.filter(|id| !id.is_empty());
        if let Some(id) = &root_id
            && !id.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Validation(format!(
                "root_id must be a numeric page id, got {id:?}"
            )));
        }

        Ok(Self {
            uri: uri.trim_end_matches('/').to_owned(),
            space,
            browse_url_base,
            root_id,
            root_title: expand_opt(raw.root_title, "root_title")?.filter(|t| !t.is_empty()),
            config_path: None,
        })
    }
}
