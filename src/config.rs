// Configuration and credential cache.
//
// One TOML file (by default `$HOME/.emailctl.toml`) holds the server address
// and the login/token triple saved by `auth login`. It is read once at
// startup into an immutable `Config` that is handed to the transport; the
// auth helpers rewrite the file directly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Session;

const FILE_NAME: &str = ".emailctl.toml";

/// Connection parameters and cached credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub https: bool,
    pub login: String,
    pub auth_token: String,
    pub refresh_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "localhost".into(),
            port: 8080,
            https: false,
            login: String::new(),
            auth_token: String::new(),
            refresh_token: String::new(),
        }
    }
}

impl Config {
    /// Default location of the configuration file in the user's home
    /// directory (current directory when there is no home).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(FILE_NAME)
    }

    /// Load the file at `path` and apply `EMAILCTL_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read the file as stored, without environment overrides. A missing
    /// file yields the defaults.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Overwrite connection settings from `EMAILCTL_HOST`, `EMAILCTL_PORT`
    /// and `EMAILCTL_HTTPS` as returned by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("EMAILCTL_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("EMAILCTL_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("EMAILCTL_PORT is not a valid port: '{port}'")))?;
        }
        if let Some(https) = lookup("EMAILCTL_HTTPS") {
            self.https = matches!(https.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Write the configuration to `path`, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Config(format!("creating {}: {e}", parent.display())))?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("writing {}: {e}", path.display())))
    }

    /// Persist a login and its tokens. Nothing is written unless all three
    /// values are present.
    pub fn save_auth(path: &Path, login: &str, auth_token: &str, refresh_token: &str) -> Result<()> {
        if login.is_empty() || auth_token.is_empty() || refresh_token.is_empty() {
            return Ok(());
        }
        let mut config = Self::read_file(path)?;
        config.login = login.to_string();
        config.auth_token = auth_token.to_string();
        config.refresh_token = refresh_token.to_string();
        config.save(path)
    }

    /// Forget the cached login and tokens.
    pub fn clear_auth(path: &Path) -> Result<()> {
        let mut config = Self::read_file(path)?;
        config.login.clear();
        config.auth_token.clear();
        config.refresh_token.clear();
        config.save(path)
    }

    /// `http[s]://host:port`
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    pub fn session(&self) -> Session {
        Session {
            login: self.login.clone(),
            auth_token: self.auth_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}
