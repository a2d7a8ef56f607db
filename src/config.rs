use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LaunchError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Launcher configuration (endpoint, names, environment variables).
///
/// Every field has a default; a `config.toml` in the extension data directory
/// may override any subset of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Always the compiled-in package version; not read from `config.toml`
    #[serde(skip, default = "package_version")]
    pub version: String,
    pub release_api_url: String,
    /// Base name of the helper binary, without platform suffix
    pub binary_name: String,
    /// Directory name under the platform data home
    pub data_dir_name: String,
    /// Variable carrying the token into the helper's environment
    pub token_env: String,
    pub binary_path_env: String,
    pub workspace_dir_env: String,
    pub credential_command: Vec<String>,
    pub request_timeout_secs: u64,
    pub download_inactivity_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            version: package_version(),
            release_api_url:
                "https://api.github.com/repos/github/github-mcp-server/releases/latest".into(),
            binary_name: "github-mcp-server".into(),
            data_dir_name: "gh-github-mcp-server".into(),
            token_env: "GITHUB_PERSONAL_ACCESS_TOKEN".into(),
            binary_path_env: "GITHUB_MCP_SERVER_PATH".into(),
            workspace_dir_env: "GITHUB_MCP_SERVER_DIR".into(),
            credential_command: vec!["gh".into(), "auth".into(), "token".into()],
            request_timeout_secs: 30,
            download_inactivity_secs: 300,
        }
    }
}

fn package_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

impl LauncherConfig {
    /// Defaults, overlaid with `<data-dir>/config.toml` when that file exists
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let path = extension_data_dir(&defaults.data_dir_name).join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Defaults, overlaid with the TOML file at `path`; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(LaunchError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|e| LaunchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Loaded configuration overlay from {}", path.display());
        Ok(config)
    }

    pub fn user_agent(&self) -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), self.version)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.download_inactivity_secs)
    }
}

/// Standard install location for this extension's data on the current host
pub fn extension_data_dir(name: &str) -> PathBuf {
    data_dir_for(
        std::env::var_os("XDG_DATA_HOME"),
        dirs::home_dir(),
        std::env::consts::OS,
        name,
    )
}

/// Pure form of [`extension_data_dir`]: `xdg` wins, then the OS convention under `home`.
pub fn data_dir_for(
    xdg_data_home: Option<OsString>,
    home: Option<PathBuf>,
    os: &str,
    name: &str,
) -> PathBuf {
    if let Some(xdg) = xdg_data_home.filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(name);
    }

    let Some(home) = home else {
        return PathBuf::from(".").join(name);
    };

    match os {
        "windows" => home.join("AppData").join("Local").join(name),
        "macos" | "darwin" => home
            .join("Library")
            .join("Application Support")
            .join(name),
        _ => home.join(".local").join("share").join(name),
    }
}
