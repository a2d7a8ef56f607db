//! Stdio session: token, binary resolution, child process

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use log::info;
use tokio::process::Command;

use crate::config::LauncherConfig;
use crate::credential::CredentialProvider;
use crate::download::{AssetFetcher, Platform, ReleaseResolver};
use crate::error::{LaunchError, Result};
use crate::locator::BinaryLocator;

pub struct Launcher {
    config: LauncherConfig,
    platform: Platform,
    locator: BinaryLocator,
    credentials: CredentialProvider,
}

impl Launcher {
    /// Launcher for the host platform, with locations taken from the process environment
    pub fn from_env(config: LauncherConfig) -> Self {
        let platform = Platform::detect();
        let locator = BinaryLocator::from_env(&config, &platform);
        Self::new(config, platform, locator)
    }

    pub fn new(config: LauncherConfig, platform: Platform, locator: BinaryLocator) -> Self {
        let credentials = CredentialProvider::from_command(&config.credential_command);
        Self {
            config,
            platform,
            locator,
            credentials,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Installed binary path, downloading the latest release on a miss
    ///
    /// `token` only raises the API rate limit; without one a best-effort
    /// lookup is attempted and the request goes out anonymously if that fails.
    pub async fn ensure_binary(&self, token: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = self.locator.locate() {
            return Ok(path);
        }

        info!("GitHub MCP Server binary not found, downloading...");

        let fallback;
        let token = match token {
            Some(token) => Some(token),
            None => {
                fallback = self.credentials.try_token().await;
                fallback.as_deref()
            }
        };

        let resolver = ReleaseResolver::new(&self.config)?;
        let url = resolver.resolve_asset_url(&self.platform, token).await?;

        let fetcher = AssetFetcher::new(&self.config)?;
        fetcher
            .fetch_and_install(&url, &self.locator.install_path())
            .await
    }

    /// Run `<binary> stdio <args...>` with inherited stdio and wait for it
    ///
    /// Failing to obtain a token aborts before anything is downloaded or spawned.
    pub async fn run_stdio(&self, args: &[String]) -> Result<ExitStatus> {
        let token = self.credentials.token().await?;
        let server_path = self.ensure_binary(Some(&token)).await?;

        info!("Using server binary: {}", server_path.display());

        Command::new(&server_path)
            .arg("stdio")
            .args(args)
            .env(&self.config.token_env, &token)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| LaunchError::ChildProcess {
                path: server_path,
                source,
            })
    }
}

/// Exit code for the launcher given the helper's status; signal deaths map to 1
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
