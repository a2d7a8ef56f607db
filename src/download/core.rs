//! Asset download and installation into the extension's `bin` directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use log::info;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use super::extract::{PackageFormat, install_payload, make_executable};
use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};

/// Downloads a release asset and installs its executable payload
pub struct AssetFetcher {
    client: reqwest::Client,
    binary_name: String,
    request_timeout: Duration,
    inactivity_timeout: Duration,
}

impl AssetFetcher {
    pub fn new(config: &LauncherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| LaunchError::network("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            binary_name: config.binary_name.clone(),
            request_timeout: config.request_timeout(),
            inactivity_timeout: config.download_inactivity_timeout(),
        })
    }

    /// Download `url` and install the binary at `target`
    ///
    /// `target`'s parent directory is created if missing. The downloaded file
    /// lives in that directory under a temporary name and is removed on every
    /// path except a raw-binary download, where it is renamed to `target`.
    pub async fn fetch_and_install(&self, url: &str, target: &Path) -> Result<PathBuf> {
        let bin_dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(bin_dir)
            .await
            .map_err(|e| LaunchError::fs("failed to create bin directory", bin_dir, e))?;

        info!("Downloading from: {url}");
        let context = "failed to download binary";
        let response = match timeout(self.request_timeout, self.client.get(url).send()).await {
            Ok(response) => response.map_err(|e| LaunchError::network(context, e))?,
            Err(_) => {
                return Err(LaunchError::Stalled {
                    secs: self.request_timeout.as_secs(),
                    received: 0,
                });
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LaunchError::Status {
                context: context.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let download = tempfile::Builder::new()
            .prefix(&format!("{}-", self.binary_name))
            .tempfile_in(bin_dir)
            .map_err(|e| LaunchError::fs("failed to create temporary file", bin_dir, e))?;
        let handle = download
            .reopen()
            .map_err(|e| LaunchError::fs("failed to open temporary file", download.path(), e))?;
        let mut file = tokio::fs::File::from_std(handle);

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        loop {
            let chunk = match timeout(self.inactivity_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => return Err(LaunchError::network(context, e)),
                Ok(None) => break,
                Err(_) => {
                    return Err(LaunchError::Stalled {
                        secs: self.inactivity_timeout.as_secs(),
                        received: downloaded,
                    });
                }
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| LaunchError::fs("failed to save downloaded file", download.path(), e))?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| LaunchError::fs("failed to save downloaded file", download.path(), e))?;
        drop(file);
        info!("Downloaded {downloaded} bytes");

        let format = PackageFormat::from_url(url);
        let binary_name = self.binary_name.clone();
        let target_path = target.to_path_buf();
        tokio::task::spawn_blocking(move || {
            install_payload(download, format, &binary_name, &target_path)
        })
        .await??;

        make_executable(target)?;
        info!("Installed server binary to {}", target.display());

        Ok(target.to_path_buf())
    }
}
