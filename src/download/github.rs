//! GitHub release API interaction and asset selection

use log::info;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use super::platform::Platform;
use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};

/// GitHub release metadata from API
#[derive(Deserialize, Debug, Default)]
pub struct GitHubRelease {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug, Clone)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

/// Asset-name heuristics, tried in the order of [`ASSET_RULES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRule {
    /// Name contains both the OS and the arch
    OsArch,
    /// macOS alias (`mac`, `macos`, `osx`) plus the arch, an x86-64 spelling,
    /// or no architecture marker at all (universal builds)
    MacAlias(&'static str),
    /// amd64 hosts: OS plus `x86_64`
    X86_64Alias,
    /// Any OS-matching asset that is not a checksum or source bundle
    OsOnly,
}

pub const ASSET_RULES: &[AssetRule] = &[
    AssetRule::OsArch,
    AssetRule::MacAlias("mac"),
    AssetRule::MacAlias("macos"),
    AssetRule::MacAlias("osx"),
    AssetRule::X86_64Alias,
    AssetRule::OsOnly,
];

const EXCLUDED_MARKERS: &[&str] = &[".sha", ".md5", "src", "source"];

const ARCH_MARKERS: &[&str] = &[
    "amd64", "x86_64", "x64", "arm64", "aarch64", "386", "i686", "armv", "ppc64", "s390x",
    "riscv64",
];

impl AssetRule {
    /// Whether this rule is tried at all for `platform`
    pub fn applies(&self, platform: &Platform) -> bool {
        match self {
            AssetRule::MacAlias(_) => platform.is_darwin(),
            AssetRule::X86_64Alias => platform.is_amd64(),
            AssetRule::OsArch | AssetRule::OsOnly => true,
        }
    }

    /// Case-insensitive match of an asset name against `platform`
    pub fn matches(&self, asset_name: &str, platform: &Platform) -> bool {
        let name = asset_name.to_lowercase();
        let os = platform.os();
        let arch = platform.arch();

        match self {
            AssetRule::OsArch => name.contains(os) && name.contains(arch),
            AssetRule::MacAlias(alias) => {
                name.contains(alias)
                    && (name.contains(arch)
                        || name.contains("x86_64")
                        || name.contains("amd64")
                        || !ARCH_MARKERS.iter().any(|m| name.contains(m)))
            }
            AssetRule::X86_64Alias => name.contains(os) && name.contains("x86_64"),
            AssetRule::OsOnly => {
                name.contains(os) && !EXCLUDED_MARKERS.iter().any(|m| name.contains(m))
            }
        }
    }

    fn describe(&self, platform: &Platform) -> String {
        match self {
            AssetRule::OsArch => format!("Trying {} + {}", platform.os(), platform.arch()),
            AssetRule::MacAlias(alias) => format!("Trying macOS alternative: {alias}"),
            AssetRule::X86_64Alias => "Trying architecture alternative: x86_64".to_string(),
            AssetRule::OsOnly => format!("Looking for any binary for {}", platform.os()),
        }
    }
}

/// Pick the release asset for `platform`, first rule wins
pub fn select_asset<'r>(release: &'r GitHubRelease, platform: &Platform) -> Result<&'r GitHubAsset> {
    for rule in ASSET_RULES.iter().filter(|rule| rule.applies(platform)) {
        info!("{}", rule.describe(platform));
        if let Some(asset) = release
            .assets
            .iter()
            .find(|asset| rule.matches(&asset.name, platform))
        {
            info!("Found matching asset: {}", asset.name);
            return Ok(asset);
        }
    }

    let hint = if platform.is_darwin() && platform.is_amd64() {
        ". Consider building from source: go build -o bin/github-mcp-server ./cmd/github-mcp-server"
    } else {
        ""
    };

    Err(LaunchError::NoMatchingAsset {
        os: platform.os().to_string(),
        arch: platform.arch().to_string(),
        hint: hint.to_string(),
    })
}

/// Queries the "latest release" endpoint and resolves the download URL for a platform
pub struct ReleaseResolver {
    client: reqwest::Client,
    api_url: String,
    user_agent: String,
}

impl ReleaseResolver {
    pub fn new(config: &LauncherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LaunchError::network("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            api_url: config.release_api_url.clone(),
            user_agent: config.user_agent(),
        })
    }

    /// Fetch latest release; `token` is attached when present
    pub async fn latest_release(&self, token: Option<&str>) -> Result<GitHubRelease> {
        let context = "failed to get latest release info";

        let mut request = self
            .client
            .get(&self.api_url)
            .header(USER_AGENT, &self.user_agent);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        info!("Requesting latest release info from: {}", self.api_url);
        let response = request
            .send()
            .await
            .map_err(|e| LaunchError::network(context, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LaunchError::network(context, e))?;

        if status != reqwest::StatusCode::OK {
            return Err(LaunchError::Status {
                context: context.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let release: GitHubRelease = serde_json::from_str(&body)?;

        info!(
            "Found release {} with {} assets:",
            release.tag_name,
            release.assets.len()
        );
        for asset in &release.assets {
            info!("  - {} ({} bytes)", asset.name, asset.size);
        }

        Ok(release)
    }

    /// Download URL of the asset matching `platform` in the latest release
    pub async fn resolve_asset_url(&self, platform: &Platform, token: Option<&str>) -> Result<String> {
        let release = self.latest_release(token).await?;
        let asset = select_asset(&release, platform)?;
        Ok(asset.browser_download_url.clone())
    }
}
