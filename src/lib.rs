//! GitHub CLI extension that proxies a stdio session to `github-mcp-server`
//!
//! The launcher obtains a token from `gh auth token`, finds an installed
//! server binary (or downloads the latest release for this OS/arch), and runs
//! it with the token injected and the standard streams passed straight through.

pub mod config;
pub mod credential;
pub mod download;
pub mod error;
pub mod launcher;
pub mod locator;

pub use config::LauncherConfig;
pub use error::{LaunchError, Result};
pub use launcher::Launcher;
