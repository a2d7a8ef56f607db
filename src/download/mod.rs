//! GitHub release download and package extraction
//!
//! ## Module Organization
//!
//! - `platform` - OS/arch identifiers in release-asset naming
//! - `github` - latest-release lookup and asset selection heuristics
//! - `extract` - zip / tar.gz / raw payload installation
//! - `core` - download streaming and installation into the `bin` directory

mod core;
mod extract;
mod github;
mod platform;

pub use self::core::AssetFetcher;
pub use extract::{PackageFormat, extract_from_tar_gz, extract_from_zip, make_executable};
pub use github::{ASSET_RULES, AssetRule, GitHubAsset, GitHubRelease, ReleaseResolver, select_asset};
pub use platform::Platform;
