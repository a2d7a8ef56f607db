//! Search for an already-installed helper binary
//!
//! Candidates are checked strictly in priority order:
//! 1. explicit path override (`GITHUB_MCP_SERVER_PATH`)
//! 2. `<workspace-override>/bin/<binary>` (`GITHUB_MCP_SERVER_DIR`)
//! 3. `<extension-data-dir>/bin/<binary>`
//! 4. `<launcher-dir>/bin/<binary>`
//! 5. `<launcher-dir>/<binary>`
//! 6. the system `PATH`
//!
//! Locating has no side effects; a miss is `None`, never an error.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{LauncherConfig, extension_data_dir};
use crate::download::Platform;

#[derive(Debug, Clone)]
pub struct BinaryLocator {
    explicit_path: Option<PathBuf>,
    workspace_dir: Option<PathBuf>,
    data_dir: PathBuf,
    launcher_dir: Option<PathBuf>,
    /// Platform file name (`github-mcp-server[.exe]`)
    file_name: String,
    /// Bare name looked up on `PATH`
    search_name: String,
    search_path: Option<OsString>,
}

impl BinaryLocator {
    /// Snapshot the current process environment
    pub fn from_env(config: &LauncherConfig, platform: &Platform) -> Self {
        let launcher_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self {
            explicit_path: non_empty_env(&config.binary_path_env),
            workspace_dir: non_empty_env(&config.workspace_dir_env),
            data_dir: extension_data_dir(&config.data_dir_name),
            launcher_dir,
            file_name: platform.binary_file_name(&config.binary_name),
            search_name: config.binary_name.clone(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Locator with only a data directory; everything else unset
    pub fn new(config: &LauncherConfig, platform: &Platform, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: None,
            workspace_dir: None,
            data_dir: data_dir.into(),
            launcher_dir: None,
            file_name: platform.binary_file_name(&config.binary_name),
            search_name: config.binary_name.clone(),
            search_path: None,
        }
    }

    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_workspace_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.workspace_dir = dir;
        self
    }

    pub fn with_launcher_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.launcher_dir = dir;
        self
    }

    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory that downloads are installed into
    pub fn install_dir(&self) -> PathBuf {
        self.data_dir.join("bin")
    }

    /// Where a freshly downloaded binary is written
    pub fn install_path(&self) -> PathBuf {
        self.install_dir().join(&self.file_name)
    }

    /// Filesystem candidates in priority order (ranks 1-5; `PATH` is searched separately)
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(5);

        if let Some(path) = &self.explicit_path {
            candidates.push(path.clone());
        }
        if let Some(dir) = &self.workspace_dir {
            candidates.push(dir.join("bin").join(&self.file_name));
        }
        candidates.push(self.install_path());
        if let Some(dir) = &self.launcher_dir {
            candidates.push(dir.join("bin").join(&self.file_name));
            candidates.push(dir.join(&self.file_name));
        }

        candidates
    }

    /// First candidate that exists and is not a directory, else a `PATH` hit
    pub fn locate(&self) -> Option<PathBuf> {
        for candidate in self.candidates() {
            if is_file(&candidate) {
                debug!("Found server binary candidate: {}", candidate.display());
                return Some(candidate);
            }
            debug!("No server binary at {}", candidate.display());
        }

        self.search_system_path()
    }

    fn search_system_path(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        match which::which_in(&self.search_name, Some(search_path), cwd) {
            Ok(path) => {
                debug!("Found {} on PATH: {}", self.search_name, path.display());
                Some(path)
            }
            Err(_) => None,
        }
    }
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// One directory per rank so each can be populated independently
    struct Layout {
        _root: TempDir,
        explicit: PathBuf,
        workspace: PathBuf,
        data: PathBuf,
        launcher: PathBuf,
        path_dir: PathBuf,
    }

    impl Layout {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let make = |name: &str| {
                let dir = root.path().join(name);
                std::fs::create_dir_all(&dir).unwrap();
                dir
            };
            Self {
                explicit: make("explicit").join("custom-server"),
                workspace: make("workspace"),
                data: make("data"),
                launcher: make("launcher"),
                path_dir: make("path"),
                _root: root,
            }
        }

        fn locator(&self) -> BinaryLocator {
            let config = LauncherConfig::default();
            let platform = Platform::new("linux", "amd64");
            BinaryLocator::new(&config, &platform, &self.data)
                .with_explicit_path(Some(self.explicit.clone()))
                .with_workspace_dir(Some(self.workspace.clone()))
                .with_launcher_dir(Some(self.launcher.clone()))
                .with_search_path(Some(self.path_dir.clone().into_os_string()))
        }

        /// Path for rank 1..=6
        fn rank(&self, rank: usize) -> PathBuf {
            match rank {
                1 => self.explicit.clone(),
                2 => self.workspace.join("bin/github-mcp-server"),
                3 => self.data.join("bin/github-mcp-server"),
                4 => self.launcher.join("bin/github-mcp-server"),
                5 => self.launcher.join("github-mcp-server"),
                6 => self.path_dir.join("github-mcp-server"),
                _ => unreachable!(),
            }
        }
    }

    fn touch_executable(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn returns_highest_priority_existing_candidate() {
        for k in 1..=6 {
            let layout = Layout::new();
            for rank in k..=6 {
                touch_executable(&layout.rank(rank));
            }
            assert_eq!(layout.locator().locate(), Some(layout.rank(k)), "rank {k}");
        }
    }

    #[test]
    fn nothing_installed_is_not_found() {
        let layout = Layout::new();
        assert_eq!(layout.locator().locate(), None);
    }

    #[test]
    fn directories_are_skipped() {
        let layout = Layout::new();
        std::fs::create_dir_all(layout.rank(1)).unwrap();
        std::fs::create_dir_all(layout.rank(2)).unwrap();
        touch_executable(&layout.rank(5));
        assert_eq!(layout.locator().locate(), Some(layout.rank(5)));
    }

    #[test]
    fn candidates_follow_priority_order() {
        let layout = Layout::new();
        let candidates = layout.locator().candidates();
        let expected: Vec<PathBuf> = (1..=5).map(|rank| layout.rank(rank)).collect();
        assert_eq!(candidates, expected);
    }

    #[test]
    fn unset_overrides_are_omitted() {
        let config = LauncherConfig::default();
        let platform = Platform::new("windows", "amd64");
        let locator = BinaryLocator::new(&config, &platform, "/data");
        assert_eq!(
            locator.candidates(),
            vec![PathBuf::from("/data/bin/github-mcp-server.exe")]
        );
        assert_eq!(locator.install_dir(), PathBuf::from("/data/bin"));
    }
}
