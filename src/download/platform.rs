//! Platform identifiers used to match release asset names

use std::fmt;

/// Target OS/arch in release-naming form (`linux`, `darwin`, `windows` / `amd64`, `arm64`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Detect the platform this launcher was compiled for
    pub fn detect() -> Self {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build an arbitrary target, e.g. `Platform::new("darwin", "arm64")`
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().to_lowercase(),
            arch: arch.into().to_lowercase(),
        }
    }

    fn from_consts(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_darwin(&self) -> bool {
        self.os == "darwin"
    }

    pub fn is_amd64(&self) -> bool {
        self.arch == "amd64"
    }

    /// File name of the helper binary on this platform (`.exe` on Windows)
    pub fn binary_file_name(&self, base_name: &str) -> String {
        if self.is_windows() {
            format!("{base_name}.exe")
        } else {
            base_name.to_string()
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
