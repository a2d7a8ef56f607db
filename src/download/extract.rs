//! Payload extraction for release assets
//!
//! Handles `.zip`, `.tar.gz` and bare binaries. The matching entry is found
//! before the target is created, so a miss never leaves a file behind.

use std::fs::File;
use std::io;
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;
use tar::{Archive, EntryType};
use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::error::{LaunchError, Result};

/// Container format of a downloaded asset, decided by its URL suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    Zip,
    TarGz,
    Raw,
}

impl PackageFormat {
    /// Query strings and fragments are ignored when `url` parses
    pub fn from_url(url: &str) -> Self {
        let path = url::Url::parse(url)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or_else(|_| url.to_string());

        if path.ends_with(".zip") {
            PackageFormat::Zip
        } else if path.ends_with(".tar.gz") {
            PackageFormat::TarGz
        } else {
            PackageFormat::Raw
        }
    }
}

/// Extract the first non-directory zip entry whose name contains `binary_name`
pub fn extract_from_zip(zip_path: &Path, binary_name: &str, target: &Path) -> Result<()> {
    let zip_file = File::open(zip_path)
        .map_err(|e| LaunchError::fs("failed to open downloaded archive", zip_path, e))?;
    let mut archive = ZipArchive::new(zip_file)?;

    let mut index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name().contains(binary_name) && !entry.is_dir() {
            info!("Extracting {} from zip", entry.name());
            index = Some(i);
            break;
        }
    }

    let Some(index) = index else {
        return Err(LaunchError::BinaryNotInArchive { format: "zip" });
    };

    let mut entry = archive.by_index(index)?;
    let mut outfile = File::create(target)
        .map_err(|e| LaunchError::fs("failed to create binary", target, e))?;
    io::copy(&mut entry, &mut outfile)
        .map_err(|e| LaunchError::fs("failed to extract binary", target, e))?;

    Ok(())
}

/// Extract the first regular-file tar entry whose path contains `binary_name`
pub fn extract_from_tar_gz(tar_path: &Path, binary_name: &str, target: &Path) -> Result<()> {
    let tar_gz_file = File::open(tar_path)
        .map_err(|e| LaunchError::fs("failed to open downloaded archive", tar_path, e))?;
    let mut archive = Archive::new(GzDecoder::new(tar_gz_file));

    let tar_err = |source: io::Error| LaunchError::Archive {
        format: "tar.gz",
        source,
    };

    for entry in archive.entries().map_err(tar_err)? {
        let mut entry = entry.map_err(tar_err)?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }

        let name = entry.path().map_err(tar_err)?.to_string_lossy().into_owned();
        if !name.contains(binary_name) {
            continue;
        }

        info!("Extracting {name} from tar.gz");
        let mut outfile = File::create(target)
            .map_err(|e| LaunchError::fs("failed to create binary", target, e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| LaunchError::fs("failed to extract binary", target, e))?;
        return Ok(());
    }

    Err(LaunchError::BinaryNotInArchive { format: "tar.gz" })
}

/// Write the payload of `download` to `target` according to `format`
///
/// A raw download is renamed into place; archives are read and the temp file
/// is removed when `download` drops.
pub fn install_payload(
    download: NamedTempFile,
    format: PackageFormat,
    binary_name: &str,
    target: &Path,
) -> Result<()> {
    match format {
        PackageFormat::Zip => extract_from_zip(download.path(), binary_name, target),
        PackageFormat::TarGz => extract_from_tar_gz(download.path(), binary_name, target),
        PackageFormat::Raw => {
            download
                .persist(target)
                .map_err(|e| LaunchError::fs("failed to move binary into place", target, e.error))?;
            Ok(())
        }
    }
}

/// Mark `path` executable (0755 on unix)
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| LaunchError::fs("failed to make binary executable", path, e))?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const PAYLOAD: &str = "\x7fELF fake github-mcp-server payload";

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn format_follows_url_suffix() {
        assert_eq!(PackageFormat::from_url("https://x/a/server_Linux_x86_64.tar.gz"), PackageFormat::TarGz);
        assert_eq!(PackageFormat::from_url("https://x/a/server_Windows_x86_64.zip"), PackageFormat::Zip);
        assert_eq!(PackageFormat::from_url("https://x/a/server.zip?token=1"), PackageFormat::Zip);
        assert_eq!(PackageFormat::from_url("https://x/a/server-linux-amd64"), PackageFormat::Raw);
        assert_eq!(PackageFormat::from_url("not a url.tar.gz"), PackageFormat::TarGz);
    }

    #[test]
    fn zip_entry_round_trips_with_exec_bit() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("asset.zip");
        let target = dir.path().join("github-mcp-server");
        write_zip(
            &archive,
            &[("README.md", "docs"), ("bin/", ""), ("bin/github-mcp-server", PAYLOAD)],
        );

        extract_from_zip(&archive, "github-mcp-server", &target).unwrap();
        make_executable(&target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), PAYLOAD.as_bytes());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn zip_without_binary_is_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("asset.zip");
        let target = dir.path().join("github-mcp-server");
        write_zip(&archive, &[("LICENSE", "MIT")]);

        let err = extract_from_zip(&archive, "github-mcp-server", &target).unwrap_err();
        assert!(matches!(err, LaunchError::BinaryNotInArchive { format: "zip" }));
        assert!(!target.exists());
    }

    #[test]
    fn tar_gz_entry_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("asset.tar.gz");
        let target = dir.path().join("out");
        write_tar_gz(
            &archive,
            &[("LICENSE", "MIT"), ("github-mcp-server_Linux/github-mcp-server", PAYLOAD)],
        );

        extract_from_tar_gz(&archive, "github-mcp-server", &target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), PAYLOAD.as_bytes());
    }

    #[test]
    fn tar_gz_without_binary_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("asset.tar.gz");
        let target = dir.path().join("github-mcp-server");
        write_tar_gz(&archive, &[("LICENSE", "MIT"), ("README.md", "docs")]);

        let err = extract_from_tar_gz(&archive, "github-mcp-server", &target).unwrap_err();
        assert_eq!(err.to_string(), "binary not found in tar.gz");
        assert!(!target.exists());
    }

    #[test]
    fn corrupt_tar_gz_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("asset.tar.gz");
        std::fs::write(&archive, b"definitely not gzip").unwrap();

        let err = extract_from_tar_gz(&archive, "github-mcp-server", &dir.path().join("t"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Archive { format: "tar.gz", .. }));
    }

    #[test]
    fn raw_payload_is_moved_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("github-mcp-server");
        let mut download = NamedTempFile::new_in(dir.path()).unwrap();
        download.write_all(PAYLOAD.as_bytes()).unwrap();
        let temp_path = download.path().to_path_buf();

        install_payload(download, PackageFormat::Raw, "github-mcp-server", &target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), PAYLOAD.as_bytes());
        assert!(!temp_path.exists());
    }

    #[test]
    fn archive_temp_file_is_removed_after_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("github-mcp-server");
        let download = NamedTempFile::new_in(dir.path()).unwrap();
        write_zip(download.path(), &[("github-mcp-server", PAYLOAD)]);
        let temp_path = download.path().to_path_buf();

        install_payload(download, PackageFormat::Zip, "github-mcp-server", &target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), PAYLOAD.as_bytes());
        assert!(!temp_path.exists());
    }
}
