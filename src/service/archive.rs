use crate::util::name::archive_dir_name;
use log::{debug, info};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;

/// Largest file GitHub accepts, 95 MiB.
pub const GITHUB_MAX_FILE_SIZE: usize = 99614720;

const ZONE_SUFFIX: &str = "zone";
const GZIP_SUFFIX: &str = ".gz";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("refusing unsafe file name {0:?}")]
    UnsafeName(String),
    #[error("unable to write {0}: {1}")]
    Io(PathBuf, io::Error),
    #[error("gzip failed on {0}: {1}")]
    Compression(PathBuf, ExitStatus),
}

#[derive(Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub compressed: bool,
}

/// Writes zone data to `<root>/<domain>/<nameserver>zone`, gzipped in place
/// when larger than the threshold.
pub struct Archiver {
    root: PathBuf,
    compress_threshold: usize,
}

impl Archiver {
    pub fn new(root: PathBuf, compress_threshold: usize) -> Self {
        Self {
            root,
            compress_threshold,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn needs_compression(&self, payload_len: usize) -> bool {
        payload_len > self.compress_threshold
    }

    pub fn zone_path(&self, domain: &str, nameserver: &str) -> Result<PathBuf, ArchiveError> {
        let dir = archive_dir_name(domain);
        for part in [dir.as_str(), nameserver] {
            if part.is_empty() || part.contains('/') || part.contains('\\') || part.starts_with("..") {
                return Err(ArchiveError::UnsafeName(part.to_string()));
            }
        }
        Ok(self.root.join(dir).join(format!("{}{}", nameserver, ZONE_SUFFIX)))
    }

    pub async fn archive(&self, domain: &str, nameserver: &str, payload: &str) -> Result<ArchiveEntry, ArchiveError> {
        let path = self.zone_path(domain, nameserver)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ArchiveError::Io(dir.to_path_buf(), e))?;
        }
        fs::write(&path, payload)
            .await
            .map_err(|e| ArchiveError::Io(path.clone(), e))?;
        if !self.needs_compression(payload.len()) {
            debug!("Archived {} bytes to {}", payload.len(), path.display());
            return Ok(ArchiveEntry {
                path,
                compressed: false,
            });
        }
        info!("Compressing {} ({} bytes)", path.display(), payload.len());
        let status = Command::new("gzip")
            .arg("-f")
            .arg(&path)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| ArchiveError::Io(path.clone(), e))?;
        if !status.success() {
            return Err(ArchiveError::Compression(path, status));
        }
        let mut compressed = OsString::from(path);
        compressed.push(GZIP_SUFFIX);
        Ok(ArchiveEntry {
            path: PathBuf::from(compressed),
            compressed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_zone_path() {
        let archiver = Archiver::new(PathBuf::from("archives"), GITHUB_MAX_FILE_SIZE);
        assert_eq!(
            archiver.zone_path(".", "a.root-servers.net.").unwrap(),
            PathBuf::from("archives/root/a.root-servers.net.zone")
        );
        assert_eq!(
            archiver.zone_path("example.com.", "ns1.example.com.").unwrap(),
            PathBuf::from("archives/example.com/ns1.example.com.zone")
        );
        assert!(archiver.zone_path("com.", "../../etc/passwd").is_err());
        assert!(archiver.zone_path("com.", "").is_err());
    }

    #[test]
    fn test_threshold() {
        let archiver = Archiver::new(PathBuf::from("archives"), GITHUB_MAX_FILE_SIZE);
        assert!(!archiver.needs_compression(GITHUB_MAX_FILE_SIZE));
        assert!(archiver.needs_compression(GITHUB_MAX_FILE_SIZE + 1));
    }

    #[tokio::test]
    async fn test_small_payload_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let archiver = Archiver::new(dir.path().join("archives"), 1024);
        let payload = "example.\t3600\tIN\tSOA\tns1.example. admin.example. 1 7200 3600 1209600 3600\n";
        let entry = archiver.archive("example.", "ns2.example.", payload).await.unwrap();
        assert!(!entry.compressed);
        assert_eq!(entry.path, dir.path().join("archives/example/ns2.example.zone"));
        assert_eq!(std::fs::read_to_string(&entry.path).unwrap(), payload);

        // the directory already exists the second time round
        let again = archiver.archive("example.", "ns1.example.", payload).await.unwrap();
        assert!(again.path.exists());
    }

    #[tokio::test]
    async fn test_large_payload_compressed_in_place() {
        let dir = TempDir::new().unwrap();
        let archiver = Archiver::new(dir.path().to_path_buf(), 16);
        let payload = "com.\t172800\tIN\tNS\ta.gtld-servers.net.\n".repeat(8);
        let entry = archiver.archive("com.", "a.gtld-servers.net.", &payload).await.unwrap();
        assert!(entry.compressed);
        assert_eq!(entry.path, dir.path().join("com/a.gtld-servers.net.zone.gz"));
        assert!(entry.path.exists());
        assert!(!dir.path().join("com/a.gtld-servers.net.zone").exists());
        let bytes = std::fs::read(&entry.path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let unpacked = std::process::Command::new("gzip")
            .arg("-dc")
            .arg(&entry.path)
            .output()
            .unwrap();
        assert!(unpacked.status.success());
        assert_eq!(unpacked.stdout, payload.as_bytes());
    }

    #[tokio::test]
    async fn test_payload_at_threshold_stays_plain() {
        let dir = TempDir::new().unwrap();
        let payload = "org.\t86400\tIN\tNS\ta0.org.afilias-nst.info.\n";
        let archiver = Archiver::new(dir.path().to_path_buf(), payload.len());
        let entry = archiver.archive("org.", "a0.org.afilias-nst.info.", payload).await.unwrap();
        assert!(!entry.compressed);
        assert_eq!(entry.path, dir.path().join("org/a0.org.afilias-nst.info.zone"));
        assert_eq!(std::fs::read_to_string(&entry.path).unwrap(), payload);

        let bigger = format!("{};\n", payload);
        let entry = archiver.archive("org.", "b0.org.afilias-nst.org.", &bigger).await.unwrap();
        assert!(entry.compressed);
    }

    #[tokio::test]
    async fn test_unwritable_root() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("archives");
        std::fs::write(&blocker, "not a directory").unwrap();
        let archiver = Archiver::new(blocker, GITHUB_MAX_FILE_SIZE);
        let result = archiver.archive(".", "a.root-servers.net.", "data").await;
        assert!(matches!(result, Err(ArchiveError::Io(_, _))));
    }
}
