//! # Artifact Packager
//!
//! Collects rendered files into an ordered, path-unique [`ArtifactBundle`] and
//! serializes it deterministically: fixed file order, fixed archive metadata,
//! and a content digest that changes only when a byte of output changes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{GenerationError, Result};

/// Archive entry mode for every file.
pub const FILE_MODE: u32 = 0o644;

/// One file of a generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Relative, `/`-separated path.
    pub path: String,
    pub content: Vec<u8>,
    pub is_binary: bool,
}

impl ArtifactFile {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        ArtifactFile {
            path: path.into(),
            content: content.into().into_bytes(),
            is_binary: false,
        }
    }

    pub fn binary(path: impl Into<String>, content: Vec<u8>) -> Self {
        ArtifactFile {
            path: path.into(),
            content,
            is_binary: true,
        }
    }

    /// Content as text, for non-binary files.
    pub fn as_text(&self) -> Option<&str> {
        if self.is_binary {
            None
        } else {
            std::str::from_utf8(&self.content).ok()
        }
    }
}

/// Listing entry of a bundle file, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub path: String,
    pub bytes: usize,
    pub is_binary: bool,
}

/// Ordered set of project files; paths are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactBundle {
    files: Vec<ArtifactFile>,
}

impl ArtifactBundle {
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    pub fn files(&self) -> &[ArtifactFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn summary(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|f| FileSummary {
                path: f.path.clone(),
                bytes: f.content.len(),
                is_binary: f.is_binary,
            })
            .collect()
    }

    /// Lowercase hex SHA-256 over every `(path, is_binary, content)` in bundle order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            write_framed(&mut hasher, file.path.as_bytes());
            hasher.update([u8::from(file.is_binary)]);
            write_framed(&mut hasher, &file.content);
        }
        let bytes: [u8; 32] = hasher.finalize().into();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Serialize to an uncompressed tar archive.
    ///
    /// Every entry gets mode `0644`, uid/gid 0, empty owner names and the
    /// given `mtime`, so equal bundles produce equal archives.
    pub fn to_tar(&self, mtime: u64) -> Result<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        for file in &self.files {
            let mut header = tar::Header::new_gnu();
            header.set_size(file.content.len() as u64);
            header.set_mode(FILE_MODE);
            header.set_mtime(mtime);
            header.set_uid(0);
            header.set_gid(0);
            header.set_entry_type(tar::EntryType::Regular);
            header
                .set_username("")
                .and_then(|_| header.set_groupname(""))
                .map_err(|e| packaging(&file.path, e))?;
            builder
                .append_data(&mut header, &file.path, file.content.as_slice())
                .map_err(|e| packaging(&file.path, e))?;
        }
        builder
            .into_inner()
            .map_err(|e| GenerationError::Packaging(format!("finishing archive: {e}")))
    }

    /// Write every file under `dir`, creating parent directories as needed.
    pub fn write_to_dir(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let target = dir.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
            }
            fs::write(&target, &file.content)
                .with_context(|| format!("writing {}", target.display()))?;
            tracing::debug!(path = %target.display(), bytes = file.content.len(), "file written");
            written.push(target);
        }
        Ok(written)
    }
}

fn write_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn packaging(path: &str, err: impl std::fmt::Display) -> GenerationError {
    GenerationError::Packaging(format!("{path}: {err}"))
}

/// Accumulates files in insertion order, rejecting duplicate or unsafe paths.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    files: Vec<ArtifactFile>,
}

impl BundleBuilder {
    pub fn add(&mut self, file: ArtifactFile) -> Result<&mut Self> {
        validate_path(&file.path)?;
        if self.files.iter().any(|f| f.path == file.path) {
            return Err(GenerationError::Packaging(format!(
                "duplicate path {}",
                file.path
            )));
        }
        self.files.push(file);
        Ok(self)
    }

    pub fn add_text(
        &mut self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<&mut Self> {
        self.add(ArtifactFile::text(path, content))
    }

    pub fn build(self) -> ArtifactBundle {
        ArtifactBundle { files: self.files }
    }
}

fn validate_path(path: &str) -> Result<()> {
    let unsafe_segment = path
        .split('/')
        .any(|s| s.is_empty() || s == "." || s == "..");
    if path.starts_with('/') || path.contains('\\') || unsafe_segment {
        return Err(GenerationError::Packaging(format!(
            "{path} is not a relative project path"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Read;

    fn sample() -> ArtifactBundle {
        let mut builder = ArtifactBundle::builder();
        builder
            .add_text("app.py", "print('hi')\n")
            .unwrap()
            .add_text("routes/donor.py", "routes\n")
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_duplicate_path_is_packaging_error() {
        let mut builder = ArtifactBundle::builder();
        builder.add_text("app.py", "a").unwrap();
        let err = builder.add_text("app.py", "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PackagingError);
    }

    #[test]
    fn test_unsafe_paths_rejected() {
        for path in ["/etc/passwd", "../up", "a//b", "a\\b", ""] {
            let mut builder = ArtifactBundle::builder();
            assert!(builder.add_text(path, "x").is_err(), "{path:?}");
        }
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = sample();
        assert_eq!(a.digest(), sample().digest());
        assert_eq!(a.digest().len(), 64);

        let mut builder = ArtifactBundle::builder();
        builder
            .add_text("app.py", "print('hi')\n")
            .unwrap()
            .add_text("routes/donor.py", "routes!\n")
            .unwrap();
        assert_ne!(a.digest(), builder.build().digest());
    }

    #[test]
    fn test_tar_is_deterministic() {
        let first = sample().to_tar(0).unwrap();
        let second = sample().to_tar(0).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, sample().to_tar(1_700_000_000).unwrap());
    }

    #[test]
    fn test_tar_entries_keep_order_and_metadata() {
        let archive_bytes = sample().to_tar(42).unwrap();
        let mut archive = tar::Archive::new(archive_bytes.as_slice());
        let mut seen = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let header = entry.header();
            assert_eq!(header.mode().unwrap(), FILE_MODE);
            assert_eq!(header.mtime().unwrap(), 42);
            assert_eq!(header.uid().unwrap(), 0);
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let mut body = String::new();
            entry.read_to_string(&mut body).unwrap();
            seen.push((path, body));
        }
        assert_eq!(
            seen,
            vec![
                ("app.py".to_string(), "print('hi')\n".to_string()),
                ("routes/donor.py".to_string(), "routes\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let written = sample().write_to_dir(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        let body = fs::read_to_string(dir.path().join("routes/donor.py")).unwrap();
        assert_eq!(body, "routes\n");
    }
}
