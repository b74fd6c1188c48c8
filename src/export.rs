//! Project bookkeeping and hand-off of finished bundles.
//!
//! The engine never writes anywhere itself. A [`ProjectRecord`] tracks one
//! generation through `draft → generated → exported | failed`, and an
//! [`ExportTarget`] receives the bundle only after it is complete.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Serialize;

use crate::bundle::ArtifactBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    Draft,
    Generated,
    Exported,
    Failed,
}

impl ProjectStatus {
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Draft, Generated) | (Draft, Failed) | (Generated, Exported) | (Generated, Failed)
        )
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Generated => "generated",
            ProjectStatus::Exported => "exported",
            ProjectStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Opaque id plus lifecycle status of one generated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    id: String,
    status: ProjectStatus,
}

impl ProjectRecord {
    pub fn new(id: impl Into<String>) -> Self {
        ProjectRecord {
            id: id.into(),
            status: ProjectStatus::Draft,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    fn advance(&mut self, next: ProjectStatus) -> anyhow::Result<()> {
        if !self.status.can_transition_to(next) {
            bail!(
                "project {} cannot move from {} to {}",
                self.id,
                self.status,
                next
            );
        }
        tracing::debug!(project = %self.id, from = %self.status, to = %next, "project status");
        self.status = next;
        Ok(())
    }

    pub fn mark_generated(&mut self) -> anyhow::Result<()> {
        self.advance(ProjectStatus::Generated)
    }

    pub fn mark_exported(&mut self) -> anyhow::Result<()> {
        self.advance(ProjectStatus::Exported)
    }

    pub fn mark_failed(&mut self) -> anyhow::Result<()> {
        self.advance(ProjectStatus::Failed)
    }
}

/// What a target reports after shipping a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub project_id: String,
    pub location: PathBuf,
    pub files: usize,
}

/// Destination for finished bundles.
pub trait ExportTarget {
    fn ship(&self, project_id: &str, bundle: &ArtifactBundle) -> anyhow::Result<ExportReceipt>;
}

/// Writes the project tree into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
    overwrite: bool,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryTarget {
            root: root.into(),
            overwrite: false,
        }
    }

    /// Allow writing into a non-empty directory.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

fn is_non_empty_dir(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let mut entries =
        fs::read_dir(path).with_context(|| format!("reading directory {}", path.display()))?;
    Ok(entries.next().is_some())
}

impl ExportTarget for DirectoryTarget {
    fn ship(&self, project_id: &str, bundle: &ArtifactBundle) -> anyhow::Result<ExportReceipt> {
        if !self.overwrite && is_non_empty_dir(&self.root)? {
            bail!(
                "{} is not empty; pass --force to write into it",
                self.root.display()
            );
        }
        let written = bundle.write_to_dir(&self.root)?;
        tracing::info!(project = project_id, dir = %self.root.display(), files = written.len(), "project exported");
        Ok(ExportReceipt {
            project_id: project_id.to_string(),
            location: self.root.clone(),
            files: written.len(),
        })
    }
}

/// Writes the bundle as one deterministic tar archive.
#[derive(Debug, Clone)]
pub struct ArchiveTarget {
    path: PathBuf,
    mtime: u64,
}

impl ArchiveTarget {
    pub fn new(path: impl Into<PathBuf>, mtime: u64) -> Self {
        ArchiveTarget {
            path: path.into(),
            mtime,
        }
    }
}

impl ExportTarget for ArchiveTarget {
    fn ship(&self, project_id: &str, bundle: &ArtifactBundle) -> anyhow::Result<ExportReceipt> {
        let archive = bundle.to_tar(self.mtime)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        fs::write(&self.path, &archive)
            .with_context(|| format!("writing archive {}", self.path.display()))?;
        tracing::info!(project = project_id, archive = %self.path.display(), bytes = archive.len(), "project exported");
        Ok(ExportReceipt {
            project_id: project_id.to_string(),
            location: self.path.clone(),
            files: bundle.len(),
        })
    }
}
