use std::path::{Path, PathBuf};

use super::raw::RawSchema;
use crate::error::{GenerationError, Result};

/// Anything that can hand over an introspection snapshot.
///
/// Live database introspection sits behind this trait; whatever goes wrong
/// there reaches the engine as "no schema available", i.e. a `SchemaError`.
pub trait SchemaSource {
    fn fetch(&self) -> Result<RawSchema>;
}

impl SchemaSource for RawSchema {
    fn fetch(&self) -> Result<RawSchema> {
        Ok(self.clone())
    }
}

/// Reads a snapshot from a JSON or YAML file (`.yaml`/`.yml` → YAML).
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSchemaSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for FileSchemaSource {
    fn fetch(&self) -> Result<RawSchema> {
        let unavailable = |e: &dyn std::fmt::Display| {
            GenerationError::Schema(format!(
                "no schema available from {}: {e}",
                self.path.display()
            ))
        };
        let content = std::fs::read_to_string(&self.path).map_err(|e| unavailable(&e))?;
        parse_schema(&content, is_yaml(&self.path)).map_err(|e| unavailable(&e))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse payload text in either format.
pub fn parse_schema(content: &str, yaml: bool) -> anyhow::Result<RawSchema> {
    let schema = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(schema)
}
