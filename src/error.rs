//! # Error Module
//!
//! Every fatal condition the engine can hit is a [`GenerationError`]. A fatal
//! error aborts the whole generation: no partially rendered bundle ever leaves
//! [`crate::engine::generate`]. Non-fatal conditions are collected as
//! [`crate::diagnostics::GenerationWarning`] instead.
//!
//! | Kind                        | Raised by                        |
//! |-----------------------------|----------------------------------|
//! | `SchemaError`               | normalizer, schema sources       |
//! | `UnsupportedTypeError`      | type mapper (strict mode)        |
//! | `NameCollisionUnresolvable` | identifier resolver (invariant)  |
//! | `RenderError`               | template renderer                |
//! | `PackagingError`            | artifact packager                |
//! | `InvalidRequest`            | request validation               |

use serde::Serialize;
use thiserror::Error;

/// Stable, serializable name of an error variant (the `errorKind` of a failed report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    SchemaError,
    UnsupportedTypeError,
    NameCollisionUnresolvable,
    RenderError,
    PackagingError,
    InvalidRequest,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::SchemaError => "SchemaError",
            ErrorKind::UnsupportedTypeError => "UnsupportedTypeError",
            ErrorKind::NameCollisionUnresolvable => "NameCollisionUnresolvable",
            ErrorKind::RenderError => "RenderError",
            ErrorKind::PackagingError => "PackagingError",
            ErrorKind::InvalidRequest => "InvalidRequest",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("unsupported type for {resource}.{field}: {logical_type} has no mapping for {family}")]
    UnsupportedType {
        resource: String,
        field: String,
        logical_type: String,
        family: String,
    },

    #[error("unresolvable name collision in {scope}: {name}")]
    NameCollision { scope: String, name: String },

    #[error("render error in {path}: {message}")]
    Render { path: String, message: String },

    #[error("packaging error: {0}")]
    Packaging(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Schema(_) => ErrorKind::SchemaError,
            GenerationError::UnsupportedType { .. } => ErrorKind::UnsupportedTypeError,
            GenerationError::NameCollision { .. } => ErrorKind::NameCollisionUnresolvable,
            GenerationError::Render { .. } => ErrorKind::RenderError,
            GenerationError::Packaging(_) => ErrorKind::PackagingError,
            GenerationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub(crate) fn render(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        GenerationError::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
