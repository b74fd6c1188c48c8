//! # crudforge
//!
//! **crudforge** turns a snapshot of a database schema (relational tables or
//! sampled document collections) into a complete, runnable CRUD service for
//! one of three web framework families, with optional token auth and an
//! OpenAPI 3.1 document.
//!
//! ## Overview
//!
//! Generation is a pure function of its request: the same schema, selection,
//! family and options always yield a byte-identical [`ArtifactBundle`]. The
//! engine never touches the file system; exporting a finished bundle is the
//! job of an [`ExportTarget`].
//!
//! ## Architecture
//!
//! - **[`schema`]** - raw introspection payloads and the normalizer
//! - **[`typemap`]** - logical types to per-family type expressions
//! - **[`naming`]** - collision-free identifiers per family
//! - **[`routes`]** - CRUD route synthesis and the auth scaffolder
//! - **[`docs`]** - OpenAPI 3.1 document synthesis
//! - **[`render`]** - family templates and file layout
//! - **[`bundle`]** - ordered artifact bundle, digest and tar archive
//! - **[`engine`]** - the stage pipeline and the generation report
//! - **[`export`]** - project records and export targets
//! - **[`config`]** - `crudforge.toml` and environment overrides
//! - **[`cli`]** - the `crudforge-gen` binary
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(crudforge-gen)
//!     participant Norm as schema::normalize
//!     participant Engine as engine::generate
//!     participant Render as render::render
//!     participant Target as ExportTarget
//!
//!     CLI->>Norm: RawSchema
//!     Norm-->>CLI: SchemaModel + warnings
//!     CLI->>Engine: GenerationRequest
//!     Engine->>Engine: validate, type check,<br/>resolve names, synthesize routes
//!     Engine->>Engine: scaffold auth, synthesize docs
//!     Engine->>Render: RenderInput
//!     Render-->>Engine: files in layout order
//!     Engine-->>CLI: GenerationOutcome (bundle)
//!     CLI->>Target: ship(project_id, bundle)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crudforge::{generate, normalize, FileSchemaSource, GenerationRequest, SchemaSource, TargetFamily};
//!
//! # fn main() -> anyhow::Result<()> {
//! let raw = FileSchemaSource::new("schema.json").fetch()?;
//! let schema = normalize(&raw)?.schema;
//! let request = GenerationRequest::new(schema, ["donor"], TargetFamily::AsyncRouted).with_docs(true);
//! let outcome = generate(&request)?;
//! println!("{} files, digest {}", outcome.bundle.len(), outcome.digest());
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod docs;
pub mod engine;
pub mod error;
pub mod export;
pub mod family;
pub mod naming;
pub mod render;
pub mod request;
pub mod routes;
pub mod schema;
pub mod typemap;

pub use bundle::{ArtifactBundle, ArtifactFile, FileSummary};
pub use diagnostics::{GenerationWarning, WarningKind};
pub use engine::{generate, generate_with_schema_warnings, GenerationOutcome, GenerationReport};
pub use error::{ErrorKind, GenerationError};
pub use export::{ArchiveTarget, DirectoryTarget, ExportReceipt, ExportTarget, ProjectRecord, ProjectStatus};
pub use family::TargetFamily;
pub use request::{AuthConfig, GenerationOptions, GenerationRequest, MethodPolicy, UpdatePolicy};
pub use routes::{CrudMethod, RouteSpec};
pub use schema::{normalize, DatabaseKind, FileSchemaSource, RawSchema, SchemaModel, SchemaSource};
pub use typemap::TypeMapper;
