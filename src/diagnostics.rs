//! Non-fatal findings reported next to a successful generation.
//!
//! Shaped after the linter's issue records: a location (resource + optional
//! field), a machine-readable kind and a human message.

use serde::Serialize;

/// What produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An `unknown` type was rendered with the family's permissive fallback.
    TypeFallback,
    /// A name collided and was suffixed.
    NameSuffixed,
    /// A name clashed with a target keyword and was escaped.
    KeywordEscaped,
    /// Extra primary-key columns were demoted.
    CompositeKey,
    /// A foreign key points at a resource that is not in the payload.
    DanglingReference,
    /// A relational resource has no primary key; a synthetic row id is used.
    SyntheticKey,
}

/// A warning entry of the output contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationWarning {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    pub kind: WarningKind,
    pub message: String,
}

impl GenerationWarning {
    pub fn resource(
        resource: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        GenerationWarning {
            resource_name: resource.into(),
            field_name: None,
            kind,
            message: message.into(),
        }
    }

    pub fn field(
        resource: impl Into<String>,
        field: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        GenerationWarning {
            resource_name: resource.into(),
            field_name: Some(field.into()),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field_name {
            Some(field) => write!(f, "{}.{}: {}", self.resource_name, field, self.message),
            None => write!(f, "{}: {}", self.resource_name, self.message),
        }
    }
}

/// Log a batch of warnings through `tracing`.
pub fn log_warnings(warnings: &[GenerationWarning]) {
    for w in warnings {
        tracing::warn!(kind = ?w.kind, "{w}");
    }
}
