use serde::{Deserialize, Serialize};

use super::raw::DatabaseKind;

/// Whether a resource came from a SQL table or a document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Relational,
    Document,
}

/// Canonical field type, independent of database and target framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "camelCase")]
pub enum LogicalType {
    Integer,
    Float,
    Text,
    Boolean,
    Datetime,
    Identifier,
    /// Foreign key; carries the resolved name of the referenced resource.
    Reference(String),
    Unknown,
}

/// Payload-free discriminant of [`LogicalType`]; the row key of the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalKind {
    Integer,
    Float,
    Text,
    Boolean,
    Datetime,
    Identifier,
    Reference,
    Unknown,
}

impl LogicalType {
    pub fn kind(&self) -> LogicalKind {
        match self {
            LogicalType::Integer => LogicalKind::Integer,
            LogicalType::Float => LogicalKind::Float,
            LogicalType::Text => LogicalKind::Text,
            LogicalType::Boolean => LogicalKind::Boolean,
            LogicalType::Datetime => LogicalKind::Datetime,
            LogicalType::Identifier => LogicalKind::Identifier,
            LogicalType::Reference(_) => LogicalKind::Reference,
            LogicalType::Unknown => LogicalKind::Unknown,
        }
    }

    pub fn reference_target(&self) -> Option<&str> {
        match self {
            LogicalType::Reference(target) => Some(target),
            _ => None,
        }
    }
}

impl LogicalKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicalKind::Integer => "integer",
            LogicalKind::Float => "float",
            LogicalKind::Text => "text",
            LogicalKind::Boolean => "boolean",
            LogicalKind::Datetime => "datetime",
            LogicalKind::Identifier => "identifier",
            LogicalKind::Reference => "reference",
            LogicalKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalType::Reference(target) => write!(f, "reference({target})"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub raw_name: String,
    /// Wire name: lowercase, separator-normalized, unique within the resource.
    pub resolved_name: String,
    /// Type string exactly as introspection reported it.
    #[serde(default)]
    pub raw_type: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub is_primary_key: bool,
    /// Value is assigned by the server (auto increment, document id).
    #[serde(default)]
    pub server_generated: bool,
}

/// The key a resource is addressed by in `/{key}` routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKey {
    pub name: String,
    pub logical_type: LogicalType,
    pub server_generated: bool,
    /// No declared column backs this key; the generated store assigns it.
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub raw_name: String,
    pub resolved_name: String,
    pub kind: ResourceKind,
    pub fields: Vec<Field>,
    /// Index into `fields` of the primary-key field, if one is declared.
    pub primary_key_field: Option<usize>,
    pub key: ResourceKey,
}

impl Resource {
    pub fn primary_key(&self) -> Option<&Field> {
        self.primary_key_field.and_then(|i| self.fields.get(i))
    }

    /// Fields other than the primary key, in declaration order.
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_primary_key)
    }
}

/// Canonical, normalized schema: resources in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    /// Kind of database the snapshot was taken from.
    #[serde(default)]
    pub database: DatabaseKind,
    pub resources: Vec<Resource>,
}

impl SchemaModel {
    /// Look a resource up by resolved name, falling back to an exact raw-name match.
    pub fn find(&self, name: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| r.resolved_name == name)
            .or_else(|| self.resources.iter().find(|r| r.raw_name == name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.resolved_name.as_str())
    }
}
