//! Raw introspection payload, as handed over by the schema introspection
//! collaborator (MySQL `DESCRIBE` + key usage, or MongoDB document sampling).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Mysql,
    Mongodb,
}

impl DatabaseKind {
    /// Field name that conventionally identifies a record of this kind.
    pub const fn conventional_identifier(self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "id",
            DatabaseKind::Mongodb => "_id",
        }
    }

    pub const fn is_document(self) -> bool {
        matches!(self, DatabaseKind::Mongodb)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Mongodb => "mongodb",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "MySQL",
            DatabaseKind::Mongodb => "MongoDB",
        }
    }

    /// Environment variable a generated service reads its connection string from.
    pub const fn url_env(self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "DATABASE_URL",
            DatabaseKind::Mongodb => "MONGODB_URI",
        }
    }

    /// Local-development connection string for database `name`.
    pub fn default_url(self, name: &str) -> String {
        match self {
            DatabaseKind::Mysql => format!("mysql://root@localhost:3306/{name}"),
            DatabaseKind::Mongodb => format!("mongodb://localhost:27017/{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    pub database: DatabaseKind,
    #[serde(default)]
    pub resources: Vec<RawResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,
    /// Column type (`varchar(255)`) or single sampled document type.
    #[serde(default, alias = "type")]
    pub raw_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    /// Raw name of the referenced table for foreign-key columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    /// Every type observed while sampling documents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sampled_types: Vec<String>,
}

impl RawField {
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        RawField {
            name: name.into(),
            raw_type: raw_type.into(),
            ..Default::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>) -> Self {
        self.references = Some(table.into());
        self
    }
}
