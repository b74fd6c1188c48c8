//! # Schema Normalizer
//!
//! Converts a [`RawSchema`] (SQL column metadata or sampled document fields)
//! into the canonical [`SchemaModel`].
//!
//! Policies applied here:
//!
//! - raw column/BSON types are mapped through one case-insensitive table;
//!   anything unrecognized becomes [`LogicalType::Unknown`] and is **kept**
//! - relational primary keys map straight to `is_primary_key`; only the first
//!   one counts
//! - document collections are keyed by `_id`, synthesized when not sampled
//! - resource and field names are resolved through a [`NameScope`] so they
//!   are unique in declaration order
//!
//! Unknown types produce no warning here: whether they are a problem depends
//! on the target family, which the engine decides later.

use super::raw::{DatabaseKind, RawField, RawResource, RawSchema};
use super::types::{Field, LogicalType, Resource, ResourceKey, ResourceKind, SchemaModel};
use crate::diagnostics::{GenerationWarning, WarningKind};
use crate::error::{GenerationError, Result};
use crate::naming::{snake_name, NameScope};


/// Normalized schema plus the non-fatal findings made on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub schema: SchemaModel,
    pub warnings: Vec<GenerationWarning>,
}

/// Raw type base name → logical type. Covers MySQL `DESCRIBE` names and the
/// type names reported by document sampling.
const RAW_TYPES: &[(&str, LogicalType)] = &[
    ("int", LogicalType::Integer),
    ("integer", LogicalType::Integer),
    ("smallint", LogicalType::Integer),
    ("mediumint", LogicalType::Integer),
    ("bigint", LogicalType::Integer),
    ("tinyint", LogicalType::Integer),
    ("int32", LogicalType::Integer),
    ("int64", LogicalType::Integer),
    ("long", LogicalType::Integer),
    ("float", LogicalType::Float),
    ("double", LogicalType::Float),
    ("real", LogicalType::Float),
    ("decimal", LogicalType::Float),
    ("numeric", LogicalType::Float),
    ("decimal128", LogicalType::Float),
    ("char", LogicalType::Text),
    ("varchar", LogicalType::Text),
    ("text", LogicalType::Text),
    ("tinytext", LogicalType::Text),
    ("mediumtext", LogicalType::Text),
    ("longtext", LogicalType::Text),
    ("enum", LogicalType::Text),
    ("set", LogicalType::Text),
    ("string", LogicalType::Text),
    ("str", LogicalType::Text),
    ("bool", LogicalType::Boolean),
    ("boolean", LogicalType::Boolean),
    ("date", LogicalType::Datetime),
    ("datetime", LogicalType::Datetime),
    ("timestamp", LogicalType::Datetime),
    ("time", LogicalType::Datetime),
    ("year", LogicalType::Datetime),
    ("uuid", LogicalType::Identifier),
    ("objectid", LogicalType::Identifier),
];

/// Map one raw type string to its logical type.
///
/// Case-insensitive; length/precision parameters and modifiers such as
/// `unsigned` are ignored, except that `tinyint(1)` and `bit(1)` are booleans.
///
/// ```rust
/// use crudforge::schema::{map_raw_type, LogicalType};
/// assert_eq!(map_raw_type("VARCHAR(255)"), LogicalType::Text);
/// assert_eq!(map_raw_type("tinyint(1)"), LogicalType::Boolean);
/// assert_eq!(map_raw_type("int(10) unsigned"), LogicalType::Integer);
/// assert_eq!(map_raw_type("geometry"), LogicalType::Unknown);
/// ```
pub fn map_raw_type(raw_type: &str) -> LogicalType {
    let lower = raw_type.trim().to_ascii_lowercase();
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with("tinyint(1)") || compact.starts_with("bit(1)") {
        return LogicalType::Boolean;
    }
    let base = lower
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    RAW_TYPES
        .iter()
        .find(|(name, _)| *name == base)
        .map(|(_, logical)| logical.clone())
        .unwrap_or(LogicalType::Unknown)
}

/// Logical type and nullability of a sampled document field.
///
/// `null` samples (`NoneType` from Python samplers) only make the field
/// nullable; samples that disagree on the remaining logical type make it
/// `unknown`.
fn map_sampled_types(field: &RawField) -> (LogicalType, bool) {
    let samples: Vec<&str> = if field.sampled_types.is_empty() {
        vec![field.raw_type.as_str()]
    } else {
        field.sampled_types.iter().map(String::as_str).collect()
    };
    let mut nullable = field.nullable;
    let mut distinct: Vec<LogicalType> = Vec::new();
    for sample in samples {
        let sample = sample.trim().to_ascii_lowercase();
        if matches!(sample.as_str(), "null" | "undefined" | "nonetype") {
            nullable = true;
        } else if !sample.is_empty() {
            let logical = map_raw_type(&sample);
            if !distinct.contains(&logical) {
                distinct.push(logical);
            }
        }
    }
    let logical = match distinct.as_slice() {
        [only] => only.clone(),
        _ => LogicalType::Unknown,
    };
    (logical, nullable)
}

/// Find the resolved name of the resource a foreign key points at.
///
/// Exact raw-name match first, then a case-insensitive one.
fn resolve_target(resources: &[RawResource], resolved: &[String], target: &str) -> Option<String> {
    let idx = resources
        .iter()
        .position(|r| r.name == target)
        .or_else(|| {
            resources
                .iter()
                .position(|r| r.name.eq_ignore_ascii_case(target))
        })?;
    resolved.get(idx).cloned()
}

/// Normalize a raw introspection payload.
///
/// Fails with `SchemaError` when there are no resources or a resource
/// has no fields.
pub fn normalize(raw: &RawSchema) -> Result<Normalized> {
    if raw.resources.is_empty() {
        return Err(GenerationError::Schema(
            "introspection payload contains no resources".to_string(),
        ));
    }

    let mut warnings = Vec::new();
    let mut scope = NameScope::new("resources");
    let mut resolved_names = Vec::with_capacity(raw.resources.len());
    for resource in &raw.resources {
        let claim = scope.claim(&snake_name(&resource.name))?;
        if claim.suffixed {
            warnings.push(GenerationWarning::resource(
                &claim.name,
                WarningKind::NameSuffixed,
                format!(
                    "resource '{}' collides with an earlier resource; renamed to {}",
                    resource.name, claim.name
                ),
            ));
        }
        resolved_names.push(claim.name);
    }

    let mut resources = Vec::with_capacity(raw.resources.len());
    for (raw_resource, resolved_name) in raw.resources.iter().zip(&resolved_names) {
        let resource = normalize_resource(
            raw.database,
            raw_resource,
            resolved_name,
            &raw.resources,
            &resolved_names,
            &mut warnings,
        )?;
        resources.push(resource);
    }

    tracing::debug!(
        database = ?raw.database,
        resources = resources.len(),
        warnings = warnings.len(),
        "schema normalized"
    );
    Ok(Normalized {
        schema: SchemaModel {
            database: raw.database,
            resources,
        },
        warnings,
    })
}

fn normalize_resource(
    database: DatabaseKind,
    raw: &RawResource,
    resolved_name: &str,
    all: &[RawResource],
    all_resolved: &[String],
    warnings: &mut Vec<GenerationWarning>,
) -> Result<Resource> {
    if raw.fields.is_empty() {
        return Err(GenerationError::Schema(format!(
            "resource '{}' has no fields",
            raw.name
        )));
    }

    let kind = if database.is_document() {
        ResourceKind::Document
    } else {
        ResourceKind::Relational
    };
    let conventional_id = database.conventional_identifier();
    let mut names = NameScope::new(format!("fields of {resolved_name}"));
    let mut fields = Vec::with_capacity(raw.fields.len() + 1);
    let mut primary_key_field = None;

    for raw_field in &raw.fields {
        let claim = names.claim(&snake_name(&raw_field.name))?;
        if claim.suffixed {
            warnings.push(GenerationWarning::field(
                resolved_name,
                &claim.name,
                WarningKind::NameSuffixed,
                format!(
                    "field '{}' collides with an earlier field; renamed to {}",
                    raw_field.name, claim.name
                ),
            ));
        }

        let (mut logical_type, mut nullable) = match kind {
            ResourceKind::Relational => (map_raw_type(&raw_field.raw_type), raw_field.nullable),
            ResourceKind::Document => map_sampled_types(raw_field),
        };
        if let Some(target) = &raw_field.references {
            match resolve_target(all, all_resolved, target) {
                Some(target) => logical_type = LogicalType::Reference(target),
                None => warnings.push(GenerationWarning::field(
                    resolved_name,
                    &claim.name,
                    WarningKind::DanglingReference,
                    format!("references unknown resource '{target}'; kept as {logical_type}"),
                )),
            }
        }

        let declares_key = match kind {
            ResourceKind::Relational => raw_field.primary_key,
            ResourceKind::Document => raw_field.name == conventional_id,
        };
        let is_primary_key = declares_key && primary_key_field.is_none();
        if declares_key && !is_primary_key {
            warnings.push(GenerationWarning::field(
                resolved_name,
                &claim.name,
                WarningKind::CompositeKey,
                "composite primary keys are unsupported; only the first key column addresses records",
            ));
        }
        if is_primary_key {
            primary_key_field = Some(fields.len());
            nullable = false;
        }
        let server_generated = is_primary_key
            && match kind {
                ResourceKind::Relational => {
                    raw_field.auto_increment && logical_type == LogicalType::Integer
                }
                ResourceKind::Document => true,
            };

        fields.push(Field {
            raw_name: raw_field.name.clone(),
            resolved_name: claim.name,
            raw_type: raw_field.raw_type.clone(),
            logical_type,
            nullable,
            is_primary_key,
            server_generated,
        });
    }

    if primary_key_field.is_none() && kind == ResourceKind::Document {
        let claim = names.claim(&snake_name(conventional_id))?;
        primary_key_field = Some(fields.len());
        fields.push(Field {
            raw_name: conventional_id.to_string(),
            resolved_name: claim.name,
            raw_type: "objectId".to_string(),
            logical_type: LogicalType::Identifier,
            nullable: false,
            is_primary_key: true,
            server_generated: true,
        });
    }

    let key = match primary_key_field.and_then(|i| fields.get(i)) {
        Some(pk) => ResourceKey {
            name: pk.resolved_name.clone(),
            logical_type: pk.logical_type.clone(),
            server_generated: pk.server_generated,
            synthetic: false,
        },
        None => {
            let claim = names.claim(conventional_id)?;
            warnings.push(GenerationWarning::resource(
                resolved_name,
                WarningKind::SyntheticKey,
                format!(
                    "no primary key declared; records are addressed by a generated '{}'",
                    claim.name
                ),
            ));
            ResourceKey {
                name: claim.name,
                logical_type: LogicalType::Integer,
                server_generated: true,
                synthetic: true,
            }
        }
    };

    Ok(Resource {
        raw_name: raw.name.clone(),
        resolved_name: resolved_name.to_string(),
        kind,
        fields,
        primary_key_field,
        key,
    })
}
