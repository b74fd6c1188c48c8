//! # Documentation Synthesizer
//!
//! Derives an OpenAPI 3.1 document from the same [`RouteSpec`] sequence the
//! renderer consumes. It never looks at the schema model, so a shape that
//! appears in the docs is by construction the shape the generated code
//! validates.

use serde_json::{json, Map, Value};

use crate::error::{GenerationError, Result};
use crate::routes::{RouteSpec, Shape, ShapeKind};
use crate::typemap::json_schema;

pub const OPENAPI_VERSION: &str = "3.1.0";
pub const SECURITY_SCHEME: &str = "bearerAuth";

/// Title block of the document.
#[derive(Debug, Clone)]
pub struct DocInfo<'a> {
    pub title: &'a str,
    pub version: &'a str,
    pub description: &'a str,
}

fn status_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "Deleted",
        400 => "Invalid request body",
        401 => "Missing or invalid credentials",
        403 => "Role not permitted",
        404 => "Record not found",
        _ => "Unexpected status",
    }
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn shape_schema(shape: &Shape) -> Value {
    let mut properties = Map::new();
    for field in &shape.fields {
        properties.insert(
            field.name.clone(),
            json_schema(&field.logical_type, field.nullable),
        );
    }
    let required: Vec<Value> = shape
        .required_fields()
        .map(|f| Value::String(f.name.clone()))
        .collect();
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

fn body_schema(shape: &Shape) -> Value {
    match shape.kind {
        ShapeKind::RecordList => json!({ "type": "array", "items": schema_ref(&shape.name) }),
        _ => schema_ref(&shape.name),
    }
}

fn operation(route: &RouteSpec) -> Value {
    let mut op = Map::new();
    op.insert("operationId".into(), json!(route.operation_id));
    op.insert("summary".into(), json!(route.summary));
    op.insert("tags".into(), json!([route.tag]));

    if let Some(param) = &route.path_param {
        op.insert(
            "parameters".into(),
            json!([{
                "name": param.name,
                "in": "path",
                "required": true,
                "schema": json_schema(&param.logical_type, false),
            }]),
        );
    }
    if let Some(shape) = &route.request_shape {
        op.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": body_schema(shape) } },
            }),
        );
    }

    let mut responses = Map::new();
    let mut success = Map::new();
    success.insert(
        "description".into(),
        json!(status_description(route.success_status)),
    );
    if let Some(shape) = &route.response_shape {
        success.insert(
            "content".into(),
            json!({ "application/json": { "schema": body_schema(shape) } }),
        );
    }
    responses.insert(route.success_status.to_string(), Value::Object(success));
    for status in &route.error_statuses {
        responses.insert(
            status.to_string(),
            json!({
                "description": status_description(*status),
                "content": { "application/json": { "schema": schema_ref("Error") } },
            }),
        );
    }
    op.insert("responses".into(), Value::Object(responses));

    if route.requires_auth {
        op.insert("security".into(), json!([{ SECURITY_SCHEME: [] }]));
        op.insert("x-allowed-roles".into(), json!(route.allowed_roles));
    }
    Value::Object(op)
}

/// Build the OpenAPI document for `routes`.
///
/// One operation per route; one component schema per distinct shape name,
/// first occurrence wins.
pub fn synthesize(routes: &[RouteSpec], info: &DocInfo<'_>) -> Value {
    let mut paths = Map::new();
    let mut schemas = Map::new();
    let mut secured = false;

    for route in routes {
        let item = paths
            .entry(route.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(route.http_method.lower(), operation(route));
        }
        for shape in route.request_shape.iter().chain(route.response_shape.iter()) {
            if !schemas.contains_key(&shape.name) {
                schemas.insert(shape.name.clone(), shape_schema(shape));
            }
        }
        secured |= route.requires_auth;
    }
    schemas.insert(
        "Error".into(),
        json!({
            "type": "object",
            "properties": { "error": { "type": "string" } },
            "required": ["error"],
        }),
    );

    let mut components = Map::new();
    components.insert("schemas".into(), Value::Object(schemas));
    if secured {
        components.insert(
            "securitySchemes".into(),
            json!({ SECURITY_SCHEME: { "type": "http", "scheme": "bearer" } }),
        );
    }

    let doc = json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": info.title,
            "version": info.version,
            "description": info.description,
        },
        "paths": Value::Object(paths),
        "components": Value::Object(components),
    });
    sorted(doc)
}

/// Rebuild every object with keys inserted in sorted order, whatever map
/// backend `serde_json` was compiled with.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Pretty-printed document text with a trailing newline.
pub fn to_json(doc: &Value, path: &str) -> Result<String> {
    let mut text = serde_json::to_string_pretty(doc).map_err(|e| GenerationError::render(path, e))?;
    text.push('\n');
    Ok(text)
}

/// Number of operations in a synthesized document.
pub fn operation_count(doc: &Value) -> usize {
    doc.get("paths")
        .and_then(Value::as_object)
        .map(|paths| {
            paths
                .values()
                .filter_map(Value::as_object)
                .map(|item| item.len())
                .sum()
        })
        .unwrap_or(0)
}
