//! # Route Synthesizer
//!
//! Builds the five CRUD [`RouteSpec`]s of every selected resource from the
//! normalized schema and the resolved identifiers. The output order is the
//! contract every later stage relies on: resources in declaration order, and
//! `LIST, GET, CREATE, UPDATE, DELETE` within a resource.
//!
//! Relationship fields stay flat: a `reference` field carries the foreign
//! identifier value only.

use crate::error::{GenerationError, Result};
use crate::naming::{Resolution, ResolvedResource};
use crate::request::UpdatePolicy;
use crate::schema::Resource;

use super::types::{
    CrudMethod, HttpMethod, PathParam, RouteKind, RouteSpec, Shape, ShapeField, ShapeKind,
};

/// Request-level settings that shape the routes.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub base_path: String,
    pub update_policy: UpdatePolicy,
}

/// Synthesize CRUD routes for `selected`, in declaration order.
pub fn synthesize(
    selected: &[&Resource],
    resolution: &Resolution,
    options: &RouteOptions,
) -> Result<Vec<RouteSpec>> {
    let mut routes = Vec::with_capacity(selected.len() * CrudMethod::ALL.len());
    for resource in selected {
        let names = resolution.get(&resource.resolved_name).ok_or_else(|| {
            GenerationError::NameCollision {
                scope: "resolution".to_string(),
                name: resource.resolved_name.clone(),
            }
        })?;
        for method in CrudMethod::ALL {
            routes.push(crud_route(resource, names, method, options));
        }
    }
    tracing::debug!(routes = routes.len(), "routes synthesized");
    Ok(routes)
}

fn crud_route(
    resource: &Resource,
    names: &ResolvedResource,
    method: CrudMethod,
    options: &RouteOptions,
) -> RouteSpec {
    let collection = format!("{}/{}", options.base_path, names.path_segment);
    let (path, path_param) = if method.targets_record() {
        (
            format!("{collection}/{{{}}}", names.key_accessor),
            Some(PathParam {
                name: names.key_accessor.clone(),
                logical_type: resource.key.logical_type.clone(),
            }),
        )
    } else {
        (collection, None)
    };

    let record = record_shape(resource, names);
    let (http_method, request_shape, response_shape, success_status, error_statuses) = match method
    {
        CrudMethod::List => (
            HttpMethod::Get,
            None,
            Some(Shape {
                name: names.type_name.clone(),
                kind: ShapeKind::RecordList,
                fields: record.fields.clone(),
            }),
            200,
            vec![],
        ),
        CrudMethod::Get => (HttpMethod::Get, None, Some(record), 200, vec![404]),
        CrudMethod::Create => (
            HttpMethod::Post,
            Some(create_shape(resource, names)),
            Some(record),
            201,
            vec![400],
        ),
        CrudMethod::Update => (
            match options.update_policy {
                UpdatePolicy::PartialMerge => HttpMethod::Patch,
                UpdatePolicy::FullReplace => HttpMethod::Put,
            },
            Some(update_shape(resource, names, options.update_policy)),
            Some(record),
            200,
            vec![400, 404],
        ),
        CrudMethod::Delete => (HttpMethod::Delete, None, None, 204, vec![404]),
    };

    let summary = match method {
        CrudMethod::List => format!("List {} records", names.type_name),
        CrudMethod::Get => format!("Get a {} by {}", names.type_name, names.key_accessor),
        CrudMethod::Create => format!("Create a {}", names.type_name),
        CrudMethod::Update => format!("Update a {}", names.type_name),
        CrudMethod::Delete => format!("Delete a {}", names.type_name),
    };

    RouteSpec {
        resource_name: Some(resource.resolved_name.clone()),
        kind: RouteKind::Crud(method),
        http_method,
        path,
        path_param,
        operation_id: format!("{}_{}", method.verb(), names.module_name),
        tag: names.name.clone(),
        summary,
        request_shape,
        response_shape,
        success_status,
        error_statuses,
        requires_auth: false,
        allowed_roles: Vec::new(),
    }
}

/// Every field, plus the synthetic key when no declared column backs it.
fn record_shape(resource: &Resource, names: &ResolvedResource) -> Shape {
    let mut fields = Vec::with_capacity(resource.fields.len() + 1);
    if resource.key.synthetic {
        fields.push(ShapeField {
            name: resource.key.name.clone(),
            accessor: names.key_accessor.clone(),
            logical_type: resource.key.logical_type.clone(),
            nullable: false,
            required: true,
        });
    }
    for (field, accessor) in resource.fields.iter().zip(&names.field_accessors) {
        fields.push(ShapeField {
            name: field.resolved_name.clone(),
            accessor: accessor.clone(),
            logical_type: field.logical_type.clone(),
            nullable: field.nullable,
            required: !field.nullable,
        });
    }
    Shape {
        name: names.type_name.clone(),
        kind: ShapeKind::Record,
        fields,
    }
}

/// Fields accepted on CREATE: everything but a server-generated key.
fn create_shape(resource: &Resource, names: &ResolvedResource) -> Shape {
    let fields = resource
        .fields
        .iter()
        .zip(&names.field_accessors)
        .filter(|(f, _)| !(f.is_primary_key && f.server_generated))
        .map(|(f, accessor)| ShapeField {
            name: f.resolved_name.clone(),
            accessor: accessor.clone(),
            logical_type: f.logical_type.clone(),
            nullable: f.nullable,
            required: !f.nullable,
        })
        .collect();
    Shape {
        name: format!("{}Create", names.type_name),
        kind: ShapeKind::CreateBody,
        fields,
    }
}

/// Fields accepted on UPDATE: never the key; all optional under partial merge.
fn update_shape(resource: &Resource, names: &ResolvedResource, policy: UpdatePolicy) -> Shape {
    let fields = resource
        .fields
        .iter()
        .zip(&names.field_accessors)
        .filter(|(f, _)| !f.is_primary_key)
        .map(|(f, accessor)| ShapeField {
            name: f.resolved_name.clone(),
            accessor: accessor.clone(),
            logical_type: f.logical_type.clone(),
            nullable: f.nullable,
            required: policy == UpdatePolicy::FullReplace && !f.nullable,
        })
        .collect();
    Shape {
        name: format!("{}Update", names.type_name),
        kind: ShapeKind::UpdateBody,
        fields,
    }
}
