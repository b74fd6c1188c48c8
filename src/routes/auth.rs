//! # Auth Scaffolder
//!
//! Decorates synthesized routes with their access rule and appends the two
//! credential endpoints. The generated access check runs before the handler
//! touches the store, so a missing token or an unlisted role fails closed.
//!
//! No cryptography is produced here: generated projects call into a fixed
//! auth module whose secret and token lifetime come from [`AuthConfig`].

use crate::request::AuthConfig;
use crate::schema::LogicalType;

use super::types::{HttpMethod, RouteKind, RouteSpec, Shape, ShapeField, ShapeKind};

/// Path segment shared by the credential routes.
pub const AUTH_SEGMENT: &str = "auth";

/// Apply per-method policies to CRUD routes and append the credential routes.
pub fn scaffold(routes: &mut Vec<RouteSpec>, config: &AuthConfig, base_path: &str) {
    for route in routes.iter_mut() {
        let Some(method) = route.crud_method() else {
            continue;
        };
        let policy = config.policy(method);
        route.requires_auth = policy.requires_auth;
        if policy.requires_auth {
            route.allowed_roles = policy.allowed_roles;
            route.add_error_status(401);
            route.add_error_status(403);
        }
    }
    routes.push(issue_route(base_path));
    routes.push(verify_route(config, base_path));
    tracing::debug!(
        gated = routes.iter().filter(|r| r.requires_auth).count(),
        "auth scaffolded"
    );
}

fn text_field(name: &str, required: bool) -> ShapeField {
    ShapeField {
        name: name.to_string(),
        accessor: name.to_string(),
        logical_type: LogicalType::Text,
        nullable: false,
        required,
    }
}

fn issue_route(base_path: &str) -> RouteSpec {
    RouteSpec {
        resource_name: None,
        kind: RouteKind::IssueCredential,
        http_method: HttpMethod::Post,
        path: format!("{base_path}/{AUTH_SEGMENT}/token"),
        path_param: None,
        operation_id: "issue_token".to_string(),
        tag: AUTH_SEGMENT.to_string(),
        summary: "Exchange username and password for a bearer token".to_string(),
        request_shape: Some(Shape {
            name: "CredentialRequest".to_string(),
            kind: ShapeKind::CredentialRequest,
            fields: vec![text_field("username", true), text_field("password", true)],
        }),
        response_shape: Some(Shape {
            name: "Credential".to_string(),
            kind: ShapeKind::Token,
            fields: vec![
                text_field("access_token", true),
                text_field("token_type", true),
                ShapeField {
                    name: "expires_in".to_string(),
                    accessor: "expires_in".to_string(),
                    logical_type: LogicalType::Integer,
                    nullable: false,
                    required: true,
                },
            ],
        }),
        success_status: 200,
        error_statuses: vec![400, 401],
        requires_auth: false,
        allowed_roles: Vec::new(),
    }
}

fn verify_route(config: &AuthConfig, base_path: &str) -> RouteSpec {
    RouteSpec {
        resource_name: None,
        kind: RouteKind::VerifyCredential,
        http_method: HttpMethod::Get,
        path: format!("{base_path}/{AUTH_SEGMENT}/verify"),
        path_param: None,
        operation_id: "verify_token".to_string(),
        tag: AUTH_SEGMENT.to_string(),
        summary: "Return the identity carried by the bearer token".to_string(),
        request_shape: None,
        response_shape: Some(Shape {
            name: "CredentialIdentity".to_string(),
            kind: ShapeKind::Identity,
            fields: vec![text_field("username", true), text_field("role", true)],
        }),
        success_status: 200,
        error_statuses: vec![401],
        requires_auth: true,
        allowed_roles: config.roles.clone(),
    }
}
