#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::family::TargetFamily;
use crate::naming::resolve;
use crate::request::{AuthConfig, MethodPolicy, UpdatePolicy};
use crate::schema::{normalize, DatabaseKind, RawField, RawResource, RawSchema, SchemaModel};

fn donor_schema() -> SchemaModel {
    let raw = RawSchema {
        database: DatabaseKind::Mysql,
        resources: vec![RawResource {
            name: "donor".into(),
            fields: vec![
                RawField::new("id", "int(11)").primary_key().auto_increment(),
                RawField::new("name", "varchar(100)"),
                RawField::new("blood_group", "varchar(5)"),
                RawField::new("phone", "varchar(20)").nullable(),
                RawField::new("location", "varchar(100)").nullable(),
            ],
        }],
    };
    normalize(&raw).unwrap().schema
}

fn routes_for(schema: &SchemaModel, options: &RouteOptions) -> Vec<RouteSpec> {
    let selected: Vec<_> = schema.resources.iter().collect();
    let mut warnings = Vec::new();
    let resolution = resolve(&selected, TargetFamily::SyncRouted, &mut warnings).unwrap();
    synthesize(&selected, &resolution, options).unwrap()
}

#[test]
fn test_donor_crud_routes() {
    let routes = routes_for(&donor_schema(), &RouteOptions::default());
    let summary: Vec<_> = routes
        .iter()
        .map(|r| (r.crud_method().unwrap(), r.http_method, r.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (CrudMethod::List, HttpMethod::Get, "/donors"),
            (CrudMethod::Get, HttpMethod::Get, "/donors/{id}"),
            (CrudMethod::Create, HttpMethod::Post, "/donors"),
            (CrudMethod::Update, HttpMethod::Patch, "/donors/{id}"),
            (CrudMethod::Delete, HttpMethod::Delete, "/donors/{id}"),
        ]
    );
    assert!(routes.iter().all(|r| r.resource_name.as_deref() == Some("donor")));
    assert!(routes.iter().all(|r| !r.requires_auth));
}

#[test]
fn test_create_body_excludes_generated_key() {
    let routes = routes_for(&donor_schema(), &RouteOptions::default());
    let create = routes[2].request_shape.as_ref().unwrap();
    assert_eq!(create.name, "DonorCreate");
    let names: Vec<_> = create.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "blood_group", "phone", "location"]);
    let required: Vec<_> = create.required_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(required, vec!["name", "blood_group"]);
    assert_eq!(routes[2].success_status, 201);
}

#[test]
fn test_update_policy_controls_method_and_required() {
    let partial = routes_for(&donor_schema(), &RouteOptions::default());
    let body = partial[3].request_shape.as_ref().unwrap();
    assert!(body.fields.iter().all(|f| !f.required));

    let options = RouteOptions {
        base_path: String::new(),
        update_policy: UpdatePolicy::FullReplace,
    };
    let full = routes_for(&donor_schema(), &options);
    assert_eq!(full[3].http_method, HttpMethod::Put);
    let body = full[3].request_shape.as_ref().unwrap();
    assert_eq!(body.required_fields().count(), 2);
}

#[test]
fn test_base_path_prefixes_routes() {
    let options = RouteOptions {
        base_path: "/api".into(),
        update_policy: UpdatePolicy::PartialMerge,
    };
    let routes = routes_for(&donor_schema(), &options);
    assert_eq!(routes[0].path, "/api/donors");
    assert_eq!(routes[4].path, "/api/donors/{id}");
}

#[test]
fn test_path_with_family_syntax() {
    let routes = routes_for(&donor_schema(), &RouteOptions::default());
    let flask = routes[1].path_with(|p| TargetFamily::SyncRouted.path_param(&p.name, p.is_integer()));
    assert_eq!(flask, "/donors/<int:id>");
    let express =
        routes[1].path_with(|p| TargetFamily::EventLoopRouted.path_param(&p.name, p.is_integer()));
    assert_eq!(express, "/donors/:id");
}

#[test]
fn test_scaffold_gates_routes_and_adds_credentials() {
    let mut routes = routes_for(&donor_schema(), &RouteOptions::default());
    let config = AuthConfig::new("secret", 600)
        .with_method(CrudMethod::List, MethodPolicy::open())
        .with_method(CrudMethod::Delete, MethodPolicy::roles(["admin"]));
    scaffold(&mut routes, &config, "");

    assert_eq!(routes.len(), 7);
    assert!(!routes[0].requires_auth);
    assert!(routes[1].requires_auth);
    assert_eq!(routes[1].allowed_roles.len(), 3);
    let delete = &routes[4];
    assert!(delete.requires_auth);
    assert_eq!(delete.allowed_roles, vec!["admin"]);
    assert_eq!(delete.error_statuses, vec![401, 403, 404]);

    assert_eq!(routes[5].kind, RouteKind::IssueCredential);
    assert_eq!(routes[5].path, "/auth/token");
    assert!(!routes[5].requires_auth);
    assert_eq!(routes[6].kind, RouteKind::VerifyCredential);
    assert_eq!(routes[6].path, "/auth/verify");
    assert!(routes[6].resource_name.is_none());
}
