#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::schema::{Field, LogicalType, Resource, ResourceKey, ResourceKind};

fn resource(raw: &str, resolved: &str, fields: &[&str]) -> Resource {
    Resource {
        raw_name: raw.to_string(),
        resolved_name: resolved.to_string(),
        kind: ResourceKind::Relational,
        fields: fields
            .iter()
            .map(|f| Field {
                raw_name: f.to_string(),
                resolved_name: f.to_string(),
                raw_type: "varchar(255)".to_string(),
                logical_type: LogicalType::Text,
                nullable: false,
                is_primary_key: false,
                server_generated: false,
            })
            .collect(),
        primary_key_field: None,
        key: ResourceKey {
            name: "id".to_string(),
            logical_type: LogicalType::Integer,
            server_generated: true,
            synthetic: true,
        },
    }
}

#[test]
fn test_split_words() {
    assert_eq!(split_words("blood_group"), vec!["blood", "group"]);
    assert_eq!(split_words("bloodGroup"), vec!["blood", "group"]);
    assert_eq!(split_words("USER"), vec!["user"]);
    assert_eq!(split_words("UserID"), vec!["user", "id"]);
    assert_eq!(split_words("order-items.v2"), vec!["order", "items", "v2"]);
    assert!(split_words("__").is_empty());
}

#[test]
fn test_snake_name() {
    assert_eq!(snake_name("User"), "user");
    assert_eq!(snake_name("USER"), "user");
    assert_eq!(snake_name("Blood Group"), "blood_group");
    assert_eq!(snake_name("2fa_codes"), "n_2fa_codes");
    assert_eq!(snake_name("--"), "unnamed");
}

#[test]
fn test_pluralize_rules() {
    assert_eq!(pluralize("donor"), "donors");
    assert_eq!(pluralize("category"), "categories");
    assert_eq!(pluralize("day"), "days");
    assert_eq!(pluralize("status"), "statuses");
    assert_eq!(pluralize("box"), "boxes");
    assert_eq!(pluralize("quiz"), "quizes");
    assert_eq!(pluralize("batch"), "batches");
    assert_eq!(pluralize("wish"), "wishes");
    assert_eq!(pluralize("person"), "persons");
    assert_eq!(pluralize(""), "");
}

#[test]
fn test_path_segment() {
    assert_eq!(path_segment("donor"), "donors");
    assert_eq!(path_segment("blood_group"), "blood-groups");
    assert_eq!(path_segment("OrderCategory"), "order-categories");
}

#[test]
fn test_to_camel_case() {
    assert_eq!(to_camel_case("donor"), "Donor");
    assert_eq!(to_camel_case("blood_group"), "BloodGroup");
    assert_eq!(to_camel_case("user_2"), "User2");
    assert_eq!(to_camel_case(""), "");
}

#[test]
fn test_escape_keyword_per_family() {
    assert_eq!(
        escape_keyword("class", TargetFamily::SyncRouted),
        ("f_class".to_string(), true)
    );
    assert_eq!(
        escape_keyword("class", TargetFamily::AsyncRouted),
        ("field_class".to_string(), true)
    );
    assert_eq!(
        escape_keyword("delete", TargetFamily::EventLoopRouted),
        ("_delete".to_string(), true)
    );
    assert_eq!(
        escape_keyword("phone", TargetFamily::EventLoopRouted),
        ("phone".to_string(), false)
    );
}

#[test]
fn test_name_scope_suffixes_in_claim_order() {
    let mut scope = NameScope::new("test");
    assert_eq!(scope.claim("user").unwrap().name, "user");
    let second = scope.claim("user").unwrap();
    assert_eq!(second.name, "user_2");
    assert!(second.suffixed);
    assert_eq!(scope.claim("user").unwrap().name, "user_3");
}

#[test]
fn test_name_scope_skips_taken_suffix() {
    let mut scope = NameScope::new("test");
    scope.claim("user_2").unwrap();
    scope.claim("user").unwrap();
    assert_eq!(scope.claim("user").unwrap().name, "user_3");
}

#[test]
fn test_name_scope_reserve() {
    let mut scope = NameScope::with_separator("types", "");
    scope.reserve("Store");
    assert!(scope.contains("Store"));
    assert_eq!(scope.claim("Store").unwrap().name, "Store2");
}

#[test]
fn test_resolve_case_only_collision() {
    let a = resource("User", "user", &["name"]);
    let b = resource("USER", "user_2", &["name"]);
    let mut warnings = Vec::new();
    let resolution = resolve(&[&a, &b], TargetFamily::SyncRouted, &mut warnings).unwrap();

    let first = &resolution.resources[0];
    let second = &resolution.resources[1];
    assert_eq!(first.name, "user");
    assert_eq!(first.path_segment, "users");
    assert_eq!(first.type_name, "User");
    assert_eq!(second.name, "user_2");
    assert_eq!(second.path_segment, "users_2");
    assert_eq!(second.type_name, "User2");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::NameSuffixed);
}

#[test]
fn test_resolve_escapes_field_keywords() {
    let r = resource("course", "course", &["class", "f_class"]);
    let mut warnings = Vec::new();
    let resolution = resolve(&[&r], TargetFamily::SyncRouted, &mut warnings).unwrap();
    let accessors = &resolution.resources[0].field_accessors;
    assert_eq!(accessors[0], "f_class");
    // the escaped name took the bare slot, so the literal one is suffixed
    assert_eq!(accessors[1], "f_class_2");
    assert_eq!(resolution.resources[0].key_accessor, "id");
    assert!(warnings
        .iter()
        .any(|w| w.kind == WarningKind::KeywordEscaped && w.field_name.as_deref() == Some("class")));
}

#[test]
fn test_resolve_is_deterministic() {
    let a = resource("Order", "order", &["total"]);
    let b = resource("order_", "order_2", &["total"]);
    let run = || {
        let mut w = Vec::new();
        resolve(&[&a, &b], TargetFamily::EventLoopRouted, &mut w).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_resolve_avoids_reserved_paths() {
    let r = resource("auth", "auth", &["token"]);
    let mut warnings = Vec::new();
    let resolution = resolve(&[&r], TargetFamily::AsyncRouted, &mut warnings).unwrap();
    assert_eq!(resolution.resources[0].path_segment, "auths");
    assert_eq!(resolution.resources[0].module_name, "auth_2");
}

#[test]
fn test_resolve_keeps_companion_type_names_free() {
    let a = resource("donor_create", "donor_create", &["note"]);
    let b = resource("donor", "donor", &["name"]);
    let mut warnings = Vec::new();
    let resolution = resolve(&[&a, &b], TargetFamily::AsyncRouted, &mut warnings).unwrap();
    assert_eq!(resolution.resources[0].type_name, "DonorCreate");
    // `Donor` would need `DonorCreate`, which is already a resource type
    assert_eq!(resolution.resources[1].type_name, "Donor2");
}

#[test]
fn test_resolve_avoids_handler_locals() {
    let r = resource("car", "car", &["model", "payload", "colour"]);
    let mut warnings = Vec::new();
    let resolution = resolve(&[&r], TargetFamily::SyncRouted, &mut warnings).unwrap();
    assert_eq!(
        resolution.resources[0].field_accessors,
        vec!["model_2", "payload_2", "colour"]
    );
}

#[test]
fn test_resolve_type_names_avoid_module_bindings() {
    let response = resource("response", "response", &["body"]);
    let not_found = resource("not_found", "not_found", &["path"]);
    let mut warnings = Vec::new();
    let resolution =
        resolve(&[&response, &not_found], TargetFamily::AsyncRouted, &mut warnings).unwrap();
    assert_eq!(resolution.resources[0].type_name, "Response2");
    assert_eq!(resolution.resources[1].type_name, "NotFound2");

    // Flask never imports `Response`, so the bare name stays free there
    let mut warnings = Vec::new();
    let resolution =
        resolve(&[&response, &not_found], TargetFamily::SyncRouted, &mut warnings).unwrap();
    assert_eq!(resolution.resources[0].type_name, "Response");
    assert_eq!(resolution.resources[1].type_name, "NotFound2");
}
