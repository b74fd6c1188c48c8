#![allow(dead_code)]

use crudforge::{
    normalize, AuthConfig, CrudMethod, GenerationRequest, MethodPolicy, RawSchema, SchemaModel,
    TargetFamily,
};
use serde_json::{json, Value};

/// Blood bank snapshot: two relational tables with a foreign key.
pub fn blood_bank_payload() -> Value {
    json!({
        "database": "mysql",
        "resources": [
            {
                "name": "donor",
                "fields": [
                    {"name": "id", "rawType": "int(11)", "primaryKey": true, "autoIncrement": true},
                    {"name": "name", "rawType": "varchar(100)"},
                    {"name": "blood_type", "rawType": "varchar(3)"},
                    {"name": "phone", "rawType": "varchar(20)", "nullable": true},
                    {"name": "last_donation", "rawType": "datetime", "nullable": true}
                ]
            },
            {
                "name": "donation",
                "fields": [
                    {"name": "id", "rawType": "int(11)", "primaryKey": true, "autoIncrement": true},
                    {"name": "donor_id", "rawType": "int(11)", "references": "donor"},
                    {"name": "volume_ml", "rawType": "int(11)"},
                    {"name": "screened", "rawType": "tinyint(1)"}
                ]
            },
            {
                "name": "invoice",
                "fields": [
                    {"name": "id", "rawType": "int(11)", "primaryKey": true, "autoIncrement": true},
                    {"name": "total", "rawType": "decimal(10,2)"},
                    {"name": "notes", "rawType": "text", "nullable": true}
                ]
            }
        ]
    })
}

pub fn schema_from(payload: Value) -> SchemaModel {
    let raw: RawSchema = serde_json::from_value(payload).unwrap();
    normalize(&raw).unwrap().schema
}

pub fn blood_bank() -> SchemaModel {
    schema_from(blood_bank_payload())
}

/// Reads open to everyone; DELETE for admins only.
pub fn invoice_auth() -> AuthConfig {
    AuthConfig::new("integration-secret", 3600)
        .with_method(CrudMethod::List, MethodPolicy::open())
        .with_method(CrudMethod::Get, MethodPolicy::open())
        .with_method(CrudMethod::Delete, MethodPolicy::roles(["admin"]))
}

pub fn request(selected: &[&str], family: TargetFamily) -> GenerationRequest {
    GenerationRequest::new(blood_bank(), selected.iter().copied(), family)
}
