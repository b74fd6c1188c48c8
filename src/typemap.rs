//! # Type Mapper
//!
//! `logicalType × targetFamily → (typeExpression, validationExpression)`.
//!
//! [`TYPE_TABLE`] is the only place that knows how a logical type is spelled in
//! a target stack. Each row is a logical kind, each column a family (indexed by
//! [`TargetFamily::index`]), so supporting a new family means widening the
//! rows by one cell. `unknown` has no direct cell: it resolves through
//! [`FALLBACKS`], the most permissive type each family can express, unless the
//! mapper runs in strict mode.
//!
//! Validation expressions are templates over `{v}`, the value being checked.

use serde_json::{json, Value};

use crate::family::{TargetFamily, FAMILY_COUNT};
use crate::schema::{LogicalKind, LogicalType};

/// One cell of the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    pub type_expr: &'static str,
    pub validation: &'static str,
}

const fn m(type_expr: &'static str, validation: &'static str) -> Option<TypeMapping> {
    Some(TypeMapping {
        type_expr,
        validation,
    })
}

/// Columns: syncRouted (Flask), asyncRouted (FastAPI/pydantic), eventLoopRouted (Express).
pub const TYPE_TABLE: &[(LogicalKind, [Option<TypeMapping>; FAMILY_COUNT])] = &[
    (
        LogicalKind::Integer,
        [
            m("int", "isinstance({v}, int) and not isinstance({v}, bool)"),
            m("int", "strict=True"),
            m("number", "Number.isInteger({v})"),
        ],
    ),
    (
        LogicalKind::Float,
        [
            m("float", "isinstance({v}, (int, float)) and not isinstance({v}, bool)"),
            m("float", ""),
            m("number", "typeof {v} === 'number' && Number.isFinite({v})"),
        ],
    ),
    (
        LogicalKind::Text,
        [
            m("str", "isinstance({v}, str)"),
            m("str", "strict=True"),
            m("string", "typeof {v} === 'string'"),
        ],
    ),
    (
        LogicalKind::Boolean,
        [
            m("bool", "isinstance({v}, bool)"),
            m("bool", "strict=True"),
            m("boolean", "typeof {v} === 'boolean'"),
        ],
    ),
    (
        LogicalKind::Datetime,
        [
            m("str", "is_datetime({v})"),
            m("datetime", ""),
            m("string", "typeof {v} === 'string' && !Number.isNaN(Date.parse({v}))"),
        ],
    ),
    (
        LogicalKind::Identifier,
        [
            m("str", "isinstance({v}, (str, int)) and not isinstance({v}, bool)"),
            m("Union[int, str]", ""),
            m("string", "typeof {v} === 'string' || Number.isInteger({v})"),
        ],
    ),
    (
        LogicalKind::Reference,
        [
            m("str", "isinstance({v}, (str, int)) and not isinstance({v}, bool)"),
            m("Union[int, str]", ""),
            m("string", "typeof {v} === 'string' || Number.isInteger({v})"),
        ],
    ),
    (LogicalKind::Unknown, [None, None, None]),
];

/// Permissive representation per family, used for `unknown`.
pub const FALLBACKS: [TypeMapping; FAMILY_COUNT] = [
    TypeMapping {
        type_expr: "Any",
        validation: "True",
    },
    TypeMapping {
        type_expr: "Any",
        validation: "",
    },
    TypeMapping {
        type_expr: "any",
        validation: "true",
    },
];

/// A resolved mapping plus whether it came from the fallback column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapped {
    pub type_expr: String,
    pub validation_template: String,
    pub fallback: bool,
}

impl Mapped {
    /// Validation expression applied to `value`; empty when the family validates by type alone.
    pub fn validation_for(&self, value: &str) -> String {
        self.validation_template.replace("{v}", value)
    }
}

/// Table lookup with an optional fallback policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeMapper {
    strict: bool,
}

impl TypeMapper {
    pub const fn new() -> Self {
        TypeMapper { strict: false }
    }

    /// A mapper without fallbacks: `unknown` becomes unmappable.
    pub const fn strict() -> Self {
        TypeMapper { strict: true }
    }

    pub const fn with_strict(strict: bool) -> Self {
        TypeMapper { strict }
    }

    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Map a logical type for a family; `None` when there is no cell and no fallback applies.
    pub fn map(&self, logical: &LogicalType, family: TargetFamily) -> Option<Mapped> {
        let kind = logical.kind();
        let cell = TYPE_TABLE
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, row)| row.get(family.index()).copied().flatten());
        match cell {
            Some(mapping) => Some(Mapped {
                type_expr: mapping.type_expr.to_string(),
                validation_template: mapping.validation.to_string(),
                fallback: false,
            }),
            None if self.strict => None,
            None => FALLBACKS.get(family.index()).map(|fb| Mapped {
                type_expr: fb.type_expr.to_string(),
                validation_template: fb.validation.to_string(),
                fallback: true,
            }),
        }
    }
}

/// JSON Schema fragment (OpenAPI 3.1) for a logical type.
///
/// Family-independent: the documentation describes the wire format, which
/// every family shares.
pub fn json_schema(logical: &LogicalType, nullable: bool) -> Value {
    let mut schema = match logical {
        LogicalType::Integer => json!({"type": "integer", "format": "int64"}),
        LogicalType::Float => json!({"type": "number", "format": "double"}),
        LogicalType::Text => json!({"type": "string"}),
        LogicalType::Boolean => json!({"type": "boolean"}),
        LogicalType::Datetime => json!({"type": "string", "format": "date-time"}),
        LogicalType::Identifier => json!({"type": ["string", "integer"]}),
        LogicalType::Reference(target) => json!({
            "type": ["string", "integer"],
            "description": format!("Identifier of a {target} record"),
        }),
        LogicalType::Unknown => json!({}),
    };
    if nullable {
        if let Some(obj) = schema.as_object_mut() {
            match obj.get_mut("type") {
                Some(Value::String(t)) => {
                    let t = t.clone();
                    obj.insert("type".to_string(), json!([t, "null"]));
                }
                Some(Value::Array(types)) => types.push(json!("null")),
                _ => {}
            }
        }
    }
    schema
}
