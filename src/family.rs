//! Target framework families.
//!
//! A family bundles everything that differs between output stacks: its column
//! in the type table ([`crate::typemap`]), its reserved words and escape token
//! ([`crate::naming`]), its path-parameter syntax and its layout table
//! ([`crate::render`]). Nothing outside those tables branches on the family.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum TargetFamily {
    /// Python / Flask: blueprints and decorator routing
    SyncRouted,
    /// Python / FastAPI: routers, pydantic models, dependency-injected auth
    AsyncRouted,
    /// JavaScript / Express: routers and middleware chains
    EventLoopRouted,
}

/// Number of supported families; the width of every per-family table.
pub const FAMILY_COUNT: usize = 3;

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "false", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "none", "nonlocal", "not", "or", "pass", "raise", "return", "true", "try", "while",
    "with", "yield",
];

// FastAPI handlers also shadow these names inside generated route functions.
const FASTAPI_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "false", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "none", "nonlocal", "not", "or", "pass", "raise", "return", "true", "try", "while",
    "with", "yield", "model_config", "model_fields", "json", "dict", "copy", "schema",
];

const JS_KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "constructor",
    "prototype",
];

impl TargetFamily {
    pub const ALL: [TargetFamily; FAMILY_COUNT] = [
        TargetFamily::SyncRouted,
        TargetFamily::AsyncRouted,
        TargetFamily::EventLoopRouted,
    ];

    /// Column index into per-family tables.
    pub const fn index(self) -> usize {
        match self {
            TargetFamily::SyncRouted => 0,
            TargetFamily::AsyncRouted => 1,
            TargetFamily::EventLoopRouted => 2,
        }
    }

    /// Serialized (camelCase) name.
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetFamily::SyncRouted => "syncRouted",
            TargetFamily::AsyncRouted => "asyncRouted",
            TargetFamily::EventLoopRouted => "eventLoopRouted",
        }
    }

    /// Human-facing framework name used in READMEs and banners.
    pub const fn framework(self) -> &'static str {
        match self {
            TargetFamily::SyncRouted => "Flask",
            TargetFamily::AsyncRouted => "FastAPI",
            TargetFamily::EventLoopRouted => "Express",
        }
    }

    /// Reserved words (lowercase) that may not be used as identifiers.
    pub fn reserved_words(self) -> &'static [&'static str] {
        match self {
            TargetFamily::SyncRouted => PYTHON_KEYWORDS,
            TargetFamily::AsyncRouted => FASTAPI_KEYWORDS,
            TargetFamily::EventLoopRouted => JS_KEYWORDS,
        }
    }

    /// Capitalized names the generated modules import or define at module
    /// scope. A resource type name must not rebind any of them.
    pub fn module_bindings(self) -> &'static [&'static str] {
        match self {
            TargetFamily::SyncRouted => &[
                "AuthError", "Blueprint", "Conflict", "Flask", "NotFound", "Store",
            ],
            TargetFamily::AsyncRouted => &[
                "APIRouter", "AuthError", "Conflict", "Depends", "FastAPI", "FileResponse",
                "HTTPException", "Header", "JSONResponse", "List", "NotFound", "Request",
                "RequestValidationError", "Response", "Store",
            ],
            TargetFamily::EventLoopRouted => &["AuthError", "Conflict", "NotFound", "Store"],
        }
    }

    /// Prefix applied to an identifier that clashes with a reserved word.
    pub const fn escape_token(self) -> &'static str {
        match self {
            TargetFamily::SyncRouted => "f_",
            TargetFamily::AsyncRouted => "field_",
            TargetFamily::EventLoopRouted => "_",
        }
    }

    pub fn is_reserved(self, ident: &str) -> bool {
        let lower = ident.to_ascii_lowercase();
        self.reserved_words().contains(&lower.as_str())
    }

    /// Render a `{param}` path template in the family's routing syntax.
    ///
    /// `int_key` selects the typed converter where the framework has one.
    pub fn path_param(self, name: &str, int_key: bool) -> String {
        match self {
            TargetFamily::SyncRouted if int_key => format!("<int:{name}>"),
            TargetFamily::SyncRouted => format!("<{name}>"),
            TargetFamily::AsyncRouted => format!("{{{name}}}"),
            TargetFamily::EventLoopRouted => format!(":{name}"),
        }
    }
}

impl std::fmt::Display for TargetFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, family) in TargetFamily::ALL.iter().enumerate() {
            assert_eq!(family.index(), i);
        }
    }

    #[test]
    fn test_reserved_is_case_insensitive() {
        assert!(TargetFamily::SyncRouted.is_reserved("class"));
        assert!(TargetFamily::SyncRouted.is_reserved("None"));
        assert!(TargetFamily::EventLoopRouted.is_reserved("delete"));
        assert!(!TargetFamily::SyncRouted.is_reserved("delete"));
    }

    #[test]
    fn test_path_param_syntax() {
        assert_eq!(TargetFamily::SyncRouted.path_param("id", true), "<int:id>");
        assert_eq!(TargetFamily::SyncRouted.path_param("id", false), "<id>");
        assert_eq!(TargetFamily::AsyncRouted.path_param("id", true), "{id}");
        assert_eq!(TargetFamily::EventLoopRouted.path_param("id", false), ":id");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TargetFamily::EventLoopRouted).unwrap();
        assert_eq!(json, "\"eventLoopRouted\"");
        let back: TargetFamily = serde_json::from_str("\"asyncRouted\"").unwrap();
        assert_eq!(back, TargetFamily::AsyncRouted);
    }
}
