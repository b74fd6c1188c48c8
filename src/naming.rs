//! # Identifier Resolver
//!
//! Turns raw table/collection/field names into the three identifier forms the
//! generated project needs:
//!
//! - a **route path segment**: pluralized, lowercase, hyphen-separated (`blood-groups`)
//! - a **type name**: capitalized singular (`BloodGroup`)
//! - a **field accessor**: lowercase snake case, safe in every target syntax
//!
//! Resolution is `normalize case → strip separators → pluralize → suffix
//! collisions → escape keywords`. Collision state lives in a [`NameScope`]
//! that the caller threads through the pass, so two resolutions never share
//! state and the result depends only on declaration order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::diagnostics::{GenerationWarning, WarningKind};
use crate::error::{GenerationError, Result};
use crate::family::TargetFamily;
use crate::schema::Resource;

#[cfg(test)]
mod tests;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"([a-z0-9])([A-Z])").unwrap()
});

static SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^A-Za-z0-9]+").unwrap()
});

/// Upper bound on suffix attempts before a collision is declared unresolvable.
const MAX_SUFFIX: usize = 10_000;

/// Split a raw name into lowercase words.
///
/// Non-alphanumeric runs separate words, as does a lower→upper camel boundary;
/// an all-caps run stays one word (`USER` → `user`, `UserID` → `user id`).
pub fn split_words(raw: &str) -> Vec<String> {
    let spaced = CAMEL_BOUNDARY.replace_all(raw, "${1}_${2}");
    SEPARATORS
        .split(&spaced)
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Lowercase snake-case name; never empty, never starts with a digit.
pub fn snake_name(raw: &str) -> String {
    let words = split_words(raw);
    if words.is_empty() {
        return "unnamed".to_string();
    }
    let joined = words.join("_");
    if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n_{joined}")
    } else {
        joined
    }
}

/// Pluralize a single lowercase word with the fixed suffix rules.
///
/// Irregular plurals are not handled: `person` → `persons`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let vowel_before = stem
            .chars()
            .last()
            .map(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
            .unwrap_or(false);
        if !vowel_before && !stem.is_empty() {
            return format!("{stem}ies");
        }
        return format!("{word}s");
    }
    const ES_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];
    if ES_ENDINGS.iter().any(|e| word.ends_with(e)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// Pluralized, hyphenated path segment for a raw resource name.
pub fn path_segment(raw: &str) -> String {
    let mut words = split_words(raw);
    match words.last_mut() {
        Some(last) => *last = pluralize(last),
        None => return "unnamed".to_string(),
    }
    words.join("-")
}

/// Convert a snake_case string to CamelCase.
///
/// ```rust
/// use crudforge::naming::to_camel_case;
/// assert_eq!(to_camel_case("blood_group"), "BloodGroup");
/// assert_eq!(to_camel_case("user_2"), "User2");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Prefix `ident` with the family's escape token when it is a reserved word.
///
/// Returns the identifier and whether it was escaped.
pub fn escape_keyword(ident: &str, family: TargetFamily) -> (String, bool) {
    if family.is_reserved(ident) {
        (format!("{}{ident}", family.escape_token()), true)
    } else {
        (ident.to_string(), false)
    }
}

/// Result of claiming a name in a [`NameScope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub name: String,
    pub suffixed: bool,
}

/// Collision accumulator for one naming scope.
///
/// The first claim of a base name gets it bare; later claims get
/// `{base}{sep}2`, `{base}{sep}3`, ... in claim order.
#[derive(Debug, Clone)]
pub struct NameScope {
    label: String,
    separator: &'static str,
    taken: BTreeSet<String>,
}

impl NameScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_separator(label, "_")
    }

    pub fn with_separator(label: impl Into<String>, separator: &'static str) -> Self {
        NameScope {
            label: label.into(),
            separator,
            taken: BTreeSet::new(),
        }
    }

    /// Mark a name as used without claiming it through the suffix rules.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    pub fn claim(&mut self, base: &str) -> Result<Claim> {
        if self.taken.insert(base.to_string()) {
            return Ok(Claim {
                name: base.to_string(),
                suffixed: false,
            });
        }
        for n in 2..MAX_SUFFIX {
            let candidate = format!("{base}{}{n}", self.separator);
            if self.taken.insert(candidate.clone()) {
                tracing::debug!(scope = %self.label, %base, %candidate, "name collision suffixed");
                return Ok(Claim {
                    name: candidate,
                    suffixed: true,
                });
            }
        }
        Err(GenerationError::NameCollision {
            scope: self.label.clone(),
            name: base.to_string(),
        })
    }
}

/// Identifiers the generated handlers and models bind themselves; a field
/// accessor must never shadow them.
const TEMPLATE_LOCALS: [&str; 22] = [
    "blueprint", "changes", "config", "construct", "copy", "dict", "errors", "express",
    "fields", "json", "model", "model_config", "model_fields", "payload", "req", "request",
    "res", "router", "schema", "store", "validate", "value",
];

/// Claim a type name whose `Create`/`Update` companions are also free.
fn claim_type(types: &mut NameScope, base: &str) -> Result<Claim> {
    loop {
        let claim = types.claim(base)?;
        let companions = [format!("{}Create", claim.name), format!("{}Update", claim.name)];
        if companions.iter().all(|c| !types.contains(c)) {
            for companion in &companions {
                types.reserve(companion);
            }
            return Ok(claim);
        }
    }
}

/// Family-specific identifiers for one selected resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Resolved (wire) resource name, e.g. `user_2`.
    pub name: String,
    /// File/module stem, keyword-safe.
    pub module_name: String,
    pub type_name: String,
    pub path_segment: String,
    /// One accessor per `Resource::fields` entry, same order.
    pub field_accessors: Vec<String>,
    pub key_accessor: String,
}

/// Identifiers for every selected resource, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resources: Vec<ResolvedResource>,
}

impl Resolution {
    pub fn get(&self, resolved_name: &str) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.name == resolved_name)
    }
}

/// Resolve family-specific identifiers for `selected` (already in declaration order).
///
/// Path segments and type names are unique across the selection; accessors are
/// unique within their resource.
pub fn resolve(
    selected: &[&Resource],
    family: TargetFamily,
    warnings: &mut Vec<GenerationWarning>,
) -> Result<Resolution> {
    let mut paths = NameScope::new("route paths");
    let mut types = NameScope::with_separator("type names", "");
    let mut modules = NameScope::new("modules");
    // Taken by the project layout of every family.
    for fixed in [
        "auth", "config", "store", "app", "main", "models", "routes", "validators",
    ] {
        modules.reserve(fixed);
    }
    for fixed in ["auth", "health", "docs"] {
        paths.reserve(fixed);
    }
    for fixed in [
        "Any", "BaseModel", "ConfigDict", "Credential", "CredentialIdentity",
        "CredentialRequest", "Error", "Field", "List", "Optional", "Settings", "Store", "Union",
    ] {
        types.reserve(fixed);
    }
    for bound in family.module_bindings() {
        types.reserve(bound);
    }
    let mut resources = Vec::with_capacity(selected.len());

    for resource in selected {
        let path = paths.claim(&path_segment(&resource.raw_name))?;
        if path.suffixed {
            warnings.push(GenerationWarning::resource(
                &resource.resolved_name,
                WarningKind::NameSuffixed,
                format!("route path collides; using /{}", path.name),
            ));
        }

        let (type_base, type_escaped) =
            escape_keyword(&to_camel_case(&resource.resolved_name), family);
        let type_name = claim_type(&mut types, &type_base)?;
        let (module_base, module_escaped) = escape_keyword(&resource.resolved_name, family);
        let module_name = modules.claim(&module_base)?;
        if type_escaped || module_escaped {
            warnings.push(GenerationWarning::resource(
                &resource.resolved_name,
                WarningKind::KeywordEscaped,
                format!(
                    "name is reserved in {}; escaped as {} / {}",
                    family.framework(),
                    type_name.name,
                    module_name.name
                ),
            ));
        }

        let mut accessors = NameScope::new(format!("fields of {}", resource.resolved_name));
        for local in TEMPLATE_LOCALS {
            accessors.reserve(local);
        }
        let mut field_accessors = Vec::with_capacity(resource.fields.len());
        for field in &resource.fields {
            let (base, escaped) = escape_keyword(&field.resolved_name, family);
            let claim = accessors.claim(&base)?;
            if escaped {
                warnings.push(GenerationWarning::field(
                    &resource.resolved_name,
                    &field.resolved_name,
                    WarningKind::KeywordEscaped,
                    format!(
                        "field name is reserved in {}; accessor is {}",
                        family.framework(),
                        claim.name
                    ),
                ));
            }
            field_accessors.push(claim.name);
        }
        let key_accessor = match resource.primary_key_field {
            Some(i) => field_accessors
                .get(i)
                .cloned()
                .unwrap_or_else(|| resource.key.name.clone()),
            None => accessors.claim(&escape_keyword(&resource.key.name, family).0)?.name,
        };

        resources.push(ResolvedResource {
            name: resource.resolved_name.clone(),
            module_name: module_name.name,
            type_name: type_name.name,
            path_segment: path.name,
            field_accessors,
            key_accessor,
        });
    }

    Ok(Resolution { resources })
}
