//! Template view models.
//!
//! Templates receive only pre-resolved strings: every identifier, literal and
//! validation expression is computed here, so a template never makes a naming
//! or typing decision. Everything is built from [`RouteSpec`] shapes, the same
//! data the documentation is derived from.

use serde::Serialize;

use crate::error::{GenerationError, Result};
use crate::family::TargetFamily;
use crate::naming::{snake_name, ResolvedResource};
use crate::request::{AuthConfig, GenerationOptions, UpdatePolicy};
use crate::routes::{CrudMethod, RouteKind, RouteSpec, Shape, ShapeField};
use crate::schema::{DatabaseKind, LogicalType, Resource};
use crate::typemap::TypeMapper;

/// Quote `s` as a double-quoted literal valid in both Python and JavaScript.
pub(crate) fn lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn lit_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.into_iter().map(lit).collect();
    format!("[{}]", quoted.join(", "))
}

fn family_path(route: &RouteSpec, family: TargetFamily) -> String {
    route.path_with(|p| family.path_param(&p.name, p.is_integer()))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FieldView {
    pub name: String,
    pub name_lit: String,
    pub accessor: String,
    pub type_expr: String,
    /// Family validation applied to `value` (pydantic `Field` arguments for asyncRouted).
    pub validation: String,
    /// Null-aware boolean check over `value`; empty for asyncRouted.
    pub check: String,
    pub nullable: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouteView {
    pub method: &'static str,
    pub verb: &'static str,
    pub http: String,
    pub http_upper: &'static str,
    pub path_lit: String,
    pub handler: String,
    pub record: bool,
    pub requires_auth: bool,
    pub roles_lit: String,
    pub success_status: u16,
    pub summary_lit: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ResourceView {
    pub name: String,
    pub name_lit: String,
    pub module: String,
    pub type_name: String,
    pub key: String,
    pub key_lit: String,
    pub key_int: bool,
    pub key_kind: &'static str,
    pub key_generated: bool,
    pub fields: Vec<FieldView>,
    pub create_fields: Vec<FieldView>,
    pub update_fields: Vec<FieldView>,
    pub create_fields_lit: String,
    pub create_required_lit: String,
    pub update_fields_lit: String,
    pub update_required_lit: String,
    pub uses_datetime: bool,
    pub uses_auth: bool,
    pub merge_updates: bool,
    pub not_found_lit: String,
    pub conflict_lit: String,
    pub routes: Vec<RouteView>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthView {
    pub secret_lit: String,
    pub lifetime: u64,
    pub roles_lit: String,
    pub issue_path_lit: String,
    pub verify_path_lit: String,
}

/// Connection settings for the database the schema snapshot came from.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DatabaseView {
    pub kind: &'static str,
    pub label: &'static str,
    pub document: bool,
    pub url_env: &'static str,
    pub url_lit: String,
}

impl DatabaseView {
    fn new(kind: DatabaseKind, name: &str) -> Self {
        DatabaseView {
            kind: kind.as_str(),
            label: kind.label(),
            document: kind.is_document(),
            url_env: kind.url_env(),
            url_lit: lit(&kind.default_url(name)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProjectView {
    pub name: String,
    pub name_lit: String,
    pub slug: String,
    pub package_name: String,
    pub version: String,
    pub version_lit: String,
    pub framework: &'static str,
    pub family: &'static str,
    pub port: u16,
    pub include_docs: bool,
    pub database: DatabaseView,
    pub auth: Option<AuthView>,
    pub resources: Vec<ResourceView>,
    pub resource_names_lit: String,
}

pub(crate) struct ViewBuilder<'a> {
    pub family: TargetFamily,
    pub mapper: TypeMapper,
    /// Layout path being rendered, for error reporting.
    pub path: &'a str,
}

impl ViewBuilder<'_> {
    fn field(&self, resource: &str, field: &ShapeField) -> Result<FieldView> {
        let mapped = self
            .mapper
            .map(&field.logical_type, self.family)
            .ok_or_else(|| {
                GenerationError::render(
                    self.path,
                    format!(
                        "no {} type for {resource}.{} ({})",
                        self.family.framework(),
                        field.name,
                        field.logical_type
                    ),
                )
            })?;
        let validation = mapped.validation_for("value");
        let check = match self.family {
            TargetFamily::SyncRouted if field.nullable => {
                format!("value is None or ({validation})")
            }
            TargetFamily::EventLoopRouted if field.nullable => {
                format!("value === null || ({validation})")
            }
            TargetFamily::AsyncRouted => String::new(),
            _ => validation.clone(),
        };
        Ok(FieldView {
            name: field.name.clone(),
            name_lit: lit(&field.name),
            accessor: field.accessor.clone(),
            type_expr: mapped.type_expr,
            validation,
            check,
            nullable: field.nullable,
            required: field.required,
        })
    }

    fn fields(&self, resource: &str, shape: Option<&Shape>) -> Result<Vec<FieldView>> {
        shape
            .map(|s| s.fields.iter().map(|f| self.field(resource, f)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn route(&self, route: &RouteSpec, module: &str) -> RouteView {
        let (method, verb) = match route.kind {
            RouteKind::Crud(m) => (m.as_str(), m.verb()),
            RouteKind::IssueCredential => ("ISSUE", "issue"),
            RouteKind::VerifyCredential => ("VERIFY", "verify"),
        };
        RouteView {
            method,
            verb,
            http: route.http_method.lower(),
            http_upper: route.http_method.as_str(),
            path_lit: lit(&family_path(route, self.family)),
            handler: format!("{verb}_{module}"),
            record: route.path_param.is_some(),
            requires_auth: route.requires_auth,
            roles_lit: lit_list(route.allowed_roles.iter().map(String::as_str)),
            success_status: route.success_status,
            summary_lit: lit(&route.summary),
        }
    }

    pub fn resource(
        &self,
        resource: &Resource,
        names: &ResolvedResource,
        routes: &[RouteSpec],
        policy: UpdatePolicy,
    ) -> Result<ResourceView> {
        let mine: Vec<&RouteSpec> = routes
            .iter()
            .filter(|r| r.resource_name.as_deref() == Some(resource.resolved_name.as_str()))
            .collect();
        let by_method = |m: CrudMethod| mine.iter().copied().find(|r| r.crud_method() == Some(m));

        let record_shape = by_method(CrudMethod::Get).and_then(|r| r.response_shape.as_ref());
        let create_shape = by_method(CrudMethod::Create).and_then(|r| r.request_shape.as_ref());
        let update_shape = by_method(CrudMethod::Update).and_then(|r| r.request_shape.as_ref());
        let name = &resource.resolved_name;
        let fields = self.fields(name, record_shape)?;
        let create_fields = self.fields(name, create_shape)?;
        let update_fields = self.fields(name, update_shape)?;

        let names_of = |fs: &[FieldView], required_only: bool| {
            lit_list(
                fs.iter()
                    .filter(|f| !required_only || f.required)
                    .map(|f| f.name.as_str()),
            )
        };
        let key_int = resource.key.logical_type == LogicalType::Integer;
        let uses_datetime = create_fields
            .iter()
            .chain(&update_fields)
            .any(|f| f.validation.contains("is_datetime"));

        Ok(ResourceView {
            name: name.clone(),
            name_lit: lit(name),
            module: names.module_name.clone(),
            type_name: names.type_name.clone(),
            key: names.key_accessor.clone(),
            key_lit: lit(&resource.key.name),
            key_int,
            key_kind: if key_int { "int" } else { "str" },
            key_generated: resource.key.server_generated,
            create_fields_lit: names_of(&create_fields, false),
            create_required_lit: names_of(&create_fields, true),
            update_fields_lit: names_of(&update_fields, false),
            update_required_lit: names_of(&update_fields, true),
            uses_datetime,
            uses_auth: mine.iter().any(|r| r.requires_auth),
            merge_updates: policy == UpdatePolicy::PartialMerge,
            not_found_lit: lit(&format!("{} not found", names.type_name)),
            conflict_lit: lit(&format!("{} already exists", names.type_name)),
            routes: mine
                .iter()
                .map(|r| self.route(r, &names.module_name))
                .collect(),
            fields,
            create_fields,
            update_fields,
        })
    }

    pub fn auth(&self, config: &AuthConfig, routes: &[RouteSpec]) -> AuthView {
        let path_of = |kind: RouteKind| {
            routes
                .iter()
                .find(|r| r.kind == kind)
                .map(|r| lit(&family_path(r, self.family)))
                .unwrap_or_else(|| lit(""))
        };
        AuthView {
            secret_lit: lit(&config.secret_key),
            lifetime: config.token_lifetime_seconds,
            roles_lit: lit_list(config.roles.iter().map(String::as_str)),
            issue_path_lit: path_of(RouteKind::IssueCredential),
            verify_path_lit: path_of(RouteKind::VerifyCredential),
        }
    }

    pub fn project(
        &self,
        options: &GenerationOptions,
        port: u16,
        include_docs: bool,
        database: DatabaseKind,
        auth: Option<AuthView>,
        resources: Vec<ResourceView>,
    ) -> ProjectView {
        let slug = snake_name(&options.project_name);
        ProjectView {
            database: DatabaseView::new(database, &slug),
            name: options.project_name.clone(),
            name_lit: lit(&options.project_name),
            package_name: slug.replace('_', "-"),
            slug,
            version: options.project_version.clone(),
            version_lit: lit(&options.project_version),
            framework: self.family.framework(),
            family: self.family.as_str(),
            port,
            include_docs,
            auth,
            resource_names_lit: lit_list(resources.iter().map(|r| r.name.as_str())),
            resources,
        }
    }
}
