use serde::{Deserialize, Serialize};

use crate::schema::LogicalType;

/// The five canonical CRUD operations, declared in emission order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrudMethod {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl CrudMethod {
    /// Fixed emission order within a resource.
    pub const ALL: [CrudMethod; 5] = [
        CrudMethod::List,
        CrudMethod::Get,
        CrudMethod::Create,
        CrudMethod::Update,
        CrudMethod::Delete,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CrudMethod::List => "LIST",
            CrudMethod::Get => "GET",
            CrudMethod::Create => "CREATE",
            CrudMethod::Update => "UPDATE",
            CrudMethod::Delete => "DELETE",
        }
    }

    /// Verb used in handler names and operation ids.
    pub const fn verb(self) -> &'static str {
        match self {
            CrudMethod::List => "list",
            CrudMethod::Get => "get",
            CrudMethod::Create => "create",
            CrudMethod::Update => "update",
            CrudMethod::Delete => "delete",
        }
    }

    /// Whether the route addresses a single record through the key segment.
    pub const fn targets_record(self) -> bool {
        matches!(self, CrudMethod::Get | CrudMethod::Update | CrudMethod::Delete)
    }
}

impl std::fmt::Display for CrudMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verb a route is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase form used by routers and OpenAPI path items.
    pub fn lower(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

/// What a route does: one of the CRUD operations, or a credential endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "method")]
pub enum RouteKind {
    Crud(CrudMethod),
    IssueCredential,
    VerifyCredential,
}

impl RouteKind {
    pub fn crud(self) -> Option<CrudMethod> {
        match self {
            RouteKind::Crud(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    /// Full record as returned by the API.
    Record,
    /// Array of records.
    RecordList,
    /// Body accepted by CREATE.
    CreateBody,
    /// Body accepted by UPDATE.
    UpdateBody,
    CredentialRequest,
    Token,
    Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeField {
    /// JSON property name.
    pub name: String,
    /// Identifier used for the property in generated source.
    pub accessor: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub required: bool,
}

/// A request or response body contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Component name shared by generated models and the docs (`Donor`, `DonorCreate`).
    pub name: String,
    pub kind: ShapeKind,
    pub fields: Vec<ShapeField>,
}

impl Shape {
    pub fn required_fields(&self) -> impl Iterator<Item = &ShapeField> {
        self.fields.iter().filter(|f| f.required)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathParam {
    pub name: String,
    pub logical_type: LogicalType,
}

impl PathParam {
    pub fn is_integer(&self) -> bool {
        self.logical_type == LogicalType::Integer
    }
}

/// One endpoint of the generated project; the renderer and the docs both read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Resolved name of the resource, `None` for credential routes.
    pub resource_name: Option<String>,
    pub kind: RouteKind,
    pub http_method: HttpMethod,
    /// Path with `{param}` placeholders, including any base path.
    pub path: String,
    pub path_param: Option<PathParam>,
    pub operation_id: String,
    pub tag: String,
    pub summary: String,
    pub request_shape: Option<Shape>,
    pub response_shape: Option<Shape>,
    pub success_status: u16,
    pub error_statuses: Vec<u16>,
    pub requires_auth: bool,
    /// Roles allowed through; only meaningful when `requires_auth`.
    pub allowed_roles: Vec<String>,
}

impl RouteSpec {
    pub fn crud_method(&self) -> Option<CrudMethod> {
        self.kind.crud()
    }

    /// Path rendered with a family-specific parameter syntax.
    pub fn path_with(&self, render_param: impl Fn(&PathParam) -> String) -> String {
        match &self.path_param {
            Some(param) => self
                .path
                .replace(&format!("{{{}}}", param.name), &render_param(param)),
            None => self.path.clone(),
        }
    }

    pub(crate) fn add_error_status(&mut self, status: u16) {
        if !self.error_statuses.contains(&status) {
            self.error_statuses.push(status);
            self.error_statuses.sort_unstable();
        }
    }
}
