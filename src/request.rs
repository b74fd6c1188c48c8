//! Generation request contract and its validation.
//!
//! Everything here is checked before the engine renders anything: a request
//! that fails validation is rejected as `InvalidRequest` with no side effects.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::family::TargetFamily;
use crate::routes::CrudMethod;
use crate::schema::{Resource, SchemaModel};

pub const DEFAULT_ROLES: [&str; 3] = ["admin", "developer", "user"];
pub const DEFAULT_TOKEN_LIFETIME: u64 = 3600;

/// How UPDATE treats fields missing from the body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum UpdatePolicy {
    /// Missing fields keep their stored value (`PATCH`).
    #[default]
    PartialMerge,
    /// The body replaces the record; required fields must be present (`PUT`).
    FullReplace,
}

/// Access rule for one CRUD method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodPolicy {
    pub requires_auth: bool,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

impl MethodPolicy {
    pub fn open() -> Self {
        MethodPolicy {
            requires_auth: false,
            allowed_roles: Vec::new(),
        }
    }

    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MethodPolicy {
            requires_auth: true,
            allowed_roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub secret_key: String,
    #[serde(default = "default_lifetime")]
    pub token_lifetime_seconds: u64,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    /// Per-method overrides; a method without an entry requires any configured role.
    #[serde(default)]
    pub methods: BTreeMap<CrudMethod, MethodPolicy>,
}

fn default_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME
}

fn default_roles() -> Vec<String> {
    DEFAULT_ROLES.iter().map(|r| r.to_string()).collect()
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>, token_lifetime_seconds: u64) -> Self {
        AuthConfig {
            secret_key: secret_key.into(),
            token_lifetime_seconds,
            roles: default_roles(),
            methods: BTreeMap::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_method(mut self, method: CrudMethod, policy: MethodPolicy) -> Self {
        self.methods.insert(method, policy);
        self
    }

    /// Effective policy for `method`.
    pub fn policy(&self, method: CrudMethod) -> MethodPolicy {
        self.methods
            .get(&method)
            .cloned()
            .unwrap_or_else(|| MethodPolicy::roles(self.roles.iter().cloned()))
    }

    fn validate(&self) -> Result<()> {
        if self.secret_key.trim().is_empty() {
            return Err(invalid("auth secret key must not be empty"));
        }
        if self.token_lifetime_seconds == 0 {
            return Err(invalid("token lifetime must be greater than zero"));
        }
        if self.roles.is_empty() {
            return Err(invalid("at least one role must be configured"));
        }
        for (method, policy) in &self.methods {
            if let Some(role) = policy
                .allowed_roles
                .iter()
                .find(|r| !self.roles.contains(r))
            {
                return Err(invalid(format!(
                    "{method} allows role '{role}', which is not among the configured roles"
                )));
            }
            if policy.requires_auth && policy.allowed_roles.is_empty() {
                return Err(invalid(format!(
                    "{method} requires auth but allows no roles"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub project_name: String,
    pub project_version: String,
    /// Prefix for every generated route, e.g. `/api`.
    pub base_path: String,
    pub update_policy: UpdatePolicy,
    /// Reject `unknown` types instead of falling back.
    pub strict_types: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            project_name: "generated_api".to_string(),
            project_version: "1.0.0".to_string(),
            base_path: String::new(),
            update_policy: UpdatePolicy::PartialMerge,
            strict_types: false,
        }
    }
}

impl GenerationOptions {
    fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(invalid("project name must not be empty"));
        }
        if self.project_version.trim().is_empty() {
            return Err(invalid("project version must not be empty"));
        }
        let base = &self.base_path;
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.');
        if !base.is_empty()
            && (!base.starts_with('/') || base.ends_with('/') || !base.chars().all(allowed))
        {
            return Err(invalid(format!(
                "base path '{base}' must start with '/' and use only letters, digits, '/', '-', '_' or '.'"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub schema: SchemaModel,
    pub selected_resource_names: BTreeSet<String>,
    pub target_family: TargetFamily,
    #[serde(default)]
    pub include_auth: bool,
    #[serde(default)]
    pub include_docs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<AuthConfig>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new<I, S>(schema: SchemaModel, selected: I, target_family: TargetFamily) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GenerationRequest {
            schema,
            selected_resource_names: selected.into_iter().map(Into::into).collect(),
            target_family,
            include_auth: false,
            include_docs: false,
            auth_config: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_auth(mut self, config: AuthConfig) -> Self {
        self.include_auth = true;
        self.auth_config = Some(config);
        self
    }

    pub fn with_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the request and return the selected resources in declaration order.
    pub fn validate(&self) -> Result<Vec<&Resource>> {
        if self.selected_resource_names.is_empty() {
            return Err(invalid("no resources selected"));
        }
        let mut indices = BTreeSet::new();
        for name in &self.selected_resource_names {
            indices.insert(self.selected_index(name)?);
        }
        match (&self.auth_config, self.include_auth) {
            (Some(config), true) => config.validate()?,
            (None, true) => return Err(invalid("includeAuth requires an auth config")),
            (Some(_), false) => {
                return Err(invalid("auth config supplied but includeAuth is false"))
            }
            (None, false) => {}
        }
        self.options.validate()?;

        Ok(indices.into_iter().map(|i| &self.schema.resources[i]).collect())
    }

    /// Index of the one resource `name` selects: a resolved-name match wins,
    /// otherwise the raw name must match exactly one resource.
    fn selected_index(&self, name: &str) -> Result<usize> {
        let resources = &self.schema.resources;
        if let Some(i) = resources.iter().position(|r| r.resolved_name == name) {
            return Ok(i);
        }
        let mut raw = resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.raw_name == name)
            .map(|(i, _)| i);
        match (raw.next(), raw.next()) {
            (Some(i), None) => Ok(i),
            (Some(_), Some(_)) => Err(invalid(format!(
                "selected resource '{name}' matches more than one raw name"
            ))),
            (None, _) => Err(invalid(format!(
                "selected resource '{name}' is not in the schema"
            ))),
        }
    }
}

fn invalid(message: impl Into<String>) -> GenerationError {
    GenerationError::InvalidRequest(message.into())
}
