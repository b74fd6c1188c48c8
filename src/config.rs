//! `crudforge.toml` project configuration.
//!
//! The file sits next to the schema payload (or is passed with `--config`).
//! Values are layered: file, then environment, then command-line flags.
//!
//! ```toml
//! [project]
//! name = "blood_bank"
//! family = "asyncRouted"
//! base_path = "/api"
//! update_policy = "fullReplace"
//! docs = true
//!
//! [auth]
//! enabled = true
//! secret_key = "change-me"
//! token_lifetime_seconds = 1800
//!
//! [auth.methods.DELETE]
//! allowed_roles = ["admin"]
//!
//! [archive]
//! mtime = 0
//! ```
//!
//! ## Environment Variables
//!
//! - `CRUDFORGE_SECRET_KEY`: secret the generated auth module signs tokens with
//! - `CRUDFORGE_TOKEN_LIFETIME`: token lifetime in seconds
//! - `CRUDFORGE_ARCHIVE_MTIME`: modification time stamped on archive entries

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::family::TargetFamily;
use crate::request::{AuthConfig, GenerationOptions, MethodPolicy, UpdatePolicy};
use crate::routes::CrudMethod;

pub const CONFIG_FILE_NAME: &str = "crudforge.toml";
pub const ENV_SECRET_KEY: &str = "CRUDFORGE_SECRET_KEY";
pub const ENV_TOKEN_LIFETIME: &str = "CRUDFORGE_TOKEN_LIFETIME";
pub const ENV_ARCHIVE_MTIME: &str = "CRUDFORGE_ARCHIVE_MTIME";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrudforgeConfig {
    pub project: ProjectSection,
    pub auth: AuthSection,
    pub archive: ArchiveSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub family: Option<TargetFamily>,
    pub base_path: Option<String>,
    pub update_policy: Option<UpdatePolicy>,
    pub strict_types: Option<bool>,
    pub docs: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    pub enabled: bool,
    pub secret_key: Option<String>,
    pub token_lifetime_seconds: Option<u64>,
    pub roles: Option<Vec<String>>,
    /// Keyed by method name (`LIST`, `GET`, `CREATE`, `UPDATE`, `DELETE`).
    pub methods: BTreeMap<String, MethodSection>,
}

/// Per-method override; `requires_auth` defaults to true.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSection {
    #[serde(default = "default_true")]
    pub requires_auth: bool,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSection {
    pub mtime: Option<u64>,
}

impl CrudforgeConfig {
    /// Apply `CRUDFORGE_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_SECRET_KEY) {
            self.auth.secret_key = Some(secret);
        }
        if let Some(raw) = lookup(ENV_TOKEN_LIFETIME) {
            let seconds = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOKEN_LIFETIME}={raw} is not a number of seconds"))?;
            self.auth.token_lifetime_seconds = Some(seconds);
        }
        if let Some(raw) = lookup(ENV_ARCHIVE_MTIME) {
            let mtime = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_ARCHIVE_MTIME}={raw} is not a unix timestamp"))?;
            self.archive.mtime = Some(mtime);
        }
        Ok(())
    }

    /// Generation options with file values over the defaults.
    pub fn generation_options(&self) -> GenerationOptions {
        let defaults = GenerationOptions::default();
        let project = &self.project;
        GenerationOptions {
            project_name: project.name.clone().unwrap_or(defaults.project_name),
            project_version: project.version.clone().unwrap_or(defaults.project_version),
            base_path: project.base_path.clone().unwrap_or(defaults.base_path),
            update_policy: project.update_policy.unwrap_or(defaults.update_policy),
            strict_types: project.strict_types.unwrap_or(defaults.strict_types),
        }
    }

    /// Auth settings, when a secret key is known.
    pub fn auth_config(&self) -> anyhow::Result<Option<AuthConfig>> {
        let auth = &self.auth;
        let Some(secret) = auth.secret_key.as_deref() else {
            return Ok(None);
        };
        let mut config = AuthConfig::new(
            secret,
            auth.token_lifetime_seconds
                .unwrap_or(crate::request::DEFAULT_TOKEN_LIFETIME),
        );
        if let Some(roles) = &auth.roles {
            config = config.with_roles(roles.iter().cloned());
        }
        for (name, section) in &auth.methods {
            let method = <CrudMethod as clap::ValueEnum>::from_str(name, true)
                .map_err(|_| anyhow::anyhow!("[auth.methods.{name}] is not a CRUD method"))?;
            let policy = if section.requires_auth {
                MethodPolicy::roles(section.allowed_roles.iter().cloned())
            } else {
                MethodPolicy::open()
            };
            config = config.with_method(method, policy);
        }
        Ok(Some(config))
    }

    pub fn archive_mtime(&self) -> u64 {
        self.archive.mtime.unwrap_or(0)
    }
}

/// Load a config file.
///
/// Returns `Ok(None)` when the file does not exist and `Err` when it exists
/// but cannot be read or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<CrudforgeConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config: CrudforgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "config loaded");
    Ok(Some(config))
}

/// `crudforge.toml` in the schema file's directory, if present.
pub fn auto_detect_config_path(schema_path: &Path) -> Option<PathBuf> {
    let config_path = schema_path.parent()?.join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Pick the config file: an explicit path must exist; otherwise auto-detect.
pub fn resolve_config_path(
    explicit_path: Option<&Path>,
    schema_path: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    match explicit_path {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => bail!("config file {} does not exist", path.display()),
        None => Ok(auto_detect_config_path(schema_path)),
    }
}
