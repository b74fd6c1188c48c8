//! # Generation Engine
//!
//! One synchronous, stateless pass from a [`GenerationRequest`] to an
//! [`ArtifactBundle`]:
//!
//! ```text
//! validate → type check → resolve identifiers → synthesize routes
//!          → scaffold auth → synthesize docs → render → package
//! ```
//!
//! Every stage allocates its own data; nothing survives the call. A fatal
//! error at any stage returns before the bundle is built, so a caller never
//! sees a partial project.

use serde::Serialize;
use tracing::info;

use crate::bundle::{ArtifactBundle, FileSummary};
use crate::diagnostics::{log_warnings, GenerationWarning, WarningKind};
use crate::docs::{self, DocInfo};
use crate::error::{ErrorKind, GenerationError, Result};
use crate::family::TargetFamily;
use crate::naming;
use crate::render::{self, RenderInput};
use crate::request::GenerationRequest;
use crate::routes::{self, RouteOptions, RouteSpec};
use crate::schema::Resource;
use crate::typemap::TypeMapper;

/// Length of the digest prefix used as a project id.
pub const PROJECT_ID_LEN: usize = 16;

/// A successful generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub bundle: ArtifactBundle,
    pub routes: Vec<RouteSpec>,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationOutcome {
    pub fn digest(&self) -> String {
        self.bundle.digest()
    }

    /// Deterministic id derived from the bundle digest.
    pub fn project_id(&self) -> String {
        self.digest().chars().take(PROJECT_ID_LEN).collect()
    }
}

/// Caller-facing result of a generation, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GenerationReport {
    Generated {
        project_id: String,
        digest: String,
        files: Vec<FileSummary>,
        warnings: Vec<GenerationWarning>,
    },
    Failed {
        error_kind: ErrorKind,
        message: String,
    },
}

impl GenerationReport {
    pub fn from_result(result: &Result<GenerationOutcome>) -> Self {
        match result {
            Ok(outcome) => {
                let digest = outcome.digest();
                GenerationReport::Generated {
                    project_id: digest.chars().take(PROJECT_ID_LEN).collect(),
                    digest,
                    files: outcome.bundle.summary(),
                    warnings: outcome.warnings.clone(),
                }
            }
            Err(err) => GenerationReport::Failed {
                error_kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationReport::Generated { .. })
    }
}

/// Generate a project bundle for `request`.
pub fn generate(request: &GenerationRequest) -> Result<GenerationOutcome> {
    generate_with_schema_warnings(request, &[])
}

/// Like [`generate`], carrying over normalizer warnings for the selected resources.
pub fn generate_with_schema_warnings(
    request: &GenerationRequest,
    schema_warnings: &[GenerationWarning],
) -> Result<GenerationOutcome> {
    let selected = request.validate()?;
    let family = request.target_family;
    let options = &request.options;
    let mapper = TypeMapper::with_strict(options.strict_types);

    let mut warnings: Vec<GenerationWarning> = schema_warnings
        .iter()
        .filter(|w| selected.iter().any(|r| r.resolved_name == w.resource_name))
        .cloned()
        .collect();
    check_types(&selected, family, mapper, &mut warnings)?;

    let resolution = naming::resolve(&selected, family, &mut warnings)?;
    let mut routes = routes::synthesize(
        &selected,
        &resolution,
        &RouteOptions {
            base_path: options.base_path.clone(),
            update_policy: options.update_policy,
        },
    )?;
    let auth = if request.include_auth {
        request.auth_config.as_ref()
    } else {
        None
    };
    if let Some(config) = auth {
        routes::scaffold(&mut routes, config, &options.base_path);
    }

    let openapi = request.include_docs.then(|| {
        let description = format!("{} service generated by crudforge", family.framework());
        docs::synthesize(
            &routes,
            &DocInfo {
                title: &options.project_name,
                version: &options.project_version,
                description: &description,
            },
        )
    });

    let files = render::render(&RenderInput {
        family,
        mapper,
        options,
        auth,
        include_docs: request.include_docs,
        database: request.schema.database,
        resources: &selected,
        resolution: &resolution,
        routes: &routes,
        openapi: openapi.as_ref(),
    })?;

    let mut builder = ArtifactBundle::builder();
    for file in files {
        builder.add_text(file.path, file.content)?;
    }
    let bundle = builder.build();

    log_warnings(&warnings);
    info!(
        family = %family,
        resources = selected.len(),
        routes = routes.len(),
        files = bundle.len(),
        warnings = warnings.len(),
        "project generated"
    );
    Ok(GenerationOutcome {
        bundle,
        routes,
        warnings,
    })
}

/// Fail on unmappable fields, or record one fallback warning per `unknown` field.
fn check_types(
    selected: &[&Resource],
    family: TargetFamily,
    mapper: TypeMapper,
    warnings: &mut Vec<GenerationWarning>,
) -> Result<()> {
    for resource in selected {
        for field in &resource.fields {
            let mapped = mapper.map(&field.logical_type, family).ok_or_else(|| {
                GenerationError::UnsupportedType {
                    resource: resource.resolved_name.clone(),
                    field: field.resolved_name.clone(),
                    logical_type: field.logical_type.to_string(),
                    family: family.to_string(),
                }
            })?;
            if mapped.fallback {
                warnings.push(GenerationWarning::field(
                    &resource.resolved_name,
                    &field.resolved_name,
                    WarningKind::TypeFallback,
                    format!(
                        "raw type '{}' is not recognized; generated as {} {}",
                        field.raw_type,
                        family.framework(),
                        mapped.type_expr
                    ),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{AuthConfig, GenerationOptions};
    use crate::schema::{normalize, DatabaseKind, RawField, RawResource, RawSchema, SchemaModel};

    fn schema() -> SchemaModel {
        let raw = RawSchema {
            database: DatabaseKind::Mysql,
            resources: vec![RawResource {
                name: "asset".into(),
                fields: vec![
                    RawField::new("id", "int(11)").primary_key().auto_increment(),
                    RawField::new("label", "varchar(40)"),
                    RawField::new("outline", "geometry"),
                ],
            }],
        };
        normalize(&raw).unwrap().schema
    }

    #[test]
    fn test_unknown_type_warns_once() {
        let request = GenerationRequest::new(schema(), ["asset"], TargetFamily::AsyncRouted);
        let outcome = generate(&request).unwrap();
        let fallbacks: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::TypeFallback)
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].field_name.as_deref(), Some("outline"));
    }

    #[test]
    fn test_strict_types_reject_unknown() {
        let request = GenerationRequest::new(schema(), ["asset"], TargetFamily::AsyncRouted)
            .with_options(GenerationOptions {
                strict_types: true,
                ..GenerationOptions::default()
            });
        let err = generate(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedTypeError);
    }

    #[test]
    fn test_report_shapes() {
        let request = GenerationRequest::new(schema(), ["asset"], TargetFamily::SyncRouted);
        let report = GenerationReport::from_result(&generate(&request));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "generated");
        assert_eq!(value["projectId"].as_str().unwrap().len(), PROJECT_ID_LEN);
        assert!(value["files"][0]["isBinary"].is_boolean());

        let bad = GenerationRequest::new(schema(), ["nothing"], TargetFamily::SyncRouted);
        let report = GenerationReport::from_result(&generate(&bad));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["errorKind"], "InvalidRequest");
    }

    #[test]
    fn test_auth_routes_follow_crud_routes() {
        let request = GenerationRequest::new(schema(), ["asset"], TargetFamily::EventLoopRouted)
            .with_auth(AuthConfig::new("k", 60));
        let outcome = generate(&request).unwrap();
        assert_eq!(outcome.routes.len(), 7);
        assert!(outcome.routes[..5].iter().all(|r| r.requires_auth));
        assert!(outcome.bundle.get("auth.js").is_some());
    }
}
