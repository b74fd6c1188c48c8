use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, resolve_config_path, CrudforgeConfig};
use crate::diagnostics::GenerationWarning;
use crate::engine::{generate_with_schema_warnings, GenerationReport};
use crate::export::{ArchiveTarget, DirectoryTarget, ExportTarget, ProjectRecord};
use crate::family::TargetFamily;
use crate::request::{AuthConfig, GenerationRequest, UpdatePolicy};
use crate::routes::RouteSpec;
use crate::schema::{normalize, FileSchemaSource, Normalized, SchemaModel, SchemaSource};

/// Command-line interface for crudforge
#[derive(Parser, Debug)]
#[command(name = "crudforge-gen")]
#[command(about = "Generate CRUD API projects from database schemas", long_about = None)]
pub struct Cli {
    /// Emit log events as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Schema input shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Introspection snapshot (JSON, or YAML for .yaml/.yml)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Project configuration file (default: crudforge.toml next to the schema)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a project and export it
    Generate {
        #[command(flatten)]
        input: SchemaArgs,

        /// Resources to include, comma-separated (default: all)
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        resources: Vec<String>,

        /// Target framework family
        #[arg(long, value_enum)]
        family: Option<TargetFamily>,

        /// Include the credential module and route guards
        #[arg(long, default_value_t = false)]
        auth: bool,

        /// Include the OpenAPI document and viewer page
        #[arg(long, default_value_t = false)]
        docs: bool,

        /// Write the project tree into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the project as a tar archive
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Write into a non-empty output directory
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// Project name used in the README, docs and package manifest
        #[arg(long)]
        name: Option<String>,

        /// Project version used in the docs
        #[arg(long)]
        version: Option<String>,

        /// Prefix for every generated route, e.g. /api
        #[arg(long)]
        base_path: Option<String>,

        /// How UPDATE treats fields missing from the body
        #[arg(long, value_enum)]
        update_policy: Option<UpdatePolicy>,

        /// Fail on unrecognized column types instead of falling back
        #[arg(long, default_value_t = false)]
        strict_types: bool,

        /// Secret the generated auth module signs tokens with
        #[arg(long)]
        secret_key: Option<String>,

        /// Token lifetime in seconds
        #[arg(long)]
        token_lifetime: Option<u64>,
    },
    /// Print the normalized model and the routes a project would expose
    Inspect {
        #[command(flatten)]
        input: SchemaArgs,

        /// Resources to include, comma-separated (default: all)
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        resources: Vec<String>,

        /// Target framework family
        #[arg(long, value_enum, default_value = "sync-routed")]
        family: TargetFamily,
    },
    /// Normalize a schema and list its warnings
    Validate {
        #[command(flatten)]
        input: SchemaArgs,
    },
}

/// Install the global subscriber: `RUST_LOG` filter (default `info`) on stderr.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            input,
            resources,
            family,
            auth,
            docs,
            output,
            archive,
            force,
            name,
            version,
            base_path,
            update_policy,
            strict_types,
            secret_key,
            token_lifetime,
        } => {
            let mut config = load_project_config(&input)?;
            if let Some(secret) = secret_key {
                config.auth.secret_key = Some(secret);
            }
            if let Some(seconds) = token_lifetime {
                config.auth.token_lifetime_seconds = Some(seconds);
            }
            let family = family.or(config.project.family).ok_or_else(|| {
                anyhow::anyhow!("no target family: pass --family or set [project].family")
            })?;

            let mut options = config.generation_options();
            if let Some(name) = name {
                options.project_name = name;
            }
            if let Some(version) = version {
                options.project_version = version;
            }
            if let Some(base_path) = base_path {
                options.base_path = base_path;
            }
            if let Some(policy) = update_policy {
                options.update_policy = policy;
            }
            options.strict_types |= strict_types;

            let normalized = load_schema(&input.schema)?;
            let selected = selection(&normalized.schema, resources);
            let mut request = GenerationRequest::new(normalized.schema, selected, family)
                .with_docs(docs || config.project.docs.unwrap_or(false))
                .with_options(options);
            if auth || config.auth.enabled {
                request = request.with_auth(required_auth(&config)?);
            }

            let result = generate_with_schema_warnings(&request, &normalized.warnings);
            let report = GenerationReport::from_result(&result);
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    print_json(&report)?;
                    return Err(err).context("generation failed");
                }
            };

            let mut record = ProjectRecord::new(outcome.project_id());
            record.mark_generated()?;
            let mut targets: Vec<Box<dyn ExportTarget>> = Vec::new();
            if let Some(dir) = output {
                targets.push(Box::new(DirectoryTarget::new(dir).overwrite(force)));
            }
            if let Some(path) = archive {
                targets.push(Box::new(ArchiveTarget::new(path, config.archive_mtime())));
            }
            if !targets.is_empty() {
                for target in &targets {
                    if let Err(err) = target.ship(record.id(), &outcome.bundle) {
                        record.mark_failed()?;
                        return Err(err).context("export failed");
                    }
                }
                record.mark_exported()?;
            } else {
                tracing::warn!("no --output or --archive given; nothing written");
            }
            tracing::info!(project = record.id(), status = %record.status(), "done");
            print_json(&report)
        }
        Commands::Inspect {
            input,
            resources,
            family,
        } => {
            let config = load_project_config(&input)?;
            let normalized = load_schema(&input.schema)?;
            let selected = selection(&normalized.schema, resources);
            let request = GenerationRequest::new(normalized.schema.clone(), selected, family)
                .with_options(config.generation_options());
            let outcome = generate_with_schema_warnings(&request, &normalized.warnings)
                .context("planning routes")?;
            print_json(&Inspection {
                schema: &normalized.schema,
                routes: &outcome.routes,
                warnings: &outcome.warnings,
            })
        }
        Commands::Validate { input } => {
            let normalized = load_schema(&input.schema)?;
            println!(
                "{}: {} resources, {} warnings",
                input.schema.display(),
                normalized.schema.resources.len(),
                normalized.warnings.len()
            );
            for warning in &normalized.warnings {
                println!("  {warning}");
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct Inspection<'a> {
    schema: &'a SchemaModel,
    routes: &'a [RouteSpec],
    warnings: &'a [GenerationWarning],
}

fn load_project_config(input: &SchemaArgs) -> anyhow::Result<CrudforgeConfig> {
    let mut config = match resolve_config_path(input.config.as_deref(), &input.schema)? {
        Some(path) => load_config(&path)?.unwrap_or_default(),
        None => CrudforgeConfig::default(),
    };
    config.apply_env()?;
    Ok(config)
}

fn load_schema(path: &Path) -> anyhow::Result<Normalized> {
    let raw = FileSchemaSource::new(path).fetch()?;
    let normalized = normalize(&raw)?;
    tracing::debug!(
        path = %path.display(),
        resources = normalized.schema.resources.len(),
        "schema normalized"
    );
    Ok(normalized)
}

/// Explicit selection, or every resource in declaration order.
fn selection(schema: &SchemaModel, requested: Vec<String>) -> Vec<String> {
    if requested.is_empty() {
        schema.names().map(str::to_string).collect()
    } else {
        requested
    }
}

fn required_auth(config: &CrudforgeConfig) -> anyhow::Result<AuthConfig> {
    match config.auth_config()? {
        Some(auth) => Ok(auth),
        None => bail!(
            "auth needs a secret key: pass --secret-key, set {} or [auth].secret_key",
            crate::config::ENV_SECRET_KEY
        ),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}
