//! # Template Renderer
//!
//! Turns resolved routes and identifiers into the source files of one target
//! family. What gets written where is **data**: each family owns a layout
//! table of [`LayoutRule`]s (`path pattern → source → scope`), and adding a
//! family means adding a table and its templates, never touching another
//! family's rows.
//!
//! Rendering is an order-stable traversal of the layout: project-scoped rules
//! produce one file, resource-scoped rules produce one file per selected
//! resource in declaration order. Any failure aborts the whole render; a
//! partial file list is never returned.
//!
//! Family templates are `minijinja` sources embedded at compile time and run
//! under strict undefined behaviour, so a template that asks for data the view
//! does not carry is a [`RenderError`](crate::error::ErrorKind::RenderError).
//! The README and the docs viewer page are compiled `askama` templates.

mod templates;
mod views;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::Value;

use crate::error::{GenerationError, Result};
use crate::family::{TargetFamily, FAMILY_COUNT};
use crate::naming::Resolution;
use crate::request::{AuthConfig, GenerationOptions, UpdatePolicy};
use crate::routes::{RouteKind, RouteSpec};
use crate::schema::{DatabaseKind, Resource};
use crate::typemap::TypeMapper;

pub use templates::{DocsPageTemplate, EndpointLine, ReadmeSection, ReadmeTemplate};
use templates::render_askama;
use views::{ProjectView, ViewBuilder};

#[cfg(test)]
mod tests;

/// Which part of the request a layout rule expands over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One file per project.
    Project,
    /// One file per selected resource; the path holds `{module}`.
    Resource,
    /// One file, only when auth is included.
    Auth,
    /// One file, only when docs are included.
    Docs,
}

/// Where a rule's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A family template by name.
    Template(&'static str),
    Readme,
    DocsPage,
    OpenApi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRule {
    pub path: &'static str,
    pub source: Source,
    pub scope: Scope,
}

const fn rule(path: &'static str, source: Source, scope: Scope) -> LayoutRule {
    LayoutRule {
        path,
        source,
        scope,
    }
}

use Scope::{Auth, Docs, Project, Resource as PerResource};
use Source::{DocsPage, OpenApi, Readme, Template};

const FLASK_LAYOUT: &[LayoutRule] = &[
    rule("app.py", Template("flask/app.py.j2"), Project),
    rule("config.py", Template("python/config.py.j2"), Project),
    rule("store.py", Template("python/store.py.j2"), Project),
    rule("validators.py", Template("flask/validators.py.j2"), Project),
    rule("auth.py", Template("flask/auth.py.j2"), Auth),
    rule("models/__init__.py", Template("python/package_init.py.j2"), Project),
    rule("models/{module}.py", Template("flask/model.py.j2"), PerResource),
    rule("routes/__init__.py", Template("python/package_init.py.j2"), Project),
    rule("routes/{module}.py", Template("flask/routes.py.j2"), PerResource),
    rule("requirements.txt", Template("flask/requirements.txt.j2"), Project),
    rule("README.md", Readme, Project),
    rule("docs/openapi.json", OpenApi, Docs),
    rule("docs/index.html", DocsPage, Docs),
];

const FASTAPI_LAYOUT: &[LayoutRule] = &[
    rule("main.py", Template("fastapi/main.py.j2"), Project),
    rule("config.py", Template("python/config.py.j2"), Project),
    rule("store.py", Template("python/store.py.j2"), Project),
    rule("auth.py", Template("fastapi/auth.py.j2"), Auth),
    rule("models/__init__.py", Template("python/package_init.py.j2"), Project),
    rule("models/{module}.py", Template("fastapi/model.py.j2"), PerResource),
    rule("routes/__init__.py", Template("python/package_init.py.j2"), Project),
    rule("routes/{module}.py", Template("fastapi/routes.py.j2"), PerResource),
    rule("requirements.txt", Template("fastapi/requirements.txt.j2"), Project),
    rule("README.md", Readme, Project),
    rule("docs/openapi.json", OpenApi, Docs),
    rule("docs/index.html", DocsPage, Docs),
];

const EXPRESS_LAYOUT: &[LayoutRule] = &[
    rule("app.js", Template("express/app.js.j2"), Project),
    rule("config.js", Template("express/config.js.j2"), Project),
    rule("store.js", Template("express/store.js.j2"), Project),
    rule("validators.js", Template("express/validators.js.j2"), Project),
    rule("auth.js", Template("express/auth.js.j2"), Auth),
    rule("models/{module}.js", Template("express/model.js.j2"), PerResource),
    rule("routes/{module}.js", Template("express/routes.js.j2"), PerResource),
    rule("package.json", Template("express/package.json.j2"), Project),
    rule("README.md", Readme, Project),
    rule("docs/openapi.json", OpenApi, Docs),
    rule("docs/index.html", DocsPage, Docs),
];

/// Layout tables indexed by [`TargetFamily::index`].
const LAYOUTS: [&[LayoutRule]; FAMILY_COUNT] = [FLASK_LAYOUT, FASTAPI_LAYOUT, EXPRESS_LAYOUT];

/// How a generated project is installed and started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyProfile {
    pub port: u16,
    pub install: &'static str,
    pub run: &'static str,
}

const PROFILES: [FamilyProfile; FAMILY_COUNT] = [
    FamilyProfile {
        port: 5000,
        install: "pip install -r requirements.txt",
        run: "python app.py",
    },
    FamilyProfile {
        port: 8000,
        install: "pip install -r requirements.txt",
        run: "python main.py",
    },
    FamilyProfile {
        port: 3000,
        install: "npm install",
        run: "npm start",
    },
];

pub fn layout(family: TargetFamily) -> &'static [LayoutRule] {
    LAYOUTS.get(family.index()).copied().unwrap_or(&[])
}

pub fn profile(family: TargetFamily) -> FamilyProfile {
    PROFILES.get(family.index()).copied().unwrap_or(FamilyProfile {
        port: 8080,
        install: "",
        run: "",
    })
}

/// Every embedded family template, by name.
const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("python/config.py.j2", include_str!("../../templates/python/config.py.j2")),
    ("python/store.py.j2", include_str!("../../templates/python/store.py.j2")),
    ("python/tokens.py.j2", include_str!("../../templates/python/tokens.py.j2")),
    ("python/package_init.py.j2", include_str!("../../templates/python/package_init.py.j2")),
    ("flask/app.py.j2", include_str!("../../templates/flask/app.py.j2")),
    ("flask/validators.py.j2", include_str!("../../templates/flask/validators.py.j2")),
    ("flask/auth.py.j2", include_str!("../../templates/flask/auth.py.j2")),
    ("flask/model.py.j2", include_str!("../../templates/flask/model.py.j2")),
    ("flask/routes.py.j2", include_str!("../../templates/flask/routes.py.j2")),
    ("flask/requirements.txt.j2", include_str!("../../templates/flask/requirements.txt.j2")),
    ("fastapi/main.py.j2", include_str!("../../templates/fastapi/main.py.j2")),
    ("fastapi/auth.py.j2", include_str!("../../templates/fastapi/auth.py.j2")),
    ("fastapi/model.py.j2", include_str!("../../templates/fastapi/model.py.j2")),
    ("fastapi/routes.py.j2", include_str!("../../templates/fastapi/routes.py.j2")),
    ("fastapi/requirements.txt.j2", include_str!("../../templates/fastapi/requirements.txt.j2")),
    ("express/app.js.j2", include_str!("../../templates/express/app.js.j2")),
    ("express/config.js.j2", include_str!("../../templates/express/config.js.j2")),
    ("express/store.js.j2", include_str!("../../templates/express/store.js.j2")),
    ("express/validators.js.j2", include_str!("../../templates/express/validators.js.j2")),
    ("express/auth.js.j2", include_str!("../../templates/express/auth.js.j2")),
    ("express/model.js.j2", include_str!("../../templates/express/model.js.j2")),
    ("express/routes.js.j2", include_str!("../../templates/express/routes.js.j2")),
    ("express/package.json.j2", include_str!("../../templates/express/package.json.j2")),
];

/// Template environment shared by all families.
pub fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    for (name, source) in TEMPLATE_SOURCES {
        env.add_template(name, source)
            .map_err(|e| GenerationError::render(*name, e))?;
    }
    Ok(env)
}

/// Everything the renderer reads. Nothing here is mutated.
pub struct RenderInput<'a> {
    pub family: TargetFamily,
    pub mapper: TypeMapper,
    pub options: &'a GenerationOptions,
    pub auth: Option<&'a AuthConfig>,
    pub include_docs: bool,
    /// Database the selected resources were introspected from.
    pub database: DatabaseKind,
    pub resources: &'a [&'a Resource],
    pub resolution: &'a Resolution,
    pub routes: &'a [RouteSpec],
    /// Synthesized OpenAPI document; required when `include_docs`.
    pub openapi: Option<&'a Value>,
}

/// A rendered file before packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

/// Render every file of the family layout, in layout order.
pub fn render(input: &RenderInput<'_>) -> Result<Vec<RenderedFile>> {
    let env = environment()?;
    let project = project_view(input)?;
    let mut files = Vec::new();

    for rule in layout(input.family) {
        match rule.scope {
            Scope::Auth if input.auth.is_none() => continue,
            Scope::Docs if !input.include_docs => continue,
            Scope::Resource => {
                for (index, resource) in project.resources.iter().enumerate() {
                    let path = rule.path.replace("{module}", &resource.module);
                    let ctx = minijinja::context! {
                        project => &project,
                        resource => resource,
                        resource_index => index,
                    };
                    let content = render_rule(&env, rule, &path, ctx, input, &project)?;
                    files.push(RenderedFile { path, content });
                }
                continue;
            }
            _ => {}
        }
        let ctx = minijinja::context! { project => &project };
        let content = render_rule(&env, rule, rule.path, ctx, input, &project)?;
        files.push(RenderedFile {
            path: rule.path.to_string(),
            content,
        });
    }

    tracing::debug!(
        family = %input.family,
        files = files.len(),
        "project rendered"
    );
    Ok(files)
}

fn render_rule(
    env: &Environment<'static>,
    rule: &LayoutRule,
    path: &str,
    ctx: minijinja::Value,
    input: &RenderInput<'_>,
    project: &ProjectView,
) -> Result<String> {
    match rule.source {
        Source::Template(name) => env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map_err(|e| GenerationError::render(path, e)),
        Source::Readme => render_askama(&readme(input, project), path),
        Source::DocsPage => render_askama(
            &DocsPageTemplate {
                title: project.name.clone(),
                spec_url: "/openapi.json".to_string(),
            },
            path,
        ),
        Source::OpenApi => match input.openapi {
            Some(doc) => crate::docs::to_json(doc, path),
            None => Err(GenerationError::render(
                path,
                "documentation requested but no document was synthesized",
            )),
        },
    }
}

fn project_view(input: &RenderInput<'_>) -> Result<ProjectView> {
    let mut resources = Vec::with_capacity(input.resources.len());
    for resource in input.resources {
        let names = input
            .resolution
            .get(&resource.resolved_name)
            .ok_or_else(|| {
                GenerationError::render(
                    "layout",
                    format!("no resolved names for {}", resource.resolved_name),
                )
            })?;
        let builder = ViewBuilder {
            family: input.family,
            mapper: input.mapper,
            path: &resource.resolved_name,
        };
        resources.push(builder.resource(
            resource,
            names,
            input.routes,
            input.options.update_policy,
        )?);
    }
    let builder = ViewBuilder {
        family: input.family,
        mapper: input.mapper,
        path: "layout",
    };
    let auth = input.auth.map(|config| builder.auth(config, input.routes));
    Ok(builder.project(
        input.options,
        profile(input.family).port,
        input.include_docs,
        input.database,
        auth,
        resources,
    ))
}

fn readme(input: &RenderInput<'_>, project: &ProjectView) -> ReadmeTemplate {
    let line = |route: &RouteSpec| EndpointLine {
        method: route.http_method.as_str().to_string(),
        path: route.path.clone(),
        summary: route.summary.clone(),
        access: if route.requires_auth {
            format!("roles: {}", route.allowed_roles.join(", "))
        } else {
            "public".to_string()
        },
    };
    let mut sections: Vec<ReadmeSection> = project
        .resources
        .iter()
        .map(|resource| ReadmeSection {
            title: resource.type_name.clone(),
            endpoints: input
                .routes
                .iter()
                .filter(|r| r.resource_name.as_deref() == Some(resource.name.as_str()))
                .map(line)
                .collect(),
        })
        .collect();
    let credential: Vec<EndpointLine> = input
        .routes
        .iter()
        .filter(|r| matches!(r.kind, RouteKind::IssueCredential | RouteKind::VerifyCredential))
        .map(line)
        .collect();
    if !credential.is_empty() {
        sections.push(ReadmeSection {
            title: "Authentication".to_string(),
            endpoints: credential,
        });
    }
    let profile = profile(input.family);
    ReadmeTemplate {
        name: project.name.clone(),
        version: project.version.clone(),
        framework: project.framework.to_string(),
        install: profile.install.to_string(),
        run: profile.run.to_string(),
        port: profile.port,
        database: project.database.label.to_string(),
        database_env: project.database.url_env.to_string(),
        sections,
        include_auth: input.auth.is_some(),
        include_docs: input.include_docs,
        roles: input
            .auth
            .map(|a| a.roles.join(", "))
            .unwrap_or_default(),
        merge_updates: input.options.update_policy == UpdatePolicy::PartialMerge,
    }
}
