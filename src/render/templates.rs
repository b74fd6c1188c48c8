use askama::Template;

use crate::error::{GenerationError, Result};

/// One endpoint line of the generated README.
#[derive(Debug, Clone)]
pub struct EndpointLine {
    pub method: String,
    pub path: String,
    pub summary: String,
    pub access: String,
}

#[derive(Debug, Clone)]
pub struct ReadmeSection {
    pub title: String,
    pub endpoints: Vec<EndpointLine>,
}

#[derive(Template)]
#[template(path = "README.md", escape = "none")]
pub struct ReadmeTemplate {
    pub name: String,
    pub version: String,
    pub framework: String,
    pub install: String,
    pub run: String,
    pub port: u16,
    pub database: String,
    pub database_env: String,
    pub sections: Vec<ReadmeSection>,
    pub include_auth: bool,
    pub include_docs: bool,
    pub roles: String,
    pub merge_updates: bool,
}

/// Standalone viewer page for `docs/openapi.json`.
#[derive(Template)]
#[template(path = "docs.index.html")]
pub struct DocsPageTemplate {
    pub title: String,
    pub spec_url: String,
}

/// Render an askama template, mapping failures to a render error for `path`.
pub fn render_askama(template: &impl Template, path: &str) -> Result<String> {
    template
        .render()
        .map_err(|e| GenerationError::render(path, e))
}
