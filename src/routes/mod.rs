//! Route model shared by the renderer and the documentation synthesizer.

mod auth;
mod synth;
mod types;

pub use auth::{scaffold, AUTH_SEGMENT};
pub use synth::{synthesize, RouteOptions};
pub use types::{
    CrudMethod, HttpMethod, PathParam, RouteKind, RouteSpec, Shape, ShapeField, ShapeKind,
};

#[cfg(test)]
mod tests;
