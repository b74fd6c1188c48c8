//! # CLI Module
//!
//! Command-line front end of the generator, shipped as the `crudforge-gen`
//! binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Normalize a schema snapshot, generate a project and export it:
//!
//! ```bash
//! crudforge-gen generate --schema schema.json --family async-routed --output my-api
//! ```
//!
//! Options:
//! - `--schema <FILE>` - introspection snapshot, JSON or YAML (required)
//! - `--resources <A,B>` - resources to include (default: all)
//! - `--family <FAMILY>` - `sync-routed`, `async-routed` or `event-loop-routed`
//! - `--auth` / `--docs` - include the credential module / the OpenAPI docs
//! - `--output <DIR>` - write the project tree into a directory
//! - `--archive <FILE>` - write the project as a tar archive
//! - `--force` - write into a non-empty output directory
//! - `--config <FILE>` - `crudforge.toml` (auto-detected next to the schema)
//!
//! The generation report is printed to stdout as JSON.
//!
//! ### `inspect`
//!
//! Print the normalized model and the routes a project would expose:
//!
//! ```bash
//! crudforge-gen inspect --schema schema.json --family sync-routed
//! ```
//!
//! ### `validate`
//!
//! Normalize only and list the warnings:
//!
//! ```bash
//! crudforge-gen validate --schema schema.yaml
//! ```
//!
//! ## Logging
//!
//! Log output goes to stderr, filtered by `RUST_LOG` (default `info`).
//! `--log-json` switches to one JSON object per event.

mod commands;


pub use commands::{init_tracing, run_cli, Cli, Commands, SchemaArgs};
