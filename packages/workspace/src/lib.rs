//! # Folio Workspace
//!
//! Persistence and control for one book project: base snapshot, append-only
//! patch log, derived working snapshot, and the [`Project`] that ties them
//! to an in-memory [`folio_editor::Document`].

pub mod config;
mod errors;
pub mod project;
pub mod store;

pub use config::{GeneratorConfig, ProjectConfig, CONFIG_FILE};
pub use errors::{ProjectError, ProjectResult};
pub use project::{LoadReport, LoadSource, LoadState, Mutation, Project, Verification};
pub use store::{LogEntry, Manifest, PatchLog};
