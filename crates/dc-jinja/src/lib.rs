//! dc-jinja - Jinja templating layer for data-check
//!
//! SQL files and pipeline definitions are rendered once, before they are
//! executed or parsed, against the user's template data plus any fixed
//! variables the caller adds (e.g. `PIPELINE_PATH` for pipelines).
//! `env_var()` and `log()` are available as functions.

pub mod environment;
pub mod error;
pub(crate) mod functions;

pub use environment::TemplateEnvironment;
pub use error::{JinjaError, JinjaResult};
