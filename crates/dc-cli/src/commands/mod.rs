//! CLI command implementations

pub(crate) mod common;
pub(crate) mod generate;
pub(crate) mod load;
pub(crate) mod ping;
pub(crate) mod run;
pub(crate) mod sql;
