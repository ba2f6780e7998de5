//! Internal implementation modules for `uda-core`.
//!
//! Binaries should go through the handlers re-exported from the crate root.

pub mod commands;
pub mod config;
pub mod envs;
pub mod errors;
pub(crate) mod fs;
pub(crate) mod net;
pub mod runtime;
pub mod shell;
pub mod tooling;
pub mod uv;
