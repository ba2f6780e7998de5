//! Everything that talks to, or fetches, the external `uv` tool.

pub mod installer;
pub mod invoke;
pub mod locator;
pub mod mirror;

pub use installer::{InstallReport, Installer};
pub use invoke::{run_uv, with_python};
pub use locator::find_uv;
pub use mirror::{MirrorResolver, PROBE_TIMEOUT};
