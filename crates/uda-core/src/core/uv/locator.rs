use std::path::PathBuf;

use uda_domain::HomeLayout;

use crate::core::errors::UdaError;

/// Managed copy under the uda home first, then `uv` on `PATH`.
pub fn find_uv(layout: &HomeLayout) -> Result<PathBuf, UdaError> {
    locate(layout, || which::which("uv").ok())
}

fn locate(
    layout: &HomeLayout,
    search_path: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, UdaError> {
    let managed = layout.tool_path();
    if managed.is_file() {
        tracing::debug!(path = %managed.display(), "using managed uv");
        return Ok(managed);
    }
    match search_path() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using uv from PATH");
            Ok(path)
        }
        None => Err(UdaError::ToolNotFound),
    }
}
