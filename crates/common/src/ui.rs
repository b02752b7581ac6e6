//! Functions supporting common UI behaviour and standards

use std::path::Path;

/// Renders a Path with double quotes, the standard way this CLI displays
/// paths to users. Preferred to the Debug format because the latter doubles
/// up backslashes on Windows.
pub fn quoted_path(path: impl AsRef<Path>) -> impl std::fmt::Display {
    format!("\"{}\"", path.as_ref().display())
}
