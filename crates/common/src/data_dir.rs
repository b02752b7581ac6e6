//! Resolves FTL's default data directory paths

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Return the default data directory for FTL, used as the root of the
/// content-addressed OCI artifact cache unless overridden.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(data_dir) = std::env::var("FTL_DATA_DIR") {
        return Ok(PathBuf::from(data_dir));
    }

    let data_dir = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".ftl")))
        .ok_or_else(|| anyhow!("Unable to get local data directory or home directory"))?;
    Ok(data_dir.join("ftl"))
}
