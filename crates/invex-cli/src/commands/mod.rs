//! CLI subcommands.

pub mod config;
pub mod evaluate;
pub mod process;

use invex_core::InvexConfig;

/// Load pipeline configuration from an explicit path, or fall back to
/// defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    match config_path {
        Some(path) => Ok(InvexConfig::from_file(std::path::Path::new(path))?),
        None => Ok(InvexConfig::default()),
    }
}
