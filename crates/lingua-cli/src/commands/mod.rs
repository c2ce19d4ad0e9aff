//! CLI command handlers

pub mod chat;
pub mod init;
pub mod progress;
pub mod validate;

pub use chat::run_chat;
pub use init::run_init;
pub use progress::run_progress;
pub use validate::run_validate;

use lingua::LinguaConfig;
use std::path::{Path, PathBuf};

/// Config file next to the working directory
pub const LOCAL_CONFIG: &str = "lingua.toml";

/// Explicit path, then `./lingua.toml`, then the user config directory, then defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LinguaConfig> {
    if let Some(path) = path {
        return LinguaConfig::load(Some(path));
    }

    let candidates: Vec<PathBuf> = [
        Some(PathBuf::from(LOCAL_CONFIG)),
        dirs::config_dir().map(|dir| dir.join("lingua").join("config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect();

    match candidates.iter().find(|candidate| candidate.is_file()) {
        Some(found) => LinguaConfig::load(Some(found)),
        None => LinguaConfig::load(None),
    }
}
