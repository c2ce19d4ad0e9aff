//! Validate command handler

use crate::error::CliError;
use lingua::{Catalog, LinguaConfig};
use std::path::PathBuf;

/// Load and check a curriculum against the configured shape
pub async fn run_validate(config: &LinguaConfig, curriculum: Option<PathBuf>) -> Result<(), CliError> {
    config.engine.validate()?;

    let path = curriculum.unwrap_or_else(|| config.curriculum_file());
    println!("🔍 Checking {}...", path.display());

    let catalog = Catalog::load(&path, &config.engine)?;
    println!(
        "✅ {} levels, {} modules, {} exercises per module, {} placement questions",
        config.engine.levels.len(),
        catalog.module_count(),
        config.engine.exercises_per_module,
        catalog.placement_questions().len()
    );

    if config.ai.enabled && config.ai.api_key().is_none() {
        println!(
            "⚠️  {} is not set; AI practice will use offline replies",
            config.ai.api_key_env
        );
    }

    Ok(())
}
