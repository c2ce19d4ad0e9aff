//! Init command handler

use crate::error::CliError;
use lingua::LinguaConfig;
use lingua::sample::sample_curriculum;
use std::fs;
use std::path::Path;

/// Lay out a working directory: data folders, config, starter curriculum and `.env`
pub async fn run_init(root: &Path, force: bool) -> Result<(), CliError> {
    println!("🚀 Initializing Lingua in {}...", root.display());

    let defaults = LinguaConfig::default();
    let config = LinguaConfig {
        data_dir: root.join(&defaults.data_dir).to_string_lossy().to_string(),
        curriculum_path: root
            .join(&defaults.curriculum_path)
            .to_string_lossy()
            .to_string(),
        ..defaults
    };
    config.prepare_dirs()?;
    println!("📁 Data directory: {}", config.users_path().display());

    let config_path = root.join(super::LOCAL_CONFIG);
    if force || !config_path.exists() {
        let content = toml::to_string_pretty(&config)
            .map_err(|e| CliError::Config(format!("Failed to render config: {}", e)))?;
        fs::write(&config_path, content)?;
        println!("📝 Wrote {}", config_path.display());
    } else {
        println!("✅ {} already exists", config_path.display());
    }

    let curriculum_path = config.curriculum_file();
    if force || !curriculum_path.exists() {
        let curriculum = sample_curriculum(&config.engine);
        fs::write(&curriculum_path, serde_json::to_string_pretty(&curriculum)?)?;
        println!("📚 Wrote starter curriculum {}", curriculum_path.display());
    } else {
        println!("✅ {} already exists", curriculum_path.display());
    }

    let env_path = root.join(".env");
    if !env_path.exists() {
        let env_content = "# Lingua environment\n# OPENROUTER_API_KEY=\n# DATABASE_URL=postgres://localhost/lingua\n# RUST_LOG=info\n";
        fs::write(&env_path, env_content)?;
        println!("📝 Wrote {}", env_path.display());
    }

    println!("\n✨ Lingua initialized!");
    println!("\nNext steps:");
    println!("  1. Put your OPENROUTER_API_KEY into .env for AI practice");
    println!("  2. Run 'lingua chat --user <id>' to start learning");

    Ok(())
}
