//! CLI for the Lingua adaptive English-learning engine

use clap::Parser;
use lingua_cli::{commands, error::CliError, init_tracing};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lingua")]
#[command(about = "Adaptive English course for school students", long_about = None)]
struct Cli {
    /// Config file (defaults to ./lingua.toml, then the user config dir)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create config, data folders and a starter curriculum
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite existing config and curriculum
        #[arg(long, short)]
        force: bool,
    },
    /// Check a curriculum file against the configured course shape
    Validate {
        /// Curriculum file (defaults to the configured one)
        curriculum: Option<PathBuf>,
    },
    /// Start or resume a learning session
    Chat {
        /// Learner id
        #[arg(long, short)]
        user: String,
        /// Name for a new learner
        #[arg(long, short)]
        name: Option<String>,
        /// School grade for a new learner (5-9)
        #[arg(long, short)]
        grade: Option<u8>,
    },
    /// Show a learner's progress
    Progress {
        /// Learner id
        #[arg(long, short)]
        user: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    if let Some(Commands::Init { dir, force }) = &cli.command {
        init_tracing("info");
        return commands::run_init(dir, *force).await;
    }

    let config = commands::load_config(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Validate { curriculum }) => {
            commands::run_validate(&config, curriculum).await?;
        }
        Some(Commands::Chat { user, name, grade }) => {
            config.validate()?;
            config.prepare_dirs()?;
            commands::run_chat(&config, &user, name, grade).await?;
        }
        Some(Commands::Progress { user, json }) => {
            commands::run_progress(&config, &user, json).await?;
        }
        Some(Commands::Init { .. }) => {}
        None => {
            println!("Lingua adaptive English course");
            println!("Run 'lingua init' to get started, or 'lingua --help' for commands.");
        }
    }

    Ok(())
}
