use clap::Parser;
use lingua::{LinguaApp, LinguaConfig};
use lingua_api::{ApiConfig, AppState, build_app};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lingua API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "LINGUA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "LINGUA_PORT", default_value_t = 3000)]
    port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LINGUA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// API config file path
    #[arg(short, long, env = "LINGUA_API_CONFIG")]
    config_file: Option<PathBuf>,

    /// Engine config file path (TOML or JSON)
    #[arg(long, env = "LINGUA_CONFIG")]
    lingua_config: Option<PathBuf>,

    /// Disable Swagger UI
    #[arg(long, env = "LINGUA_DISABLE_SWAGGER", default_value_t = false)]
    disable_swagger: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = format!(
        "lingua_api={level},lingua={level},tower_http=debug",
        level = cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = if let Some(config_path) = &cli.config_file {
        match ApiConfig::load_from_file(config_path) {
            Ok(cfg) => {
                info!("Configuration loaded from: {}", config_path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config file: {}. Using default configuration.",
                    e
                );
                ApiConfig::default()
            }
        }
    } else {
        ApiConfig::default()
    };

    config.host = cli.host;
    config.port = cli.port;
    config.log_level = cli.log_level;
    config.enable_swagger = !cli.disable_swagger;
    if let Some(path) = cli.lingua_config {
        config.lingua_config = Some(path.to_string_lossy().to_string());
    }

    let addr = config.socket_addr()?;

    let lingua_config = LinguaConfig::load(config.lingua_config.as_deref().map(Path::new))?;
    lingua_config.validate()?;
    lingua_config.prepare_dirs()?;
    let lingua = LinguaApp::from_config("lingua-api", &lingua_config).await?;
    info!(
        "Curriculum ready: {} modules",
        lingua.metadata().module_count
    );

    let app = build_app(AppState::from(&lingua), &config);

    info!("Starting server on: {}", addr);
    if config.enable_swagger {
        info!("Swagger UI: http://{}/swagger-ui", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
