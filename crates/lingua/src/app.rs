//! Application layer for Lingua
//!
//! Wires the catalog, configuration, profile repository and assistant into
//! the services transports talk to.

use lingua_core::{AssistantExt, Catalog, EngineConfig, SharedAssistant, TemplateAssistant};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LinguaConfig;
use crate::dialogue::{DialogueService, DialogueSettings, OpenRouterAssistant};
use crate::dispatcher::AdaptiveDispatcher;
use crate::error::{LinguaError, Result};
use crate::profile::{
    FileProfileRepository, InMemoryProfileRepository, PostgresProfileRepository,
    ProfileRepository,
};
use crate::storage::StorageConfig;

/// The main Lingua application
#[derive(Clone)]
pub struct LinguaApp {
    dispatcher: AdaptiveDispatcher,
    dialogue: DialogueService,
    metadata: AppMetadata,
}

/// Metadata about the Lingua application
#[derive(Debug, Clone)]
pub struct AppMetadata {
    pub name: String,
    pub version: String,
    /// Total modules in the loaded curriculum
    pub module_count: usize,
}

impl LinguaApp {
    pub fn dispatcher(&self) -> &AdaptiveDispatcher {
        &self.dispatcher
    }

    pub fn dialogue(&self) -> &DialogueService {
        &self.dialogue
    }

    /// Get app metadata
    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    /// Create a new builder
    pub fn builder(name: impl Into<String>) -> LinguaAppBuilder {
        LinguaAppBuilder::new(name)
    }

    /// Build everything a transport needs from configuration.
    ///
    /// Loads the curriculum, opens the configured profile store and picks the
    /// remote assistant when a key is available.
    pub async fn from_config(name: impl Into<String>, config: &LinguaConfig) -> Result<Self> {
        let catalog = Catalog::load(config.curriculum_file(), &config.engine)?;
        info!(
            path = %config.curriculum_path,
            modules = catalog.module_count(),
            "Curriculum loaded"
        );

        let repository: Arc<dyn ProfileRepository> = match &config.storage {
            StorageConfig::File => Arc::new(FileProfileRepository::from_config(config)),
            StorageConfig::Memory => Arc::new(InMemoryProfileRepository::new()),
            StorageConfig::Postgres { database_url } => {
                Arc::new(PostgresProfileRepository::connect(database_url).await?)
            }
        };

        let assistant = if config.ai.enabled {
            match OpenRouterAssistant::from_config(&config.ai) {
                Ok(remote) => remote.with_fallback(TemplateAssistant::default()).shared(),
                Err(e) => {
                    warn!(error = %e, "Remote assistant unavailable, dialogue uses templates");
                    TemplateAssistant::default().shared()
                }
            }
        } else {
            TemplateAssistant::default().shared()
        };

        Self::builder(name)
            .engine_config(config.engine.clone())
            .catalog(catalog)
            .repository(repository)
            .assistant(assistant)
            .dialogue_settings(DialogueSettings::from(&config.ai))
            .build()
    }
}

/// Builder for creating Lingua applications
pub struct LinguaAppBuilder {
    name: String,
    version: String,
    engine: EngineConfig,
    catalog: Option<Arc<Catalog>>,
    repository: Option<Arc<dyn ProfileRepository>>,
    assistant: Option<SharedAssistant>,
    dialogue_settings: DialogueSettings,
}

impl LinguaAppBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            engine: EngineConfig::default(),
            catalog: None,
            repository: None,
            assistant: None,
            dialogue_settings: DialogueSettings::default(),
        }
    }

    /// Set the version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Profile store; in-memory when not set
    pub fn repository(mut self, repository: Arc<dyn ProfileRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Dialogue assistant; templated replies when not set
    pub fn assistant(mut self, assistant: SharedAssistant) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn dialogue_settings(mut self, settings: DialogueSettings) -> Self {
        self.dialogue_settings = settings;
        self
    }

    /// Build the application
    pub fn build(self) -> Result<LinguaApp> {
        self.engine.validate()?;
        let catalog = self
            .catalog
            .ok_or_else(|| LinguaError::Build("No catalog configured".to_string()))?;
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryProfileRepository::new()));
        let assistant = self
            .assistant
            .unwrap_or_else(|| TemplateAssistant::default().shared());

        let metadata = AppMetadata {
            name: self.name,
            version: self.version,
            module_count: catalog.module_count(),
        };

        Ok(LinguaApp {
            dispatcher: AdaptiveDispatcher::new(catalog, self.engine, Arc::clone(&repository)),
            dialogue: DialogueService::new(assistant, repository, self.dialogue_settings),
            metadata,
        })
    }
}
