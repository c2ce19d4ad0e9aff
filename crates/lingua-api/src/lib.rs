use axum::Router;
use axum::http::HeaderValue;
use lingua::{AdaptiveDispatcher, DialogueService, LinguaApp};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: AdaptiveDispatcher,
    pub dialogue: DialogueService,
}

impl AppState {
    pub fn new(dispatcher: AdaptiveDispatcher, dialogue: DialogueService) -> Self {
        Self {
            dispatcher,
            dialogue,
        }
    }
}

impl From<&LinguaApp> for AppState {
    fn from(app: &LinguaApp) -> Self {
        Self::new(app.dispatcher().clone(), app.dialogue().clone())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::v1::users::register,
        crate::routes::v1::users::post_event,
        crate::routes::v1::users::start_review,
        crate::routes::v1::users::get_progress,
        crate::routes::v1::users::post_dialogue,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::error::ErrorResponse,
            crate::routes::v1::users::RegisterRequest,
            crate::routes::v1::users::ActionResponse,
            crate::routes::v1::users::EventRequest,
            crate::routes::v1::users::OutcomeResponse,
            crate::routes::v1::users::ProgressResponse,
            crate::routes::v1::users::DialogueRequest,
            crate::routes::v1::users::DialogueResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Learner sessions, progress and dialogue")
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build API application
pub fn build_app(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new().merge(routes::routes());
    if config.enable_swagger {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
    router
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
