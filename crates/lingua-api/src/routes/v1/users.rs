use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use lingua::dialogue::DialogueMode;
use lingua::{InboundEvent, NextAction, Outcome, ProgressReport};
use lingua_core::{AnswerFeedback, EventId, EventType, PlacementResult, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::AppState;
use crate::error::{ApiResult, ErrorResponse};

/// Request to register a learner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub user_id: String,
    pub name: String,
    /// School grade, 5 to 9
    pub grade: Option<u8>,
}

/// What the client should show next
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub user_id: String,
    #[schema(value_type = Object)]
    pub action: NextAction,
}

/// Learner input for the current step
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventRequest {
    /// Client-supplied id, generated when missing
    pub id: Option<String>,
    /// `start`, `placement_answer` or `exercise_answer`
    #[schema(value_type = String)]
    pub event_type: EventType,
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutcomeResponse {
    pub user_id: String,
    #[schema(value_type = Option<Object>)]
    pub feedback: Option<AnswerFeedback>,
    #[schema(value_type = Option<Object>)]
    pub placement: Option<PlacementResult>,
    #[schema(value_type = Object)]
    pub action: NextAction,
}

impl OutcomeResponse {
    fn new(user_id: &UserId, outcome: Outcome) -> Self {
        Self {
            user_id: user_id.to_string(),
            feedback: outcome.feedback,
            placement: outcome.placement,
            action: outcome.action,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    #[schema(value_type = Object)]
    pub progress: ProgressReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DialogueRequest {
    pub message: String,
    /// `conversation` (default) or `correction`
    #[serde(default)]
    #[schema(value_type = String)]
    pub mode: DialogueMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DialogueResponse {
    pub text: String,
    /// Answered by the offline template
    pub degraded: bool,
}

/// Register a learner and return the first placement question
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Learner registered", body = ActionResponse),
        (status = 400, description = "Invalid name or grade", body = ErrorResponse),
        (status = 409, description = "Learner already exists", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ActionResponse>)> {
    let user_id = UserId::from_string(request.user_id);
    let action = state
        .dispatcher
        .register(user_id.clone(), &request.name, request.grade)
        .await?;
    info!(user_id = %user_id, "Registered learner via API");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            user_id: user_id.to_string(),
            action,
        }),
    ))
}

/// Deliver a start or answer event
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/events",
    params(
        ("id" = String, Path, description = "Learner ID")
    ),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event handled", body = OutcomeResponse),
        (status = 400, description = "Event does not fit the learner's stage", body = ErrorResponse),
        (status = 404, description = "Learner not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EventRequest>,
) -> ApiResult<Json<OutcomeResponse>> {
    let user_id = UserId::from_string(id);
    let event = InboundEvent {
        id: request.id.map(EventId::from_string).unwrap_or_default(),
        user_id: user_id.clone(),
        event_type: request.event_type,
        payload: request.payload,
    };
    let outcome = state.dispatcher.handle(event).await?;
    Ok(Json(OutcomeResponse::new(&user_id, outcome)))
}

/// Start a review session over the learner's missed exercises
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/review",
    params(
        ("id" = String, Path, description = "Learner ID")
    ),
    responses(
        (status = 200, description = "First review item", body = ActionResponse),
        (status = 400, description = "Placement not finished", body = ErrorResponse),
        (status = 404, description = "Learner not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn start_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionResponse>> {
    let user_id = UserId::from_string(id);
    let action = state.dispatcher.start_review(&user_id).await?;
    Ok(Json(ActionResponse {
        user_id: user_id.to_string(),
        action,
    }))
}

/// Learner progress report
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/progress",
    params(
        ("id" = String, Path, description = "Learner ID")
    ),
    responses(
        (status = 200, description = "Progress report", body = ProgressResponse),
        (status = 404, description = "Learner not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let progress = state
        .dispatcher
        .progress(&UserId::from_string(id))
        .await?;
    Ok(Json(ProgressResponse { progress }))
}

/// Talk to the dialogue assistant at the learner's level
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/dialogue",
    params(
        ("id" = String, Path, description = "Learner ID")
    ),
    request_body = DialogueRequest,
    responses(
        (status = 200, description = "Assistant reply", body = DialogueResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Learner not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn post_dialogue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DialogueRequest>,
) -> ApiResult<Json<DialogueResponse>> {
    let reply = state
        .dialogue
        .reply(&UserId::from_string(id), &request.message, request.mode)
        .await?;
    Ok(Json(DialogueResponse {
        text: reply.text,
        degraded: reply.degraded,
    }))
}

pub fn routes() -> axum::Router<AppState> {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", post(register))
        .route("/{id}/events", post(post_event))
        .route("/{id}/review", post(start_review))
        .route("/{id}/progress", get(get_progress))
        .route("/{id}/dialogue", post(post_dialogue))
}
