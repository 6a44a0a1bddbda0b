use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use dealbot_core::directory::{self, Business, Client};
use dealbot_core::domain::contract::Deal;
use dealbot_core::domain::portal::{HealthStatus, JournalEntry};
use dealbot_core::domain::recommendation::{RecommendationBundle, RecommendationRecord};
use dealbot_core::draft::{DealDraft, DealPreview};
use dealbot_core::gateway::{GatewayError, RecommendationGateway};
use dealbot_core::session::{Mode, Session};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn RecommendationGateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/healthz/upstream", get(upstream_health))
        .route("/businesses", get(list_businesses))
        .route("/clients", get(list_clients))
        .route("/recommendations/:business_id", get(get_business_recommendations))
        .route("/recommend/:business_id/:client_id", get(get_personalized))
        .route("/clients/:client_id/recommendations", get(get_client_recommendations))
        .route("/clients/:client_id/journal", get(get_journal))
        .route("/session/recommendations", get(get_session_recommendations))
        .route("/drafts/preview", post(preview_draft))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        tracing::error!(error = %err, "recommendation service call failed");
        sentry_anyhow::capture_anyhow(&anyhow::Error::new(err.clone()));
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn upstream_health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    let health = state.gateway.health().await?;
    Ok(Json(health))
}

async fn list_businesses() -> Json<&'static [Business]> {
    Json(directory::BUSINESSES)
}

async fn list_clients() -> Json<&'static [Client]> {
    Json(directory::CLIENTS)
}

async fn get_business_recommendations(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> Result<Json<RecommendationBundle<RecommendationRecord>>, ApiError> {
    let bundle = state.gateway.fetch_recommendations(&business_id).await?;
    Ok(Json(bundle))
}

async fn get_personalized(
    State(state): State<AppState>,
    Path((business_id, client_id)): Path<(String, String)>,
) -> Result<Json<RecommendationBundle<Deal>>, ApiError> {
    let bundle = state
        .gateway
        .fetch_personalized(&business_id, &client_id)
        .await?;
    Ok(Json(bundle))
}

async fn get_client_recommendations(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<RecommendationBundle<Deal>>, ApiError> {
    let bundle = state
        .gateway
        .fetch_client_recommendations(&client_id)
        .await?;
    Ok(Json(bundle))
}

async fn get_journal(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let entries = state.gateway.journal_entries(&client_id).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
struct SelectionQuery {
    mode: Mode,
    business: Option<String>,
    client: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum SessionRecommendations {
    Business(RecommendationBundle<RecommendationRecord>),
    Client(RecommendationBundle<Deal>),
}

/// Recommendations for an explicit persona selection carried in the query string.
async fn get_session_recommendations(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<SessionRecommendations>, ApiError> {
    let session = Session::select(query.mode, query.business, query.client).map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: e.to_string(),
    })?;
    recommendations_for(state.gateway.as_ref(), &session)
        .await
        .map(Json)
}

async fn recommendations_for(
    gateway: &dyn RecommendationGateway,
    session: &Session,
) -> Result<SessionRecommendations, ApiError> {
    match (session.mode, session.client_id.as_deref()) {
        (Some(Mode::Client), Some(client_id)) => {
            let bundle = gateway
                .fetch_personalized(session.effective_business(), client_id)
                .await?;
            Ok(SessionRecommendations::Client(bundle))
        }
        _ => {
            let bundle = gateway
                .fetch_recommendations(session.effective_business())
                .await?;
            Ok(SessionRecommendations::Business(bundle))
        }
    }
}

async fn preview_draft(Json(draft): Json<DealDraft>) -> Json<DealPreview> {
    Json(draft.preview())
}
