use crate::api::AppState;
use crate::error::Result;
use crate::models::{CreateIncidentRequest, Incident, UpdateIncidentRequest};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;
type IdPath = std::result::Result<Path<i64>, PathRejection>;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness: the storage backend must answer
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    match state.processor.health().await {
        Ok(()) => health_check().await.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": "Storage unavailable" })),
            )
                .into_response()
        }
    }
}

/// Create an incident
pub async fn create_incident(
    State(state): State<AppState>,
    payload: JsonBody<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<Incident>)> {
    let Json(request) = payload?;

    let created = state.processor.create_incident(request).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List incidents
pub async fn list_incidents(State(state): State<AppState>) -> Result<Json<Vec<Incident>>> {
    let incidents = state.processor.list_incidents().await?;
    Ok(Json(incidents))
}

/// Get an incident by ID
pub async fn get_incident(State(state): State<AppState>, id: IdPath) -> Result<Json<Incident>> {
    let Path(id) = id?;
    let incident = state.processor.get_incident(id).await?;
    Ok(Json(incident))
}

/// Partially update an incident
pub async fn update_incident(
    State(state): State<AppState>,
    id: IdPath,
    payload: JsonBody<UpdateIncidentRequest>,
) -> Result<Json<Incident>> {
    let Path(id) = id?;
    let Json(changes) = payload?;

    let incident = state.processor.update_incident(id, changes).await?;
    Ok(Json(incident))
}

/// Delete an incident; absent ids still get 204
pub async fn delete_incident(State(state): State<AppState>, id: IdPath) -> Result<StatusCode> {
    let Path(id) = id?;
    state.processor.delete_incident(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
