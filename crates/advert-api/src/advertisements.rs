use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use tracing::{debug, error};

use advert_types::api::{
    AdvertisementResponse, CreateAdvertisementResponse, ErrorMessage, StatusResponse,
    UpdateAdvertisementResponse,
};

use crate::error::{AdvertError, ErrorReply};
use crate::state::AppState;
use crate::validation::ValidationError;
use crate::workflow::Workflow;

/// Run a workflow operation off the async runtime and translate its error.
async fn run_blocking<F, T>(state: &AppState, op: F) -> Result<T, ErrorReply>
where
    F: FnOnce(Workflow<'_>) -> Result<T, AdvertError> + Send + 'static,
    T: Send + 'static,
{
    let conflict = state.config.conflict_status;
    let inner = state.clone();

    tokio::task::spawn_blocking(move || op(inner.workflow()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AdvertError::Store(anyhow::anyhow!("worker task failed: {}", e)).into_reply(conflict)
        })?
        .map_err(|e| e.into_reply(conflict))
}

/// Malformed JSON is a validation failure like any other bad payload.
/// Other rejections (oversized or unreadable bodies) keep their own status.
fn body_or_reject(state: &AppState, body: Result<Json<Value>, JsonRejection>) -> Result<Value, ErrorReply> {
    body.map(|Json(value)| value).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        match rejection {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => {
                AdvertError::Validation(ValidationError::undecodable(rejection.body_text()))
                    .into_reply(state.config.conflict_status)
            }
            _ => ErrorReply::new(rejection.status(), ErrorMessage::Text(rejection.body_text())),
        }
    })
}

/// A path id that is not an integer names no advertisement.
fn path_or_not_found<T>(state: &AppState, path: Result<Path<T>, PathRejection>) -> Result<T, ErrorReply> {
    path.map(|Path(value)| value).map_err(|rejection| {
        debug!("Rejected path: {}", rejection);
        AdvertError::NotFound.into_reply(state.config.conflict_status)
    })
}

/// POST /advertisements/
pub async fn create_advertisement(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreateAdvertisementResponse>, ErrorReply> {
    let body = body_or_reject(&state, body)?;
    let id = run_blocking(&state, move |wf| wf.create(&body)).await?;
    Ok(Json(CreateAdvertisementResponse { id }))
}

/// GET /advertisements/{id}
pub async fn get_advertisement(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<AdvertisementResponse>, ErrorReply> {
    let id = path_or_not_found(&state, path)?;
    let advertisement = run_blocking(&state, move |wf| wf.read(id)).await?;
    Ok(Json(advertisement))
}

/// PATCH /advertisements/{user}/{id}
pub async fn update_advertisement(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateAdvertisementResponse>, ErrorReply> {
    let (user, id) = path_or_not_found(&state, path)?;
    let body = body_or_reject(&state, body)?;
    let row = run_blocking(&state, move |wf| wf.update(id, &user, &body)).await?;
    Ok(Json(UpdateAdvertisementResponse {
        status: "success".to_string(),
        description: row.description,
    }))
}

/// DELETE /advertisements/{user}/{id}
pub async fn delete_advertisement(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<Json<StatusResponse>, ErrorReply> {
    let (user, id) = path_or_not_found(&state, path)?;
    run_blocking(&state, move |wf| wf.delete(id, &user)).await?;
    Ok(Json(StatusResponse::success()))
}

pub async fn health() -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

pub async fn fallback() -> ErrorReply {
    ErrorReply::new(StatusCode::NOT_FOUND, ErrorMessage::Text("not found".to_string()))
}

/// Known path, wrong verb.
pub async fn method_not_allowed() -> ErrorReply {
    ErrorReply::new(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorMessage::Text("method not allowed".to_string()),
    )
}
