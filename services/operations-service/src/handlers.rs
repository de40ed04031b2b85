use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{AutoAssignRequest, ErrorResponse, PreviewRequest};
use crate::service::{self, PreviewOutcome};
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

fn invalid_body(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection, "rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            code: "invalid_body",
            error: rejection.body_text(),
        }),
    )
        .into_response()
}

pub async fn auto_assign(
    State(state): State<AppState>,
    payload: Result<Json<AutoAssignRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };

    match service::auto_assign_operations(&state, payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}

pub async fn preview_auto_assign(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };

    match service::preview_assignment(&state, payload).await {
        Ok(PreviewOutcome::Plan(preview)) => (StatusCode::OK, Json(preview)).into_response(),
        Ok(PreviewOutcome::NoActiveMounters(body)) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}
