use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppJson, AppPath, AppState, CurrentUser, MessageResponse};
use crate::{
    error::{AppError, AppResult},
    models::{ConnectionStatusReport, ConnectionView, RespondAction},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_connections))
        .route("/request", post(send_request))
        .route("/respond/{request_id}", put(respond_to_request))
        .route("/pending", get(pending_requests))
        .route("/sent", get(sent_requests))
        .route("/status/{user_id}", get(connection_status))
        .route("/cancel/{request_id}", delete(cancel_request))
        .route("/remove/{connection_id}", delete(remove_connection))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestBody {
    pub to_user: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub message: String,
    pub connection: ConnectionView,
}

async fn send_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppJson(body): AppJson<SendRequestBody>,
) -> AppResult<(StatusCode, Json<ConnectionView>)> {
    let to_user = body
        .to_user
        .ok_or_else(|| AppError::InvalidArgument("User ID is required".to_string()))?;

    let connection = state.ledger.send_request(me.id, to_user).await?;
    Ok((StatusCode::CREATED, Json(state.ledger.expand_one(connection).await?)))
}

async fn respond_to_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppPath(request_id): AppPath<Uuid>,
    AppJson(body): AppJson<RespondBody>,
) -> AppResult<Json<RespondResponse>> {
    let action: RespondAction = body
        .action
        .as_deref()
        .and_then(|action| action.parse().ok())
        .ok_or_else(|| {
            AppError::InvalidArgument(r#"Invalid action. Must be "accepted" or "rejected""#.to_string())
        })?;

    let connection = state.ledger.respond(request_id, me.id, action).await?;
    Ok(Json(RespondResponse {
        message: format!("Connection request {}", connection.status.as_str()),
        connection: state.ledger.expand_one(connection).await?,
    }))
}

async fn pending_requests(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> AppResult<Json<Vec<ConnectionView>>> {
    let requests = state.ledger.list_pending(me.id).await?;
    Ok(Json(state.ledger.expand(requests).await?))
}

async fn sent_requests(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> AppResult<Json<Vec<ConnectionView>>> {
    let requests = state.ledger.list_sent(me.id).await?;
    Ok(Json(state.ledger.expand(requests).await?))
}

async fn list_connections(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> AppResult<Json<Vec<ConnectionView>>> {
    let connections = state.ledger.list_accepted(me.id).await?;
    Ok(Json(state.ledger.expand(connections).await?))
}

async fn connection_status(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<ConnectionStatusReport>> {
    Ok(Json(state.ledger.status_between(me.id, user_id).await?))
}

async fn cancel_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppPath(request_id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.ledger.cancel(request_id, me.id).await?;
    Ok(MessageResponse::new("Connection request cancelled"))
}

async fn remove_connection(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppPath(connection_id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.ledger.remove(connection_id, me.id).await?;
    Ok(MessageResponse::new("Connection removed"))
}
