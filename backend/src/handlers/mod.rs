use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts},
    http::{StatusCode, Uri, request::Parts},
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::{str::FromStr, sync::Arc};
use uuid::Uuid;

use crate::{
    constants::USER_ID_HEADER,
    error::AppError,
    models::User,
    services::{BroadcastNotifier, ConnectionLedger, MessagingGate, Notifier, UserDirectory},
};

pub mod connections;
pub mod messages;
pub mod users;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub directory: UserDirectory,
    pub ledger: ConnectionLedger,
    pub gate: MessagingGate,
    pub notifier: Arc<BroadcastNotifier>,
}

impl AppState {
    pub fn new(pool: SqlitePool, notifier: Arc<BroadcastNotifier>) -> Self {
        let push: Arc<dyn Notifier> = notifier.clone();
        Self {
            directory: UserDirectory::new(pool.clone()),
            ledger: ConnectionLedger::new(pool.clone()),
            gate: MessagingGate::new(pool, push),
            notifier,
        }
    }
}

/// The caller, identified by the `X-User-ID` header and resolved against the directory.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::from_str(value.trim()).ok())
            .ok_or(AppError::Unauthenticated)?;

        match state.directory.get(user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(AppError::NotFound(_)) => Err(AppError::Unauthenticated),
            Err(e) => Err(e),
        }
    }
}

/// JSON body whose rejections keep the `{ "message": ... }` error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters whose rejections keep the `{ "message": ... }` error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `{ "message": ... }` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/users", users::router())
        .nest("/api/connections", connections::router())
        .nest("/api/messages", messages::router())
        .fallback(not_found)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Not Found - {}", uri.path()) })),
    )
}
