use async_stream::stream;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures_util::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::{AppJson, AppPath, AppState, CurrentUser};
use crate::{
    constants::RECEIVE_MESSAGE_EVENT,
    error::{AppError, AppResult},
    models::{Conversation, MessageView},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/conversations", get(list_conversations))
        .route("/stream", get(stream_messages))
        .route("/{user_id}", get(message_history))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub receiver: Option<Uuid>,
    pub content: Option<String>,
}

async fn send_message(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppJson(body): AppJson<SendMessageBody>,
) -> AppResult<(StatusCode, Json<MessageView>)> {
    let (Some(receiver), Some(content)) = (body.receiver, body.content) else {
        return Err(AppError::InvalidArgument("Receiver and content are required".to_string()));
    };

    let message = state.gate.send(me.id, receiver, &content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn message_history(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<MessageView>>> {
    Ok(Json(state.gate.history(me.id, user_id).await?))
}

async fn list_conversations(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> AppResult<Json<Vec<Conversation>>> {
    Ok(Json(state.gate.conversations(me.id).await?))
}

/// Live feed of messages addressed to the caller.
async fn stream_messages(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.notifier.subscribe(me.id);
    let user_id = me.id;
    tracing::info!("User {} joined their message stream", user_id);

    let stream = stream! {
        loop {
            match receiver.recv().await {
                Ok(message) => match Event::default().event(RECEIVE_MESSAGE_EVENT).json_data(&message) {
                    Ok(event) => yield Ok::<_, Infallible>(event),
                    Err(e) => tracing::error!("Failed to encode message {}: {}", message.id, e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Stream of user {} lagged {} messages", user_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
