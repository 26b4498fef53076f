use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use super::{AppJson, AppState, CurrentUser};
use crate::{
    error::AppResult,
    models::{NewUser, User, UserSummary},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(register_user))
        .route("/me", get(current_user))
}

async fn register_user(
    State(state): State<AppState>,
    AppJson(new_user): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.directory.register(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Directory of everyone but the caller.
async fn list_users(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> AppResult<Json<Vec<UserSummary>>> {
    let users = state.directory.list_others(me.id).await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

async fn current_user(CurrentUser(me): CurrentUser) -> Json<User> {
    Json(me)
}
