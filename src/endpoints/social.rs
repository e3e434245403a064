use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, Result, SharedStore, error::StoreError, models::PublicUser};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FollowState {
    following: bool,
}

async fn follow(
    State(store): State<SharedStore>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FollowState>> {
    let following = store.write().await.toggle_follow(user_id).await?;
    Ok(Json(FollowState { following }))
}

async fn block(State(store): State<SharedStore>, Path(user_id): Path<Uuid>) -> Result<StatusCode> {
    store.write().await.block_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn contacts(State(store): State<SharedStore>) -> Result<Json<Vec<PublicUser>>> {
    let store = store.read().await;
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    let contacts = store.contacts(user).into_iter().map(PublicUser::from).collect();

    Ok(Json(contacts))
}

async fn connections(
    State(store): State<SharedStore>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<PublicUser>>> {
    let store = store.read().await;
    let user = store.user(user_id).ok_or(StoreError::NotFound("user"))?;
    let connections = store
        .connections(user)
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(connections))
}

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
    // AP /api/users/{id}/follow
    // AP /api/users/{id}/block
    // AG /api/users
    // UG /api/users/{id}/connections
    Router::new()
        .route("/users/{id}/follow",      post(follow))
        .route("/users/{id}/block",       post(block))
        .route("/users",                  get(contacts))
        .route("/users/{id}/connections", get(connections))
}
