use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState, Error, Result, SharedStore,
    error::StoreError,
    metrics::{MESSAGES_SENT, THREADS_CREATED},
    models::{ChatThread, Message},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendMessage {
    /// A user id, or a thread id for thread messages.
    receiver_id: Uuid,
    content: String,
    #[serde(default)]
    is_thread_message: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateThread {
    name: String,
    #[serde(default = "default_thread_visibility")]
    is_public: bool,
    #[serde(default)]
    work_id: Option<Uuid>,
}

fn default_thread_visibility() -> bool {
    true
}

async fn send_message(
    State(store): State<SharedStore>,
    Json(input): Json<SendMessage>,
) -> Result<Json<Message>> {
    if input.content.is_empty() {
        return Err(Error::with_status(
            StatusCode::BAD_REQUEST,
            anyhow!("message content must not be empty"),
        ));
    }

    let message = store
        .write()
        .await
        .send_message(input.receiver_id, input.content, input.is_thread_message)
        .await?;
    counter!(MESSAGES_SENT).increment(1);

    Ok(Json(message))
}

async fn conversation(
    State(store): State<SharedStore>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>> {
    let store = store.read().await;
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    let messages = store
        .direct_conversation(user.id, user_id)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(messages))
}

async fn create_thread(
    State(store): State<SharedStore>,
    Json(input): Json<CreateThread>,
) -> Result<Json<ChatThread>> {
    if input.name.is_empty() {
        return Err(Error::with_status(
            StatusCode::BAD_REQUEST,
            anyhow!("thread name is required"),
        ));
    }

    let thread = store
        .write()
        .await
        .create_thread(input.name, input.is_public, input.work_id)
        .await?;
    counter!(THREADS_CREATED).increment(1);

    Ok(Json(thread))
}

async fn list_threads(State(store): State<SharedStore>) -> Result<Json<Vec<ChatThread>>> {
    let store = store.read().await;
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    let threads = store.threads_for(user).into_iter().cloned().collect();

    Ok(Json(threads))
}

async fn join_thread(
    State(store): State<SharedStore>,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<ChatThread>> {
    let thread = store.write().await.join_thread(thread_id).await?;
    Ok(Json(thread))
}

async fn thread_messages(
    State(store): State<SharedStore>,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>> {
    let store = store.read().await;
    if store.thread(thread_id).is_none() {
        return Err(StoreError::NotFound("thread").into());
    }
    let messages = store.thread_messages(thread_id).into_iter().cloned().collect();

    Ok(Json(messages))
}

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
    // AP /api/messages
    // AG /api/messages/with/{id}
    // AP /api/threads
    // AG /api/threads
    // AP /api/threads/{id}/join
    // UG /api/threads/{id}/messages
    Router::new()
        .route("/messages",               post(send_message))
        .route("/messages/with/{id}",     get(conversation))
        .route("/threads",                post(create_thread).get(list_threads))
        .route("/threads/{id}/join",      post(join_thread))
        .route("/threads/{id}/messages",  get(thread_messages))
}
