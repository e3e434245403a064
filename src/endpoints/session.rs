use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use metrics::counter;
use serde::Deserialize;

use crate::{
    AppState, Error, Result, SharedStore,
    metrics::{SESSION_LOGIN_FAILED, SESSION_REGISTERED},
    models::{LocalTheme, PublicUser},
    store::{ProfileUpdate, Registration},
};

#[derive(Deserialize, Debug)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn register(
    State(store): State<SharedStore>,
    Json(input): Json<Registration>,
) -> Result<Json<PublicUser>> {
    if input.username.is_empty() || input.password.is_empty() || input.name.is_empty() {
        return Err(Error::with_status(
            StatusCode::BAD_REQUEST,
            anyhow!("username, password, and name are required"),
        ));
    }

    let user = store.write().await.register(input).await?;
    counter!(SESSION_REGISTERED).increment(1);

    Ok(Json(PublicUser::from(&user)))
}

async fn login(
    State(store): State<SharedStore>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<PublicUser>> {
    let user = store
        .write()
        .await
        .login(&input.username, &input.password)
        .await?;

    match user {
        Some(user) => Ok(Json(PublicUser::from(&user))),
        None => {
            counter!(SESSION_LOGIN_FAILED).increment(1);
            Err(Error::with_status(
                StatusCode::UNAUTHORIZED,
                anyhow!("failed to validate credentials"),
            ))
        }
    }
}

async fn logout(State(store): State<SharedStore>) -> Result<StatusCode> {
    store.write().await.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn current_session(State(store): State<SharedStore>) -> Result<Json<PublicUser>> {
    let store = store.read().await;
    match store.session() {
        Some(user) => Ok(Json(PublicUser::from(user))),
        None => Err(Error::with_status(
            StatusCode::UNAUTHORIZED,
            anyhow!("no active session"),
        )),
    }
}

async fn update_profile(
    State(store): State<SharedStore>,
    Json(changes): Json<ProfileUpdate>,
) -> Result<Json<PublicUser>> {
    let user = store.write().await.update_profile(changes).await?;
    Ok(Json(PublicUser::from(&user)))
}

async fn local_theme(State(store): State<SharedStore>) -> Json<LocalTheme> {
    Json(store.read().await.local_theme().clone())
}

async fn update_local_theme(
    State(store): State<SharedStore>,
    Json(theme): Json<LocalTheme>,
) -> Result<StatusCode> {
    store.write().await.update_local_theme(theme).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
    // UP /api/session/register
    // UP /api/session/login
    // UP /api/session/logout
    // AG /api/session
    // AP /api/session/profile
    // UG /api/session/theme
    // UP /api/session/theme
    Router::new()
        .route("/session/register", post(register))
        .route("/session/login",    post(login))
        .route("/session/logout",   post(logout))
        .route("/session",          get(current_session))
        .route("/session/profile",  patch(update_profile))
        .route("/session/theme",    get(local_theme).put(update_local_theme))
}
