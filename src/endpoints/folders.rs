use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState, Error, Result, SharedStore,
    error::StoreError,
    metrics::FOLDERS_CREATED,
    models::{Folder, FolderAccess, FolderEditMode},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateFolder {
    name: String,
    access: FolderAccess,
    edit_mode: FolderEditMode,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FolderSettings {
    access: FolderAccess,
    edit_mode: FolderEditMode,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Collaborators {
    user_ids: Vec<Uuid>,
}

async fn create_folder(
    State(store): State<SharedStore>,
    Json(input): Json<CreateFolder>,
) -> Result<Json<Folder>> {
    if input.name.is_empty() {
        return Err(Error::with_status(
            StatusCode::BAD_REQUEST,
            anyhow!("folder name is required"),
        ));
    }

    let folder = store
        .write()
        .await
        .create_folder(input.name, input.access, input.edit_mode)
        .await?;
    counter!(FOLDERS_CREATED).increment(1);

    Ok(Json(folder))
}

async fn list_folders(State(store): State<SharedStore>) -> Result<Json<Vec<Folder>>> {
    let store = store.read().await;
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    let folders = store.folders_for(user).into_iter().cloned().collect();

    Ok(Json(folders))
}

async fn toggle_work(
    State(store): State<SharedStore>,
    Path((folder_id, work_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Folder>> {
    let folder = store
        .write()
        .await
        .toggle_work_in_folder(folder_id, work_id)
        .await?;

    Ok(Json(folder))
}

async fn update_settings(
    State(store): State<SharedStore>,
    Path(folder_id): Path<Uuid>,
    Json(input): Json<FolderSettings>,
) -> Result<Json<Folder>> {
    let folder = store
        .write()
        .await
        .update_folder_settings(folder_id, input.access, input.edit_mode)
        .await?;

    Ok(Json(folder))
}

async fn set_collaborators(
    State(store): State<SharedStore>,
    Path(folder_id): Path<Uuid>,
    Json(input): Json<Collaborators>,
) -> Result<Json<Folder>> {
    let folder = store
        .write()
        .await
        .set_folder_collaborators(folder_id, input.user_ids)
        .await?;

    Ok(Json(folder))
}

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
    // AP /api/folders
    // AG /api/folders
    // AP /api/folders/{id}/works/{work_id}
    // AP /api/folders/{id}/settings
    // AP /api/folders/{id}/collaborators
    Router::new()
        .route("/folders",                         post(create_folder).get(list_folders))
        .route("/folders/{id}/works/{work_id}",    post(toggle_work))
        .route("/folders/{id}/settings",           put(update_settings))
        .route("/folders/{id}/collaborators",      put(set_collaborators))
}
