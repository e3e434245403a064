use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState, Error, Result, SharedStore,
    curator::Curator,
    error::StoreError,
    metrics::{WORKS_ARCHIVED, WORKS_CREATED, WORKS_PUBLISHED, WORKS_REPORTED},
    models::{Language, Work, WorkStatus},
    store::{ArchiveFilter, StateStore, WorkSubmission},
};

/// A freshly uploaded work together with its curatorial commentary.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreatedWork {
    work: Work,
    commentary: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PortalSection {
    language: Language,
    works: Vec<Work>,
}

#[derive(Deserialize, Debug)]
struct ArchiveQuery {
    q: Option<String>,
    language: Option<String>,
    /// Comma-separated sensitivity tags.
    sensitivities: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StatusUpdate {
    status: WorkStatus,
}

fn require_moderator(store: &StateStore) -> Result<()> {
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    if !user.role.can_moderate() {
        return Err(StoreError::Forbidden.into());
    }
    Ok(())
}

async fn create_work(
    State(store): State<SharedStore>,
    State(curator): State<Curator>,
    Json(input): Json<WorkSubmission>,
) -> Result<Json<CreatedWork>> {
    if input.title.is_empty() || input.content_url.is_empty() {
        return Err(Error::with_status(
            StatusCode::BAD_REQUEST,
            anyhow!("title and contentUrl are required"),
        ));
    }

    let mut guard = store.write().await;
    let work = guard.add_work(input).await?;
    counter!(WORKS_CREATED).increment(1);
    if work.status == WorkStatus::Published {
        counter!(WORKS_PUBLISHED).increment(1);
    }
    drop(guard);

    // The work is committed either way; commentary is best-effort.
    let commentary = curator.commentary(&work.intent, &work.title).await;

    Ok(Json(CreatedWork { work, commentary }))
}

async fn search_archive(
    State(store): State<SharedStore>,
    Query(input): Query<ArchiveQuery>,
) -> Result<Json<Vec<Work>>> {
    let language = input
        .language
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| Error::with_status(StatusCode::BAD_REQUEST, e))?;
    let sensitivities = match &input.sensitivities {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| Error::with_status(StatusCode::BAD_REQUEST, e))?,
        None => Vec::new(),
    };
    let filter = ArchiveFilter {
        query: input.q,
        language,
        sensitivities,
    };

    let store = store.read().await;
    let works = store
        .search_archive(store.session(), &filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(works))
}

async fn portal(State(store): State<SharedStore>) -> Json<Vec<PortalSection>> {
    let store = store.read().await;
    let sections = store
        .portal(store.session())
        .into_iter()
        .map(|(language, works)| PortalSection {
            language,
            works: works.into_iter().cloned().collect(),
        })
        .collect();

    Json(sections)
}

async fn for_you(State(store): State<SharedStore>) -> Json<Vec<Work>> {
    let store = store.read().await;
    let mut rng = rand::thread_rng();
    let works = store
        .for_you(store.session(), &mut rng)
        .into_iter()
        .cloned()
        .collect();

    Json(works)
}

async fn moderation_queue(State(store): State<SharedStore>) -> Result<Json<Vec<Work>>> {
    let store = store.read().await;
    require_moderator(&store)?;
    let works = store.moderation_queue().into_iter().cloned().collect();

    Ok(Json(works))
}

async fn my_works(State(store): State<SharedStore>) -> Result<Json<Vec<Work>>> {
    let store = store.read().await;
    let user = store.session().ok_or(StoreError::Unauthorized)?;
    let works = store.works_by_author(user.id).into_iter().cloned().collect();

    Ok(Json(works))
}

async fn set_status(
    State(store): State<SharedStore>,
    Path(work_id): Path<Uuid>,
    Json(input): Json<StatusUpdate>,
) -> Result<Json<Work>> {
    let mut store = store.write().await;
    require_moderator(&store)?;

    let previously = store.work(work_id).map(|w| w.status);
    let work = store.update_work_status(work_id, input.status).await?;
    if work.status == WorkStatus::Published && previously != Some(WorkStatus::Published) {
        counter!(WORKS_PUBLISHED).increment(1);
    }

    Ok(Json(work))
}

async fn report(State(store): State<SharedStore>, Path(work_id): Path<Uuid>) -> Result<Json<Work>> {
    let mut store = store.write().await;
    let previously = store.work(work_id).map(|w| w.status);
    let work = store.report_work(work_id).await?;
    counter!(WORKS_REPORTED).increment(1);
    if work.status == WorkStatus::Archived && previously != Some(WorkStatus::Archived) {
        counter!(WORKS_ARCHIVED).increment(1);
    }

    Ok(Json(work))
}

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
    // AP /api/works
    // UG /api/works
    // UG /api/works/portal
    // UG /api/works/for-you
    // AG /api/works/moderation
    // AG /api/works/mine
    // AP /api/works/{id}/status
    // UP /api/works/{id}/report
    Router::new()
        .route("/works",             post(create_work).get(search_archive))
        .route("/works/portal",      get(portal))
        .route("/works/for-you",     get(for_you))
        .route("/works/moderation",  get(moderation_queue))
        .route("/works/mine",        get(my_works))
        .route("/works/{id}/status", post(set_status))
        .route("/works/{id}/report", post(report))
}
