use axum::Router;

use crate::AppState;

mod folders;
mod messaging;
mod session;
mod social;
mod works;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(folders::routes())
        .merge(messaging::routes())
        .merge(session::routes())
        .merge(social::routes())
        .merge(works::routes())
}
