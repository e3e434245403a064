//! Komorebi platform implementation.
mod config;
mod curator;
mod endpoints;
pub mod error;
mod metrics;
mod models;
mod serve;
mod storage;
mod store;


pub use error::Error;
pub use serve::{APP_USER_AGENT, AppState, Result, SharedStore, run};

/// The index (/) route.
async fn index() -> impl axum::response::IntoResponse {
    r"
 _                                          _      _
| | __  ___   _ __ ___    ___   _ __   ___ | |__  (_)
| |/ / / _ \ | '_ ` _ \  / _ \ | '__| / _ \| '_ \ | |
|   < | (_) || | | | | || (_) || |   |  __/| |_) || |
|_|\_\ \___/ |_| |_| |_| \___/ |_|    \___||_.__/ |_|


This is Komorebi, a social platform where creators share
works, sort them into folders, and talk to each other.

Most API routes are under /api/
    "
}
