//! The state store: the single source of truth for all platform state.
//!
//! Collections live in memory. Every mutating operation applies its guard
//! rules, updates the affected collections, and writes their snapshots
//! through to storage before returning, so persisted state is never stale
//! relative to a completed operation. Read-side projections live in
//! [`views`] and never mutate anything.

mod folders;
mod messaging;
mod session;
mod social;
mod views;
mod works;

use anyhow::{Context as _, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::PolicyConfig,
    error::StoreError,
    models::{ChatThread, Folder, LocalTheme, Message, User, Work},
    storage::{SnapshotDb, keys},
};

pub use session::{ProfileUpdate, Registration};
pub use views::ArchiveFilter;
pub use works::{REPORT_ARCHIVE_THRESHOLD, WorkSubmission};

/// Owns every entity collection plus the single active session.
pub struct StateStore {
    db: SnapshotDb,
    policy: PolicyConfig,
    users: Vec<User>,
    works: Vec<Work>,
    messages: Vec<Message>,
    threads: Vec<ChatThread>,
    folders: Vec<Folder>,
    local_theme: LocalTheme,
    /// Denormalized copy of the signed-in user; kept in sync with the
    /// canonical entry in `users`.
    session: Option<User>,
}

impl StateStore {
    /// Load every collection (and any persisted session) from storage.
    /// Missing keys load as empty collections and defaults.
    pub async fn load(db: SnapshotDb, policy: PolicyConfig) -> Result<Self> {
        let users: Vec<User> = read_collection(&db, keys::USERS).await?;
        let works: Vec<Work> = read_collection(&db, keys::WORKS).await?;
        let messages: Vec<Message> = read_collection(&db, keys::MESSAGES).await?;
        let threads: Vec<ChatThread> = read_collection(&db, keys::THREADS).await?;
        let folders: Vec<Folder> = read_collection(&db, keys::FOLDERS).await?;

        let local_theme = match db.get(keys::LOCAL_THEME).await? {
            Some(raw) => serde_json::from_str(&raw).context("failed to decode local theme")?,
            None => LocalTheme::default(),
        };
        let session = match db.get(keys::SESSION).await? {
            Some(raw) => Some(serde_json::from_str(&raw).context("failed to decode session")?),
            None => None,
        };

        info!(
            users = users.len(),
            works = works.len(),
            messages = messages.len(),
            threads = threads.len(),
            folders = folders.len(),
            "state loaded"
        );

        Ok(Self {
            db,
            policy,
            users,
            works,
            messages,
            threads,
            folders,
            local_theme,
            session,
        })
    }

    /// The signed-in user, if any.
    pub fn session(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Most-recent-first.
    pub fn works(&self) -> &[Work] {
        &self.works
    }

    /// Insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn threads(&self) -> &[ChatThread] {
        &self.threads
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn local_theme(&self) -> &LocalTheme {
        &self.local_theme
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn work(&self, id: Uuid) -> Option<&Work> {
        self.works.iter().find(|w| w.id == id)
    }

    pub fn thread(&self, id: Uuid) -> Option<&ChatThread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub(crate) fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    fn require_session(&self) -> Result<&User, StoreError> {
        self.session.as_ref().ok_or(StoreError::Unauthorized)
    }

    /// Refresh the session copy from the canonical user collection. Called
    /// by every mutation that may touch the signed-in user's record.
    fn sync_session(&mut self) {
        let Some(id) = self.session.as_ref().map(|u| u.id) else {
            return;
        };
        if let Some(user) = self.users.iter().find(|u| u.id == id).cloned() {
            self.session = Some(user);
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("failed to encode snapshot {key}"))?;
        self.db.put(key, &raw).await
    }

    async fn save_users(&self) -> Result<()> {
        self.save(keys::USERS, &self.users).await
    }

    async fn save_works(&self) -> Result<()> {
        self.save(keys::WORKS, &self.works).await
    }

    async fn save_messages(&self) -> Result<()> {
        self.save(keys::MESSAGES, &self.messages).await
    }

    async fn save_threads(&self) -> Result<()> {
        self.save(keys::THREADS, &self.threads).await
    }

    async fn save_folders(&self) -> Result<()> {
        self.save(keys::FOLDERS, &self.folders).await
    }

    async fn save_local_theme(&self) -> Result<()> {
        self.save(keys::LOCAL_THEME, &self.local_theme).await
    }

    /// Writes the session snapshot, or deletes the key when signed out.
    async fn save_session(&self) -> Result<()> {
        match &self.session {
            Some(user) => self.save(keys::SESSION, user).await,
            None => self.db.delete(keys::SESSION).await,
        }
    }
}

async fn read_collection<T: DeserializeOwned>(db: &SnapshotDb, key: &str) -> Result<Vec<T>> {
    match db.get(key).await? {
        Some(raw) => {
            serde_json::from_str(&raw).with_context(|| format!("failed to decode snapshot {key}"))
        }
        None => Ok(Vec::new()),
    }
}
