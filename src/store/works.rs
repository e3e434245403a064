//! Work lifecycle and moderation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::StateStore;
use crate::{
    error::{StoreError, StoreResult},
    models::{Language, Role, Sensitivity, Work, WorkStatus},
};

/// Lifetime report count at which a work is archived. One-way: the counter
/// keeps rising afterwards but the status never comes back.
pub const REPORT_ARCHIVE_THRESHOLD: u32 = 5;

/// Fields supplied when uploading a new work.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkSubmission {
    pub title: String,
    pub language: Language,
    /// A URL to the media, or the raw text body for essays.
    pub content_url: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub sensitivities: Vec<Sensitivity>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl StateStore {
    /// Create a work authored by the session user. VERIFIED and ADMIN
    /// authors publish immediately; everyone else enters review.
    pub async fn add_work(&mut self, input: WorkSubmission) -> StoreResult<Work> {
        let (author_id, author_name, direct) = {
            let author = self.require_session()?;
            (
                author.id,
                author.name.clone(),
                author.role.publishes_directly(),
            )
        };

        let work = Work {
            id: Uuid::new_v4(),
            author_id,
            author_name,
            title: input.title,
            language: input.language,
            content_url: input.content_url,
            intent: input.intent,
            sensitivities: input.sensitivities,
            status: if direct {
                WorkStatus::Published
            } else {
                WorkStatus::Pending
            },
            created_at: Utc::now(),
            thumbnail: input.thumbnail,
            report_count: 0,
        };

        info!(title = %work.title, status = ?work.status, "work uploaded");

        // Most recent first.
        self.works.insert(0, work.clone());
        self.save_works().await?;

        Ok(work)
    }

    /// Set a work's status directly. No role rule is attached here; callers
    /// decide who gets to moderate. When the verification policy is on, a
    /// transition into PUBLISHED also advances the author's progress.
    pub async fn update_work_status(
        &mut self,
        work_id: Uuid,
        status: WorkStatus,
    ) -> StoreResult<Work> {
        let work = self
            .works
            .iter_mut()
            .find(|w| w.id == work_id)
            .ok_or(StoreError::NotFound("work"))?;

        let went_live = status == WorkStatus::Published && work.status != WorkStatus::Published;
        work.status = status;
        let author_id = work.author_id;
        let updated = work.clone();

        let mut users_changed = false;
        if self.policy.verification_promotion && went_live {
            users_changed = self.advance_verification(author_id);
        }

        self.save_works().await?;
        if users_changed {
            self.sync_session();
            self.save_users().await?;
            self.save_session().await?;
        }

        Ok(updated)
    }

    /// Report a work. Reaching the lifetime threshold archives it; further
    /// reports keep incrementing the counter while the status stays put.
    pub async fn report_work(&mut self, work_id: Uuid) -> StoreResult<Work> {
        let work = self
            .works
            .iter_mut()
            .find(|w| w.id == work_id)
            .ok_or(StoreError::NotFound("work"))?;

        work.report_count += 1;
        if work.report_count >= REPORT_ARCHIVE_THRESHOLD {
            work.status = WorkStatus::Archived;
        }

        let updated = work.clone();
        self.save_works().await?;

        Ok(updated)
    }

    /// Bump the author's verification progress; USER authors reaching the
    /// configured threshold become VERIFIED. Returns whether anything moved.
    fn advance_verification(&mut self, author_id: Uuid) -> bool {
        let threshold = self.policy.verification_threshold;
        let Some(author) = self.users.iter_mut().find(|u| u.id == author_id) else {
            return false;
        };

        author.verified_progress += 1;
        if author.role == Role::User && author.verified_progress >= threshold {
            author.role = Role::Verified;
            info!(username = %author.username, "author promoted to verified");
        }

        true
    }
}
