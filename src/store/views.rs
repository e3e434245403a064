//! Read-side projections over the in-memory snapshot. Nothing in here
//! mutates state; handlers call these under the shared read guard.

use rand::Rng;
use rand::seq::IteratorRandom;
use uuid::Uuid;

use super::StateStore;
use crate::models::{
    ChatThread, Folder, FolderAccess, FolderEditMode, Language, Message, Sensitivity, User, Work,
    WorkStatus,
};

/// Works shown per language on the portal page.
pub const PORTAL_SECTION_SIZE: usize = 4;
/// Sample size of the "for you" selection.
pub const FOR_YOU_SIZE: usize = 3;

/// Archive search criteria. Empty criteria match everything.
#[derive(Debug, Default, Clone)]
pub struct ArchiveFilter {
    /// Case-insensitive substring matched against title and author name.
    pub query: Option<String>,
    pub language: Option<Language>,
    /// A work matches when it carries every selected tag.
    pub sensitivities: Vec<Sensitivity>,
}

fn hidden_from(viewer: Option<&User>, author_id: Uuid) -> bool {
    viewer.is_some_and(|v| v.blocked_user_ids.contains(&author_id))
}

impl StateStore {
    /// Published works in recency order, minus blocked authors.
    pub fn published_works(&self, viewer: Option<&User>) -> Vec<&Work> {
        self.works
            .iter()
            .filter(|w| w.status == WorkStatus::Published)
            .filter(|w| !hidden_from(viewer, w.author_id))
            .collect()
    }

    /// The landing page: for each language, its most recent published works.
    pub fn portal(&self, viewer: Option<&User>) -> Vec<(Language, Vec<&Work>)> {
        let published = self.published_works(viewer);
        Language::ALL
            .into_iter()
            .map(|language| {
                let section = published
                    .iter()
                    .filter(|w| w.language == language)
                    .take(PORTAL_SECTION_SIZE)
                    .copied()
                    .collect();
                (language, section)
            })
            .collect()
    }

    pub fn search_archive(&self, viewer: Option<&User>, filter: &ArchiveFilter) -> Vec<&Work> {
        let needle = filter.query.as_ref().map(|q| q.to_lowercase());
        self.published_works(viewer)
            .into_iter()
            .filter(|w| match &needle {
                Some(needle) => {
                    w.title.to_lowercase().contains(needle)
                        || w.author_name.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|w| filter.language.is_none_or(|l| w.language == l))
            .filter(|w| filter.sensitivities.iter().all(|s| w.sensitivities.contains(s)))
            .collect()
    }

    /// A uniform random sample of published works.
    pub fn for_you<R: Rng + ?Sized>(&self, viewer: Option<&User>, rng: &mut R) -> Vec<&Work> {
        self.published_works(viewer)
            .into_iter()
            .choose_multiple(rng, FOR_YOU_SIZE)
    }

    /// Works awaiting review, newest first.
    pub fn moderation_queue(&self) -> Vec<&Work> {
        self.works
            .iter()
            .filter(|w| w.status == WorkStatus::Pending)
            .collect()
    }

    /// Everything a user has uploaded, whatever its status.
    pub fn works_by_author(&self, author_id: Uuid) -> Vec<&Work> {
        self.works.iter().filter(|w| w.author_id == author_id).collect()
    }

    /// The messaging contact list: everyone except the viewer and the
    /// people they block.
    pub fn contacts(&self, viewer: &User) -> Vec<&User> {
        self.users
            .iter()
            .filter(|u| u.id != viewer.id)
            .filter(|u| !viewer.blocked_user_ids.contains(&u.id))
            .collect()
    }

    /// Followers and following merged into one deduplicated list.
    pub fn connections(&self, user: &User) -> Vec<&User> {
        let mut seen = Vec::new();
        for id in user.follower_ids.iter().chain(&user.following_ids) {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen.into_iter().filter_map(|id| self.user(id)).collect()
    }

    /// Direct messages between the unordered pair `{a, b}`.
    pub fn direct_conversation(&self, a: Uuid, b: Uuid) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| !m.is_thread_message)
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b)
                    || (m.sender_id == b && m.receiver_id == a)
            })
            .collect()
    }

    pub fn thread_messages(&self, thread_id: Uuid) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.is_thread_message && m.receiver_id == thread_id)
            .collect()
    }

    /// Threads the viewer can see: public ones plus any they are in.
    pub fn threads_for(&self, viewer: &User) -> Vec<&ChatThread> {
        self.threads
            .iter()
            .filter(|t| t.is_public || t.participant_ids.contains(&viewer.id))
            .collect()
    }

    /// Folders the viewer can see: their own, public ones, and folders they
    /// collaborate on. Link-access folders stay unlisted.
    pub fn folders_for(&self, viewer: &User) -> Vec<&Folder> {
        self.folders
            .iter()
            .filter(|f| {
                f.owner_id == viewer.id
                    || f.access == FolderAccess::Public
                    || (f.edit_mode == FolderEditMode::Collaborative
                        && f.collaborator_ids.contains(&viewer.id))
            })
            .collect()
    }
}
