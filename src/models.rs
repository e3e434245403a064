//! Entity types for the platform.
//!
//! Everything here serializes with camelCase field names. The JSON layout
//! doubles as the persisted snapshot format, so a change to these types is a
//! change to the on-disk schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trust tier of an account.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    User,
    Verified,
    Moderator,
    Admin,
}

impl Role {
    /// Whether new works by this role go live without review.
    pub fn publishes_directly(self) -> bool {
        matches!(self, Self::Verified | Self::Admin)
    }

    /// Whether this role may approve or reject pending works.
    pub fn can_moderate(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

/// The artistic language of a work.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Audiovisual,
    Audio,
    Visual,
    Essay,
}

impl Language {
    /// Every language, in portal display order.
    pub const ALL: [Self; 4] = [Self::Audiovisual, Self::Audio, Self::Visual, Self::Essay];
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audiovisual" => Ok(Self::Audiovisual),
            "audio" => Ok(Self::Audio),
            "visual" => Ok(Self::Visual),
            "essay" => Ok(Self::Essay),
            other => anyhow::bail!("unknown language: {other}"),
        }
    }
}

/// A content-warning category attached to a work.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Fear,
    Violence,
    Sexuality,
    Psychological,
    Excess,
}

impl std::str::FromStr for Sensitivity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fear" => Ok(Self::Fear),
            "violence" => Ok(Self::Violence),
            "sexuality" => Ok(Self::Sexuality),
            "psychological" => Ok(Self::Psychological),
            "excess" => Ok(Self::Excess),
            other => anyhow::bail!("unknown sensitivity: {other}"),
        }
    }
}

/// Moderation state of a work.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    Pending,
    Published,
    Rejected,
    Archived,
}

/// Who can see a folder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FolderAccess {
    Public,
    Private,
    Link,
}

/// Who can toggle works in a folder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FolderEditMode {
    Owner,
    Collaborative,
}

/// Cosmetic profile theme. Carries no invariants; the store treats it as an
/// opaque blob of presentation preferences.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileTheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
}

/// Process-local cosmetic theme for the whole platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalTheme {
    #[serde(default)]
    pub platform_background: String,
    #[serde(default = "default_opacity")]
    pub platform_opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for LocalTheme {
    fn default() -> Self {
        Self {
            platform_background: String::new(),
            platform_opacity: default_opacity(),
        }
    }
}

/// A registered account: identity, role, and social edges.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Login name; unique across the store.
    pub username: String,
    /// Login secret, compared by plain equality.
    pub password: String,
    /// Display name shown on works and profiles.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    /// Avatar image URL.
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub theme: ProfileTheme,
    /// Approvals accumulated toward the verification policy threshold.
    pub verified_progress: u32,
    /// Never contains the user's own id.
    pub blocked_user_ids: Vec<Uuid>,
    /// Never contains the user's own id.
    pub follower_ids: Vec<Uuid>,
    /// Never contains the user's own id.
    pub following_ids: Vec<Uuid>,
}

/// A user as exposed over the API: everything except the login secret.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub theme: ProfileTheme,
    pub verified_progress: u32,
    pub blocked_user_ids: Vec<Uuid>,
    pub follower_ids: Vec<Uuid>,
    pub following_ids: Vec<Uuid>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            theme: user.theme.clone(),
            verified_progress: user.verified_progress,
            blocked_user_ids: user.blocked_user_ids.clone(),
            follower_ids: user.follower_ids.clone(),
            following_ids: user.following_ids.clone(),
        }
    }
}

/// A creative submission and its moderation state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: Uuid,
    /// Owning author; immutable after creation.
    pub author_id: Uuid,
    /// The author's display name as it was at creation time. Not refreshed
    /// if the author later renames.
    pub author_name: String,
    pub title: String,
    pub language: Language,
    /// A URL to the media, or the raw text body for essays.
    pub content_url: String,
    /// Free-text rationale supplied at upload.
    pub intent: String,
    pub sensitivities: Vec<Sensitivity>,
    pub status: WorkStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Lifetime report tally; keeps counting past the archive threshold.
    pub report_count: u32,
}

/// One unit of direct or thread communication. Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    /// A user id for direct messages, or a thread id when
    /// `is_thread_message` is set.
    pub receiver_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_thread_message: bool,
}

/// A named multi-party discussion, optionally anchored to one work.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: Uuid,
    pub name: String,
    pub creator_id: Uuid,
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_id: Option<Uuid>,
    /// Grows through joins; never shrinks.
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A named, ordered collection of works owned by one user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    /// Immutable after creation.
    pub owner_id: Uuid,
    /// Ordered, duplicate-free.
    pub work_ids: Vec<Uuid>,
    pub access: FolderAccess,
    pub edit_mode: FolderEditMode,
    /// Non-owners allowed to toggle works while `edit_mode` is
    /// collaborative. Never contains the owner.
    #[serde(default)]
    pub collaborator_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_camel_case() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ada".into(),
            password: "secret".into(),
            name: "Ada".into(),
            email: None,
            phone: None,
            role: Role::Admin,
            avatar: "https://example.com/a.svg".into(),
            bio: String::new(),
            theme: ProfileTheme::default(),
            verified_progress: 0,
            blocked_user_ids: vec![],
            follower_ids: vec![],
            following_ids: vec![],
        };

        let value = serde_json::to_value(&user).expect("should serialize");
        assert_eq!(value["role"], "ADMIN");
        assert!(value.get("verifiedProgress").is_some());
        assert!(value.get("blockedUserIds").is_some());
        // Password stays in the snapshot layout, but not in the public view.
        assert!(value.get("password").is_some());

        let public = serde_json::to_value(PublicUser::from(&user)).expect("should serialize");
        assert!(public.get("password").is_none());
    }

    #[test]
    fn enum_wire_values() {
        assert_eq!(
            serde_json::to_value(Language::Audiovisual).expect("should serialize"),
            "audiovisual"
        );
        assert_eq!(
            serde_json::to_value(Sensitivity::Psychological).expect("should serialize"),
            "psychological"
        );
        assert_eq!(
            serde_json::to_value(WorkStatus::Pending).expect("should serialize"),
            "PENDING"
        );
        assert_eq!(
            serde_json::to_value(FolderEditMode::Collaborative).expect("should serialize"),
            "collaborative"
        );
    }

    #[test]
    fn local_theme_defaults_apply_on_missing_fields() {
        let theme: LocalTheme = serde_json::from_str("{}").expect("should deserialize");
        assert_eq!(theme, LocalTheme::default());
        assert_eq!(theme.platform_opacity, 1.0);
    }
}
