//! Session and identity operations.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::StateStore;
use crate::{
    error::{StoreError, StoreResult},
    models::{LocalTheme, ProfileTheme, Role, User},
};

/// Fields accepted at registration. Username, password, and display name
/// must be non-empty; that check belongs to the caller, not the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A shallow profile merge. `None` fields are left unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub theme: Option<ProfileTheme>,
}

/// Deterministic generated-portrait URL for accounts that never set one.
fn default_avatar(username: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={username}")
}

impl StateStore {
    /// Create an account and make it the active session.
    ///
    /// The first account ever registered is granted [`Role::Admin`];
    /// everyone after that starts as [`Role::User`].
    pub async fn register(&mut self, input: Registration) -> StoreResult<User> {
        if self.users.iter().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict("username already registered"));
        }

        let role = if self.users.is_empty() {
            Role::Admin
        } else {
            Role::User
        };

        let user = User {
            id: Uuid::new_v4(),
            avatar: default_avatar(&input.username),
            username: input.username,
            password: input.password,
            name: input.name,
            email: input.email,
            phone: input.phone,
            role,
            bio: String::new(),
            theme: ProfileTheme {
                background_color: Some("#ffffff".to_owned()),
                header_color: Some("#1a237e".to_owned()),
                ..ProfileTheme::default()
            },
            verified_progress: 0,
            blocked_user_ids: Vec::new(),
            follower_ids: Vec::new(),
            following_ids: Vec::new(),
        };

        info!(username = %user.username, role = ?user.role, "registered new account");

        self.users.push(user.clone());
        self.session = Some(user.clone());
        self.save_users().await?;
        self.save_session().await?;

        Ok(user)
    }

    /// Authenticate with a username and password. A credential mismatch is a
    /// normal `None` outcome, never an error.
    pub async fn login(&mut self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let found = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned();

        match found {
            Some(user) => {
                info!(username = %user.username, "session opened");
                self.session = Some(user.clone());
                self.save_session().await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Clear the active session. Safe to call while signed out.
    pub async fn logout(&mut self) -> StoreResult<()> {
        self.session = None;
        self.save_session().await?;
        Ok(())
    }

    /// Merge profile changes into the session user and the matching entry in
    /// the canonical collection.
    pub async fn update_profile(&mut self, changes: ProfileUpdate) -> StoreResult<User> {
        let id = self.require_session()?.id;
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound("user"))?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(email) = changes.email {
            user.email = Some(email);
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(theme) = changes.theme {
            user.theme = theme;
        }

        let updated = user.clone();
        self.session = Some(updated.clone());
        self.save_users().await?;
        self.save_session().await?;

        Ok(updated)
    }

    /// Overwrite the platform-wide cosmetic theme. Not tied to a session.
    pub async fn update_local_theme(&mut self, theme: LocalTheme) -> StoreResult<()> {
        self.local_theme = theme;
        self.save_local_theme().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PolicyConfig,
        storage::SnapshotDb,
        tests::{register, scratch_store},
    };
    use anyhow::Result;

    #[tokio::test]
    async fn first_registrant_is_admin_everyone_else_user() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let first = register(&mut store, "ada").await?;
        assert_eq!(first.role, Role::Admin);

        let second = register(&mut store, "ben").await?;
        assert_eq!(second.role, Role::User);

        let third = register(&mut store, "cam").await?;
        assert_eq!(third.role, Role::User);

        Ok(())
    }

    #[tokio::test]
    async fn registration_sets_defaults_and_session() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let user = register(&mut store, "ada").await?;
        assert!(user.avatar.contains("seed=ada"));
        assert_eq!(user.theme.background_color.as_deref(), Some("#ffffff"));
        assert_eq!(user.theme.header_color.as_deref(), Some("#1a237e"));
        assert_eq!(user.verified_progress, 0);
        assert!(user.blocked_user_ids.is_empty());
        assert_eq!(store.session().map(|u| u.id), Some(user.id));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        register(&mut store, "ada").await?;
        let err = store
            .register(Registration {
                username: "ada".into(),
                password: "other".into(),
                name: "Ada Again".into(),
                email: None,
                phone: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.users().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn login_compares_credentials_verbatim() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let user = register(&mut store, "ada").await?;
        store.logout().await?;

        assert!(store.login("ada", "wrong").await?.is_none());
        assert!(store.session().is_none());

        let opened = store.login("ada", "password123").await?;
        assert_eq!(opened.map(|u| u.id), Some(user.id));
        assert_eq!(store.session().map(|u| u.id), Some(user.id));

        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_persisted_session() -> Result<()> {
        let (dir, mut store) = scratch_store().await?;
        let url = format!("sqlite://{}/state.db", dir.path().display());

        register(&mut store, "ada").await?;
        store.logout().await?;

        let reloaded =
            StateStore::load(SnapshotDb::open(&url).await?, PolicyConfig::default()).await?;
        assert!(reloaded.session().is_none());
        assert_eq!(reloaded.users().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn session_rehydrates_at_startup() -> Result<()> {
        let (dir, mut store) = scratch_store().await?;
        let url = format!("sqlite://{}/state.db", dir.path().display());

        let user = register(&mut store, "ada").await?;

        let reloaded =
            StateStore::load(SnapshotDb::open(&url).await?, PolicyConfig::default()).await?;
        assert_eq!(reloaded.session().map(|u| u.id), Some(user.id));

        Ok(())
    }

    #[tokio::test]
    async fn profile_merge_leaves_omitted_fields_alone() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let user = register(&mut store, "ada").await?;
        let updated = store
            .update_profile(ProfileUpdate {
                bio: Some("prints and light studies".into()),
                ..ProfileUpdate::default()
            })
            .await?;

        assert_eq!(updated.bio, "prints and light studies");
        assert_eq!(updated.name, user.name);
        assert_eq!(updated.avatar, user.avatar);

        // Both the session copy and the canonical entry moved.
        assert_eq!(store.session().map(|u| u.bio.clone()), Some(updated.bio.clone()));
        assert_eq!(
            store.user(user.id).map(|u| u.bio.clone()),
            Some(updated.bio)
        );

        Ok(())
    }

    #[tokio::test]
    async fn profile_update_requires_a_session() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let err = store
            .update_profile(ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));

        Ok(())
    }

    #[tokio::test]
    async fn local_theme_round_trips_without_a_session() -> Result<()> {
        let (dir, mut store) = scratch_store().await?;
        let url = format!("sqlite://{}/state.db", dir.path().display());

        store
            .update_local_theme(LocalTheme {
                platform_background: "https://example.com/bg.png".into(),
                platform_opacity: 0.5,
            })
            .await?;

        let reloaded =
            StateStore::load(SnapshotDb::open(&url).await?, PolicyConfig::default()).await?;
        assert_eq!(reloaded.local_theme().platform_opacity, 0.5);
        assert_eq!(
            reloaded.local_theme().platform_background,
            "https://example.com/bg.png"
        );

        Ok(())
    }
}
