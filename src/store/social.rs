//! The social graph: follow and block edges.

use uuid::Uuid;

use super::StateStore;
use crate::error::{StoreError, StoreResult};

impl StateStore {
    /// Follow or unfollow `target_id` as the session user. Both sides of the
    /// edge change in the same call; a half-applied edge never exists.
    /// Applying this twice restores the original state. Returns whether the
    /// session user follows the target afterwards.
    pub async fn toggle_follow(&mut self, target_id: Uuid) -> StoreResult<bool> {
        let actor_id = self.require_session()?.id;
        if actor_id == target_id {
            return Err(StoreError::Conflict("cannot follow yourself"));
        }
        if !self.users.iter().any(|u| u.id == target_id) {
            return Err(StoreError::NotFound("user"));
        }

        let currently_following = self
            .users
            .iter()
            .find(|u| u.id == actor_id)
            .is_some_and(|u| u.following_ids.contains(&target_id));

        for user in &mut self.users {
            if user.id == actor_id {
                if currently_following {
                    user.following_ids.retain(|id| *id != target_id);
                } else {
                    user.following_ids.push(target_id);
                }
            } else if user.id == target_id {
                if currently_following {
                    user.follower_ids.retain(|id| *id != actor_id);
                } else {
                    user.follower_ids.push(actor_id);
                }
            }
        }

        self.sync_session();
        self.save_users().await?;
        self.save_session().await?;

        Ok(!currently_following)
    }

    /// Add `target_id` to the session user's blocked set. Idempotent, and
    /// one-directional: follow edges are untouched.
    pub async fn block_user(&mut self, target_id: Uuid) -> StoreResult<()> {
        let actor_id = self.require_session()?.id;
        if actor_id == target_id {
            return Err(StoreError::Conflict("cannot block yourself"));
        }
        if !self.users.iter().any(|u| u.id == target_id) {
            return Err(StoreError::NotFound("user"));
        }

        let actor = self
            .users
            .iter_mut()
            .find(|u| u.id == actor_id)
            .ok_or(StoreError::NotFound("user"))?;
        if !actor.blocked_user_ids.contains(&target_id) {
            actor.blocked_user_ids.push(target_id);
        }

        self.sync_session();
        self.save_users().await?;
        self.save_session().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{register, scratch_store};
    use anyhow::Result;

    #[tokio::test]
    async fn follow_edges_stay_symmetric() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;

        let now_following = store.toggle_follow(ben.id).await?;
        assert!(now_following);

        let ada_record = store.user(ada.id).expect("ada should exist");
        let ben_record = store.user(ben.id).expect("ben should exist");
        assert!(ada_record.following_ids.contains(&ben.id));
        assert!(ben_record.follower_ids.contains(&ada.id));
        // No edge in the other direction appeared.
        assert!(ada_record.follower_ids.is_empty());
        assert!(ben_record.following_ids.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn toggling_twice_is_an_involution() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;

        store.toggle_follow(ben.id).await?;
        let now_following = store.toggle_follow(ben.id).await?;
        assert!(!now_following);

        let ada_record = store.user(ada.id).expect("ada should exist");
        let ben_record = store.user(ben.id).expect("ben should exist");
        assert!(ada_record.following_ids.is_empty());
        assert!(ben_record.follower_ids.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn self_follow_is_rejected() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let err = store.toggle_follow(ada.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let record = store.user(ada.id).expect("ada should exist");
        assert!(record.following_ids.is_empty());
        assert!(record.follower_ids.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn following_requires_session_and_target() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        assert!(matches!(
            store.toggle_follow(Uuid::new_v4()).await.unwrap_err(),
            StoreError::NotFound(_)
        ));

        store.logout().await?;
        assert!(matches!(
            store.toggle_follow(ada.id).await.unwrap_err(),
            StoreError::Unauthorized
        ));

        Ok(())
    }

    #[tokio::test]
    async fn blocking_is_idempotent() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;

        store.block_user(ben.id).await?;
        store.block_user(ben.id).await?;

        let record = store.user(ada.id).expect("ada should exist");
        assert_eq!(record.blocked_user_ids, vec![ben.id]);

        Ok(())
    }

    #[tokio::test]
    async fn blocking_leaves_follow_edges_alone() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;

        store.toggle_follow(ben.id).await?;
        store.block_user(ben.id).await?;

        let ada_record = store.user(ada.id).expect("ada should exist");
        let ben_record = store.user(ben.id).expect("ben should exist");
        assert!(ada_record.following_ids.contains(&ben.id));
        assert!(ben_record.follower_ids.contains(&ada.id));
        assert!(ada_record.blocked_user_ids.contains(&ben.id));
        // One-directional: ben's view of ada is untouched.
        assert!(ben_record.blocked_user_ids.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn self_block_is_rejected() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let err = store.block_user(ada.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store
            .user(ada.id)
            .expect("ada should exist")
            .blocked_user_ids
            .is_empty());

        Ok(())
    }
}
