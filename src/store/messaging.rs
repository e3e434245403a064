//! Direct messages and chat threads.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::StateStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{ChatThread, Message};

impl StateStore {
    /// Append a message from the session user. `receiver_id` is a user id for
    /// direct messages and a thread id when `is_thread_message` is set.
    /// Content is stored as given; callers reject empty bodies.
    pub async fn send_message(
        &mut self,
        receiver_id: Uuid,
        content: String,
        is_thread_message: bool,
    ) -> StoreResult<Message> {
        let sender_id = self.require_session()?.id;
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content,
            timestamp: Utc::now(),
            is_thread_message,
        };
        self.messages.push(message.clone());
        self.save_messages().await?;
        Ok(message)
    }

    /// Open a chat thread with the session user as its only participant.
    /// When the unique-work-threads policy is on, a second thread bound to
    /// the same work is a `Conflict`.
    pub async fn create_thread(
        &mut self,
        name: String,
        is_public: bool,
        work_id: Option<Uuid>,
    ) -> StoreResult<ChatThread> {
        let creator_id = self.require_session()?.id;
        if self.policy.unique_work_threads {
            if let Some(work_id) = work_id {
                if self.threads.iter().any(|t| t.work_id == Some(work_id)) {
                    return Err(StoreError::Conflict("a thread for this work already exists"));
                }
            }
        }

        let thread = ChatThread {
            id: Uuid::new_v4(),
            name,
            creator_id,
            is_public,
            work_id,
            participant_ids: vec![creator_id],
            created_at: Utc::now(),
        };
        info!(thread = %thread.id, name = %thread.name, "thread created");
        self.threads.push(thread.clone());
        self.save_threads().await?;
        Ok(thread)
    }

    /// Add the session user to a thread's participants. Joining a thread the
    /// user already belongs to is an Ok no-op.
    pub async fn join_thread(&mut self, thread_id: Uuid) -> StoreResult<ChatThread> {
        let user_id = self.require_session()?.id;
        let thread = self
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or(StoreError::NotFound("thread"))?;

        if thread.participant_ids.contains(&user_id) {
            return Ok(thread.clone());
        }
        thread.participant_ids.push(user_id);
        let joined = thread.clone();
        self.save_threads().await?;
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::tests::{register, scratch_store, scratch_store_with};
    use anyhow::Result;

    #[tokio::test]
    async fn a_direct_message_lands_in_exactly_one_conversation() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        let cara = register(&mut store, "cara").await?;
        store.login("ada", "password123").await?;

        let sent = store
            .send_message(ben.id, "have you seen the portal today?".into(), false)
            .await?;

        assert_eq!(store.messages().len(), 1);
        assert_eq!(sent.sender_id, ada.id);
        assert_eq!(sent.receiver_id, ben.id);
        assert_eq!(sent.content, "have you seen the portal today?");
        assert!(!sent.is_thread_message);

        let ada_ben = store.direct_conversation(ada.id, ben.id);
        assert_eq!(ada_ben.len(), 1);
        assert_eq!(ada_ben[0].id, sent.id);
        // The pair is unordered.
        assert_eq!(store.direct_conversation(ben.id, ada.id).len(), 1);
        assert!(store.direct_conversation(ada.id, cara.id).is_empty());
        assert!(store.direct_conversation(ben.id, cara.id).is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn sending_requires_a_session() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        store.logout().await?;

        let err = store
            .send_message(ada.id, "hello?".into(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
        assert!(store.messages().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn a_new_thread_contains_only_its_creator() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let thread = store.create_thread("night owls".into(), true, None).await?;

        assert_eq!(thread.creator_id, ada.id);
        assert_eq!(thread.participant_ids, vec![ada.id]);
        assert!(thread.is_public);
        assert!(thread.work_id.is_none());
        assert_eq!(store.threads().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn thread_messages_stay_out_of_direct_conversations() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;

        let thread = store.create_thread("critique".into(), true, None).await?;
        let posted = store
            .send_message(thread.id, "first impressions?".into(), true)
            .await?;

        let in_thread = store.thread_messages(thread.id);
        assert_eq!(in_thread.len(), 1);
        assert_eq!(in_thread[0].id, posted.id);
        assert!(store.direct_conversation(ada.id, ben.id).is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_work_threads_are_allowed_by_default() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        register(&mut store, "ada").await?;
        let work_id = Uuid::new_v4();
        store.create_thread("first".into(), true, Some(work_id)).await?;
        store.create_thread("second".into(), true, Some(work_id)).await?;

        assert_eq!(store.threads().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn unique_work_threads_policy_rejects_duplicates() -> Result<()> {
        let policy = PolicyConfig {
            unique_work_threads: true,
            ..PolicyConfig::default()
        };
        let (_dir, mut store) = scratch_store_with(policy).await?;

        register(&mut store, "ada").await?;
        let work_id = Uuid::new_v4();
        store.create_thread("first".into(), true, Some(work_id)).await?;

        let err = store
            .create_thread("second".into(), true, Some(work_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.threads().len(), 1);

        // A different work, or no work at all, is still fine.
        store
            .create_thread("other".into(), true, Some(Uuid::new_v4()))
            .await?;
        store.create_thread("free-floating".into(), false, None).await?;
        assert_eq!(store.threads().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn joining_twice_keeps_one_participant_entry() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        let ada = register(&mut store, "ada").await?;
        let ben = register(&mut store, "ben").await?;
        store.login("ada", "password123").await?;
        let thread = store.create_thread("night owls".into(), true, None).await?;

        store.login("ben", "password123").await?;
        let joined = store.join_thread(thread.id).await?;
        assert_eq!(joined.participant_ids, vec![ada.id, ben.id]);

        let joined_again = store.join_thread(thread.id).await?;
        assert_eq!(joined_again.participant_ids, vec![ada.id, ben.id]);

        Ok(())
    }

    #[tokio::test]
    async fn joining_an_unknown_thread_is_not_found() -> Result<()> {
        let (_dir, mut store) = scratch_store().await?;

        register(&mut store, "ada").await?;
        let err = store.join_thread(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        Ok(())
    }
}
