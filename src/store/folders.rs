//! Folders: user-curated collections of works.

use tracing::info;
use uuid::Uuid;

use super::StateStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Folder, FolderAccess, FolderEditMode};

impl StateStore {
    pub async fn create_folder(
        &mut self,
        name: String,
        access: FolderAccess,
        edit_mode: FolderEditMode,
    ) -> StoreResult<Folder> {
        let owner_id = self.require_session()?.id;
        let folder = Folder {
            id: Uuid::new_v4(),
            name,
            owner_id,
            work_ids: Vec::new(),
            access,
            edit_mode,
            collaborator_ids: Vec::new(),
        };
        info!(folder = %folder.id, name = %folder.name, "folder created");
        self.folders.push(folder.clone());
        self.save_folders().await?;
        Ok(folder)
    }

    /// Remove the work from the folder if present, append it otherwise. The
    /// owner may always toggle; anyone else only when the folder is
    /// collaborative and they are on its collaborator list.
    pub async fn toggle_work_in_folder(
        &mut self,
        folder_id: Uuid,
        work_id: Uuid,
    ) -> StoreResult<Folder> {
        let actor_id = self.require_session()?.id;
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or(StoreError::NotFound("folder"))?;

        let may_edit = folder.owner_id == actor_id
            || (folder.edit_mode == FolderEditMode::Collaborative
                && folder.collaborator_ids.contains(&actor_id));
        if !may_edit {
            return Err(StoreError::Forbidden);
        }

        if folder.work_ids.contains(&work_id) {
            folder.work_ids.retain(|id| *id != work_id);
        } else {
            folder.work_ids.push(work_id);
        }
        let updated = folder.clone();
        self.save_folders().await?;
        Ok(updated)
    }

    /// Overwrite the folder's access and edit mode. Owner-only.
    pub async fn update_folder_settings(
        &mut self,
        folder_id: Uuid,
        access: FolderAccess,
        edit_mode: FolderEditMode,
    ) -> StoreResult<Folder> {
        let actor_id = self.require_session()?.id;
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or(StoreError::NotFound("folder"))?;
        if folder.owner_id != actor_id {
            return Err(StoreError::Forbidden);
        }

        folder.access = access;
        folder.edit_mode = edit_mode;
        let updated = folder.clone();
        self.save_folders().await?;
        Ok(updated)
    }

    /// Replace the folder's collaborator list. Owner-only. The owner's own id
    /// is never stored; duplicates collapse, keeping first occurrence order.
    pub async fn set_folder_collaborators(
        &mut self,
        folder_id: Uuid,
        user_ids: Vec<Uuid>,
    ) -> StoreResult<Folder> {
        let actor_id = self.require_session()?.id;
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or(StoreError::NotFound("folder"))?;
        if folder.owner_id != actor_id {
            return Err(StoreError::Forbidden);
        }

        let mut collaborators = Vec::new();
        for id in user_ids {
            if id != folder.owner_id && !collaborators.contains(&id) {
                collaborators.push(id);
            }
        }
        folder.collaborator_ids = collaborators;
        let updated = folder.clone();
        self.save_folders().await?;
        Ok(updated)
    }
}
