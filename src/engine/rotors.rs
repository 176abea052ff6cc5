//! Rotor version manager: rotor lifecycle and rotor themes.
//!
//! A rotor moves draft -> active -> archived. At most one rotor per class
//! type is active; activating a rotor archives the previous one in the same
//! transaction.

use chrono::{DateTime, Utc};

use super::locks::class_type_key;
use super::{new_id, require_name, Engine};
use crate::db;
use crate::errors::AppError;
use crate::models::{
    CreateThemeRequest, Rotor, RotorStatus, RotorTheme, UpdateThemeRequest,
};

impl Engine {
    /// Create a draft rotor with the next version number for its class type.
    pub async fn create_rotor(
        &self,
        class_type_id: &str,
        name: &str,
        created_by: &str,
    ) -> Result<Rotor, AppError> {
        if class_type_id.trim().is_empty() {
            return Err(AppError::Validation("Class type is required".to_string()));
        }
        let name = require_name(name, "Rotor")?;

        let _guard = self.locks.lock(class_type_key(class_type_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let version = db::next_rotor_version(&mut tx, class_type_id).await?;
        let rotor = Rotor {
            id: new_id(),
            class_type_id: class_type_id.to_string(),
            name,
            version,
            status: RotorStatus::Draft,
            preview_on: false,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            activated_at: None,
        };
        db::insert_rotor(&mut tx, &rotor).await?;
        tx.commit().await?;

        tracing::info!(
            rotor_id = %rotor.id,
            class_type_id = %rotor.class_type_id,
            version = rotor.version,
            "Created rotor"
        );
        Ok(rotor)
    }

    /// Make a rotor the active one for its class type.
    ///
    /// Any other active rotor of the class type is archived first.
    pub async fn activate_rotor(&self, rotor_id: &str, now: DateTime<Utc>) -> Result<Rotor, AppError> {
        let class_type_id = self.get_rotor(rotor_id).await?.class_type_id;

        let _guard = self.locks.lock(class_type_key(&class_type_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let mut rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;

        if rotor.status == RotorStatus::Active {
            tracing::debug!(rotor_id = %rotor.id, "Rotor already active");
            return Ok(rotor);
        }

        if let Some(mut previous) = db::get_active_rotor(&mut tx, &rotor.class_type_id).await? {
            previous.status = RotorStatus::Archived;
            db::save_rotor(&mut tx, &previous).await?;
            tracing::info!(
                rotor_id = %previous.id,
                class_type_id = %previous.class_type_id,
                "Archived previously active rotor"
            );
        }

        rotor.status = RotorStatus::Active;
        rotor.activated_at = Some(now);
        db::save_rotor(&mut tx, &rotor).await?;
        tx.commit().await?;

        tracing::info!(
            rotor_id = %rotor.id,
            class_type_id = %rotor.class_type_id,
            version = rotor.version,
            "Activated rotor"
        );
        Ok(rotor)
    }

    /// Retire the active rotor of a class type.
    pub async fn archive_rotor(&self, rotor_id: &str) -> Result<Rotor, AppError> {
        let class_type_id = self.get_rotor(rotor_id).await?.class_type_id;

        let _guard = self.locks.lock(class_type_key(&class_type_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let mut rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;
        if rotor.status != RotorStatus::Active {
            return Err(AppError::Conflict(
                "only active rotors can be archived".to_string(),
            ));
        }

        rotor.status = RotorStatus::Archived;
        db::save_rotor(&mut tx, &rotor).await?;
        tx.commit().await?;

        tracing::info!(rotor_id = %rotor.id, "Archived rotor");
        Ok(rotor)
    }

    /// Delete a rotor that is not active, together with everything under it.
    pub async fn delete_rotor(&self, rotor_id: &str) -> Result<(), AppError> {
        let class_type_id = self.get_rotor(rotor_id).await?.class_type_id;

        let _guard = self.locks.lock(class_type_key(&class_type_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;
        if rotor.status == RotorStatus::Active {
            return Err(AppError::Conflict(
                "cannot delete an active rotor".to_string(),
            ));
        }

        db::delete_rotor(&mut tx, rotor_id).await?;
        tx.commit().await?;

        tracing::info!(rotor_id = %rotor_id, "Deleted rotor");
        Ok(())
    }

    pub async fn rename_rotor(&self, rotor_id: &str, name: &str) -> Result<Rotor, AppError> {
        let name = require_name(name, "Rotor")?;
        let mut tx = self.repo.begin_write().await?;

        let mut rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;
        rotor.name = name;
        db::save_rotor(&mut tx, &rotor).await?;
        tx.commit().await?;

        Ok(rotor)
    }

    /// Flip the preview flag. Independent of the rotor's status.
    pub async fn toggle_preview(&self, rotor_id: &str) -> Result<Rotor, AppError> {
        let mut tx = self.repo.begin_write().await?;

        let mut rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;
        rotor.preview_on = !rotor.preview_on;
        db::save_rotor(&mut tx, &rotor).await?;
        tx.commit().await?;

        tracing::info!(rotor_id = %rotor.id, preview_on = rotor.preview_on, "Toggled rotor preview");
        Ok(rotor)
    }

    pub async fn get_rotor(&self, rotor_id: &str) -> Result<Rotor, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::get_rotor(&mut conn, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))
    }

    /// All rotors of a class type, newest version first.
    pub async fn list_rotors_by_class_type(&self, class_type_id: &str) -> Result<Vec<Rotor>, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::list_rotors_by_class_type(&mut conn, class_type_id).await
    }

    pub async fn get_active_rotor(&self, class_type_id: &str) -> Result<Option<Rotor>, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::get_active_rotor(&mut conn, class_type_id).await
    }

    /// Attach a theme to a draft rotor.
    pub async fn add_theme(
        &self,
        rotor_id: &str,
        request: CreateThemeRequest,
    ) -> Result<RotorTheme, AppError> {
        let name = require_name(&request.name, "Theme")?;
        let class_type_id = self.get_rotor(rotor_id).await?.class_type_id;

        let _guard = self.locks.lock(class_type_key(&class_type_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let rotor = db::get_rotor(&mut tx, rotor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rotor {} not found", rotor_id)))?;
        if rotor.status != RotorStatus::Draft {
            return Err(AppError::Conflict(
                "can only add themes to draft rotors".to_string(),
            ));
        }

        let theme = RotorTheme {
            id: new_id(),
            rotor_id: rotor.id,
            name,
            position: request.position,
            hidden: request.hidden,
        };
        db::save_theme(&mut tx, &theme).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme.id, rotor_id = %theme.rotor_id, "Added theme");
        Ok(theme)
    }

    /// Rename, move or hide a theme.
    pub async fn update_theme(
        &self,
        theme_id: &str,
        request: UpdateThemeRequest,
    ) -> Result<RotorTheme, AppError> {
        let mut tx = self.repo.begin_write().await?;

        let mut theme = db::get_theme(&mut tx, theme_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theme {} not found", theme_id)))?;
        if let Some(name) = request.name {
            theme.name = require_name(&name, "Theme")?;
        }
        if let Some(position) = request.position {
            theme.position = position;
        }
        if let Some(hidden) = request.hidden {
            theme.hidden = hidden;
        }
        db::save_theme(&mut tx, &theme).await?;
        tx.commit().await?;

        Ok(theme)
    }

    pub async fn get_theme(&self, theme_id: &str) -> Result<RotorTheme, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::get_theme(&mut conn, theme_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theme {} not found", theme_id)))
    }

    /// Themes of a rotor in display order.
    pub async fn list_themes_by_rotor(&self, rotor_id: &str) -> Result<Vec<RotorTheme>, AppError> {
        let mut conn = self.repo.acquire().await?;
        if db::get_rotor(&mut conn, rotor_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Rotor {} not found", rotor_id)));
        }
        db::list_themes_by_rotor(&mut conn, rotor_id).await
    }

    /// Delete a theme with its topics, schedules and votes.
    pub async fn delete_theme(&self, theme_id: &str) -> Result<(), AppError> {
        let _guard = self.locks.lock(super::locks::theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;
        db::delete_theme(&mut tx, theme_id).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme_id, "Deleted theme");
        Ok(())
    }
}
