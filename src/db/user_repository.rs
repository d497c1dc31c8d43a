use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{ NotSet, Set },
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::user;
use crate::error::{ AppError, Result };

/// The unique external identities a user can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityChannel {
    Email,
    Telegram,
    Google,
    Yandex,
}

impl IdentityChannel {
    fn column(&self) -> user::Column {
        match self {
            IdentityChannel::Email => user::Column::Email,
            IdentityChannel::Telegram => user::Column::TelegramId,
            IdentityChannel::Google => user::Column::GoogleId,
            IdentityChannel::Yandex => user::Column::YandexId,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: Option<String>,
    /// Stored as given; hashing happens before it reaches the repository.
    pub password: Option<String>,
    pub telegram_id: Option<String>,
    pub google_id: Option<String>,
    pub yandex_id: Option<String>,
    /// `None` falls back to the default `"user"` role.
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }

    pub async fn create(&self, input: NewUser) -> Result<user::Model> {
        let user = user::ActiveModel {
            email: Set(input.email),
            password: Set(input.password),
            telegram_id: Set(input.telegram_id),
            google_id: Set(input.google_id),
            yandex_id: Set(input.yandex_id),
            role: input.role.map(Set).unwrap_or(NotSet),
            ..Default::default()
        };

        let user = user.insert(self.db.as_ref()).await.map_err(AppError::from_save)?;
        tracing::debug!(id = %user.id, channels = ?user.identity_channels(), "Created user");
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<user::Model> {
        user::Entity::find_by_id(id).one(self.db.as_ref()).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn find_by_identity(
        &self,
        channel: IdentityChannel,
        value: &str
    ) -> Result<Option<user::Model>> {
        let user = user::Entity
            ::find()
            .filter(channel.column().eq(value))
            .one(self.db.as_ref()).await?;

        Ok(user)
    }

    /// Attaches (or replaces) one identity channel on an existing account.
    pub async fn link_identity(
        &self,
        id: Uuid,
        channel: IdentityChannel,
        value: String
    ) -> Result<user::Model> {
        let mut active: user::ActiveModel = self.find_by_id(id).await?.into();

        match channel {
            IdentityChannel::Email => {
                active.email = Set(Some(value));
            }
            IdentityChannel::Telegram => {
                active.telegram_id = Set(Some(value));
            }
            IdentityChannel::Google => {
                active.google_id = Set(Some(value));
            }
            IdentityChannel::Yandex => {
                active.yandex_id = Set(Some(value));
            }
        }

        let user = active.update(self.db.as_ref()).await.map_err(AppError::from_save)?;
        Ok(user)
    }

    pub async fn update_role(&self, id: Uuid, role: &str) -> Result<user::Model> {
        if role.trim().is_empty() {
            return Err(AppError::Validation("role must not be empty".to_string()));
        }

        let mut active: user::ActiveModel = self.find_by_id(id).await?.into();
        active.role = Set(role.to_string());

        let user = active.update(self.db.as_ref()).await.map_err(AppError::from_save)?;
        tracing::info!(id = %user.id, role = %user.role, "Updated user role");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = user::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
