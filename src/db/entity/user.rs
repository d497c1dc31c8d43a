use chrono::Duration;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{ self, NotSet, Set, Unchanged };
use serde::{ Deserialize, Serialize };

pub const DEFAULT_ROLE: &str = "user";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, nullable)]
    pub email: Option<String>,
    /// Absent for accounts that only sign in through a social provider.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[sea_orm(unique, nullable)]
    pub telegram_id: Option<String>,
    #[sea_orm(unique, nullable)]
    pub google_id: Option<String>,
    #[sea_orm(unique, nullable)]
    pub yandex_id: Option<String>,
    #[sea_orm(default_value = "user")]
    pub role: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Names of the identity channels populated on this account.
    pub fn identity_channels(&self) -> Vec<&'static str> {
        [
            ("email", &self.email),
            ("telegram", &self.telegram_id),
            ("google", &self.google_id),
            ("yandex", &self.yandex_id),
        ]
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_some_and(|v| !v.is_empty()))
            .map(|(channel, _)| channel)
            .collect()
    }

    pub fn has_identity(&self) -> bool {
        !self.identity_channels().is_empty()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModel {
    /// True when every identity channel is known to be empty. Fields that are
    /// not loaded on an update are treated as unknown.
    fn lacks_identity(&self, insert: bool) -> bool {
        [&self.email, &self.telegram_id, &self.google_id, &self.yandex_id]
            .into_iter()
            .all(|field| match field {
                Set(value) | Unchanged(value) => value.as_deref().map_or(true, str::is_empty),
                NotSet => insert,
            })
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
        where C: ConnectionTrait
    {
        let now = super::now();

        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            if self.role.is_not_set() {
                self.role = Set(DEFAULT_ROLE.to_string());
            }
            self.created_at = Set(now);
            self.updated_at = Set(now);
        } else {
            if self.created_at.is_set() {
                self.created_at = NotSet;
            }
            self.updated_at = Set(next_update_time(&self.updated_at, now));
        }

        // Not enforced: accounts without any identity channel are only reported.
        if self.lacks_identity(insert) {
            tracing::warn!(user_id = ?self.id, "Saving user without any identity channel");
        }

        Ok(self)
    }
}

/// `updated_at` must move forward on every mutation, even when the clock has
/// not advanced past the stored value.
fn next_update_time(previous: &ActiveValue<DateTimeUtc>, now: DateTimeUtc) -> DateTimeUtc {
    match previous {
        Set(prev) | Unchanged(prev) if *prev >= now => *prev + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{ DatabaseBackend, IdenStatic, MockDatabase };

    use super::*;

    fn stored_user() -> Model {
        let created = super::super::now() - Duration::days(1);
        Model {
            id: Uuid::new_v4(),
            email: Some("trader@example.com".to_string()),
            password: Some("$argon2id$hash".to_string()),
            telegram_id: None,
            google_id: None,
            yandex_id: None,
            role: DEFAULT_ROLE.to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_table_and_column_names() {
        assert_eq!(Entity.table_name(), "users");
        assert_eq!(IdenStatic::as_str(&Column::TelegramId), "telegram_id");
        assert_eq!(IdenStatic::as_str(&Column::GoogleId), "google_id");
        assert_eq!(IdenStatic::as_str(&Column::YandexId), "yandex_id");
        assert_eq!(IdenStatic::as_str(&Column::UpdatedAt), "updated_at");
    }

    #[tokio::test]
    async fn test_insert_defaults_role_and_timestamps() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let user = ActiveModel {
            telegram_id: Set(Some("123456789".to_string())),
            ..Default::default()
        };
        let user = user.before_save(&db, true).await.unwrap();

        assert!(user.id.is_set());
        assert_eq!(user.role.clone().unwrap(), "user");
        assert_eq!(user.created_at.clone().unwrap(), user.updated_at.clone().unwrap());
    }

    #[tokio::test]
    async fn test_insert_keeps_explicit_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let admin = ActiveModel {
            email: Set(Some("admin@example.com".to_string())),
            role: Set("admin".to_string()),
            ..Default::default()
        };
        let admin = admin.before_save(&db, true).await.unwrap();

        assert_eq!(admin.role.unwrap(), "admin");
    }

    #[tokio::test]
    async fn test_update_advances_updated_at_only() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let stored = stored_user();

        let mut active: ActiveModel = stored.clone().into();
        active.google_id = Set(Some("google-oauth-sub".to_string()));
        let active = active.before_save(&db, false).await.unwrap();

        assert!(active.updated_at.clone().unwrap() > stored.updated_at);
        assert_eq!(active.created_at.unwrap(), stored.created_at);
    }

    #[tokio::test]
    async fn test_update_discards_created_at_changes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mut active: ActiveModel = stored_user().into();
        active.created_at = Set(Utc::now());
        let active = active.before_save(&db, false).await.unwrap();

        assert!(active.created_at.is_not_set());
    }

    #[test]
    fn test_updated_at_strictly_increases_when_clock_lags() {
        let stored = super::super::now() + Duration::seconds(5);

        let next = next_update_time(&Unchanged(stored), super::super::now());
        assert!(next > stored);

        let later = stored + Duration::seconds(1);
        assert_eq!(next_update_time(&Unchanged(stored), later), later);
        assert_eq!(next_update_time(&NotSet, later), later);
    }

    #[test]
    fn test_lacks_identity_on_insert() {
        let anonymous = ActiveModel { password: Set(Some("hash".to_string())), ..Default::default() };
        assert!(anonymous.lacks_identity(true));

        let blank_email = ActiveModel { email: Set(Some(String::new())), ..Default::default() };
        assert!(blank_email.lacks_identity(true));

        let yandex = ActiveModel { yandex_id: Set(Some("yandex-uid".to_string())), ..Default::default() };
        assert!(!yandex.lacks_identity(true));
    }

    #[test]
    fn test_lacks_identity_on_update() {
        // unloaded identity fields are unknown, not empty
        let partial = ActiveModel {
            id: Unchanged(Uuid::new_v4()),
            role: Set("admin".to_string()),
            ..Default::default()
        };
        assert!(!partial.lacks_identity(false));

        let mut stored = stored_user();
        stored.email = None;
        let loaded: ActiveModel = stored.into();
        assert!(loaded.lacks_identity(false));

        let linked: ActiveModel = stored_user().into();
        assert!(!linked.lacks_identity(false));
    }

    #[test]
    fn test_identity_channels() {
        let mut user = stored_user();
        assert_eq!(user.identity_channels(), vec!["email"]);
        assert!(user.has_identity());

        user.email = None;
        user.yandex_id = Some("yandex-uid".to_string());
        user.telegram_id = Some(String::new());
        assert_eq!(user.identity_channels(), vec!["yandex"]);

        user.yandex_id = None;
        assert!(!user.has_identity());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_value(stored_user()).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
    }
}
