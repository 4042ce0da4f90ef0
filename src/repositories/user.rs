use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::entities::{booking, guide};
use crate::error::{AppError, AppResult};

/// A user row ready to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(self.db.as_ref())
            .await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
    }

    /// Users with the given ids, keyed by id. Unknown ids are skipped.
    pub async fn find_many(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, user::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    /// Emails are stored lowercased; a duplicate is a `Conflict`.
    pub async fn create(&self, input: NewUser) -> AppResult<user::Model> {
        let email = normalize_email(&input.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(input.password_hash),
            name: Set(input.name.trim().to_string()),
            role: Set(input.role),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db.as_ref())
        .await?;

        tracing::info!(user_id = %created.id, role = ?created.role, "User created");
        Ok(created)
    }

    pub async fn list(&self, role: Option<UserRole>) -> AppResult<Vec<user::Model>> {
        let mut query = user::Entity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }

        Ok(query
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }

    /// Moving a user away from `guide` removes their guide profile, which is
    /// refused while that profile still has bookings.
    pub async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<user::Model> {
        let txn = self.db.begin().await?;

        let existing = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

        if existing.role == UserRole::Guide && role != UserRole::Guide {
            if let Some(profile) = guide::Entity::find()
                .filter(guide::Column::UserId.eq(id))
                .one(&txn)
                .await?
            {
                let bookings = booking::Entity::find()
                    .filter(booking::Column::GuideId.eq(profile.id))
                    .count(&txn)
                    .await?;
                if bookings > 0 {
                    return Err(AppError::Conflict(format!(
                        "Guide profile of user {id} still has {bookings} bookings"
                    )));
                }
                guide::Entity::delete_by_id(profile.id).exec(&txn).await?;
            }
        }

        let mut active: user::ActiveModel = existing.into();
        active.role = Set(role);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(user_id = %id, role = ?updated.role, "User role changed");
        Ok(updated)
    }

    /// Users referenced by bookings, as tourist or through their guide
    /// profile, cannot be deleted.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let as_tourist = booking::Entity::find()
            .filter(booking::Column::TouristId.eq(id))
            .count(&txn)
            .await?;

        let as_guide = match guide::Entity::find()
            .filter(guide::Column::UserId.eq(id))
            .one(&txn)
            .await?
        {
            Some(profile) => {
                booking::Entity::find()
                    .filter(booking::Column::GuideId.eq(profile.id))
                    .count(&txn)
                    .await?
            }
            None => 0,
        };

        if as_tourist + as_guide > 0 {
            return Err(AppError::Conflict(format!(
                "User {id} is referenced by {} bookings",
                as_tourist + as_guide
            )));
        }

        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("User {id} not found")));
        }

        txn.commit().await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::repositories::fixtures;

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let existing = fixtures::user(UserRole::Tourist, "Amira");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        let err = repo
            .create(NewUser {
                email: " Amira@Example.tn ".to_string(),
                password_hash: "hash".to_string(),
                name: "Amira".to_string(),
                role: UserRole::Tourist,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_many_filters_by_id_set() {
        let lena = fixtures::user(UserRole::Tourist, "Lena");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[lena.clone()]])
                .into_connection(),
        );
        let repo = UserRepository::new(db.clone());

        let found = repo.find_many(&[lena.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&lena.id].name, "Lena");

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains(r#""user"."id" IN ($1, $2)"#));
    }

    #[tokio::test]
    async fn test_find_many_without_ids_skips_the_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = UserRepository::new(Arc::new(db));

        assert!(repo.find_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_user_with_bookings_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::count(2)]])
            .append_query_results([Vec::<guide::Model>::new()])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("2 bookings")));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::count(0)]])
            .append_query_results([Vec::<guide::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        repo.delete(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_demoting_guide_with_bookings_is_conflict() {
        let user = fixtures::user(UserRole::Guide, "Hedi");
        let profile = fixtures::guide(user.id, Some(30), Some(20));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[profile]])
            .append_query_results([[fixtures::count(1)]])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        let err = repo.update_role(user.id, UserRole::Local).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
