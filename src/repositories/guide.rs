use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::UserRole;
use crate::entities::{booking, city, guide, guide_location, user};
use crate::error::{AppError, AppResult};

use super::not_blank;

/// A guide profile joined with the guide's display name and served cities.
#[derive(Debug, Clone, Serialize)]
pub struct GuideView {
    #[serde(flatten)]
    pub guide: guide::Model,
    pub name: String,
    pub city_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuideFilter {
    pub city_id: Option<i32>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuideProfileInput {
    #[validate(length(max = 4000), custom(function = "not_blank"))]
    pub bio: String,
    #[validate(length(min = 1, max = 12))]
    pub languages: Vec<String>,
    #[validate(range(min = 0))]
    pub rate_tourist: Option<i64>,
    #[validate(range(min = 0))]
    pub rate_local: Option<i64>,
    #[validate(length(min = 1))]
    pub city_ids: Vec<i32>,
}

#[derive(Clone)]
pub struct GuideRepository {
    db: Arc<DatabaseConnection>,
}

impl GuideRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &GuideFilter) -> AppResult<Vec<GuideView>> {
        let mut query = guide::Entity::find();

        if let Some(city_id) = filter.city_id {
            query = query
                .inner_join(guide_location::Entity)
                .filter(guide_location::Column::CityId.eq(city_id));
        }
        if let Some(language) = &filter.language {
            query = query.filter(Expr::cust_with_values(
                r#"? = ANY("guide"."languages")"#,
                [language.trim().to_lowercase()],
            ));
        }

        let guides = query
            .order_by_desc(guide::Column::Rating)
            .order_by_asc(guide::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        self.with_details(guides).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<GuideView> {
        let found = guide::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guide {id} not found")))?;

        self.single(found).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> AppResult<GuideView> {
        let found = guide::Entity::find()
            .filter(guide::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("No guide profile for this user".to_string()))?;

        self.single(found).await
    }

    /// Create or replace the guide profile of `user_id`, including the set
    /// of cities the guide serves.
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        input: GuideProfileInput,
    ) -> AppResult<GuideView> {
        input.validate()?;

        let languages: BTreeSet<String> = input
            .languages
            .iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        if languages.is_empty() {
            return Err(AppError::Validation("At least one language is required".to_string()));
        }
        let city_ids: BTreeSet<i32> = input.city_ids.iter().copied().collect();

        let txn = self.db.begin().await?;

        let owner = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
        if owner.role != UserRole::Guide {
            return Err(AppError::Forbidden("Only guides can have a guide profile".to_string()));
        }

        let known = city::Entity::find()
            .filter(city::Column::Id.is_in(city_ids.iter().copied()))
            .count(&txn)
            .await?;
        if known != city_ids.len() as u64 {
            return Err(AppError::Validation("Unknown city in guide locations".to_string()));
        }

        let existing = guide::Entity::find()
            .filter(guide::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let languages: Vec<String> = languages.into_iter().collect();
        let saved = match existing {
            Some(current) => {
                let mut active: guide::ActiveModel = current.into();
                active.bio = Set(input.bio.trim().to_string());
                active.languages = Set(languages);
                active.rate_tourist = Set(input.rate_tourist);
                active.rate_local = Set(input.rate_local);
                active.update(&txn).await?
            }
            None => {
                guide::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    bio: Set(input.bio.trim().to_string()),
                    languages: Set(languages),
                    rate_tourist: Set(input.rate_tourist),
                    rate_local: Set(input.rate_local),
                    rating: Set(None),
                    created_at: Set(Utc::now().fixed_offset()),
                }
                .insert(&txn)
                .await?
            }
        };

        guide_location::Entity::delete_many()
            .filter(guide_location::Column::GuideId.eq(saved.id))
            .exec(&txn)
            .await?;
        guide_location::Entity::insert_many(city_ids.iter().map(|&city_id| {
            guide_location::ActiveModel {
                guide_id: Set(saved.id),
                city_id: Set(city_id),
            }
        }))
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(guide_id = %saved.id, cities = city_ids.len(), "Guide profile saved");

        Ok(GuideView {
            guide: saved,
            name: owner.name,
            city_ids: city_ids.into_iter().collect(),
        })
    }

    /// Refused while the guide has bookings; locations go with the guide.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let bookings = booking::Entity::find()
            .filter(booking::Column::GuideId.eq(id))
            .count(&txn)
            .await?;
        if bookings > 0 {
            return Err(AppError::Conflict(format!(
                "Guide {id} still has {bookings} bookings"
            )));
        }

        let result = guide::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Guide {id} not found")));
        }

        txn.commit().await?;
        tracing::info!(guide_id = %id, "Guide deleted");
        Ok(())
    }

    pub async fn locations(&self, guide_id: Uuid) -> AppResult<Vec<i32>> {
        Ok(guide_location::Entity::find()
            .filter(guide_location::Column::GuideId.eq(guide_id))
            .order_by_asc(guide_location::Column::CityId)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|l| l.city_id)
            .collect())
    }

    async fn single(&self, found: guide::Model) -> AppResult<GuideView> {
        self.with_details(vec![found])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Guide vanished while loading".to_string()))
    }

    async fn with_details(&self, guides: Vec<guide::Model>) -> AppResult<Vec<GuideView>> {
        if guides.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = guides.iter().map(|g| g.user_id).collect();
        let guide_ids: Vec<Uuid> = guides.iter().map(|g| g.id).collect();

        let names: HashMap<Uuid, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let mut cities: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for location in guide_location::Entity::find()
            .filter(guide_location::Column::GuideId.is_in(guide_ids))
            .order_by_asc(guide_location::Column::CityId)
            .all(self.db.as_ref())
            .await?
        {
            cities.entry(location.guide_id).or_default().push(location.city_id);
        }

        Ok(guides
            .into_iter()
            .map(|g| GuideView {
                name: names.get(&g.user_id).cloned().unwrap_or_default(),
                city_ids: cities.remove(&g.id).unwrap_or_default(),
                guide: g,
            })
            .collect())
    }
}

/// Whether the guide is listed as serving the city.
pub(crate) async fn serves_city<C: ConnectionTrait>(
    db: &C,
    guide_id: Uuid,
    city_id: i32,
) -> AppResult<bool> {
    Ok(guide_location::Entity::find_by_id((guide_id, city_id))
        .one(db)
        .await?
        .is_some())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::repositories::fixtures;

    fn profile(city_ids: Vec<i32>) -> GuideProfileInput {
        GuideProfileInput {
            bio: "Born in Chebba, twenty years on the water".to_string(),
            languages: vec!["AR".to_string(), "fr".to_string(), "fr ".to_string()],
            rate_tourist: Some(30_000),
            rate_local: Some(20_000),
            city_ids,
        }
    }

    #[tokio::test]
    async fn test_list_attaches_names_and_cities() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let profile = fixtures::guide(hedi.id, Some(30), Some(20));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile.clone()]])
            .append_query_results([[hedi]])
            .append_query_results([[
                fixtures::location(profile.id, 3),
                fixtures::location(profile.id, 4),
            ]])
            .into_connection();
        let repo = GuideRepository::new(Arc::new(db));

        let guides = repo
            .list(&GuideFilter {
                city_id: Some(4),
                language: None,
            })
            .await
            .unwrap();

        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].name, "Hedi");
        assert_eq!(guides[0].city_ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_upsert_rejects_non_guide_user() {
        let tourist = fixtures::user(UserRole::Tourist, "Lena");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[tourist.clone()]])
            .into_connection();
        let repo = GuideRepository::new(Arc::new(db));

        let err = repo.upsert_profile(tourist.id, profile(vec![1])).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_upsert_rejects_unknown_city() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[hedi.clone()]])
            .append_query_results([[fixtures::count(1)]])
            .into_connection();
        let repo = GuideRepository::new(Arc::new(db));

        let err = repo.upsert_profile(hedi.id, profile(vec![1, 99])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_creates_profile_with_normalized_languages() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let mut stored = fixtures::guide(hedi.id, Some(30_000), Some(20_000));
        stored.languages = vec!["ar".to_string(), "fr".to_string()];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[hedi.clone()]])
            .append_query_results([[fixtures::count(1)]])
            .append_query_results([Vec::<guide::Model>::new()])
            .append_query_results([[stored.clone()]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let repo = GuideRepository::new(Arc::new(db));

        let view = repo.upsert_profile(hedi.id, profile(vec![4])).await.unwrap();
        assert_eq!(view.name, "Hedi");
        assert_eq!(view.city_ids, vec![4]);
        assert_eq!(view.guide.languages, vec!["ar".to_string(), "fr".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_guide_with_bookings_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::count(4)]])
            .into_connection();
        let repo = GuideRepository::new(Arc::new(db));

        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_profile_requires_a_city() {
        assert!(profile(Vec::new()).validate().is_err());
        assert!(profile(vec![1]).validate().is_ok());
    }
}
