//! Attractions, restaurants and activities, all stored in one `place` table
//! keyed by `city_id`.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::entities::place::PlaceKind;
use crate::entities::{city, place};
use crate::error::{AppError, AppResult};

use super::city::resolve_slug;
use super::{image_url, image_urls, not_blank, page_size};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceFilter {
    pub kind: Option<PlaceKind>,
    pub city_id: Option<i32>,
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlace {
    pub kind: PlaceKind,
    pub city_id: i32,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,
    pub slug: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(custom(function = "image_url"))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "image_urls"))]
    pub gallery: Vec<String>,
    #[validate(url)]
    pub maps_url: Option<String>,
    #[serde(skip)]
    pub added_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlaceChanges {
    pub city_id: Option<i32>,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(custom(function = "image_url"))]
    pub image: Option<String>,
    #[validate(custom(function = "image_urls"))]
    pub gallery: Option<Vec<String>>,
    #[validate(url)]
    pub maps_url: Option<String>,
}

#[derive(Clone)]
pub struct PlaceRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Places matching `filter`, ordered by name.
    pub async fn list(&self, filter: &PlaceFilter) -> AppResult<Vec<place::Model>> {
        let mut query = place::Entity::find();

        if let Some(kind) = filter.kind {
            query = query.filter(place::Column::Kind.eq(kind));
        }
        if let Some(city_id) = filter.city_id {
            query = query.filter(place::Column::CityId.eq(city_id));
        }
        if let Some(category) = &filter.category {
            query = query.filter(place::Column::Category.eq(category.as_str()));
        }

        Ok(query
            .order_by_asc(place::Column::Name)
            .order_by_asc(place::Column::Id)
            .limit(page_size(filter.limit))
            .offset(filter.offset.unwrap_or(0))
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<place::Model> {
        place::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place {id} not found")))
    }

    /// Insert a place; the city must exist.
    pub async fn create(&self, input: NewPlace) -> AppResult<place::Model> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

        let txn = self.db.begin().await?;
        ensure_city(&txn, input.city_id).await?;

        let now = Utc::now().fixed_offset();
        let created = place::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind),
            city_id: Set(input.city_id),
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description.trim().to_string()),
            category: Set(input.category),
            image: Set(input.image),
            gallery: Set(input.gallery),
            maps_url: Set(input.maps_url),
            added_by: Set(input.added_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(
            place_id = %created.id,
            kind = created.kind.as_str(),
            city_id = created.city_id,
            "Place created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, changes: PlaceChanges) -> AppResult<place::Model> {
        changes.validate()?;

        let txn = self.db.begin().await?;
        let existing = place::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place {id} not found")))?;

        let mut active: place::ActiveModel = existing.into();

        if let Some(city_id) = changes.city_id {
            ensure_city(&txn, city_id).await?;
            active.city_id = Set(city_id);
        }
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = changes.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(category) = changes.category {
            active.category = Set(Some(category));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(gallery) = changes.gallery {
            active.gallery = Set(gallery);
        }
        if let Some(maps_url) = changes.maps_url {
            active.maps_url = Set(Some(maps_url));
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Booking links to the place are cleared by the database.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = place::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Place {id} not found")));
        }
        tracing::info!(place_id = %id, "Place deleted");
        Ok(())
    }

    /// Record an uploaded image as the cover or append it to the gallery.
    pub async fn attach_image(&self, id: Uuid, url: String, as_cover: bool) -> AppResult<place::Model> {
        let existing = self.get(id).await?;
        let mut gallery = existing.gallery.clone();
        let mut active: place::ActiveModel = existing.into();

        if as_cover {
            active.image = Set(Some(url));
        } else {
            gallery.push(url);
            active.gallery = Set(gallery);
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        Ok(active.update(self.db.as_ref()).await?)
    }
}

async fn ensure_city<C: ConnectionTrait>(db: &C, city_id: i32) -> AppResult<()> {
    city::Entity::find_by_id(city_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("City {city_id} does not exist")))?;
    Ok(())
}
