use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::{booking, city, governorate, place};
use crate::error::{AppError, AppResult};
use crate::utils::geo::{is_valid_coordinate, sort_by_distance};
use crate::utils::slug::{is_valid_slug, slugify};

use super::{image_url, not_blank};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCity {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    /// Derived from `name` when absent.
    pub slug: Option<String>,
    pub governorate_id: Option<i32>,
    pub description: Option<String>,
    #[validate(custom(function = "image_url"))]
    pub hero_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CityChanges {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub governorate_id: Option<i32>,
    pub description: Option<String>,
    #[validate(custom(function = "image_url"))]
    pub hero_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone)]
pub struct CityRepository {
    db: Arc<DatabaseConnection>,
}

impl CityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self, governorate_id: Option<i32>) -> AppResult<Vec<city::Model>> {
        let mut query = city::Entity::find();
        if let Some(governorate_id) = governorate_id {
            query = query.filter(city::Column::GovernorateId.eq(governorate_id));
        }

        Ok(query
            .order_by_asc(city::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<city::Model> {
        city::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City {id} not found")))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<city::Model> {
        city::Entity::find()
            .filter(city::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City '{slug}' not found")))
    }

    /// Cities with coordinates, closest first.
    pub async fn nearest(&self, lat: f64, lng: f64, limit: usize) -> AppResult<Vec<(city::Model, f64)>> {
        if !is_valid_coordinate(lat, lng) {
            return Err(AppError::Validation(format!("Invalid coordinates ({lat}, {lng})")));
        }

        let cities = city::Entity::find()
            .filter(city::Column::Latitude.is_not_null())
            .filter(city::Column::Longitude.is_not_null())
            .all(self.db.as_ref())
            .await?;

        let mut sorted = sort_by_distance(cities, (lat, lng), city::Model::coordinates);
        sorted.truncate(limit);
        Ok(sorted)
    }

    pub async fn create(&self, input: NewCity) -> AppResult<city::Model> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        validate_coordinates(input.latitude, input.longitude)?;

        let txn = self.db.begin().await?;

        if let Some(governorate_id) = input.governorate_id {
            governorate::Entity::find_by_id(governorate_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Governorate {governorate_id} does not exist"))
                })?;
        }

        let created = city::ActiveModel {
            governorate_id: Set(input.governorate_id),
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description),
            hero_image: Set(input.hero_image),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(city_id = created.id, slug = %created.slug, "City created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, changes: CityChanges) -> AppResult<city::Model> {
        changes.validate()?;

        let txn = self.db.begin().await?;

        let existing = city::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City {id} not found")))?;

        validate_coordinates(
            changes.latitude.or(existing.latitude),
            changes.longitude.or(existing.longitude),
        )?;

        let mut active: city::ActiveModel = existing.into();

        if let Some(governorate_id) = changes.governorate_id {
            governorate::Entity::find_by_id(governorate_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Governorate {governorate_id} does not exist"))
                })?;
            active.governorate_id = Set(Some(governorate_id));
        }
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(slug) = changes.slug {
            if !is_valid_slug(&slug) {
                return Err(AppError::Validation(format!("Invalid slug '{slug}'")));
            }
            active.slug = Set(slug);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(hero_image) = changes.hero_image {
            active.hero_image = Set(Some(hero_image));
        }
        if let Some(latitude) = changes.latitude {
            active.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = changes.longitude {
            active.longitude = Set(Some(longitude));
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deleting a city that still has places or bookings is refused.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let existing = city::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City {id} not found")))?;

        let places = place::Entity::find()
            .filter(place::Column::CityId.eq(id))
            .count(&txn)
            .await?;
        if places > 0 {
            return Err(AppError::Conflict(format!(
                "City '{}' still has {places} places",
                existing.slug
            )));
        }

        let bookings = booking::Entity::find()
            .filter(booking::Column::CityId.eq(id))
            .count(&txn)
            .await?;
        if bookings > 0 {
            return Err(AppError::Conflict(format!(
                "City '{}' still has {bookings} bookings",
                existing.slug
            )));
        }

        city::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(city_id = id, slug = %existing.slug, "City deleted");
        Ok(())
    }
}

pub(crate) fn resolve_slug(explicit: Option<&str>, name: &str) -> AppResult<String> {
    let slug = match explicit {
        Some(slug) => slug.to_string(),
        None => slugify(name),
    };

    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(format!(
            "Cannot use '{slug}' as a slug for '{name}'"
        )));
    }
    Ok(slug)
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) if is_valid_coordinate(lat, lng) => Ok(()),
        (Some(lat), Some(lng)) => Err(AppError::Validation(format!(
            "Invalid coordinates ({lat}, {lng})"
        ))),
        _ => Err(AppError::Validation(
            "Latitude and longitude must be given together".to_string(),
        )),
    }
}
