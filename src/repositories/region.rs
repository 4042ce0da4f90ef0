use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::{governorate, region};
use crate::error::{AppError, AppResult};

use super::city::resolve_slug;
use super::not_blank;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRegion {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegionChanges {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGovernorate {
    pub region_id: i32,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GovernorateChanges {
    pub region_id: Option<i32>,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
}

/// Regions and the governorates they contain.
#[derive(Clone)]
pub struct RegionRepository {
    db: Arc<DatabaseConnection>,
}

impl RegionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<region::Model>> {
        Ok(region::Entity::find()
            .order_by_asc(region::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
    ) -> AppResult<(region::Model, Vec<governorate::Model>)> {
        let region = region::Entity::find()
            .filter(region::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Region '{slug}' not found")))?;

        let governorates = self.governorates(Some(region.id)).await?;
        Ok((region, governorates))
    }

    pub async fn create(&self, input: NewRegion) -> AppResult<region::Model> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

        Ok(region::ActiveModel {
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?)
    }

    pub async fn update(&self, id: i32, changes: RegionChanges) -> AppResult<region::Model> {
        changes.validate()?;

        let existing = region::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Region {id} not found")))?;

        let mut active: region::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// A region can only be deleted once it has no governorates.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let governorates = governorate::Entity::find()
            .filter(governorate::Column::RegionId.eq(id))
            .count(&txn)
            .await?;
        if governorates > 0 {
            return Err(AppError::Conflict(format!(
                "Region {id} still has {governorates} governorates"
            )));
        }

        let result = region::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Region {id} not found")));
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn governorates(&self, region_id: Option<i32>) -> AppResult<Vec<governorate::Model>> {
        let mut query = governorate::Entity::find();
        if let Some(region_id) = region_id {
            query = query.filter(governorate::Column::RegionId.eq(region_id));
        }

        Ok(query
            .order_by_asc(governorate::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn create_governorate(&self, input: NewGovernorate) -> AppResult<governorate::Model> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

        let txn = self.db.begin().await?;
        ensure_region(&txn, input.region_id).await?;

        let created = governorate::ActiveModel {
            region_id: Set(input.region_id),
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(created)
    }

    pub async fn update_governorate(
        &self,
        id: i32,
        changes: GovernorateChanges,
    ) -> AppResult<governorate::Model> {
        changes.validate()?;

        let txn = self.db.begin().await?;
        let existing = governorate::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Governorate {id} not found")))?;

        let mut active: governorate::ActiveModel = existing.into();
        if let Some(region_id) = changes.region_id {
            ensure_region(&txn, region_id).await?;
            active.region_id = Set(region_id);
        }
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Cities of a deleted governorate keep existing without one.
    pub async fn delete_governorate(&self, id: i32) -> AppResult<()> {
        let result = governorate::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Governorate {id} not found")));
        }
        Ok(())
    }
}

async fn ensure_region<C: sea_orm::ConnectionTrait>(db: &C, region_id: i32) -> AppResult<()> {
    region::Entity::find_by_id(region_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Region {region_id} does not exist")))?;
    Ok(())
}
