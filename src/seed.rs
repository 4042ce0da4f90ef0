//! Idempotent reference data: the region/governorate/city hierarchy and the
//! Chebba directory.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::place::PlaceKind;
use crate::entities::{city, governorate, place, region};
use crate::error::{AppError, AppResult};
use crate::utils::slug::slugify;

const REGIONS: &[(&str, &str)] = &[
    ("North", "Tunis, the capital, and the northern coast"),
    ("Cap Bon", "Peninsula of beaches, vineyards and falconry"),
    ("Sahel", "Central coast of olive groves and fishing ports"),
    ("South", "Desert, oases and the island of Djerba"),
];

/// (governorate, region)
const GOVERNORATES: &[(&str, &str)] = &[
    ("Tunis", "North"),
    ("Nabeul", "Cap Bon"),
    ("Mahdia", "Sahel"),
    ("Sousse", "Sahel"),
    ("Medenine", "South"),
];

struct CitySeed {
    name: &'static str,
    governorate: &'static str,
    description: &'static str,
    latitude: f64,
    longitude: f64,
}

const CITIES: &[CitySeed] = &[
    CitySeed {
        name: "Tunis",
        governorate: "Tunis",
        description: "Capital city with a UNESCO-listed medina",
        latitude: 36.8065,
        longitude: 10.1815,
    },
    CitySeed {
        name: "Sidi Bou Said",
        governorate: "Tunis",
        description: "Blue and white clifftop village above the Gulf of Tunis",
        latitude: 36.8687,
        longitude: 10.3417,
    },
    CitySeed {
        name: "El Haouaria",
        governorate: "Nabeul",
        description: "Tip of Cap Bon, known for its Punic caves and falconry",
        latitude: 37.0500,
        longitude: 11.0100,
    },
    CitySeed {
        name: "Chebba",
        governorate: "Mahdia",
        description: "Fishing town with quiet beaches and the Ras Kaboudia headland",
        latitude: 35.2372,
        longitude: 11.1150,
    },
    CitySeed {
        name: "Sousse",
        governorate: "Sousse",
        description: "Pearl of the Sahel, with its ribat and medina",
        latitude: 35.8256,
        longitude: 10.6360,
    },
    CitySeed {
        name: "Djerba",
        governorate: "Medenine",
        description: "Island of Houmt Souk, Guellala pottery and the El Ghriba synagogue",
        latitude: 33.8076,
        longitude: 10.8451,
    },
];

const CHEBBA_PLACES: &[(PlaceKind, &str, &str, &str)] = &[
    (
        PlaceKind::Attraction,
        "Borj Khadija",
        "Byzantine fortress on the Ras Kaboudia headland",
        "historic",
    ),
    (
        PlaceKind::Attraction,
        "Chebba Beach",
        "Long sandy beach with shallow, calm water",
        "beach",
    ),
    (
        PlaceKind::Attraction,
        "Chebba Fishing Port",
        "Working harbour where the morning catch is landed",
        "culture",
    ),
    (
        PlaceKind::Restaurant,
        "Restaurant Le Pêcheur",
        "Grilled fish straight from the port",
        "seafood",
    ),
    (
        PlaceKind::Restaurant,
        "Café de la Plage",
        "Mint tea and bambalouni by the sea",
        "café",
    ),
    (
        PlaceKind::Activity,
        "Sunrise Fishing Trip",
        "Go out with local fishermen on a traditional boat",
        "easy",
    ),
    (
        PlaceKind::Activity,
        "Kaboudia Coastal Walk",
        "Cliff path from the port to the Ras Kaboudia lighthouse",
        "moderate",
    ),
];

#[derive(Debug, Default, Clone, Serialize)]
pub struct SeedReport {
    pub regions: usize,
    pub governorates: usize,
    pub cities: usize,
    pub places: usize,
}

/// Create or refresh the region/governorate/city hierarchy, keyed by slug.
pub async fn setup_database(db: &DatabaseConnection) -> AppResult<SeedReport> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();
    let now = Utc::now().fixed_offset();

    for (name, description) in REGIONS {
        let slug = slugify(name);
        let existing = region::Entity::find()
            .filter(region::Column::Slug.eq(&slug))
            .one(&txn)
            .await?;
        match existing {
            Some(found) => {
                let mut active: region::ActiveModel = found.into();
                active.description = Set(Some(description.to_string()));
                active.update(&txn).await?;
            }
            None => {
                region::ActiveModel {
                    name: Set(name.to_string()),
                    slug: Set(slug),
                    description: Set(Some(description.to_string())),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                report.regions += 1;
            }
        }
    }

    for (name, region_name) in GOVERNORATES {
        let region_id = region_id(&txn, region_name).await?;
        let slug = slugify(name);
        let existing = governorate::Entity::find()
            .filter(governorate::Column::Slug.eq(&slug))
            .one(&txn)
            .await?;
        match existing {
            Some(found) => {
                let mut active: governorate::ActiveModel = found.into();
                active.region_id = Set(region_id);
                active.update(&txn).await?;
            }
            None => {
                governorate::ActiveModel {
                    region_id: Set(region_id),
                    name: Set(name.to_string()),
                    slug: Set(slug),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                report.governorates += 1;
            }
        }
    }

    for seed in CITIES {
        let governorate_id = governorate_id(&txn, seed.governorate).await?;
        let slug = slugify(seed.name);
        let existing = city::Entity::find()
            .filter(city::Column::Slug.eq(&slug))
            .one(&txn)
            .await?;
        match existing {
            Some(found) => {
                let mut active: city::ActiveModel = found.into();
                active.governorate_id = Set(Some(governorate_id));
                active.latitude = Set(Some(seed.latitude));
                active.longitude = Set(Some(seed.longitude));
                active.update(&txn).await?;
            }
            None => {
                city::ActiveModel {
                    governorate_id: Set(Some(governorate_id)),
                    name: Set(seed.name.to_string()),
                    slug: Set(slug),
                    description: Set(Some(seed.description.to_string())),
                    hero_image: Set(None),
                    latitude: Set(Some(seed.latitude)),
                    longitude: Set(Some(seed.longitude)),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                report.cities += 1;
            }
        }
    }

    txn.commit().await?;
    tracing::info!(?report, "Reference data seeded");
    Ok(report)
}

/// Insert the Chebba attractions, restaurants and activities that are not
/// present yet. Requires `setup_database` to have run.
pub async fn insert_chebba_data(db: &DatabaseConnection) -> AppResult<SeedReport> {
    let txn = db.begin().await?;

    let chebba = city::Entity::find()
        .filter(city::Column::Slug.eq("chebba"))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("City 'chebba' not found, run setup-database first".to_string())
        })?;

    let mut report = SeedReport::default();
    let now = Utc::now().fixed_offset();

    for (kind, name, description, category) in CHEBBA_PLACES {
        let slug = slugify(name);
        let exists = place::Entity::find()
            .filter(place::Column::CityId.eq(chebba.id))
            .filter(place::Column::Kind.eq(*kind))
            .filter(place::Column::Slug.eq(&slug))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            continue;
        }

        place::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(*kind),
            city_id: Set(chebba.id),
            name: Set(name.to_string()),
            slug: Set(slug),
            description: Set(description.to_string()),
            category: Set(Some(category.to_string())),
            image: Set(None),
            gallery: Set(Vec::new()),
            maps_url: Set(Some(maps_link(name)?)),
            added_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        report.places += 1;
    }

    txn.commit().await?;
    tracing::info!(city_id = chebba.id, places = report.places, "Chebba data seeded");
    Ok(report)
}

async fn region_id<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<i32> {
    region::Entity::find()
        .filter(region::Column::Slug.eq(slugify(name)))
        .one(db)
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::Internal(format!("Seed region '{name}' missing")))
}

async fn governorate_id<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<i32> {
    governorate::Entity::find()
        .filter(governorate::Column::Slug.eq(slugify(name)))
        .one(db)
        .await?
        .map(|g| g.id)
        .ok_or_else(|| AppError::Internal(format!("Seed governorate '{name}' missing")))
}

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

fn maps_link(name: &str) -> AppResult<String> {
    let query = format!("{name} Chebba Tunisia");
    reqwest::Url::parse_with_params(MAPS_SEARCH_URL, [("api", "1"), ("query", query.as_str())])
        .map(String::from)
        .map_err(|e| AppError::Internal(format!("Invalid maps link for {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::repositories::fixtures;

    #[test]
    fn test_seed_slugs_are_unique_and_valid() {
        let slugs: Vec<String> = CITIES.iter().map(|c| slugify(c.name)).collect();
        let unique: HashSet<&String> = slugs.iter().collect();
        assert_eq!(unique.len(), CITIES.len());
        assert!(slugs.iter().all(|s| crate::utils::slug::is_valid_slug(s)));
        assert!(slugs.contains(&"sidi-bou-said".to_string()));
        assert!(slugs.contains(&"el-haouaria".to_string()));
    }

    #[test]
    fn test_every_governorate_has_a_seeded_region() {
        let regions: HashSet<&str> = REGIONS.iter().map(|(name, _)| *name).collect();
        assert!(GOVERNORATES.iter().all(|(_, region)| regions.contains(region)));

        let governorates: HashSet<&str> = GOVERNORATES.iter().map(|(name, _)| *name).collect();
        assert!(CITIES.iter().all(|c| governorates.contains(c.governorate)));
    }

    #[test]
    fn test_chebba_places_cover_every_kind() {
        for kind in [PlaceKind::Attraction, PlaceKind::Restaurant, PlaceKind::Activity] {
            assert!(CHEBBA_PLACES.iter().any(|(k, ..)| *k == kind));
        }
    }

    #[test]
    fn test_maps_link() {
        assert_eq!(
            maps_link("Borj Khadija").unwrap(),
            "https://www.google.com/maps/search/?api=1&query=Borj+Khadija+Chebba+Tunisia"
        );
    }

    #[test]
    fn test_maps_link_encodes_accents() {
        assert_eq!(
            maps_link("Café du Pêcheur").unwrap(),
            "https://www.google.com/maps/search/?api=1&query=Caf%C3%A9+du+P%C3%AAcheur+Chebba+Tunisia"
        );
    }

    #[tokio::test]
    async fn test_chebba_seed_requires_city() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<city::Model>::new()])
            .into_connection();

        let err = insert_chebba_data(&db).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_chebba_seed_skips_existing_places() {
        let chebba = fixtures::city(4, "Chebba", "chebba");
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[chebba]]);
        for (kind, name, ..) in CHEBBA_PLACES {
            mock = mock.append_query_results([[fixtures::place(*kind, 4, name)]]);
        }
        let db = mock.into_connection();

        let report = insert_chebba_data(&db).await.unwrap();
        assert_eq!(report.places, 0);
    }
}
