//! Typed data access, one repository per entity.

pub mod booking;
pub mod city;
pub mod console;
pub mod guide;
pub mod place;
pub mod region;
pub mod search;
pub mod user;

use validator::ValidationError;

pub use booking::BookingRepository;
pub use city::CityRepository;
pub use console::ConsoleRepository;
pub use guide::GuideRepository;
pub use place::PlaceRepository;
pub use region::RegionRepository;
pub use search::SearchRepository;
pub use user::UserRepository;

pub const DEFAULT_PAGE_SIZE: u64 = 100;
pub const MAX_PAGE_SIZE: u64 = 500;

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// An absolute http(s) URL, or a root-relative path such as the
/// `/files/places/<key>` URLs handed out by local storage.
pub(crate) fn image_url(value: &str) -> Result<(), ValidationError> {
    let valid = if value.starts_with('/') {
        !value.starts_with("//")
            && !value.chars().any(char::is_whitespace)
            && !value.split('/').any(|segment| segment == "..")
    } else {
        reqwest::Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("image_url"))
    }
}

pub(crate) fn image_urls(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|value| image_url(value))
}

pub(crate) fn page_size(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_accepts_absolute_and_local_paths() {
        assert!(image_url("https://cdn.example.tn/places/fort.jpg").is_ok());
        assert!(image_url("/files/places/0b6f-fort.jpg").is_ok());

        assert!(image_url("ftp://example.tn/fort.jpg").is_err());
        assert!(image_url("//evil.example/fort.jpg").is_err());
        assert!(image_url("/files/../etc/passwd").is_err());
        assert!(image_url("fort.jpg").is_err());
    }

    #[test]
    fn test_image_urls_checks_every_entry() {
        let gallery = vec!["/files/a.png".to_string(), "not a url".to_string()];
        assert!(image_urls(&gallery).is_err());
        assert!(image_urls(&gallery[..1]).is_ok());
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};
    use sea_orm::prelude::DateTimeWithTimeZone;
    use sea_orm::DatabaseConnection;
    use uuid::Uuid;

    use crate::entities::booking::BookingStatus;
    use crate::entities::place::PlaceKind;
    use crate::entities::user::UserRole;
    use crate::entities::{booking, city, guide, guide_location, place, user};

    pub fn now() -> DateTimeWithTimeZone {
        Utc::now().fixed_offset()
    }

    pub fn city(id: i32, name: &str, slug: &str) -> city::Model {
        city::Model {
            id,
            governorate_id: None,
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            hero_image: None,
            latitude: None,
            longitude: None,
            created_at: now(),
        }
    }

    pub fn place(kind: PlaceKind, city_id: i32, name: &str) -> place::Model {
        place::Model {
            id: Uuid::new_v4(),
            kind,
            city_id,
            name: name.to_string(),
            slug: crate::utils::slug::slugify(name),
            description: format!("{name} description"),
            category: None,
            image: None,
            gallery: Vec::new(),
            maps_url: None,
            added_by: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    pub fn user(role: UserRole, name: &str) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: format!("{}@example.tn", name.to_lowercase()),
            password_hash: "hash".to_string(),
            name: name.to_string(),
            role,
            created_at: now(),
        }
    }

    pub fn guide(user_id: Uuid, rate_tourist: Option<i64>, rate_local: Option<i64>) -> guide::Model {
        guide::Model {
            id: Uuid::new_v4(),
            user_id,
            bio: "Licensed guide".to_string(),
            languages: vec!["ar".to_string(), "fr".to_string()],
            rate_tourist,
            rate_local,
            rating: None,
            created_at: now(),
        }
    }

    pub fn location(guide_id: Uuid, city_id: i32) -> guide_location::Model {
        guide_location::Model { guide_id, city_id }
    }

    pub fn booking(guide_id: Uuid, tourist_id: Uuid, city_id: i32, date: NaiveDate) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            guide_id,
            tourist_id,
            city_id,
            date,
            hours: 3,
            total_price: 90,
            commission: 18,
            net_amount: 72,
            attraction_id: None,
            restaurant_id: None,
            activity_id: None,
            status: BookingStatus::Pending,
            created_at: now(),
        }
    }

    pub fn count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    /// Statements a mock connection saw, as one searchable string. Every
    /// repository holding the connection must be dropped first.
    pub fn transaction_log(db: Arc<DatabaseConnection>) -> String {
        let log = Arc::try_unwrap(db)
            .ok()
            .expect("mock connection is still shared")
            .into_transaction_log();
        format!("{log:?}").replace("\\\"", "\"")
    }
}
