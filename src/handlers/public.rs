use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entities::place::PlaceKind;
use crate::entities::{city, governorate, place, region};
use crate::error::{AppError, AppResult};
use crate::repositories::guide::{GuideFilter, GuideView};
use crate::repositories::place::PlaceFilter;
use crate::repositories::search::SearchHit;
use crate::utils::geo::is_valid_coordinate;
use crate::AppState;

/// Liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state
        .db
        .ping()
        .await
        .map_err(|e| AppError::Upstream(format!("Database unavailable: {e}")))?;

    Ok(Json(json!({ "status": "ok" })))
}

// ============ Regions ============

#[derive(Debug, Serialize)]
pub struct RegionDetail {
    #[serde(flatten)]
    pub region: region::Model,
    pub governorates: Vec<governorate::Model>,
}

pub async fn list_regions(State(state): State<AppState>) -> AppResult<Json<Vec<region::Model>>> {
    Ok(Json(state.regions().list().await?))
}

pub async fn get_region(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<RegionDetail>> {
    let (region, governorates) = state.regions().get_by_slug(&slug).await?;
    Ok(Json(RegionDetail {
        region,
        governorates,
    }))
}

// ============ Cities ============

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub governorate: Option<i32>,
    pub near_lat: Option<f64>,
    pub near_lng: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CityResponse {
    #[serde(flatten)]
    pub city: city::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// List cities, or the closest ones when `near_lat`/`near_lng` are given
pub async fn list_cities(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> AppResult<Json<Vec<CityResponse>>> {
    match (query.near_lat, query.near_lng) {
        (Some(lat), Some(lng)) => {
            if !is_valid_coordinate(lat, lng) {
                return Err(AppError::Validation(format!("Invalid coordinates {lat},{lng}")));
            }
            let nearest = state
                .cities()
                .nearest(lat, lng, query.limit.unwrap_or(5).clamp(1, 50))
                .await?;

            Ok(Json(
                nearest
                    .into_iter()
                    .map(|(city, distance)| CityResponse {
                        city,
                        distance_km: Some(distance),
                    })
                    .collect(),
            ))
        }
        (None, None) => {
            let cities = state.cities().list(query.governorate).await?;
            Ok(Json(
                cities
                    .into_iter()
                    .map(|city| CityResponse {
                        city,
                        distance_km: None,
                    })
                    .collect(),
            ))
        }
        _ => Err(AppError::BadRequest(
            "near_lat and near_lng must be given together".to_string(),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct CityPage {
    pub city: city::Model,
    pub attractions: Vec<place::Model>,
    pub restaurants: Vec<place::Model>,
    pub activities: Vec<place::Model>,
    pub guides: Vec<GuideView>,
}

/// Everything shown on a city's page
pub async fn city_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CityPage>> {
    let city = state.cities().get_by_slug(&slug).await?;

    let places = state
        .places()
        .list(&PlaceFilter {
            city_id: Some(city.id),
            limit: Some(crate::repositories::MAX_PAGE_SIZE),
            ..Default::default()
        })
        .await?;
    let guides = state
        .guides()
        .list(&GuideFilter {
            city_id: Some(city.id),
            language: None,
        })
        .await?;

    let (mut attractions, mut restaurants, mut activities) = (Vec::new(), Vec::new(), Vec::new());
    for place in places {
        match place.kind {
            PlaceKind::Attraction => attractions.push(place),
            PlaceKind::Restaurant => restaurants.push(place),
            PlaceKind::Activity => activities.push(place),
        }
    }

    Ok(Json(CityPage {
        city,
        attractions,
        restaurants,
        activities,
        guides,
    }))
}

// ============ Places ============

#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub kind: Option<PlaceKind>,
    /// City slug
    pub city: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceQuery>,
) -> AppResult<Json<Vec<place::Model>>> {
    let city_id = match query.city.as_deref() {
        Some(slug) => Some(state.cities().get_by_slug(slug).await?.id),
        None => None,
    };

    let places = state
        .places()
        .list(&PlaceFilter {
            kind: query.kind,
            city_id,
            category: query.category,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    Ok(Json(places))
}

pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<place::Model>> {
    Ok(Json(state.places().get(id).await?))
}

// ============ Guides ============

#[derive(Debug, Deserialize)]
pub struct GuideQuery {
    /// City slug
    pub city: Option<String>,
    pub language: Option<String>,
}

pub async fn list_guides(
    State(state): State<AppState>,
    Query(query): Query<GuideQuery>,
) -> AppResult<Json<Vec<GuideView>>> {
    let city_id = match query.city.as_deref() {
        Some(slug) => Some(state.cities().get_by_slug(slug).await?.id),
        None => None,
    };

    let guides = state
        .guides()
        .list(&GuideFilter {
            city_id,
            language: query.language,
        })
        .await?;

    Ok(Json(guides))
}

pub async fn get_guide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GuideView>> {
    Ok(Json(state.guides().get(id).await?))
}

// ============ Search ============

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub next_offset: Option<u64>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let results = state
        .search()
        .search(&query.q, query.limit, query.offset)
        .await?;

    let next_offset = results.next_offset();
    Ok(Json(SearchResponse {
        query: query.q.trim().to_string(),
        results: results.into_iter().collect(),
        next_offset,
    }))
}
