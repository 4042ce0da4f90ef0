use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::user::UserRole;
use crate::entities::{city, governorate, place, region};
use crate::error::AppResult;
use crate::handlers::auth::UserInfo;
use crate::repositories::booking::BookingChanges;
use crate::repositories::city::{CityChanges, NewCity};
use crate::repositories::place::{NewPlace, PlaceChanges};
use crate::repositories::region::{GovernorateChanges, NewGovernorate, NewRegion, RegionChanges};
use crate::seed::{self, SeedReport};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Seeds ============

/// Create or refresh regions, governorates and cities
pub async fn setup_database(State(state): State<AppState>) -> AppResult<Json<SeedReport>> {
    Ok(Json(seed::setup_database(&state.db).await?))
}

/// Insert the Chebba places that are missing
pub async fn insert_chebba_data(State(state): State<AppState>) -> AppResult<Json<SeedReport>> {
    Ok(Json(seed::insert_chebba_data(&state.db).await?))
}

// ============ Regions & Governorates ============

pub async fn create_region(
    State(state): State<AppState>,
    Json(payload): Json<NewRegion>,
) -> AppResult<(StatusCode, Json<region::Model>)> {
    Ok((StatusCode::CREATED, Json(state.regions().create(payload).await?)))
}

pub async fn update_region(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RegionChanges>,
) -> AppResult<Json<region::Model>> {
    Ok(Json(state.regions().update(id, payload).await?))
}

pub async fn delete_region(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    state.regions().delete(id).await?;
    Ok(Json(json!({ "message": "Region deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct GovernorateQuery {
    pub region_id: Option<i32>,
}

pub async fn list_governorates(
    State(state): State<AppState>,
    Query(query): Query<GovernorateQuery>,
) -> AppResult<Json<Vec<governorate::Model>>> {
    Ok(Json(state.regions().governorates(query.region_id).await?))
}

pub async fn create_governorate(
    State(state): State<AppState>,
    Json(payload): Json<NewGovernorate>,
) -> AppResult<(StatusCode, Json<governorate::Model>)> {
    Ok((
        StatusCode::CREATED,
        Json(state.regions().create_governorate(payload).await?),
    ))
}

pub async fn update_governorate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<GovernorateChanges>,
) -> AppResult<Json<governorate::Model>> {
    Ok(Json(state.regions().update_governorate(id, payload).await?))
}

pub async fn delete_governorate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    state.regions().delete_governorate(id).await?;
    Ok(Json(json!({ "message": "Governorate deleted" })))
}

// ============ Cities ============

pub async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<city::Model>> {
    Ok(Json(state.cities().get(id).await?))
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(payload): Json<NewCity>,
) -> AppResult<(StatusCode, Json<city::Model>)> {
    Ok((StatusCode::CREATED, Json(state.cities().create(payload).await?)))
}

pub async fn update_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CityChanges>,
) -> AppResult<Json<city::Model>> {
    Ok(Json(state.cities().update(id, payload).await?))
}

/// Refused while the city still has places or bookings
pub async fn delete_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    state.cities().delete(id).await?;
    Ok(Json(json!({ "message": "City deleted" })))
}

// ============ Places ============

pub async fn create_place(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut payload): Json<NewPlace>,
) -> AppResult<(StatusCode, Json<place::Model>)> {
    payload.added_by = Some(claims.sub);
    Ok((StatusCode::CREATED, Json(state.places().create(payload).await?)))
}

pub async fn update_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceChanges>,
) -> AppResult<Json<place::Model>> {
    Ok(Json(state.places().update(id, payload).await?))
}

pub async fn delete_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.places().delete(id).await?;
    Ok(Json(json!({ "message": "Place deleted" })))
}

// ============ Guides ============

/// Refused while the guide has bookings
pub async fn delete_guide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.guides().delete(id).await?;
    Ok(Json(json!({ "message": "Guide deleted" })))
}

// ============ Users ============

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
}

/// List all users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.users().list(query.role).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse {
                created_at: u.created_at.with_timezone(&Utc),
                user: u.into(),
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Update user role (admin)
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let updated = state.users().update_role(user_id, payload.role).await?;

    Ok(Json(UserResponse {
        created_at: updated.created_at.with_timezone(&Utc),
        user: updated.into(),
    }))
}

/// Delete a user account that no booking refers to (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.users().delete(id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

// ============ Bookings Management (Admin) ============

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub struct BookingInfo {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub tourist_name: String,
    pub tourist_email: String,
}

/// List all bookings (admin)
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingInfo>>> {
    let bookings = state.bookings().list_all(query.status).await?;
    let tourist_ids: Vec<Uuid> = bookings
        .iter()
        .map(|b| b.tourist_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let tourists = state.users().find_many(&tourist_ids).await?;

    let responses = bookings
        .into_iter()
        .map(|b| {
            let tourist = tourists.get(&b.tourist_id);
            BookingInfo {
                tourist_name: tourist.map(|u| u.name.clone()).unwrap_or_default(),
                tourist_email: tourist.map(|u| u.email.clone()).unwrap_or_default(),
                booking: b,
            }
        })
        .collect();

    Ok(Json(responses))
}

/// Update booking (admin): date, hours and/or status. Prices follow the hours.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub date: Option<NaiveDate>,
    pub hours: Option<i32>,
    pub status: Option<BookingStatus>,
}

pub async fn update_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> AppResult<Json<booking::Model>> {
    let changes = BookingChanges {
        date: payload.date,
        hours: payload.hours,
    };
    let updated = state
        .bookings()
        .update(booking_id, changes, payload.status)
        .await?;

    Ok(Json(updated))
}

/// Delete any booking (admin)
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.bookings().delete(booking_id).await?;
    Ok(Json(json!({ "message": "Booking deleted" })))
}
