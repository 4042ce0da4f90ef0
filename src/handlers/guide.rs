use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::error::AppResult;
use crate::repositories::guide::{GuideProfileInput, GuideView};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// The caller's guide profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<GuideView>> {
    Ok(Json(state.guides().get_by_user(claims.sub).await?))
}

/// Create or replace the caller's guide profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GuideProfileInput>,
) -> AppResult<Json<GuideView>> {
    Ok(Json(state.guides().upsert_profile(claims.sub, payload).await?))
}

/// Bookings made with the caller
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<booking::Model>>> {
    let profile = state.guides().get_by_user(claims.sub).await?;
    Ok(Json(state.bookings().list_for_guide(profile.guide.id).await?))
}

/// Confirm or cancel one of the caller's bookings
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<booking::Model>> {
    let profile = state.guides().get_by_user(claims.sub).await?;
    let updated = state
        .bookings()
        .set_status(id, payload.status, Some(profile.guide.id))
        .await?;
    Ok(Json(updated))
}
