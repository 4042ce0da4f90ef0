use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::booking;
use crate::error::AppResult;
use crate::repositories::booking::{NewBooking, QuoteRequest};
use crate::utils::jwt::Claims;
use crate::utils::pricing::{PriceBreakdown, Segment};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub guide_id: Uuid,
    pub hours: i32,
    pub segment: Segment,
    #[serde(flatten)]
    pub price: PriceBreakdown,
}

/// Price a booking without creating it
pub async fn quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<QuoteResponse>> {
    let user = state.users().find_by_id(claims.sub).await?;
    let price = state.bookings().quote(&user.role, &payload).await?;

    Ok(Json(QuoteResponse {
        guide_id: payload.guide_id,
        hours: payload.hours,
        segment: Segment::for_role(&user.role),
        price,
    }))
}

/// Book a guide. The caller's stored role decides which rate applies.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<booking::Model>)> {
    let tourist = state.users().find_by_id(claims.sub).await?;
    let created = state.bookings().create(&tourist, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<booking::Model>>> {
    Ok(Json(state.bookings().list_for_tourist(claims.sub).await?))
}

/// Cancel one of the caller's bookings
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    Ok(Json(state.bookings().cancel_by_tourist(id, claims.sub).await?))
}
