//! Guide bookings. The price fields are derived through
//! [`crate::utils::pricing::quote`] and are never accepted from callers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::place::{self, PlaceKind};
use crate::entities::user::{self, UserRole};
use crate::entities::{city, guide};
use crate::error::{AppError, AppResult};
use crate::utils::pricing::{self, PriceBreakdown, Segment};

use super::guide::serves_city;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub guide_id: Uuid,
    pub city_id: i32,
    pub date: NaiveDate,
    pub hours: i32,
    pub attraction_id: Option<Uuid>,
    pub restaurant_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub guide_id: Uuid,
    pub hours: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingChanges {
    pub date: Option<NaiveDate>,
    pub hours: Option<i32>,
}

#[derive(Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
}

impl BookingRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Price `hours` with `guide_id` for a caller with `role`, without booking.
    pub async fn quote(
        &self,
        role: &UserRole,
        request: &QuoteRequest,
    ) -> AppResult<PriceBreakdown> {
        let guide = find_guide(self.db.as_ref(), request.guide_id).await?;
        Ok(pricing::quote(
            guide.rate_tourist,
            guide.rate_local,
            Segment::for_role(role),
            request.hours,
        )?)
    }

    pub async fn create(&self, tourist: &user::Model, input: NewBooking) -> AppResult<booking::Model> {
        if !tourist.role.is_visitor() {
            return Err(AppError::Forbidden(
                "Only tourists and locals can book a guide".to_string(),
            ));
        }
        if input.date < Utc::now().date_naive() {
            return Err(AppError::Validation("Booking date is in the past".to_string()));
        }

        let txn = self.db.begin().await?;

        let guide = find_guide(&txn, input.guide_id).await?;
        if guide.user_id == tourist.id {
            return Err(AppError::Validation("Guides cannot book themselves".to_string()));
        }

        city::Entity::find_by_id(input.city_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Validation(format!("City {} does not exist", input.city_id)))?;

        if !serves_city(&txn, guide.id, input.city_id).await? {
            return Err(AppError::Validation(format!(
                "Guide {} does not serve city {}",
                guide.id, input.city_id
            )));
        }

        for (id, kind) in [
            (input.attraction_id, PlaceKind::Attraction),
            (input.restaurant_id, PlaceKind::Restaurant),
            (input.activity_id, PlaceKind::Activity),
        ] {
            if let Some(id) = id {
                ensure_place(&txn, id, kind, input.city_id).await?;
            }
        }

        let price = pricing::quote(
            guide.rate_tourist,
            guide.rate_local,
            Segment::for_role(&tourist.role),
            input.hours,
        )?;

        let created = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            guide_id: Set(guide.id),
            tourist_id: Set(tourist.id),
            city_id: Set(input.city_id),
            date: Set(input.date),
            hours: Set(input.hours),
            total_price: Set(price.total_price),
            commission: Set(price.commission),
            net_amount: Set(price.net_amount),
            attraction_id: Set(input.attraction_id),
            restaurant_id: Set(input.restaurant_id),
            activity_id: Set(input.activity_id),
            status: Set(BookingStatus::Pending),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(
            booking_id = %created.id,
            guide_id = %created.guide_id,
            total_price = created.total_price,
            "Booking created"
        );
        Ok(created)
    }

    pub async fn list_for_tourist(&self, tourist_id: Uuid) -> AppResult<Vec<booking::Model>> {
        Ok(booking::Entity::find()
            .filter(booking::Column::TouristId.eq(tourist_id))
            .order_by_desc(booking::Column::Date)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn list_for_guide(&self, guide_id: Uuid) -> AppResult<Vec<booking::Model>> {
        Ok(booking::Entity::find()
            .filter(booking::Column::GuideId.eq(guide_id))
            .order_by_asc(booking::Column::Date)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn list_all(&self, status: Option<BookingStatus>) -> AppResult<Vec<booking::Model>> {
        let mut query = booking::Entity::find();
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<booking::Model> {
        booking::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))
    }

    /// Change date, hours and status together. Nothing is written unless every
    /// change is allowed; the price is recomputed from the guide's current rates.
    pub async fn update(
        &self,
        id: Uuid,
        changes: BookingChanges,
        status: Option<BookingStatus>,
    ) -> AppResult<booking::Model> {
        if changes.date.is_some_and(|date| date < Utc::now().date_naive()) {
            return Err(AppError::Validation("Booking date is in the past".to_string()));
        }

        let txn = self.db.begin().await?;
        let existing = find_for_update(&txn, id).await?;

        if let Some(status) = &status {
            ensure_transition(&existing, status)?;
        }

        let rescheduling = changes.date.is_some() || changes.hours.is_some();
        if rescheduling && existing.status == BookingStatus::Cancelled {
            return Err(AppError::Conflict(format!("Booking {id} is cancelled")));
        }

        let mut active: booking::ActiveModel = existing.clone().into();
        if rescheduling {
            let guide = find_guide(&txn, existing.guide_id).await?;
            let tourist = user::Entity::find_by_id(existing.tourist_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::Internal(format!("Booking {id} has no tourist")))?;

            let hours = changes.hours.unwrap_or(existing.hours);
            let price = pricing::quote(
                guide.rate_tourist,
                guide.rate_local,
                Segment::for_role(&tourist.role),
                hours,
            )?;

            if let Some(date) = changes.date {
                active.date = Set(date);
            }
            active.hours = Set(hours);
            active.total_price = Set(price.total_price);
            active.commission = Set(price.commission);
            active.net_amount = Set(price.net_amount);
        }
        if let Some(status) = status {
            active.status = Set(status);
        }

        if !active.is_changed() {
            return Ok(existing);
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        tracing::info!(
            booking_id = %id,
            status = ?updated.status,
            total_price = updated.total_price,
            "Booking updated"
        );
        Ok(updated)
    }

    /// Move a booking to `status`. When `guide_id` is given the booking must
    /// belong to that guide. Cancelled bookings stay cancelled.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        guide_id: Option<Uuid>,
    ) -> AppResult<booking::Model> {
        let txn = self.db.begin().await?;
        let existing = find_for_update(&txn, id).await?;
        if guide_id.is_some_and(|g| g != existing.guide_id) {
            return Err(AppError::NotFound(format!("Booking {id} not found")));
        }

        let updated = apply_status(&txn, existing, status).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// A tourist may cancel their own booking until the day before it.
    pub async fn cancel_by_tourist(&self, id: Uuid, tourist_id: Uuid) -> AppResult<booking::Model> {
        let txn = self.db.begin().await?;
        let existing = find_for_update(&txn, id).await?;
        if existing.tourist_id != tourist_id {
            return Err(AppError::NotFound(format!("Booking {id} not found")));
        }
        if existing.date <= Utc::now().date_naive() {
            return Err(AppError::Conflict(
                "Bookings can only be cancelled before their date".to_string(),
            ));
        }

        let updated = apply_status(&txn, existing, BookingStatus::Cancelled).await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = booking::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Booking {id} not found")));
        }
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }
}

/// Row-locked read, so concurrent status changes serialize on the booking.
async fn find_for_update<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<booking::Model> {
    booking::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))
}

async fn apply_status<C: ConnectionTrait>(
    db: &C,
    existing: booking::Model,
    status: BookingStatus,
) -> AppResult<booking::Model> {
    ensure_transition(&existing, &status)?;
    if existing.status == status {
        return Ok(existing);
    }

    let mut active: booking::ActiveModel = existing.into();
    active.status = Set(status);
    let updated = active.update(db).await?;

    tracing::info!(booking_id = %updated.id, status = ?updated.status, "Booking status changed");
    Ok(updated)
}

fn ensure_transition(existing: &booking::Model, to: &BookingStatus) -> AppResult<()> {
    if can_transition(&existing.status, to) {
        return Ok(());
    }
    Err(AppError::Conflict(format!(
        "Booking {} cannot move from {:?} to {:?}",
        existing.id, existing.status, to
    )))
}

fn can_transition(from: &BookingStatus, to: &BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, _) | (Confirmed, Confirmed) | (Confirmed, Cancelled)
    )
}

async fn find_guide<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<guide::Model> {
    guide::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Guide {id} does not exist")))
}

async fn ensure_place<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    kind: PlaceKind,
    city_id: i32,
) -> AppResult<()> {
    let found = place::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("{} {id} does not exist", kind.as_str())))?;

    if found.kind != kind {
        return Err(AppError::Validation(format!(
            "Place {id} is a {}, not a {}",
            found.kind.as_str(),
            kind.as_str()
        )));
    }
    if found.city_id != city_id {
        return Err(AppError::Validation(format!(
            "Place {id} is not in city {city_id}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::repositories::fixtures;

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive() + Duration::days(1)
    }

    fn request(guide_id: Uuid, city_id: i32, hours: i32) -> NewBooking {
        NewBooking {
            guide_id,
            city_id,
            date: tomorrow(),
            hours,
            attraction_id: None,
            restaurant_id: None,
            activity_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_computes_breakdown_for_tourist() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");
        let chebba = fixtures::city(4, "Chebba", "chebba");

        let mut stored = fixtures::booking(guide.id, tourist.id, 4, tomorrow());
        stored.hours = 3;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guide.clone()]])
            .append_query_results([[chebba]])
            .append_query_results([[fixtures::location(guide.id, 4)]])
            .append_query_results([[stored]])
            .into_connection();
        let db = Arc::new(db);
        let repo = BookingRepository::new(db.clone());

        let created = repo.create(&tourist, request(guide.id, 4, 3)).await.unwrap();
        assert_eq!(created.total_price, 90);
        assert_eq!(created.commission, 18);
        assert_eq!(created.net_amount, 72);
        assert_eq!(created.status, BookingStatus::Pending);

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains("INSERT INTO \"booking\""));
        assert!(log.contains("BigInt(Some(90))"));
        assert!(log.contains("BigInt(Some(18))"));
        assert!(log.contains("BigInt(Some(72))"));
    }

    #[tokio::test]
    async fn test_create_rejects_hours_out_of_range() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");

        for hours in [0, 9] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[guide.clone()]])
                .append_query_results([[fixtures::city(4, "Chebba", "chebba")]])
                .append_query_results([[fixtures::location(guide.id, 4)]])
                .into_connection();
            let repo = BookingRepository::new(Arc::new(db));

            let err = repo.create(&tourist, request(guide.id, 4, hours)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "hours = {hours}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_city_not_served() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Local, "Sami");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guide.clone()]])
            .append_query_results([[fixtures::city(2, "Tunis", "tunis")]])
            .append_query_results([Vec::<crate::entities::guide_location::Model>::new()])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo.create(&tourist, request(guide.id, 2, 2)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("does not serve")));
    }

    #[tokio::test]
    async fn test_create_rejects_place_from_other_city() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");
        let fort = fixtures::place(PlaceKind::Attraction, 9, "Old Fort");

        let mut input = request(guide.id, 4, 2);
        input.attraction_id = Some(fort.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guide.clone()]])
            .append_query_results([[fixtures::city(4, "Chebba", "chebba")]])
            .append_query_results([[fixtures::location(guide.id, 4)]])
            .append_query_results([[fort]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo.create(&tourist, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("not in city 4")));
    }

    #[tokio::test]
    async fn test_guides_and_admins_cannot_book() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = BookingRepository::new(Arc::new(db));
        let admin = fixtures::user(UserRole::Admin, "Root");

        let err = repo
            .create(&admin, request(Uuid::new_v4(), 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_past_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = BookingRepository::new(Arc::new(db));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");

        let mut input = request(Uuid::new_v4(), 1, 2);
        input.date = Utc::now().date_naive() - Duration::days(3);

        let err = repo.create(&tourist, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_quote_uses_local_rate_for_locals() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guide.clone()]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let price = repo
            .quote(
                &UserRole::Local,
                &QuoteRequest {
                    guide_id: guide.id,
                    hours: 4,
                },
            )
            .await
            .unwrap();
        assert_eq!(price.total_price, 80);
        assert_eq!(price.commission, 16);
        assert_eq!(price.net_amount, 64);
    }

    #[tokio::test]
    async fn test_cancelled_booking_cannot_be_confirmed() {
        let mut cancelled = fixtures::booking(Uuid::new_v4(), Uuid::new_v4(), 1, tomorrow());
        cancelled.status = BookingStatus::Cancelled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[cancelled.clone()]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo
            .set_status(cancelled.id, BookingStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_guide_cannot_touch_other_guides_booking() {
        let booking = fixtures::booking(Uuid::new_v4(), Uuid::new_v4(), 1, tomorrow());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking.clone()]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo
            .set_status(booking.id, BookingStatus::Confirmed, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tourist_cannot_cancel_on_the_day() {
        let tourist_id = Uuid::new_v4();
        let today = fixtures::booking(Uuid::new_v4(), tourist_id, 1, Utc::now().date_naive());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[today.clone()]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo.cancel_by_tourist(today.id, tourist_id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    fn hours(hours: i32) -> BookingChanges {
        BookingChanges {
            date: None,
            hours: Some(hours),
        }
    }

    #[tokio::test]
    async fn test_update_reprices_new_hours() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");
        let existing = fixtures::booking(guide.id, tourist.id, 4, tomorrow());

        let mut stored = existing.clone();
        stored.hours = 5;
        stored.total_price = 150;
        stored.commission = 30;
        stored.net_amount = 120;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .append_query_results([[guide]])
                .append_query_results([[tourist]])
                .append_query_results([[stored]])
                .into_connection(),
        );
        let repo = BookingRepository::new(db.clone());

        let updated = repo.update(existing.id, hours(5), None).await.unwrap();
        assert_eq!(updated.total_price, 150);

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("UPDATE \"booking\""));
        assert!(log.contains("BigInt(Some(150))"));
        assert!(log.contains("BigInt(Some(30))"));
        assert!(log.contains("BigInt(Some(120))"));
    }

    #[tokio::test]
    async fn test_update_rejects_hours_out_of_range() {
        let hedi = fixtures::user(UserRole::Guide, "Hedi");
        let guide = fixtures::guide(hedi.id, Some(30), Some(20));
        let tourist = fixtures::user(UserRole::Tourist, "Lena");
        let existing = fixtures::booking(guide.id, tourist.id, 4, tomorrow());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .append_query_results([[guide]])
            .append_query_results([[tourist]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo.update(existing.id, hours(9), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancelled_booking_cannot_be_rescheduled() {
        let mut cancelled = fixtures::booking(Uuid::new_v4(), Uuid::new_v4(), 1, tomorrow());
        cancelled.status = BookingStatus::Cancelled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[cancelled.clone()]])
            .into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let err = repo.update(cancelled.id, hours(4), None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_with_forbidden_transition_writes_nothing() {
        let mut confirmed = fixtures::booking(Uuid::new_v4(), Uuid::new_v4(), 1, tomorrow());
        confirmed.status = BookingStatus::Confirmed;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[confirmed.clone()]])
                .into_connection(),
        );
        let repo = BookingRepository::new(db.clone());

        let err = repo
            .update(confirmed.id, hours(5), Some(BookingStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(!log.contains("UPDATE \"booking\""));
    }

    #[tokio::test]
    async fn test_update_rejects_past_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = BookingRepository::new(Arc::new(db));

        let changes = BookingChanges {
            date: Some(Utc::now().date_naive() - Duration::days(1)),
            hours: None,
        };
        let err = repo.update(Uuid::new_v4(), changes, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_status_locks_the_row() {
        let booking = fixtures::booking(Uuid::new_v4(), Uuid::new_v4(), 1, tomorrow());
        let mut confirmed = booking.clone();
        confirmed.status = BookingStatus::Confirmed;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking.clone()]])
                .append_query_results([[confirmed]])
                .into_connection(),
        );
        let repo = BookingRepository::new(db.clone());

        let updated = repo
            .set_status(booking.id, BookingStatus::Confirmed, Some(booking.guide_id))
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("UPDATE \"booking\""));
    }

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;
        assert!(can_transition(&Pending, &Confirmed));
        assert!(can_transition(&Pending, &Cancelled));
        assert!(can_transition(&Confirmed, &Cancelled));
        assert!(!can_transition(&Confirmed, &Pending));
        assert!(!can_transition(&Cancelled, &Pending));
        assert!(!can_transition(&Cancelled, &Confirmed));
    }
}
