use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250301_000002_create_cities::City;
use super::m20250301_000003_create_users::User;
use super::m20250301_000004_create_places::Place;
use super::m20250301_000005_create_guides::Guide;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::GuideId).not_null())
                    .col(uuid(Booking::TouristId).not_null())
                    .col(integer(Booking::CityId).not_null())
                    .col(date(Booking::Date).not_null())
                    .col(integer(Booking::Hours).not_null())
                    .col(big_integer(Booking::TotalPrice).not_null())
                    .col(big_integer(Booking::Commission).not_null())
                    .col(big_integer(Booking::NetAmount).not_null())
                    .col(uuid_null(Booking::AttractionId))
                    .col(uuid_null(Booking::RestaurantId))
                    .col(uuid_null(Booking::ActivityId))
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Booking::Hours).between(1, 8))
                    .check(Expr::col(Booking::Commission).eq(Expr::cust("total_price / 5")))
                    .check(
                        Expr::col(Booking::NetAmount)
                            .eq(Expr::cust("total_price - commission")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_guide")
                            .from(Booking::Table, Booking::GuideId)
                            .to(Guide::Table, Guide::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_tourist")
                            .from(Booking::Table, Booking::TouristId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_city")
                            .from(Booking::Table, Booking::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_attraction")
                            .from(Booking::Table, Booking::AttractionId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_restaurant")
                            .from(Booking::Table, Booking::RestaurantId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_activity")
                            .from(Booking::Table, Booking::ActivityId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_guide")
                    .table(Booking::Table)
                    .col(Booking::GuideId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_tourist")
                    .table(Booking::Table)
                    .col(Booking::TouristId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    GuideId,
    TouristId,
    CityId,
    Date,
    Hours,
    TotalPrice,
    Commission,
    NetAmount,
    AttractionId,
    RestaurantId,
    ActivityId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
