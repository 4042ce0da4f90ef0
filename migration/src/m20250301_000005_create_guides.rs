use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000002_create_cities::City;
use super::m20250301_000003_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guide::Table)
                    .if_not_exists()
                    .col(uuid(Guide::Id).primary_key())
                    .col(uuid(Guide::UserId).not_null().unique_key())
                    .col(text(Guide::Bio).not_null())
                    .col(
                        array(Guide::Languages, ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    // Hourly rates in millimes
                    .col(big_integer_null(Guide::RateTourist))
                    .col(big_integer_null(Guide::RateLocal))
                    .col(double_null(Guide::Rating))
                    .col(
                        timestamp_with_time_zone(Guide::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guide_user")
                            .from(Guide::Table, Guide::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GuideLocation::Table)
                    .if_not_exists()
                    .col(uuid(GuideLocation::GuideId).not_null())
                    .col(integer(GuideLocation::CityId).not_null())
                    .primary_key(
                        Index::create()
                            .col(GuideLocation::GuideId)
                            .col(GuideLocation::CityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guide_location_guide")
                            .from(GuideLocation::Table, GuideLocation::GuideId)
                            .to(Guide::Table, Guide::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guide_location_city")
                            .from(GuideLocation::Table, GuideLocation::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_guide_location_city")
                    .table(GuideLocation::Table)
                    .col(GuideLocation::CityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuideLocation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Guide::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Guide {
    Table,
    Id,
    UserId,
    Bio,
    Languages,
    RateTourist,
    RateLocal,
    Rating,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum GuideLocation {
    Table,
    GuideId,
    CityId,
}
