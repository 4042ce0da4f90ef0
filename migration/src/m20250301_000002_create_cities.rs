use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_regions::Governorate;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(City::Table)
                    .if_not_exists()
                    .col(pk_auto(City::Id))
                    .col(integer_null(City::GovernorateId))
                    .col(string_len(City::Name, 100).not_null())
                    .col(string_len(City::Slug, 100).not_null().unique_key())
                    .col(text_null(City::Description))
                    .col(string_len_null(City::HeroImage, 512))
                    .col(double_null(City::Latitude))
                    .col(double_null(City::Longitude))
                    .col(
                        timestamp_with_time_zone(City::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_city_governorate")
                            .from(City::Table, City::GovernorateId)
                            .to(Governorate::Table, Governorate::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(City::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum City {
    Table,
    Id,
    GovernorateId,
    Name,
    Slug,
    Description,
    HeroImage,
    Latitude,
    Longitude,
    CreatedAt,
}
