use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(pk_auto(Region::Id))
                    .col(string_len(Region::Name, 100).not_null())
                    .col(string_len(Region::Slug, 100).not_null().unique_key())
                    .col(text_null(Region::Description))
                    .col(
                        timestamp_with_time_zone(Region::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Governorate::Table)
                    .if_not_exists()
                    .col(pk_auto(Governorate::Id))
                    .col(integer(Governorate::RegionId).not_null())
                    .col(string_len(Governorate::Name, 100).not_null())
                    .col(string_len(Governorate::Slug, 100).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(Governorate::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_governorate_region")
                            .from(Governorate::Table, Governorate::RegionId)
                            .to(Region::Table, Region::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Governorate::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Region::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Region {
    Table,
    Id,
    Name,
    Slug,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Governorate {
    Table,
    Id,
    RegionId,
    Name,
    Slug,
    CreatedAt,
}
