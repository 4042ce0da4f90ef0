use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250301_000002_create_cities::City;
use super::m20250301_000003_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(PlaceKind::Enum)
                    .values([PlaceKind::Attraction, PlaceKind::Restaurant, PlaceKind::Activity])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Place::Table)
                    .if_not_exists()
                    .col(uuid(Place::Id).primary_key())
                    .col(
                        ColumnDef::new(Place::Kind)
                            .custom(PlaceKind::Enum)
                            .not_null(),
                    )
                    .col(integer(Place::CityId).not_null())
                    .col(string_len(Place::Name, 200).not_null())
                    .col(string_len(Place::Slug, 200).not_null())
                    .col(text(Place::Description).not_null())
                    .col(string_len_null(Place::Category, 100))
                    .col(string_len_null(Place::Image, 512))
                    .col(
                        array(Place::Gallery, ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(string_len_null(Place::MapsUrl, 512))
                    .col(uuid_null(Place::AddedBy))
                    .col(
                        timestamp_with_time_zone(Place::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Place::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_city")
                            .from(Place::Table, Place::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_added_by")
                            .from(Place::Table, Place::AddedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_place_city_kind_slug")
                    .table(Place::Table)
                    .col(Place::CityId)
                    .col(Place::Kind)
                    .col(Place::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_place_city_kind")
                    .table(Place::Table)
                    .col(Place::CityId)
                    .col(Place::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Place::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PlaceKind::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Place {
    Table,
    Id,
    Kind,
    CityId,
    Name,
    Slug,
    Description,
    Category,
    Image,
    Gallery,
    MapsUrl,
    AddedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PlaceKind {
    #[sea_orm(iden = "place_kind")]
    Enum,
    #[sea_orm(iden = "attraction")]
    Attraction,
    #[sea_orm(iden = "restaurant")]
    Restaurant,
    #[sea_orm(iden = "activity")]
    Activity,
}
