use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attraction, restaurant and activity share one table keyed by city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "place_kind")]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    #[sea_orm(string_value = "attraction")]
    Attraction,
    #[sea_orm(string_value = "restaurant")]
    Restaurant,
    #[sea_orm(string_value = "activity")]
    Activity,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Restaurant => "restaurant",
            Self::Activity => "activity",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "place")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: PlaceKind,
    pub city_id: i32,
    pub name: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Attraction type, cuisine or difficulty depending on `kind`.
    pub category: Option<String>,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub maps_url: Option<String>,
    pub added_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::CityId",
        to = "super::city::Column::Id"
    )]
    City,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AddedBy",
        to = "super::user::Column::Id"
    )]
    AddedBy,
}

impl Related<super::city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::City.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
