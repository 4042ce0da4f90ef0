pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_regions;
mod m20250301_000002_create_cities;
mod m20250301_000003_create_users;
mod m20250301_000004_create_places;
mod m20250301_000005_create_guides;
mod m20250301_000006_create_bookings;
mod m20250301_000007_add_search_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_regions::Migration),
            Box::new(m20250301_000002_create_cities::Migration),
            Box::new(m20250301_000003_create_users::Migration),
            Box::new(m20250301_000004_create_places::Migration),
            Box::new(m20250301_000005_create_guides::Migration),
            Box::new(m20250301_000006_create_bookings::Migration),
            Box::new(m20250301_000007_add_search_indexes::Migration),
        ]
    }
}
