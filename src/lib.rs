pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use repositories::{
    BookingRepository, CityRepository, ConsoleRepository, GuideRepository, PlaceRepository,
    RegionRepository, SearchRepository, UserRepository,
};
use storage::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Config,
    pub storage: Arc<dyn StorageBackend>,
}

impl AppState {
    pub fn regions(&self) -> RegionRepository {
        RegionRepository::new(self.db.clone())
    }

    pub fn cities(&self) -> CityRepository {
        CityRepository::new(self.db.clone())
    }

    pub fn places(&self) -> PlaceRepository {
        PlaceRepository::new(self.db.clone())
    }

    pub fn guides(&self) -> GuideRepository {
        GuideRepository::new(self.db.clone())
    }

    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn search(&self) -> SearchRepository {
        SearchRepository::new(self.db.clone())
    }

    pub fn console(&self) -> ConsoleRepository {
        ConsoleRepository::new(self.db.clone())
    }
}
