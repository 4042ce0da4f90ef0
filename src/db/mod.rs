use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let timeout = Duration::from_secs(config.db_connect_timeout_secs);

    let mut options = ConnectOptions::new(&config.database_url);
    options
        .max_connections(config.db_max_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(true);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to connect to database: {}", e)))
}
