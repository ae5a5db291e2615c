//! Constructora API: REST gateway over the construction company's relational tables.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{resolve, validate, validate_model, Config, ResolvedEntity, ResolvedModel};
pub use error::{AppError, ConfigError};
pub use routes::{app, common_routes, entity_routes};
pub use service::CrudService;
pub use state::AppState;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Pool that opens connections on first use, so the service starts while the database is down.
pub fn connect_lazy(settings: &config::DatabaseSettings) -> Result<PgPool, ConfigError> {
    let options = settings.connect_options()?;
    Ok(PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options))
}
