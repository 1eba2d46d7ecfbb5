use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{openapi::UsersApiDoc, routes};
use crate::config::UsersInfoConfig;
use crate::domain::repo::UsersStore;
use crate::domain::service::Service;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersStore;

/// The users module: owns the domain service and knows how to migrate its
/// schema and mount its REST surface.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
    config: Arc<UsersInfoConfig>,
}

impl UsersInfo {
    /// Wire the SeaORM store to the domain service.
    pub fn new(db: DatabaseConnection, cfg: UsersInfoConfig) -> Self {
        info!("Initializing users_info module");
        debug!(
            "Loaded users_info config: no_content_when_empty={}",
            cfg.no_content_when_empty
        );
        Self::with_store(Arc::new(SeaOrmUsersStore::new(db)), cfg)
    }

    /// Build the module over any store implementation.
    pub fn with_store(store: Arc<dyn UsersStore>, cfg: UsersInfoConfig) -> Self {
        Self {
            service: Arc::new(Service::new(store)),
            config: Arc::new(cfg),
        }
    }

    /// Create or upgrade the `users` schema.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        crate::infra::storage::migrations::Migrator::up(db, None).await?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Mount `/users` and `/users/{id}` on `router`.
    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users_info REST routes");
        let router = routes::register_routes(router, self.service.clone(), self.config.clone());
        info!("Users REST routes registered successfully");
        router
    }

    /// OpenAPI document describing the routes mounted by `register_rest`.
    pub fn openapi() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        UsersApiDoc::openapi()
    }
}
