use crate::api::rest::handlers;
use crate::config::UsersInfoConfig;
use crate::domain::service::Service;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;

/// Mount the users endpoints on `router` with their shared state.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    config: Arc<UsersInfoConfig>,
) -> Router {
    // GET /users, POST /users
    let users = Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        // GET/PUT/DELETE /users/{id}
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
        .layer(Extension(config));

    router.merge(users)
}
