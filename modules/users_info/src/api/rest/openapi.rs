use utoipa::OpenApi;

use crate::api::rest::dto::{UserDto, UserReq};
use crate::api::rest::error::ErrorBody;
use crate::api::rest::handlers;

/// OpenAPI document for the users endpoints.
#[derive(OpenApi)]
#[openapi(
    info(title = "Users API", description = "CRUD over the User resource"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user
    ),
    components(schemas(UserDto, UserReq, ErrorBody)),
    tags((name = "users", description = "User management"))
)]
pub struct UsersApiDoc;
