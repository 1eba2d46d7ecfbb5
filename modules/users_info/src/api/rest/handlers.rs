use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::dto::{UserDto, UserReq};
use crate::api::rest::error::{map_domain_error, unknown_id, ErrorBody, ErrorResponse};
use crate::api::rest::extract::ValidUser;
use crate::config::UsersInfoConfig;
use crate::domain::service::Service;

/// A path segment that is not a UUID cannot name any stored user.
fn parse_id(raw: &str, path: &str) -> Result<Uuid, ErrorResponse> {
    raw.parse::<Uuid>().map_err(|_| unknown_id(raw, path))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    operation_id = "users_info.list_users",
    responses(
        (status = 200, description = "All users, oldest first", body = [UserDto]),
        (status = 204, description = "No users (when configured)"),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    Extension(cfg): Extension<Arc<UsersInfoConfig>>,
    uri: Uri,
) -> Result<Response, ErrorResponse> {
    info!("Listing users");

    let users = svc
        .list_users()
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    if users.is_empty() && cfg.no_content_when_empty {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let dto_users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(dto_users).into_response())
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.get_user",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Json<UserDto>, ErrorResponse> {
    info!("Getting user with id: {}", raw_id);

    let id = parse_id(&raw_id, uri.path())?;
    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    operation_id = "users_info.create_user",
    request_body = UserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto,
            headers(("Location" = String, description = "Path of the new user"))),
        (status = 400, description = "Validation error or email already registered", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidUser(data): ValidUser,
) -> Result<Response, ErrorResponse> {
    info!("Creating user with email: {}", data.email);

    let user = svc
        .create_user(data)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), user.id);
    let mut resp = (StatusCode::CREATED, Json(UserDto::from(user))).into_response();
    if let Ok(v) = HeaderValue::from_str(&location) {
        resp.headers_mut().insert(header::LOCATION, v);
    }
    Ok(resp)
}

/// Replace an existing user's name, email and birth date
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.update_user",
    params(("id" = String, Path, description = "User UUID")),
    request_body = UserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Validation error or email already registered", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    ValidUser(data): ValidUser,
) -> Result<Json<UserDto>, ErrorResponse> {
    info!("Updating user {}", raw_id);

    let id = parse_id(&raw_id, uri.path())?;
    match svc.update_user(id, data).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.delete_user",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User is still referenced", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting user: {}", raw_id);

    let id = parse_id(&raw_id, uri.path())?;
    match svc.delete_user(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}
