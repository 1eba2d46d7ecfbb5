use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::api::rest::dto::{FieldError, UserReq};
use crate::api::rest::error::{validation_error, ErrorResponse};
use crate::contract::model::UserData;

/// JSON body extractor that reports malformed input in the uniform error shape.
///
/// Body rejections (bad syntax, wrong types, missing content type) become a
/// 400 "Validation error" attributed to the field `body`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(validation_error(&body_error(&rejection), &path)),
        }
    }
}

fn body_error(rejection: &JsonRejection) -> FieldError {
    FieldError::new("body", rejection.body_text())
}

/// A user payload that has passed every field rule.
pub struct ValidUser(pub UserData);

impl<S> FromRequest<S> for ValidUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let ValidatedJson(body) = ValidatedJson::<UserReq>::from_request(req, state).await?;
        body.into_user_data(Utc::now().date_naive())
            .map(Self)
            .map_err(|e| validation_error(&e, &path))
    }
}
