use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{ApiError, FieldError},
    model::device::DeviceType,
};

pub const REQUEST_FROM_HEADER: &str = "x-request-from";

/// JSON body whose binding failures surface as a 422 on field `body`
/// instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::Validation(vec![FieldError::new(
                "body",
                rejection.body_text(),
            )])),
        }
    }
}

/// Client platform announced by the caller, used to type new devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrom(pub Option<DeviceType>);

impl<S> FromRequestParts<S> for RequestFrom
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts
            .headers
            .get(REQUEST_FROM_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(RequestFrom(None));
        };

        match raw.parse::<DeviceType>() {
            Ok(device_type) => Ok(RequestFrom(Some(device_type))),
            Err(err) => {
                debug!(%err, "ignoring request platform hint");
                Ok(RequestFrom(None))
            }
        }
    }
}
