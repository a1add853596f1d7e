//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use homelights_domain::error::{ErrorKind, LightsError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: String,
}

/// Maps [`LightsError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(LightsError);

impl From<LightsError> for ApiError {
    fn from(err: LightsError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(LightsError::Validation(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedBody(rejection.body_text()).into()
    }
}

/// JSON request body whose rejections render as an [`ApiError`], so a body
/// that fails to parse gets the same `{error, kind}` shape as every other
/// failure.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Status code for each error kind.
#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Capability | ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::DeviceUnavailable | ErrorKind::Bootstrap => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Message safe to hand to a client. Internal failures are logged and
/// replaced with a generic message.
pub(crate) fn public_detail(err: &LightsError) -> String {
    let kind = err.kind();
    if status_for(kind) == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(kind = %kind, error = %err.detail(), "internal error");
        "internal server error".to_string()
    } else {
        err.detail()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        (
            status_for(kind),
            Json(ErrorBody {
                error: public_detail(&self.0),
                kind: kind.to_string(),
            }),
        )
            .into_response()
    }
}
