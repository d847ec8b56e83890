//! Custom Axum extractors

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body extractor whose rejection follows the API error convention.
///
/// Missing or unknown fields and malformed JSON are rejected here, before
/// any handler logic runs, with a `{"message", "status"}` body like every
/// other failure.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest {
                message: rejection.body_text(),
            }),
        }
    }
}
