//! Request body extractors that report rejections as core errors.
//!
//! axum's own `Json` answers a bad body with a plain-text 4xx; these wrap it
//! so every malformed body becomes `400 {"error", "code": "validation_error"}`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::common::Error;

/// JSON body whose rejections become `Error::Validation`
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(Self(value))
    }
}

/// Optional JSON body. Only an empty body is `None`; anything else must parse.
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(invalid_body)?;
        Ok(Self(Some(value)))
    }
}

fn invalid_body(rejection: JsonRejection) -> Error {
    Error::Validation(rejection.body_text())
}
