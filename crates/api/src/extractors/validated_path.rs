//! Path extractor with JSON rejections.

use axum::{
    extract::{FromRequestParts, Path, rejection::PathRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Path parameters parsed like [`Path`], rejected as a 400 JSON error.
///
/// ```rust,ignore
/// async fn get_expense(ValidatedPath(id): ValidatedPath<i32>) {
///     // id is a valid i32
/// }
/// ```
pub struct ValidatedPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| ApiError::bad_request("invalid_path", e.body_text()))?;

        Ok(Self(value))
    }
}
