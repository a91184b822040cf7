//! Request extractors

use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON request body whose rejections render as an [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
