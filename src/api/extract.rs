//! Extractors whose rejections surface as request validation failures

use axum::extract::{FromRequest, FromRequestParts};

use crate::api::failure::Failure;

/// `axum::Json` rejecting with [`Failure::RequestValidation`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Failure))]
pub struct ValidatedJson<T>(pub T);

/// `axum::extract::Path` rejecting with [`Failure::RequestValidation`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Failure))]
pub struct ValidatedPath<T>(pub T);
