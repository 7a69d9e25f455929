use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{Dispatched, Failure, FieldFailure, GenericFailure};

/// What a handler raised instead of producing a body
#[derive(Debug)]
pub enum Raise {
    Failure(Failure),
    Status(u16),
}

/// Response extension carrying a raised failure to the error handling
/// middleware. Taken exactly once.
#[derive(Debug, Clone)]
pub struct Raised(Arc<Mutex<Option<Raise>>>);

impl Raised {
    pub fn new(raise: Raise) -> Self {
        Self(Arc::new(Mutex::new(Some(raise))))
    }

    pub fn take(&self) -> Option<Raise> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

fn raised_response(status: u16, raise: Raise) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = status.into_response();
    response.extensions_mut().insert(Raised::new(raise));
    response
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        raised_response(self.status(), Raise::Failure(self))
    }
}

impl IntoResponse for GenericFailure {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}

impl IntoResponse for FieldFailure {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}

// Extractor rejections get the uniform body instead of axum's plain text.

impl From<JsonRejection> for GenericFailure {
    fn from(rejection: JsonRejection) -> Self {
        GenericFailure::new(rejection.status().as_u16(), "Request body could not be read")
            .with_code("MALFORMED_BODY")
            .with_detail(rejection.body_text())
    }
}

impl From<PathRejection> for GenericFailure {
    fn from(rejection: PathRejection) -> Self {
        GenericFailure::new(rejection.status().as_u16(), "Request path could not be read")
            .with_code("MALFORMED_PATH")
            .with_detail(rejection.body_text())
    }
}

/// A bare status code with nothing more to say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSignal(pub StatusCode);

impl IntoResponse for StatusSignal {
    fn into_response(self) -> Response {
        let status = self.0.as_u16();
        raised_response(status, Raise::Status(status))
    }
}

impl IntoResponse for Dispatched {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            Some(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            None => status.into_response(),
        }
    }
}
