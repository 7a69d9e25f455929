use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::{debug, error, warn};

use crate::api::raised::{Raise, Raised};
use crate::errors::{is_known, ErrorDispatcher, Failure};

/// Render raised failures and status signals into the uniform error body.
///
/// Serves both client and server errors; responses that raised nothing pass
/// through untouched.
pub async fn error_handling_middleware(
    State(dispatcher): State<ErrorDispatcher>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    let Some(raised) = response.extensions_mut().remove::<Raised>() else {
        return response;
    };

    let (failure, status) = match raised.take() {
        Some(Raise::Failure(failure)) => (Some(failure), None),
        Some(Raise::Status(status)) => (None, Some(status)),
        None => return response,
    };

    if let Some(failure) = &failure {
        if failure.is_structured() {
            debug!(
                method = %method,
                path = %path,
                status = failure.status(),
                error = %failure,
                "Structured failure"
            );
        } else {
            error!(method = %method, path = %path, error = ?failure, "Unhandled failure");
        }
    }

    let answered = failure.as_ref().map(Failure::status).or(status);
    if let Some(code) = answered.filter(|code| !is_known(*code)) {
        warn!(
            method = %method,
            path = %path,
            status = code,
            "Status has no standard reason phrase"
        );
    }

    match dispatcher.dispatch(failure, status) {
        Ok(dispatched) => dispatched.into_response(),
        Err(e) => {
            error!(method = %method, path = %path, "Error response could not be rendered: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Turn a handler panic into an unstructured failure instead of dropping the
/// connection.
pub fn panic_response(
    dispatcher: ErrorDispatcher,
    panic: Box<dyn Any + Send + 'static>,
) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %message, "Handler panicked");

    let failure = Failure::unstructured(anyhow::anyhow!("handler panicked: {}", message));
    match dispatcher.dispatch(Some(failure), None) {
        Ok(dispatched) => dispatched.into_response(),
        Err(e) => {
            error!("Error response could not be rendered: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
