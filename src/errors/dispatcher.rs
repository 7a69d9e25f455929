//! Maps a failure (or a bare status signal) to the status code and JSON body
//! sent back to the client.
//!
//! Dispatch order:
//! 1. no failure but an explicit status: that status, no body
//! 2. [`Failure::Generic`]: a [`GenericResponse`] copied from the failure
//! 3. [`Failure::FieldValidation`]: a [`FieldValidationResponse`] with the
//!    field violations in append order
//! 4. anything else: status 500 and [`GENERIC_ERROR_MESSAGE`] only
//!
//! Development mode adds a `stacktrace` to every body and, for unstructured
//! failures, the failure's own message as `errorDetail`.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use thiserror::Error;

use super::failure::{
    Failure, FieldFailure, GenericFailure, DEFAULT_STATUS, GENERIC_ERROR_MESSAGE,
};
use super::response::{FieldErrorRecord, FieldValidationResponse, GenericResponse};

/// Status and serialized body to hand to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub status: u16,
    /// `None` for bare status signals
    pub body: Option<String>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to serialize error response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Turn a failure into exactly one response
pub fn handle(
    failure: Option<Failure>,
    explicit_status: Option<u16>,
    development_mode: bool,
) -> Result<Dispatched, DispatchError> {
    match (failure, explicit_status) {
        (None, Some(status)) => Ok(Dispatched { status, body: None }),
        (Some(Failure::Generic(failure)), _) => {
            let response = generic_response(&failure, development_mode);
            render(response.status, &response)
        }
        (Some(Failure::FieldValidation(failure)), _) => {
            let response = field_validation_response(failure, development_mode);
            render(response.status, &response)
        }
        (Some(Failure::Unstructured(error)), _) => {
            let response = unstructured_response(Some(&error), development_mode);
            render(response.status, &response)
        }
        (None, None) => {
            let response = unstructured_response(None, development_mode);
            render(response.status, &response)
        }
    }
}

/// Dispatcher bound to a deployment's disclosure setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorDispatcher {
    development_mode: bool,
}

impl ErrorDispatcher {
    pub fn new(development_mode: bool) -> Self {
        Self { development_mode }
    }

    pub fn development_mode(&self) -> bool {
        self.development_mode
    }

    pub fn dispatch(
        &self,
        failure: Option<Failure>,
        explicit_status: Option<u16>,
    ) -> Result<Dispatched, DispatchError> {
        handle(failure, explicit_status, self.development_mode)
    }
}

pub fn generic_response(failure: &GenericFailure, development_mode: bool) -> GenericResponse {
    let mut response = GenericResponse::new(failure.status(), failure.error_message());
    response.error_code = failure.error_code().map(str::to_string);
    response.error_detail = failure.error_detail().map(str::to_string);
    response.error_detail_url = failure.error_detail_url().map(str::to_string);

    if development_mode {
        response.stacktrace = Some(render_stacktrace(failure, failure.backtrace()));
    }

    response
}

pub fn field_validation_response(
    failure: FieldFailure,
    development_mode: bool,
) -> FieldValidationResponse {
    let mut response = FieldValidationResponse::new(failure.status(), failure.error_message());
    response.error_code = failure.error_code().map(str::to_string);
    response.error_detail = failure.error_detail().map(str::to_string);
    response.error_detail_url = failure.error_detail_url().map(str::to_string);

    if development_mode {
        response.stacktrace = Some(render_stacktrace(&failure, failure.backtrace()));
    }

    for detail in failure.into_field_errors() {
        response.add_field_error(FieldErrorRecord::from(detail));
    }

    response
}

pub fn unstructured_response(
    error: Option<&anyhow::Error>,
    development_mode: bool,
) -> GenericResponse {
    let mut response = GenericResponse::new(DEFAULT_STATUS, GENERIC_ERROR_MESSAGE);

    if development_mode {
        if let Some(error) = error {
            response.error_detail = Some(error.to_string());
            // anyhow's debug form carries the cause chain and any captured backtrace
            let mut trace = format!("{error:?}");
            if error.backtrace().status() != BacktraceStatus::Captured {
                let here = Backtrace::force_capture();
                trace.push_str(&format!("\n\nStack backtrace (at dispatch):\n{here}"));
            }
            response.stacktrace = Some(trace);
        }
    }

    response
}

/// Message, cause chain, then the captured frames
fn render_stacktrace(error: &dyn StdError, backtrace: &Backtrace) -> String {
    let mut trace = error.to_string();

    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }

    if backtrace.status() == BacktraceStatus::Captured {
        trace.push_str(&format!("\n\nStack backtrace:\n{backtrace}"));
    }

    trace
}

fn render<T: serde::Serialize>(status: u16, response: &T) -> Result<Dispatched, DispatchError> {
    let body = serde_json::to_string(response)?;
    Ok(Dispatched {
        status,
        body: Some(body),
    })
}
