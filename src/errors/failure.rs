//! Failure taxonomy raised by business logic and consumed by the dispatcher.
//!
//! Two structured variants carry the metadata that ends up in the response
//! body. Anything else is unstructured and is never trusted to carry
//! user-safe text.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::codes::ErrorCode;

/// Message used when nothing more specific may be disclosed
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please contact support.";

/// Status used when none (or an invalid one) was supplied
pub const DEFAULT_STATUS: u16 = 500;

fn valid_status(status: u16) -> u16 {
    if (100..=999).contains(&status) {
        status
    } else {
        DEFAULT_STATUS
    }
}

fn non_empty_message(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// A structured, intentionally raised error
#[derive(Debug)]
pub struct GenericFailure {
    status: u16,
    error_code: Option<String>,
    error_message: String,
    error_detail: Option<String>,
    error_detail_url: Option<String>,
    backtrace: Backtrace,
}

impl GenericFailure {
    pub fn new(status: u16, error_message: impl Into<String>) -> Self {
        Self {
            status: valid_status(status),
            error_code: None,
            error_message: non_empty_message(error_message.into()),
            error_detail: None,
            error_detail_url: None,
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Create a failure using the code's default status
    pub fn from_code(code: ErrorCode, error_message: impl Into<String>) -> Self {
        Self::new(code.status_code(), error_message).with_code(code)
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn with_detail(mut self, error_detail: impl Into<String>) -> Self {
        self.error_detail = Some(error_detail.into());
        self
    }

    pub fn with_detail_url(mut self, error_detail_url: impl Into<String>) -> Self {
        self.error_detail_url = Some(error_detail_url.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = valid_status(status);
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn set_error_code(&mut self, error_code: Option<String>) {
        self.error_code = error_code;
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Empty messages are replaced with [`GENERIC_ERROR_MESSAGE`]
    pub fn set_error_message(&mut self, error_message: impl Into<String>) {
        self.error_message = non_empty_message(error_message.into());
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn set_error_detail(&mut self, error_detail: Option<String>) {
        self.error_detail = error_detail;
    }

    pub fn error_detail_url(&self) -> Option<&str> {
        self.error_detail_url.as_deref()
    }

    pub fn set_error_detail_url(&mut self, error_detail_url: Option<String>) {
        self.error_detail_url = error_detail_url;
    }

    /// Backtrace captured where the failure was created
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Default for GenericFailure {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS, GENERIC_ERROR_MESSAGE)
    }
}

// Display and Error are written out: thiserror would derive a nightly-only
// provide() for the Backtrace field.
impl fmt::Display for GenericFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_message)
    }
}

impl std::error::Error for GenericFailure {}

/// One offending input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorDetail {
    pub field: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub error_detail: Option<String>,
    pub error_detail_url: Option<String>,
}

impl FieldErrorDetail {
    pub fn new(field: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error_code: None,
            error_message: Some(error_message.into()),
            error_detail: None,
            error_detail_url: None,
        }
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn with_detail(mut self, error_detail: impl Into<String>) -> Self {
        self.error_detail = Some(error_detail.into());
        self
    }

    pub fn with_detail_url(mut self, error_detail_url: impl Into<String>) -> Self {
        self.error_detail_url = Some(error_detail_url.into());
        self
    }
}

/// A structured error made of one or more field-level violations.
///
/// Violations are appended through a shared reference, so several validators
/// running on different threads can report into the same failure before it
/// is raised. Entries keep the order in which the lock admitted them.
///
/// ```
/// use api_error_contract::errors::{FieldErrorDetail, FieldFailure};
///
/// let failure = FieldFailure::new(400, "Invalid request");
/// failure.append_field("name", "required");
/// failure.append(FieldErrorDetail::new("age", "must be positive").with_code("RANGE"));
///
/// assert_eq!(failure.field_error_count(), 2);
/// ```
#[derive(Debug)]
pub struct FieldFailure {
    status: u16,
    error_code: Option<String>,
    error_message: String,
    error_detail: Option<String>,
    error_detail_url: Option<String>,
    field_errors: Mutex<Vec<FieldErrorDetail>>,
    backtrace: Backtrace,
}

impl FieldFailure {
    pub fn new(status: u16, error_message: impl Into<String>) -> Self {
        Self::with_field_errors(status, error_message, Vec::new())
    }

    pub fn with_field_errors(
        status: u16,
        error_message: impl Into<String>,
        field_errors: Vec<FieldErrorDetail>,
    ) -> Self {
        Self {
            status: valid_status(status),
            error_code: None,
            error_message: non_empty_message(error_message.into()),
            error_detail: None,
            error_detail_url: None,
            field_errors: Mutex::new(field_errors),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Create a failure using the code's default status
    pub fn from_code(code: ErrorCode, error_message: impl Into<String>) -> Self {
        Self::new(code.status_code(), error_message).with_code(code)
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn with_detail(mut self, error_detail: impl Into<String>) -> Self {
        self.error_detail = Some(error_detail.into());
        self
    }

    pub fn with_detail_url(mut self, error_detail_url: impl Into<String>) -> Self {
        self.error_detail_url = Some(error_detail_url.into());
        self
    }

    /// Append a violation with just a field name and message
    pub fn append_field(
        &self,
        field: impl Into<String>,
        error_message: impl Into<String>,
    ) -> &Self {
        self.append(FieldErrorDetail::new(field, error_message))
    }

    /// Append a fully described violation
    pub fn append(&self, detail: FieldErrorDetail) -> &Self {
        self.locked().push(detail);
        self
    }

    /// Ordered snapshot of the violations appended so far
    pub fn field_errors(&self) -> Vec<FieldErrorDetail> {
        self.locked().clone()
    }

    pub fn set_field_errors(&mut self, field_errors: Vec<FieldErrorDetail>) {
        *self
            .field_errors
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = field_errors;
    }

    pub fn field_error_count(&self) -> usize {
        self.locked().len()
    }

    pub fn has_field_errors(&self) -> bool {
        !self.locked().is_empty()
    }

    /// Consume the failure, freezing its violations
    pub fn into_field_errors(self) -> Vec<FieldErrorDetail> {
        self.field_errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = valid_status(status);
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn set_error_code(&mut self, error_code: Option<String>) {
        self.error_code = error_code;
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn set_error_message(&mut self, error_message: impl Into<String>) {
        self.error_message = non_empty_message(error_message.into());
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn set_error_detail(&mut self, error_detail: Option<String>) {
        self.error_detail = error_detail;
    }

    pub fn error_detail_url(&self) -> Option<&str> {
        self.error_detail_url.as_deref()
    }

    pub fn set_error_detail_url(&mut self, error_detail_url: Option<String>) {
        self.error_detail_url = error_detail_url;
    }

    /// Backtrace captured where the failure was created
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    // A validator that panicked mid-append leaves a complete Vec behind.
    fn locked(&self) -> MutexGuard<'_, Vec<FieldErrorDetail>> {
        self.field_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} field error(s))",
            self.error_message,
            self.field_error_count()
        )
    }
}

impl std::error::Error for FieldFailure {}

/// Every failure that can reach the response boundary
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Generic(#[from] GenericFailure),

    #[error(transparent)]
    FieldValidation(#[from] FieldFailure),

    /// Anything not raised on purpose
    #[error(transparent)]
    Unstructured(#[from] anyhow::Error),
}

impl Failure {
    pub fn unstructured<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Unstructured(error.into())
    }

    /// HTTP status this failure will be answered with
    pub fn status(&self) -> u16 {
        match self {
            Self::Generic(f) => f.status(),
            Self::FieldValidation(f) => f.status(),
            Self::Unstructured(_) => DEFAULT_STATUS,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Unstructured(_))
    }
}
