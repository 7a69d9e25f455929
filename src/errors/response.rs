use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::failure::FieldErrorDetail;
use super::status::phrase_for;

/// Error response body for generic and unstructured failures
#[derive(Debug, Clone)]
pub struct GenericResponse {
    /// Correlates this occurrence in logs and support requests
    pub id: Uuid,
    pub status: u16,
    pub error_code: Option<String>,
    pub error_message: String,
    pub error_detail: Option<String>,
    pub error_detail_url: Option<String>,
    /// Only populated in development mode
    pub stacktrace: Option<String>,
}

impl GenericResponse {
    pub fn new(status: u16, error_message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            error_code: None,
            error_message: error_message.into(),
            error_detail: None,
            error_detail_url: None,
            stacktrace: None,
        }
    }

    /// Reason phrase for the status, derived on every call
    pub fn status_message(&self) -> Option<&'static str> {
        phrase_for(self.status)
    }
}

/// Error response body for field validation failures
#[derive(Debug, Clone)]
pub struct FieldValidationResponse {
    pub id: Uuid,
    pub status: u16,
    pub error_code: Option<String>,
    pub error_message: String,
    pub error_detail: Option<String>,
    pub error_detail_url: Option<String>,
    pub field_errors: Vec<FieldErrorRecord>,
    pub stacktrace: Option<String>,
}

impl FieldValidationResponse {
    pub fn new(status: u16, error_message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            error_code: None,
            error_message: error_message.into(),
            error_detail: None,
            error_detail_url: None,
            field_errors: Vec::new(),
            stacktrace: None,
        }
    }

    pub fn add_field_error(&mut self, field_error: FieldErrorRecord) {
        self.field_errors.push(field_error);
    }

    pub fn status_message(&self) -> Option<&'static str> {
        phrase_for(self.status)
    }
}

/// Wire form of a single field violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorRecord {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail_url: Option<String>,
}

impl FieldErrorRecord {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error_code: None,
            error_message: None,
            error_detail: None,
            error_detail_url: None,
        }
    }
}

impl From<FieldErrorDetail> for FieldErrorRecord {
    fn from(detail: FieldErrorDetail) -> Self {
        Self {
            field: detail.field,
            error_code: detail.error_code,
            error_message: detail.error_message,
            error_detail: detail.error_detail,
            error_detail_url: detail.error_detail_url,
        }
    }
}

// Borrowed views fix the key order and compute statusMessage at write time.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenericWire<'a> {
    id: &'a Uuid,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    error_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stacktrace: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldValidationWire<'a> {
    id: &'a Uuid,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    error_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail_url: Option<&'a str>,
    #[serde(skip_serializing_if = "no_field_errors")]
    field_errors: &'a [FieldErrorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    stacktrace: Option<&'a str>,
}

fn no_field_errors(records: &&[FieldErrorRecord]) -> bool {
    records.is_empty()
}

impl Serialize for GenericResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GenericWire {
            id: &self.id,
            status: self.status,
            status_message: self.status_message(),
            error_code: self.error_code.as_deref(),
            error_message: &self.error_message,
            error_detail: self.error_detail.as_deref(),
            error_detail_url: self.error_detail_url.as_deref(),
            stacktrace: self.stacktrace.as_deref(),
        }
        .serialize(serializer)
    }
}

impl Serialize for FieldValidationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FieldValidationWire {
            id: &self.id,
            status: self.status,
            status_message: self.status_message(),
            error_code: self.error_code.as_deref(),
            error_message: &self.error_message,
            error_detail: self.error_detail.as_deref(),
            error_detail_url: self.error_detail_url.as_deref(),
            field_errors: &self.field_errors,
            stacktrace: self.stacktrace.as_deref(),
        }
        .serialize(serializer)
    }
}
