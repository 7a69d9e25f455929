//! Structured error handling for API responses

pub mod codes;
pub mod dispatcher;
pub mod failure;
pub mod response;
pub mod status;

pub use codes::ErrorCode;
pub use dispatcher::{handle, DispatchError, Dispatched, ErrorDispatcher};
pub use failure::{
    Failure, FieldErrorDetail, FieldFailure, GenericFailure, DEFAULT_STATUS,
    GENERIC_ERROR_MESSAGE,
};
pub use response::{FieldErrorRecord, FieldValidationResponse, GenericResponse};
pub use status::{is_known, phrase_for};
