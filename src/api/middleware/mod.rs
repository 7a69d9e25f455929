pub mod error_handler;
pub mod logging;

pub use error_handler::{error_handling_middleware, panic_response};
pub use logging::logging_middleware;
