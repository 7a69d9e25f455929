pub mod handlers;
pub mod middleware;
pub mod raised;
pub mod routes;
pub mod users;

pub use raised::{Raise, Raised, StatusSignal};
