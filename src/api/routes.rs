use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    demo_generic, demo_panic, demo_status, demo_unstructured, health, not_found, AppState,
};
use super::middleware::{error_handling_middleware, logging_middleware, panic_response};
use super::users::{create_user, get_user};
use crate::errors::ErrorDispatcher;

pub fn create_router(state: AppState, dispatcher: ErrorDispatcher) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))
        // Users
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        // Failure demonstrations
        .route("/demo/generic/:status", get(demo_generic))
        .route("/demo/unstructured", get(demo_unstructured))
        .route("/demo/panic", get(demo_panic))
        .route("/demo/status/:status", get(demo_status))
        .fallback(not_found)
        // Panics become unstructured failures before any other layer sees them
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn std::any::Any + Send + 'static>| panic_response(dispatcher, panic),
        ))
        // Error rendering sits inside logging so logging sees the final status
        .layer(middleware::from_fn_with_state(
            dispatcher,
            error_handling_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
