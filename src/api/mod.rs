//! HTTP API for collecting and categorizing audience responses

pub mod csv;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use routes::build_router;
