// API Module - HTTP status server for the certificate monitor

pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use server::{build_router, ApiServer};
pub use state::AppState;
