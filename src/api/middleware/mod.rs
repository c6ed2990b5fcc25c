// Middleware Module

pub mod auth;
pub mod logging;

pub use auth::authenticate;
pub use logging::logging_layer;
