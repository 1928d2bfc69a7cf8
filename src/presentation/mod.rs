// Presentation layer - HTTP API and console rendering
pub mod app_state;
pub mod auth;
pub mod console;
pub mod handlers;
pub mod router;
