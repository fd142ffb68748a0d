pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod infrastructure;
pub mod utils;

#[cfg(test)]
mod tests;

// Main exports for external use
pub use application::SessionBridge;
pub use config::AppConfig;
pub use handlers::routes::{create_router, AppState};
