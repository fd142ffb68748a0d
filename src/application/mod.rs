pub mod services;

pub use services::SessionBridge;
