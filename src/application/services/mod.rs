pub mod session_bridge;

pub use session_bridge::SessionBridge;
