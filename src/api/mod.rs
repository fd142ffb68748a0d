pub mod v1;
pub mod dto;
pub mod validation;
pub mod errors;

pub use v1::{create_v1_router, proxy_auth_handler};
pub use dto::*;
