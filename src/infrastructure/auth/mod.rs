pub mod gateway;
pub mod relay;
pub mod token_store;

pub use gateway::{parse_auth_response, HttpAuthGateway};
pub use relay::{AuthRelay, RelayResponse};
pub use token_store::MemoryTokenStore;
