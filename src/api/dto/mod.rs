pub mod contract_dto;
pub mod session_dto;

pub use contract_dto::*;
pub use session_dto::*;
