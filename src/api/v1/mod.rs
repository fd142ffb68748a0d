pub mod contracts;
pub mod proxy;
pub mod routes;
pub mod session;

pub use contracts::*;
pub use proxy::*;
pub use routes::*;
pub use session::*;
