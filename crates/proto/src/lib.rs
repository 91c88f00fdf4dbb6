//! Wire-level contract of the HTTP, GraphQL and WebSocket surfaces.

pub mod methods;
pub mod types;

pub use methods::*;
pub use types::*;
