//! GraphQL wire shapes: the `{query, variables}` envelope and the fixed operations.

pub mod operations;
pub mod request;

pub use operations::{Message, MutationAck};
pub use request::GraphQlRequest;
