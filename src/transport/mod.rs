//! Bounded HTTP transport.

pub mod http;

pub use http::{HttpTransport, RawResponse, TransportError, REQUEST_ID_HEADER};
