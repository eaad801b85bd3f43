//! Session-aware GraphQL client.
//!
//! Keep the public surface small: build an [`EditorClient`], call [`EditorClient::save`]
//! or one of the typed operations. Implementation details live under `src/client/`.

pub mod builder;
pub mod classify;
pub mod core;
pub mod messages;

pub use builder::EditorClientBuilder;
pub use classify::{classify, Outcome};
pub use self::core::EditorClient;
pub use messages::{SaveReceipt, SaveTarget};
