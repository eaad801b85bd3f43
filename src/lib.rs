//! # liff-editor
//!
//! 这是 LINE LIFF 消息编辑器的 Rust 实现，提供会话感知的 GraphQL 请求管线。
//!
//! Session-aware request pipeline for a LIFF message editor: read the visitor's latest
//! message, edit it, and recover predictably when the identity session expires.
//!
//! ## Overview
//!
//! Every save goes through the same four stages:
//!
//! 1. **Session guard** ([`session::SessionContext`]): confirm a usable identity session,
//!    starting a login when there is none.
//! 2. **Bounded request** ([`transport::HttpTransport`]): one POST with a hard timeout and
//!    a bearer token when available.
//! 3. **Classification** ([`client::classify`]): success, expired authentication, or a
//!    generic failure.
//! 4. **Recovery** ([`recovery`]): close the window, offer a re-login, or reset the control.
//!    No request is ever retried automatically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liff_editor::{EditorClient, SaveTarget};
//!
//! #[tokio::main]
//! async fn main() -> liff_editor::Result<()> {
//!     let client = EditorClient::builder()
//!         .graphql_url("https://api.example.com/graphql")
//!         .build()?;
//!
//!     let receipt = client.save(&SaveTarget::EditText, "hello").await?;
//!     println!("saved for {}", receipt.user_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`app`] | Launch parameters and the page bootstrap |
//! | [`client`] | Editor client, response classification and message operations |
//! | [`config`] | Layered configuration |
//! | [`graphql`] | GraphQL envelope and operations |
//! | [`recovery`] | Save control state machine and its driver |
//! | [`session`] | Identity provider seam and the session guard |
//! | [`transport`] | Bounded HTTP transport |

pub mod app;
pub mod client;
pub mod config;
pub mod graphql;
pub mod recovery;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use app::{bootstrap, LaunchParams, View};
pub use client::{EditorClient, EditorClientBuilder, Outcome, SaveReceipt, SaveTarget};
pub use config::{EditorConfig, UiDelays};
pub use graphql::{Message, MutationAck};
pub use recovery::{Affordance, SaveDriver, SaveState, Ui};
pub use session::{HostPage, IdentityProvider, SessionContext};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
