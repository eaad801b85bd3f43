//! Identity session handling.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`IdentityProvider`] | Trait over the platform identity SDK |
//! | [`HostPage`] | Trait over the page hosting the editor |
//! | [`SessionContext`] | Session guard plus the per-process session state |
//! | [`InMemoryProvider`] | Scripted provider for tests |
//! | [`StoredCredentialProvider`] | Keyring/env backed provider for headless runs |

pub mod guard;
pub mod memory;
pub mod provider;
pub mod stored;

pub use guard::{SessionContext, UserIdResolution};
pub use memory::{InMemoryHost, InMemoryProvider, ProviderCall};
pub use provider::{HostPage, IdentityProvider, Profile};
pub use stored::StoredCredentialProvider;
