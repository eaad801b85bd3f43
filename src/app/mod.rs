//! Launch parameters and the page bootstrap.

pub mod bootstrap;
pub mod launch;

pub use bootstrap::{bootstrap, View, PROFILE_MISSING_MESSAGE};
pub use launch::{LaunchParams, LIST_PATH};
