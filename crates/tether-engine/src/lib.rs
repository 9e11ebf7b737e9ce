//! Command layer for driving a running editor over its debugging endpoint.
//!
//! [`CdpRemote`] implements [`RemoteControl`]: each operation discovers the
//! editor target, opens a short-lived session, runs its protocol commands or
//! inspection snippets, and closes the session on every exit path.

pub mod backend;
pub mod config;
pub mod extraction;
pub mod input;
pub mod locator;
pub mod remote;
pub mod selectors;

pub use backend::RemoteControl;
pub use config::{ConfigError, ConfigLoader, TetherConfig};
pub use remote::CdpRemote;
pub use selectors::Selectors;
