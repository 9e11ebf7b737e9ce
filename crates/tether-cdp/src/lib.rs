//! Chrome DevTools Protocol plumbing for talking to the editor process.
//!
//! - [`discovery`]: HTTP target listing and editor-window selection.
//! - [`session`]: one WebSocket control channel per operation, with request
//!   id correlation, per-request deadlines and fail-on-close semantics.

pub mod discovery;
pub mod session;

pub use discovery::TargetDirectory;
pub use session::{DEFAULT_REQUEST_TIMEOUT, Session};
