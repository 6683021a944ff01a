//! Identity resolution for skythread: handle → DID.
//!
//! Resolution goes through the `com.atproto.identity.resolveHandle` XRPC
//! query on whatever service the caller is already talking to. There is one
//! attempt per call; a failure is reported, never retried.

pub mod resolver;

pub use resolver::{IdentityError, IdentityResolver, resolve_handle_via};
