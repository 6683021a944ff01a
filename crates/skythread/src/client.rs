//! Authenticated XRPC client for the read-only endpoints skythread needs.
//!
//! [`CredentialSession`] is the explicit session handle threaded through
//! every operation: it logs in once with an app password, remembers the
//! access token and the account's PDS, and exposes typed helpers for each
//! endpoint. Tokens are never refreshed; an expired session surfaces as an
//! ordinary error.

pub mod credential_session;

use skythread_api::com_atproto::server::create_session::CreateSessionOutput;
use skythread_common::types::{Did, Handle};
use smol_str::SmolStr;

pub use credential_session::CredentialSession;

/// Session data from `com.atproto.server.createSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtpSession {
    /// Access token for authenticated requests
    pub access_jwt: SmolStr,
    /// Refresh token; kept for completeness, never used
    pub refresh_jwt: SmolStr,
    /// Account DID
    pub did: Did,
    /// Account handle at login time
    pub handle: Handle,
}

impl From<CreateSessionOutput> for AtpSession {
    fn from(output: CreateSessionOutput) -> Self {
        Self {
            access_jwt: output.access_jwt,
            refresh_jwt: output.refresh_jwt,
            did: output.did,
            handle: output.handle,
        }
    }
}
