//! Common types for skythread's AT Protocol client
//!
//! This crate holds the pieces every other skythread crate leans on:
//! validated identifier strings ([`types::aturi::AtUri`], [`types::did::Did`],
//! [`types::handle::Handle`]), the untyped [`types::value::Data`] tree that
//! loosely-shaped API payloads are decoded into, a minimal [`http_client::HttpClient`]
//! abstraction, and stateless [`xrpc`] request/response mapping.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction used by skythread crates.
pub mod http_client;
/// Baseline fundamental AT Protocol data types.
pub mod types;
pub mod xrpc;

use smol_str::SmolStr;

/// Authorization token types for XRPC requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationToken {
    /// Bearer token (access JWT from an app-password session)
    Bearer(SmolStr),
}
