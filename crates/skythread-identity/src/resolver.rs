use std::future::Future;

use miette::Diagnostic;
use skythread_api::com_atproto::identity::resolve_handle::ResolveHandle;
use skythread_common::error::ClientError;
use skythread_common::http_client::HttpClient;
use skythread_common::types::{AtStrError, Did, Handle};
use skythread_common::xrpc::{CallOptions, XrpcError, XrpcExt};
use thiserror::Error;
use url::Url;

/// Errors that can occur during identity resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum IdentityError {
    /// The input is not a syntactically valid handle
    #[error("invalid handle: {0}")]
    #[diagnostic(
        code(skythread_identity::invalid_handle),
        help("handles look like `alice.bsky.social`")
    )]
    InvalidHandle(#[from] AtStrError),
    /// The service reported that the handle does not resolve
    #[error("handle not found: {0}")]
    #[diagnostic(code(skythread_identity::handle_not_found))]
    HandleNotFound(Handle),
    /// The request failed before an XRPC answer came back
    #[error("HTTP error: {0}")]
    #[diagnostic(
        code(skythread_identity::http),
        help("check network connectivity and TLS configuration")
    )]
    Http(#[from] ClientError),
    /// Any other error the service reported
    #[error("XRPC error: {0}")]
    #[diagnostic(code(skythread_identity::xrpc))]
    Xrpc(#[from] XrpcError),
}

/// Result alias for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Trait for identity resolution, for pluggable implementations.
///
/// Takes the handle as it appeared in user input; implementations validate it
/// and report a malformed handle as [`IdentityError::InvalidHandle`].
#[trait_variant::make(Send)]
pub trait IdentityResolver {
    /// Resolve a handle to its DID
    fn resolve_handle(&self, handle: &str) -> impl Future<Output = Result<Did>>;
}

impl<T: IdentityResolver + Sync> IdentityResolver for &T {
    fn resolve_handle(&self, handle: &str) -> impl Future<Output = Result<Did>> + Send {
        (**self).resolve_handle(handle)
    }
}

/// Resolve a handle with `com.atproto.identity.resolveHandle` against `base`.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(handle = %handle, base = %base)))]
pub async fn resolve_handle_via<C>(
    client: &C,
    base: Url,
    opts: CallOptions,
    handle: &Handle,
) -> Result<Did>
where
    C: HttpClient + Sync,
{
    let req = ResolveHandle::new().handle(handle.clone()).build();
    let resp = client.xrpc(base).with_options(opts).send(&req).await?;
    match resp.into_output() {
        Ok(out) => Ok(out.did),
        Err(XrpcError::Generic(e)) if e.error == "HandleNotFound" => {
            Err(IdentityError::HandleNotFound(handle.clone()))
        }
        Err(e) => Err(e.into()),
    }
}
