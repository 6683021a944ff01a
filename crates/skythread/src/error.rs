//! Error types for the skythread application layer

use std::path::PathBuf;

use miette::Diagnostic;
use skythread_common::error::ClientError;
use skythread_common::types::AtStrError;
use skythread_identity::IdentityError;
use smol_str::SmolStr;
use thiserror::Error;

/// Everything that can go wrong while turning input into a rendered post.
///
/// Only [`SkythreadError::CredentialsInvalid`], [`SkythreadError::LoginFailed`]
/// and [`SkythreadError::Terminal`] are fatal; the rest are reported by the
/// navigation loop, which then keeps its previous state.
#[derive(Debug, Error, Diagnostic)]
pub enum SkythreadError {
    /// An `at://` URI did not have the `authority/collection/rkey` shape
    #[error("invalid AT URI format: {0}")]
    #[diagnostic(
        code(skythread::malformed_identifier),
        help("AT URIs look like `at://<did or handle>/app.bsky.feed.post/<rkey>`")
    )]
    MalformedIdentifier(
        #[from]
        #[diagnostic_source]
        AtStrError,
    ),

    /// Input was neither an AT URI nor a recognisable post URL
    #[error("invalid Bluesky URL format: {url}")]
    #[diagnostic(
        code(skythread::unrecognized_url),
        help("expected https://bsky.app/profile/<handle or DID>/post/<rkey>")
    )]
    UnrecognizedUrlFormat {
        /// The offending input
        url: String,
    },

    /// Handle to DID resolution failed
    #[error("failed to resolve handle {handle}: {source}")]
    #[diagnostic(code(skythread::identity_resolution))]
    IdentityResolutionFailed {
        /// The handle as it appeared in the URL
        handle: SmolStr,
        /// Underlying resolver failure
        #[source]
        #[diagnostic_source]
        source: IdentityError,
    },

    /// The post record itself could not be fetched
    #[error("error fetching post {uri}: {source}")]
    #[diagnostic(code(skythread::record_fetch))]
    RecordFetchFailed {
        /// URI that was requested
        uri: SmolStr,
        /// Underlying client failure
        #[source]
        #[diagnostic_source]
        source: ClientError,
    },

    /// The credentials file is unreadable, not JSON, or lacks required fields
    #[error("error loading credentials from {}: {reason}", path.display())]
    #[diagnostic(
        code(skythread::credentials),
        help("the file must be a JSON object with `username` and `password` keys")
    )]
    CredentialsInvalid {
        /// Path that was read
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// createSession was rejected or unreachable
    #[error("login failed: {0}")]
    #[diagnostic(
        code(skythread::login),
        help("use an app password, not the account password")
    )]
    LoginFailed(
        #[source]
        #[diagnostic_source]
        ClientError,
    ),

    /// Reading from or writing to the terminal failed
    #[error("terminal I/O error: {0}")]
    #[diagnostic(code(skythread::terminal))]
    Terminal(#[from] std::io::Error),
}

impl SkythreadError {
    /// Whether the navigation loop can report this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::CredentialsInvalid { .. } | Self::LoginFailed(_) | Self::Terminal(_)
        )
    }
}

/// Result alias for skythread operations
pub type Result<T> = std::result::Result<T, SkythreadError>;
