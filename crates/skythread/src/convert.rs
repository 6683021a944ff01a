//! Turning what a user pastes into an AT URI.

use std::sync::LazyLock;

use regex::Regex;
use skythread_common::types::{AtUri, aturi};
use skythread_identity::IdentityResolver;
use smol_str::SmolStr;

use crate::error::{Result, SkythreadError};

/// `https://bsky.app/profile/<handle or DID>/post/<rkey>`, anything after the
/// record key is ignored.
static POST_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://bsky\.app/profile/([^/?#]+)/post/([^/?#]+)").expect("valid regex")
});

const WEB_BASE: &str = "https://bsky.app";

/// A web-app post URL split into its two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BskyPostUrl {
    /// Handle or DID, as written in the URL
    pub actor: SmolStr,
    /// Record key
    pub rkey: SmolStr,
}

impl BskyPostUrl {
    /// Match `url` against the web-app post URL pattern.
    pub fn parse(url: &str) -> Result<Self> {
        let caps = POST_URL_REGEX
            .captures(url.trim())
            .ok_or_else(|| SkythreadError::UnrecognizedUrlFormat {
                url: url.to_owned(),
            })?;
        Ok(Self {
            actor: SmolStr::new(&caps[1]),
            rkey: SmolStr::new(&caps[2]),
        })
    }

    /// Whether the actor token is already a DID.
    pub fn has_did(&self) -> bool {
        self.actor.starts_with("did:")
    }

    /// Build the AT URI, resolving the actor through `resolver` if it is a
    /// handle. A DID is used as-is without touching the resolver.
    pub async fn to_at_uri<R>(&self, resolver: &R) -> Result<AtUri>
    where
        R: IdentityResolver,
    {
        if self.has_did() {
            tracing::debug!(did = %self.actor, "using DID from URL directly");
            return Ok(AtUri::post(&self.actor, &self.rkey)?);
        }
        let did = resolver
            .resolve_handle(&self.actor)
            .await
            .map_err(|source| SkythreadError::IdentityResolutionFailed {
                handle: self.actor.clone(),
                source,
            })?;
        tracing::debug!(handle = %self.actor, %did, "resolved handle");
        Ok(AtUri::post(did.as_str(), &self.rkey)?)
    }
}

/// Convert a web-app post URL into the AT URI of the post.
pub async fn convert<R>(url: &str, resolver: &R) -> Result<AtUri>
where
    R: IdentityResolver,
{
    BskyPostUrl::parse(url)?.to_at_uri(resolver).await
}

/// The web-app URL for a post, built from its AT URI components.
pub fn web_url(uri: &AtUri) -> String {
    let (actor, rkey) = uri.parts();
    format!("{WEB_BASE}/profile/{actor}/post/{rkey}")
}

/// What a line of user input refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An `at://` post URI, kept verbatim
    AtUri(String),
    /// A web-app URL that needs conversion
    WebUrl(String),
}

impl Target {
    /// Classify trimmed user input. `None` if it is neither an AT URI nor an
    /// `https://bsky.app/` URL.
    pub fn classify(input: &str) -> Option<Self> {
        let input = input.trim();
        if aturi::is_post_uri(input) {
            Some(Self::AtUri(input.to_owned()))
        } else if input.starts_with(WEB_BASE) {
            Some(Self::WebUrl(input.to_owned()))
        } else {
            None
        }
    }
}
