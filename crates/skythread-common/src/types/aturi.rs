use std::fmt;
use std::{ops::Deref, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de::Error};
use smol_str::{SmolStr, format_smolstr};

use crate::types::string::AtStrError;

/// Scheme prefix every AT URI starts with.
pub const AT_URI_PREFIX: &str = "at://";

/// Collection NSID for Bluesky posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

const MAX_AT_URI_LEN: usize = 8192;

/// An AT Protocol URI addressing a single record.
///
/// The shape is fixed: `at://<authority>/<collection>/<rkey>`. The authority is
/// normally a DID, but a handle is accepted too since that is what people paste.
/// Anything after the record key is kept in the string but ignored by the
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct AtUri(SmolStr);

impl AtUri {
    /// Fallible constructor, validates
    pub fn new(uri: impl AsRef<str>) -> Result<Self, AtStrError> {
        let uri = uri.as_ref();
        split(uri)?;
        Ok(Self(SmolStr::new(uri)))
    }

    /// Assemble a URI from its three components.
    pub fn from_parts(authority: &str, collection: &str, rkey: &str) -> Result<Self, AtStrError> {
        Self::new(format_smolstr!("{AT_URI_PREFIX}{authority}/{collection}/{rkey}"))
    }

    /// Shorthand for a post URI in the `app.bsky.feed.post` collection.
    pub fn post(authority: &str, rkey: &str) -> Result<Self, AtStrError> {
        Self::from_parts(authority, POST_COLLECTION, rkey)
    }

    /// The repo the record lives in (DID or handle).
    pub fn authority(&self) -> &str {
        self.segments()[0]
    }

    /// The collection NSID.
    pub fn collection(&self) -> &str {
        self.segments()[1]
    }

    /// The record key.
    pub fn rkey(&self) -> &str {
        self.segments()[2]
    }

    /// `(actor_id, record_key)`, the two components needed to fetch the record.
    pub fn parts(&self) -> (&str, &str) {
        let [authority, _, rkey] = self.segments();
        (authority, rkey)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> [&str; 3] {
        // validated on construction
        split(&self.0).unwrap_or(["", "", ""])
    }
}

/// True if the input is an `at://` URI pointing into the post collection.
///
/// This is the cheap check used to decide whether user input can skip URL
/// conversion; it does not validate the rest of the URI.
pub fn is_post_uri(input: &str) -> bool {
    input.starts_with(AT_URI_PREFIX) && input.contains(&format!("/{POST_COLLECTION}/"))
}

fn split(uri: &str) -> Result<[&str; 3], AtStrError> {
    if uri.len() > MAX_AT_URI_LEN {
        return Err(AtStrError::too_long("at-uri-scheme", uri, MAX_AT_URI_LEN, uri.len()));
    }
    let Some(rest) = uri.strip_prefix(AT_URI_PREFIX) else {
        return Err(AtStrError::missing_from(
            "at-uri-scheme",
            uri,
            "`at://` scheme prefix",
            (0, 0),
        ));
    };
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() < 3 {
        return Err(AtStrError::too_short("at-uri-scheme", uri, 3, parts.len()));
    }
    let mut offset = AT_URI_PREFIX.len();
    for (part, name) in parts.iter().zip(["authority", "collection", "record key"]) {
        if part.is_empty() {
            return Err(AtStrError::missing_from("at-uri-scheme", uri, name, (offset, 0)));
        }
        offset += part.len() + 1;
    }
    Ok([parts[0], parts[1], parts[2]])
}

impl FromStr for AtUri {
    type Err = AtStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for AtUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: String = Deserialize::deserialize(deserializer)?;
        Self::new(value).map_err(D::Error::custom)
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AtUri> for String {
    fn from(value: AtUri) -> Self {
        value.0.to_string()
    }
}

impl AsRef<str> for AtUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for AtUri {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}
