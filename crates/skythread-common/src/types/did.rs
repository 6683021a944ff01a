use crate::types::string::AtStrError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de::Error};
use smol_str::SmolStr;
use std::fmt;
use std::sync::LazyLock;
use std::{ops::Deref, str::FromStr};

/// A decentralized identifier, e.g. `did:plc:z72i7hdynmk6r22z27h6tvur`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Did(SmolStr);

/// Literal prefix every DID starts with.
pub const DID_PREFIX: &str = "did:";

/// Regex for DID validation per AT Protocol spec.
///
/// Allows `%` in the identifier but prevents DIDs from ending with `:` or `%`.
/// Percent-encoding is not checked for well-formedness.
pub static DID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$").unwrap());

impl Did {
    /// Fallible constructor, validates
    pub fn new(did: impl AsRef<str>) -> Result<Self, AtStrError> {
        let did = did.as_ref();
        let did = did.strip_prefix("at://").unwrap_or(did);
        if did.len() > 2048 {
            Err(AtStrError::too_long("did", did, 2048, did.len()))
        } else if !DID_REGEX.is_match(did) {
            Err(AtStrError::regex(
                "did",
                did,
                SmolStr::new_static("invalid"),
            ))
        } else {
            Ok(Self(SmolStr::new(did)))
        }
    }

    /// True if the string carries the literal DID prefix. No further validation.
    pub fn looks_like_did(s: &str) -> bool {
        s.starts_with(DID_PREFIX)
    }

    /// The DID method, e.g. `plc` or `web`
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Did {
    type Err = AtStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: String = Deserialize::deserialize(deserializer)?;
        Self::new(value).map_err(D::Error::custom)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Did> for String {
    fn from(value: Did) -> Self {
        value.0.to_string()
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Did {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_dids() {
        assert!(Did::new("did:plc:z72i7hdynmk6r22z27h6tvur").is_ok());
        assert!(Did::new("did:web:example.com").is_ok());
        assert!(Did::new("did:method:val%20ue").is_ok());
    }

    #[test]
    fn strips_at_prefix() {
        let did = Did::new("at://did:plc:foo").unwrap();
        assert_eq!(did.as_str(), "did:plc:foo");
        assert_eq!(did.method(), "plc");
    }

    #[test]
    fn invalid_dids() {
        assert!(Did::new("did:").is_err());
        assert!(Did::new("did:plc:").is_err());
        assert!(Did::new("did:PLC:foo").is_err());
        assert!(Did::new("alice.bsky.social").is_err());
    }

    #[test]
    fn prefix_check_is_literal() {
        assert!(Did::looks_like_did("did:anything"));
        assert!(!Did::looks_like_did("alice.bsky.social"));
    }
}
