//! Credentials file and runtime settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use smol_str::SmolStr;
use url::Url;

use crate::error::{Result, SkythreadError};

/// Login service used when neither the command line nor the credentials file
/// names one.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";
/// How many likes and quotes to show per post by default.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// On-disk shape of the credentials file. Every key is optional here so that
/// missing fields can be reported by name instead of as a JSON error.
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    username: Option<String>,
    password: Option<String>,
    bluesky_url: Option<String>,
    service: Option<String>,
}

/// Validated contents of a credentials file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Handle, DID or email to log in with
    pub username: SmolStr,
    /// App password
    pub password: SmolStr,
    /// Post to open right after login
    pub bluesky_url: Option<String>,
    /// Login service override
    pub service: Option<Url>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bluesky_url", &self.bluesky_url)
            .field("service", &self.service)
            .finish()
    }
}

impl Credentials {
    /// Read and validate the credentials file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| invalid(path, e.to_string()))?;
        Self::from_json(path, &raw)
    }

    /// Validate credentials from a JSON string; `path` is only used in errors.
    pub fn from_json(path: impl AsRef<Path>, raw: &str) -> Result<Self> {
        let path = path.as_ref();
        let file: CredentialsFile =
            serde_json::from_str(raw).map_err(|e| invalid(path, e.to_string()))?;

        let (Some(username), Some(password)) = (
            file.username.filter(|s| !s.is_empty()),
            file.password.filter(|s| !s.is_empty()),
        ) else {
            return Err(invalid(
                path,
                "missing required authentication fields (username, password)".to_owned(),
            ));
        };

        let service = file
            .service
            .filter(|s| !s.is_empty())
            .map(|s| Url::parse(&s).map_err(|e| invalid(path, format!("invalid service URL {s}: {e}"))))
            .transpose()?;

        Ok(Self {
            username: username.into(),
            password: password.into(),
            bluesky_url: file.bluesky_url.filter(|s| !s.trim().is_empty()),
            service,
        })
    }
}

fn invalid(path: &Path, reason: String) -> SkythreadError {
    SkythreadError::CredentialsInvalid {
        path: path.to_path_buf(),
        reason,
    }
}

/// Settings that shape a session, merged from the command line and the
/// credentials file.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct AppConfig {
    /// Service to log in against
    #[builder(default = default_service())]
    pub service: Url,
    /// Maximum likes listed per post
    #[builder(default = DEFAULT_LIST_LIMIT)]
    pub likes_limit: i64,
    /// Maximum quote posts listed per post
    #[builder(default = DEFAULT_LIST_LIMIT)]
    pub quotes_limit: i64,
    /// Emit OSC 8 hyperlinks
    #[builder(default = true)]
    pub hyperlinks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_service() -> Url {
    Url::parse(DEFAULT_SERVICE).unwrap_or_else(|_| unreachable!("default service URL is valid"))
}

/// Command-line settings, before the credentials file is known.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Credentials file; prompted for when absent
    pub credentials: Option<PathBuf>,
    /// `--service` override
    pub service: Option<Url>,
    pub likes_limit: Option<i64>,
    pub quotes_limit: Option<i64>,
    pub hyperlinks: bool,
}

impl LaunchOptions {
    /// Merge with the credentials file. The command line wins over the file.
    pub fn resolve(&self, credentials: &Credentials) -> AppConfig {
        AppConfig::builder()
            .maybe_service(
                self.service
                    .clone()
                    .or_else(|| credentials.service.clone()),
            )
            .maybe_likes_limit(self.likes_limit)
            .maybe_quotes_limit(self.quotes_limit)
            .hyperlinks(self.hyperlinks)
            .build()
    }
}
