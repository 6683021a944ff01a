//! # skythread
//!
//! Read Bluesky posts and walk their threads from a terminal.
//!
//! Log in with an app password, hand it a `https://bsky.app/profile/.../post/...`
//! URL or an `at://` URI, and it prints the post with its author, images,
//! thread context, replies, likes and quotes. From there you can step to the
//! parent, the root, or any reply.
//!
//! The pieces are usable on their own:
//!
//! - [`convert`] turns web URLs into AT URIs, resolving handles on the way.
//! - [`extract`] reads text, images, reply links and timestamps out of
//!   loosely shaped post payloads.
//! - [`client::CredentialSession`] is a small authenticated XRPC client.
//! - [`navigator::Navigator`] renders posts and runs the command loop over any
//!   [`render::Console`].
//!
//! ```no_run
//! # async fn demo() -> miette::Result<()> {
//! use skythread::client::CredentialSession;
//! use skythread::convert::convert;
//!
//! let service = url::Url::parse("https://bsky.social").map_err(|e| miette::miette!("{e}"))?;
//! let session = CredentialSession::new(reqwest::Client::new(), service);
//! session
//!     .login("alice.bsky.social", "app-password")
//!     .await
//!     .map_err(skythread::SkythreadError::LoginFailed)?;
//! let uri = convert("https://bsky.app/profile/alice.bsky.social/post/3k2a", &session).await?;
//! let record = session
//!     .get_record(&uri)
//!     .await
//!     .map_err(|e| miette::miette!("{e}"))?;
//! println!("{}", skythread::extract::extract_text(&record.value));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod navigator;
pub mod render;

pub use error::{Result, SkythreadError};
pub use skythread_api as api;
pub use skythread_common::types;
pub use skythread_identity as identity;
