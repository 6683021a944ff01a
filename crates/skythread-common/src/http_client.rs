//! Minimal HTTP client abstraction shared across crates.
//!
//! Everything above this layer speaks `http` types, so tests can swap in a
//! canned client and the binary can use [`reqwest`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

/// Sends one raw HTTP request and returns the whole response.
#[trait_variant::make(Send)]
pub trait HttpClient {
    /// Error type returned by the HTTP client
    type Error: std::error::Error + Display + Send + Sync + 'static;

    /// Send an HTTP request and buffer the response body.
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>>;
}

#[cfg(feature = "reqwest-client")]
impl HttpClient for reqwest::Client {
    type Error = reqwest::Error;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
        let resp = self.execute(reqwest::Request::try_from(request)?).await?;

        let mut out = http::Response::new(Vec::new());
        *out.status_mut() = resp.status();
        *out.version_mut() = resp.version();
        *out.headers_mut() = resp.headers().clone();
        *out.body_mut() = resp.bytes().await?.to_vec();
        Ok(out)
    }
}

impl<T: HttpClient + Sync> HttpClient for Arc<T> {
    type Error = T::Error;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
    {
        self.as_ref().send_http(request)
    }
}
