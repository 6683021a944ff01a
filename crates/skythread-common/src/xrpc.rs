//! # Stateless XRPC utilities and request/response mapping
//!
//! Requests go to `<base>/xrpc/<nsid>`: queries as GET with a form-encoded
//! query string, procedures as POST with a JSON body.
//!
//! Responses are mapped in two steps:
//! - [`process_response`] rejects statuses that cannot carry an XRPC error
//!   body (anything non-2xx other than 400 and 401) as `ClientError::Http`.
//! - [`Response::parse`] decodes the typed output, or the `{error, message}`
//!   body, turning `ExpiredToken`/`InvalidToken` into [`AuthError`]s.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use http::{
    HeaderValue, Method, Request, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use url::Url;

use crate::AuthorizationToken;
use crate::error::{AuthError, DecodeError, HttpError, TransportError, XrpcResult};
use crate::http_client::HttpClient;

/// A request that could not be serialized
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Parameters did not fit a query string
    #[error("could not encode query parameters: {0}")]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Input did not serialize to JSON
    #[error("could not encode request body: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// How an endpoint is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrpcMethod {
    /// GET, parameters in the query string
    Query,
    /// POST, with the MIME type of the body
    Procedure(&'static str),
}

impl XrpcMethod {
    /// The HTTP method this maps to.
    pub fn http_method(self) -> Method {
        match self {
            Self::Query => Method::GET,
            Self::Procedure(_) => Method::POST,
        }
    }
}

/// A typed XRPC call: the parameters (queries) or input (procedures), plus
/// the endpoint's NSID and output type.
///
/// Generated bindings in `skythread-api` implement this for each endpoint.
pub trait XrpcRequest: Serialize {
    /// Endpoint NSID, e.g. `app.bsky.feed.getPostThread`
    const NSID: &'static str;

    /// Query or procedure
    const METHOD: XrpcMethod;

    /// Decoded from a 2xx body
    type Output: DeserializeOwned;

    /// Procedure body bytes. JSON unless overridden.
    fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Options applied to a single call.
#[derive(Debug, Default, Clone)]
pub struct CallOptions {
    /// Authorization to send, if any.
    pub auth: Option<AuthorizationToken>,
}

/// Adds [`xrpc`](XrpcExt::xrpc) to every [`HttpClient`].
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use skythread_common::xrpc::XrpcExt;
///
/// let client = reqwest::Client::new();
/// let appview = url::Url::parse("https://public.api.bsky.app")?;
/// let call = client.xrpc(appview);
/// // call.send(&request).await?.into_output()?
/// # let _ = call;
/// # Ok(())
/// # }
/// ```
pub trait XrpcExt: HttpClient {
    /// Start a call against the service at `base`.
    fn xrpc(&self, base: Url) -> XrpcCall<'_, Self>
    where
        Self: Sized,
    {
        XrpcCall {
            client: self,
            base,
            opts: CallOptions::default(),
        }
    }
}

impl<T: HttpClient> XrpcExt for T {}

/// One pending call; consumed by [`XrpcCall::send`].
pub struct XrpcCall<'a, C: HttpClient> {
    client: &'a C,
    base: Url,
    opts: CallOptions,
}

impl<'a, C: HttpClient> XrpcCall<'a, C> {
    /// Send `token` as the bearer.
    pub fn auth(mut self, token: AuthorizationToken) -> Self {
        self.opts.auth = Some(token);
        self
    }

    /// Use `opts` instead of the defaults.
    pub fn with_options(mut self, opts: CallOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Send `request` and buffer the response.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(nsid = R::NSID, base = %self.base)))]
    pub async fn send<R>(self, request: &R) -> XrpcResult<Response<R>>
    where
        R: XrpcRequest,
    {
        let http_request = build_http_request(&self.base, request, &self.opts)?;
        let http_response = self
            .client
            .send_http(http_request)
            .await
            .map_err(TransportError::from_client)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(status = %http_response.status(), "response");
        process_response(http_response)
    }
}

/// Split off responses that cannot carry an XRPC error body.
///
/// 400 and 401 are passed through for [`Response::parse`] to decode.
#[inline]
pub fn process_response<R>(http_response: http::Response<Vec<u8>>) -> XrpcResult<Response<R>>
where
    R: XrpcRequest,
{
    let status = http_response.status();
    let body = Bytes::from(http_response.into_body());
    if status.is_success() || matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
        Ok(Response::new(body, status))
    } else {
        Err(HttpError {
            status,
            body: (!body.is_empty()).then_some(body),
        }
        .into())
    }
}

/// Build the HTTP request for an XRPC call against `base`.
pub fn build_http_request<R>(
    base: &Url,
    req: &R,
    opts: &CallOptions,
) -> XrpcResult<Request<Vec<u8>>>
where
    R: XrpcRequest,
{
    let mut url = base.clone();
    let path = format!("{}/xrpc/{}", url.path().trim_end_matches('/'), R::NSID);
    url.set_path(&path);

    let body = match R::METHOD {
        XrpcMethod::Query => {
            let qs = serde_html_form::to_string(req).map_err(EncodeError::from)?;
            url.set_query((!qs.is_empty()).then_some(qs.as_str()));
            Vec::new()
        }
        XrpcMethod::Procedure(_) => {
            url.set_query(None);
            req.encode_body()?
        }
    };

    let mut builder = Request::builder()
        .method(R::METHOD.http_method())
        .uri(url.as_str())
        .header(ACCEPT, "application/json");
    if let XrpcMethod::Procedure(encoding) = R::METHOD {
        builder = builder.header(CONTENT_TYPE, encoding);
    }
    if let Some(AuthorizationToken::Bearer(token)) = &opts.auth {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::InvalidRequest(format!("bad access token: {e}")))?;
        builder = builder.header(AUTHORIZATION, value);
    }

    Ok(builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?)
}

/// A buffered response, decoded on demand into `R::Output`.
pub struct Response<R>
where
    R: XrpcRequest,
{
    body: Bytes,
    status: StatusCode,
    _request: PhantomData<fn() -> R>,
}

impl<R> Response<R>
where
    R: XrpcRequest,
{
    /// Wrap a buffered body.
    pub fn new(body: Bytes, status: StatusCode) -> Self {
        Self {
            body,
            status,
            _request: PhantomData,
        }
    }

    /// Status the service answered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the output, or the error the service reported.
    pub fn parse(&self) -> Result<R::Output, XrpcError> {
        if self.status.is_success() {
            return Ok(serde_json::from_slice(&self.body).map_err(DecodeError::from)?);
        }
        let body = match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => body,
            Err(_) if self.status == StatusCode::UNAUTHORIZED => {
                return Err(AuthError::NotAuthenticated.into());
            }
            Err(e) => return Err(DecodeError::from(e).into()),
        };
        match body.error.as_str() {
            "ExpiredToken" => Err(AuthError::TokenExpired.into()),
            "InvalidToken" => Err(AuthError::InvalidToken.into()),
            _ => Err(XrpcError::Generic(GenericXrpcError {
                error: body.error,
                message: body.message,
                nsid: R::NSID,
                status: self.status,
            })),
        }
    }

    /// Decode the output, consuming the response.
    pub fn into_output(self) -> Result<R::Output, XrpcError> {
        self.parse()
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: SmolStr,
    #[serde(default)]
    message: Option<SmolStr>,
}

/// An `{error, message}` body, with the endpoint and status it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericXrpcError {
    /// Error name, e.g. `InvalidRequest` or `RecordNotFound`
    pub error: SmolStr,
    /// Human-readable detail, when the service sent one
    pub message: Option<SmolStr>,
    /// Endpoint that failed
    pub nsid: &'static str,
    /// HTTP status of the response
    pub status: StatusCode,
}

impl fmt::Display for GenericXrpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        write!(f, " ({}, HTTP {})", self.nsid, self.status.as_u16())
    }
}

impl std::error::Error for GenericXrpcError {}

/// Errors carried in an XRPC response body
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum XrpcError {
    /// `ExpiredToken`, `InvalidToken`, or a bare 401
    #[error("{0}")]
    #[diagnostic(code(skythread_common::xrpc::auth))]
    Auth(#[from] AuthError),

    /// Any other named error from the endpoint
    #[error("{0}")]
    #[diagnostic(code(skythread_common::xrpc::generic))]
    Generic(GenericXrpcError),

    /// A body that matched neither the output nor the error shape
    #[error("{0}")]
    #[diagnostic(code(skythread_common::xrpc::decode))]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::types::value::Data;

    #[derive(Serialize)]
    struct Ping {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        depth: Option<u32>,
    }

    impl XrpcRequest for Ping {
        const NSID: &'static str = "com.example.ping";
        const METHOD: XrpcMethod = XrpcMethod::Query;
        type Output = Data;
    }

    #[derive(Serialize)]
    struct Login {
        identifier: String,
    }

    impl XrpcRequest for Login {
        const NSID: &'static str = "com.example.login";
        const METHOD: XrpcMethod = XrpcMethod::Procedure("application/json");
        type Output = Data;
    }

    fn respond(status: u16, body: &[u8]) -> http::Response<Vec<u8>> {
        http::Response::builder()
            .status(status)
            .body(body.to_vec())
            .unwrap()
    }

    #[test]
    fn query_builds_get_with_query_string() {
        let base = Url::parse("https://pds.example/").unwrap();
        let req = Ping {
            uri: "at://did:plc:abc/app.bsky.feed.post/1".into(),
            depth: Some(1),
        };
        let opts = CallOptions {
            auth: Some(AuthorizationToken::Bearer("tok".into())),
        };
        let http = build_http_request(&base, &req, &opts).unwrap();
        assert_eq!(http.method(), Method::GET);
        let uri = http.uri().to_string();
        assert!(uri.starts_with("https://pds.example/xrpc/com.example.ping?"));
        assert!(uri.contains("uri=at%3A%2F%2Fdid%3Aplc%3Aabc%2Fapp.bsky.feed.post%2F1"));
        assert!(uri.contains("depth=1"));
        assert_eq!(http.headers().get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert!(http.body().is_empty());
    }

    #[test]
    fn procedure_builds_json_post() {
        let base = Url::parse("https://pds.example").unwrap();
        let req = Login {
            identifier: "alice.test".into(),
        };
        let http = build_http_request(&base, &req, &CallOptions::default()).unwrap();
        assert_eq!(http.method(), Method::POST);
        assert_eq!(http.uri().to_string(), "https://pds.example/xrpc/com.example.login");
        assert_eq!(http.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(http.headers().get(AUTHORIZATION).is_none());
        let body: serde_json::Value = serde_json::from_slice(http.body()).unwrap();
        assert_eq!(body["identifier"], "alice.test");
    }

    #[test]
    fn bad_request_parses_as_generic_error() {
        let resp = process_response::<Ping>(respond(
            400,
            br#"{"error":"NotFound","message":"Post not found"}"#,
        ))
        .unwrap();
        match resp.parse() {
            Err(XrpcError::Generic(e)) => {
                assert_eq!(e.error, "NotFound");
                assert_eq!(e.nsid, "com.example.ping");
                assert_eq!(e.status, StatusCode::BAD_REQUEST);
                assert_eq!(
                    e.to_string(),
                    "NotFound: Post not found (com.example.ping, HTTP 400)"
                );
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn expired_token_maps_to_auth_error() {
        let resp = process_response::<Ping>(respond(400, br#"{"error":"ExpiredToken"}"#)).unwrap();
        assert!(matches!(
            resp.parse(),
            Err(XrpcError::Auth(AuthError::TokenExpired))
        ));
    }

    #[test]
    fn bare_unauthorized_is_not_authenticated() {
        let resp = process_response::<Ping>(respond(401, b"")).unwrap();
        assert!(matches!(
            resp.parse(),
            Err(XrpcError::Auth(AuthError::NotAuthenticated))
        ));
    }

    #[test]
    fn server_errors_surface_as_http_errors() {
        match process_response::<Ping>(respond(502, b"bad gateway")) {
            Err(ClientError::Http(e)) => {
                assert_eq!(e.status, StatusCode::BAD_GATEWAY);
                assert_eq!(e.body.as_deref(), Some(&b"bad gateway"[..]));
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn success_decodes_output() {
        let resp = process_response::<Ping>(respond(200, br#"{"ok":true}"#)).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let out = resp.into_output().unwrap();
        assert_eq!(out.get("ok").and_then(Data::as_bool), Some(true));
    }
}
