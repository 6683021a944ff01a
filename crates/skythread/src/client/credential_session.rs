use skythread_api::app_bsky::actor::get_profile::GetProfile;
use skythread_api::app_bsky::feed::get_likes::GetLikes;
use skythread_api::app_bsky::feed::get_post_thread::GetPostThread;
use skythread_api::app_bsky::feed::get_quotes::GetQuotes;
use skythread_api::com_atproto::repo::get_record::{GetRecord, GetRecordOutput};
use skythread_api::com_atproto::server::create_session::CreateSession;
use skythread_common::{
    AuthorizationToken,
    error::{ClientError, XrpcResult},
    http_client::HttpClient,
    types::{AtUri, Data, Did, Handle, aturi::POST_COLLECTION},
    xrpc::{CallOptions, XrpcExt, XrpcRequest},
};
use skythread_identity::resolver::{self, IdentityError, IdentityResolver};
use tokio::sync::RwLock;
use url::Url;

use crate::client::AtpSession;

/// Service id suffix of the PDS entry in a DID document.
const PDS_SERVICE_ID: &str = "#atproto_pds";
const PDS_SERVICE_TYPE: &str = "AtprotoPersonalDataServer";

/// Stateful client for an app-password session.
///
/// - Logs in against the configured service with `createSession`.
/// - Switches its base endpoint to the account's PDS when the session carries
///   a DID document, otherwise keeps talking to the login service.
/// - Attaches the access token to every subsequent call.
pub struct CredentialSession<T> {
    client: T,
    service: Url,
    /// Active session, if logged in.
    pub session: RwLock<Option<AtpSession>>,
    /// Current base endpoint (PDS); the login service when unset.
    pub endpoint: RwLock<Option<Url>>,
}

impl<T> CredentialSession<T> {
    /// Create a new, logged-out session that will authenticate against `service`.
    pub fn new(client: T, service: Url) -> Self {
        Self {
            client,
            service,
            session: RwLock::new(None),
            endpoint: RwLock::new(None),
        }
    }

    /// The service used for login.
    pub fn service(&self) -> &Url {
        &self.service
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &T {
        &self.client
    }

    /// Current base endpoint. Defaults to the login service when unset.
    pub async fn endpoint(&self) -> Url {
        self.endpoint
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.service.clone())
    }

    /// Override the current base endpoint.
    pub async fn set_endpoint(&self, endpoint: Url) {
        *self.endpoint.write().await = Some(endpoint);
    }

    /// DID and handle of the logged-in account, if any.
    pub async fn session_info(&self) -> Option<(Did, Handle)> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| (s.did.clone(), s.handle.clone()))
    }

    /// Current access token (Bearer), if logged in.
    pub async fn access_token(&self) -> Option<AuthorizationToken> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| AuthorizationToken::Bearer(s.access_jwt.clone()))
    }

    async fn call_options(&self) -> CallOptions {
        CallOptions {
            auth: self.access_token().await,
        }
    }
}

impl<T> CredentialSession<T>
where
    T: HttpClient + Send + Sync,
{
    /// Create an app-password session and activate it.
    ///
    /// `identifier` is whatever the account would type into the official app:
    /// a handle, a DID, or an email address.
    #[tracing::instrument(level = "info", skip(self, password), fields(service = %self.service))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AtpSession, ClientError> {
        let req = CreateSession::new()
            .identifier(identifier)
            .password(password)
            .build();
        let out = self
            .client
            .xrpc(self.service.clone())
            .send(&req)
            .await?
            .into_output()?;

        let pds = out.did_doc.as_ref().and_then(pds_endpoint);
        let session = AtpSession::from(out);
        match pds {
            Some(pds) => {
                tracing::debug!(%pds, "using PDS from DID document");
                *self.endpoint.write().await = Some(pds);
            }
            None => {
                tracing::debug!("no PDS in session, staying on login service");
                *self.endpoint.write().await = None;
            }
        }
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Send an authenticated request to the current endpoint and decode its output.
    pub async fn send<R>(&self, request: &R) -> XrpcResult<R::Output>
    where
        R: XrpcRequest,
    {
        let endpoint = self.endpoint().await;
        let opts = self.call_options().await;
        let resp = self
            .client
            .xrpc(endpoint)
            .with_options(opts)
            .send(request)
            .await?;
        Ok(resp.into_output()?)
    }

    /// Fetch a post record with `com.atproto.repo.getRecord`.
    ///
    /// The collection is always `app.bsky.feed.post`, whatever the URI says.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    pub async fn get_record(&self, uri: &AtUri) -> XrpcResult<GetRecordOutput> {
        let (repo, rkey) = uri.parts();
        let req = GetRecord::new()
            .repo(repo)
            .collection(POST_COLLECTION)
            .rkey(rkey)
            .build();
        self.send(&req).await
    }

    /// Fetch a profile view with `app.bsky.actor.getProfile`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_profile(&self, actor: &str) -> XrpcResult<Data> {
        self.send(&GetProfile::new().actor(actor).build()).await
    }

    /// Fetch the thread around a post with `app.bsky.feed.getPostThread`.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    pub async fn get_post_thread(&self, uri: &AtUri, depth: Option<i64>) -> XrpcResult<Data> {
        let req = GetPostThread::new().uri(uri.clone()).maybe_depth(depth).build();
        Ok(self.send(&req).await?.thread)
    }

    /// Fetch up to `limit` likes of a post with `app.bsky.feed.getLikes`.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    pub async fn get_likes(&self, uri: &AtUri, limit: i64) -> XrpcResult<Vec<Data>> {
        let req = GetLikes::new().uri(uri.clone()).limit(limit).build();
        Ok(self.send(&req).await?.likes)
    }

    /// Fetch up to `limit` quote posts of a post with `app.bsky.feed.getQuotes`.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    pub async fn get_quotes(&self, uri: &AtUri, limit: i64) -> XrpcResult<Vec<Data>> {
        let req = GetQuotes::new().uri(uri.clone()).limit(limit).build();
        Ok(self.send(&req).await?.posts)
    }
}

impl<T> IdentityResolver for CredentialSession<T>
where
    T: HttpClient + Send + Sync,
{
    async fn resolve_handle(&self, handle: &str) -> Result<Did, IdentityError> {
        let handle = Handle::new(handle)?;
        let endpoint = self.endpoint().await;
        let opts = self.call_options().await;
        resolver::resolve_handle_via(&self.client, endpoint, opts, &handle).await
    }
}

/// The PDS endpoint advertised in a DID document, if any.
pub fn pds_endpoint(did_doc: &Data) -> Option<Url> {
    did_doc
        .array_at(&["service"])?
        .iter()
        .find(|service| {
            service
                .str_at(&["id"])
                .is_some_and(|id| id.ends_with(PDS_SERVICE_ID))
                || service.str_at(&["type"]) == Some(PDS_SERVICE_TYPE)
        })
        .and_then(|service| service.str_at(&["serviceEndpoint"]))
        .and_then(|endpoint| Url::parse(endpoint).ok())
}
