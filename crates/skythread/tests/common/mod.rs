#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io::{Cursor, Write};
use std::sync::Arc;

use serde_json::{Value, json};
use skythread::config::LaunchOptions;
use skythread::render::Console;
use skythread_common::http_client::HttpClient;
use tokio::sync::Mutex;

pub const ROOT: &str = "at://did:plc:alice/app.bsky.feed.post/root1";
pub const BOB: &str = "at://did:plc:bob/app.bsky.feed.post/reply1";
pub const MINE: &str = "at://did:plc:me/app.bsky.feed.post/reply2";
pub const GONE: &str = "at://did:plc:gone/app.bsky.feed.post/x";

type Handler = dyn Fn(&str, &HashMap<String, String>) -> (u16, Value) + Send + Sync;

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Call {
    pub nsid: String,
    pub host: String,
    pub query: HashMap<String, String>,
    pub auth: Option<String>,
    pub body: Value,
}

/// HTTP client that answers XRPC calls from a routing function and records
/// every request.
#[derive(Clone)]
pub struct MockClient {
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<Call>>>,
}

impl MockClient {
    pub fn new(
        handler: impl Fn(&str, &HashMap<String, String>) -> (u16, Value) + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            log: Default::default(),
        }
    }

    /// A client backed by the fixture thread below.
    pub fn world() -> Self {
        Self::new(world)
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.log.lock().await.clone()
    }

    pub async fn calls_to(&self, nsid: &str) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.nsid == nsid)
            .collect()
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
    {
        let handler = self.handler.clone();
        let log = self.log.clone();
        async move {
            let url = url::Url::parse(&request.uri().to_string()).unwrap();
            let nsid = url.path().trim_start_matches("/xrpc/").to_owned();
            let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let auth = request
                .headers()
                .get(http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = if request.body().is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(request.body()).unwrap()
            };
            let (status, response) = (*handler)(&nsid, &query);
            log.lock().await.push(Call {
                nsid,
                host: url.host_str().unwrap_or_default().to_owned(),
                query,
                auth,
                body,
            });
            Ok(http::Response::builder()
                .status(status)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&response).unwrap())
                .unwrap())
        }
    }
}

pub fn session_output() -> Value {
    json!({
        "accessJwt": "access-token",
        "refreshJwt": "refresh-token",
        "did": "did:plc:me",
        "handle": "me.test",
        "didDoc": {
            "id": "did:plc:me",
            "service": [{
                "id": "#atproto_pds",
                "type": "AtprotoPersonalDataServer",
                "serviceEndpoint": "https://pds.example"
            }]
        }
    })
}

fn post_view(uri: &str, did: &str, handle: &str, text: &str, at: &str) -> Value {
    json!({
        "uri": uri,
        "cid": "bafypost",
        "author": { "did": did, "handle": handle },
        "record": { "$type": "app.bsky.feed.post", "text": text, "createdAt": at },
        "indexedAt": at
    })
}

fn record(uri: &str) -> Option<Value> {
    match uri {
        ROOT => Some(json!({
            "$type": "app.bsky.feed.post",
            "text": "hello from alice",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "embed": {
                "$type": "app.bsky.embed.images",
                "images": [{
                    "alt": "a cat",
                    "image": { "$type": "blob", "ref": { "$link": "bafkreicat" }, "mimeType": "image/jpeg", "size": 1000 }
                }]
            }
        })),
        BOB => Some(json!({
            "$type": "app.bsky.feed.post",
            "text": "bob agrees",
            "createdAt": "2024-01-02T00:00:00.000Z",
            "reply": {
                "root": { "uri": ROOT, "cid": "bafypost" },
                "parent": { "uri": ROOT, "cid": "bafypost" }
            }
        })),
        MINE => Some(json!({
            "$type": "app.bsky.feed.post",
            "text": "",
            "createdAt": "2024-01-03T00:00:00.000Z",
            "reply": {
                "root": { "uri": ROOT, "cid": "bafypost" },
                "parent": { "uri": BOB, "cid": "bafypost" }
            }
        })),
        _ => None,
    }
}

fn thread(uri: &str) -> Option<Value> {
    let root = post_view(ROOT, "did:plc:alice", "alice.test", "hello from alice", "2024-01-01T00:00:00.000Z");
    let bob = post_view(BOB, "did:plc:bob", "bob.test", "bob agrees", "2024-01-02T00:00:00.000Z");
    let mine = post_view(MINE, "did:plc:me", "me.test", "my reply via appview", "2024-01-03T00:00:00.000Z");
    match uri {
        ROOT => Some(json!({
            "$type": "app.bsky.feed.defs#threadViewPost",
            "post": root,
            "replies": [{ "$type": "app.bsky.feed.defs#threadViewPost", "post": bob }]
        })),
        BOB => Some(json!({
            "$type": "app.bsky.feed.defs#threadViewPost",
            "post": bob,
            "parent": { "$type": "app.bsky.feed.defs#threadViewPost", "post": root },
            "replies": [
                { "$type": "app.bsky.feed.defs#threadViewPost", "post": mine },
                { "$type": "app.bsky.feed.defs#notFoundPost", "uri": GONE, "notFound": true }
            ]
        })),
        MINE => Some(json!({
            "$type": "app.bsky.feed.defs#threadViewPost",
            "post": mine,
            "parent": { "$type": "app.bsky.feed.defs#threadViewPost", "post": bob },
            "replies": []
        })),
        _ => None,
    }
}

fn profile(actor: &str) -> Option<Value> {
    match actor {
        "did:plc:alice" => Some(json!({ "did": actor, "handle": "alice.test", "displayName": "Alice" })),
        "did:plc:bob" => Some(json!({ "did": actor, "handle": "bob.test" })),
        "did:plc:me" => Some(json!({ "did": actor, "handle": "me.test" })),
        _ => None,
    }
}

fn bad_request(error: &str, message: &str) -> (u16, Value) {
    (400, json!({ "error": error, "message": message }))
}

/// Routes for a three-post thread: alice's root, bob's reply to it, and the
/// logged-in account's reply to bob.
pub fn world(nsid: &str, q: &HashMap<String, String>) -> (u16, Value) {
    match nsid {
        "com.atproto.server.createSession" => (200, session_output()),
        "com.atproto.identity.resolveHandle" => match q.get("handle").map(String::as_str) {
            Some("alice.test") => (200, json!({ "did": "did:plc:alice" })),
            _ => bad_request("HandleNotFound", "Unable to resolve handle"),
        },
        "com.atproto.repo.getRecord" => {
            let uri = format!("at://{}/{}/{}", q["repo"], q["collection"], q["rkey"]);
            match record(&uri) {
                Some(value) => (200, json!({ "uri": uri, "cid": "bafypost", "value": value })),
                None => bad_request("RecordNotFound", "Could not locate record"),
            }
        }
        "app.bsky.actor.getProfile" => match profile(&q["actor"]) {
            Some(p) => (200, p),
            None => bad_request("InvalidRequest", "Profile not found"),
        },
        "app.bsky.feed.getPostThread" => match thread(&q["uri"]) {
            Some(t) => (200, json!({ "thread": t })),
            None => bad_request("NotFound", "Post not found"),
        },
        "app.bsky.feed.getLikes" => {
            let likes = if q["uri"] == ROOT {
                json!([{
                    "actor": { "did": "did:plc:carol", "handle": "carol.test" },
                    "createdAt": "2024-05-01T00:00:00.000Z",
                    "indexedAt": "2024-05-01T00:00:01.000Z"
                }])
            } else {
                json!([])
            };
            (200, json!({ "uri": q["uri"], "likes": likes }))
        }
        "app.bsky.feed.getQuotes" => {
            let posts = if q["uri"] == ROOT {
                json!([{
                    "uri": "at://did:plc:dave/app.bsky.feed.post/q1",
                    "cid": "bafyquote",
                    "author": { "did": "did:plc:dave", "handle": "dave.test", "displayName": "Dave" },
                    "record": { "text": "look at this", "createdAt": "2024-06-01T00:00:00.000Z" },
                    "indexedAt": "2024-06-01T00:00:00.000Z"
                }])
            } else {
                json!([])
            };
            (200, json!({ "uri": q["uri"], "posts": posts }))
        }
        _ => (501, json!({ "error": "MethodNotImplemented" })),
    }
}

pub fn credentials_file(contents: Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

/// Run a whole session with scripted input; returns the result and everything
/// printed.
pub async fn run_session(
    client: MockClient,
    credentials: Value,
    options: LaunchOptions,
    input: impl AsRef<[u8]>,
) -> (skythread::Result<()>, String) {
    let file = credentials_file(credentials);
    let options = LaunchOptions {
        credentials: Some(file.path().to_path_buf()),
        ..options
    };
    let mut console = Console::new(Cursor::new(input.as_ref().to_vec()), Vec::new(), false);
    let result = skythread::app::run(client, options, &mut console).await;
    let output = String::from_utf8(console.into_output()).unwrap();
    (result, output)
}
