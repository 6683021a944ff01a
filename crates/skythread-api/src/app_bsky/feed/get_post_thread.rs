use skythread_common::types::{AtUri, Data};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};

/// Get posts in a thread.
///
/// Does not require auth, but additional metadata and filtering will be
/// applied for authed requests.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct GetPostThread {
    /// Reference (AT-URI) to post record.
    pub uri: AtUri,
    /// How many levels of reply depth should be included in response.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub depth: std::option::Option<i64>,
    /// How many levels of parent (and grandparent, etc) post to include.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub parent_height: std::option::Option<i64>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetPostThreadOutput {
    /// `threadViewPost`, `notFoundPost` or `blockedPost`, untyped
    pub thread: Data,
}

impl XrpcRequest for GetPostThread {
    const NSID: &'static str = "app.bsky.feed.getPostThread";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    type Output = GetPostThreadOutput;
}
