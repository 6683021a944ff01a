use skythread_common::types::{AtUri, Data};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};
use smol_str::SmolStr;

/// Get like records which reference a subject (by AT-URI and CID).
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct GetLikes {
    /// AT-URI of the subject (eg, a post record).
    pub uri: AtUri,
    /// CID of the subject record (aka, specific version of record), to filter likes.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub cid: std::option::Option<SmolStr>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub limit: std::option::Option<i64>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub cursor: std::option::Option<SmolStr>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetLikesOutput {
    pub uri: AtUri,
    #[serde(default)]
    pub cursor: std::option::Option<SmolStr>,
    /// `{actor, createdAt, indexedAt}` entries, untyped
    pub likes: Vec<Data>,
}

impl XrpcRequest for GetLikes {
    const NSID: &'static str = "app.bsky.feed.getLikes";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    type Output = GetLikesOutput;
}
