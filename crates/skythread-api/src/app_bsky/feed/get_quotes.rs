use skythread_common::types::{AtUri, Data};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};
use smol_str::SmolStr;

/// Get a list of quotes for a given post.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct GetQuotes {
    /// Reference (AT-URI) of post record
    pub uri: AtUri,
    /// If supplied, filters to quotes of specific version (by CID) of the post record.
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
pub struct GetQuotesOutput {
    pub uri: AtUri,
    #[serde(default)]
    pub cid: std::option::Option<SmolStr>,
    #[serde(default)]
    pub cursor: std::option::Option<SmolStr>,
    /// `app.bsky.feed.defs#postView` entries, untyped
    pub posts: Vec<Data>,
}

impl XrpcRequest for GetQuotes {
    const NSID: &'static str = "app.bsky.feed.getQuotes";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    type Output = GetQuotesOutput;
}
