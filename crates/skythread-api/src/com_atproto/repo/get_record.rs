use skythread_common::types::{AtUri, Data};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};
use smol_str::SmolStr;

/// Get a single record from a repository.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct GetRecord {
    /// The handle or DID of the repo
    #[builder(into)]
    pub repo: SmolStr,
    /// The NSID of the record collection
    #[builder(into)]
    pub collection: SmolStr,
    /// The Record Key
    #[builder(into)]
    pub rkey: SmolStr,
    /// The CID of the version of the record. If not specified, then return the most recent version.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub cid: std::option::Option<SmolStr>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetRecordOutput {
    pub uri: AtUri,
    #[serde(default)]
    pub cid: std::option::Option<SmolStr>,
    /// The record itself, untyped
    pub value: Data,
}

impl XrpcRequest for GetRecord {
    const NSID: &'static str = "com.atproto.repo.getRecord";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    type Output = GetRecordOutput;
}
