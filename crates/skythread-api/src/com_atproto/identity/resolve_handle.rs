use skythread_common::types::{Did, Handle};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};

/// Resolve a handle to a DID.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct ResolveHandle {
    pub handle: Handle,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolveHandleOutput {
    pub did: Did,
}

impl XrpcRequest for ResolveHandle {
    const NSID: &'static str = "com.atproto.identity.resolveHandle";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    type Output = ResolveHandleOutput;
}
