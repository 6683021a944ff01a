use skythread_common::types::Data;
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};
use smol_str::SmolStr;

/// Get detailed profile view of an actor.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct GetProfile {
    /// Handle or DID of account to fetch profile of.
    #[builder(into)]
    pub actor: SmolStr,
}

impl XrpcRequest for GetProfile {
    const NSID: &'static str = "app.bsky.actor.getProfile";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    /// `app.bsky.actor.defs#profileViewDetailed`, untyped
    type Output = Data;
}
