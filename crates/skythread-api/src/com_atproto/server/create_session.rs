use skythread_common::types::{Data, Did, Handle};
use skythread_common::xrpc::{XrpcMethod, XrpcRequest};
use smol_str::SmolStr;

/// Create an authentication session with an identifier and app password.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct CreateSession {
    /// Handle, DID, or email of the account
    #[builder(into)]
    pub identifier: SmolStr,
    #[builder(into)]
    pub password: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub auth_factor_token: std::option::Option<SmolStr>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionOutput {
    pub access_jwt: SmolStr,
    pub refresh_jwt: SmolStr,
    pub did: Did,
    pub handle: Handle,
    #[serde(default)]
    pub did_doc: std::option::Option<Data>,
    #[serde(default)]
    pub email: std::option::Option<SmolStr>,
    #[serde(default)]
    pub active: std::option::Option<bool>,
}

impl XrpcRequest for CreateSession {
    const NSID: &'static str = "com.atproto.server.createSession";
    const METHOD: XrpcMethod = XrpcMethod::Procedure("application/json");
    type Output = CreateSessionOutput;
}
