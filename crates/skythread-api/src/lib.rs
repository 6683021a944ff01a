//! Request and response bindings for the XRPC endpoints skythread uses.
//!
//! Each endpoint lives at the module path matching its NSID
//! (`com.atproto.repo.getRecord` → [`com_atproto::repo::get_record`]).
//! Requests are built with their `new()` builders and sent through any
//! [`skythread_common::xrpc::XrpcExt`] client. Outputs whose shape varies
//! between app view versions are kept as [`skythread_common::types::Data`].

pub mod app_bsky;
pub mod com_atproto;
