/// AT Protocol URIs (`at://<authority>/<collection>/<rkey>`)
pub mod aturi;
/// Decentralized identifiers
pub mod did;
/// Human-readable, resolvable account handles
pub mod handle;
/// Shared parse errors for atproto string types
pub mod string;
/// Generic tree-structured value for untyped payloads
pub mod value;

pub use aturi::AtUri;
pub use did::Did;
pub use handle::Handle;
pub use string::AtStrError;
pub use value::Data;
