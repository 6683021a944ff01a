pub mod actor;
pub mod feed;
