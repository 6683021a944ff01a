pub mod create_session;
