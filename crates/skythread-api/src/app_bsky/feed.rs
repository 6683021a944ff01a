pub mod get_likes;
pub mod get_post_thread;
pub mod get_quotes;
