pub mod get_profile;
