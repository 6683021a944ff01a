pub mod get_record;
