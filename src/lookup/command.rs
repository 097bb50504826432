pub mod get_record_cmd;
pub mod lookup_isbn_cmd;
pub mod lookup_isbn_sources_cmd;
pub mod search_catalog_cmd;
