pub mod attachments;
pub mod auth_service;
pub mod catalog_cache;
pub mod knowledge;
pub mod process_tree;
pub mod prompt;
pub mod read_model;
