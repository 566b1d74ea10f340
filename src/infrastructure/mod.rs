// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod figure_document;
pub mod http_data_source;
pub mod preference_file;
