pub mod config;
pub mod credentials;
pub mod lambda_structure;
pub mod relay;
pub mod result;
pub mod table_mapping;
pub mod webhook;
