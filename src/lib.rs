pub mod app;
pub mod config;
pub mod provider;
pub mod runtime;
pub mod schema;
pub mod settings;
pub mod shared;
pub mod vault;
