pub mod app;
pub mod artifact;
pub mod config;
pub mod handler;
pub mod synthesis;
pub mod version;
