//! Application setup
//!
//! Configuration types and layered configuration loading.

pub mod config;
pub mod loader;

pub use config::AppConfig;
pub use loader::load_config;
