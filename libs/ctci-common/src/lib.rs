pub mod config;
pub mod error;
pub mod fixture;
pub mod types;
