pub mod config;
pub mod error;
pub mod job;
pub mod persist;

pub use config::*;
pub use error::ConfigError;
pub use job::*;
