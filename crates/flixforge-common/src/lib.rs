pub mod types;
pub mod config;

pub use types::*;
pub use config::*;
