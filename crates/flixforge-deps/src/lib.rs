pub mod locator;

pub use locator::{BinaryLocator, Tool};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepsError {
    #[error("Binaire introuvable: {0}")]
    NotFound(String),

    #[error("Erreur d'I/O: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DepsError>;
