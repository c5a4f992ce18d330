use flixforge_common::OptionError;
use flixforge_deps::DepsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Fichier de configuration invalide {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Échec de sérialisation de la configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Binary(#[from] DepsError),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("'{0}' est un preset intégré, il ne peut être ni remplacé ni supprimé")]
    ReservedProfile(String),
}

impl ConfigError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| ConfigError::Io { context, source }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
