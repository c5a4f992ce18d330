use serde::{Deserialize, Serialize};

/// Piste audio retenue pour la sortie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Index du stream dans la source
    pub index: usize,
    /// Position dans la sortie
    pub outdex: usize,
    pub codec: String,
    pub language: String,
    pub title: String,
    /// Nombre de canaux après downmix (None = conserver)
    pub downmix: Option<u32>,
    /// Codec de conversion (None = copie du stream)
    pub conversion_codec: Option<String>,
    pub conversion_bitrate: Option<String>,
}

impl AudioTrack {
    pub fn is_passthrough(&self) -> bool {
        self.conversion_codec.is_none()
    }
}

/// Piste de sous-titres retenue pour la sortie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub index: usize,
    pub outdex: usize,
    pub language: String,
    /// Disposition ffmpeg ("default", "forced", ...)
    pub disposition: String,
    /// Incruster dans l'image plutôt que copier le stream
    pub burn_in: bool,
}

/// Invocation concrète d'un outil externe pour réaliser le job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionCommand {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    /// Étape interne (ex: extraction) plutôt qu'encodage utilisateur
    pub internal: bool,
}
