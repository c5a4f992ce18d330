use crate::{DepsError, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outils externes requis par l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Ffmpeg, Tool::Ffprobe];

    /// Nom du binaire (sans suffixe plateforme)
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Localisateur de binaires externes
///
/// Ordre de recherche, le premier trouvé gagne:
/// 1. le PATH (ou le chemin de recherche injecté)
/// 2. le répertoire d'installation dédié (nom exact ou `.exe`, insensible à la casse)
/// 3. le sous-répertoire `bin` de ce même répertoire
///
/// Aucun résultat n'est mis en cache: chaque appel relance la recherche.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    install_dir: PathBuf,
    search_path: Option<OsString>,
}

impl BinaryLocator {
    pub fn new(install_dir: PathBuf) -> Self {
        Self {
            install_dir,
            search_path: None,
        }
    }

    /// Remplacer la variable PATH par un chemin de recherche explicite
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Trouver le chemin absolu d'un outil
    pub fn locate(&self, tool: Tool) -> Result<PathBuf> {
        self.locate_name(tool.name())
    }

    /// Trouver le chemin absolu d'un binaire par son nom
    pub fn locate_name(&self, name: &str) -> Result<PathBuf> {
        if let Some(path) = self.search_path_lookup(name) {
            info!("{} trouvé dans le PATH: {:?}", name, path);
            return Ok(path);
        }

        if let Some(path) = Self::scan_dir(&self.install_dir, name)? {
            info!("{} trouvé dans le répertoire d'installation: {:?}", name, path);
            return Ok(path);
        }

        if let Some(path) = Self::scan_dir(&self.install_dir.join("bin"), name)? {
            info!("{} trouvé dans {:?}/bin: {:?}", name, self.install_dir, path);
            return Ok(path);
        }

        warn!("{} introuvable (PATH et {:?})", name, self.install_dir);
        Err(DepsError::NotFound(name.to_string()))
    }

    fn search_path_lookup(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        match found {
            Ok(path) => Some(std::fs::canonicalize(&path).unwrap_or(path)),
            Err(e) => {
                debug!("{} absent du PATH: {}", name, e);
                None
            }
        }
    }

    /// Chercher un fichier nommé `name` ou `name.exe` (insensible à la casse)
    fn scan_dir(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
        if !dir.is_dir() {
            return Ok(None);
        }

        let wanted = name.to_lowercase();
        let wanted_exe = format!("{}.exe", wanted);

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let file_name = file_name.to_lowercase();
            if file_name == wanted || file_name == wanted_exe {
                candidates.push(path);
            }
        }

        // L'ordre de read_dir n'est pas garanti
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}
