use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Chemins de l'application
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Répertoire de données (~/.local/share/FlixForge/)
    pub data_dir: PathBuf,
    /// Fichier de configuration utilisateur
    pub config_file: PathBuf,
    /// Répertoire de travail par défaut des jobs
    pub work_dir: PathBuf,
    /// Répertoire d'installation dédié de ffmpeg/ffprobe (~/.local/share/FFmpeg/)
    pub tools_dir: PathBuf,
}

impl AppPaths {
    /// Créer les chemins de l'application
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir()
            .context("Impossible de déterminer le répertoire de données utilisateur")?;
        Ok(Self::with_base(&base))
    }

    /// Chemins enracinés dans un répertoire arbitraire (installation portable, tests)
    pub fn with_base(base: &Path) -> Self {
        let data_dir = base.join("FlixForge");
        Self {
            config_file: data_dir.join("flixforge.toml"),
            work_dir: data_dir.clone(),
            tools_dir: base.join("FFmpeg"),
            data_dir,
        }
    }

    /// Créer les répertoires nécessaires
    pub fn ensure_dirs_exist(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .context("Impossible de créer le répertoire de données")?;
        std::fs::create_dir_all(&self.work_dir)
            .context("Impossible de créer le répertoire de travail")?;
        Ok(())
    }
}

/// Expander un chemin lu depuis la configuration (support de `~`)
///
/// Exemples:
/// - "~/videos" → "/home/user/videos"
/// - "/tmp/work" → "/tmp/work"
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_creation() {
        let paths = AppPaths::with_base(Path::new("/tmp/base"));
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/base/FlixForge"));
        assert_eq!(paths.config_file.file_name().unwrap(), "flixforge.toml");
        assert_eq!(paths.tools_dir, PathBuf::from("/tmp/base/FFmpeg"));
    }

    #[test]
    fn test_expand_absolute_path() {
        assert_eq!(expand_path("/tmp/test"), PathBuf::from("/tmp/test"));
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_path("~/test");
        // Vérifier que ~ a été expansé (ne contient plus ~)
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with("test"));
    }

    #[test]
    fn test_ensure_dirs_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_base(tmp.path());
        paths.ensure_dirs_exist().unwrap();
        assert!(paths.data_dir.is_dir());
        assert!(!paths.tools_dir.exists());
    }
}
