use crate::error::{ConfigError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Écrire un fichier de façon atomique (fichier temporaire puis rename)
///
/// En cas de crash pendant l'écriture, l'ancien fichier reste intact.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::io(format!(
            "Échec de création du répertoire {}",
            parent.display()
        )))?;
    }

    let temp_file = path.with_extension("tmp");

    let mut file = File::create(&temp_file)
        .map_err(ConfigError::io("Échec de création du fichier temporaire"))?;

    file.write_all(contents.as_bytes())
        .map_err(ConfigError::io("Échec d'écriture du fichier temporaire"))?;

    file.sync_all()
        .map_err(ConfigError::io("Échec de sync du fichier temporaire"))?;

    drop(file);

    // Rename atomique
    fs::rename(&temp_file, path).map_err(ConfigError::io("Échec du rename atomique"))?;

    Ok(())
}
