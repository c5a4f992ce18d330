use anyhow::Context;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use flixforge_common::{AppPaths, VideoInfo};
use flixforge_core::Config;
use flixforge_deps::Tool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    info!("FlixForge v{}", env!("CARGO_PKG_VERSION"));

    let paths = AppPaths::new()?;
    paths.ensure_dirs_exist()?;
    info!("Répertoire de données: {:?}", paths.data_dir);

    // load() fait des I/O bloquantes (lecture, recherche des binaires)
    let config = tokio::task::spawn_blocking(move || {
        let mut config = Config::new(&paths);
        config.load().map(|_| config)
    })
    .await
    .context("Tâche de chargement interrompue")?
    .context("Échec du chargement de la configuration")?;

    info!("Configuration: {:?}", config.config_path());
    for tool in Tool::ALL {
        match config.binary_path(tool) {
            Ok(path) => info!("{}: {:?}", tool, path),
            Err(e) => warn!("{} (configurez le chemin manuellement)", e),
        }
    }

    for (name, profile) in config.profiles() {
        let marker = if config.is_preset(name) { "preset" } else { "utilisateur" };
        info!("Profil '{}' [{}] encodeur {}", name, marker, profile.encoder);
    }
    info!("Profil sélectionné: {}", config.selected_profile());

    // Optionnel: construire un job depuis une sortie ffprobe JSON
    if let Some(probe_file) = std::env::args().nth(1).map(PathBuf::from) {
        let content = tokio::fs::read_to_string(&probe_file)
            .await
            .with_context(|| format!("Échec de lecture de {}", probe_file.display()))?;
        let probe: serde_json::Value =
            serde_json::from_str(&content).context("Sortie ffprobe illisible")?;

        let info = VideoInfo::from_probe(&probe)?;
        let video = config.new_video(probe_file, info)?;
        println!("{}", serde_json::to_string_pretty(&video)?);
    }

    anyhow::Ok(())
}
