use super::document::ConfigDocument;
use super::presets::{builtin_presets, PresetFactory, STANDARD_PROFILE};
use crate::error::{ConfigError, Result};
use crate::persist::write_atomic;
use flixforge_common::{
    expand_path, AppPaths, NamedOptions, OptionError, OptionValue, Profile, Video, VideoInfo,
};
use flixforge_deps::{BinaryLocator, DepsError, Tool};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Codecs audio conservés tels quels quand `use_sane_audio` est actif
const SANE_AUDIO_CODECS: &[&str] = &[
    "aac",
    "ac3",
    "alac",
    "dca",
    "dts",
    "eac3",
    "flac",
    "libfdk_aac",
    "libmp3lame",
    "libopus",
    "libvorbis",
    "libwavpack",
    "snoicls",
    "sonic",
    "truehd",
    "tta",
];

/// Configuration utilisateur
///
/// `profiles` contient toujours les presets intégrés par-dessus les profils
/// utilisateur, et `selected_profile` nomme toujours une entrée de `profiles`.
#[derive(Debug, Clone)]
pub struct Config {
    version: String,
    config_path: PathBuf,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub language: String,
    pub continue_on_failure: bool,
    pub work_path: PathBuf,
    pub use_sane_audio: bool,
    selected_profile: String,
    pub disable_version_check: bool,
    pub disable_update_check: bool,
    pub disable_automatic_subtitle_burn_in: bool,
    pub custom_after_run_scripts: BTreeMap<String, String>,
    profiles: BTreeMap<String, Profile>,
    pub sane_audio_selection: BTreeSet<String>,
    locator: BinaryLocator,
    presets: PresetFactory,
}

impl Config {
    /// Configuration par défaut pour les chemins donnés (rien n'est lu ni écrit)
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_path: paths.config_file.clone(),
            ffmpeg: None,
            ffprobe: None,
            language: "en".to_string(),
            continue_on_failure: true,
            work_path: paths.work_dir.clone(),
            use_sane_audio: true,
            selected_profile: STANDARD_PROFILE.to_string(),
            disable_version_check: false,
            disable_update_check: false,
            disable_automatic_subtitle_burn_in: false,
            custom_after_run_scripts: BTreeMap::new(),
            profiles: builtin_presets(),
            sane_audio_selection: SANE_AUDIO_CODECS.iter().map(|c| c.to_string()).collect(),
            locator: BinaryLocator::new(paths.tools_dir.clone()),
            presets: builtin_presets,
        }
    }

    pub fn with_locator(mut self, locator: BinaryLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Remplacer la fabrique de presets
    pub fn with_presets(mut self, presets: PresetFactory) -> Self {
        let previous = (self.presets)();
        self.profiles.retain(|name, _| !previous.contains_key(name));
        self.presets = presets;
        self.overlay_presets();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn selected_profile(&self) -> &str {
        &self.selected_profile
    }

    /// Tous les profils (presets compris)
    pub fn profiles(&self) -> &BTreeMap<String, Profile> {
        &self.profiles
    }

    /// Profils créés par l'utilisateur (ceux qui sont persistés)
    pub fn user_profiles(&self) -> impl Iterator<Item = (&String, &Profile)> {
        let presets = (self.presets)();
        self.profiles
            .iter()
            .filter(move |(name, _)| !presets.contains_key(*name))
    }

    pub fn is_preset(&self, name: &str) -> bool {
        name == STANDARD_PROFILE || (self.presets)().contains_key(name)
    }

    /// Charger la configuration depuis le disque
    ///
    /// Premier lancement (fichier absent): les binaires sont recherchés, un
    /// échec n'est pas fatal, puis la configuration par défaut est écrite.
    pub fn load(&mut self) -> Result<()> {
        if !self.config_path.exists() {
            if let Some(parent) = self.config_path.parent() {
                std::fs::create_dir_all(parent).map_err(ConfigError::io(format!(
                    "Impossible de créer le répertoire {}",
                    parent.display()
                )))?;
            }

            for tool in Tool::ALL {
                if let Err(e) = self.find_binary(tool) {
                    warn!("Premier lancement: {}", e);
                }
            }

            info!("Création de la configuration par défaut: {:?}", self.config_path);
            return self.save();
        }

        let content = std::fs::read_to_string(&self.config_path).map_err(ConfigError::io(
            format!("Échec de lecture de {}", self.config_path.display()),
        ))?;

        let document: ConfigDocument =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: self.config_path.clone(),
                source,
            })?;

        self.apply_document(document);
        self.overlay_presets();

        if !self.profiles.contains_key(&self.selected_profile) {
            warn!(
                "Profil sélectionné '{}' introuvable, retour à '{}'",
                self.selected_profile, STANDARD_PROFILE
            );
            self.selected_profile = STANDARD_PROFILE.to_string();
        }

        // Profils et sélection restent cohérents même si un binaire manque
        for tool in Tool::ALL {
            if !self.binary_is_valid(tool) {
                self.find_binary(tool)?;
            }
        }

        info!(
            "Configuration chargée: {} profils ({} utilisateur)",
            self.profiles.len(),
            self.user_profiles().count()
        );
        Ok(())
    }

    /// Sauvegarder la configuration (écriture atomique)
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.to_document())?;
        write_atomic(&self.config_path, &content)?;
        debug!("Configuration sauvegardée dans {:?}", self.config_path);
        Ok(())
    }

    /// Construire le document persisté: seuls les profils utilisateur sont écrits
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            version: Some(self.version.clone()),
            ffmpeg: self.ffmpeg.as_deref().and_then(path_to_string),
            ffprobe: self.ffprobe.as_deref().and_then(path_to_string),
            language: Some(self.language.clone()),
            continue_on_failure: Some(self.continue_on_failure),
            work_path: path_to_string(&self.work_path),
            use_sane_audio: Some(self.use_sane_audio),
            selected_profile: Some(self.selected_profile.clone()),
            disable_version_check: Some(self.disable_version_check),
            disable_update_check: Some(self.disable_update_check),
            disable_automatic_subtitle_burn_in: Some(self.disable_automatic_subtitle_burn_in),
            sane_audio_selection: Some(self.sane_audio_selection.clone()),
            custom_after_run_scripts: Some(self.custom_after_run_scripts.clone()),
            profiles: Some(
                self.user_profiles()
                    .map(|(name, profile)| (name.clone(), profile.clone()))
                    .collect(),
            ),
        }
    }

    fn apply_document(&mut self, document: ConfigDocument) {
        if let Some(version) = document.version {
            if version != self.version {
                debug!("Configuration écrite par la version {} (actuelle: {})", version, self.version);
            }
        }
        if let Some(ffmpeg) = document.ffmpeg {
            self.ffmpeg = non_empty_path(&ffmpeg);
        }
        if let Some(ffprobe) = document.ffprobe {
            self.ffprobe = non_empty_path(&ffprobe);
        }
        if let Some(language) = document.language {
            self.language = language;
        }
        if let Some(value) = document.continue_on_failure {
            self.continue_on_failure = value;
        }
        if let Some(work_path) = document.work_path.as_deref().and_then(non_empty_path) {
            self.work_path = work_path;
        }
        if let Some(value) = document.use_sane_audio {
            self.use_sane_audio = value;
        }
        if let Some(selected) = document.selected_profile {
            self.selected_profile = selected;
        }
        if let Some(value) = document.disable_version_check {
            self.disable_version_check = value;
        }
        if let Some(value) = document.disable_update_check {
            self.disable_update_check = value;
        }
        if let Some(value) = document.disable_automatic_subtitle_burn_in {
            self.disable_automatic_subtitle_burn_in = value;
        }
        if let Some(codecs) = document.sane_audio_selection {
            self.sane_audio_selection = codecs;
        }
        if let Some(scripts) = document.custom_after_run_scripts {
            self.custom_after_run_scripts = scripts;
        }
        if let Some(profiles) = document.profiles {
            // Les entrées portant un nom de preset ne sont jamais relues
            let presets = (self.presets)();
            self.profiles = profiles
                .into_iter()
                .filter(|(name, _)| {
                    let reserved = name == STANDARD_PROFILE || presets.contains_key(name);
                    if reserved {
                        debug!("Entrée '{}' ignorée: nom réservé à un preset", name);
                    }
                    !reserved
                })
                .collect();
        }
    }

    /// Remettre les presets intégrés par-dessus les profils utilisateur
    fn overlay_presets(&mut self) {
        self.profiles.extend((self.presets)());
    }

    fn binary_slot(&mut self, tool: Tool) -> &mut Option<PathBuf> {
        match tool {
            Tool::Ffmpeg => &mut self.ffmpeg,
            Tool::Ffprobe => &mut self.ffprobe,
        }
    }

    fn binary_is_valid(&self, tool: Tool) -> bool {
        let path = match tool {
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Ffprobe => &self.ffprobe,
        };
        path.as_deref().is_some_and(Path::is_file)
    }

    /// Rechercher un binaire et l'enregistrer dans le champ correspondant
    pub fn find_binary(&mut self, tool: Tool) -> std::result::Result<PathBuf, DepsError> {
        let path = self.locator.locate(tool)?;
        *self.binary_slot(tool) = Some(path.clone());
        Ok(path)
    }

    /// Chemin d'un binaire, ou `NotFound` s'il n'est pas (ou plus) disponible
    pub fn binary_path(&self, tool: Tool) -> std::result::Result<&Path, DepsError> {
        let path = match tool {
            Tool::Ffmpeg => self.ffmpeg.as_deref(),
            Tool::Ffprobe => self.ffprobe.as_deref(),
        };
        path.filter(|p| p.is_file())
            .ok_or_else(|| DepsError::NotFound(tool.name().to_string()))
    }

    pub fn ffmpeg_path(&self) -> std::result::Result<&Path, DepsError> {
        self.binary_path(Tool::Ffmpeg)
    }

    pub fn ffprobe_path(&self) -> std::result::Result<&Path, DepsError> {
        self.binary_path(Tool::Ffprobe)
    }

    /// Profil actuellement sélectionné
    pub fn selected(&self) -> std::result::Result<&Profile, OptionError> {
        self.profiles
            .get(&self.selected_profile)
            .ok_or_else(|| OptionError::UnknownProfile(self.selected_profile.clone()))
    }

    pub fn select_profile(&mut self, name: &str) -> std::result::Result<(), OptionError> {
        if !self.profiles.contains_key(name) {
            return Err(OptionError::UnknownProfile(name.to_string()));
        }
        self.selected_profile = name.to_string();
        Ok(())
    }

    /// Lire une option du profil sélectionné
    pub fn opt(&self, name: &str) -> std::result::Result<OptionValue, OptionError> {
        self.selected()?.require_option(name)
    }

    /// Lire une option du profil sélectionné, avec valeur par défaut si absente
    pub fn opt_or(&self, name: &str, default: OptionValue) -> OptionValue {
        self.selected()
            .ok()
            .and_then(|profile| profile.get_option(name))
            .unwrap_or(default)
    }

    /// Lire un réglage d'encodeur du profil sélectionné (ex: `("x265", "crf")`)
    pub fn encoder_opt(
        &self,
        encoder_field: &str,
        setting: &str,
    ) -> std::result::Result<OptionValue, OptionError> {
        self.selected()?.encoder_option(encoder_field, setting)
    }

    /// Ajouter ou remplacer un profil utilisateur
    pub fn add_profile(&mut self, name: &str, profile: Profile) -> Result<()> {
        if self.is_preset(name) {
            return Err(ConfigError::ReservedProfile(name.to_string()));
        }
        self.profiles.insert(name.to_string(), profile);
        info!("Profil '{}' enregistré", name);
        Ok(())
    }

    /// Supprimer un profil utilisateur
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile> {
        if self.is_preset(name) {
            return Err(ConfigError::ReservedProfile(name.to_string()));
        }
        let profile = self
            .profiles
            .remove(name)
            .ok_or_else(|| OptionError::UnknownProfile(name.to_string()))?;

        if self.selected_profile == name {
            self.selected_profile = STANDARD_PROFILE.to_string();
        }
        info!("Profil '{}' supprimé", name);
        Ok(profile)
    }

    /// Créer un job vidéo lié au profil sélectionné
    pub fn new_video(
        &self,
        source: PathBuf,
        info: VideoInfo,
    ) -> std::result::Result<Video, OptionError> {
        Ok(Video::new(source, info, self.selected()?))
    }

    /// Le codec audio peut-il être conservé sans ré-encodage ?
    pub fn is_sane_audio_codec(&self, codec: &str) -> bool {
        !self.use_sane_audio || self.sane_audio_selection.contains(codec)
    }

    pub fn after_run_script(&self, name: &str) -> Option<&str> {
        self.custom_after_run_scripts.get(name).map(String::as_str)
    }
}

/// Chemin absolu en texte, `None` si le chemin n'est pas de l'UTF-8 valide
fn path_to_string(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match absolute.into_os_string().into_string() {
        Ok(value) => Some(value),
        Err(raw) => {
            warn!("Chemin non UTF-8 non sauvegardé: {:?}", raw);
            None
        }
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(expand_path(value))
    }
}
