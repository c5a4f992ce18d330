use flixforge_common::Profile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Forme persistée de la configuration
///
/// Toutes les clés sont optionnelles: une clé absente garde la valeur en
/// mémoire, une clé inconnue est ignorée. `config_path` n'est jamais écrit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_on_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_sane_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_version_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_update_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_automatic_subtitle_burn_in: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sane_audio_selection: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_after_run_scripts: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<BTreeMap<String, Profile>>,
}
