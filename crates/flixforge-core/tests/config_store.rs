use flixforge_common::{AppPaths, EncoderKind, OptionValue, Profile};
use flixforge_core::{builtin_presets, Config, ConfigError, STANDARD_PROFILE};
use flixforge_deps::{BinaryLocator, DepsError};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

/// Environnement isolé: répertoire de données temporaire et PATH vide
struct Sandbox {
    _tmp: TempDir,
    paths: AppPaths,
    empty_path: std::path::PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_base(tmp.path());
        let empty_path = tmp.path().join("empty-path");
        fs::create_dir_all(&empty_path).unwrap();
        Self {
            _tmp: tmp,
            paths,
            empty_path,
        }
    }

    /// Sandbox avec de faux binaires dans le répertoire d'installation dédié
    fn with_binaries() -> Self {
        let sandbox = Self::new();
        fs::create_dir_all(&sandbox.paths.tools_dir).unwrap();
        for name in ["ffmpeg", "ffprobe"] {
            fs::write(sandbox.paths.tools_dir.join(name), b"").unwrap();
        }
        sandbox
    }

    fn config(&self) -> Config {
        let locator = BinaryLocator::new(self.paths.tools_dir.clone())
            .with_search_path(self.empty_path.as_os_str());
        Config::new(&self.paths).with_locator(locator)
    }

    fn write_config(&self, content: &str) {
        fs::create_dir_all(&self.paths.data_dir).unwrap();
        fs::write(&self.paths.config_file, content).unwrap();
    }
}

fn extended_presets() -> BTreeMap<String, Profile> {
    let mut presets = builtin_presets();
    presets.insert(
        "Web GIF".to_string(),
        Profile {
            encoder: EncoderKind::Gif,
            ..Profile::default()
        },
    );
    presets
}

#[test]
fn test_first_run_creates_default_file() {
    let sandbox = Sandbox::with_binaries();
    let mut config = sandbox.config();

    config.load().unwrap();

    assert!(sandbox.paths.config_file.is_file());
    assert!(config.ffmpeg_path().unwrap().ends_with("ffmpeg"));
    assert!(config.ffprobe_path().unwrap().ends_with("ffprobe"));
    assert_eq!(config.selected_profile(), STANDARD_PROFILE);

    let content = fs::read_to_string(&sandbox.paths.config_file).unwrap();
    assert!(!content.contains("[profiles.\"Standard Profile\"]"));
}

#[test]
fn test_first_run_without_binaries_still_writes_file() {
    let sandbox = Sandbox::new();
    let mut config = sandbox.config();

    config.load().unwrap();

    assert!(sandbox.paths.config_file.is_file());
    assert!(config.ffmpeg.is_none());
    assert!(matches!(config.ffmpeg_path(), Err(DepsError::NotFound(_))));
}

#[test]
fn test_missing_binary_on_later_load_fails() {
    let sandbox = Sandbox::new();
    sandbox.write_config("language = \"fr\"\n");

    let mut config = sandbox.config();
    let err = config.load().unwrap_err();
    assert!(matches!(err, ConfigError::Binary(DepsError::NotFound(_))));
}

#[test]
fn test_failed_binary_lookup_keeps_profiles_consistent() {
    let sandbox = Sandbox::new();
    sandbox.write_config(
        r#"
selected_profile = "Ghost"

[profiles.Mine]
rotate = 90
"#,
    );

    let mut config = sandbox.config();
    let err = config.load().unwrap_err();
    assert!(matches!(err, ConfigError::Binary(DepsError::NotFound(_))));

    assert!(config.profiles().contains_key(STANDARD_PROFILE));
    assert!(config.profiles().contains_key("1080p Film"));
    assert_eq!(config.profiles()["Mine"].rotate, 90);
    assert_eq!(config.selected_profile(), STANDARD_PROFILE);
    assert!(config.selected().is_ok());
}

#[test]
fn test_unknown_encoder_does_not_lock_out_file() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config(
        r#"
language = "it"

[profiles.Future]
encoder = "HEVC (NVENC)"
rotate = 270

[profiles.Mine]
encoder = "VP9"
"#,
    );

    let mut config = sandbox.config();
    config.load().unwrap();

    assert_eq!(config.language, "it");
    assert_eq!(config.profiles()["Future"].encoder, EncoderKind::default());
    assert_eq!(config.profiles()["Future"].rotate, 270);
    assert_eq!(config.profiles()["Mine"].encoder, EncoderKind::Vp9);
}

#[test]
fn test_save_then_load_round_trip() {
    let sandbox = Sandbox::with_binaries();
    let work_path = sandbox.paths.data_dir.join("work");

    let mut config = sandbox.config();
    config.load().unwrap();
    config.language = "fr".to_string();
    config.continue_on_failure = false;
    config.work_path = work_path.clone();
    config.use_sane_audio = false;
    config.disable_version_check = true;
    config.disable_update_check = true;
    config.disable_automatic_subtitle_burn_in = true;
    config.sane_audio_selection = ["flac", "libopus"].iter().map(|c| c.to_string()).collect();
    config
        .custom_after_run_scripts
        .insert("shutdown".to_string(), "shutdown now".to_string());

    let mut anime = Profile::default();
    anime.encoder = EncoderKind::SvtAv1;
    anime.svt_av1.qp = 30;
    anime.x265.bitrate = Some("6000k".to_string());
    anime.x264.tune = Some("animation".to_string());
    anime.subtitle_language = "jpn".to_string();
    config.add_profile("Anime", anime.clone()).unwrap();
    config.select_profile("Anime").unwrap();
    config.save().unwrap();

    let mut reloaded = sandbox.config();
    reloaded.load().unwrap();

    assert_eq!(reloaded.language, "fr");
    assert!(!reloaded.continue_on_failure);
    assert_eq!(reloaded.work_path, work_path);
    assert!(!reloaded.use_sane_audio);
    assert!(reloaded.disable_version_check);
    assert!(reloaded.disable_update_check);
    assert!(reloaded.disable_automatic_subtitle_burn_in);
    assert_eq!(reloaded.sane_audio_selection, config.sane_audio_selection);
    assert_eq!(reloaded.after_run_script("shutdown"), Some("shutdown now"));
    assert_eq!(reloaded.selected_profile(), "Anime");
    assert_eq!(reloaded.profiles().get("Anime"), Some(&anime));
    assert_eq!(reloaded.ffmpeg, config.ffmpeg);
    assert_eq!(reloaded.ffprobe, config.ffprobe);
    assert_eq!(reloaded.encoder_opt("svt_av1", "qp"), Ok(OptionValue::Int(30)));
    assert_eq!(
        reloaded.encoder_opt("x265", "bitrate"),
        Ok(OptionValue::from("6000k"))
    );
    assert_eq!(
        reloaded.encoder_opt("x264", "tune"),
        Ok(OptionValue::from("animation"))
    );
    assert_eq!(
        reloaded.opt("encoder"),
        Ok(OptionValue::from("AV1 (SVT AV1)"))
    );
}

#[test]
fn test_persisted_standard_profile_is_discarded() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config(
        r#"
selected_profile = "Anime"

[profiles."Standard Profile"]
auto_crop = true

[profiles."Standard Profile".x265]
crf = 40

[profiles.Anime]
encoder = "AVC (x264)"

[profiles.Anime.x264]
crf = 20
"#,
    );

    let mut config = sandbox.config();
    config.load().unwrap();

    assert_eq!(
        config.profiles().get(STANDARD_PROFILE),
        Some(&Profile::default())
    );
    assert_eq!(config.selected_profile(), "Anime");
    assert_eq!(config.encoder_opt("x264", "crf"), Ok(OptionValue::Int(20)));
    assert_eq!(config.encoder_opt("x265", "crf"), Ok(OptionValue::Int(28)));
}

#[test]
fn test_unknown_selected_profile_resets_to_standard() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config("selected_profile = \"Deleted Profile\"\n");

    let mut config = sandbox.config();
    config.load().unwrap();

    assert_eq!(config.selected_profile(), STANDARD_PROFILE);
    assert_eq!(config.encoder_opt("x265", "crf"), Ok(OptionValue::Int(28)));
}

#[test]
fn test_new_preset_overrides_persisted_entry() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config(
        r#"
[profiles."Web GIF"]
encoder = "VP9"

[profiles.Mine]
rotate = 90
"#,
    );

    let mut config = sandbox.config().with_presets(extended_presets);
    config.load().unwrap();

    assert!(config.is_preset("Web GIF"));
    assert_eq!(config.profiles()["Web GIF"].encoder, EncoderKind::Gif);
    assert_eq!(config.profiles()["Mine"].rotate, 90);
    assert_eq!(
        config.user_profiles().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
        vec!["Mine"]
    );
}

#[test]
fn test_malformed_file_is_parse_error() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config("language = [unterminated\n");

    let mut config = sandbox.config();
    let err = config.load().unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, sandbox.paths.config_file),
        other => panic!("Erreur inattendue: {other:?}"),
    }

    // Le fichier fautif n'est pas écrasé
    let content = fs::read_to_string(&sandbox.paths.config_file).unwrap();
    assert!(content.contains("unterminated"));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config(
        r#"
language = "de"
legacy_flag = true

[profiles.Mine]
retired_option = "x"
"#,
    );

    let mut config = sandbox.config();
    config.load().unwrap();

    assert_eq!(config.language, "de");
    assert_eq!(config.profiles()["Mine"], Profile::default());
}

#[test]
fn test_stale_binary_path_is_found_again() {
    let sandbox = Sandbox::with_binaries();
    sandbox.write_config("ffmpeg = \"/nonexistent/ffmpeg\"\n");

    let mut config = sandbox.config();
    config.load().unwrap();

    assert_eq!(
        config.ffmpeg_path().unwrap(),
        sandbox.paths.tools_dir.join("ffmpeg")
    );
}
