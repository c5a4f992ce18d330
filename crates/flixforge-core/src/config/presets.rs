use flixforge_common::{EncoderKind, Profile, X264Settings, X265Settings};
use std::collections::BTreeMap;

/// Nom du profil de base, toujours présent et jamais relu depuis le disque
pub const STANDARD_PROFILE: &str = "Standard Profile";

/// Fabrique de presets intégrés
pub type PresetFactory = fn() -> BTreeMap<String, Profile>;

/// Presets intégrés
///
/// Une nouvelle map est construite à chaque appel: les presets ne sont jamais
/// persistés, les modifier n'a donc aucun effet durable.
pub fn builtin_presets() -> BTreeMap<String, Profile> {
    let mut presets = BTreeMap::new();

    presets.insert(STANDARD_PROFILE.to_string(), Profile::default());

    presets.insert(
        "UHD HDR10 Film".to_string(),
        Profile {
            auto_crop: true,
            x265: X265Settings {
                crf: 18,
                hdr10: true,
                hdr10_opt: true,
                repeat_headers: true,
                preset: "slow".to_string(),
                ..X265Settings::default()
            },
            ..Profile::default()
        },
    );

    presets.insert(
        "1080p Film".to_string(),
        Profile {
            auto_crop: true,
            encoder: EncoderKind::X264,
            x264: X264Settings {
                crf: 17,
                preset: "slow".to_string(),
                ..X264Settings::default()
            },
            ..Profile::default()
        },
    );

    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_profile_is_default() {
        let presets = builtin_presets();
        assert_eq!(presets.get(STANDARD_PROFILE), Some(&Profile::default()));
        assert!(presets.len() >= 3);
    }

    #[test]
    fn test_opinionated_presets_override_encoder_fields() {
        let presets = builtin_presets();

        let hdr = &presets["UHD HDR10 Film"];
        assert!(hdr.auto_crop);
        assert_eq!(hdr.encoder, EncoderKind::X265);
        assert_eq!(hdr.x265.crf, 18);
        assert!(hdr.x265.hdr10 && hdr.x265.hdr10_opt && hdr.x265.repeat_headers);

        let film = &presets["1080p Film"];
        assert_eq!(film.encoder, EncoderKind::X264);
        assert_eq!(film.x264.crf, 17);
        assert_eq!(film.x264.preset, "slow");
    }

    #[test]
    fn test_each_call_is_fresh() {
        let mut first = builtin_presets();
        first.get_mut(STANDARD_PROFILE).unwrap().x265.crf = 1;
        assert_eq!(builtin_presets()[STANDARD_PROFILE].x265.crf, 28);
    }
}
