use super::encoder::{
    deserialize_encoder_lenient, AomAv1Settings, EncoderKind, EncoderSettings, GifSettings,
    Rav1eSettings, SvtAv1Settings, Vp9Settings, WebpSettings, X264Settings, X265Settings,
};
use super::options::{
    expect_bool, expect_text, expect_u16, unknown, NamedOptions, OptionError, OptionValue,
};
use serde::{Deserialize, Serialize};

/// Profil de conversion
///
/// Un profil possède une instance de *chaque* famille d'encodeur: changer
/// `encoder` ne fait que déplacer le sélecteur, les réglages des autres
/// familles sont conservés.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub auto_crop: bool,
    pub keep_aspect_ratio: bool,
    pub fast_seek: bool,
    /// Rotation en degrés (0, 90, 180, 270)
    pub rotate: u16,
    pub vertical_flip: bool,
    pub horizontal_flip: bool,
    pub copy_chapters: bool,
    pub remove_metadata: bool,
    pub remove_hdr: bool,
    #[serde(deserialize_with = "deserialize_encoder_lenient")]
    pub encoder: EncoderKind,

    pub audio_language: String,
    pub audio_select: bool,
    pub audio_select_preferred_language: bool,

    pub subtitle_language: String,
    pub subtitle_select: bool,
    pub subtitle_select_preferred_language: bool,
    pub subtitle_automatic_burn_in: bool,

    pub x265: X265Settings,
    pub x264: X264Settings,
    pub rav1e: Rav1eSettings,
    pub svt_av1: SvtAv1Settings,
    pub vp9: Vp9Settings,
    pub aom_av1: AomAv1Settings,
    pub gif: GifSettings,
    pub webp: WebpSettings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            auto_crop: false,
            keep_aspect_ratio: true,
            fast_seek: true,
            rotate: 0,
            vertical_flip: false,
            horizontal_flip: false,
            copy_chapters: true,
            remove_metadata: true,
            remove_hdr: false,
            encoder: EncoderKind::X265,
            audio_language: "en".to_string(),
            audio_select: true,
            audio_select_preferred_language: true,
            subtitle_language: "en".to_string(),
            subtitle_select: false,
            subtitle_select_preferred_language: true,
            subtitle_automatic_burn_in: true,
            x265: X265Settings::default(),
            x264: X264Settings::default(),
            rav1e: Rav1eSettings::default(),
            svt_av1: SvtAv1Settings::default(),
            vp9: Vp9Settings::default(),
            aom_av1: AomAv1Settings::default(),
            gif: GifSettings::default(),
            webp: WebpSettings::default(),
        }
    }
}

impl Profile {
    /// Réglages de la famille d'encodeur active
    pub fn active_settings(&self) -> EncoderSettings {
        self.encoder_settings(self.encoder)
    }

    /// Copie des réglages d'une famille donnée
    pub fn encoder_settings(&self, kind: EncoderKind) -> EncoderSettings {
        match kind {
            EncoderKind::X265 => EncoderSettings::X265(self.x265.clone()),
            EncoderKind::X264 => EncoderSettings::X264(self.x264.clone()),
            EncoderKind::Rav1e => EncoderSettings::Rav1e(self.rav1e.clone()),
            EncoderKind::SvtAv1 => EncoderSettings::SvtAv1(self.svt_av1.clone()),
            EncoderKind::Vp9 => EncoderSettings::Vp9(self.vp9.clone()),
            EncoderKind::AomAv1 => EncoderSettings::AomAv1(self.aom_av1.clone()),
            EncoderKind::Gif => EncoderSettings::Gif(self.gif.clone()),
            EncoderKind::Webp => EncoderSettings::Webp(self.webp.clone()),
        }
    }

    /// Remplacer les réglages d'une famille (sans changer l'encodeur actif)
    pub fn store_encoder_settings(&mut self, settings: EncoderSettings) {
        match settings {
            EncoderSettings::X265(s) => self.x265 = s,
            EncoderSettings::X264(s) => self.x264 = s,
            EncoderSettings::Rav1e(s) => self.rav1e = s,
            EncoderSettings::SvtAv1(s) => self.svt_av1 = s,
            EncoderSettings::Vp9(s) => self.vp9 = s,
            EncoderSettings::AomAv1(s) => self.aom_av1 = s,
            EncoderSettings::Gif(s) => self.gif = s,
            EncoderSettings::Webp(s) => self.webp = s,
        }
    }

    pub fn variant(&self, kind: EncoderKind) -> &dyn NamedOptions {
        match kind {
            EncoderKind::X265 => &self.x265,
            EncoderKind::X264 => &self.x264,
            EncoderKind::Rav1e => &self.rav1e,
            EncoderKind::SvtAv1 => &self.svt_av1,
            EncoderKind::Vp9 => &self.vp9,
            EncoderKind::AomAv1 => &self.aom_av1,
            EncoderKind::Gif => &self.gif,
            EncoderKind::Webp => &self.webp,
        }
    }

    pub fn variant_mut(&mut self, kind: EncoderKind) -> &mut dyn NamedOptions {
        match kind {
            EncoderKind::X265 => &mut self.x265,
            EncoderKind::X264 => &mut self.x264,
            EncoderKind::Rav1e => &mut self.rav1e,
            EncoderKind::SvtAv1 => &mut self.svt_av1,
            EncoderKind::Vp9 => &mut self.vp9,
            EncoderKind::AomAv1 => &mut self.aom_av1,
            EncoderKind::Gif => &mut self.gif,
            EncoderKind::Webp => &mut self.webp,
        }
    }

    /// Lecture à deux niveaux: champ de variante (`x265`, `vp9`...) puis réglage
    pub fn encoder_option(&self, field: &str, setting: &str) -> Result<OptionValue, OptionError> {
        let kind = EncoderKind::from_field_name(field).ok_or_else(|| unknown(field))?;
        self.variant(kind).require_option(setting)
    }

    pub fn set_encoder_option(
        &mut self,
        field: &str,
        setting: &str,
        value: OptionValue,
    ) -> Result<(), OptionError> {
        let kind = EncoderKind::from_field_name(field).ok_or_else(|| unknown(field))?;
        self.variant_mut(kind).set_option(setting, value)
    }
}

impl NamedOptions for Profile {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "auto_crop" => self.auto_crop.into(),
            "keep_aspect_ratio" => self.keep_aspect_ratio.into(),
            "fast_seek" => self.fast_seek.into(),
            "rotate" => self.rotate.into(),
            "vertical_flip" => self.vertical_flip.into(),
            "horizontal_flip" => self.horizontal_flip.into(),
            "copy_chapters" => self.copy_chapters.into(),
            "remove_metadata" => self.remove_metadata.into(),
            "remove_hdr" => self.remove_hdr.into(),
            "encoder" => self.encoder.display_name().into(),
            "audio_language" => (&self.audio_language).into(),
            "audio_select" => self.audio_select.into(),
            "audio_select_preferred_language" => self.audio_select_preferred_language.into(),
            "subtitle_language" => (&self.subtitle_language).into(),
            "subtitle_select" => self.subtitle_select.into(),
            "subtitle_select_preferred_language" => {
                self.subtitle_select_preferred_language.into()
            }
            "subtitle_automatic_burn_in" => self.subtitle_automatic_burn_in.into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "auto_crop" => self.auto_crop = expect_bool(name, value)?,
            "keep_aspect_ratio" => self.keep_aspect_ratio = expect_bool(name, value)?,
            "fast_seek" => self.fast_seek = expect_bool(name, value)?,
            "rotate" => self.rotate = expect_u16(name, value)?,
            "vertical_flip" => self.vertical_flip = expect_bool(name, value)?,
            "horizontal_flip" => self.horizontal_flip = expect_bool(name, value)?,
            "copy_chapters" => self.copy_chapters = expect_bool(name, value)?,
            "remove_metadata" => self.remove_metadata = expect_bool(name, value)?,
            "remove_hdr" => self.remove_hdr = expect_bool(name, value)?,
            "encoder" => {
                let text = expect_text(name, value)?;
                self.encoder = EncoderKind::from_display_name(&text).ok_or_else(|| {
                    OptionError::TypeMismatch {
                        name: name.to_string(),
                        expected: "nom d'encodeur",
                        found: OptionValue::Text(text.clone()),
                    }
                })?;
            }
            "audio_language" => self.audio_language = expect_text(name, value)?,
            "audio_select" => self.audio_select = expect_bool(name, value)?,
            "audio_select_preferred_language" => {
                self.audio_select_preferred_language = expect_bool(name, value)?
            }
            "subtitle_language" => self.subtitle_language = expect_text(name, value)?,
            "subtitle_select" => self.subtitle_select = expect_bool(name, value)?,
            "subtitle_select_preferred_language" => {
                self.subtitle_select_preferred_language = expect_bool(name, value)?
            }
            "subtitle_automatic_burn_in" => {
                self.subtitle_automatic_burn_in = expect_bool(name, value)?
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "auto_crop",
            "keep_aspect_ratio",
            "fast_seek",
            "rotate",
            "vertical_flip",
            "horizontal_flip",
            "copy_chapters",
            "remove_metadata",
            "remove_hdr",
            "encoder",
            "audio_language",
            "audio_select",
            "audio_select_preferred_language",
            "subtitle_language",
            "subtitle_select",
            "subtitle_select_preferred_language",
            "subtitle_automatic_burn_in",
        ]
    }
}
