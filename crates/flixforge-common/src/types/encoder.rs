use super::options::{
    expect_bool, expect_i32, expect_list, expect_opt_text, expect_text, expect_u32, unknown,
    NamedOptions, OptionError, OptionValue,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Famille d'encodeur vidéo supportée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EncoderKind {
    #[default]
    #[serde(rename = "HEVC (x265)")]
    X265,
    #[serde(rename = "AVC (x264)")]
    X264,
    #[serde(rename = "AV1 (rav1e)")]
    Rav1e,
    #[serde(rename = "AV1 (SVT AV1)")]
    SvtAv1,
    #[serde(rename = "VP9")]
    Vp9,
    #[serde(rename = "AV1 (AOM)")]
    AomAv1,
    #[serde(rename = "GIF")]
    Gif,
    #[serde(rename = "WebP")]
    Webp,
}

impl EncoderKind {
    pub const ALL: [EncoderKind; 8] = [
        EncoderKind::X265,
        EncoderKind::X264,
        EncoderKind::Rav1e,
        EncoderKind::SvtAv1,
        EncoderKind::Vp9,
        EncoderKind::AomAv1,
        EncoderKind::Gif,
        EncoderKind::Webp,
    ];

    /// Nom affiché (et persisté dans le champ `encoder` d'un profil)
    pub fn display_name(&self) -> &'static str {
        match self {
            EncoderKind::X265 => "HEVC (x265)",
            EncoderKind::X264 => "AVC (x264)",
            EncoderKind::Rav1e => "AV1 (rav1e)",
            EncoderKind::SvtAv1 => "AV1 (SVT AV1)",
            EncoderKind::Vp9 => "VP9",
            EncoderKind::AomAv1 => "AV1 (AOM)",
            EncoderKind::Gif => "GIF",
            EncoderKind::Webp => "WebP",
        }
    }

    /// Nom du champ qui porte les réglages de cette famille dans un profil
    pub fn field_name(&self) -> &'static str {
        match self {
            EncoderKind::X265 => "x265",
            EncoderKind::X264 => "x264",
            EncoderKind::Rav1e => "rav1e",
            EncoderKind::SvtAv1 => "svt_av1",
            EncoderKind::Vp9 => "vp9",
            EncoderKind::AomAv1 => "aom_av1",
            EncoderKind::Gif => "gif",
            EncoderKind::Webp => "webp",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.display_name() == name)
    }
}

/// Lecture tolérante du champ `encoder` d'un profil
///
/// Un nom inconnu (encodeur d'une autre version) retombe sur l'encodeur par
/// défaut au lieu de rendre tout le fichier illisible.
pub(crate) fn deserialize_encoder_lenient<'de, D>(
    deserializer: D,
) -> Result<EncoderKind, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(EncoderKind::from_display_name(&name).unwrap_or_else(|| {
        warn!(
            "Encodeur inconnu '{}', retour à '{}'",
            name,
            EncoderKind::default()
        );
        EncoderKind::default()
    }))
}

impl std::fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Réglages HEVC (libx265)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct X265Settings {
    pub preset: String,
    pub profile: String,
    pub tune: String,
    pub pix_fmt: String,
    /// CRF 0-51, plus bas = meilleure qualité
    pub crf: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    pub hdr10: bool,
    pub hdr10_opt: bool,
    pub repeat_headers: bool,
    pub intra_encoding: bool,
    pub aq_mode: u32,
    pub bframes: u32,
    pub lossless: bool,
    pub x265_params: Vec<String>,
}

impl Default for X265Settings {
    fn default() -> Self {
        Self {
            preset: "medium".to_string(),
            profile: "default".to_string(),
            tune: "default".to_string(),
            pix_fmt: "yuv420p10le".to_string(),
            crf: 28,
            bitrate: None,
            hdr10: false,
            hdr10_opt: false,
            repeat_headers: false,
            intra_encoding: false,
            aq_mode: 2,
            bframes: 4,
            lossless: false,
            x265_params: vec![],
        }
    }
}

impl NamedOptions for X265Settings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "preset" => (&self.preset).into(),
            "profile" => (&self.profile).into(),
            "tune" => (&self.tune).into(),
            "pix_fmt" => (&self.pix_fmt).into(),
            "crf" => self.crf.into(),
            "bitrate" => (&self.bitrate).into(),
            "hdr10" => self.hdr10.into(),
            "hdr10_opt" => self.hdr10_opt.into(),
            "repeat_headers" => self.repeat_headers.into(),
            "intra_encoding" => self.intra_encoding.into(),
            "aq_mode" => self.aq_mode.into(),
            "bframes" => self.bframes.into(),
            "lossless" => self.lossless.into(),
            "x265_params" => (&self.x265_params).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "preset" => self.preset = expect_text(name, value)?,
            "profile" => self.profile = expect_text(name, value)?,
            "tune" => self.tune = expect_text(name, value)?,
            "pix_fmt" => self.pix_fmt = expect_text(name, value)?,
            "crf" => self.crf = expect_u32(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            "hdr10" => self.hdr10 = expect_bool(name, value)?,
            "hdr10_opt" => self.hdr10_opt = expect_bool(name, value)?,
            "repeat_headers" => self.repeat_headers = expect_bool(name, value)?,
            "intra_encoding" => self.intra_encoding = expect_bool(name, value)?,
            "aq_mode" => self.aq_mode = expect_u32(name, value)?,
            "bframes" => self.bframes = expect_u32(name, value)?,
            "lossless" => self.lossless = expect_bool(name, value)?,
            "x265_params" => self.x265_params = expect_list(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "preset",
            "profile",
            "tune",
            "pix_fmt",
            "crf",
            "bitrate",
            "hdr10",
            "hdr10_opt",
            "repeat_headers",
            "intra_encoding",
            "aq_mode",
            "bframes",
            "lossless",
            "x265_params",
        ]
    }
}

/// Réglages AVC (libx264)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct X264Settings {
    pub preset: String,
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tune: Option<String>,
    pub pix_fmt: String,
    pub crf: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
}

impl Default for X264Settings {
    fn default() -> Self {
        Self {
            preset: "medium".to_string(),
            profile: "default".to_string(),
            tune: None,
            pix_fmt: "yuv420p".to_string(),
            crf: 23,
            bitrate: None,
        }
    }
}

impl NamedOptions for X264Settings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "preset" => (&self.preset).into(),
            "profile" => (&self.profile).into(),
            "tune" => (&self.tune).into(),
            "pix_fmt" => (&self.pix_fmt).into(),
            "crf" => self.crf.into(),
            "bitrate" => (&self.bitrate).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "preset" => self.preset = expect_text(name, value)?,
            "profile" => self.profile = expect_text(name, value)?,
            "tune" => self.tune = expect_opt_text(name, value)?,
            "pix_fmt" => self.pix_fmt = expect_text(name, value)?,
            "crf" => self.crf = expect_u32(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &["preset", "profile", "tune", "pix_fmt", "crf", "bitrate"]
    }
}

/// Réglages AV1 via rav1e
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rav1eSettings {
    /// -1 = automatique, 0-10 sinon
    pub speed: i32,
    pub tile_columns: i32,
    pub tile_rows: i32,
    pub tiles: u32,
    pub single_pass: bool,
    pub qp: u32,
    pub pix_fmt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
}

impl Default for Rav1eSettings {
    fn default() -> Self {
        Self {
            speed: -1,
            tile_columns: -1,
            tile_rows: -1,
            tiles: 0,
            single_pass: false,
            qp: 24,
            pix_fmt: "yuv420p".to_string(),
            bitrate: None,
        }
    }
}

impl NamedOptions for Rav1eSettings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "speed" => self.speed.into(),
            "tile_columns" => self.tile_columns.into(),
            "tile_rows" => self.tile_rows.into(),
            "tiles" => self.tiles.into(),
            "single_pass" => self.single_pass.into(),
            "qp" => self.qp.into(),
            "pix_fmt" => (&self.pix_fmt).into(),
            "bitrate" => (&self.bitrate).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "speed" => self.speed = expect_i32(name, value)?,
            "tile_columns" => self.tile_columns = expect_i32(name, value)?,
            "tile_rows" => self.tile_rows = expect_i32(name, value)?,
            "tiles" => self.tiles = expect_u32(name, value)?,
            "single_pass" => self.single_pass = expect_bool(name, value)?,
            "qp" => self.qp = expect_u32(name, value)?,
            "pix_fmt" => self.pix_fmt = expect_text(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "speed",
            "tile_columns",
            "tile_rows",
            "tiles",
            "single_pass",
            "qp",
            "pix_fmt",
            "bitrate",
        ]
    }
}

/// Réglages AV1 via SVT-AV1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvtAv1Settings {
    pub tile_columns: i32,
    pub tile_rows: i32,
    pub tier: String,
    pub scene_detection: bool,
    pub single_pass: bool,
    /// Preset 0-13
    pub speed: u32,
    pub qp: u32,
    pub pix_fmt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
}

impl Default for SvtAv1Settings {
    fn default() -> Self {
        Self {
            tile_columns: 0,
            tile_rows: 0,
            tier: "main".to_string(),
            scene_detection: false,
            single_pass: false,
            speed: 7,
            qp: 24,
            pix_fmt: "yuv420p10le".to_string(),
            bitrate: None,
        }
    }
}

impl NamedOptions for SvtAv1Settings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "tile_columns" => self.tile_columns.into(),
            "tile_rows" => self.tile_rows.into(),
            "tier" => (&self.tier).into(),
            "scene_detection" => self.scene_detection.into(),
            "single_pass" => self.single_pass.into(),
            "speed" => self.speed.into(),
            "qp" => self.qp.into(),
            "pix_fmt" => (&self.pix_fmt).into(),
            "bitrate" => (&self.bitrate).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "tile_columns" => self.tile_columns = expect_i32(name, value)?,
            "tile_rows" => self.tile_rows = expect_i32(name, value)?,
            "tier" => self.tier = expect_text(name, value)?,
            "scene_detection" => self.scene_detection = expect_bool(name, value)?,
            "single_pass" => self.single_pass = expect_bool(name, value)?,
            "speed" => self.speed = expect_u32(name, value)?,
            "qp" => self.qp = expect_u32(name, value)?,
            "pix_fmt" => self.pix_fmt = expect_text(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "tile_columns",
            "tile_rows",
            "tier",
            "scene_detection",
            "single_pass",
            "speed",
            "qp",
            "pix_fmt",
            "bitrate",
        ]
    }
}

/// Réglages VP9 (libvpx-vp9)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vp9Settings {
    pub profile: u32,
    /// "good", "best" ou "realtime"
    pub quality: String,
    pub speed: i32,
    pub row_mt: bool,
    pub single_pass: bool,
    pub crf: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    pub fast_first_pass: bool,
    pub tile_columns: i32,
    pub tile_rows: i32,
}

impl Default for Vp9Settings {
    fn default() -> Self {
        Self {
            profile: 2,
            quality: "good".to_string(),
            speed: 0,
            row_mt: false,
            single_pass: false,
            crf: 31,
            bitrate: None,
            fast_first_pass: true,
            tile_columns: -1,
            tile_rows: -1,
        }
    }
}

impl NamedOptions for Vp9Settings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "profile" => self.profile.into(),
            "quality" => (&self.quality).into(),
            "speed" => self.speed.into(),
            "row_mt" => self.row_mt.into(),
            "single_pass" => self.single_pass.into(),
            "crf" => self.crf.into(),
            "bitrate" => (&self.bitrate).into(),
            "fast_first_pass" => self.fast_first_pass.into(),
            "tile_columns" => self.tile_columns.into(),
            "tile_rows" => self.tile_rows.into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "profile" => self.profile = expect_u32(name, value)?,
            "quality" => self.quality = expect_text(name, value)?,
            "speed" => self.speed = expect_i32(name, value)?,
            "row_mt" => self.row_mt = expect_bool(name, value)?,
            "single_pass" => self.single_pass = expect_bool(name, value)?,
            "crf" => self.crf = expect_u32(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            "fast_first_pass" => self.fast_first_pass = expect_bool(name, value)?,
            "tile_columns" => self.tile_columns = expect_i32(name, value)?,
            "tile_rows" => self.tile_rows = expect_i32(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "profile",
            "quality",
            "speed",
            "row_mt",
            "single_pass",
            "crf",
            "bitrate",
            "fast_first_pass",
            "tile_columns",
            "tile_rows",
        ]
    }
}

/// Réglages AV1 via libaom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AomAv1Settings {
    pub tile_columns: i32,
    pub tile_rows: i32,
    pub usage: String,
    pub row_mt: bool,
    pub cpu_used: u32,
    pub crf: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    pub pix_fmt: String,
}

impl Default for AomAv1Settings {
    fn default() -> Self {
        Self {
            tile_columns: 0,
            tile_rows: 0,
            usage: "good".to_string(),
            row_mt: true,
            cpu_used: 4,
            crf: 28,
            bitrate: None,
            pix_fmt: "yuv420p10le".to_string(),
        }
    }
}

impl NamedOptions for AomAv1Settings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "tile_columns" => self.tile_columns.into(),
            "tile_rows" => self.tile_rows.into(),
            "usage" => (&self.usage).into(),
            "row_mt" => self.row_mt.into(),
            "cpu_used" => self.cpu_used.into(),
            "crf" => self.crf.into(),
            "bitrate" => (&self.bitrate).into(),
            "pix_fmt" => (&self.pix_fmt).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "tile_columns" => self.tile_columns = expect_i32(name, value)?,
            "tile_rows" => self.tile_rows = expect_i32(name, value)?,
            "usage" => self.usage = expect_text(name, value)?,
            "row_mt" => self.row_mt = expect_bool(name, value)?,
            "cpu_used" => self.cpu_used = expect_u32(name, value)?,
            "crf" => self.crf = expect_u32(name, value)?,
            "bitrate" => self.bitrate = expect_opt_text(name, value)?,
            "pix_fmt" => self.pix_fmt = expect_text(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &[
            "tile_columns",
            "tile_rows",
            "usage",
            "row_mt",
            "cpu_used",
            "crf",
            "bitrate",
            "pix_fmt",
        ]
    }
}

/// Réglages GIF animé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GifSettings {
    pub fps: u32,
    pub dither: String,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            fps: 15,
            dither: "sierra2_4a".to_string(),
        }
    }
}

impl NamedOptions for GifSettings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "fps" => self.fps.into(),
            "dither" => (&self.dither).into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "fps" => self.fps = expect_u32(name, value)?,
            "dither" => self.dither = expect_text(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &["fps", "dither"]
    }
}

/// Réglages WebP animé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebpSettings {
    pub lossless: bool,
    /// 0-6, plus haut = plus lent et plus compact
    pub compression: u32,
    pub preset: String,
    pub qscale: u32,
}

impl Default for WebpSettings {
    fn default() -> Self {
        Self {
            lossless: false,
            compression: 4,
            preset: "none".to_string(),
            qscale: 75,
        }
    }
}

impl NamedOptions for WebpSettings {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        Some(match name {
            "lossless" => self.lossless.into(),
            "compression" => self.compression.into(),
            "preset" => (&self.preset).into(),
            "qscale" => self.qscale.into(),
            _ => return None,
        })
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "lossless" => self.lossless = expect_bool(name, value)?,
            "compression" => self.compression = expect_u32(name, value)?,
            "preset" => self.preset = expect_text(name, value)?,
            "qscale" => self.qscale = expect_u32(name, value)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn option_names(&self) -> &'static [&'static str] {
        &["lossless", "compression", "preset", "qscale"]
    }
}

/// Réglages d'une famille d'encodeur (union fermée)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncoderSettings {
    X265(X265Settings),
    X264(X264Settings),
    Rav1e(Rav1eSettings),
    SvtAv1(SvtAv1Settings),
    Vp9(Vp9Settings),
    AomAv1(AomAv1Settings),
    Gif(GifSettings),
    Webp(WebpSettings),
}

impl EncoderSettings {
    /// Réglages par défaut d'une famille
    pub fn default_for(kind: EncoderKind) -> Self {
        match kind {
            EncoderKind::X265 => Self::X265(X265Settings::default()),
            EncoderKind::X264 => Self::X264(X264Settings::default()),
            EncoderKind::Rav1e => Self::Rav1e(Rav1eSettings::default()),
            EncoderKind::SvtAv1 => Self::SvtAv1(SvtAv1Settings::default()),
            EncoderKind::Vp9 => Self::Vp9(Vp9Settings::default()),
            EncoderKind::AomAv1 => Self::AomAv1(AomAv1Settings::default()),
            EncoderKind::Gif => Self::Gif(GifSettings::default()),
            EncoderKind::Webp => Self::Webp(WebpSettings::default()),
        }
    }

    pub fn kind(&self) -> EncoderKind {
        match self {
            Self::X265(_) => EncoderKind::X265,
            Self::X264(_) => EncoderKind::X264,
            Self::Rav1e(_) => EncoderKind::Rav1e,
            Self::SvtAv1(_) => EncoderKind::SvtAv1,
            Self::Vp9(_) => EncoderKind::Vp9,
            Self::AomAv1(_) => EncoderKind::AomAv1,
            Self::Gif(_) => EncoderKind::Gif,
            Self::Webp(_) => EncoderKind::Webp,
        }
    }

    pub fn options(&self) -> &dyn NamedOptions {
        match self {
            Self::X265(s) => s,
            Self::X264(s) => s,
            Self::Rav1e(s) => s,
            Self::SvtAv1(s) => s,
            Self::Vp9(s) => s,
            Self::AomAv1(s) => s,
            Self::Gif(s) => s,
            Self::Webp(s) => s,
        }
    }

    pub fn options_mut(&mut self) -> &mut dyn NamedOptions {
        match self {
            Self::X265(s) => s,
            Self::X264(s) => s,
            Self::Rav1e(s) => s,
            Self::SvtAv1(s) => s,
            Self::Vp9(s) => s,
            Self::AomAv1(s) => s,
            Self::Gif(s) => s,
            Self::Webp(s) => s,
        }
    }

    pub fn get(&self, name: &str) -> Result<OptionValue, OptionError> {
        self.options().require_option(name)
    }

    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        self.options_mut().set_option(name, value)
    }
}
