use super::encoder::EncoderSettings;
use super::profile::Profile;
use super::status::{Status, StatusError};
use super::track::{AudioTrack, ConversionCommand, SubtitleTrack};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Crop invalide '{0}' (attendu largeur:hauteur:x:y)")]
    InvalidCrop(String),

    #[error("Temps invalide '{0}' (attendu secondes ou HH:MM:SS[.fraction])")]
    InvalidTime(String),

    #[error("Sortie ffprobe invalide: {0}")]
    InvalidProbe(String),

    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Rectangle de crop au format ffmpeg `largeur:hauteur:x:y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub width: u32,
    pub height: u32,
    pub left: u32,
    pub top: u32,
}

impl FromStr for Crop {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(':')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VideoError::InvalidCrop(s.to_string()))?;

        match parts.as_slice() {
            [width, height, left, top] if *width > 0 && *height > 0 => Ok(Self {
                width: *width,
                height: *height,
                left: *left,
                top: *top,
            }),
            _ => Err(VideoError::InvalidCrop(s.to_string())),
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.left, self.top)
    }
}

/// Transformation choisie par l'utilisateur pour un job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub crop: Option<Crop>,
    /// Début du trim en secondes
    pub start_time: f64,
    /// Fin du trim en secondes (0 = fin de la source)
    pub end_time: f64,
    pub fast_seek: bool,
    pub rotate: u16,
    pub vertical_flip: bool,
    pub horizontal_flip: bool,
    pub remove_metadata: bool,
    pub copy_chapters: bool,
    pub video_title: String,
    pub selected_track: usize,
    pub output_path: Option<PathBuf>,
    /// Filtre scale ffmpeg (ex: "1920:-8")
    pub scale: Option<String>,
    /// Arguments ffmpeg libres
    pub ffmpeg_extra: String,
    pub encoder_settings: EncoderSettings,
    pub audio_tracks: Vec<AudioTrack>,
    pub subtitle_tracks: Vec<SubtitleTrack>,
    pub conversion_commands: Vec<ConversionCommand>,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self::from_profile(&Profile::default())
    }
}

impl VideoSettings {
    /// Lier un job au profil: les réglages d'encodeur sont copiés puis indépendants
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            crop: None,
            start_time: 0.0,
            end_time: 0.0,
            fast_seek: profile.fast_seek,
            rotate: profile.rotate,
            vertical_flip: profile.vertical_flip,
            horizontal_flip: profile.horizontal_flip,
            remove_metadata: profile.remove_metadata,
            copy_chapters: profile.copy_chapters,
            video_title: String::new(),
            selected_track: 0,
            output_path: None,
            scale: None,
            ffmpeg_extra: String::new(),
            encoder_settings: profile.active_settings(),
            audio_tracks: vec![],
            subtitle_tracks: vec![],
            conversion_commands: vec![],
        }
    }

    /// Durée effective après trim
    pub fn trimmed_duration(&self, source_duration: f64) -> f64 {
        let end = if self.end_time > 0.0 {
            self.end_time.min(source_duration)
        } else {
            source_duration
        };
        (end - self.start_time).max(0.0)
    }
}

/// Convertir un temps saisi en secondes
///
/// Accepte des secondes (`"90"`, `"12.5"`) ou `[[HH:]MM:]SS[.fraction]`.
pub fn parse_time(value: &str) -> Result<f64, VideoError> {
    let value = value.trim();
    let invalid = || VideoError::InvalidTime(value.to_string());

    if let Ok(seconds) = value.parse::<f64>() {
        return if seconds.is_finite() && seconds >= 0.0 {
            Ok(seconds)
        } else {
            Err(invalid())
        };
    }

    let (base, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let mut total = if fraction.is_empty() {
        0.0
    } else {
        format!("0.{fraction}").parse::<f64>().map_err(|_| invalid())?
    };

    let parts: Vec<&str> = base.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }
    for (position, part) in parts.iter().rev().enumerate() {
        let unit = part.parse::<u64>().map_err(|_| invalid())?;
        total += unit as f64 * 60f64.powi(position as i32);
    }
    Ok(total)
}

/// Faits sondés sur la source (immuables une fois le job créé)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Durée en secondes
    pub duration: f64,
    pub pix_fmt: String,
    pub color_space: String,
    pub color_primaries: String,
    pub color_transfer: String,
    /// Métadonnées HDR10 "Mastering display metadata"
    pub master_display: Option<Value>,
    /// Content light level "max_content,max_average"
    pub cll: String,
    /// Streams bruts renvoyés par ffprobe
    pub streams: Value,
    /// Section format brute renvoyée par ffprobe
    pub format: Value,
}

/// Sous-ensemble typé d'un stream ffprobe
#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    color_space: Option<String>,
    color_primaries: Option<String>,
    color_transfer: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<Value>,
}

impl VideoInfo {
    /// Construire à partir de la sortie JSON de `ffprobe -show_streams -show_format`
    pub fn from_probe(probe: &Value) -> Result<Self, VideoError> {
        let streams = probe
            .get("streams")
            .and_then(Value::as_array)
            .ok_or_else(|| VideoError::InvalidProbe("section streams absente".to_string()))?;
        let format = probe.get("format").cloned().unwrap_or(Value::Null);

        let video = streams
            .iter()
            .filter_map(|s| serde_json::from_value::<ProbeStream>(s.clone()).ok())
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| VideoError::InvalidProbe("aucun stream vidéo".to_string()))?;

        let duration = format
            .get("duration")
            .and_then(Value::as_str)
            .or(video.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let master_display = video
            .side_data_list
            .iter()
            .find(|d| side_data_type(d) == Some("Mastering display metadata"))
            .cloned();

        let cll = video
            .side_data_list
            .iter()
            .find(|d| side_data_type(d) == Some("Content light level metadata"))
            .map(|d| {
                format!(
                    "{},{}",
                    d.get("max_content").and_then(Value::as_u64).unwrap_or(0),
                    d.get("max_average").and_then(Value::as_u64).unwrap_or(0)
                )
            })
            .unwrap_or_default();

        Ok(Self {
            width: video.width.unwrap_or(0),
            height: video.height.unwrap_or(0),
            duration,
            pix_fmt: video.pix_fmt.unwrap_or_default(),
            color_space: video.color_space.unwrap_or_default(),
            color_primaries: video.color_primaries.unwrap_or_default(),
            color_transfer: video.color_transfer.unwrap_or_default(),
            master_display,
            cll,
            streams: Value::Array(streams.clone()),
            format,
        })
    }

    /// Source HDR10 (transfert PQ + primaires BT.2020)
    pub fn is_hdr10(&self) -> bool {
        self.color_transfer == "smpte2084" && self.color_primaries == "bt2020"
    }
}

fn side_data_type(data: &Value) -> Option<&str> {
    data.get("side_data_type").and_then(Value::as_str)
}

/// Job vidéo: une source ouverte avec ses réglages et son status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    id: Uuid,
    source: PathBuf,
    info: VideoInfo,
    created_at: DateTime<Utc>,
    /// Répertoire de travail temporaire du job
    pub work_path: Option<PathBuf>,
    pub video_settings: VideoSettings,
    pub status: Status,
}

impl Video {
    /// Créer un job lié au profil actif
    pub fn new(source: PathBuf, info: VideoInfo, profile: &Profile) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            info,
            created_at: Utc::now(),
            work_path: None,
            video_settings: VideoSettings::from_profile(profile),
            status: Status::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Ajouter une commande de conversion (uniquement hors exécution)
    pub fn push_command(&mut self, command: ConversionCommand) -> Result<(), VideoError> {
        if self.status.running() {
            return Err(StatusError::AlreadyRunning.into());
        }
        self.video_settings.conversion_commands.push(command);
        Ok(())
    }

    /// Avancer vers la commande `index` de `conversion_commands`
    pub fn advance_command(&mut self, index: usize) -> Result<(), VideoError> {
        let len = self.video_settings.conversion_commands.len();
        self.status.advance_to(index, len)?;
        Ok(())
    }

    /// Commande en cours d'exécution
    pub fn current_command(&self) -> Option<&ConversionCommand> {
        if !self.status.running() {
            return None;
        }
        self.video_settings
            .conversion_commands
            .get(self.status.current_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::encoder::EncoderKind;
    use crate::types::options::OptionValue;
    use serde_json::json;

    fn probe_fixture() -> Value {
        json!({
            "streams": [
                {"index": 0, "codec_type": "audio", "codec_name": "eac3"},
                {
                    "index": 1,
                    "codec_type": "video",
                    "codec_name": "hevc",
                    "width": 3840,
                    "height": 2160,
                    "pix_fmt": "yuv420p10le",
                    "color_space": "bt2020nc",
                    "color_primaries": "bt2020",
                    "color_transfer": "smpte2084",
                    "side_data_list": [
                        {"side_data_type": "Mastering display metadata", "max_luminance": "10000000/10000"},
                        {"side_data_type": "Content light level metadata", "max_content": 1000, "max_average": 400}
                    ]
                }
            ],
            "format": {"duration": "5423.120000", "format_name": "matroska,webm"}
        })
    }

    fn command(name: &str) -> ConversionCommand {
        ConversionCommand {
            name: name.to_string(),
            program: "ffmpeg".to_string(),
            args: vec!["-i".to_string(), "in.mkv".to_string()],
            internal: false,
        }
    }

    #[test]
    fn test_crop_parse_and_format() {
        let crop: Crop = "1920:800:0:140".parse().unwrap();
        assert_eq!(
            crop,
            Crop {
                width: 1920,
                height: 800,
                left: 0,
                top: 140
            }
        );
        assert_eq!(crop.to_string(), "1920:800:0:140");

        assert!("1920:800:0".parse::<Crop>().is_err());
        assert!("0:800:0:0".parse::<Crop>().is_err());
        assert!("a:b:c:d".parse::<Crop>().is_err());
    }

    #[test]
    fn test_info_from_probe() {
        let info = VideoInfo::from_probe(&probe_fixture()).unwrap();
        assert_eq!((info.width, info.height), (3840, 2160));
        assert_eq!(info.pix_fmt, "yuv420p10le");
        assert!((info.duration - 5423.12).abs() < 1e-6);
        assert!(info.is_hdr10());
        assert!(info.master_display.is_some());
        assert_eq!(info.cll, "1000,400");
        assert_eq!(info.streams.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_probe_without_video_stream() {
        let probe = json!({"streams": [{"codec_type": "audio"}]});
        assert!(matches!(
            VideoInfo::from_probe(&probe),
            Err(VideoError::InvalidProbe(_))
        ));
        assert!(VideoInfo::from_probe(&json!({})).is_err());
    }

    #[test]
    fn test_settings_copied_from_profile_then_independent() {
        let mut profile = Profile::default();
        profile.encoder = EncoderKind::X264;
        profile.x264.crf = 17;
        profile.vertical_flip = true;

        let mut video = Video::new(PathBuf::from("movie.mkv"), VideoInfo::default(), &profile);
        assert!(video.video_settings.vertical_flip);
        assert_eq!(video.video_settings.encoder_settings.kind(), EncoderKind::X264);

        video
            .video_settings
            .encoder_settings
            .set("crf", OptionValue::Int(30))
            .unwrap();
        assert_eq!(profile.x264.crf, 17);
    }

    #[test]
    fn test_trimmed_duration() {
        let mut settings = VideoSettings::default();
        assert_eq!(settings.trimmed_duration(100.0), 100.0);

        settings.start_time = 10.0;
        settings.end_time = 40.0;
        assert_eq!(settings.trimmed_duration(100.0), 30.0);

        settings.end_time = 400.0;
        assert_eq!(settings.trimmed_duration(100.0), 90.0);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("90").unwrap(), 90.0);
        assert_eq!(parse_time("12.5").unwrap(), 12.5);
        assert_eq!(parse_time("1:02:03.5").unwrap(), 3723.5);
        assert_eq!(parse_time("02:30").unwrap(), 150.0);
        assert!((parse_time("0:00:01.05").unwrap() - 1.05).abs() < 1e-9);
        assert_eq!(parse_time(" 0:10 ").unwrap(), 10.0);

        for bad in ["", "abc", "1:xx:03", "1:2:3:4", "-5", "inf", "1:00.5.2", "1:00.a"] {
            assert!(
                matches!(parse_time(bad), Err(VideoError::InvalidTime(_))),
                "'{bad}' devrait être refusé"
            );
        }
    }

    #[test]
    fn test_job_run_snapshots_keep_invariants() {
        let mut video = Video::new(
            PathBuf::from("movie.mkv"),
            VideoInfo::default(),
            &Profile::default(),
        );
        video.push_command(command("pass 1")).unwrap();
        video.push_command(command("pass 2")).unwrap();

        let mut snapshots = vec![video.status.clone()];

        video.status.start().unwrap();
        snapshots.push(video.status.clone());
        assert_eq!(video.current_command().map(|c| c.name.as_str()), Some("pass 1"));
        assert!(video.push_command(command("late")).is_err());

        video.advance_command(1).unwrap();
        snapshots.push(video.status.clone());
        assert!(video.advance_command(0).is_err());
        assert!(video.advance_command(2).is_err());

        video.status.succeed().unwrap();
        snapshots.push(video.status.clone());
        video.status.mark_complete().unwrap();
        snapshots.push(video.status.clone());

        for snapshot in &snapshots {
            snapshot.validate().unwrap();
        }
        let last = snapshots.last().unwrap();
        assert!(!last.running() && last.success() && !last.error() && last.complete());
        assert!(video.current_command().is_none());
    }
}
