//! Rendition metadata and the selectable options built from it.

use serde::Deserialize;
use serde_json::Value;

use crate::download::error::DownloadError;
use crate::download::source::{MediaInfo, MediaKind};

const NONE_CODEC: &str = "none";

/// One entry of yt-dlp's `formats` array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatInfo {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    /// Audio bitrate in kbit/s
    pub abr: Option<f64>,
    pub format_note: Option<String>,
    pub resolution: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filesize: Option<u64>,
}

/// Format entry as yt-dlp prints it.
#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    abr: Option<f64>,
    format_note: Option<String>,
    resolution: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
}

impl From<RawFormat> for FormatInfo {
    fn from(raw: RawFormat) -> Self {
        Self {
            format_id: raw.format_id,
            ext: raw.ext,
            vcodec: raw.vcodec,
            acodec: raw.acodec,
            abr: raw.abr,
            format_note: raw.format_note,
            resolution: raw.resolution,
            width: raw.width,
            height: raw.height,
            filesize: raw.filesize.or(raw.filesize_approx),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMediaInfo {
    title: Option<String>,
    formats: Option<Vec<RawFormat>>,
}

impl FormatInfo {
    fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some(NONE_CODEC)
    }

    fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some(NONE_CODEC)
    }

    /// Audio-only rendition.
    pub fn is_audio_only(&self) -> bool {
        !self.has_video() && self.has_audio()
    }

    /// Rendition carrying both streams. A missing codec field counts as present.
    pub fn is_muxed(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    fn audio_label(&self) -> String {
        let abr = self
            .abr
            .map(|abr| format!("{}", abr.round() as u64))
            .unwrap_or_else(|| "N/A".to_string());
        let ext = self.ext.as_deref().unwrap_or("m4a");
        format!("🎧 {}kbps ({})", abr, ext)
    }

    fn video_label(&self) -> String {
        let res = self
            .format_note
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.resolution.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("N/A");
        let ext = self.ext.as_deref().unwrap_or("mp4");
        format!("🎥 {} ({})", res.to_uppercase(), ext)
    }
}

/// Parses the `--dump-single-json` document.
pub fn parse_media_info(json: &Value) -> Result<MediaInfo, DownloadError> {
    let raw = RawMediaInfo::deserialize(json)?;
    let formats = raw
        .formats
        .ok_or_else(|| DownloadError::Parse("yt-dlp JSON has no formats array".to_string()))?;

    Ok(MediaInfo {
        title: raw.title,
        formats: formats.into_iter().map(FormatInfo::from).collect(),
    })
}

/// A button the user can press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOption {
    pub label: String,
    pub kind: MediaKind,
    pub format_id: String,
}

/// Builds the option list: audio-only renditions first, then muxed ones.
///
/// Options are keyed by label. A later rendition with the same label takes
/// over the earlier entry but keeps its position.
pub fn build_format_options(formats: &[FormatInfo]) -> Vec<FormatOption> {
    let audio = formats
        .iter()
        .filter(|f| f.is_audio_only())
        .map(|f| (f, MediaKind::Audio, f.audio_label()));
    let video = formats
        .iter()
        .filter(|f| f.is_muxed())
        .map(|f| (f, MediaKind::Video, f.video_label()));

    let mut options: Vec<FormatOption> = Vec::new();
    for (format, kind, label) in audio.chain(video) {
        let Some(format_id) = format.format_id.clone() else {
            log::debug!("Skipping format without id: {}", label);
            continue;
        };

        let option = FormatOption { label, kind, format_id };
        match options.iter_mut().find(|existing| existing.label == option.label) {
            Some(existing) => *existing = option,
            None => options.push(option),
        }
    }

    options
}
