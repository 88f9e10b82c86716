use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Deserialize;
use wait_timeout::ChildExt;

use crate::error::{Error, Result};
use crate::models::{AudioTrack, MediaMetadata, SubtitleTrack, VideoTrack};
use crate::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    General,
    Video,
    Audio,
    Text,
    Other,
}

/// Track attributes as reported by a metadata backend, before any
/// interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrack {
    pub kind: TrackKind,
    pub height: Option<u32>,
    pub bit_depth: Option<u32>,
    pub commercial_name: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
    pub channels: Option<u32>,
}

impl RawTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            height: None,
            bit_depth: None,
            commercial_name: None,
            language: None,
            title: None,
            channels: None,
        }
    }
}

pub trait MetadataProvider {
    fn tracks(&self, path: &Path) -> Result<Vec<RawTrack>>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn tracks(&self, path: &Path) -> Result<Vec<RawTrack>> {
        (**self).tracks(path)
    }
}

/// Fetches tracks and interprets them; `Ok(None)` means the file lacks a
/// video, audio or subtitle track.
pub fn fetch_metadata<P: MetadataProvider + ?Sized>(
    provider: &P,
    path: &Path,
) -> Result<Option<MediaMetadata>> {
    let tracks = provider.tracks(path)?;
    Ok(MediaMetadata::from_tracks(&tracks))
}

impl MediaMetadata {
    pub fn from_tracks(tracks: &[RawTrack]) -> Option<Self> {
        let mut video = None;
        let mut audio = Vec::new();
        let mut subtitles = Vec::new();

        for track in tracks {
            match track.kind {
                TrackKind::Video if video.is_none() => {
                    video = Some(VideoTrack {
                        resolution: track.height.map(|h| format!("{h}p")),
                        bit_depth: track.bit_depth.map(|b| format!("{b}bit")),
                        codec: non_empty(&track.commercial_name),
                    });
                }
                TrackKind::Audio => audio.push(AudioTrack {
                    codec: non_empty(&track.commercial_name),
                    language: audio_language(track),
                    channels: track.channels,
                }),
                TrackKind::Text => subtitles.push(SubtitleTrack {
                    language: non_empty(&track.language)
                        .map(|l| l.to_uppercase())
                        .unwrap_or_default(),
                    title: non_empty(&track.title),
                    codec: non_empty(&track.commercial_name),
                }),
                _ => {}
            }
        }

        let video = video?;
        if audio.is_empty() || subtitles.is_empty() {
            return None;
        }
        Some(Self {
            video,
            audio,
            subtitles,
        })
    }
}

fn audio_language(track: &RawTrack) -> String {
    if let Some(lang) = non_empty(&track.language) {
        return lang.to_uppercase();
    }
    non_empty(&track.title)
        .and_then(|title| patterns::language_from_title(&title))
        .unwrap_or_default()
        .to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Runs the `mediainfo` executable and decodes its JSON report.
#[derive(Debug, Clone)]
pub struct MediaInfoCli {
    program: PathBuf,
    timeout: Duration,
}

impl MediaInfoCli {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for MediaInfoCli {
    fn default() -> Self {
        Self::new("mediainfo", Duration::from_secs(60))
    }
}

impl MetadataProvider for MediaInfoCli {
    fn tracks(&self, path: &Path) -> Result<Vec<RawTrack>> {
        let mut child = Command::new(&self.program)
            .arg("--Output=JSON")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                Error::Metadata(format!(
                    "failed to run {}: {err}",
                    self.program.to_string_lossy()
                ))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Metadata("mediainfo stdout unavailable".to_string()))?;
        // Drained on a side thread so a large report cannot fill the pipe
        // while we wait on the child.
        let reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return Err(Error::Metadata(format!(
                    "mediainfo timed out after {}s on {}",
                    self.timeout.as_secs(),
                    path.to_string_lossy()
                )));
            }
        };

        let output = reader
            .join()
            .map_err(|_| Error::Metadata("mediainfo reader thread panicked".to_string()))??;

        if !status.success() {
            return Err(Error::Metadata(format!(
                "mediainfo exited with {status} on {}",
                path.to_string_lossy()
            )));
        }

        parse_mediainfo_json(&output)
    }
}

#[derive(Debug, Deserialize)]
struct MediaInfoReport {
    media: Option<MediaInfoMedia>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoMedia {
    #[serde(default)]
    track: Vec<MediaInfoTrack>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoTrack {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "Height")]
    height: Option<String>,
    #[serde(rename = "BitDepth")]
    bit_depth: Option<String>,
    #[serde(rename = "Format")]
    format: Option<String>,
    #[serde(rename = "Format_Commercial")]
    format_commercial: Option<String>,
    #[serde(rename = "Format_Commercial_IfAny")]
    format_commercial_if_any: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Channels")]
    channels: Option<String>,
}

/// Decodes `mediainfo --Output=JSON`. All values arrive as strings.
pub fn parse_mediainfo_json(bytes: &[u8]) -> Result<Vec<RawTrack>> {
    let report: MediaInfoReport = serde_json::from_slice(bytes)?;
    let Some(media) = report.media else {
        return Ok(Vec::new());
    };

    Ok(media
        .track
        .into_iter()
        .map(|t| {
            let kind = match t.kind.as_str() {
                "General" => TrackKind::General,
                "Video" => TrackKind::Video,
                "Audio" => TrackKind::Audio,
                "Text" => TrackKind::Text,
                _ => TrackKind::Other,
            };
            RawTrack {
                kind,
                height: t.height.as_deref().and_then(leading_number),
                bit_depth: t.bit_depth.as_deref().and_then(leading_number),
                commercial_name: t.format_commercial.or(t.format_commercial_if_any).or(t.format),
                language: t.language,
                title: t.title,
                channels: t.channels.as_deref().and_then(leading_number),
            }
        })
        .collect())
}

fn leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
