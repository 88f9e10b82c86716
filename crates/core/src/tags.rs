use crate::models::MediaMetadata;
use crate::ordered::OrderedSet;
use crate::patterns;

/// Tags a file's tracks and folder say it deserves, before looking at what
/// its name already carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTags {
    pub video_codec: Option<String>,
    pub resolution: Option<String>,
    pub bit_depth: Option<String>,
    pub audio_codecs: OrderedSet<String>,
    /// Distinct spoken languages, placeholder codes removed.
    pub audio_languages: OrderedSet<String>,
    pub source_keyword: Option<String>,
    pub has_pgs_subtitles: bool,
}

impl CanonicalTags {
    /// Languages joined with `+` in the order they were first seen.
    pub fn combined_languages(&self) -> String {
        self.audio_languages
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

pub fn extract(metadata: &MediaMetadata, folder_name: &str) -> CanonicalTags {
    let audio_codecs = metadata
        .audio
        .iter()
        .filter_map(|t| t.codec.clone())
        .collect();
    let audio_languages = metadata
        .audio
        .iter()
        .map(|t| t.language.clone())
        .filter(|l| !patterns::is_excluded_language(l))
        .collect();

    CanonicalTags {
        video_codec: metadata.video.codec.clone(),
        resolution: metadata.video.resolution.clone(),
        bit_depth: metadata.video.bit_depth.clone(),
        audio_codecs,
        audio_languages,
        source_keyword: patterns::source_keyword(folder_name).map(str::to_string),
        has_pgs_subtitles: metadata
            .subtitles
            .iter()
            .any(|s| s.codec.as_deref() == Some("PGS")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioTrack, SubtitleTrack, VideoTrack};

    fn audio(codec: &str, language: &str) -> AudioTrack {
        AudioTrack {
            codec: Some(codec.to_string()),
            language: language.to_string(),
            channels: Some(2),
        }
    }

    #[test]
    fn collects_codecs_regardless_of_language() {
        let md = MediaMetadata {
            video: VideoTrack {
                resolution: Some("1080p".into()),
                bit_depth: Some("10bit".into()),
                codec: Some("HEVC".into()),
            },
            audio: vec![
                audio("FLAC", "JA"),
                audio("AAC", "UND"),
                audio("FLAC", "EN"),
                audio("AAC", "JA"),
                audio("Opus", ""),
            ],
            subtitles: vec![SubtitleTrack {
                language: "EN".into(),
                title: None,
                codec: Some("ASS".into()),
            }],
        };
        let tags = extract(&md, "complete");
        assert_eq!(tags.audio_codecs.as_slice(), &["FLAC", "AAC", "Opus"]);
        assert_eq!(tags.audio_languages.as_slice(), &["JA", "EN"]);
        assert_eq!(tags.combined_languages(), "JA+EN");
        assert_eq!(tags.source_keyword, None);
        assert!(!tags.has_pgs_subtitles);
    }

    #[test]
    fn detects_pgs_and_folder_source() {
        let md = MediaMetadata {
            video: VideoTrack::default(),
            audio: vec![audio("AAC", "JA")],
            subtitles: vec![
                SubtitleTrack {
                    language: "EN".into(),
                    title: Some("Signs".into()),
                    codec: Some("ASS".into()),
                },
                SubtitleTrack {
                    language: "EN".into(),
                    title: None,
                    codec: Some("PGS".into()),
                },
            ],
        };
        let tags = extract(&md, "[Group] Show S01 (BDRip 1080p)");
        assert!(tags.has_pgs_subtitles);
        assert_eq!(tags.source_keyword.as_deref(), Some("BDRip"));
        assert_eq!(tags.video_codec, None);
    }
}
