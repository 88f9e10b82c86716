use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoTrack {
    pub resolution: Option<String>,
    pub bit_depth: Option<String>,
    pub codec: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioTrack {
    pub codec: Option<String>,
    pub language: String,
    pub channels: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub language: String,
    pub title: Option<String>,
    pub codec: Option<String>,
}

/// Tracks of one media file. Only built when a video track, at least one
/// audio track and at least one subtitle track are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub video: VideoTrack,
    pub audio: Vec<AudioTrack>,
    pub subtitles: Vec<SubtitleTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileCandidate<'a> {
    pub path: &'a Path,
    pub creation_age: f64,
    pub modification_age: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub original: PathBuf,
    pub new_stem: String,
    /// Includes the leading dot, empty when the file has no extension.
    pub extension: String,
    pub relocate: bool,
}

impl RenamePlan {
    pub fn new_file_name(&self) -> String {
        format!("{}{}", self.new_stem, self.extension)
    }

    pub fn target_path(&self) -> PathBuf {
        self.original.with_file_name(self.new_file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    Extension,
    Hidden,
    NotSelected,
    OutsideAgeWindow {
        creation_age: f64,
        modification_age: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    NotRequested,
    Moved(PathBuf),
    AlreadyExists(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Renamed { to: PathBuf, relocation: Relocation },
    Unchanged,
    Skipped(SkipReason),
    NoMetadata,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_seen: u64,
    pub renamed: u64,
    pub moved: u64,
    pub unchanged: u64,
    pub skipped: u64,
    pub no_metadata: u64,
    pub failed: u64,
}

impl ScanStats {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_seen += 1;
        match outcome {
            FileOutcome::Renamed { relocation, .. } => {
                self.renamed += 1;
                if matches!(relocation, Relocation::Moved(_)) {
                    self.moved += 1;
                }
            }
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Skipped(_) => self.skipped += 1,
            FileOutcome::NoMetadata => self.no_metadata += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub stats: ScanStats,
    pub reports: Vec<FileReport>,
}
