use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::age::{self, AgeGate};
use crate::config::RenameConfig;
use crate::error::{Error, Result};
use crate::merge;
use crate::metadata::{fetch_metadata, MetadataProvider};
use crate::models::{
    FileOutcome, FileReport, MediaMetadata, Relocation, RenamePlan, ScanResult, ScanStats,
    SkipReason,
};
use crate::normalize;
use crate::tags;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    /// When set, only this file (matched by name inside `root`) is handled.
    pub single_file: Option<PathBuf>,
    pub rename: RenameConfig,
    pub dry_run: bool,
    /// Reference instant for file ages; the wall clock when unset.
    pub now: Option<SystemTime>,
}

impl ScanConfig {
    pub fn for_folder(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            single_file: None,
            rename: RenameConfig::default(),
            dry_run: false,
            now: None,
        }
    }

    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let root = file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            single_file: Some(file),
            ..Self::for_folder(root)
        }
    }

    pub fn with_rename(mut self, rename: RenameConfig) -> Self {
        self.rename = rename;
        self
    }
}

pub fn scan<P: MetadataProvider>(config: &ScanConfig, provider: &P) -> Result<ScanResult> {
    scan_with_progress(config, provider, |_| {})
}

pub fn scan_with_progress<P, F>(
    config: &ScanConfig,
    provider: &P,
    mut on_report: F,
) -> Result<ScanResult>
where
    P: MetadataProvider,
    F: FnMut(&FileReport),
{
    if !config.root.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "root is not a directory: {}",
            config.root.to_string_lossy()
        )));
    }

    info!("Starting...");
    let now = config.now.unwrap_or_else(SystemTime::now);
    let gate = AgeGate::new(config.rename.required_wait_time, config.rename.max_wait_time);
    let mut stats = ScanStats::default();
    let mut reports = Vec::new();

    let root_name = config.root.file_name().and_then(OsStr::to_str);
    if root_name.is_some_and(|name| config.rename.is_ignored_folder(name)) {
        info!("{} is an ignored folder", config.root.display());
        info!("Finished.");
        return Ok(ScanResult { stats, reports });
    }

    let mut walker = WalkDir::new(&config.root)
        .follow_links(false)
        .sort_by_file_name();
    if config.single_file.as_deref().and_then(Path::parent) == Some(config.root.as_path()) {
        walker = walker.max_depth(1);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| keep_entry(e, &config.rename))
    {
        let entry = match entry {
            Ok(v) => v,
            Err(err) => {
                warn!("Error accessing entry: {err}");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if in_complete_tree(entry.path(), &config.rename.complete_marker) {
                info!("{}", entry.path().display());
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let in_complete = path
            .parent()
            .is_some_and(|dir| in_complete_tree(dir, &config.rename.complete_marker));
        if !in_complete {
            continue;
        }

        let outcome = process_file(path, config, &gate, now, provider);
        stats.record(&outcome);
        let report = FileReport {
            path: path.to_path_buf(),
            outcome,
        };
        on_report(&report);
        reports.push(report);
    }

    info!(
        "seen: {}, renamed: {}, moved: {}, unchanged: {}, skipped: {}, no metadata: {}, failed: {}",
        stats.files_seen,
        stats.renamed,
        stats.moved,
        stats.unchanged,
        stats.skipped,
        stats.no_metadata,
        stats.failed
    );
    info!("Finished.");
    Ok(ScanResult { stats, reports })
}

/// Directory pruning: ignored names and names starting with `.` or `_` are
/// not descended into. The walk root is always kept.
fn keep_entry(entry: &DirEntry, rename: &RenameConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return true;
    };
    !(name.starts_with('.') || name.starts_with('_') || rename.is_ignored_folder(name))
}

fn in_complete_tree(dir: &Path, marker: &str) -> bool {
    dir.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| n.starts_with(marker)),
        _ => false,
    })
}

fn process_file<P: MetadataProvider>(
    path: &Path,
    config: &ScanConfig,
    gate: &AgeGate,
    now: SystemTime,
    provider: &P,
) -> FileOutcome {
    let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
        warn!("{}: file name is not valid UTF-8", path.display());
        return FileOutcome::Failed("file name is not valid UTF-8".to_string());
    };

    if file_name.starts_with('.') || file_name.starts_with('_') {
        debug!("{file_name}: hidden, skipping");
        return FileOutcome::Skipped(SkipReason::Hidden);
    }
    let (_, extension) = normalize::split_name(file_name);
    if !config.rename.allows_extension(extension) {
        debug!("{file_name}: extension not allowed, skipping");
        return FileOutcome::Skipped(SkipReason::Extension);
    }
    if let Some(selected) = &config.single_file {
        if selected.file_name() != Some(OsStr::new(file_name)) {
            return FileOutcome::Skipped(SkipReason::NotSelected);
        }
    }

    match try_process_file(path, file_name, config, gate, now, provider) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("{file_name}: {err}");
            FileOutcome::Failed(err.to_string())
        }
    }
}

fn try_process_file<P: MetadataProvider>(
    path: &Path,
    file_name: &str,
    config: &ScanConfig,
    gate: &AgeGate,
    now: SystemTime,
    provider: &P,
) -> Result<FileOutcome> {
    let candidate = age::candidate_at(path, now)?;
    if !gate.admits_candidate(&candidate) {
        info!(
            "{file_name}: created {:.1} min ago, modified {:.1} min ago; waiting for the {}-{} minute window",
            candidate.creation_age, candidate.modification_age, gate.required, gate.max
        );
        return Ok(FileOutcome::Skipped(SkipReason::OutsideAgeWindow {
            creation_age: candidate.creation_age,
            modification_age: candidate.modification_age,
        }));
    }

    info!("{file_name}");
    let Some(metadata) = fetch_metadata(provider, path)? else {
        info!("{file_name}: no metadata");
        return Ok(FileOutcome::NoMetadata);
    };
    log_metadata(file_name, &metadata);

    let folder_name = path
        .parent()
        .and_then(Path::file_name)
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let (stem, _) = normalize::split_name(file_name);
    let canonical = tags::extract(&metadata, folder_name);
    let missing = merge::merge(&canonical, stem);
    if !missing.is_empty() {
        let added: Vec<&str> = missing.iter().map(String::as_str).collect();
        info!("{file_name}: adding {}", added.join(", "));
    }

    let relocate =
        config.rename.move_to_folder && folder_name == config.rename.downloads_folder_name;
    let Some(plan) = normalize::plan(path, &missing, relocate) else {
        debug!("{file_name}: name already complete");
        return Ok(FileOutcome::Unchanged);
    };
    apply(&plan, config.dry_run)
}

fn log_metadata(file_name: &str, metadata: &MediaMetadata) {
    let video = &metadata.video;
    debug!(
        "{file_name}: video {} {} {}",
        video.codec.as_deref().unwrap_or("?"),
        video.resolution.as_deref().unwrap_or("?"),
        video.bit_depth.as_deref().unwrap_or("?")
    );
    for track in &metadata.audio {
        debug!(
            "{file_name}: audio {} [{}] {} ch",
            track.codec.as_deref().unwrap_or("?"),
            track.language,
            track.channels.map_or_else(|| "?".to_string(), |c| c.to_string())
        );
    }
    for track in &metadata.subtitles {
        if let Some(codec) = &track.codec {
            debug!("{file_name}: subtitle {codec} [{}]", track.language);
        }
    }
}

fn apply(plan: &RenamePlan, dry_run: bool) -> Result<FileOutcome> {
    let target = plan.target_path();
    let from = plan.original.file_name().unwrap_or_default().to_string_lossy();
    info!("Renaming FROM: {from} TO: {}", plan.new_file_name());

    if dry_run {
        info!("dry run, leaving {from} in place");
        return Ok(FileOutcome::Renamed {
            to: target,
            relocation: Relocation::NotRequested,
        });
    }

    if target.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        )));
    }
    fs::rename(&plan.original, &target)?;
    info!("File successfully renamed");

    let relocation = if plan.relocate {
        relocate(plan, &target)
    } else {
        Relocation::NotRequested
    };
    Ok(FileOutcome::Renamed {
        to: target,
        relocation,
    })
}

/// Moves a renamed file from the flat downloads folder into a sibling folder
/// named after its original file name.
fn relocate(plan: &RenamePlan, renamed: &Path) -> Relocation {
    let folder = plan.original.as_path();
    let destination = folder.join(plan.new_file_name());

    let result = (|| -> Result<Relocation> {
        if !folder.exists() {
            info!("Creating folder {}", folder.display());
            fs::create_dir(folder)?;
        }
        if destination.is_file() {
            info!("File already exists at {}", destination.display());
            return Ok(Relocation::AlreadyExists(destination.clone()));
        }
        fs::rename(renamed, &destination)?;
        info!("File successfully moved to {}", destination.display());
        Ok(Relocation::Moved(destination.clone()))
    })();

    result.unwrap_or_else(|err| {
        warn!("File move failed: {err}");
        Relocation::Failed(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_marker_matches_path_components() {
        assert!(in_complete_tree(Path::new("/data/complete/show"), "complete"));
        assert!(in_complete_tree(Path::new("/data/completed"), "complete"));
        assert!(!in_complete_tree(Path::new("/data/incomplete/show"), "complete"));
        assert!(!in_complete_tree(Path::new("/data/downloads"), "complete"));
    }

    #[test]
    fn relocation_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let downloads = tmp.path().join("downloads");
        let folder = downloads.join("Show.01.mkv");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Show 01 [HEVC].mkv"), b"older").unwrap();
        let renamed = downloads.join("Show 01 [HEVC].mkv");
        fs::write(&renamed, b"newer").unwrap();

        let plan = RenamePlan {
            original: folder.clone(),
            new_stem: "Show 01 [HEVC]".to_string(),
            extension: ".mkv".to_string(),
            relocate: true,
        };
        assert_eq!(
            relocate(&plan, &renamed),
            Relocation::AlreadyExists(folder.join("Show 01 [HEVC].mkv"))
        );
        assert!(renamed.is_file());
        assert_eq!(fs::read(folder.join("Show 01 [HEVC].mkv")).unwrap(), b"older");
    }

    #[test]
    fn keeps_root_even_when_hidden() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".complete");
        fs::create_dir_all(root.join("_tmp")).unwrap();
        let rename = RenameConfig::default();
        let kept: Vec<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| keep_entry(e, &rename))
            .map(|e| e.unwrap().into_path())
            .collect();
        assert_eq!(kept, vec![root]);
    }

    #[test]
    fn bare_file_name_scans_current_folder() {
        let cfg = ScanConfig::for_file("Show - 01.mkv");
        assert_eq!(cfg.root, PathBuf::from("."));
        assert_eq!(cfg.single_file.as_deref(), Some(Path::new("Show - 01.mkv")));
    }

    #[test]
    fn for_file_scans_parent_folder() {
        let cfg = ScanConfig::for_file("/data/complete/Show - 01.mkv");
        assert_eq!(cfg.root, PathBuf::from("/data/complete"));
        assert_eq!(
            cfg.single_file.as_deref(),
            Some(Path::new("/data/complete/Show - 01.mkv"))
        );
    }
}
