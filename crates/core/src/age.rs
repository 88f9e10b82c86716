use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;
use crate::models::FileCandidate;

/// Admits files that finished writing a while ago but not too long ago.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeGate {
    pub required: f64,
    pub max: f64,
}

impl AgeGate {
    pub fn new(required: f64, max: f64) -> Self {
        Self { required, max }
    }

    pub fn admits(&self, creation_age: f64, modification_age: f64) -> bool {
        self.within(creation_age) && self.within(modification_age)
    }

    pub fn admits_candidate(&self, candidate: &FileCandidate<'_>) -> bool {
        self.admits(candidate.creation_age, candidate.modification_age)
    }

    fn within(&self, age: f64) -> bool {
        age >= self.required && age <= self.max
    }
}

/// Reads both timestamps of `path` and converts them to ages relative to `now`.
pub fn candidate_at(path: &Path, now: SystemTime) -> Result<FileCandidate<'_>> {
    let md = std::fs::metadata(path)?;
    let created = creation_time(&md)?;
    let modified = md.modified()?;
    Ok(FileCandidate {
        path,
        creation_age: age_minutes(now, created),
        modification_age: age_minutes(now, modified),
    })
}

/// Age in minutes; negative for timestamps after `now`.
pub fn age_minutes(now: SystemTime, then: SystemTime) -> f64 {
    match now.duration_since(then) {
        Ok(d) => d.as_secs_f64() / 60.0,
        Err(err) => -(err.duration().as_secs_f64() / 60.0),
    }
}

#[cfg(unix)]
fn creation_time(md: &Metadata) -> Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = md.ctime();
    let nanos = md.ctime_nsec().clamp(0, 999_999_999) as u32;
    let t = if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        UNIX_EPOCH - Duration::new(secs.unsigned_abs(), 0)
    };
    Ok(t)
}

#[cfg(not(unix))]
fn creation_time(md: &Metadata) -> Result<SystemTime> {
    Ok(md.created()?)
}
