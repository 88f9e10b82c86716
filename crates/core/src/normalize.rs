use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::merge::TagSet;
use crate::models::RenamePlan;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\[\]\(\)\{\}-]").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Splits a file name into stem and extension (with its dot). Leading-dot
/// names keep the whole name as stem.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Replaces separators and stray punctuation with single spaces.
pub fn clean_stem(stem: &str) -> String {
    let spaced = stem.replace(['.', '_'], " ");
    let spaced = PUNCTUATION.replace_all(&spaced, " ");
    SPACES.replace_all(&spaced, " ").trim().to_string()
}

/// New stem for `stem`, or `None` when the name is left as it is.
pub fn normalized_stem(stem: &str, tags: &TagSet) -> Option<String> {
    if tags.is_empty() && !stem.contains('_') {
        return None;
    }

    let mut renamed = clean_stem(stem);
    if !tags.is_empty() {
        // An underscore in the suffix would get the name cleaned again.
        let suffix = tags
            .iter()
            .map(|tag| tag.replace('_', " "))
            .collect::<Vec<_>>()
            .join(" ");
        renamed.push_str(" [");
        renamed.push_str(&suffix);
        renamed.push(']');
    }
    Some(renamed)
}

/// Plans the rename of `path`; `None` when the result would equal the
/// current name ignoring case.
pub fn plan(path: &Path, tags: &TagSet, relocate: bool) -> Option<RenamePlan> {
    let file_name = path.file_name()?.to_str()?;
    let (stem, extension) = split_name(file_name);
    let new_stem = normalized_stem(stem, tags)?;

    let new_name = format!("{new_stem}{extension}");
    if new_name.trim().to_lowercase() == file_name.trim().to_lowercase() {
        return None;
    }

    Some(RenamePlan {
        original: path.to_path_buf(),
        new_stem,
        extension: extension.to_string(),
        relocate,
    })
}
