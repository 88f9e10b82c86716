//! Keyword tables used to decide whether a tag is already part of a release
//! name, plus the folder-name source detection and title language hints.
//!
//! Every check is case-insensitive. A tag counts as represented when any of
//! its surface [`Form`]s is found in the name. Forms also accept the spelling
//! a tag takes after [`clean_stem`], so a renamed file still shows its tags.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::clean_stem;

/// One way a tag can appear in a file name.
#[derive(Debug, Clone)]
pub enum Form {
    /// Plain substring, compared case-insensitively.
    Literal(String),
    /// Compiled pattern; tables compile with `(?i)`.
    Pattern(Regex),
}

impl Form {
    pub fn found_in(&self, name: &str) -> bool {
        match self {
            Form::Literal(text) => contains_ignore_case(name, text),
            Form::Pattern(re) => re.is_match(name),
        }
    }
}

pub fn is_represented(name: &str, forms: &[Form]) -> bool {
    forms.iter().any(|form| form.found_in(name))
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Codec names that describe the same bitstream. Membership is exact on the
/// provider's name; detection in a file name uses the pattern.
static CODEC_SYNONYMS: Lazy<Vec<(&'static [&'static str], Regex)>> = Lazy::new(|| {
    vec![
        (
            &["HEVC", "H.265", "x265"][..],
            Regex::new(r"(?i)\bHEVC|H[. ]?265|x265\b").unwrap(),
        ),
        (
            &["AVC", "H.264", "x264"][..],
            Regex::new(r"(?i)\bAVC|H[. ]?264|x264\b").unwrap(),
        ),
    ]
});

/// Known resolution labels; the trailing scan letter is optional in names
/// (`1080` is taken to mean `1080p`).
static KNOWN_RESOLUTIONS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ["480p", "576p", "720p", "1080i", "1080p", "2160p", "4320p"]
        .into_iter()
        .map(|label| {
            let re = Regex::new(&format!(r"(?i)\b{}?\b", regex::escape(label))).unwrap();
            (label, re)
        })
        .collect()
});

const KNOWN_BIT_DEPTHS: [&str; 2] = ["8bit", "10bit"];

static BIT_DEPTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(8|10)[-_. ]?bit\b").unwrap());

static DUAL_AUDIO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(dual[ ._-]?(audio|dub|dubbed)|\sdual\s|\bEN[+ ]JA\b|\bJA[+ ]EN\b|\[eng?,?(\s+)?jpn?\]|\[jpn?,?(\s+)?eng?\])",
    )
    .unwrap()
});

static MULTI_AUDIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(multi[ ._-]?audio|multi[ ._-]?dub)").unwrap());

static DISC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:Blu-?Ray|BDMux|BD|B[DR]Rip)\b").unwrap());

/// Release-source keywords looked for in the parent folder name. A bare `BD`
/// only counts when something other than a word character follows it.
static SOURCE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?P<disc>Blu-?Ray|BDMux|B[DR]Rip)\b",
        r"|\b(?P<bd>BD)\W",
        r"|(?P<webrip>Web-?Rip|WEBMux)",
        r"|\b(?P<web>WEB[-_. ]?DL|WebHD|[. ]WEB[. ](?:[xh]26[45]|DDP?5[. ]1)|[. ](?-i:WEB)$|\d+0p(?:WEB-DLMux|\b\s/\sWEB\s/\s\b))",
    ))
    .unwrap()
});

static LANGUAGE_HINTS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("EN", Regex::new(r"(?i)(English|\bENG?\b)").unwrap()),
        ("JP", Regex::new(r"(?i)(Japanese|\bJPN?\b)").unwrap()),
    ]
});

const EXCLUDED_LANGUAGES: [&str; 6] = ["mul", "und", "zxx", "qaa", "mis", ""];

/// The tag itself plus, when cleanup rewrites it, its cleaned spelling as a
/// standalone token.
fn spellings(tag: &str) -> Vec<Form> {
    let mut forms = vec![Form::Literal(tag.to_string())];
    let cleaned = clean_stem(tag);
    if !cleaned.is_empty() && cleaned != tag {
        let bounded = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(&cleaned));
        if let Ok(re) = Regex::new(&bounded) {
            forms.push(Form::Pattern(re));
        }
    }
    forms
}

pub fn video_codec_forms(codec: &str) -> Vec<Form> {
    let mut forms = spellings(codec);
    if let Some((_, re)) = CODEC_SYNONYMS.iter().find(|(names, _)| names.contains(&codec)) {
        forms.push(Form::Pattern(re.clone()));
    }
    forms
}

pub fn resolution_forms(resolution: &str) -> Vec<Form> {
    let mut forms = spellings(resolution);
    if let Some((_, re)) = KNOWN_RESOLUTIONS.iter().find(|(label, _)| *label == resolution) {
        forms.push(Form::Pattern(re.clone()));
    }
    forms
}

pub fn bit_depth_forms(bit_depth: &str) -> Vec<Form> {
    let mut forms = spellings(bit_depth);
    if KNOWN_BIT_DEPTHS.contains(&bit_depth) {
        forms.push(Form::Pattern(BIT_DEPTH.clone()));
    }
    forms
}

pub fn combined_language_forms(combined: &str) -> Vec<Form> {
    let mut forms = spellings(combined);
    forms.push(Form::Pattern(DUAL_AUDIO.clone()));
    forms
}

/// Forms for tags without synonyms: audio codecs and folder source keywords.
pub fn literal_forms(tag: &str) -> Vec<Form> {
    spellings(tag)
}

pub fn has_dual_audio_indicator(name: &str) -> bool {
    DUAL_AUDIO.is_match(name)
}

pub fn has_multi_audio_indicator(name: &str) -> bool {
    MULTI_AUDIO.is_match(name)
}

pub fn has_disc_token(name: &str) -> bool {
    DISC_TOKEN.is_match(name)
}

/// Source keyword found in a folder name, exactly as it is spelled there.
pub fn source_keyword(folder_name: &str) -> Option<&str> {
    let caps = SOURCE_KEYWORD.captures(folder_name)?;
    ["disc", "bd", "webrip", "web"]
        .into_iter()
        .find_map(|group| caps.name(group))
        .map(|m| m.as_str())
}

pub fn language_from_title(title: &str) -> Option<&'static str> {
    LANGUAGE_HINTS
        .iter()
        .find(|(_, re)| re.is_match(title))
        .map(|(code, _)| *code)
}

/// Placeholder codes (multiple, undetermined, ...) that say nothing about
/// the spoken language.
pub fn is_excluded_language(code: &str) -> bool {
    EXCLUDED_LANGUAGES.contains(&code.trim().to_lowercase().as_str())
}

pub fn is_en_ja_pair(combined: &str) -> bool {
    combined.eq_ignore_ascii_case("EN+JA") || combined.eq_ignore_ascii_case("JA+EN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_synonyms_match_each_other() {
        let forms = video_codec_forms("HEVC");
        assert!(is_represented("Show - 01 [x265]", &forms));
        assert!(is_represented("Show - 01 h.265", &forms));
        assert!(!is_represented("Show - 01 [x264]", &forms));

        let forms = video_codec_forms("AVC");
        assert!(is_represented("Show.01.H.264", &forms));
        assert!(is_represented("Show 01 WEB H 264-GRP", &forms));
        assert!(!is_represented("Show.01.HEVC", &forms));
    }

    #[test]
    fn unknown_codec_matches_only_itself() {
        let forms = video_codec_forms("AV1");
        assert_eq!(forms.len(), 1);
        assert!(is_represented("show av1", &forms));
        assert!(!is_represented("show HEVC", &forms));
    }

    #[test]
    fn resolution_is_word_bounded() {
        let forms = resolution_forms("1080p");
        assert!(is_represented("Show 1080 BD", &forms));
        assert!(is_represented("Show [1080P]", &forms));
        assert!(!is_represented("Show 10800", &forms));

        let forms = resolution_forms("1036p");
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn bit_depth_separators() {
        let forms = bit_depth_forms("10bit");
        for name in ["a 10bit", "a 10-bit", "a 10_bit", "a 10.bit", "a 10 Bit", "a 8bit"] {
            assert!(is_represented(name, &forms), "{name}");
        }
        assert!(!is_represented("a 12bit", &forms));
    }

    #[test]
    fn dual_audio_indicators() {
        for name in [
            "Show Dual Audio",
            "Show.Dual-Audio",
            "Show dualdub",
            "Show Dual Dubbed",
            "Show dual 01",
            "Show EN+JA",
            "Show 01 EN JA",
            "Show [eng, jpn]",
            "Show [jp,en]",
        ] {
            assert!(has_dual_audio_indicator(name), "{name}");
        }
        assert!(!has_dual_audio_indicator("Individual 01"));
        assert!(!has_dual_audio_indicator("Open Jam 01"));
    }

    #[test]
    fn cleaned_spellings_still_count() {
        let forms = literal_forms("WEB_DL");
        assert!(is_represented("Show S01E01 [1080p WEB DL]", &forms));
        assert!(!is_represented("Show S01E01 WEB DLX", &forms));

        let forms = combined_language_forms("EN+ES");
        assert!(is_represented("Show 01 EN ES", &forms));
        assert!(!is_represented("Open Escape 01", &forms));

        let forms = literal_forms(".WEB.x264");
        assert!(is_represented("Show S01E01 1080p WEB x264", &forms));
    }

    #[test]
    fn multi_audio_indicators() {
        assert!(has_multi_audio_indicator("Show Multi-Audio"));
        assert!(has_multi_audio_indicator("Show multidub"));
        assert!(!has_multi_audio_indicator("Show Multiverse"));
    }

    #[test]
    fn disc_tokens() {
        assert!(has_disc_token("Show BluRay 1080p"));
        assert!(has_disc_token("Show [Blu-Ray]"));
        assert!(has_disc_token("Show BD"));
        assert!(has_disc_token("Show BRRip"));
        assert!(!has_disc_token("Show BDx"));
    }

    #[test]
    fn source_keyword_from_folder() {
        assert_eq!(source_keyword("[Group] Show (BDRip 1080p)"), Some("BDRip"));
        assert_eq!(source_keyword("Show.S01.1080p.BluRay.x265"), Some("BluRay"));
        assert_eq!(source_keyword("Show S01 BD 1080p"), Some("BD"));
        assert_eq!(source_keyword("Show S01 BD"), None);
        assert_eq!(source_keyword("Show.S01.WEB-DL.1080p"), Some("WEB-DL"));
        assert_eq!(source_keyword("Show S01 WebRip"), Some("WebRip"));
        assert_eq!(source_keyword("Show.S01.1080p.WEB.x264"), Some(".WEB.x264"));
        assert_eq!(source_keyword("Show S01 1080p WEB"), Some(" WEB"));
        assert_eq!(source_keyword("Show S01 1080p web"), None);
        assert_eq!(source_keyword("complete"), None);
    }

    #[test]
    fn language_hints_from_titles() {
        assert_eq!(language_from_title("English 5.1"), Some("EN"));
        assert_eq!(language_from_title("eng"), Some("EN"));
        assert_eq!(language_from_title("Japanese"), Some("JP"));
        assert_eq!(language_from_title("JPN Stereo"), Some("JP"));
        assert_eq!(language_from_title("Commentary"), None);
        assert_eq!(language_from_title("Engine"), None);
    }

    #[test]
    fn excluded_languages() {
        assert!(is_excluded_language("UND"));
        assert!(is_excluded_language(" mul "));
        assert!(is_excluded_language(""));
        assert!(!is_excluded_language("EN"));
    }
}
