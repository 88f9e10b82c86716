use crate::ordered::OrderedSet;
use crate::patterns::{self, Form};
use crate::tags::CanonicalTags;

pub type TagSet = OrderedSet<String>;

pub const DUAL_AUDIO: &str = "Dual Audio";
pub const MULTI_AUDIO: &str = "Multi Audio";
pub const BLU_RAY: &str = "Blu-Ray";

/// Tags from `tags` that `name` does not already carry, in suffix order.
pub fn merge(tags: &CanonicalTags, name: &str) -> TagSet {
    let mut missing = TagSet::new();
    let mut add_unless_present = |tag: &str, forms: Vec<Form>| {
        if !tag.is_empty() && !patterns::is_represented(name, &forms) {
            missing.insert(tag.to_string());
        }
    };

    if let Some(codec) = &tags.video_codec {
        add_unless_present(codec.as_str(), patterns::video_codec_forms(codec));
    }
    if let Some(resolution) = &tags.resolution {
        add_unless_present(resolution.as_str(), patterns::resolution_forms(resolution));
    }
    if let Some(bit_depth) = &tags.bit_depth {
        add_unless_present(bit_depth.as_str(), patterns::bit_depth_forms(bit_depth));
    }
    for codec in &tags.audio_codecs {
        add_unless_present(codec.as_str(), patterns::literal_forms(codec));
    }

    let combined = tags.combined_languages();
    add_unless_present(combined.as_str(), patterns::combined_language_forms(&combined));

    match tags.audio_languages.len() {
        2 if patterns::is_en_ja_pair(&combined) && !patterns::has_dual_audio_indicator(name) => {
            missing.insert(DUAL_AUDIO.to_string());
        }
        n if n >= 3 && !patterns::has_multi_audio_indicator(name) => {
            missing.insert(MULTI_AUDIO.to_string());
        }
        _ => {}
    }

    if tags.has_pgs_subtitles && !patterns::has_disc_token(name) {
        missing.insert(BLU_RAY.to_string());
    }
    if let Some(source) = &tags.source_keyword {
        if !patterns::is_represented(name, &patterns::literal_forms(source)) {
            missing.insert(source.clone());
        }
    }

    missing
}
