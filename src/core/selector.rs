//! Format ranking and selection

use crate::core::video_info::Format;

/// Numeric quality of a label: the first run of digits, 0 when there is none.
/// A run too long for `u64` saturates instead of dropping to the bottom.
pub fn quality_value(label: Option<&str>) -> u64 {
    let label = match label {
        Some(l) => l,
        None => return 0,
    };

    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Keep only formats with both video and audio, best quality first.
///
/// The sort is stable, so formats of equal quality keep their backend order.
pub fn rank_formats(formats: &[Format]) -> Vec<Format> {
    let mut ranked: Vec<Format> = formats
        .iter()
        .filter(|f| f.is_progressive())
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        quality_value(b.quality.as_deref()).cmp(&quality_value(a.quality.as_deref()))
    });

    ranked
}

/// The format chosen when the user expresses no preference
pub fn default_format(ranked: &[Format]) -> Option<&Format> {
    ranked.first()
}
