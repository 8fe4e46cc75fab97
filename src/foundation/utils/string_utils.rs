use unicode_segmentation::UnicodeSegmentation;

/// Shortens a label to at most `max_width` grapheme clusters.
///
/// Labels that fit are returned unchanged. Longer ones are cut on a grapheme
/// boundary and end with `…`, which counts towards the width. A width of zero
/// disables truncation.
///
/// # Examples
///
/// ```
/// use albumtree::foundation::utils::truncate_label;
///
/// assert_eq!(truncate_label("accusamus beatae ad", 10), "accusamus…");
/// assert_eq!(truncate_label("Beach", 10), "Beach");
/// ```
pub fn truncate_label(label: &str, max_width: usize) -> String {
    if max_width == 0 || label.graphemes(true).count() <= max_width {
        return label.to_string();
    }

    let mut shortened: String = label.graphemes(true).take(max_width - 1).collect();
    shortened.push('…');
    shortened
}

/// Strips the leading `#` and surrounding whitespace from a fragment.
///
/// # Examples
///
/// ```
/// use albumtree::foundation::utils::normalize_fragment;
///
/// assert_eq!(normalize_fragment(" #catalog "), "catalog");
/// assert_eq!(normalize_fragment("favourites"), "favourites");
/// ```
pub fn normalize_fragment(fragment: &str) -> &str {
    let trimmed = fragment.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed)
}
