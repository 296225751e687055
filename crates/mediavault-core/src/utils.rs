//! Small shared helpers.

/// Truncate to at most `limit` characters, appending an ellipsis when cut.
#[must_use]
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(limit).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_label;

    #[test]
    fn short_labels_pass_through() {
        assert_eq!(truncate_label("Sunday Service", 50), "Sunday Service");
    }

    #[test]
    fn long_labels_are_cut_with_ellipsis() {
        let long = "x".repeat(60);
        let cut = truncate_label(&long, 50);
        assert_eq!(cut.chars().count(), 51);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let caption = "ж".repeat(50);
        assert_eq!(truncate_label(&caption, 50), caption);
    }
}
