//! Submission-time text normalization. Editing never mutates what the
//! user typed; cleanup happens once, when the envelope is built.

/// Collapse surrounding whitespace on a scalar text value.
#[must_use]
pub fn trim_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Trim each point and drop the blank ones, preserving order.
#[must_use]
pub fn clean_points(points: &[String]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_points_are_dropped_in_order() {
        let points = vec![
            "  first ".to_string(),
            "   ".to_string(),
            "second".to_string(),
        ];

        assert_eq!(clean_points(&points), ["first", "second"]);
    }

    #[test]
    fn trim_text_keeps_inner_whitespace() {
        assert_eq!(trim_text("  a  b  "), "a  b");
    }
}
