use crate::validator::{ValidateIssue, Validator};

///
/// Required
///
/// Empty and whitespace-only values both fail.
///

#[derive(Clone, Debug)]
pub struct Required {
    label: String,
}

impl Required {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Validator<str> for Required {
    fn validate(&self, s: &str) -> Result<(), ValidateIssue> {
        if s.trim().is_empty() {
            Err(ValidateIssue::validation(format!(
                "{} is required",
                self.label
            )))
        } else {
            Ok(())
        }
    }
}

///
/// MinChars
///
/// Inclusive lower bound on character count. Does not imply `Required`;
/// emptiness is judged before length by the rule pipeline.
///

#[derive(Clone, Debug)]
pub struct MinChars {
    label: String,
    min: usize,
}

impl MinChars {
    #[must_use]
    pub fn new(label: impl Into<String>, min: usize) -> Self {
        Self {
            label: label.into(),
            min,
        }
    }
}

impl Validator<str> for MinChars {
    fn validate(&self, s: &str) -> Result<(), ValidateIssue> {
        if s.chars().count() < self.min {
            Err(ValidateIssue::validation(format!(
                "{} must be at least {} characters",
                self.label, self.min
            )))
        } else {
            Ok(())
        }
    }
}

///
/// MaxChars
///

#[derive(Clone, Debug)]
pub struct MaxChars {
    label: String,
    max: usize,
}

impl MaxChars {
    #[must_use]
    pub fn new(label: impl Into<String>, max: usize) -> Self {
        Self {
            label: label.into(),
            max,
        }
    }
}

impl Validator<str> for MaxChars {
    fn validate(&self, s: &str) -> Result<(), ValidateIssue> {
        if s.chars().count() > self.max {
            Err(ValidateIssue::validation(format!(
                "{} must be {} characters or less",
                self.label, self.max
            )))
        } else {
            Ok(())
        }
    }
}

///
/// Slug
///
/// Lowercase letters, digits, and hyphens only. The message is fixed
/// regardless of which character violated the pattern.
///

pub const SLUG_MESSAGE: &str = "Slug can only contain lowercase letters, numbers, and hyphens";

#[derive(Clone, Copy, Debug, Default)]
pub struct Slug;

impl Slug {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Validator<str> for Slug {
    fn validate(&self, s: &str) -> Result<(), ValidateIssue> {
        let ok = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if ok {
            Ok(())
        } else {
            Err(ValidateIssue::validation(SLUG_MESSAGE))
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fails_on_whitespace() {
        let v = Required::new("Blog title");
        let err = v.validate("   ").unwrap_err();
        assert_eq!(err.message(), "Blog title is required");
        assert!(v.validate("Hello").is_ok());
    }

    #[test]
    fn min_chars_is_inclusive() {
        let v = MinChars::new("Blog title", 5);
        assert!(v.validate("Hello").is_ok());

        let err = v.validate("Hi").unwrap_err();
        assert_eq!(err.message(), "Blog title must be at least 5 characters");
    }

    #[test]
    fn max_chars_is_inclusive() {
        let v = MaxChars::new("Summary", 5);
        assert!(v.validate("12345").is_ok());
        assert!(v.validate("123456").is_err());
    }

    #[test]
    fn min_chars_counts_characters_not_bytes() {
        let v = MinChars::new("Title", 3);
        assert!(v.validate("äöü").is_ok());
    }

    #[test]
    fn slug_rejects_mixed_case_and_punctuation() {
        let v = Slug::new();
        assert!(v.validate("my-slug-2").is_ok());

        let err = v.validate("My Slug!").unwrap_err();
        assert_eq!(err.message(), SLUG_MESSAGE);
    }
}
