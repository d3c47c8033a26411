use crate::validator::{ValidateIssue, Validator};

///
/// Range
///
/// Inclusive numeric range. An inverted range is captured at construction
/// and surfaces as an invalid-config issue on every validate call.
///

#[derive(Clone, Debug)]
pub struct Range {
    label: String,
    min: i64,
    max: i64,
    error: Option<ValidateIssue>,
}

impl Range {
    #[must_use]
    pub fn new(label: impl Into<String>, min: i64, max: i64) -> Self {
        let error = (min > max)
            .then(|| ValidateIssue::invalid_config("range requires min <= max"));

        Self {
            label: label.into(),
            min,
            max,
            error,
        }
    }
}

impl Validator<i64> for Range {
    fn validate(&self, value: &i64) -> Result<(), ValidateIssue> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        if *value < self.min || *value > self.max {
            Err(ValidateIssue::validation(format!(
                "{} must be between {} and {}",
                self.label, self.min, self.max
            )))
        } else {
            Ok(())
        }
    }
}

///
/// TESTS
///
