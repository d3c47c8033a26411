use crate::{STARS_DEFAULT, tree::TreeError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ScalarKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScalarKind {
    Text,
    Flag,
    Count,
    Stars,
    IdList,
}

impl ScalarKind {
    /// Template default for a freshly added field of this kind.
    #[must_use]
    pub fn default_value(self) -> ScalarValue {
        match self {
            Self::Text => ScalarValue::Text(String::new()),
            Self::Flag => ScalarValue::Flag(false),
            Self::Count => ScalarValue::Count(0),
            Self::Stars => ScalarValue::Stars(STARS_DEFAULT),
            Self::IdList => ScalarValue::IdList(Vec::new()),
        }
    }
}

///
/// ScalarValue
///
/// A named leaf value owned by the top-level record or by a
/// section/sub-section record.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Text(String),
    Flag(bool),
    Count(i64),
    Stars(u8),
    IdList(Vec<i64>),
}

impl ScalarValue {
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Text(_) => ScalarKind::Text,
            Self::Flag(_) => ScalarKind::Flag,
            Self::Count(_) => ScalarKind::Count,
            Self::Stars(_) => ScalarKind::Stars,
            Self::IdList(_) => ScalarKind::IdList,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_count(&self) -> Option<i64> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_stars(&self) -> Option<u8> {
        match self {
            Self::Stars(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value counts as empty for autosave gating and
    /// required checks: blank text, zero count, empty id list.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Flag(_) | Self::Stars(_) => false,
            Self::Count(n) => *n == 0,
            Self::IdList(ids) => ids.is_empty(),
        }
    }

    /// Enforce that a replacement value keeps the declared kind.
    pub(crate) fn check_kind(&self, expected: ScalarKind, field: &str) -> Result<(), TreeError> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(TreeError::ScalarKindMismatch {
                field: field.to_string(),
                expected,
                found: self.kind(),
            })
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Stars(n) => write!(f, "{n}"),
            Self::IdList(ids) => {
                let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(","))
            }
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_judgement_trims_whitespace() {
        assert!(ScalarValue::Text("   ".into()).is_blank());
        assert!(!ScalarValue::Text(" x ".into()).is_blank());
        assert!(ScalarValue::Count(0).is_blank());
        assert!(!ScalarValue::Stars(3).is_blank());
    }

    #[test]
    fn kind_check_rejects_cross_kind_updates() {
        let v = ScalarValue::Text("hi".into());
        assert!(v.check_kind(ScalarKind::Text, "title").is_ok());
        assert!(v.check_kind(ScalarKind::Count, "count").is_err());
    }
}
