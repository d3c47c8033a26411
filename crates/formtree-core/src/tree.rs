use crate::{
    schema::{FormSchema, SectionSpec, SubSectionSpec},
    value::{ScalarKind, ScalarValue},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// TreeError
///
/// Shape mismatches between an operation and the declared form: unknown
/// keys, out-of-range indices, cross-kind updates. Programmer errors, not
/// user-facing validation.
///

#[derive(Debug, ThisError)]
pub enum TreeError {
    #[error("unknown section '{key}'")]
    UnknownSection { key: String },

    #[error("unknown field '{field}' in '{scope}'")]
    UnknownField { scope: String, field: String },

    #[error("section '{key}' has no sub-section list")]
    NoSubSections { key: String },

    #[error("sub-section index {index} out of range for '{key}' (len {len})")]
    SubSectionOutOfRange { key: String, index: usize, len: usize },

    #[error("point index {index} out of range for '{key}.{sub}' (len {len})")]
    PointOutOfRange {
        key: String,
        sub: usize,
        index: usize,
        len: usize,
    },

    #[error("field '{field}' expects {expected:?}, got {found:?}")]
    ScalarKindMismatch {
        field: String,
        expected: ScalarKind,
        found: ScalarKind,
    },
}

///
/// SubSectionRecord
///
/// One repeatable item in a section's list. Shape is given by the owning
/// section's spec; identity is the array index, not a durable id.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubSectionRecord {
    pub fields: BTreeMap<String, ScalarValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<String>,
}

impl SubSectionRecord {
    /// Variant-specific default template: empty text, zero counts, the
    /// neutral star rating.
    #[must_use]
    pub fn from_spec(spec: &SubSectionSpec) -> Self {
        let fields = spec
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.default_value()))
            .collect();

        Self {
            fields,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.get(name)
    }
}

///
/// SectionRecord
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub fields: BTreeMap<String, ScalarValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<SubSectionRecord>,
}

impl SectionRecord {
    #[must_use]
    pub fn from_spec(spec: &SectionSpec) -> Self {
        let fields = spec
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.default_value()))
            .collect();

        Self {
            fields,
            subs: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.get(name)
    }
}

///
/// SectionTree
///
/// The mutable content model: section key to record. Records are created
/// up front from the schema, so field presence equals declaration.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SectionTree {
    sections: BTreeMap<String, SectionRecord>,
}

impl SectionTree {
    #[must_use]
    pub fn from_schema(schema: &FormSchema) -> Self {
        let sections = schema
            .sections
            .iter()
            .map(|s| (s.key.to_string(), SectionRecord::from_spec(s)))
            .collect();

        Self { sections }
    }

    #[must_use]
    pub fn section(&self, key: &str) -> Option<&SectionRecord> {
        self.sections.get(key)
    }

    fn section_mut(&mut self, key: &str) -> Result<&mut SectionRecord, TreeError> {
        self.sections.get_mut(key).ok_or_else(|| TreeError::UnknownSection {
            key: key.to_string(),
        })
    }

    pub fn update_scalar(
        &mut self,
        key: &str,
        field: &str,
        value: ScalarValue,
    ) -> Result<(), TreeError> {
        let scope = key.to_string();
        let record = self.section_mut(key)?;

        let slot = record
            .fields
            .get_mut(field)
            .ok_or_else(|| TreeError::UnknownField {
                scope,
                field: field.to_string(),
            })?;

        value.check_kind(slot.kind(), field)?;
        *slot = value;

        Ok(())
    }

    /// Append a sub-section from the section's template; returns the new
    /// index.
    pub fn add_sub_section(&mut self, spec: &SectionSpec) -> Result<usize, TreeError> {
        let sub_spec = spec.sub.as_ref().ok_or_else(|| TreeError::NoSubSections {
            key: spec.key.to_string(),
        })?;

        let record = self.section_mut(spec.key)?;
        record.subs.push(SubSectionRecord::from_spec(sub_spec));

        Ok(record.subs.len() - 1)
    }

    /// Remove the record at `index`, renumbering the remainder. Asset and
    /// error renumbering is coordinated by the edit session so the three
    /// stay atomic.
    pub fn remove_sub_section(&mut self, key: &str, index: usize) -> Result<(), TreeError> {
        let record = self.section_mut(key)?;
        let len = record.subs.len();

        if index >= len {
            return Err(TreeError::SubSectionOutOfRange {
                key: key.to_string(),
                index,
                len,
            });
        }

        record.subs.remove(index);

        Ok(())
    }

    pub fn update_sub_scalar(
        &mut self,
        key: &str,
        index: usize,
        field: &str,
        value: ScalarValue,
    ) -> Result<(), TreeError> {
        let scope = format!("{key}.{index}");
        let sub = self.sub_mut(key, index)?;

        let slot = sub
            .fields
            .get_mut(field)
            .ok_or_else(|| TreeError::UnknownField {
                scope,
                field: field.to_string(),
            })?;

        value.check_kind(slot.kind(), field)?;
        *slot = value;

        Ok(())
    }

    /// Append an empty point; returns the new point index.
    pub fn add_point(&mut self, key: &str, index: usize) -> Result<usize, TreeError> {
        let sub = self.sub_mut(key, index)?;
        sub.points.push(String::new());

        Ok(sub.points.len() - 1)
    }

    pub fn update_point(
        &mut self,
        key: &str,
        index: usize,
        point: usize,
        text: impl Into<String>,
    ) -> Result<(), TreeError> {
        let sub = self.sub_mut(key, index)?;
        let len = sub.points.len();

        let slot = sub
            .points
            .get_mut(point)
            .ok_or_else(|| TreeError::PointOutOfRange {
                key: key.to_string(),
                sub: index,
                index: point,
                len,
            })?;
        *slot = text.into();

        Ok(())
    }

    pub fn remove_point(&mut self, key: &str, index: usize, point: usize) -> Result<(), TreeError> {
        let sub = self.sub_mut(key, index)?;
        let len = sub.points.len();

        if point >= len {
            return Err(TreeError::PointOutOfRange {
                key: key.to_string(),
                sub: index,
                index: point,
                len,
            });
        }

        sub.points.remove(point);

        Ok(())
    }

    fn sub_mut(&mut self, key: &str, index: usize) -> Result<&mut SubSectionRecord, TreeError> {
        let record = self.section_mut(key)?;
        let len = record.subs.len();

        record
            .subs
            .get_mut(index)
            .ok_or_else(|| TreeError::SubSectionOutOfRange {
                key: key.to_string(),
                index,
                len,
            })
    }
}

///
/// FormState
///
/// Top-level scalar fields plus the section tree; the serializable
/// substance of an edit session (assets live in the ledger and are never
/// part of this state).
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub scalars: BTreeMap<String, ScalarValue>,
    pub tree: SectionTree,
}

impl FormState {
    #[must_use]
    pub fn from_schema(schema: &FormSchema) -> Self {
        let scalars = schema
            .scalars
            .iter()
            .map(|f| (f.name.to_string(), f.kind.default_value()))
            .collect();

        Self {
            scalars,
            tree: SectionTree::from_schema(schema),
        }
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&ScalarValue> {
        self.scalars.get(name)
    }

    pub fn update_scalar(&mut self, name: &str, value: ScalarValue) -> Result<(), TreeError> {
        let slot = self
            .scalars
            .get_mut(name)
            .ok_or_else(|| TreeError::UnknownField {
                scope: "form".to_string(),
                field: name.to_string(),
            })?;

        value.check_kind(slot.kind(), name)?;
        *slot = value;

        Ok(())
    }

    /// Autosave gating: drafts are only worth keeping once some top-level
    /// scalar holds content.
    #[must_use]
    pub fn any_scalar_present(&self) -> bool {
        self.scalars.values().any(|v| !v.is_blank())
    }
}

///
/// TESTS
///
