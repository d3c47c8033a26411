use crate::{
    path::{ErrorTree, Path},
    validator::{MaxChars, MinChars, Required, Slug, Validator},
    value::ScalarKind,
};
use serde::Serialize;

///
/// TextPattern
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TextPattern {
    Slug,
}

///
/// TextRule
///
/// Bounds are inclusive. Checks run in a fixed order: required first
/// (short-circuit), then length, then pattern. A length or pattern error
/// is never reported for a value not yet judged non-empty.
///

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TextRule {
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub pattern: Option<TextPattern>,
}

impl TextRule {
    pub const NONE: Self = Self {
        required: false,
        min_len: None,
        max_len: None,
        pattern: None,
    };

    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            min_len: None,
            max_len: None,
            pattern: None,
        }
    }

    #[must_use]
    pub const fn with_len(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    #[must_use]
    pub const fn with_max(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    #[must_use]
    pub const fn slug(mut self) -> Self {
        self.pattern = Some(TextPattern::Slug);
        self
    }

    /// Evaluate the rule against a raw value, returning the first failing
    /// message. Optional fields skip length and pattern checks while empty.
    #[must_use]
    pub fn check(&self, label: &str, raw: &str) -> Option<String> {
        let empty = raw.trim().is_empty();

        if self.required
            && let Err(issue) = Required::new(label).validate(raw)
        {
            return Some(issue.message());
        }

        if empty {
            return None;
        }

        if let Some(min) = self.min_len
            && let Err(issue) = MinChars::new(label, min).validate(raw)
        {
            return Some(issue.message());
        }

        if let Some(max) = self.max_len
            && let Err(issue) = MaxChars::new(label, max).validate(raw)
        {
            return Some(issue.message());
        }

        match self.pattern {
            Some(TextPattern::Slug) => Slug::new().validate(raw).err().map(|i| i.message()),
            None => None,
        }
    }
}

///
/// FieldSpec
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub transport_key: &'static str,
    pub kind: ScalarKind,
    pub rule: TextRule,
}

impl FieldSpec {
    #[must_use]
    pub const fn text(
        name: &'static str,
        label: &'static str,
        transport_key: &'static str,
        rule: TextRule,
    ) -> Self {
        Self {
            name,
            label,
            transport_key,
            kind: ScalarKind::Text,
            rule,
        }
    }

    #[must_use]
    pub const fn of_kind(
        name: &'static str,
        label: &'static str,
        transport_key: &'static str,
        kind: ScalarKind,
    ) -> Self {
        Self {
            name,
            label,
            transport_key,
            kind,
            rule: TextRule::NONE,
        }
    }
}

///
/// PointSpec
///
/// Repeatable free-text entries under a sub-section. The join delimiter is
/// per-row configuration; the transport layer has no nested arrays, so
/// points are flattened to one delimited string at encode time.
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PointSpec {
    pub field: &'static str,
    pub label: &'static str,
    pub delimiter: &'static str,
    pub rule: TextRule,
}

///
/// SubSectionSpec
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SubSectionSpec {
    /// Path segment for the repeatable list, e.g. `quotes`.
    pub list_name: &'static str,
    pub fields: &'static [FieldSpec],
    pub points: Option<PointSpec>,
    /// Whether each sub-section carries its own icon asset slot.
    pub icon: bool,
}

///
/// AssetSlot
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum AssetSlot {
    None,
    Single,
    Multi,
}

///
/// SectionEncoding
///

#[derive(Clone, Copy, Debug, Serialize)]
pub enum SectionEncoding {
    /// Emit each section field as its own string part under the field's
    /// transport key, e.g. `hero_title`.
    FlatKeys,
    /// Emit the whole section (fields plus sub-section array) as one JSON
    /// object part under `key`.
    JsonBlob { key: &'static str },
}

///
/// SectionSpec
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SectionSpec {
    pub key: &'static str,
    pub fields: &'static [FieldSpec],
    pub asset: AssetSlot,
    /// Transport key for ordered binary parts; required whenever the
    /// section or its sub-sections hold assets.
    pub binary_key: Option<&'static str>,
    /// Transport key for the position-aligned alt-text JSON array.
    pub alt_key: Option<&'static str>,
    pub sub: Option<SubSectionSpec>,
    pub encoding: SectionEncoding,
}

impl SectionSpec {
    /// Whether any asset slot exists on this section, either at section
    /// level or per sub-section.
    #[must_use]
    pub fn has_assets(&self) -> bool {
        self.asset != AssetSlot::None || self.sub.is_some_and(|sub| sub.icon)
    }
}

///
/// FormSchema
///
/// One rule-table per entity type. Declared order of scalars and sections
/// is the validation visit order; adding an entity means adding rows, not
/// imperative logic.
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FormSchema {
    pub entity: &'static str,
    /// Fixed local-persistence key; distinct per entity so concurrently
    /// open forms do not collide.
    pub draft_key: &'static str,
    pub scalars: &'static [FieldSpec],
    pub sections: &'static [SectionSpec],
}

impl FormSchema {
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&'static SectionSpec> {
        self.sections.iter().find(|s| s.key == key)
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&'static FieldSpec> {
        self.scalars.iter().find(|f| f.name == name)
    }

    /// Reverse a transport field name back to its internal path, used to
    /// surface server-side rejections inline.
    #[must_use]
    pub fn path_for_transport_key(&self, key: &str) -> Option<Path> {
        for field in self.scalars {
            if field.transport_key == key {
                return Some(Path::root().field(field.name));
            }
        }

        for section in self.sections {
            if let SectionEncoding::JsonBlob { key: blob } = section.encoding
                && blob == key
            {
                return Some(Path::root().field(section.key));
            }

            for field in section.fields {
                if field.transport_key == key {
                    return Some(Path::root().field(section.key).field(field.name));
                }
            }

            if section.alt_key == Some(key) || section.binary_key == Some(key) {
                return Some(Path::root().field(section.key).field("alt"));
            }
        }

        None
    }

    /// Structural self-check, run by tests over every built-in form:
    /// unique keys, asset slots with transport keys, and no section mixing
    /// a multi-image slot with per-sub-section icons (both would claim the
    /// same ledger indices).
    pub fn check(&self) -> Result<(), ErrorTree> {
        // paths here are built from schema positions, never user input
        fn put(errs: &mut ErrorTree, path: Path, msg: &str) {
            let _ = errs.set(&path, msg.to_string());
        }

        let mut errs = ErrorTree::new();

        for (i, field) in self.scalars.iter().enumerate() {
            if self.scalars.iter().filter(|f| f.name == field.name).count() > 1 {
                put(
                    &mut errs,
                    Path::root().field("scalars").index(i),
                    "duplicate scalar field name",
                );
            }
        }

        for (i, section) in self.sections.iter().enumerate() {
            let base = Path::root().field("sections").index(i);

            if self.sections.iter().filter(|s| s.key == section.key).count() > 1 {
                put(&mut errs, base.clone().field("key"), "duplicate section key");
            }

            if section.asset == AssetSlot::Multi && section.sub.is_some_and(|sub| sub.icon) {
                put(
                    &mut errs,
                    base.clone().field("asset"),
                    "multi-image slot and sub-section icons share ledger indices",
                );
            }

            if section.has_assets() {
                if section.binary_key.is_none() {
                    put(
                        &mut errs,
                        base.clone().field("binary_key"),
                        "asset slot without binary key",
                    );
                }
                if section.alt_key.is_none() {
                    put(
                        &mut errs,
                        base.clone().field("alt_key"),
                        "asset slot without alt-text key",
                    );
                }
            }
        }

        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_is_judged_before_length() {
        let rule = TextRule::required().with_len(5, 100);

        assert_eq!(
            rule.check("Blog title", ""),
            Some("Blog title is required".to_string())
        );
        assert_eq!(
            rule.check("Blog title", "Hi"),
            Some("Blog title must be at least 5 characters".to_string())
        );
        assert_eq!(rule.check("Blog title", "Hello"), None);
    }

    #[test]
    fn optional_empty_value_skips_length_and_pattern() {
        let rule = TextRule {
            required: false,
            min_len: Some(5),
            max_len: None,
            pattern: Some(TextPattern::Slug),
        };

        assert_eq!(rule.check("Slug", ""), None);
        assert!(rule.check("Slug", "My Slug!").is_some());
    }

    #[test]
    fn slug_rule_scenarios() {
        let rule = TextRule::required().slug();

        assert!(rule.check("Slug", "my-slug-2").is_none());
        assert_eq!(
            rule.check("Slug", "My Slug!").as_deref(),
            Some("Slug can only contain lowercase letters, numbers, and hyphens")
        );
    }

    #[test]
    fn check_flags_missing_transport_keys() {
        static SECTIONS: [SectionSpec; 1] = [SectionSpec {
            key: "hero_section",
            fields: &[],
            asset: AssetSlot::Single,
            binary_key: None,
            alt_key: None,
            sub: None,
            encoding: SectionEncoding::FlatKeys,
        }];
        static SCHEMA: FormSchema = FormSchema {
            entity: "demo",
            draft_key: "demo_draft",
            scalars: &[],
            sections: &SECTIONS,
        };

        let errs = SCHEMA.check().unwrap_err();
        assert_eq!(errs.len(), 2);
    }
}
