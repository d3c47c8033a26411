use crate::{
    ALT_TEXT_MAX_LEN, STARS_MAX, STARS_MIN,
    asset::AssetLedger,
    path::{ErrorTree, Path, ShapeError},
    schema::{AssetSlot, FieldSpec, FormSchema, TextRule},
    tree::{FormState, SubSectionRecord},
    validator::{MaxChars, Range, Required, Validator},
    value::ScalarValue,
};
use std::collections::BTreeMap;

const ALT_LABEL: &str = "Image alt text";

///
/// ValidationReport
///
/// Outcome of an exhaustive validation pass. `first_invalid` is the first
/// failing path in the fixed visit order, used by the caller to pick the
/// tab to switch to and the control to focus; determinism here is what
/// keeps that behavior reproducible.
///

#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub errors: ErrorTree,
    pub first_invalid: Option<Path>,
}

impl ValidationReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.first_invalid.is_none()
    }
}

/// Evaluate one rule against one raw value. Pure; used for keystroke and
/// blur checks. Returns the first failing message, or `None` when valid.
#[must_use]
pub fn validate_field(rule: &TextRule, label: &str, raw: &str) -> Option<String> {
    rule.check(label, raw)
}

/// Run one field check and mirror the outcome into the error map: a
/// failure is written at `path`, a pass deletes the entry (never nulls
/// it). Returns whether the field is currently valid.
pub fn apply_field_validation(
    errors: &mut ErrorTree,
    path: &Path,
    rule: &TextRule,
    label: &str,
    raw: &str,
) -> Result<bool, ShapeError> {
    match rule.check(label, raw) {
        Some(message) => {
            errors.set(path, message)?;
            Ok(false)
        }
        None => {
            errors.delete(path);
            Ok(true)
        }
    }
}

///
/// Walker
///
/// Internal accumulator for the exhaustive pass.
///

#[derive(Default)]
struct Walker {
    errors: ErrorTree,
    first_invalid: Option<Path>,
}

impl Walker {
    fn fail(&mut self, path: Path, message: String) -> Result<(), ShapeError> {
        self.errors.set(&path, message)?;

        if self.first_invalid.is_none() {
            self.first_invalid = Some(path);
        }

        Ok(())
    }

    fn check_scalar(
        &mut self,
        path: Path,
        field: &FieldSpec,
        value: &ScalarValue,
    ) -> Result<(), ShapeError> {
        let message = match value {
            ScalarValue::Text(raw) => field.rule.check(field.label, raw),
            ScalarValue::Stars(n) => Range::new(field.label, i64::from(STARS_MIN), i64::from(STARS_MAX))
                .validate(&i64::from(*n))
                .err()
                .map(|i| i.message()),
            ScalarValue::Flag(_) | ScalarValue::Count(_) | ScalarValue::IdList(_) => None,
        };

        if let Some(message) = message {
            self.fail(path, message)?;
        }

        Ok(())
    }

    fn check_alt(&mut self, path: Path, alt: &str, has_binary: bool) -> Result<(), ShapeError> {
        // a binary without alt text fails accessibility validation; alt
        // text alone (slot not yet uploaded) is fine
        let message = if has_binary
            && let Err(issue) = Required::new(ALT_LABEL).validate(alt)
        {
            Some(issue.message())
        } else {
            MaxChars::new(ALT_LABEL, ALT_TEXT_MAX_LEN)
                .validate(alt)
                .err()
                .map(|i| i.message())
        };

        if let Some(message) = message {
            self.fail(path, message)?;
        }

        Ok(())
    }
}

/// Exhaustive, deterministic validation of top-level scalars, every
/// section, every sub-section, points, and alt texts, in declared order.
pub fn validate_all(
    schema: &FormSchema,
    state: &FormState,
    ledger: &AssetLedger,
) -> Result<ValidationReport, ShapeError> {
    let mut walker = Walker::default();

    // top-level scalars, declared order
    for field in schema.scalars {
        if let Some(value) = state.scalar(field.name) {
            walker.check_scalar(Path::root().field(field.name), field, value)?;
        }
    }

    // sections, declared order
    for section in schema.sections {
        let Some(record) = state.tree.section(section.key) else {
            continue;
        };
        let base = Path::root().field(section.key);

        for field in section.fields {
            if let Some(value) = record.field(field.name) {
                walker.check_scalar(base.clone().field(field.name), field, value)?;
            }
        }

        if let Some(sub_spec) = &section.sub {
            for (i, sub) in record.subs.iter().enumerate() {
                let sub_base = base.clone().field(sub_spec.list_name).index(i);

                validate_sub_section(&mut walker, &sub_base, sub_spec, sub)?;

                if sub_spec.icon
                    && let Some(entry) = ledger.get(section.key, Some(i))
                {
                    walker.check_alt(
                        sub_base.clone().field("alt"),
                        &entry.alt_text,
                        entry.has_binary(),
                    )?;
                }
            }
        }

        // section-level slots come after the sub-section list
        match section.asset {
            AssetSlot::Single => {
                if let Some(entry) = ledger.get(section.key, None) {
                    walker.check_alt(
                        base.clone().field("alt"),
                        &entry.alt_text,
                        entry.has_binary(),
                    )?;
                }
            }
            AssetSlot::Multi => {
                for (i, entry) in ledger.indexed(section.key) {
                    walker.check_alt(
                        base.clone().field("alt").index(i),
                        &entry.alt_text,
                        entry.has_binary(),
                    )?;
                }
            }
            AssetSlot::None => {}
        }
    }

    Ok(ValidationReport {
        errors: walker.errors,
        first_invalid: walker.first_invalid,
    })
}

fn validate_sub_section(
    walker: &mut Walker,
    base: &Path,
    spec: &crate::schema::SubSectionSpec,
    sub: &SubSectionRecord,
) -> Result<(), ShapeError> {
    for field in spec.fields {
        if let Some(value) = sub.field(field.name) {
            walker.check_scalar(base.clone().field(field.name), field, value)?;
        }
    }

    if let Some(points) = &spec.points {
        for (i, point) in sub.points.iter().enumerate() {
            if let Some(message) = points.rule.check(points.label, point) {
                walker.fail(base.clone().field(points.field).index(i), message)?;
            }
        }
    }

    Ok(())
}

/// Map server-side rejection detail (transport field name to message)
/// back onto internal paths so inline errors reflect the server's
/// verdict. Unknown transport keys are skipped; returns how many entries
/// were applied.
pub fn apply_remote_errors(
    schema: &FormSchema,
    errors: &mut ErrorTree,
    remote: &BTreeMap<String, String>,
) -> Result<usize, ShapeError> {
    let mut applied = 0;

    for (key, message) in remote {
        if let Some(path) = schema.path_for_transport_key(key) {
            errors.set(&path, message.clone())?;
            applied += 1;
        }
    }

    Ok(applied)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset::Blob,
        schema::{SectionEncoding, SectionSpec, SubSectionSpec},
        value::ScalarKind,
    };

    static SUB_FIELDS: [FieldSpec; 2] = [
        FieldSpec::text("name", "Member name", "name", TextRule::required()),
        FieldSpec::of_kind("stars", "Stars", "stars", ScalarKind::Stars),
    ];

    static SECTIONS: [SectionSpec; 1] = [SectionSpec {
        key: "team_section",
        fields: &[FieldSpec::text(
            "title",
            "Team title",
            "team_title",
            TextRule::required(),
        )],
        asset: AssetSlot::None,
        binary_key: Some("team_images"),
        alt_key: Some("team_image_alts"),
        sub: Some(SubSectionSpec {
            list_name: "members",
            fields: &SUB_FIELDS,
            points: None,
            icon: true,
        }),
        encoding: SectionEncoding::FlatKeys,
    }];

    static SCHEMA: FormSchema = FormSchema {
        entity: "demo",
        draft_key: "demo_draft",
        scalars: &[
            FieldSpec::text("title", "Blog title", "title", TextRule::required()),
            FieldSpec::text(
                "slug",
                "Slug",
                "slug",
                TextRule {
                    required: true,
                    min_len: None,
                    max_len: None,
                    pattern: Some(crate::schema::TextPattern::Slug),
                },
            ),
        ],
        sections: &SECTIONS,
    };

    fn valid_state() -> FormState {
        let mut state = FormState::from_schema(&SCHEMA);
        state
            .update_scalar("title", ScalarValue::Text("A title".into()))
            .unwrap();
        state
            .update_scalar("slug", ScalarValue::Text("a-title".into()))
            .unwrap();
        state
            .tree
            .update_scalar("team_section", "title", ScalarValue::Text("Team".into()))
            .unwrap();
        state
    }

    #[test]
    fn clean_tree_reports_no_first_invalid() {
        let report = validate_all(&SCHEMA, &valid_state(), &AssetLedger::new()).unwrap();

        assert!(report.is_clean());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn single_invalid_field_is_first_invalid() {
        let mut state = valid_state();
        state
            .update_scalar("slug", ScalarValue::Text("My Slug!".into()))
            .unwrap();

        let report = validate_all(&SCHEMA, &state, &AssetLedger::new()).unwrap();

        assert_eq!(report.first_invalid.unwrap().to_string(), "slug");
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn first_invalid_follows_declared_order() {
        let mut state = valid_state();
        state.update_scalar("title", ScalarValue::Text("  ".into())).unwrap();
        state
            .update_scalar("slug", ScalarValue::Text("Bad Slug".into()))
            .unwrap();

        let report = validate_all(&SCHEMA, &state, &AssetLedger::new()).unwrap();

        assert_eq!(report.first_invalid.unwrap().to_string(), "title");
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn sub_section_errors_are_path_addressed() {
        let mut state = valid_state();
        state.tree.add_sub_section(&SECTIONS[0]).unwrap();

        let report = validate_all(&SCHEMA, &state, &AssetLedger::new()).unwrap();

        assert_eq!(
            report.first_invalid.unwrap().to_string(),
            "team_section.members.0.name"
        );
        assert_eq!(
            report
                .errors
                .get(&Path::parse("team_section.members.0.name"))
                .map(String::as_str),
            Some("Member name is required")
        );
    }

    #[test]
    fn binary_without_alt_text_fails() {
        let mut state = valid_state();
        state.tree.add_sub_section(&SECTIONS[0]).unwrap();
        state
            .tree
            .update_sub_scalar("team_section", 0, "name", ScalarValue::Text("Ada".into()))
            .unwrap();

        let mut ledger = AssetLedger::new();
        ledger.set_asset("team_section", Some(0), Blob::from(&[1]), None);

        let report = validate_all(&SCHEMA, &state, &ledger).unwrap();
        assert_eq!(
            report.first_invalid.unwrap().to_string(),
            "team_section.members.0.alt"
        );

        ledger.set_alt_text("team_section", Some(0), "Portrait");
        let report = validate_all(&SCHEMA, &state, &ledger).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn returning_to_valid_deletes_the_entry() {
        let mut errors = ErrorTree::new();
        let path = Path::parse("title");
        let rule = TextRule::required();

        assert!(!apply_field_validation(&mut errors, &path, &rule, "Blog title", "").unwrap());
        assert_eq!(errors.len(), 1);

        assert!(apply_field_validation(&mut errors, &path, &rule, "Blog title", "Hi there").unwrap());
        assert!(errors.is_empty());
        assert_eq!(errors.get(&path), None);
    }

    #[test]
    fn remote_errors_map_back_to_paths() {
        let mut errors = ErrorTree::new();
        let mut remote = BTreeMap::new();
        remote.insert("team_title".to_string(), "Already taken".to_string());
        remote.insert("unknown_key".to_string(), "ignored".to_string());

        let applied = apply_remote_errors(&SCHEMA, &mut errors, &remote).unwrap();

        assert_eq!(applied, 1);
        assert_eq!(
            errors
                .get(&Path::parse("team_section.title"))
                .map(String::as_str),
            Some("Already taken")
        );
    }
}
