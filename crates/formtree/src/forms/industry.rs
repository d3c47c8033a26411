use crate::core::{
    schema::{
        AssetSlot, FieldSpec, FormSchema, SectionEncoding, SectionSpec, SubSectionSpec, TextRule,
    },
    value::ScalarKind,
};

///
/// Industry form
///
/// Hero banner, headline stats, challenge cards with icons, and the team
/// members serving the industry.
///

static SCALARS: [FieldSpec; 3] = [
    FieldSpec::text("name", "Industry name", "name", TextRule::required().with_len(2, 120)),
    FieldSpec::text("slug", "Slug", "slug", TextRule::required().slug()),
    FieldSpec::text(
        "summary",
        "Industry summary",
        "summary",
        TextRule::NONE.with_max(300),
    ),
];

static HERO_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Hero title", "hero_title", TextRule::required().with_max(150)),
    FieldSpec::text(
        "description",
        "Hero description",
        "hero_description",
        TextRule::NONE.with_max(500),
    ),
];

static STAT_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Stat title", "title", TextRule::required().with_max(80)),
    FieldSpec::of_kind("count", "Stat count", "count", ScalarKind::Count),
];

static CHALLENGE_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Challenge title", "title", TextRule::required().with_max(120)),
    FieldSpec::text(
        "description",
        "Challenge description",
        "description",
        TextRule::required().with_max(600),
    ),
];

static TEAM_SUB_FIELDS: [FieldSpec; 4] = [
    FieldSpec::text("name", "Member name", "name", TextRule::required().with_max(100)),
    FieldSpec::text("designation", "Designation", "designation", TextRule::required().with_max(100)),
    FieldSpec::text("experience", "Experience", "experience", TextRule::NONE.with_max(100)),
    FieldSpec::text("summary", "Member summary", "summary", TextRule::NONE.with_max(500)),
];

static SECTIONS: [SectionSpec; 4] = [
    SectionSpec {
        key: "hero_section",
        fields: &HERO_FIELDS,
        asset: AssetSlot::Single,
        binary_key: Some("hero_image"),
        alt_key: Some("hero_image_alt"),
        sub: None,
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "stats_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: None,
        alt_key: None,
        sub: Some(SubSectionSpec {
            list_name: "stats",
            fields: &STAT_SUB_FIELDS,
            points: None,
            icon: false,
        }),
        encoding: SectionEncoding::JsonBlob { key: "stats" },
    },
    SectionSpec {
        key: "challenges_section",
        fields: &[FieldSpec::text(
            "title",
            "Challenges title",
            "challenges_title",
            TextRule::NONE.with_max(120),
        )],
        asset: AssetSlot::None,
        binary_key: Some("challenge_icons"),
        alt_key: Some("challenge_icon_alts"),
        sub: Some(SubSectionSpec {
            list_name: "challenges",
            fields: &CHALLENGE_SUB_FIELDS,
            points: None,
            icon: true,
        }),
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "team_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: Some("team_photos"),
        alt_key: Some("team_photo_alts"),
        sub: Some(SubSectionSpec {
            list_name: "members",
            fields: &TEAM_SUB_FIELDS,
            points: None,
            icon: true,
        }),
        encoding: SectionEncoding::JsonBlob { key: "team" },
    },
];

pub static INDUSTRY_FORM: FormSchema = FormSchema {
    entity: "industry",
    draft_key: "industry_form_draft",
    scalars: &SCALARS,
    sections: &SECTIONS,
};

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        asset::{AssetLedger, Blob},
        tree::FormState,
        validate::validate_all,
        value::ScalarValue,
    };

    fn filled_state() -> FormState {
        let mut state = FormState::from_schema(&INDUSTRY_FORM);
        state
            .update_scalar("name", ScalarValue::Text("Healthcare".into()))
            .unwrap();
        state
            .update_scalar("slug", ScalarValue::Text("healthcare".into()))
            .unwrap();
        state
            .tree
            .update_scalar("hero_section", "title", ScalarValue::Text("Care at scale".into()))
            .unwrap();
        state
    }

    #[test]
    fn hero_image_requires_alt_text() {
        let state = filled_state();
        let mut ledger = AssetLedger::new();
        ledger.set_asset("hero_section", None, Blob::from(&[1, 2]), None);

        let report = validate_all(&INDUSTRY_FORM, &state, &ledger).unwrap();
        assert_eq!(
            report.first_invalid.unwrap().to_string(),
            "hero_section.alt"
        );

        ledger.set_alt_text("hero_section", None, "Hospital corridor");
        let report = validate_all(&INDUSTRY_FORM, &state, &ledger).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn challenge_icons_validate_per_sub_section() {
        let mut state = filled_state();
        state
            .tree
            .add_sub_section(INDUSTRY_FORM.section("challenges_section").unwrap())
            .unwrap();
        state
            .tree
            .update_sub_scalar(
                "challenges_section",
                0,
                "title",
                ScalarValue::Text("Compliance".into()),
            )
            .unwrap();
        state
            .tree
            .update_sub_scalar(
                "challenges_section",
                0,
                "description",
                ScalarValue::Text("Heavily regulated workflows".into()),
            )
            .unwrap();

        let mut ledger = AssetLedger::new();
        ledger.set_asset("challenges_section", Some(0), Blob::from(&[9]), None);

        let report = validate_all(&INDUSTRY_FORM, &state, &ledger).unwrap();
        assert_eq!(
            report.first_invalid.unwrap().to_string(),
            "challenges_section.challenges.0.alt"
        );
    }
}
