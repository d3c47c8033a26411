use crate::core::schema::{
    AssetSlot, FieldSpec, FormSchema, PointSpec, SectionEncoding, SectionSpec, SubSectionSpec,
    TextRule,
};

///
/// Service form
///
/// Hero, icon-carded offerings, the delivery approach, and client
/// feedback with star ratings.
///

static SCALARS: [FieldSpec; 3] = [
    FieldSpec::text("title", "Service title", "title", TextRule::required().with_len(3, 150)),
    FieldSpec::text("slug", "Slug", "slug", TextRule::required().slug()),
    FieldSpec::text(
        "summary",
        "Service summary",
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

static OFFERING_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Offering title", "title", TextRule::required().with_max(120)),
    FieldSpec::text(
        "description",
        "Offering description",
        "description",
        TextRule::required().with_max(600),
    ),
];

static APPROACH_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Step title", "title", TextRule::required().with_max(120)),
    FieldSpec::text(
        "description",
        "Step description",
        "description",
        TextRule::NONE.with_max(600),
    ),
];

static FEEDBACK_SUB_FIELDS: [FieldSpec; 4] = [
    FieldSpec::text("name", "Client name", "name", TextRule::required().with_max(100)),
    FieldSpec::text("designation", "Designation", "designation", TextRule::NONE.with_max(100)),
    FieldSpec::text("comment", "Comment", "comment", TextRule::required().with_max(1_000)),
    FieldSpec::of_kind("stars", "Stars", "stars", crate::core::value::ScalarKind::Stars),
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
        key: "offerings_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: Some("offering_icons"),
        alt_key: Some("offering_icon_alts"),
        sub: Some(SubSectionSpec {
            list_name: "offerings",
            fields: &OFFERING_SUB_FIELDS,
            points: None,
            icon: true,
        }),
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "approach_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: None,
        alt_key: None,
        sub: Some(SubSectionSpec {
            list_name: "steps",
            fields: &APPROACH_SUB_FIELDS,
            points: Some(PointSpec {
                field: "additional_info",
                label: "Additional info",
                delimiter: "|||",
                rule: TextRule::NONE.with_max(300),
            }),
            icon: false,
        }),
        encoding: SectionEncoding::JsonBlob { key: "approach" },
    },
    SectionSpec {
        key: "feedback_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: None,
        alt_key: None,
        sub: Some(SubSectionSpec {
            list_name: "feedback",
            fields: &FEEDBACK_SUB_FIELDS,
            points: None,
            icon: false,
        }),
        encoding: SectionEncoding::JsonBlob { key: "feedback" },
    },
];

pub static SERVICE_FORM: FormSchema = FormSchema {
    entity: "service",
    draft_key: "service_form_draft",
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
        STARS_DEFAULT,
        asset::AssetLedger,
        tree::FormState,
        validate::validate_all,
        value::ScalarValue,
    };

    #[test]
    fn feedback_template_defaults_to_neutral_stars() {
        let mut state = FormState::from_schema(&SERVICE_FORM);
        state
            .tree
            .add_sub_section(SERVICE_FORM.section("feedback_section").unwrap())
            .unwrap();

        let sub = &state.tree.section("feedback_section").unwrap().subs[0];
        assert_eq!(sub.field("stars"), Some(&ScalarValue::Stars(STARS_DEFAULT)));
    }

    #[test]
    fn out_of_range_stars_fail_validation() {
        let mut state = FormState::from_schema(&SERVICE_FORM);
        state
            .update_scalar("title", ScalarValue::Text("Consulting".into()))
            .unwrap();
        state
            .update_scalar("slug", ScalarValue::Text("consulting".into()))
            .unwrap();
        state
            .tree
            .update_scalar("hero_section", "title", ScalarValue::Text("We consult".into()))
            .unwrap();

        state
            .tree
            .add_sub_section(SERVICE_FORM.section("feedback_section").unwrap())
            .unwrap();
        state
            .tree
            .update_sub_scalar("feedback_section", 0, "name", ScalarValue::Text("Ada".into()))
            .unwrap();
        state
            .tree
            .update_sub_scalar(
                "feedback_section",
                0,
                "comment",
                ScalarValue::Text("Very helpful".into()),
            )
            .unwrap();
        state
            .tree
            .update_sub_scalar("feedback_section", 0, "stars", ScalarValue::Stars(9))
            .unwrap();

        let report = validate_all(&SERVICE_FORM, &state, &AssetLedger::new()).unwrap();
        assert_eq!(
            report.first_invalid.unwrap().to_string(),
            "feedback_section.feedback.0.stars"
        );
    }
}
