use crate::core::{
    schema::{
        AssetSlot, FieldSpec, FormSchema, PointSpec, SectionEncoding, SectionSpec, SubSectionSpec,
        TextRule,
    },
    value::ScalarKind,
};

///
/// Project form
///
/// Hero, an ordered image gallery, and the delivery approach with its
/// triple-pipe-joined additional-info entries.
///

static SCALARS: [FieldSpec; 4] = [
    FieldSpec::text("title", "Project title", "title", TextRule::required().with_len(3, 150)),
    FieldSpec::text("slug", "Slug", "slug", TextRule::required().slug()),
    FieldSpec::text("client", "Client name", "client", TextRule::NONE.with_max(120)),
    FieldSpec::of_kind("tags", "Tags", "tags", ScalarKind::IdList),
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

static APPROACH_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Step title", "title", TextRule::required().with_max(120)),
    FieldSpec::text(
        "description",
        "Step description",
        "description",
        TextRule::NONE.with_max(600),
    ),
];

static SECTIONS: [SectionSpec; 3] = [
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
        key: "gallery_section",
        fields: &[],
        asset: AssetSlot::Multi,
        binary_key: Some("gallery_images"),
        alt_key: Some("gallery_image_alts"),
        sub: None,
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "approach_section",
        fields: &[FieldSpec::text(
            "title",
            "Approach title",
            "approach_title",
            TextRule::NONE.with_max(120),
        )],
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
];

pub static PROJECT_FORM: FormSchema = FormSchema {
    entity: "project",
    draft_key: "project_form_draft",
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
        encode::encode,
        tree::FormState,
        value::ScalarValue,
    };

    #[test]
    fn gallery_binaries_and_alts_stay_aligned_through_removal() {
        let mut state = FormState::from_schema(&PROJECT_FORM);
        state
            .update_scalar("title", ScalarValue::Text("Atlas".into()))
            .unwrap();

        let mut ledger = AssetLedger::new();
        for i in 0..3u8 {
            ledger.set_asset("gallery_section", Some(usize::from(i)), Blob::from(vec![i]), None);
            ledger.set_alt_text("gallery_section", Some(usize::from(i)), format!("shot {i}"));
        }
        ledger.reindex_after_removal("gallery_section", 0);

        let envelope = encode(&PROJECT_FORM, &state, &ledger).unwrap();

        let binaries = envelope.binaries("gallery_images");
        assert_eq!(binaries.len(), 2);
        assert_eq!(binaries[0].as_slice(), &[1]);
        assert_eq!(
            envelope.string_part("gallery_image_alts"),
            Some(r#"["shot 1","shot 2"]"#)
        );
    }

    #[test]
    fn tags_travel_as_one_json_part() {
        let mut state = FormState::from_schema(&PROJECT_FORM);
        state
            .update_scalar("tags", ScalarValue::IdList(vec![11, 4]))
            .unwrap();

        let envelope = encode(&PROJECT_FORM, &state, &AssetLedger::new()).unwrap();
        assert_eq!(envelope.string_part("tags"), Some("[11,4]"));
    }
}
