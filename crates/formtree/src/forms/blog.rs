use crate::core::{
    schema::{
        AssetSlot, FieldSpec, FormSchema, PointSpec, SectionEncoding, SectionSpec, SubSectionSpec,
        TextRule,
    },
    value::ScalarKind,
};

///
/// Blog post form
///
/// Featured image, pull quotes, and a comma-joined key-points list. Post
/// body is rich text edited elsewhere; it travels as one scalar here.
///

static SCALARS: [FieldSpec; 5] = [
    FieldSpec::text("title", "Blog title", "title", TextRule::required().with_len(5, 200)),
    FieldSpec::text("slug", "Slug", "slug", TextRule::required().slug()),
    FieldSpec::text(
        "meta_description",
        "Meta description",
        "meta_description",
        TextRule::NONE.with_max(160),
    ),
    FieldSpec::text("content", "Blog content", "content", TextRule::required().with_len(50, 50_000)),
    FieldSpec::of_kind("tags", "Tags", "tags", ScalarKind::IdList),
];

static QUOTE_SUB_FIELDS: [FieldSpec; 2] = [
    FieldSpec::text("title", "Quote title", "title", TextRule::required().with_max(200)),
    FieldSpec::text("description", "Quote description", "description", TextRule::NONE.with_max(500)),
];

static POINT_SUB_FIELDS: [FieldSpec; 1] = [FieldSpec::text(
    "title",
    "Key point title",
    "title",
    TextRule::required().with_max(120),
)];

static SECTIONS: [SectionSpec; 3] = [
    SectionSpec {
        key: "featured_section",
        fields: &[],
        asset: AssetSlot::Single,
        binary_key: Some("featured_image"),
        alt_key: Some("featured_image_alt"),
        sub: None,
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "quote_section",
        fields: &[FieldSpec::text(
            "title",
            "Quote section title",
            "quote_section_title",
            TextRule::NONE.with_max(120),
        )],
        asset: AssetSlot::None,
        binary_key: None,
        alt_key: None,
        sub: Some(SubSectionSpec {
            list_name: "quotes",
            fields: &QUOTE_SUB_FIELDS,
            points: None,
            icon: false,
        }),
        encoding: SectionEncoding::FlatKeys,
    },
    SectionSpec {
        key: "key_points_section",
        fields: &[],
        asset: AssetSlot::None,
        binary_key: None,
        alt_key: None,
        sub: Some(SubSectionSpec {
            list_name: "key_points",
            fields: &POINT_SUB_FIELDS,
            points: Some(PointSpec {
                field: "points",
                label: "Key point",
                delimiter: ",",
                rule: TextRule::NONE.with_max(200),
            }),
            icon: false,
        }),
        encoding: SectionEncoding::JsonBlob { key: "key_points" },
    },
];

pub static BLOG_FORM: FormSchema = FormSchema {
    entity: "blog",
    draft_key: "blog_form_draft",
    scalars: &SCALARS,
    sections: &SECTIONS,
};

///
/// TESTS
///
