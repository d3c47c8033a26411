use crate::core::schema::{FieldSpec, FormSchema, TextRule};

///
/// Tag form
///
/// The smallest entity: a name and a slug, no sections.
///

static SCALARS: [FieldSpec; 2] = [
    FieldSpec::text("name", "Tag name", "name", TextRule::required().with_len(2, 50)),
    FieldSpec::text("slug", "Slug", "slug", TextRule::required().slug()),
];

pub static TAG_FORM: FormSchema = FormSchema {
    entity: "tag",
    draft_key: "tag_form_draft",
    scalars: &SCALARS,
    sections: &[],
};

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate::validate_field;

    #[test]
    fn slug_scenarios() {
        let rule = &TAG_FORM.scalar("slug").unwrap().rule;

        assert!(validate_field(rule, "Slug", "my-slug-2").is_none());
        assert_eq!(
            validate_field(rule, "Slug", "My Slug!").as_deref(),
            Some("Slug can only contain lowercase letters, numbers, and hyphens")
        );
    }
}
