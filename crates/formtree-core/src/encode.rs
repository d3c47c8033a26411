use crate::{
    asset::{AssetLedger, Blob},
    sanitize::{clean_points, trim_text},
    schema::{AssetSlot, FieldSpec, FormSchema, SectionEncoding, SectionSpec, SubSectionSpec},
    serialize::{SerializeError, serialize},
    tree::{FormState, SectionRecord, SubSectionRecord},
    value::ScalarValue,
};
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

///
/// EncodeError
///

#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("missing field '{path}' during encode")]
    MissingField { path: String },
}

///
/// PartBody
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PartBody {
    Text(String),
    Json(String),
    Binary(Blob),
}

///
/// Part
///
/// One keyed entry of the transport envelope. Binary parts may share a
/// key; their relative order is the position the server reassembles.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    pub key: String,
    pub body: PartBody,
}

///
/// Envelope
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Envelope {
    parts: Vec<Part>,
}

impl Envelope {
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn push_text(&mut self, key: &str, text: impl Into<String>) {
        self.parts.push(Part {
            key: key.to_string(),
            body: PartBody::Text(text.into()),
        });
    }

    pub fn push_json(&mut self, key: &str, json: impl Into<String>) {
        self.parts.push(Part {
            key: key.to_string(),
            body: PartBody::Json(json.into()),
        });
    }

    pub fn push_binary(&mut self, key: &str, blob: Blob) {
        self.parts.push(Part {
            key: key.to_string(),
            body: PartBody::Binary(blob),
        });
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn first(&self, key: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.key == key)
    }

    /// Text or JSON content of the first part under `key`.
    #[must_use]
    pub fn string_part(&self, key: &str) -> Option<&str> {
        self.first(key).and_then(|p| match &p.body {
            PartBody::Text(s) | PartBody::Json(s) => Some(s.as_str()),
            PartBody::Binary(_) => None,
        })
    }

    /// Binary parts under `key`, in emission order.
    #[must_use]
    pub fn binaries(&self, key: &str) -> Vec<&Blob> {
        self.parts
            .iter()
            .filter(|p| p.key == key)
            .filter_map(|p| match &p.body {
                PartBody::Binary(blob) => Some(blob),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Flatten the state, per-section rule rows, and asset ledger into the
/// transport envelope. Binaries are copied out of the ledger; the caller
/// clears the ledger once the submission is accepted.
pub fn encode(
    schema: &FormSchema,
    state: &FormState,
    ledger: &AssetLedger,
) -> Result<Envelope, EncodeError> {
    let mut envelope = Envelope::new();

    for field in schema.scalars {
        let value = state.scalar(field.name).ok_or_else(|| missing(field.name))?;
        push_scalar(&mut envelope, field, value)?;
    }

    for section in schema.sections {
        let record = state
            .tree
            .section(section.key)
            .ok_or_else(|| missing(section.key))?;

        encode_section(&mut envelope, section, record)?;
        encode_assets(&mut envelope, section, ledger)?;
    }

    Ok(envelope)
}

fn missing(path: &str) -> EncodeError {
    EncodeError::MissingField {
        path: path.to_string(),
    }
}

fn encode_section(
    envelope: &mut Envelope,
    section: &SectionSpec,
    record: &SectionRecord,
) -> Result<(), EncodeError> {
    match section.encoding {
        SectionEncoding::FlatKeys => {
            for field in section.fields {
                let value = record.field(field.name).ok_or_else(|| missing(field.name))?;
                push_scalar(envelope, field, value)?;
            }

            if let Some(sub_spec) = &section.sub
                && !record.subs.is_empty()
            {
                let json = serialize(&subs_to_json(sub_spec, &record.subs))?;
                envelope.push_json(sub_spec.list_name, json);
            }
        }
        SectionEncoding::JsonBlob { key } => {
            let mut obj = Map::new();

            for field in section.fields {
                let value = record.field(field.name).ok_or_else(|| missing(field.name))?;
                obj.insert(field.transport_key.to_string(), scalar_to_json(value));
            }

            if let Some(sub_spec) = &section.sub {
                obj.insert(
                    sub_spec.list_name.to_string(),
                    subs_to_json(sub_spec, &record.subs),
                );
            }

            envelope.push_json(key, serialize(&Value::Object(obj))?);
        }
    }

    Ok(())
}

// Binary parts in position order under the section's binary key, with one
// JSON alt-text array aligned element-for-element to those parts.
fn encode_assets(
    envelope: &mut Envelope,
    section: &SectionSpec,
    ledger: &AssetLedger,
) -> Result<(), EncodeError> {
    if !section.has_assets() {
        return Ok(());
    }

    let (Some(binary_key), Some(alt_key)) = (section.binary_key, section.alt_key) else {
        // schema check rejects this shape before a session exists
        return Ok(());
    };

    let mut alts: Vec<String> = Vec::new();

    if section.asset == AssetSlot::Single {
        if let Some(entry) = ledger.get(section.key, None)
            && let Some(blob) = &entry.blob
        {
            envelope.push_binary(binary_key, blob.clone());
            alts.push(entry.alt_text.clone());
        }
    } else {
        for (_, entry) in ledger.indexed(section.key) {
            if let Some(blob) = &entry.blob {
                envelope.push_binary(binary_key, blob.clone());
                alts.push(entry.alt_text.clone());
            }
        }
    }

    if !alts.is_empty() {
        envelope.push_json(alt_key, serialize(&alts)?);
    }

    Ok(())
}

fn subs_to_json(spec: &SubSectionSpec, subs: &[SubSectionRecord]) -> Value {
    let items: Vec<Value> = subs
        .iter()
        .map(|sub| {
            let mut obj = Map::new();

            for field in spec.fields {
                if let Some(value) = sub.field(field.name) {
                    obj.insert(field.transport_key.to_string(), scalar_to_json(value));
                }
            }

            if let Some(points) = &spec.points {
                // the transport layer has no nested arrays; points travel
                // as one delimiter-joined string
                obj.insert(
                    points.field.to_string(),
                    Value::String(clean_points(&sub.points).join(points.delimiter)),
                );
            }

            Value::Object(obj)
        })
        .collect();

    Value::Array(items)
}

fn push_scalar(
    envelope: &mut Envelope,
    field: &FieldSpec,
    value: &ScalarValue,
) -> Result<(), EncodeError> {
    match value {
        ScalarValue::IdList(ids) => {
            envelope.push_json(field.transport_key, serialize(ids)?);
        }
        ScalarValue::Text(raw) => envelope.push_text(field.transport_key, trim_text(raw)),
        ScalarValue::Flag(b) => envelope.push_text(field.transport_key, b.to_string()),
        ScalarValue::Count(n) => envelope.push_text(field.transport_key, n.to_string()),
        ScalarValue::Stars(n) => envelope.push_text(field.transport_key, n.to_string()),
    }

    Ok(())
}

fn scalar_to_json(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Text(raw) => Value::String(trim_text(raw)),
        ScalarValue::Flag(b) => Value::Bool(*b),
        ScalarValue::Count(n) => Value::from(*n),
        ScalarValue::Stars(n) => Value::from(*n),
        ScalarValue::IdList(ids) => Value::from(ids.clone()),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{PointSpec, TextRule},
        value::ScalarKind,
    };

    static GALLERY: [SectionSpec; 1] = [SectionSpec {
        key: "gallery_section",
        fields: &[FieldSpec::text(
            "title",
            "Gallery title",
            "gallery_title",
            TextRule::required(),
        )],
        asset: AssetSlot::Multi,
        binary_key: Some("gallery_images"),
        alt_key: Some("gallery_image_alts"),
        sub: None,
        encoding: SectionEncoding::FlatKeys,
    }];

    static APPROACH_SUB_FIELDS: [FieldSpec; 2] = [
        FieldSpec::text("title", "Step title", "title", TextRule::required()),
        FieldSpec::text("description", "Step description", "description", TextRule::NONE),
    ];

    static APPROACH: [SectionSpec; 1] = [SectionSpec {
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
                rule: TextRule::NONE,
            }),
            icon: false,
        }),
        encoding: SectionEncoding::JsonBlob { key: "approach" },
    }];

    static SCHEMA_GALLERY: FormSchema = FormSchema {
        entity: "project",
        draft_key: "project_draft",
        scalars: &[
            FieldSpec::text("title", "Project title", "title", TextRule::required()),
            FieldSpec::of_kind("tags", "Tags", "tags", ScalarKind::IdList),
        ],
        sections: &GALLERY,
    };

    static SCHEMA_APPROACH: FormSchema = FormSchema {
        entity: "service",
        draft_key: "service_draft",
        scalars: &[],
        sections: &APPROACH,
    };

    #[test]
    fn scalars_and_tags_become_keyed_parts() {
        let mut state = FormState::from_schema(&SCHEMA_GALLERY);
        state
            .update_scalar("title", ScalarValue::Text("  Skyline  ".into()))
            .unwrap();
        state
            .update_scalar("tags", ScalarValue::IdList(vec![3, 7]))
            .unwrap();

        let envelope = encode(&SCHEMA_GALLERY, &state, &AssetLedger::new()).unwrap();

        assert_eq!(envelope.string_part("title"), Some("Skyline"));
        assert_eq!(envelope.string_part("tags"), Some("[3,7]"));
    }

    #[test]
    fn multi_image_parts_align_with_alt_array() {
        let state = FormState::from_schema(&SCHEMA_GALLERY);
        let mut ledger = AssetLedger::new();
        for i in 0..3u8 {
            ledger.set_asset("gallery_section", Some(usize::from(i)), Blob::from(vec![i]), None);
            ledger.set_alt_text("gallery_section", Some(usize::from(i)), format!("alt{i}"));
        }

        let envelope = encode(&SCHEMA_GALLERY, &state, &ledger).unwrap();

        let binaries = envelope.binaries("gallery_images");
        assert_eq!(binaries.len(), 3);
        assert_eq!(binaries[1].as_slice(), &[1]);
        assert_eq!(
            envelope.string_part("gallery_image_alts"),
            Some(r#"["alt0","alt1","alt2"]"#)
        );
    }

    #[test]
    fn alignment_survives_removal_and_reindex() {
        let state = FormState::from_schema(&SCHEMA_GALLERY);
        let mut ledger = AssetLedger::new();
        for i in 0..3u8 {
            ledger.set_asset("gallery_section", Some(usize::from(i)), Blob::from(vec![i]), None);
            ledger.set_alt_text("gallery_section", Some(usize::from(i)), format!("alt{i}"));
        }

        ledger.reindex_after_removal("gallery_section", 1);
        let envelope = encode(&SCHEMA_GALLERY, &state, &ledger).unwrap();

        let binaries = envelope.binaries("gallery_images");
        assert_eq!(binaries.len(), 2);
        assert_eq!(binaries[1].as_slice(), &[2]);
        assert_eq!(
            envelope.string_part("gallery_image_alts"),
            Some(r#"["alt0","alt2"]"#)
        );
    }

    #[test]
    fn json_blob_section_flattens_points() {
        let mut state = FormState::from_schema(&SCHEMA_APPROACH);
        state.tree.add_sub_section(&APPROACH[0]).unwrap();
        state
            .tree
            .update_sub_scalar("approach_section", 0, "title", ScalarValue::Text("Plan".into()))
            .unwrap();
        state.tree.add_point("approach_section", 0).unwrap();
        state
            .tree
            .update_point("approach_section", 0, 0, "scope it")
            .unwrap();
        state.tree.add_point("approach_section", 0).unwrap();
        state.tree.add_point("approach_section", 0).unwrap();
        state
            .tree
            .update_point("approach_section", 0, 2, "ship it")
            .unwrap();

        let envelope = encode(&SCHEMA_APPROACH, &state, &AssetLedger::new()).unwrap();

        let blob: Value = serde_json::from_str(envelope.string_part("approach").unwrap()).unwrap();
        let steps = blob.get("steps").unwrap().as_array().unwrap();
        assert_eq!(
            steps[0].get("additional_info").unwrap().as_str(),
            Some("scope it|||ship it")
        );
    }

    #[test]
    fn slotless_sections_emit_no_binary_parts() {
        let state = FormState::from_schema(&SCHEMA_APPROACH);
        let envelope = encode(&SCHEMA_APPROACH, &state, &AssetLedger::new()).unwrap();

        assert!(envelope.binaries("approach").is_empty());
        assert_eq!(envelope.len(), 1);
    }
}
