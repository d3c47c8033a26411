use crate::{
    asset::{AssetLedger, Blob, PreviewHandle},
    draft::{AutosavePolicy, DraftSnapshot, DraftStore, KeyValueStore, RecoverySignal},
    encode::{Envelope, encode},
    error::Error,
    obs::sink::{EngineEvent, emit},
    path::{ErrorTree, Path},
    schema::{FieldSpec, FormSchema, SectionSpec, SubSectionSpec},
    tree::{FormState, SubSectionRecord, TreeError},
    validate::{apply_field_validation, apply_remote_errors, validate_all},
    value::ScalarValue,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SubmitError
///

#[derive(Debug, ThisError)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("submission failed: {reason}")]
    Transport { reason: String },

    #[error("submission rejected with {} field error(s)", field_errors.len())]
    Rejected {
        /// Transport field name to server message.
        field_errors: BTreeMap<String, String>,
    },
}

///
/// SubmitTarget
///
/// The external submission collaborator. The transport does its own
/// awaiting; by the cooperative model at most one call is in flight.
///

pub trait SubmitTarget {
    fn submit(&mut self, envelope: Envelope) -> Result<(), SubmitError>;
}

///
/// SubmitOutcome
///
/// Every handled end state of a submit attempt. Only internal invariant
/// violations surface as `Err` from [`EditSession::submit`].
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    /// Local validation failed; focus the first invalid control.
    Invalid { first_invalid: Path },
    /// Server rejected with field detail, now mapped into the error tree.
    Rejected { applied: usize },
    /// Transport failure with no field detail; show a generic message.
    Failed { reason: String },
}

///
/// SessionStatus
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionStatus {
    Editing { dirty: bool },
    Submitting,
    Submitted,
}

///
/// EditSession
///
/// One open form. Exclusively owns the state, error tree, asset ledger,
/// and draft store for that form; the rendering layer reads, the event
/// handlers call in, and nothing else shares the data.
///

pub struct EditSession<S: KeyValueStore> {
    schema: &'static FormSchema,
    state: FormState,
    errors: ErrorTree,
    ledger: AssetLedger,
    drafts: DraftStore<S>,
    autosave: AutosavePolicy,
    status: SessionStatus,
}

impl<S: KeyValueStore> EditSession<S> {
    #[must_use]
    pub fn new(schema: &'static FormSchema, store: S) -> Self {
        Self {
            schema,
            state: FormState::from_schema(schema),
            errors: ErrorTree::new(),
            ledger: AssetLedger::new(),
            drafts: DraftStore::new(store, schema.entity, schema.draft_key),
            autosave: AutosavePolicy::default(),
            status: SessionStatus::Editing { dirty: false },
        }
    }

    //
    // Read surface
    //

    #[must_use]
    pub const fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    #[must_use]
    pub const fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    #[must_use]
    pub const fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn drafts(&self) -> &DraftStore<S> {
        &self.drafts
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self.status, SessionStatus::Editing { dirty: true })
    }

    pub const fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave.enabled = enabled;
    }

    //
    // Scalar edits (with real-time validation)
    //

    pub fn update_scalar(&mut self, name: &str, value: ScalarValue) -> Result<(), Error> {
        self.state.update_scalar(name, value)?;
        self.mark_dirty();

        if let Some(field) = self.schema.scalar(name) {
            self.revalidate_text(&Path::root().field(name), field)?;
        }

        Ok(())
    }

    pub fn update_section_scalar(
        &mut self,
        section: &str,
        field: &str,
        value: ScalarValue,
    ) -> Result<(), Error> {
        self.state.tree.update_scalar(section, field, value)?;
        self.mark_dirty();

        let spec = self.section_spec(section)?;
        if let Some(field_spec) = spec.fields.iter().find(|f| f.name == field) {
            self.revalidate_text(&Path::root().field(section).field(field), field_spec)?;
        }

        Ok(())
    }

    pub fn update_sub_scalar(
        &mut self,
        section: &str,
        index: usize,
        field: &str,
        value: ScalarValue,
    ) -> Result<(), Error> {
        self.state.tree.update_sub_scalar(section, index, field, value)?;
        self.mark_dirty();

        let spec = self.section_spec(section)?;
        if let Some(sub_spec) = &spec.sub
            && let Some(field_spec) = sub_spec.fields.iter().find(|f| f.name == field)
        {
            let path = Path::root()
                .field(section)
                .field(sub_spec.list_name)
                .index(index)
                .field(field);
            self.revalidate_text(&path, field_spec)?;
        }

        Ok(())
    }

    //
    // Sub-sections
    //

    pub fn add_sub_section(&mut self, section: &str) -> Result<usize, Error> {
        let spec = self.section_spec(section)?;
        let index = self.state.tree.add_sub_section(spec)?;
        self.mark_dirty();

        Ok(index)
    }

    /// Remove a sub-section and renumber everything addressed by index:
    /// the tree record, the section's icon asset entries, and every error
    /// path under the removed list. The three stay consistent because no
    /// caller can observe the session between the steps.
    pub fn remove_sub_section(&mut self, section: &str, index: usize) -> Result<(), Error> {
        let spec = self.section_spec(section)?;
        let sub_spec = spec.sub.as_ref().ok_or_else(|| TreeError::NoSubSections {
            key: section.to_string(),
        })?;
        let list_name = sub_spec.list_name;
        let reindex_assets = sub_spec.icon;

        self.state.tree.remove_sub_section(section, index)?;

        if reindex_assets {
            self.ledger.reindex_after_removal(section, index);
        }

        self.errors
            .remove_index(&Path::root().field(section).field(list_name), index)?;

        self.mark_dirty();

        Ok(())
    }

    //
    // Points
    //

    pub fn add_point(&mut self, section: &str, index: usize) -> Result<usize, Error> {
        let point = self.state.tree.add_point(section, index)?;
        self.mark_dirty();

        Ok(point)
    }

    pub fn update_point(
        &mut self,
        section: &str,
        index: usize,
        point: usize,
        text: impl Into<String>,
    ) -> Result<(), Error> {
        let text = text.into();
        self.state.tree.update_point(section, index, point, text.clone())?;
        self.mark_dirty();

        let spec = self.section_spec(section)?;
        if let Some(sub_spec) = &spec.sub
            && let Some(points) = &sub_spec.points
        {
            let path = Path::root()
                .field(section)
                .field(sub_spec.list_name)
                .index(index)
                .field(points.field)
                .index(point);
            apply_field_validation(&mut self.errors, &path, &points.rule, points.label, &text)?;
        }

        Ok(())
    }

    pub fn remove_point(&mut self, section: &str, index: usize, point: usize) -> Result<(), Error> {
        let spec = self.section_spec(section)?;
        let prefix = spec.sub.as_ref().and_then(|sub_spec| {
            sub_spec.points.as_ref().map(|points| {
                Path::root()
                    .field(section)
                    .field(sub_spec.list_name)
                    .index(index)
                    .field(points.field)
            })
        });

        self.state.tree.remove_point(section, index, point)?;

        if let Some(prefix) = prefix {
            self.errors.remove_index(&prefix, point)?;
        }

        self.mark_dirty();

        Ok(())
    }

    //
    // Assets
    //

    pub fn set_asset(
        &mut self,
        section: &str,
        index: Option<usize>,
        blob: Blob,
        preview: Option<PreviewHandle>,
    ) {
        self.ledger.set_asset(section, index, blob, preview);
        self.mark_dirty();
    }

    pub fn set_alt_text(&mut self, section: &str, index: Option<usize>, text: impl Into<String>) {
        self.ledger.set_alt_text(section, index, text);
        self.mark_dirty();
    }

    pub fn clear_asset(&mut self, section: &str, index: Option<usize>) {
        self.ledger.clear_asset(section, index);
        self.mark_dirty();
    }

    pub fn clear_alt_text(&mut self, section: &str, index: Option<usize>) {
        self.ledger.clear_alt_text(section, index);
        self.mark_dirty();
    }

    /// Remove one image from a multi-image slot, shifting later images
    /// and their alt/error entries down by one.
    pub fn remove_indexed_asset(&mut self, section: &str, index: usize) -> Result<(), Error> {
        self.ledger.reindex_after_removal(section, index);
        self.errors
            .remove_index(&Path::root().field(section).field("alt"), index)?;
        self.mark_dirty();

        Ok(())
    }

    //
    // Drafts
    //

    /// Interval hook, driven by the caller's timer. Saves only while some
    /// top-level scalar holds content.
    pub fn tick(&mut self, now: i64) {
        if self.state.any_scalar_present() && self.autosave.due(now) && self.drafts.save(&self.state, now) {
            self.autosave.mark_saved(now);
        }
    }

    /// Page-exit hook; fire-and-forget under the same non-empty gating.
    pub fn flush_on_exit(&mut self, now: i64) {
        if self.state.any_scalar_present() {
            self.drafts.save(&self.state, now);
        }
    }

    /// Explicit user save; not gated on content.
    pub fn save_draft(&mut self, now: i64) -> bool {
        let saved = self.drafts.save(&self.state, now);
        if saved {
            self.autosave.mark_saved(now);
        }

        saved
    }

    #[must_use]
    pub fn draft_signal(&self) -> RecoverySignal {
        self.drafts.probe()
    }

    /// Apply the stored draft after the caller's explicit accept. Only
    /// declared fields with matching kinds are taken, so a stale snapshot
    /// cannot bend the session out of schema shape. Asset slots stay
    /// empty; binaries are never part of a snapshot.
    pub fn recover_draft(&mut self) -> bool {
        let Some(snapshot) = self.drafts.load() else {
            return false;
        };

        self.apply_snapshot(&snapshot);
        self.errors.clear();
        self.status = SessionStatus::Editing { dirty: true };

        true
    }

    pub fn discard_draft(&mut self) {
        self.drafts.clear();
    }

    //
    // Submission
    //

    /// Exhaustively validate, encode, and hand the envelope to the
    /// collaborator. Every handled end state returns as an outcome; the
    /// caller disables its submit control while `Submitting`.
    pub fn submit(&mut self, target: &mut dyn SubmitTarget) -> Result<SubmitOutcome, Error> {
        if self.status == SessionStatus::Submitting {
            return Err(SubmitError::AlreadySubmitting.into());
        }

        let report = validate_all(self.schema, &self.state, &self.ledger)?;

        if let Some(first_invalid) = report.first_invalid {
            emit(&EngineEvent::ValidationFailed {
                entity: self.schema.entity,
                errors: report.errors.len(),
            });
            self.errors = report.errors;

            return Ok(SubmitOutcome::Invalid { first_invalid });
        }

        self.errors = report.errors;
        let envelope = encode(self.schema, &self.state, &self.ledger)?;

        self.status = SessionStatus::Submitting;
        emit(&EngineEvent::SubmitStarted {
            entity: self.schema.entity,
        });

        match target.submit(envelope) {
            Ok(()) => {
                self.drafts.clear();
                self.ledger.clear();
                self.status = SessionStatus::Submitted;
                emit(&EngineEvent::SubmitSucceeded {
                    entity: self.schema.entity,
                });

                Ok(SubmitOutcome::Accepted)
            }
            Err(SubmitError::Rejected { field_errors }) => {
                let applied = apply_remote_errors(self.schema, &mut self.errors, &field_errors)?;
                self.status = SessionStatus::Editing { dirty: true };
                emit(&EngineEvent::SubmitRejected {
                    entity: self.schema.entity,
                    field_errors: field_errors.len(),
                });

                Ok(SubmitOutcome::Rejected { applied })
            }
            Err(err) => {
                self.status = SessionStatus::Editing { dirty: true };
                emit(&EngineEvent::SubmitFailed {
                    entity: self.schema.entity,
                    reason: err.to_string(),
                });

                Ok(SubmitOutcome::Failed {
                    reason: err.to_string(),
                })
            }
        }
    }

    //
    // Internals
    //

    fn section_spec(&self, key: &str) -> Result<&'static SectionSpec, TreeError> {
        self.schema.section(key).ok_or_else(|| TreeError::UnknownSection {
            key: key.to_string(),
        })
    }

    fn revalidate_text(&mut self, path: &Path, field: &FieldSpec) -> Result<(), Error> {
        // only rule-backed text fields validate per keystroke
        let raw = match path.segments().len() {
            1 => self.state.scalar(field.name).and_then(ScalarValue::as_text),
            _ => value_at(&self.state, path).and_then(ScalarValue::as_text),
        };

        if let Some(raw) = raw {
            let raw = raw.to_string();
            apply_field_validation(&mut self.errors, path, &field.rule, field.label, &raw)?;
        }

        Ok(())
    }

    const fn mark_dirty(&mut self) {
        if !matches!(self.status, SessionStatus::Submitting) {
            self.status = SessionStatus::Editing { dirty: true };
        }
    }

    fn apply_snapshot(&mut self, snapshot: &DraftSnapshot) {
        for field in self.schema.scalars {
            if let Some(value) = snapshot.state.scalar(field.name)
                && value.kind() == field.kind
            {
                let _ = self.state.update_scalar(field.name, value.clone());
            }
        }

        for section in self.schema.sections {
            let Some(stored) = snapshot.state.tree.section(section.key) else {
                continue;
            };

            for field in section.fields {
                if let Some(value) = stored.field(field.name)
                    && value.kind() == field.kind
                {
                    let _ = self.state.tree.update_scalar(section.key, field.name, value.clone());
                }
            }

            if let Some(sub_spec) = &section.sub {
                for (i, stored_sub) in stored.subs.iter().enumerate() {
                    if self.state.tree.add_sub_section(section).is_err() {
                        break;
                    }
                    restore_sub(&mut self.state, section.key, i, sub_spec, stored_sub);
                }
            }
        }
    }
}

fn restore_sub(
    state: &mut FormState,
    section: &str,
    index: usize,
    spec: &SubSectionSpec,
    stored: &SubSectionRecord,
) {
    for field in spec.fields {
        if let Some(value) = stored.field(field.name)
            && value.kind() == field.kind
        {
            let _ = state
                .tree
                .update_sub_scalar(section, index, field.name, value.clone());
        }
    }

    if spec.points.is_some() {
        for (p, text) in stored.points.iter().enumerate() {
            if state.tree.add_point(section, index).is_ok() {
                let _ = state.tree.update_point(section, index, p, text.clone());
            }
        }
    }
}

// Resolve a section/sub-section text value for revalidation.
fn value_at<'a>(state: &'a FormState, path: &Path) -> Option<&'a ScalarValue> {
    use crate::path::Segment;

    let segs = path.segments();
    match segs {
        [Segment::Field(section), Segment::Field(field)] => {
            state.tree.section(section)?.field(field)
        }
        [
            Segment::Field(section),
            Segment::Field(_list),
            Segment::Index(i),
            Segment::Field(field),
        ] => state.tree.section(section)?.subs.get(*i)?.field(field),
        _ => None,
    }
}

///
/// TESTS
///
