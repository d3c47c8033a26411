//! End-to-end flows over the shipped forms: edit, draft, recover, and
//! submit against a capturing collaborator.

use formtree::{
    core::{
        asset::Blob,
        draft::MemoryStore,
        encode::Envelope,
        session::{EditSession, SessionStatus, SubmitError, SubmitOutcome, SubmitTarget},
        value::ScalarValue,
    },
    forms::{BLOG_FORM, TAG_FORM},
};
use std::collections::BTreeMap;

#[derive(Default)]
struct Capture {
    sent: Option<Envelope>,
}

impl SubmitTarget for Capture {
    fn submit(&mut self, envelope: Envelope) -> Result<(), SubmitError> {
        self.sent = Some(envelope);
        Ok(())
    }
}

struct RejectTitle;

impl SubmitTarget for RejectTitle {
    fn submit(&mut self, _: Envelope) -> Result<(), SubmitError> {
        let mut field_errors = BTreeMap::new();
        field_errors.insert("title".to_string(), "Title already exists".to_string());
        Err(SubmitError::Rejected { field_errors })
    }
}

fn filled_blog_session() -> EditSession<MemoryStore> {
    let mut session = EditSession::new(&BLOG_FORM, MemoryStore::new());

    session
        .update_scalar("title", ScalarValue::Text("Shipping content safely".into()))
        .unwrap();
    session
        .update_scalar("slug", ScalarValue::Text("shipping-content-safely".into()))
        .unwrap();
    session
        .update_scalar(
            "content",
            ScalarValue::Text("A long enough body of text to satisfy the minimum length rule.".into()),
        )
        .unwrap();
    session
        .update_scalar("tags", ScalarValue::IdList(vec![2, 5]))
        .unwrap();

    session
}

#[test]
fn blog_submit_produces_expected_envelope() {
    let mut session = filled_blog_session();

    session.add_sub_section("quote_section").unwrap();
    session
        .update_sub_scalar(
            "quote_section",
            0,
            "title",
            ScalarValue::Text("On shipping".into()),
        )
        .unwrap();

    session.set_asset("featured_section", None, Blob::from(&[0xff, 0xd8]), None);
    session.set_alt_text("featured_section", None, "Cover photo");

    let mut target = Capture::default();
    let outcome = session.submit(&mut target).unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);

    let envelope = target.sent.unwrap();
    assert_eq!(envelope.string_part("title"), Some("Shipping content safely"));
    assert_eq!(envelope.string_part("tags"), Some("[2,5]"));
    assert_eq!(envelope.binaries("featured_image").len(), 1);
    assert_eq!(
        envelope.string_part("featured_image_alt"),
        Some(r#"["Cover photo"]"#)
    );

    let quotes: serde_json::Value =
        serde_json::from_str(envelope.string_part("quotes").unwrap()).unwrap();
    assert_eq!(quotes[0]["title"], "On shipping");
}

#[test]
fn invalid_blog_never_reaches_the_target() {
    let mut session = EditSession::new(&BLOG_FORM, MemoryStore::new());
    let mut target = Capture::default();

    let outcome = session.submit(&mut target).unwrap();

    assert!(matches!(outcome, SubmitOutcome::Invalid { .. }));
    assert!(target.sent.is_none());
    assert!(!session.errors().is_empty());
}

#[test]
fn server_rejection_lands_on_the_title_path() {
    let mut session = filled_blog_session();

    let outcome = session.submit(&mut RejectTitle).unwrap();

    assert_eq!(outcome, SubmitOutcome::Rejected { applied: 1 });
    assert_eq!(
        session
            .errors()
            .get(&formtree::core::path::Path::parse("title"))
            .map(String::as_str),
        Some("Title already exists")
    );
}

#[test]
fn draft_survives_a_remount_and_clears_on_submit() {
    let mut session = filled_blog_session();
    session.save_draft(1_700_000_000);

    // remount: a new session over a fresh handle to the same store
    let mut remounted = EditSession::new(&BLOG_FORM, session.drafts().store().clone());
    let signal = remounted.draft_signal();
    assert!(signal.exists);
    assert_eq!(signal.saved_at.unwrap().unix_timestamp(), 1_700_000_000);

    assert!(remounted.recover_draft());
    assert_eq!(
        remounted.state().scalar("slug"),
        Some(&ScalarValue::Text("shipping-content-safely".into()))
    );
    // binaries are never persisted; slots come back empty
    assert!(remounted.ledger().is_empty());

    let outcome = remounted.submit(&mut Capture::default()).unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);
    assert_eq!(remounted.status(), SessionStatus::Submitted);
    assert!(!remounted.draft_signal().exists);
}

#[test]
fn tag_form_round_trip() {
    let mut session = EditSession::new(&TAG_FORM, MemoryStore::new());
    session
        .update_scalar("name", ScalarValue::Text("Rust".into()))
        .unwrap();
    session
        .update_scalar("slug", ScalarValue::Text("rust".into()))
        .unwrap();

    let mut target = Capture::default();
    assert_eq!(session.submit(&mut target).unwrap(), SubmitOutcome::Accepted);

    let envelope = target.sent.unwrap();
    assert_eq!(envelope.string_part("name"), Some("Rust"));
    assert_eq!(envelope.string_part("slug"), Some("rust"));
    assert_eq!(envelope.len(), 2);
}
