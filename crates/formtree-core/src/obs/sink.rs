//! Event sink boundary.
//!
//! Engine logic MUST NOT read or mutate observability state directly.
//! All instrumentation flows through [`EngineEvent`] and [`EventSink`];
//! this module is the only bridge to the thread-local counters.

use crate::obs::EventReport;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn EventSink>> = const { RefCell::new(None) };
    static REPORT: RefCell<EventReport> = const { RefCell::new(EventReport {
        drafts_saved: 0,
        draft_failures: 0,
        validation_failures: 0,
        submissions: 0,
        rejections: 0,
    }) };
}

///
/// EngineEvent
///

#[derive(Clone, Debug)]
pub enum EngineEvent {
    DraftSaved {
        entity: &'static str,
    },
    DraftSaveFailed {
        entity: &'static str,
        reason: String,
    },
    DraftLoadFailed {
        entity: &'static str,
        reason: String,
    },
    DraftCleared {
        entity: &'static str,
    },
    ValidationFailed {
        entity: &'static str,
        errors: usize,
    },
    SubmitStarted {
        entity: &'static str,
    },
    SubmitSucceeded {
        entity: &'static str,
    },
    SubmitRejected {
        entity: &'static str,
        field_errors: usize,
    },
    SubmitFailed {
        entity: &'static str,
        reason: String,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: &EngineEvent);
}

/// Run `f` with `sink` receiving every event emitted on this thread, then
/// restore the previous sink. Scoped so tests cannot leak overrides.
pub fn with_sink<R>(sink: &dyn EventSink, f: impl FnOnce() -> R) -> R {
    // The pointer is only stored for the duration of this scoped call and is
    // restored before returning, so the deref in `emit` stays valid. Erase the
    // borrow's lifetime so it can live in the `'static` thread-local.
    let raw: *const (dyn EventSink + '_) = sink;
    let raw: *const dyn EventSink =
        unsafe { std::mem::transmute::<*const (dyn EventSink + '_), *const dyn EventSink>(raw) };

    let prev = SINK_OVERRIDE.with(|cell| cell.replace(Some(raw)));
    let out = f();
    SINK_OVERRIDE.with(|cell| {
        *cell.borrow_mut() = prev;
    });

    out
}

/// Counters accumulated on this thread since the last reset.
#[must_use]
pub fn event_report() -> EventReport {
    REPORT.with(|cell| *cell.borrow())
}

pub fn reset_report() {
    REPORT.with(|cell| {
        *cell.borrow_mut() = EventReport::default();
    });
}

pub(crate) fn emit(event: &EngineEvent) {
    REPORT.with(|cell| {
        let mut report = cell.borrow_mut();
        match event {
            EngineEvent::DraftSaved { .. } => report.drafts_saved += 1,
            EngineEvent::DraftSaveFailed { .. } | EngineEvent::DraftLoadFailed { .. } => {
                report.draft_failures += 1;
            }
            EngineEvent::ValidationFailed { .. } => report.validation_failures += 1,
            EngineEvent::SubmitStarted { .. } => report.submissions += 1,
            EngineEvent::SubmitRejected { .. } | EngineEvent::SubmitFailed { .. } => {
                report.rejections += 1;
            }
            EngineEvent::DraftCleared { .. } | EngineEvent::SubmitSucceeded { .. } => {}
        }
    });

    SINK_OVERRIDE.with(|cell| {
        if let Some(raw) = *cell.borrow() {
            // valid for the duration of with_sink's scope
            unsafe { (*raw).record(event) };
        }
    });
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    struct Capture {
        events: StdRefCell<Vec<String>>,
    }

    impl EventSink for Capture {
        fn record(&self, event: &EngineEvent) {
            self.events.borrow_mut().push(format!("{event:?}"));
        }
    }

    #[test]
    fn scoped_sink_receives_events_and_restores() {
        let capture = Capture {
            events: StdRefCell::new(Vec::new()),
        };

        with_sink(&capture, || {
            emit(&EngineEvent::DraftSaved { entity: "blog" });
        });
        emit(&EngineEvent::DraftSaved { entity: "blog" });

        assert_eq!(capture.events.borrow().len(), 1);
    }

    #[test]
    fn report_counts_by_category() {
        reset_report();

        emit(&EngineEvent::SubmitStarted { entity: "blog" });
        emit(&EngineEvent::SubmitFailed {
            entity: "blog",
            reason: "network".into(),
        });

        let report = event_report();
        assert_eq!(report.submissions, 1);
        assert_eq!(report.rejections, 1);
    }
}
