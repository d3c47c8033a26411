//! Observability: typed engine events and sink abstractions.
//!
//! This module does not reach into session or store internals; everything
//! flows through [`EngineEvent`] and [`sink::EventSink`].

pub(crate) mod sink;

pub use sink::{EngineEvent, EventSink, event_report, reset_report, with_sink};

use serde::Serialize;

///
/// EventReport
///
/// Point-in-time counters for the current thread's engine activity.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub drafts_saved: u64,
    pub draft_failures: u64,
    pub validation_failures: u64,
    pub submissions: u64,
    pub rejections: u64,
}
