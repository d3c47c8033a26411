//! ## Crate layout
//! - `core`: the runtime engine: path store, section tree, asset ledger,
//!   draft persistence, validation, and submission encoding.
//! - `forms`: built-in rule tables for the admin entity forms (blog,
//!   industry, project, service, tag).
//!
//! The `prelude` module mirrors the surface used inside form hosts.

pub use formtree_core as core;

pub mod forms;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        asset::{AssetEntry, AssetLedger, Blob, PreviewHandle},
        draft::{DraftSnapshot, KeyValueStore as _, MemoryStore, RecoverySignal},
        encode::{Envelope, Part, PartBody},
        path::{ErrorTree, Path, Segment},
        schema::{FormSchema, SectionSpec},
        session::{EditSession, SessionStatus, SubmitOutcome, SubmitTarget as _},
        tree::{FormState, SectionTree},
        validate::ValidationReport,
        value::ScalarValue,
    };
    pub use crate::forms;
}
