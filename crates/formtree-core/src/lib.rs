//! Core runtime for Formtree: the section tree, path-addressed error store,
//! asset ledger, draft persistence, validation engine, and submission
//! encoder, plus the ergonomics exported via the `prelude`.

// public exports are one module level down
pub mod asset;
pub mod draft;
pub mod encode;
pub mod error;
pub mod obs;
pub mod path;
pub mod sanitize;
pub mod schema;
pub mod serialize;
pub mod session;
pub mod tree;
pub mod validate;
pub mod validator;
pub mod value;

///
/// CONSTANTS
///

/// Maximum number of characters accepted for an asset's alt text.
///
/// Alt text is settable before a binary exists and survives binary
/// replacement; the cap is enforced at entry and again at validation so
/// snapshots recovered from older drafts stay within bounds.
pub const ALT_TEXT_MAX_LEN: usize = 255;

/// Fixed autosave interval, in seconds.
pub const AUTOSAVE_INTERVAL_SECS: i64 = 30;

/// Neutral star rating used by feedback sub-section templates.
pub const STARS_DEFAULT: u8 = 3;

/// Inclusive star rating bounds.
pub const STARS_MIN: u8 = 1;
pub const STARS_MAX: u8 = 5;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No encoders, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        asset::{AssetEntry, AssetKey, AssetLedger, Blob},
        path::{ErrorTree, Path, PathTree, Segment},
        schema::{FormSchema, SectionSpec},
        session::{EditSession, SessionStatus},
        tree::{FormState, SectionTree},
        validate::ValidationReport,
        value::ScalarValue,
    };
}
