use crate::{
    AUTOSAVE_INTERVAL_SECS,
    obs::sink::{EngineEvent, emit},
    serialize::{deserialize, serialize},
    tree::FormState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use time::OffsetDateTime;

///
/// PersistenceError
///
/// External store failure. Drafts are a convenience, not a guarantee:
/// these are absorbed at the DraftStore boundary and reported as events,
/// never surfaced as blocking errors.
///

#[derive(Debug, ThisError)]
#[error("local store operation failed: {0}")]
pub struct PersistenceError(String);

impl PersistenceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

///
/// KeyValueStore
///
/// The opaque local persistence collaborator (browser local storage, a
/// file, or [`MemoryStore`]). Values are opaque strings.
///

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

///
/// MemoryStore
///
/// In-memory store for native hosts and tests.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

///
/// DraftSnapshot
///
/// Serializable picture of an in-progress edit. Binaries are never part
/// of a snapshot; a recovered draft always has empty asset slots.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub state: FormState,
    /// Unix seconds at save time, supplied by the caller's clock.
    pub saved_at: i64,
}

///
/// RecoverySignal
///
/// What the caller gets on mount: whether a draft exists and when it was
/// saved. The caller presents accept/discard affordances; nothing is
/// applied until it explicitly accepts.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecoverySignal {
    pub exists: bool,
    pub saved_at: Option<OffsetDateTime>,
}

impl RecoverySignal {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            exists: false,
            saved_at: None,
        }
    }
}

///
/// DraftStore
///
/// Persistence boundary for one entity's draft, bound to that entity's
/// fixed store key so concurrently open forms do not collide.
///

#[derive(Debug)]
pub struct DraftStore<S: KeyValueStore> {
    store: S,
    entity: &'static str,
    key: &'static str,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub const fn new(store: S, entity: &'static str, key: &'static str) -> Self {
        Self { store, entity, key }
    }

    /// Access the underlying store, e.g. to share it across sessions.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Persist a snapshot. Returns whether the save took effect; failures
    /// are absorbed and reported via obs.
    pub fn save(&mut self, state: &FormState, now: i64) -> bool {
        let snapshot = DraftSnapshot {
            state: state.clone(),
            saved_at: now,
        };

        let raw = match serialize(&snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                emit(&EngineEvent::DraftSaveFailed {
                    entity: self.entity,
                    reason: err.to_string(),
                });
                return false;
            }
        };

        match self.store.set(self.key, &raw) {
            Ok(()) => {
                emit(&EngineEvent::DraftSaved { entity: self.entity });
                true
            }
            Err(err) => {
                emit(&EngineEvent::DraftSaveFailed {
                    entity: self.entity,
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// Read the stored snapshot without applying it. Read and parse
    /// failures are absorbed; an unreadable draft reports as absent.
    #[must_use]
    pub fn load(&self) -> Option<DraftSnapshot> {
        let raw = match self.store.get(self.key) {
            Ok(raw) => raw?,
            Err(err) => {
                emit(&EngineEvent::DraftLoadFailed {
                    entity: self.entity,
                    reason: err.to_string(),
                });
                return None;
            }
        };

        match deserialize(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                emit(&EngineEvent::DraftLoadFailed {
                    entity: self.entity,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Mount-time probe: reports existence and timestamp only.
    #[must_use]
    pub fn probe(&self) -> RecoverySignal {
        self.load().map_or(RecoverySignal::none(), |snapshot| {
            RecoverySignal {
                exists: true,
                saved_at: OffsetDateTime::from_unix_timestamp(snapshot.saved_at).ok(),
            }
        })
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.load().is_some()
    }

    /// Remove the stored snapshot. Idempotent; removal of an absent draft
    /// is a no-op, and store failures are absorbed.
    pub fn clear(&mut self) {
        if self.store.remove(self.key).is_ok() {
            emit(&EngineEvent::DraftCleared { entity: self.entity });
        }
    }
}

///
/// AutosavePolicy
///
/// Interval bookkeeping for the session-owned autosave loop. The session
/// calls `tick(now)` from the caller's timer; no global timers exist.
///

#[derive(Clone, Copy, Debug)]
pub struct AutosavePolicy {
    pub enabled: bool,
    pub interval_secs: i64,
    last_saved: Option<i64>,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: AUTOSAVE_INTERVAL_SECS,
            last_saved: None,
        }
    }
}

impl AutosavePolicy {
    /// Whether an interval save is due at `now`.
    #[must_use]
    pub fn due(&self, now: i64) -> bool {
        self.enabled
            && self
                .last_saved
                .is_none_or(|last| now - last >= self.interval_secs)
    }

    pub const fn mark_saved(&mut self, now: i64) {
        self.last_saved = Some(now);
    }
}

///
/// TESTS
///
