use crate::ALT_TEXT_MAX_LEN;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

///
/// Blob
///
/// Blob is a semantic binary value; raw byte access is explicit via
/// accessors. Display prints a size summary, never content.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Blob(ByteBuf);

impl Blob {
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[blob ({} bytes)]", self.0.len())
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(ByteBuf::from(bytes))
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(ByteBuf::from(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Blob {
    fn from(bytes: &[u8; N]) -> Self {
        Self(ByteBuf::from(&bytes[..]))
    }
}

///
/// PreviewHandle
///
/// Opaque handle to a rendering-layer preview (an object URL in a browser
/// host). Carried alongside the binary, replaced with it, never persisted.
///

#[derive(Clone, Debug, Deref, Display, Eq, From, PartialEq)]
pub struct PreviewHandle(String);

impl From<&str> for PreviewHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

///
/// AssetKey
///
/// `index = None` is the section-level single slot; `Some(i)` is a
/// multi-image position or a sub-section icon slot, whichever the section
/// declares. `None` orders before any index, so per-section iteration
/// yields the single slot first and indices in position order.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct AssetKey {
    pub section: String,
    pub index: Option<usize>,
}

impl AssetKey {
    #[must_use]
    pub fn new(section: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            section: section.into(),
            index,
        }
    }
}

///
/// AssetEntry
///
/// Alt text is edited independently of the binary: it may exist before any
/// upload and survives the binary being replaced.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AssetEntry {
    pub blob: Option<Blob>,
    pub alt_text: String,
    pub preview: Option<PreviewHandle>,
}

impl AssetEntry {
    #[must_use]
    pub const fn has_binary(&self) -> bool {
        self.blob.is_some()
    }
}

///
/// AssetLedger
///
/// Correlates pending binaries with tree positions and alt text. All
/// renumbering after a sub-section or image removal happens here, in one
/// operation.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AssetLedger {
    entries: BTreeMap<AssetKey, AssetEntry>,
}

impl AssetLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Attach or replace the binary at a slot. Existing alt text is
    /// preserved; replacement and alt-text editing are independent
    /// operations.
    pub fn set_asset(
        &mut self,
        section: &str,
        index: Option<usize>,
        blob: Blob,
        preview: Option<PreviewHandle>,
    ) {
        let entry = self
            .entries
            .entry(AssetKey::new(section, index))
            .or_default();

        entry.blob = Some(blob);
        entry.preview = preview;
    }

    /// Drop the binary and preview at a slot, keeping alt text.
    pub fn clear_asset(&mut self, section: &str, index: Option<usize>) {
        if let Some(entry) = self.entries.get_mut(&AssetKey::new(section, index)) {
            entry.blob = None;
            entry.preview = None;

            if entry.alt_text.is_empty() {
                self.entries.remove(&AssetKey::new(section, index));
            }
        }
    }

    /// Set alt text for a slot, creating the entry if no binary exists yet
    /// (the UI pre-fills alt text for not-yet-uploaded slots). Input is
    /// truncated at the character cap, mirroring a bounded input control.
    pub fn set_alt_text(&mut self, section: &str, index: Option<usize>, text: impl Into<String>) {
        let mut text: String = text.into();
        if text.chars().count() > ALT_TEXT_MAX_LEN {
            text = text.chars().take(ALT_TEXT_MAX_LEN).collect();
        }

        self.entries
            .entry(AssetKey::new(section, index))
            .or_default()
            .alt_text = text;
    }

    pub fn clear_alt_text(&mut self, section: &str, index: Option<usize>) {
        if let Some(entry) = self.entries.get_mut(&AssetKey::new(section, index)) {
            entry.alt_text.clear();

            if !entry.has_binary() {
                self.entries.remove(&AssetKey::new(section, index));
            }
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, index: Option<usize>) -> Option<&AssetEntry> {
        self.entries.get(&AssetKey::new(section, index))
    }

    /// Delete the entry at `removed` and shift every entry at a greater
    /// index down by one. Lower indices and the section-level slot are
    /// untouched; no entry remains addressable at the old top index.
    pub fn reindex_after_removal(&mut self, section: &str, removed: usize) {
        self.entries.remove(&AssetKey::new(section, Some(removed)));

        let shifted: Vec<usize> = self
            .entries
            .keys()
            .filter(|k| k.section == section)
            .filter_map(|k| k.index.filter(|i| *i > removed))
            .collect();

        for i in shifted {
            if let Some(entry) = self.entries.remove(&AssetKey::new(section, Some(i))) {
                self.entries.insert(AssetKey::new(section, Some(i - 1)), entry);
            }
        }
    }

    /// Indexed entries for a section, in position order.
    pub fn indexed(&self, section: &str) -> impl Iterator<Item = (usize, &AssetEntry)> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.section == section)
            .filter_map(|(k, v)| k.index.map(|i| (i, v)))
    }

    /// Every entry in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssetKey, &AssetEntry)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Called after a successful submission, once
    /// binary ownership has passed to the envelope.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

///
/// TESTS
///
