use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Write},
};
use thiserror::Error as ThisError;

///
/// ShapeError
///
/// Raised when a path disagrees with the shape of the data it addresses.
/// Always a programmer error; callers propagate it rather than display it.
///

#[derive(Debug, ThisError)]
pub enum ShapeError {
    #[error("empty path")]
    EmptyPath,

    #[error("path descends through a leaf at '{path}'")]
    LeafCollision { path: String },

    #[error("path terminates on a branch at '{path}'")]
    BranchCollision { path: String },

    #[error("'{path}' does not address a branch")]
    NotABranch { path: String },
}

///
/// Segment
///
/// One step of a path: a named field or a list index.
///

#[derive(
    Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl Segment {
    /// Parse a rendered segment; all-digit segments are indices.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse::<usize>()
                .map_or_else(|_| Self::Field(raw.to_string()), Self::Index)
        } else {
            Self::Field(raw.to_string())
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Self::Field(s.to_string())
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(s) => f.write_str(s),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

///
/// Path
///
/// A segment sequence addressing a field anywhere in the scalar/section/
/// sub-section tree, rendered in dot form: `quote_section.quotes.2.title`.
///

#[derive(
    Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Path(Vec<Segment>);

impl Path {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dot-rendered path. All-digit segments become indices.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::root();
        }

        Self(raw.split('.').map(Segment::parse).collect())
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Field(name.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Segment::Index(i));
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                f.write_char('.')?;
            }
            write!(f, "{seg}")?;
            first = false;
        }

        Ok(())
    }
}

///
/// Node
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
enum Node<T> {
    Leaf(T),
    Branch(BTreeMap<Segment, Node<T>>),
}

impl<T> Node<T> {
    fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(children) => children.values().map(Self::leaf_count).sum(),
        }
    }
}

///
/// PathTree
///
/// Sparse mapping from paths to leaf values. Intermediate branches are
/// created on `set` and pruned on `delete`, so the tree holds no entries
/// for absent paths. Valid fields are deleted, never nulled.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PathTree<T> {
    root: BTreeMap<Segment, Node<T>>,
}

/// The validation error map: leaf messages addressed by field path.
pub type ErrorTree = PathTree<String>;

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTree<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Insert a leaf value, creating intermediate branches as needed.
    ///
    /// Descending through an existing leaf, or landing on an existing
    /// branch, is a shape mismatch and returns a [`ShapeError`].
    pub fn set(&mut self, path: &Path, value: T) -> Result<(), ShapeError> {
        let (last, prefix) = path.segments().split_last().ok_or(ShapeError::EmptyPath)?;

        let mut cursor = &mut self.root;
        for (depth, seg) in prefix.iter().enumerate() {
            let node = cursor
                .entry(seg.clone())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));

            match node {
                Node::Branch(children) => cursor = children,
                Node::Leaf(_) => {
                    return Err(ShapeError::LeafCollision {
                        path: render_prefix(path, depth + 1),
                    });
                }
            }
        }

        match cursor.get(last) {
            Some(Node::Branch(_)) => Err(ShapeError::BranchCollision {
                path: path.to_string(),
            }),
            _ => {
                cursor.insert(last.clone(), Node::Leaf(value));
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&T> {
        let mut cursor = &self.root;
        let (last, prefix) = path.segments().split_last()?;

        for seg in prefix {
            match cursor.get(seg)? {
                Node::Branch(children) => cursor = children,
                Node::Leaf(_) => return None,
            }
        }

        match cursor.get(last)? {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    /// Remove the leaf at `path`, pruning branches left empty.
    ///
    /// Returns whether a leaf was removed. Absent paths are a no-op.
    pub fn delete(&mut self, path: &Path) -> bool {
        Self::delete_in(&mut self.root, path.segments())
    }

    fn delete_in(children: &mut BTreeMap<Segment, Node<T>>, segments: &[Segment]) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return false;
        };

        if rest.is_empty() {
            return matches!(children.get(head), Some(Node::Leaf(_)))
                && children.remove(head).is_some();
        }

        let Some(Node::Branch(inner)) = children.get_mut(head) else {
            return false;
        };

        let removed = Self::delete_in(inner, rest);
        if removed && inner.is_empty() {
            children.remove(head);
        }

        removed
    }

    /// Whether any leaf exists at or under `prefix`.
    ///
    /// The root prefix reports whether the tree holds anything at all.
    #[must_use]
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        let mut cursor = &self.root;

        for seg in prefix.segments() {
            match cursor.get(seg) {
                Some(Node::Branch(children)) => cursor = children,
                // a leaf at or before the end of the prefix counts
                Some(Node::Leaf(_)) => return true,
                None => return false,
            }
        }

        !cursor.is_empty()
    }

    /// Drop every entry under `prefix` at `removed`, then renumber higher
    /// indices down by one. Lower indices are untouched. A missing prefix
    /// is a no-op; a prefix addressing a leaf is a shape mismatch.
    pub fn remove_index(&mut self, prefix: &Path, removed: usize) -> Result<(), ShapeError> {
        let mut cursor = &mut self.root;

        for (depth, seg) in prefix.segments().iter().enumerate() {
            match cursor.get_mut(seg) {
                Some(Node::Branch(children)) => cursor = children,
                Some(Node::Leaf(_)) => {
                    return Err(ShapeError::NotABranch {
                        path: render_prefix(prefix, depth + 1),
                    });
                }
                None => return Ok(()),
            }
        }

        cursor.remove(&Segment::Index(removed));

        let shifted: Vec<usize> = cursor
            .keys()
            .filter_map(|seg| match seg {
                Segment::Index(i) if *i > removed => Some(*i),
                _ => None,
            })
            .collect();

        for i in shifted {
            if let Some(node) = cursor.remove(&Segment::Index(i)) {
                cursor.insert(Segment::Index(i - 1), node);
            }
        }

        self.prune(prefix);

        Ok(())
    }

    // Remove empty branch chains along `prefix` after a bulk removal.
    fn prune(&mut self, prefix: &Path) {
        fn prune_in<T>(children: &mut BTreeMap<Segment, Node<T>>, segments: &[Segment]) {
            let Some((head, rest)) = segments.split_first() else {
                return;
            };

            if let Some(Node::Branch(inner)) = children.get_mut(head) {
                prune_in(inner, rest);
                if inner.is_empty() {
                    children.remove(head);
                }
            }
        }

        prune_in(&mut self.root, prefix.segments());
    }

    /// Leaves in deterministic (segment-ordered) traversal order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Path, &T)> {
        fn walk<'a, T>(
            children: &'a BTreeMap<Segment, Node<T>>,
            trail: &mut Vec<Segment>,
            out: &mut Vec<(Path, &'a T)>,
        ) {
            for (seg, node) in children {
                trail.push(seg.clone());
                match node {
                    Node::Leaf(value) => out.push((Path::from(trail.clone()), value)),
                    Node::Branch(inner) => walk(inner, trail, out),
                }
                trail.pop();
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut Vec::new(), &mut out);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root.values().map(Node::leaf_count).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn clear(&mut self) {
        self.root.clear();
    }
}

// Render the first `depth` segments of a path for error reporting.
fn render_prefix(path: &Path, depth: usize) -> String {
    Path::from(path.segments()[..depth].to_vec()).to_string()
}

///
/// TESTS
///
