//! Type axes: the closed set of primitive variants a capability is
//! generated for.
//!
//! Every resolvable quantity is indexed either by one axis tag (the key
//! type) or by an ordered (key, value) pair of tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One primitive variant along a generation axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AxisTag {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl AxisTag {
    /// Number of axis tags.
    pub const COUNT: usize = 9;

    /// Every tag, in declaration order.
    pub const ALL: [AxisTag; AxisTag::COUNT] = [
        AxisTag::Boolean,
        AxisTag::Byte,
        AxisTag::Short,
        AxisTag::Char,
        AxisTag::Int,
        AxisTag::Long,
        AxisTag::Float,
        AxisTag::Double,
        AxisTag::Object,
    ];

    /// Position of this tag in [`AxisTag::ALL`]; used to index state tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key segment used for this tag in settings paths.
    pub fn path(self) -> &'static str {
        match self {
            AxisTag::Boolean => "Boolean",
            AxisTag::Byte => "Byte",
            AxisTag::Short => "Short",
            AxisTag::Char => "Char",
            AxisTag::Int => "Int",
            AxisTag::Long => "Long",
            AxisTag::Float => "Float",
            AxisTag::Double => "Double",
            AxisTag::Object => "Object",
        }
    }

    /// Find the tag whose path matches `s`, ignoring ASCII case.
    pub fn from_path(s: &str) -> Option<Self> {
        AxisTag::ALL
            .into_iter()
            .find(|tag| tag.path().eq_ignore_ascii_case(s))
    }

    /// True for every tag except `Object`.
    pub fn is_primitive(self) -> bool {
        self != AxisTag::Object
    }
}

impl fmt::Display for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Error returned when a string names no axis tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown axis tag '{0}'")]
pub struct ParseAxisError(pub String);

impl FromStr for AxisTag {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AxisTag::from_path(s).ok_or_else(|| ParseAxisError(s.to_string()))
    }
}

/// The ordered set of axis tags taking part in one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSet {
    tags: Vec<AxisTag>,
}

impl AxisSet {
    /// Every axis tag.
    pub fn all() -> Self {
        Self {
            tags: AxisTag::ALL.to_vec(),
        }
    }

    /// A subset of tags; duplicates are dropped and declaration order kept.
    pub fn from_tags(tags: impl IntoIterator<Item = AxisTag>) -> Self {
        let mut tags: Vec<AxisTag> = tags.into_iter().collect();
        tags.sort();
        tags.dedup();
        Self { tags }
    }

    /// Parse tag names such as `["Byte", "int"]`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ParseAxisError> {
        let tags = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<AxisTag>, _>>()?;
        Ok(Self::from_tags(tags))
    }

    pub fn iter(&self) -> impl Iterator<Item = AxisTag> + '_ {
        self.tags.iter().copied()
    }

    /// Every ordered (key, value) pair drawn from the set.
    pub fn pairs(&self) -> impl Iterator<Item = (AxisTag, AxisTag)> + '_ {
        self.tags
            .iter()
            .flat_map(move |&k| self.tags.iter().map(move |&v| (k, v)))
    }

    pub fn contains(&self, tag: AxisTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for AxisSet {
    fn default() -> Self {
        Self::all()
    }
}
