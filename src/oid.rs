//! Numeric MIB paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest path the kernel accepts.
pub const CTL_MAXNAME: usize = 24;

/// Ordered integer address of a node in the namespace.
///
/// Paths compare by value; `a` is an ancestor of `b` when `a` is a proper
/// prefix of `b`. Ordering is lexicographic, which is the kernel's
/// namespace order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(Vec<i32>);

impl Oid {
    /// Empty path, the namespace root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Numeric components.
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `other` or contains it.
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Whether `self` is a proper ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Oid) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Build a meta-path: `selector` followed by this path.
    pub fn prefixed(&self, selector: &[i32]) -> Vec<i32> {
        let mut name = Vec::with_capacity(selector.len().saturating_add(self.0.len()));
        name.extend_from_slice(selector);
        name.extend_from_slice(&self.0);
        name
    }

    /// Decode a path from a kernel buffer of native-endian machine words.
    ///
    /// Trailing bytes that do not fill a whole word are ignored.
    pub fn from_ne_bytes(raw: &[u8]) -> Self {
        Self(
            raw.chunks_exact(std::mem::size_of::<i32>())
                .map(|word| i32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
                .collect(),
        )
    }
}

impl From<Vec<i32>> for Oid {
    fn from(parts: Vec<i32>) -> Self {
        Self(parts)
    }
}

impl From<&[i32]> for Oid {
    fn from(parts: &[i32]) -> Self {
        Self(parts.to_vec())
    }
}

impl AsRef<[i32]> for Oid {
    fn as_ref(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

/// Error returned when a dotted numeric path does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid numeric oid: {0}")]
pub struct ParseOidError(String);

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| part.parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ParseOidError(s.to_owned()))
    }
}
