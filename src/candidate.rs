//! Candidate types shared by the parser, the selector and the CLI.
//!
//! A [`Candidate`] is one `url` qualified by a width, a height and a pixel
//! ratio. Missing descriptors take their defaults (unbounded width, unbounded
//! height, `1x`), but a candidate can only come out of [`crate::parse`] when
//! its source group spelled at least one descriptor explicitly.
//!
//! A [`CandidateSet`] keeps candidates in source order and is unique by the
//! `(width, height, pixel_ratio)` triple. Source order matters: it is the
//! final tie-break when selection leaves more than one candidate standing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel ratio assumed when a group has no `x` descriptor.
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;

/// A width or height bound: a pixel count, or unbounded.
///
/// Variant order makes every pixel count compare below `Unbounded`.
/// Serialized as a plain number, or `null` when unbounded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum Extent {
    Px(u32),
    #[default]
    Unbounded,
}

impl Extent {
    /// Numeric measure used by the selector (`Unbounded` → `+∞`).
    pub fn measure(self) -> f64 {
        match self {
            Extent::Px(px) => f64::from(px),
            Extent::Unbounded => f64::INFINITY,
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Px(px) => write!(f, "{px}"),
            Extent::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// One image variant extracted from a descriptor string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    url: String,
    width: Extent,
    height: Extent,
    pixel_ratio: f64,
}

impl Candidate {
    /// Only the parser builds candidates; it has already checked that at
    /// least one descriptor was explicit and that `url` is non-empty.
    pub(crate) fn new(url: String, width: Extent, height: Extent, pixel_ratio: f64) -> Self {
        Self {
            url,
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn width(&self) -> Extent {
        self.width
    }

    pub fn height(&self) -> Extent {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// True when `other` carries the same `(width, height, pixel_ratio)` triple.
    pub fn same_descriptors(&self, other: &Candidate) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.pixel_ratio == other.pixel_ratio
    }
}

/// Canonical form: `url` followed by the non-default descriptors in `w h x`
/// order. A candidate at all defaults renders as `url 1x` so the output
/// always parses back to the same candidate.
impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)?;
        let mut explicit = false;
        if let Extent::Px(w) = self.width {
            write!(f, " {w}w")?;
            explicit = true;
        }
        if let Extent::Px(h) = self.height {
            write!(f, " {h}h")?;
            explicit = true;
        }
        if !explicit || self.pixel_ratio != DEFAULT_PIXEL_RATIO {
            write!(f, " {}x", self.pixel_ratio)?;
        }
        Ok(())
    }
}

/// Ordered, triple-unique list of candidates produced by [`crate::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `candidate` unless an earlier entry has the same triple,
    /// in which case it is handed back.
    pub(crate) fn push_unique(&mut self, candidate: Candidate) -> Result<(), Candidate> {
        if self.candidates.iter().any(|c| c.same_descriptors(&candidate)) {
            return Err(candidate);
        }
        self.candidates.push(candidate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}
