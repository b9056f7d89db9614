//! # srcset-pick
//!
//! Picks the single best image for a responsive-image element from a
//! `srcset`-style descriptor string, given the viewport's width, height and
//! device pixel ratio.
//!
//! ```text
//! 1. Parse    "a.jpg 400w, b.jpg 800w 2x"  →  CandidateSet
//! 2. Select   CandidateSet + QueryPoint     →  Option<&Candidate>
//! ```
//!
//! Both steps are pure: no I/O, no shared state. A set is parsed once and
//! selected from as often as the viewport changes; selection never mutates
//! it.
//!
//! ```
//! use srcset_pick::{QueryPoint, parse};
//!
//! let set = parse("small.jpg 600w, large.jpg 1200w, large@2x.jpg 1200w 2x");
//! let phone = QueryPoint::viewport(390, 844, 1.0).unwrap();
//! let laptop = QueryPoint::viewport(1000, 700, 2.0).unwrap();
//!
//! assert_eq!(set.select(&phone).unwrap().url(), "small.jpg");
//! assert_eq!(set.select(&laptop).unwrap().url(), "large@2x.jpg");
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`candidate`] | `Candidate`, `Extent` and the ordered, deduplicated `CandidateSet` |
//! | [`mod@parse`] | Descriptor string parser (`url 800w 600h 2x, ...`) |
//! | [`select`] | Two-stage selection for a `QueryPoint` |
//! | [`source`] | Per-element state for UI bindings (fallback `src`, placeholder, change detection) |
//! | [`config`] | `srcset-pick.toml` loading for the CLI (viewport defaults, presets) |
//! | [`output`] | CLI output formatting |
//!
//! # Selection in Short
//!
//! Stage one never serves an image smaller than the viewport needs, unless
//! nothing is big enough, in which case it keeps the biggest. Stage two then
//! drops anything larger or denser than necessary. Both run over width,
//! height and pixel ratio in that order; remaining ties go to whichever
//! candidate came first in the descriptor string. See [`select`].

pub mod candidate;
pub mod config;
pub mod output;
pub mod parse;
pub mod select;
pub mod source;

pub use candidate::{Candidate, CandidateSet, Extent};
pub use parse::parse;
pub use select::{Property, QueryPoint, SelectError, Stage, Step};
pub use source::{BLANK_IMAGE, ImageSource};

#[cfg(test)]
pub(crate) mod test_helpers;
