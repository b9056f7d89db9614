//! Descriptor string parser.
//!
//! Turns a `srcset`-style string into a [`CandidateSet`]:
//!
//! ```text
//! "small.jpg 480w, medium.jpg 800w 600h, retina.jpg 2x"
//!   → small.jpg   480w  unbounded  1x
//!     medium.jpg  800w  600h       1x
//!     retina.jpg  unbounded unbounded 2x
//! ```
//!
//! ## Grammar
//!
//! Groups are separated by `,`. Each group is a url, one space, and one or
//! more whitespace-separated descriptors:
//!
//! | Descriptor | Form | Example |
//! |---|---|---|
//! | width | `[0-9]+w` | `800w` |
//! | height | `[0-9]+h` | `600h` |
//! | pixel ratio | `[0-9]*.?[0-9]+x` | `2x`, `1.5x`, `.5x` |
//!
//! ## Recovery
//!
//! Parsing never fails. A group with an empty url, no descriptor, an unknown
//! descriptor, or two descriptors of the same kind is dropped as a whole and
//! the remaining groups are still parsed. Dropped groups are logged at
//! `debug` level. When two groups carry the same `(w, h, x)` triple, the
//! first one wins.

use crate::candidate::{Candidate, CandidateSet, DEFAULT_PIXEL_RATIO, Extent};
use std::convert::Infallible;
use std::str::FromStr;
use thiserror::Error;

/// Why a candidate group was dropped. Never surfaces to callers of [`parse`].
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum GroupError {
    #[error("no descriptors after url")]
    MissingDescriptors,
    #[error("empty url")]
    MissingUrl,
    #[error("unknown descriptor `{0}`")]
    UnknownDescriptor(String),
    #[error("duplicate `{0}` descriptor")]
    DuplicateDescriptor(char),
    #[error("at least one descriptor is required")]
    NoDescriptor,
}

/// A single descriptor token.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Descriptor {
    Width(u32),
    Height(u32),
    PixelRatio(f64),
}

impl Descriptor {
    fn parse(token: &str) -> Option<Self> {
        if let Some(body) = token.strip_suffix('w') {
            parse_integer(body).map(Descriptor::Width)
        } else if let Some(body) = token.strip_suffix('h') {
            parse_integer(body).map(Descriptor::Height)
        } else if let Some(body) = token.strip_suffix('x') {
            parse_ratio(body).map(Descriptor::PixelRatio)
        } else {
            None
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `[0-9]+`, rejecting values that overflow `u32`.
fn parse_integer(body: &str) -> Option<u32> {
    if !is_digits(body) {
        return None;
    }
    body.parse().ok()
}

/// `[0-9]*\.?[0-9]+`, rejecting values that overflow `f64` to infinity.
fn parse_ratio(body: &str) -> Option<f64> {
    let (int, frac) = body.split_once('.').unwrap_or(("", body));
    if !(int.is_empty() || is_digits(int)) || !is_digits(frac) {
        return None;
    }
    let ratio: f64 = if int.is_empty() {
        format!("0{body}").parse().ok()?
    } else {
        body.parse().ok()?
    };
    Some(ratio).filter(|x| x.is_finite())
}

/// Explicitly given descriptors of one group.
#[derive(Debug, Default, PartialEq)]
struct Descriptors {
    width: Option<u32>,
    height: Option<u32>,
    pixel_ratio: Option<f64>,
}

impl Descriptors {
    fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.pixel_ratio.is_none()
    }

    fn into_candidate(self, url: &str) -> Candidate {
        Candidate::new(
            url.to_string(),
            self.width.map_or(Extent::Unbounded, Extent::Px),
            self.height.map_or(Extent::Unbounded, Extent::Px),
            self.pixel_ratio.unwrap_or(DEFAULT_PIXEL_RATIO),
        )
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, kind: char) -> Result<(), GroupError> {
    if slot.is_some() {
        return Err(GroupError::DuplicateDescriptor(kind));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_descriptors(raw: &str) -> Result<Descriptors, GroupError> {
    let mut found = Descriptors::default();
    for token in raw.split_whitespace() {
        match Descriptor::parse(token) {
            Some(Descriptor::Width(w)) => set_once(&mut found.width, w, 'w')?,
            Some(Descriptor::Height(h)) => set_once(&mut found.height, h, 'h')?,
            Some(Descriptor::PixelRatio(x)) => set_once(&mut found.pixel_ratio, x, 'x')?,
            None => return Err(GroupError::UnknownDescriptor(token.to_string())),
        }
    }
    if found.is_empty() {
        return Err(GroupError::NoDescriptor);
    }
    Ok(found)
}

/// Parse one comma-separated group into a candidate.
fn parse_group(group: &str) -> Result<Candidate, GroupError> {
    let group = group.trim();
    let (url, descriptors) = match group.find(' ') {
        Some(0) => return Err(GroupError::MissingUrl),
        Some(pos) => (group[..pos].trim(), &group[pos + 1..]),
        None => return Err(GroupError::MissingDescriptors),
    };
    if url.is_empty() {
        return Err(GroupError::MissingUrl);
    }
    Ok(parse_descriptors(descriptors)?.into_candidate(url))
}

/// Parse a descriptor string into an ordered, deduplicated [`CandidateSet`].
///
/// `None` and blank input both yield an empty set.
///
/// ```
/// use srcset_pick::{Extent, parse};
///
/// let set = parse("a.jpg 400w, b.jpg 800w, c.jpg 400w");
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.as_slice()[0].url(), "a.jpg");
/// assert_eq!(set.as_slice()[1].width(), Extent::Px(800));
///
/// assert!(parse(None).is_empty());
/// ```
pub fn parse<'a>(raw: impl Into<Option<&'a str>>) -> CandidateSet {
    let normalized = raw
        .into()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut set = CandidateSet::new();
    for group in normalized.split(',') {
        match parse_group(group) {
            Ok(candidate) => {
                if let Err(rejected) = set.push_unique(candidate) {
                    log::debug!("Skipping `{rejected}`: descriptors already taken");
                }
            }
            Err(e) => log::debug!("Skipping candidate group `{}`: {e}", group.trim()),
        }
    }
    set
}

impl FromStr for CandidateSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    // =========================================================================
    // Descriptor tokens
    // =========================================================================

    #[test]
    fn width_token() {
        assert_eq!(Descriptor::parse("800w"), Some(Descriptor::Width(800)));
        assert_eq!(Descriptor::parse("0w"), Some(Descriptor::Width(0)));
    }

    #[test]
    fn height_token() {
        assert_eq!(Descriptor::parse("600h"), Some(Descriptor::Height(600)));
    }

    #[test]
    fn ratio_token_forms() {
        assert_eq!(Descriptor::parse("2x"), Some(Descriptor::PixelRatio(2.0)));
        assert_eq!(Descriptor::parse("1.5x"), Some(Descriptor::PixelRatio(1.5)));
        assert_eq!(Descriptor::parse(".5x"), Some(Descriptor::PixelRatio(0.5)));
        assert_eq!(Descriptor::parse("0x"), Some(Descriptor::PixelRatio(0.0)));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for token in [
            "", "w", "x", "1.x", "1..5x", "1.5.2x", "1.5w", "-1w", "+2w", "2X", "2 x", "abc",
            "1e3x", "800px", "99999999999w", "2é", "é",
        ] {
            assert_eq!(Descriptor::parse(token), None, "token {token:?}");
        }
    }

    #[test]
    fn ratio_overflowing_to_infinity_is_rejected() {
        let huge = "1".repeat(400) + "x";
        assert_eq!(Descriptor::parse(&huge), None);
        let huge_fraction = "9".repeat(400) + ".5x";
        assert_eq!(Descriptor::parse(&huge_fraction), None);
    }

    #[test]
    fn group_with_overflowing_ratio_is_dropped_and_reparse_is_stable() {
        let raw = format!("a.jpg {}x, b.jpg 2x", "9".repeat(400));
        let once = parse(raw.as_str());
        assert_eq!(urls(&once), vec!["b.jpg"]);
        assert_eq!(parse(once.to_string().as_str()), once);
    }

    // =========================================================================
    // Groups
    // =========================================================================

    #[test]
    fn group_without_space_is_missing_descriptors() {
        assert_eq!(parse_group("a.jpg"), Err(GroupError::MissingDescriptors));
    }

    #[test]
    fn group_with_unknown_descriptor_is_rejected_whole() {
        assert_eq!(
            parse_group("a.jpg 800w bogus"),
            Err(GroupError::UnknownDescriptor("bogus".into()))
        );
    }

    #[test]
    fn group_with_repeated_kind_is_rejected() {
        assert_eq!(
            parse_group("a.jpg 1x 2x"),
            Err(GroupError::DuplicateDescriptor('x'))
        );
        assert_eq!(
            parse_group("a.jpg 100w 600h 200w"),
            Err(GroupError::DuplicateDescriptor('w'))
        );
    }

    #[test]
    fn empty_descriptor_list_is_rejected() {
        assert_eq!(parse_descriptors(""), Err(GroupError::NoDescriptor));
    }

    #[test]
    fn group_takes_defaults_for_missing_kinds() {
        let c = parse_group("a.jpg 600h").unwrap();
        assert_eq!(c.width(), Extent::Unbounded);
        assert_eq!(c.height(), Extent::Px(600));
        assert_eq!(c.pixel_ratio(), 1.0);
    }

    #[test]
    fn descriptor_order_within_group_is_free() {
        let a = parse_group("a.jpg 2x 600h 800w").unwrap();
        let b = parse_group("a.jpg 800w 600h 2x").unwrap();
        assert_eq!(a, b);
    }

    // =========================================================================
    // Whole strings
    // =========================================================================

    #[test]
    fn none_and_blank_yield_empty_set() {
        assert!(parse(None).is_empty());
        assert!(parse("").is_empty());
        assert!(parse("   \n\t ").is_empty());
        assert!(parse(",,,").is_empty());
    }

    #[test]
    fn whitespace_runs_are_collapsed() {
        let set = parse("  a.jpg\t\t400w \n 300h ,\n b.jpg    2x  ");
        assert_eq!(urls(&set), vec!["a.jpg", "b.jpg"]);
        assert_eq!(set.as_slice()[0].height(), Extent::Px(300));
    }

    #[test]
    fn malformed_groups_are_skipped_others_kept() {
        let set = parse("a.jpg 400w, nodescriptor.jpg, c.jpg 2q, d.jpg 1x 1x, e.jpg 800w");
        assert_eq!(urls(&set), vec!["a.jpg", "e.jpg"]);
    }

    #[test]
    fn duplicate_triples_keep_first_occurrence() {
        let set = parse("first.jpg 2x, other.jpg 400w, second.jpg 2x");
        assert_eq!(urls(&set), vec!["first.jpg", "other.jpg"]);
    }

    #[test]
    fn explicit_defaults_collide_with_implicit_ones() {
        // `800w` and `800w 1x` describe the same triple.
        let set = parse("a.jpg 800w, b.jpg 800w 1x");
        assert_eq!(urls(&set), vec!["a.jpg"]);
    }

    #[test]
    fn single_character_url_is_accepted() {
        let set = parse("a 1x");
        assert_eq!(urls(&set), vec!["a"]);
    }

    #[test]
    fn from_str_matches_parse() {
        let set: CandidateSet = "a.jpg 1x, b.jpg 2x".parse().unwrap();
        assert_eq!(set, parse("a.jpg 1x, b.jpg 2x"));
    }

    #[test]
    fn reparsing_canonical_form_is_stable() {
        for raw in [
            "img-1x.jpg 1x, img-2x.jpg 2x",
            "a.jpg 400w, b.jpg 800w 600h, c.jpg 1.5x, d.jpg .25x 10h",
            "a.jpg 1x 100w, b.jpg 100w, c.jpg 0x",
            "",
        ] {
            let once = parse(raw);
            let twice = parse(once.to_string().as_str());
            assert_eq!(once, twice, "raw {raw:?}");
        }
    }
}
