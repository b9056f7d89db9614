//! Shared test utilities: bulk extractors over candidate sets and selection
//! steps, so assertions can compare plain URL lists.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let set = parse("a.jpg 400w, b.jpg 800w");
//! assert_eq!(urls(&set), vec!["a.jpg", "b.jpg"]);
//! ```

use crate::candidate::CandidateSet;
use crate::select::Step;

/// URLs of every candidate, in set order.
pub fn urls(set: &CandidateSet) -> Vec<&str> {
    set.iter().map(|c| c.url()).collect()
}

/// URLs of the survivors of one selection step, in set order.
pub fn step_urls<'a>(step: &Step<'a>) -> Vec<&'a str> {
    step.survivors.iter().map(|c| c.url()).collect()
}
