//! Host-side image source resolution.
//!
//! [`ImageSource`] is what a UI binding keeps per image element: the
//! element's own `src` (if any), the parsed candidates, and the last URL it
//! applied. The binding calls [`ImageSource::set_srcset`] whenever the bound
//! descriptor string changes and [`ImageSource::update`] whenever the viewport
//! does; `update` only hands back a URL when the element actually needs a new
//! one. Event wiring and debouncing stay with the host.
//!
//! The element's own `src` competes as a `1x` candidate placed before every
//! srcset entry, so it wins over any later candidate with the same
//! descriptors.

use crate::candidate::{Candidate, CandidateSet};
use crate::parse::parse;
use crate::select::QueryPoint;

/// 1×1 transparent GIF, applied when no candidate matches.
pub const BLANK_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

#[derive(Debug, Clone)]
pub struct ImageSource {
    fallback_src: Option<String>,
    placeholder: String,
    candidates: CandidateSet,
    applied: Option<String>,
}

impl ImageSource {
    /// New source for an element whose `src` attribute is `src`.
    /// Blank `src` values are ignored.
    pub fn new(src: Option<&str>) -> Self {
        let fallback_src = src
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            fallback_src,
            placeholder: BLANK_IMAGE.to_string(),
            candidates: CandidateSet::new(),
            applied: None,
        }
    }

    /// Use `placeholder` instead of [`BLANK_IMAGE`] when nothing matches.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Replace the descriptor string, re-parsing the candidates.
    pub fn set_srcset(&mut self, raw: Option<&str>) {
        let raw = raw.unwrap_or_default().trim();
        self.candidates = match &self.fallback_src {
            Some(src) => parse(format!("{src} 1x,{raw}").as_str()),
            None => parse(raw),
        };
        log::debug!("Parsed {} candidate(s)", self.candidates.len());
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn select(&self, query: &QueryPoint) -> Option<&Candidate> {
        self.candidates.select(query)
    }

    /// URL to show for `query`: the selected candidate, or the placeholder.
    pub fn resolve(&self, query: &QueryPoint) -> &str {
        self.select(query)
            .map_or(self.placeholder.as_str(), Candidate::url)
    }

    /// Resolve for `query` and record the result as applied.
    ///
    /// Returns `None` when the element already shows that URL.
    pub fn update(&mut self, query: &QueryPoint) -> Option<&str> {
        let url = self.resolve(query).to_string();
        if self.applied.as_deref() == Some(url.as_str()) {
            return None;
        }
        self.applied = Some(url);
        self.applied.as_deref()
    }

    /// The URL most recently returned by [`update`](Self::update).
    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }
}
