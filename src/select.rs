//! Candidate selection for a query point (viewport width, height, pixel ratio).
//!
//! Selection narrows a private working copy of the candidate list in two
//! stages. Each stage visits the properties in a fixed order (width, then
//! height, then pixel ratio), and every step feeds the next one, so an early
//! narrowing can change what a later step sees.
//!
//! 1. **Threshold** — keep candidates whose value is at least the query's.
//!    When none qualifies, keep only those carrying the largest value found
//!    instead of dropping everything.
//! 2. **Minimal** — keep only candidates carrying the smallest value found.
//!
//! The first survivor in source order wins.
//!
//! ```text
//! widths [400, 800, 1200], query width 900
//!   threshold width  → [1200]          (only 1200 ≥ 900)
//! widths [400, 800], query width 1600
//!   threshold width  → [800]           (nothing ≥ 1600, keep the largest)
//! widths [1200, 2400] after stage 1
//!   minimal width    → [1200]
//! ```
//!
//! Unbounded widths and heights count as `+∞`: they satisfy any threshold and
//! lose to any pixel count in the minimal stage.

use crate::candidate::{Candidate, CandidateSet};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Viewport conditions a candidate is selected for.
///
/// Only the validating constructors build one, so a `QueryPoint` always has
/// whole, non-negative width and height and a finite, non-negative ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryPoint {
    max_width: u32,
    max_height: u32,
    max_pixel_ratio: f64,
}

impl QueryPoint {
    /// Build a query point from raw host numbers.
    ///
    /// Width and height must be non-negative integers within `u32`; the pixel
    /// ratio must be finite and non-negative.
    pub fn new(
        max_width: f64,
        max_height: f64,
        max_pixel_ratio: f64,
    ) -> Result<Self, SelectError> {
        Ok(Self {
            max_width: pixel_count("width", max_width)?,
            max_height: pixel_count("height", max_height)?,
            max_pixel_ratio: pixel_ratio(max_pixel_ratio)?,
        })
    }

    /// Build a query point from already-integral viewport dimensions.
    pub fn viewport(
        max_width: u32,
        max_height: u32,
        max_pixel_ratio: f64,
    ) -> Result<Self, SelectError> {
        Ok(Self {
            max_width,
            max_height,
            max_pixel_ratio: pixel_ratio(max_pixel_ratio)?,
        })
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn max_pixel_ratio(&self) -> f64 {
        self.max_pixel_ratio
    }
}

fn pixel_count(name: &str, value: f64) -> Result<u32, SelectError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(SelectError::InvalidArgument(format!(
            "{name} must be a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

fn pixel_ratio(value: f64) -> Result<f64, SelectError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SelectError::InvalidArgument(format!(
            "pixel ratio must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// A candidate property the selector filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Width,
    Height,
    PixelRatio,
}

impl Property {
    /// Filtering order, shared by both stages.
    pub const ORDER: [Property; 3] = [Property::Width, Property::Height, Property::PixelRatio];

    fn of(self, candidate: &Candidate) -> f64 {
        match self {
            Property::Width => candidate.width().measure(),
            Property::Height => candidate.height().measure(),
            Property::PixelRatio => candidate.pixel_ratio(),
        }
    }

    fn threshold(self, query: &QueryPoint) -> f64 {
        match self {
            Property::Width => f64::from(query.max_width),
            Property::Height => f64::from(query.max_height),
            Property::PixelRatio => query.max_pixel_ratio,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Property::Width => "width",
            Property::Height => "height",
            Property::PixelRatio => "pixel ratio",
        })
    }
}

/// The two narrowing passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Threshold,
    Minimal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Threshold => "threshold",
            Stage::Minimal => "minimal",
        })
    }
}

/// Survivors after one filter step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step<'a> {
    pub stage: Stage,
    pub property: Property,
    pub survivors: Vec<&'a Candidate>,
}

fn threshold_step<'a>(
    working: &[&'a Candidate],
    property: Property,
    threshold: f64,
) -> Vec<&'a Candidate> {
    let meeting: Vec<&Candidate> = working
        .iter()
        .copied()
        .filter(|c| property.of(c) >= threshold)
        .collect();
    if !meeting.is_empty() {
        return meeting;
    }

    // Nothing is large enough: fall back to the largest available.
    let max_found = working.iter().map(|c| property.of(c)).fold(0.0, f64::max);
    working
        .iter()
        .copied()
        .filter(|c| property.of(c) >= max_found)
        .collect()
}

fn minimal_step<'a>(working: &[&'a Candidate], property: Property) -> Vec<&'a Candidate> {
    let min_found = working
        .iter()
        .map(|c| property.of(c))
        .fold(f64::INFINITY, f64::min);
    working
        .iter()
        .copied()
        .filter(|c| property.of(c) <= min_found)
        .collect()
}

impl CandidateSet {
    /// Run both stages, reporting the survivors after every step.
    /// Returns the final survivors; empty only when the set is empty.
    fn narrow<'a>(
        &'a self,
        query: &QueryPoint,
        mut on_step: impl FnMut(Stage, Property, &[&'a Candidate]),
    ) -> Vec<&'a Candidate> {
        let mut working: Vec<&Candidate> = self.iter().collect();
        if working.is_empty() {
            return working;
        }

        for property in Property::ORDER {
            working = threshold_step(&working, property, property.threshold(query));
            log::trace!("threshold {property}: {} left", working.len());
            on_step(Stage::Threshold, property, &working);
        }
        for property in Property::ORDER {
            working = minimal_step(&working, property);
            log::trace!("minimal {property}: {} left", working.len());
            on_step(Stage::Minimal, property, &working);
        }
        working
    }

    /// Pick the best candidate for `query`, or `None` if the set is empty.
    ///
    /// ```
    /// use srcset_pick::{QueryPoint, parse};
    ///
    /// let set = parse("img-1x.jpg 1x, img-2x.jpg 2x");
    /// let query = QueryPoint::viewport(500, 500, 1.0).unwrap();
    /// assert_eq!(set.select(&query).map(|c| c.url()), Some("img-1x.jpg"));
    /// ```
    pub fn select(&self, query: &QueryPoint) -> Option<&Candidate> {
        self.narrow(query, |_, _, _| {}).first().copied()
    }

    /// Like [`select`](Self::select), but takes unvalidated host numbers.
    ///
    /// An empty set yields `Ok(None)` whatever the numbers are; otherwise
    /// invalid numbers fail with [`SelectError::InvalidArgument`].
    pub fn get(
        &self,
        max_width: f64,
        max_height: f64,
        max_pixel_ratio: f64,
    ) -> Result<Option<&Candidate>, SelectError> {
        if self.is_empty() {
            return Ok(None);
        }
        let query = QueryPoint::new(max_width, max_height, max_pixel_ratio)?;
        Ok(self.select(&query))
    }

    /// The survivors after each of the six filter steps, in order.
    /// Empty when the set is empty.
    pub fn trace(&self, query: &QueryPoint) -> Vec<Step<'_>> {
        let mut steps = Vec::with_capacity(Property::ORDER.len() * 2);
        self.narrow(query, |stage, property, survivors| {
            steps.push(Step {
                stage,
                property,
                survivors: survivors.to_vec(),
            });
        });
        steps
    }
}
