//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` so the
//! layout is testable, and a `print_*` wrapper that writes to stdout.
//!
//! ## Parse
//!
//! ```text
//! Candidates
//! 001 small.jpg
//!     width 480, height unbounded, 1x
//! 002 retina.jpg
//!     width unbounded, height unbounded, 2x
//! ```
//!
//! ## Select (`--explain`)
//!
//! ```text
//! Query 1280x800 @ 1x
//!     threshold width: large.jpg, retina.jpg
//!     threshold height: large.jpg, retina.jpg
//!     threshold pixel ratio: large.jpg, retina.jpg
//!     minimal width: large.jpg
//!     minimal height: large.jpg
//!     minimal pixel ratio: large.jpg
//! Selected large.jpg
//! ```
//!
//! An empty set never reaches the viewport, so its header has no query:
//!
//! ```text
//! No candidates
//! Placeholder data:image/gif;base64,...
//! ```

use crate::candidate::{Candidate, CandidateSet};
use crate::select::{QueryPoint, Step};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn descriptor_line(candidate: &Candidate) -> String {
    format!(
        "{}width {}, height {}, {}x",
        indent(1),
        candidate.width(),
        candidate.height(),
        candidate.pixel_ratio()
    )
}

// ============================================================================
// parse
// ============================================================================

/// Format the parsed candidates, one header line and one descriptor line each.
pub fn format_parse_output(set: &CandidateSet) -> Vec<String> {
    if set.is_empty() {
        return vec!["No candidates".to_string()];
    }
    let mut lines = vec!["Candidates".to_string()];
    for (i, candidate) in set.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), candidate.url()));
        lines.push(descriptor_line(candidate));
    }
    lines
}

pub fn print_parse_output(set: &CandidateSet) {
    for line in format_parse_output(set) {
        println!("{}", line);
    }
}

// ============================================================================
// select
// ============================================================================

/// Format the step-by-step narrowing that led to a selection.
///
/// `resolved` is what the command prints as its answer: the selected URL,
/// or the placeholder when nothing matched. `query` is `None` when the set
/// was empty and the viewport was never resolved.
pub fn format_explain_output(
    query: Option<&QueryPoint>,
    steps: &[Step<'_>],
    resolved: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    match query {
        Some(query) => {
            lines.push(format!(
                "Query {}x{} @ {}x",
                query.max_width(),
                query.max_height(),
                query.max_pixel_ratio()
            ));
            if steps.is_empty() {
                lines.push(format!("{}no candidates", indent(1)));
            }
        }
        None => lines.push("No candidates".to_string()),
    }
    for step in steps {
        let urls: Vec<&str> = step.survivors.iter().map(|c| c.url()).collect();
        lines.push(format!(
            "{}{} {}: {}",
            indent(1),
            step.stage,
            step.property,
            urls.join(", ")
        ));
    }
    let label = if steps.is_empty() { "Placeholder" } else { "Selected" };
    lines.push(format!("{} {}", label, resolved));
    lines
}

pub fn print_explain_output(query: Option<&QueryPoint>, steps: &[Step<'_>], resolved: &str) {
    for line in format_explain_output(query, steps, resolved) {
        println!("{}", line);
    }
}
