//! # Page Break Decisions
//!
//! The single rule behind every room request: a block that would cross the
//! bottom margin moves to a fresh page, unless it already starts at the top
//! of one. A block taller than a whole page is placed where it is and allowed
//! to overflow, which keeps pagination finite.

/// Tolerance for float comparisons against the margins.
const EPSILON: f64 = 1e-6;

/// What to do with a block of a given height at a given y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// The block fits (or cannot fit anywhere better). Place it at y.
    Place,
    /// Start a new page and place the block at its top margin.
    NewPage,
}

/// Decide whether `height` starting at `y` fits above `bottom_limit`.
pub fn decide_break(y: f64, height: f64, top: f64, bottom_limit: f64) -> BreakDecision {
    if y + height <= bottom_limit + EPSILON {
        return BreakDecision::Place;
    }
    if y <= top + EPSILON {
        return BreakDecision::Place;
    }
    BreakDecision::NewPage
}
