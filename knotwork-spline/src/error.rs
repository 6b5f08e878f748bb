use thiserror::Error;

/// Errors reported by path validation before a solve.
///
/// Validation runs once, before any solver work begins; a failed validation
/// leaves a supplied control container untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplineError {
    /// The path has no knots at all.
    #[error("path must not be empty")]
    EmptyPath,
    /// Knot count is insufficient for solving.
    #[error("path has too few knots: need {needed}, got {got}")]
    TooFewKnots { needed: usize, got: usize },
    /// A knot coordinate is NaN or infinite.
    #[error("path has invalid knot coordinate at knot {0}")]
    InvalidKnot(usize),
    /// Two consecutive knots collapse to one point.
    #[error("path has degenerate segment between knots {0} and {1}")]
    DegenerateSegment(usize, usize),
    /// A cyclic path redundantly repeats its first knot as the last knot.
    #[error("cyclic path must not repeat first knot as terminal knot")]
    DuplicateTerminalKnot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = SplineError::TooFewKnots { needed: 3, got: 2 };
        assert_eq!(e.to_string(), "path has too few knots: need 3, got 2");
        let e = SplineError::DegenerateSegment(1, 2);
        assert!(e.to_string().contains("between knots 1 and 2"));
    }
}
