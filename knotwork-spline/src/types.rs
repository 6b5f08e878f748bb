//! Core types and numeric conventions shared across the spline solver.

use kurbo::{Point, Vec2};

/// Convenience alias. MetaFont historically used 16.16 fixed-point;
/// we use f64 throughout.
pub type Scalar = f64;

/// Tolerance for floating-point comparisons: numbers below ε mean zero.
pub const EPSILON: Scalar = 1e-7;

/// Near-zero guard for denominators that collapse in degenerate
/// configurations (coincident tangent equations, neutral two-knot spans).
pub const NEAR_ZERO: Scalar = 1e-30;

/// The "unknown" point sentinel: NaN in both components.
#[must_use]
pub fn unknown_point() -> Point {
    Point::new(Scalar::NAN, Scalar::NAN)
}

/// The "unknown" direction sentinel: NaN in both components.
#[must_use]
pub fn unknown_dir() -> Vec2 {
    Vec2::new(Scalar::NAN, Scalar::NAN)
}

/// Is this point the unknown sentinel (or otherwise not a number)?
#[must_use]
pub fn is_unknown_point(p: Point) -> bool {
    p.x.is_nan() || p.y.is_nan()
}

/// Is this direction the unknown sentinel (or otherwise not a number)?
#[must_use]
pub fn is_unknown_dir(v: Vec2) -> bool {
    v.x.is_nan() || v.y.is_nan()
}
