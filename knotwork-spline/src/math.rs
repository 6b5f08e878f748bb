//! Numeric utilities for the spline solver.
//!
//! Angle arithmetic is done in radians; angles are reduced before storage
//! or comparison. The reciprocal follows the MetaFont convention of treating
//! a missing (NaN) value as 1.

use std::f64::consts::{PI, TAU};

use kurbo::Vec2;

use crate::types::{is_unknown_dir, Scalar, EPSILON};

/// Reduce an angle into the range (-π, π].
///
/// A single 2π correction suffices because inputs are differences of
/// two phases, each already in (-π, π].
#[must_use]
pub fn reduce_angle(a: Scalar) -> Scalar {
    if a.abs() > PI {
        if a > 0.0 {
            a - TAU
        } else {
            a + TAU
        }
    } else {
        a
    }
}

/// Return 1/a, treating NaN as the neutral tension 1.
#[must_use]
pub fn recip(a: Scalar) -> Scalar {
    if a.is_nan() {
        1.0
    } else {
        1.0 / a
    }
}

/// a².
#[must_use]
pub fn square(a: Scalar) -> Scalar {
    a * a
}

/// Phase of a vector in (-π, π]; 0 for the unknown vector.
#[must_use]
pub fn angle(v: Vec2) -> Scalar {
    if is_unknown_dir(v) {
        0.0
    } else {
        v.atan2()
    }
}

/// Equality of two vectors by the phase of their difference.
///
/// NaN inputs compare non-equal.
#[must_use]
pub fn equal(a: Vec2, b: Vec2) -> bool {
    let d = a - b;
    d.y.atan2(d.x).abs() < EPSILON
}

/// Symmetric rounding to 4 decimal places. Display only.
#[must_use]
pub fn round4(x: Scalar) -> Scalar {
    if x >= 0.0 {
        (x * 10000.0 + 0.5).trunc() / 10000.0
    } else {
        (x * 10000.0 - 0.5).trunc() / 10000.0
    }
}

/// Radians to degrees, for trace output.
#[must_use]
pub fn rad2deg(a: Scalar) -> Scalar {
    a * 180.0 / PI
}
