//! Path model for Hobby spline interpolation.
//!
//! A path is a sequence of knots, optionally cyclic, together with sparse
//! per-knot parameters: explicit pre/post tangent directions, pre/post curl,
//! and pre/post tension. The parameters are understood as *input* to the
//! interpolation; control point information lives in a separate [`Controls`]
//! container which starts out empty and is filled by the solver.
//!
//! The solver consumes paths through the read-only [`HobbyPath`] trait, so
//! that windowed segment views can stand in for whole paths.

use std::fmt::Write as _;

use kurbo::{Point, Vec2};

use crate::error::SplineError;
use crate::math::{self, reduce_angle, round4};
use crate::types::{is_unknown_dir, is_unknown_point, unknown_dir, unknown_point, Scalar, EPSILON};

// ---------------------------------------------------------------------------
// Read contract
// ---------------------------------------------------------------------------

/// Read-only view of a path as seen by the spline solver.
///
/// Knots are addressed modulo the path length: `z(i)` must accept subscripts
/// `>= len()` and return knot `i mod N`. The last knot of a cyclic path is
/// identical to the first one but is **not** stored twice; the algorithm
/// relies on modulo subscripting to walk the cycle.
pub trait HobbyPath {
    /// Is this path cyclic (closed)?
    fn is_cycle(&self) -> bool;
    /// Number of knots. For cyclic paths the first and last knot count once.
    fn len(&self) -> usize;
    /// Knot at position `i mod len()`.
    fn z(&self, i: usize) -> Point;
    /// Explicit incoming tangent at knot i, or the unknown sentinel.
    fn pre_dir(&self, i: usize) -> Vec2;
    /// Explicit outgoing tangent at knot i, or the unknown sentinel.
    fn post_dir(&self, i: usize) -> Vec2;
    /// Curl before knot i (1.0 is neutral).
    fn pre_curl(&self, i: usize) -> Scalar;
    /// Curl after knot i (1.0 is neutral).
    fn post_curl(&self, i: usize) -> Scalar;
    /// Tension before knot i, in [3/4, 4].
    fn pre_tension(&self, i: usize) -> Scalar;
    /// Tension after knot i, in [3/4, 4].
    fn post_tension(&self, i: usize) -> Scalar;

    /// Does the path hold no knots?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chord vector from knot i to knot i+1.
    fn delta(&self, i: usize) -> Vec2 {
        self.z(i + 1) - self.z(i)
    }

    /// Chord length |delta(i)|.
    fn d(&self, i: usize) -> Scalar {
        self.delta(i).hypot()
    }

    /// Turning angle at knot i between incoming and outgoing chords.
    ///
    /// Zero at the endpoints of an open path.
    fn psi(&self, i: usize) -> Scalar {
        let mut psi = 0.0;
        if self.is_cycle() || (i > 0 && i + 1 < self.len()) {
            let prev = if i == 0 { self.len() - 1 } else { i - 1 };
            psi = math::angle(self.delta(i)) - math::angle(self.delta(prev));
        }
        reduce_angle(psi)
    }

    /// Control-container slot backing knot i. Whole paths use the identity
    /// mapping; segment views remap into their parent's index range.
    fn control_slot(&self, i: usize) -> usize {
        i
    }
}

// ---------------------------------------------------------------------------
// Sparse array helpers
// ---------------------------------------------------------------------------

/// Grow a sparse array so index i exists, filling with a default.
pub(crate) fn extend_to<T: Copy>(arr: &mut Vec<T>, i: usize, default: T) {
    if i >= arr.len() {
        arr.resize(i + 1, default);
    }
}

/// Sparse read with a default for missing entries.
pub(crate) fn get_or<T: Copy>(arr: &[T], i: usize, default: T) -> T {
    arr.get(i).copied().unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// A concrete skeleton path.
///
/// Construct one with [`crate::builder::nullpath`] and the builder steps, or
/// grow it through the property setters. The parameter arrays are sparse:
/// entries never written read back as unknown (directions) or 1.0 (curl and
/// tension).
#[derive(Debug, Clone, Default)]
pub struct Path {
    points: Vec<Point>,
    cycle: bool,
    predirs: Vec<Vec2>,
    postdirs: Vec<Vec2>,
    precurls: Vec<Scalar>,
    postcurls: Vec<Scalar>,
    pretensions: Vec<Scalar>,
    posttensions: Vec<Scalar>,
}

/// Clamp a tension into the allowed [3/4, 4] range.
///
/// Negative inputs encode "at least" tension; the distinction is currently
/// dropped and the value is clamped like any other.
fn clamp_tension(t: Scalar) -> Scalar {
    t.clamp(0.75, 4.0)
}

impl Path {
    /// Append a knot with default (smooth) parameters.
    pub(crate) fn push_knot(&mut self, p: Point) {
        self.points.push(p);
    }

    /// Mark the path as cyclic.
    pub(crate) fn set_cycle(&mut self, cycle: bool) {
        self.cycle = cycle;
    }

    /// Set the incoming tangent direction at knot i.
    pub fn set_pre_dir(&mut self, i: usize, dir: Vec2) -> &mut Self {
        extend_to(&mut self.predirs, i, unknown_dir());
        self.predirs[i] = dir;
        self
    }

    /// Set the outgoing tangent direction at knot i.
    pub fn set_post_dir(&mut self, i: usize, dir: Vec2) -> &mut Self {
        extend_to(&mut self.postdirs, i, unknown_dir());
        self.postdirs[i] = dir;
        self
    }

    /// Set the curl before knot i.
    pub fn set_pre_curl(&mut self, i: usize, curl: Scalar) -> &mut Self {
        extend_to(&mut self.precurls, i, 1.0);
        self.precurls[i] = curl;
        self
    }

    /// Set the curl after knot i.
    pub fn set_post_curl(&mut self, i: usize, curl: Scalar) -> &mut Self {
        extend_to(&mut self.postcurls, i, 1.0);
        self.postcurls[i] = curl;
        self
    }

    /// Set the tension before knot i, clamped into [3/4, 4].
    pub fn set_pre_tension(&mut self, i: usize, tension: Scalar) -> &mut Self {
        extend_to(&mut self.pretensions, i, 1.0);
        self.pretensions[i] = clamp_tension(tension);
        self
    }

    /// Set the tension after knot i, clamped into [3/4, 4].
    pub fn set_post_tension(&mut self, i: usize, tension: Scalar) -> &mut Self {
        extend_to(&mut self.posttensions, i, 1.0);
        self.posttensions[i] = clamp_tension(tension);
        self
    }

    /// Concatenate another path's knots and parameters onto this one.
    ///
    /// With `merge_seam` set, the sub-path's first knot is treated as
    /// identical to the current terminal knot: the seam keeps this path's
    /// pre-side parameters and adopts the sub-path's post-side parameters.
    pub(crate) fn append_from(&mut self, sub: &Path, merge_seam: bool) {
        let mut from = 0;
        if merge_seam && !self.points.is_empty() && !sub.is_empty() {
            let seam = self.len() - 1;
            if !is_unknown_dir(sub.post_dir(0)) {
                self.set_post_dir(seam, sub.post_dir(0));
            }
            self.set_post_curl(seam, sub.post_curl(0));
            self.set_post_tension(seam, sub.post_tension(0));
            from = 1;
        }
        for i in from..sub.len() {
            let k = self.len();
            self.push_knot(sub.z(i));
            if !is_unknown_dir(sub.pre_dir(i)) {
                self.set_pre_dir(k, sub.pre_dir(i));
            }
            if !is_unknown_dir(sub.post_dir(i)) {
                self.set_post_dir(k, sub.post_dir(i));
            }
            self.set_pre_curl(k, sub.pre_curl(i));
            self.set_post_curl(k, sub.post_curl(i));
            self.set_pre_tension(k, sub.pre_tension(i));
            self.set_post_tension(k, sub.post_tension(i));
        }
    }

    /// Check whether this path can be handed to the solver.
    ///
    /// Rejects empty paths, too few knots (open < 2, cyclic < 3), non-finite
    /// knot coordinates, coincident consecutive knots (including the
    /// wrap-around pair of a cycle), and cyclic paths that redundantly repeat
    /// the first knot as the terminal knot.
    pub fn validate_for_solve(&self) -> Result<(), SplineError> {
        let n = self.len();
        if n == 0 {
            return Err(SplineError::EmptyPath);
        }
        if self.cycle {
            if n < 3 {
                return Err(SplineError::TooFewKnots { needed: 3, got: n });
            }
            if (self.points[n - 1] - self.points[0]).hypot() <= EPSILON {
                return Err(SplineError::DuplicateTerminalKnot);
            }
        } else if n < 2 {
            return Err(SplineError::TooFewKnots { needed: 2, got: n });
        }
        for (i, z) in self.points.iter().enumerate() {
            if !z.x.is_finite() || !z.y.is_finite() {
                return Err(SplineError::InvalidKnot(i));
            }
        }
        let limit = if self.cycle { n } else { n - 1 };
        for i in 0..limit {
            let j = (i + 1) % n;
            if (self.points[j] - self.points[i]).hypot() <= EPSILON {
                return Err(SplineError::DegenerateSegment(i, j));
            }
        }
        Ok(())
    }
}

impl HobbyPath for Path {
    fn is_cycle(&self) -> bool {
        self.cycle
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn z(&self, i: usize) -> Point {
        self.points[i % self.points.len()]
    }

    fn pre_dir(&self, i: usize) -> Vec2 {
        get_or(&self.predirs, i, unknown_dir())
    }

    fn post_dir(&self, i: usize) -> Vec2 {
        get_or(&self.postdirs, i, unknown_dir())
    }

    fn pre_curl(&self, i: usize) -> Scalar {
        get_or(&self.precurls, i, 1.0)
    }

    fn post_curl(&self, i: usize) -> Scalar {
        get_or(&self.postcurls, i, 1.0)
    }

    fn pre_tension(&self, i: usize) -> Scalar {
        get_or(&self.pretensions, i, 1.0)
    }

    fn post_tension(&self, i: usize) -> Scalar {
        get_or(&self.posttensions, i, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Control points
// ---------------------------------------------------------------------------

/// Container for the spline control points computed by the solver.
///
/// Two sparse arrays keyed by knot index: the pre-control of a knot is the
/// second Bezier control point of the join arriving at it, the post-control
/// the first control point of the join leaving it. Missing entries read as
/// the unknown point.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    prec: Vec<Point>,
    postc: Vec<Point>,
}

impl Controls {
    /// An empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-control of knot i (unknown if not yet computed).
    #[must_use]
    pub fn pre_control(&self, i: usize) -> Point {
        get_or(&self.prec, i, unknown_point())
    }

    /// Post-control of knot i (unknown if not yet computed).
    #[must_use]
    pub fn post_control(&self, i: usize) -> Point {
        get_or(&self.postc, i, unknown_point())
    }

    /// Store the pre-control of knot i.
    pub fn set_pre_control(&mut self, i: usize, c: Point) {
        extend_to(&mut self.prec, i, unknown_point());
        self.prec[i] = c;
    }

    /// Store the post-control of knot i.
    pub fn set_post_control(&mut self, i: usize, c: Point) {
        extend_to(&mut self.postc, i, unknown_point());
        self.postc[i] = c;
    }
}

// ---------------------------------------------------------------------------
// Textual dump
// ---------------------------------------------------------------------------

pub(crate) fn pt_string(p: Point, is_control: bool) -> String {
    if is_unknown_point(p) {
        "(<unknown>)".to_owned()
    } else if is_control {
        format!("({:.4},{:.4})", round4(p.x), round4(p.y))
    } else {
        format!("({},{})", round4(p.x), round4(p.y))
    }
}

/// Render a path, optionally with control points, as a debugging string.
///
/// The string contains newlines when control point information is present;
/// otherwise all knot coordinates appear on one line. Example, a circle of
/// diameter 1 around (2,1):
///
/// ```text
/// (1,1) .. controls (1.0000,1.5523) and (1.4477,2.0000)
///   .. (2,2) .. controls (2.5523,2.0000) and (3.0000,1.5523)
///   .. (3,1) .. controls (3.0000,0.4477) and (2.5523,0.0000)
///   .. (2,0) .. controls (1.4477,0.0000) and (1.0000,0.4477)
///   .. cycle
/// ```
///
/// The format is not fully equivalent to MetaFont's, but close.
#[must_use]
pub fn as_string<P: HobbyPath + ?Sized>(path: &P, controls: Option<&Controls>) -> String {
    let mut s = String::new();
    let n = path.len();
    for i in 0..n {
        if i > 0 {
            if let Some(c) = controls {
                let _ = write!(
                    s,
                    " and {}\n  .. ",
                    pt_string(c.pre_control(path.control_slot(i)), true)
                );
            } else {
                s.push_str(" .. ");
            }
        }
        s.push_str(&pt_string(path.z(i), false));
        if let Some(c) = controls {
            if i + 1 < n || path.is_cycle() {
                let _ = write!(
                    s,
                    " .. controls {}",
                    pt_string(c.post_control(path.control_slot(i)), true)
                );
            }
        }
    }
    if path.is_cycle() {
        if let Some(c) = controls {
            let _ = write!(
                s,
                " and {}\n ",
                pt_string(c.pre_control(path.control_slot(0)), true)
            );
        }
        s.push_str(" .. cycle");
    }
    s
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
