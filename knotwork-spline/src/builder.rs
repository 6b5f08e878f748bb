//! Building skeleton paths with a typed-state fluent API.
//!
//! Path construction alternates between adding a knot and adding a join
//! (curve or line). The two builder states encode that alternation in the
//! type system: a [`KnotAdder`] only accepts knots (or closes the cycle),
//! a [`JoinAdder`] only accepts joins (or ends the open path), so illegal
//! call sequences fail to compile.
//!
//! ```
//! use knotwork_spline::{nullpath, Point};
//!
//! let (path, controls) = nullpath()
//!     .knot(Point::new(0.0, 0.0))
//!     .curve()
//!     .knot(Point::new(3.0, 2.0))
//!     .line()
//!     .knot(Point::new(5.0, 2.5))
//!     .curve()
//!     .cycle();
//! assert_eq!(path.len(), 3);
//! # use knotwork_spline::HobbyPath as _;
//! # let _ = controls;
//! ```
//!
//! Calling [`JoinAdder::end`] or [`KnotAdder::cycle`] returns the finished
//! path together with an empty [`Controls`] container, to be filled by the
//! Hobby control point solver.

use kurbo::{Point, Vec2};

use crate::path::{Controls, HobbyPath, Path};
use crate::types::{Scalar, EPSILON};

/// Create an empty path, to be extended by subsequent builder calls.
#[must_use]
pub fn nullpath() -> KnotAdder {
    KnotAdder {
        path: Path::default(),
    }
}

/// Builder state that expects a knot (or the closing `cycle`).
#[derive(Debug)]
pub struct KnotAdder {
    path: Path,
}

/// Builder state that expects a join (or the terminating `end`).
#[derive(Debug)]
pub struct JoinAdder {
    path: Path,
}

impl KnotAdder {
    /// Add a standard smooth knot.
    #[must_use]
    pub fn knot(self, p: Point) -> JoinAdder {
        self.smooth_knot(p)
    }

    /// Add a standard smooth knot (same as [`Self::knot`]).
    #[must_use]
    pub fn smooth_knot(mut self, p: Point) -> JoinAdder {
        self.path.push_knot(p);
        JoinAdder { path: self.path }
    }

    /// Add a knot with explicit pre- and post-curl. 1.0 is neutral.
    #[must_use]
    pub fn curl_knot(mut self, p: Point, precurl: Scalar, postcurl: Scalar) -> JoinAdder {
        self.path.push_knot(p);
        let i = self.path.len() - 1;
        self.path.set_pre_curl(i, precurl);
        self.path.set_post_curl(i, postcurl);
        JoinAdder { path: self.path }
    }

    /// Add a knot with a given tangent direction on both sides.
    #[must_use]
    pub fn dir_knot(mut self, p: Point, dir: Vec2) -> JoinAdder {
        self.path.push_knot(p);
        let i = self.path.len() - 1;
        self.path.set_pre_dir(i, dir);
        self.path.set_post_dir(i, dir);
        JoinAdder { path: self.path }
    }

    /// Concatenate another path's knots and parameters.
    ///
    /// When the sub-path starts on the current terminal knot (within ε) the
    /// seam knot is merged: it keeps this path's pre-side parameters and
    /// adopts the sub-path's post-side parameters. An empty sub-path is a
    /// no-op.
    #[must_use]
    pub fn append_subpath(mut self, sub: &Path) -> JoinAdder {
        if sub.is_empty() {
            return JoinAdder { path: self.path };
        }
        let merge = !self.path.is_empty()
            && (self.path.z(self.path.len() - 1) - sub.z(0)).hypot() <= EPSILON;
        self.path.append_from(sub, merge);
        JoinAdder { path: self.path }
    }

    /// Close the path into a cycle.
    ///
    /// The last stored knot joins back to the first one; the first knot is
    /// not repeated in storage.
    #[must_use]
    pub fn cycle(mut self) -> (Path, Controls) {
        self.path.set_cycle(true);
        (self.path, Controls::new())
    }
}

impl JoinAdder {
    fn last(&self) -> usize {
        assert!(!self.path.is_empty(), "cannot add a join to an empty path");
        self.path.len() - 1
    }

    /// Connect to the next knot with a straight line.
    ///
    /// Pins curl 1.0 on both sides of the join.
    #[must_use]
    pub fn line(mut self) -> KnotAdder {
        let i = self.last();
        self.path.set_post_curl(i, 1.0);
        self.path.set_pre_curl(i + 1, 1.0);
        KnotAdder { path: self.path }
    }

    /// Connect to the next knot with a smooth curve.
    #[must_use]
    pub fn curve(self) -> KnotAdder {
        self.tension_curve(1.0, 1.0)
    }

    /// Connect to the next knot with a tense curve.
    ///
    /// Tensions are adapted to lie between 3/4 and 4. Negative tensions are
    /// interpreted as "at least" tensions; the distinction is currently
    /// dropped by the clamp. Neutral (1.0) tensions are not recorded.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn tension_curve(mut self, t1: Scalar, t2: Scalar) -> KnotAdder {
        let i = self.last();
        if t1 != 1.0 {
            self.path.set_post_tension(i, t1);
        }
        if t2 != 1.0 {
            self.path.set_pre_tension(i + 1, t2);
        }
        KnotAdder { path: self.path }
    }

    /// End an open path.
    #[must_use]
    pub fn end(self) -> (Path, Controls) {
        (self.path, Controls::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
