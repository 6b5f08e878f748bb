//! Hobby's algorithm for finding spline control points.
//!
//! Given a skeleton path with optional direction, curl, and tension
//! parameters, this computes cubic Bezier control points that produce an
//! aesthetically pleasing smooth curve through the knots. The notation
//! sticks closely to the original code in MetaFont:
//!
//! 1. Split the path at rough knots into independently smooth segments.
//! 2. For each segment, set up a tridiagonal system (cyclic tridiagonal for
//!    closed paths) in the unknown tangent angles `theta` measured against
//!    the outgoing chords, and solve it by Gaussian elimination.
//! 3. Convert the solved angles into control points with Hobby's velocity
//!    formulas.
//!
//! Diagnostic detail is controlled by an injected [`Verbosity`] and routed
//! through the `log` facade; at [`Verbosity::Info`] the solver traces every
//! solved segment the way MetaFont does under `tracingchoices`.

use std::f64::consts::SQRT_2;

use kurbo::Vec2;
use log::{debug, info};

use crate::error::SplineError;
use crate::math::{angle, rad2deg, recip, reduce_angle, square};
use crate::path::{as_string, Controls, HobbyPath, Path};
use crate::segment::{split_segments, validate_segment, Segment};
use crate::types::{is_unknown_dir, Scalar, NEAR_ZERO};

// ---------------------------------------------------------------------------
// Public surface
// ---------------------------------------------------------------------------

/// How much diagnostic detail the solver emits to the log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No diagnostics.
    #[default]
    Silent,
    /// Trace segments and solved paths.
    Info,
    /// Additionally trace every solver step.
    Debug,
}

/// Finds Hobby spline control points for skeleton paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct HobbySolver {
    verbosity: Verbosity,
}

/// Find the Hobby spline control points for a skeleton path.
///
/// Clients may provide a container for the control points; if `controls` is
/// `None`, a fresh one is allocated. The filled container is returned.
///
/// The path is validated first; an error leaves a supplied container
/// untouched.
pub fn find_hobby_controls(
    path: &Path,
    controls: Option<Controls>,
) -> Result<Controls, SplineError> {
    HobbySolver::new().find_controls(path, controls)
}

/// Compatibility variant of [`find_hobby_controls`] which panics on
/// validation errors.
///
/// # Panics
///
/// Panics if the path fails validation.
#[must_use]
pub fn must_find_hobby_controls(path: &Path, controls: Option<Controls>) -> Controls {
    match find_hobby_controls(path, controls) {
        Ok(c) => c,
        Err(e) => panic!("find_hobby_controls: {e}"),
    }
}

impl HobbySolver {
    /// A solver with silent diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver emitting diagnostics up to the given level.
    #[must_use]
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Find control points for all segments of `path`.
    ///
    /// See [`find_hobby_controls`].
    pub fn find_controls(
        &self,
        path: &Path,
        controls: Option<Controls>,
    ) -> Result<Controls, SplineError> {
        path.validate_for_solve()?;
        let segments = split_segments(path);
        for segment in &segments {
            validate_segment(segment)?;
        }
        let mut controls = controls.unwrap_or_default();
        for segment in &segments {
            if self.verbosity >= Verbosity::Info {
                info!("find controls for segment {}", as_string(segment, None));
            }
            self.solve_segment(segment, &mut controls);
        }
        Ok(controls)
    }

    // -----------------------------------------------------------------------
    // Per-segment solve
    // -----------------------------------------------------------------------

    fn solve_segment(&self, seg: &Segment<'_>, controls: &mut Controls) {
        let n = seg.len();
        let mut u = vec![0.0; n + 2];
        let mut v = vec![0.0; n + 2];
        let mut theta = vec![0.0; n + 2];
        if seg.is_cycle() {
            let mut w = vec![0.0; n + 2];
            u[0] = 0.0;
            v[0] = 0.0;
            w[0] = 1.0;
            self.build_eqs(seg, &mut u, &mut v, Some(&mut w));
            self.end_cycle(seg, &mut theta, &u, &mut v, &w);
        } else {
            self.start_open(seg, &mut u, &mut v);
            self.build_eqs(seg, &mut u, &mut v, None);
            self.end_open(seg, &mut theta, &u, &v);
        }
        self.set_controls(seg, &theta, controls);
    }

    /// Boundary condition at the first knot of an open segment.
    fn start_open(&self, seg: &Segment<'_>, u: &mut [Scalar], v: &mut [Scalar]) {
        if is_unknown_dir(seg.post_dir(0)) {
            let a = recip(seg.post_tension(0));
            let b = recip(seg.pre_tension(1));
            let c = square(a) * seg.post_curl(0) / square(b);
            if self.verbosity >= Verbosity::Debug {
                debug!("post_curl(0) = {:.4}", seg.post_curl(0));
                debug!("a = {a:.4}, b = {b:.4}, c = {c:.4}");
            }
            u[0] = ((3.0 - a) * c + b) / (a * c + 3.0 - b);
            v[0] = -u[0] * seg.psi(1);
        } else {
            u[0] = 0.0;
            v[0] = reduce_angle(angle(seg.post_dir(0)) - angle(seg.delta(0)));
        }
        if self.verbosity >= Verbosity::Debug {
            debug!("u.0 = {:.4}, v.0 = {:.4}", u[0], v[0]);
        }
    }

    /// Forward elimination sweep shared by the open and cyclic systems.
    ///
    /// Converts the tridiagonal rows into the form
    /// `theta[i] + u[i]*theta[i+1] = v[i]` (cyclic rows additionally track
    /// `w[i]`, the coefficient of `theta[0]`).
    fn build_eqs(
        &self,
        seg: &Segment<'_>,
        u: &mut [Scalar],
        v: &mut [Scalar],
        mut w: Option<&mut [Scalar]>,
    ) {
        let n = seg.len();
        let top = if seg.is_cycle() { n } else { n - 1 };
        for i in 1..=top {
            let a0 = recip(seg.post_tension(i - 1));
            let a1 = recip(seg.post_tension(i));
            let b1 = recip(seg.pre_tension(i));
            let b2 = recip(seg.pre_tension(i + 1));
            let aa = a0 / (square(b1) * seg.d(i - 1));
            let bb = (3.0 - a0) / (square(b1) * seg.d(i - 1));
            let cc = (3.0 - b2) / (square(a1) * seg.d(i));
            let dd = b2 / (square(a1) * seg.d(i));
            if self.verbosity >= Verbosity::Debug {
                debug!("1/tensions: {a0:.4}, {a1:.4}, {b1:.4}, {b2:.4}");
                debug!("A, B, C, D: {aa:.4}, {bb:.4}, {cc:.4}, {dd:.4}");
            }
            let t = bb - u[i - 1] * aa + cc;
            if t.abs() < NEAR_ZERO {
                u[i] = 0.0;
                v[i] = 0.0;
                if let Some(w) = w.as_deref_mut() {
                    w[i] = 0.0;
                }
            } else {
                u[i] = dd / t;
                v[i] = (-bb * seg.psi(i) - dd * seg.psi(i + 1) - aa * v[i - 1]) / t;
                if let Some(w) = w.as_deref_mut() {
                    w[i] = -aa * w[i - 1] / t;
                }
            }
            if self.verbosity >= Verbosity::Debug {
                debug!("u.{i} = {:.4}, v.{i} = {:.4}", u[i], v[i]);
            }
        }
    }

    /// Boundary condition at the last knot of an open segment, followed by
    /// back-substitution.
    fn end_open(&self, seg: &Segment<'_>, theta: &mut [Scalar], u: &[Scalar], v: &[Scalar]) {
        let last = seg.len() - 1;
        if is_unknown_dir(seg.pre_dir(last)) {
            let a = recip(seg.post_tension(last - 1));
            let b = recip(seg.pre_tension(last));
            let c = square(b) * seg.pre_curl(last) / square(a);
            let u_last = (b * c + 3.0 - a) / ((3.0 - b) * c + a);
            if self.verbosity >= Verbosity::Debug {
                debug!("pre_curl({last}) = {:.4}, u.{last} = {u_last:.4}", seg.pre_curl(last));
            }
            let denom = u[last - 1] - u_last;
            theta[last] = if denom.abs() < NEAR_ZERO {
                0.0
            } else {
                v[last - 1] / denom
            };
        } else {
            theta[last] = reduce_angle(angle(seg.pre_dir(last)) - angle(seg.delta(last - 1)));
        }
        if self.verbosity >= Verbosity::Debug {
            debug!("theta.{last} = {:.4}", rad2deg(theta[last]));
        }
        for i in (0..last).rev() {
            theta[i] = v[i] - u[i] * theta[i + 1];
            if self.verbosity >= Verbosity::Debug {
                debug!("theta.{i} = {:.4}", rad2deg(theta[i]));
            }
        }
    }

    /// Close the cyclic system: determine `theta[0]` from the wrap-around
    /// row, then back-substitute.
    fn end_cycle(
        &self,
        seg: &Segment<'_>,
        theta: &mut [Scalar],
        u: &[Scalar],
        v: &mut [Scalar],
        w: &[Scalar],
    ) {
        let n = seg.len();
        let mut a = 0.0;
        let mut b = 1.0;
        for i in (1..=n).rev() {
            a = v[i] - a * u[i];
            b = w[i] - b * u[i];
        }
        let denom = 1.0 - (w[n] - b * u[n]);
        let t0 = if denom.abs() < NEAR_ZERO {
            0.0
        } else {
            (v[n] - a * u[n]) / denom
        };
        v[0] = t0;
        for i in 1..=n {
            v[i] += w[i] * t0;
        }
        theta[0] = t0;
        theta[n] = t0;
        for i in (1..n).rev() {
            theta[i] = v[i] - u[i] * theta[i + 1];
        }
        if self.verbosity >= Verbosity::Debug {
            for i in 0..=n {
                debug!("theta.{i} = {:.4}", rad2deg(theta[i]));
            }
        }
    }

    /// Convert the solved angles into control points, one pair per join.
    fn set_controls(&self, seg: &Segment<'_>, theta: &[Scalar], controls: &mut Controls) {
        let n = seg.len();
        let joins = if seg.is_cycle() { n } else { n - 1 };
        for i in 0..joins {
            let phi = -seg.psi(i + 1) - theta[i + 1];
            let a = recip(seg.post_tension(i));
            let b = recip(seg.pre_tension(i + 1));
            let dvec = seg.delta(i);
            let (p2, p3) = control_offsets(theta[i], phi, a, b, dvec);
            controls.set_post_control(seg.control_slot(i % n), seg.z(i) + p2);
            controls.set_pre_control(seg.control_slot((i + 1) % n), seg.z(i + 1) - p3);
        }
        if self.verbosity >= Verbosity::Info {
            info!("{}", as_string(seg, Some(controls)));
        }
    }
}

// ---------------------------------------------------------------------------
// Control point computation
// ---------------------------------------------------------------------------

/// Hobby's empirical velocity parameters, as explained in his paper.
fn hobby_alpha_beta(theta: Scalar, phi: Scalar) -> (Scalar, Scalar) {
    let const_a = SQRT_2;
    let const_b = 1.0 / 16.0;
    let const_c = (3.0 - 5.0_f64.sqrt()) / 2.0; // 0.38196...
    let const_cc = 1.0 - const_c;
    let st = theta.sin();
    let ct = theta.cos();
    let sf = phi.sin();
    let cf = phi.cos();
    let alpha = const_a * (st - const_b * sf) * (sf - const_b * st) * (ct - cf);
    let beta = 1.0 + const_cc * ct + const_c * cf;
    (alpha, beta)
}

fn hobby_rho_sigma(alpha: Scalar, beta: Scalar) -> (Scalar, Scalar) {
    ((2.0 + alpha) / beta, (2.0 - alpha) / beta)
}

/// Chord rotated by +theta (outgoing side) and by -phi (incoming side).
fn unit_vectors(theta: Scalar, phi: Scalar, dvec: Vec2) -> (Vec2, Vec2) {
    let st = theta.sin();
    let ct = theta.cos();
    let sf = phi.sin();
    let cf = phi.cos();
    let uv1 = Vec2::new(dvec.x * ct - dvec.y * st, dvec.x * st + dvec.y * ct);
    let uv2 = Vec2::new(dvec.x * cf + dvec.y * sf, -dvec.x * sf + dvec.y * cf);
    (uv1, uv2)
}

/// Offsets of the two control points of the join spanning `dvec`, given the
/// solved angles and the reciprocal tensions on both sides.
fn control_offsets(theta: Scalar, phi: Scalar, a: Scalar, b: Scalar, dvec: Vec2) -> (Vec2, Vec2) {
    let (alpha, beta) = hobby_alpha_beta(theta, phi);
    let (rho, sigma) = hobby_rho_sigma(alpha, beta);
    let (uv1, uv2) = unit_vectors(theta, phi, dvec);
    (uv1 * (a / 3.0 * rho), uv2 * (b / 3.0 * sigma))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::nullpath;
    use crate::types::is_unknown_point;
    use kurbo::Point;

    fn assert_close(p: Point, x: Scalar, y: Scalar, tol: Scalar) {
        assert!(
            (p.x - x).abs() < tol && (p.y - y).abs() < tol,
            "expected ({x},{y}), got ({},{})",
            p.x,
            p.y
        );
    }

    fn diagonal_open() -> (Path, Controls) {
        nullpath()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 2.0))
            .curve()
            .knot(Point::new(3.0, 1.0))
            .end()
    }

    fn circle_cycle() -> (Path, Controls) {
        nullpath()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 2.0))
            .curve()
            .knot(Point::new(3.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .curve()
            .cycle()
    }

    #[test]
    fn test_open_diagonal_bend() {
        let (path, controls) = diagonal_open();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        // symmetric S-like bend: both outer controls lie above y = 1
        assert_close(controls.post_control(0), 1.0, 1.5523, 2e-4);
        assert_close(controls.pre_control(1), 1.4477, 2.0, 2e-4);
        assert_close(controls.post_control(1), 2.5523, 2.0, 2e-4);
        assert_close(controls.pre_control(2), 3.0, 1.5523, 2e-4);
        assert!(controls.post_control(0).y > 1.0);
        assert!(controls.pre_control(2).y > 1.0);
        // an open path has no pre-control at its first knot
        assert!(is_unknown_point(controls.pre_control(0)));
        assert!(is_unknown_point(controls.post_control(2)));
    }

    #[test]
    fn test_cycle_unit_circle() {
        // a circle of diameter 1 around (2,1)
        let (path, controls) = circle_cycle();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        assert_close(controls.post_control(0), 1.0, 1.5523, 2e-4);
        assert_close(controls.pre_control(1), 1.4477, 2.0, 2e-4);
        assert_close(controls.post_control(1), 2.5523, 2.0, 2e-4);
        assert_close(controls.pre_control(2), 3.0, 1.5523, 2e-4);
        assert_close(controls.post_control(2), 3.0, 0.4477, 2e-4);
        assert_close(controls.pre_control(3), 2.5523, 0.0, 2e-4);
        assert_close(controls.post_control(3), 1.4477, 0.0, 2e-4);
        assert_close(controls.pre_control(0), 1.0, 0.4477, 2e-4);
    }

    #[test]
    fn test_cycle_as_string_snapshot() {
        let (path, controls) = circle_cycle();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        let s = as_string(&path, Some(&controls));
        assert!(s.starts_with("(1,1) .. controls (1.0000,1.5523) and (1.4477,2.0000)"));
        assert!(s.ends_with(" .. cycle"));
    }

    #[test]
    fn test_two_knots_straight() {
        let (path, controls) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(10.0, 0.0))
            .end();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        let cp1 = controls.post_control(0);
        let cp2 = controls.pre_control(1);
        assert!(cp1.x > 0.0 && cp1.x < 10.0);
        assert!(cp1.y.abs() < 1e-9);
        assert!(cp2.x > cp1.x && cp2.x < 10.0);
        assert!(cp2.y.abs() < 1e-9);
    }

    #[test]
    fn test_segmented_rough_path() {
        // the middle knot carries pre-curl 2.0, so the path splits into
        // [0,1] and [1,2]; both halves solve to straight chords
        let (path, controls) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .curl_knot(Point::new(1.0, 1.0), 2.0, 1.0)
            .curve()
            .knot(Point::new(2.0, 0.0))
            .end();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        assert_close(controls.post_control(0), 1.0 / 3.0, 1.0 / 3.0, 1e-9);
        assert_close(controls.pre_control(1), 2.0 / 3.0, 2.0 / 3.0, 1e-9);
        assert_close(controls.post_control(1), 4.0 / 3.0, 2.0 / 3.0, 1e-9);
        assert_close(controls.pre_control(2), 5.0 / 3.0, 1.0 / 3.0, 1e-9);
    }

    #[test]
    fn test_given_direction_honored() {
        let (path, controls) = nullpath()
            .dir_knot(Point::new(0.0, 0.0), Vec2::new(0.0, 1.0))
            .curve()
            .knot(Point::new(10.0, 5.0))
            .end();
        let controls = find_hobby_controls(&path, Some(controls)).unwrap();
        let cp = controls.post_control(0);
        // the curve leaves the first knot straight up
        assert!(cp.y > 0.0, "cp should be above start: {cp:?}");
        assert!(cp.x.abs() < 1e-9, "cp should be directly above start: {cp:?}");
    }

    #[test]
    fn test_high_tension_shortens_handles() {
        let (loose, c0) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(10.0, 10.0))
            .end();
        let loose_controls = find_hobby_controls(&loose, Some(c0)).unwrap();

        let (tight, c1) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .tension_curve(4.0, 4.0)
            .knot(Point::new(10.0, 10.0))
            .end();
        let tight_controls = find_hobby_controls(&tight, Some(c1)).unwrap();

        let dist_loose = (loose_controls.post_control(0) - loose.z(0)).hypot();
        let dist_tight = (tight_controls.post_control(0) - tight.z(0)).hypot();
        assert!(
            dist_tight < dist_loose,
            "high tension should shorten handles: {dist_tight} vs {dist_loose}"
        );
    }

    #[test]
    fn test_repeated_solves_are_deterministic() {
        let (path, c1) = circle_cycle();
        let r1 = find_hobby_controls(&path, Some(c1)).unwrap();
        let r2 = find_hobby_controls(&path, None).unwrap();
        assert_eq!(
            as_string(&path, Some(&r1)),
            as_string(&path, Some(&r2))
        );
    }

    #[test]
    fn test_perturbation_continuity() {
        let (path, _) = diagonal_open();
        let (nudged, _) = nullpath()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0 + 1e-9, 2.0))
            .curve()
            .knot(Point::new(3.0, 1.0))
            .end();
        let a = find_hobby_controls(&path, None).unwrap();
        let b = find_hobby_controls(&nudged, None).unwrap();
        for i in 0..2 {
            let post_moved = (a.post_control(i) - b.post_control(i)).hypot();
            assert!(post_moved < 1e-6, "post control {i} jumped by {post_moved}");
            let pre_moved = (a.pre_control(i + 1) - b.pre_control(i + 1)).hypot();
            assert!(pre_moved < 1e-6, "pre control {} jumped by {pre_moved}", i + 1);
        }
    }

    #[test]
    fn test_solve_fills_container_in_place() {
        let (path, _) = diagonal_open();
        let mut prefilled = Controls::new();
        prefilled.set_post_control(10, Point::new(7.0, 7.0));
        let controls = find_hobby_controls(&path, Some(prefilled)).unwrap();
        // unrelated entries survive, solved entries are filled in
        assert_eq!(controls.post_control(10), Point::new(7.0, 7.0));
        assert!(!is_unknown_point(controls.post_control(0)));
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let (path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(Scalar::NAN, 0.0))
            .end();
        let err = find_hobby_controls(&path, None).unwrap_err();
        assert_eq!(err, SplineError::InvalidKnot(1));
    }

    #[test]
    #[should_panic(expected = "too few knots")]
    fn test_must_variant_panics() {
        let (path, controls) = nullpath().knot(Point::new(0.0, 0.0)).end();
        let _ = must_find_hobby_controls(&path, Some(controls));
    }

    #[test]
    fn test_velocity_straight_line() {
        // theta = phi = 0 is the straight-line case: rho = sigma = 1, and
        // the control points sit at thirds of the chord
        let (p2, p3) = control_offsets(0.0, 0.0, 1.0, 1.0, Vec2::new(3.0, 0.0));
        assert!((p2.x - 1.0).abs() < 1e-9 && p2.y.abs() < 1e-9);
        assert!((p3.x - 1.0).abs() < 1e-9 && p3.y.abs() < 1e-9);
    }

    #[test]
    fn test_alpha_vanishes_for_symmetric_join() {
        let (alpha, beta) = hobby_alpha_beta(0.5, 0.5);
        assert!(alpha.abs() < 1e-12);
        assert!(beta > 1.0);
    }
}
