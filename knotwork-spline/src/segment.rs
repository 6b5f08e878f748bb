//! Splitting paths into independently solvable segments.
//!
//! A knot is "rough" when its parameters create a discontinuity: a non-neutral
//! curl on either side, or explicit directions on both sides that disagree.
//! Hobby interpolation must not smooth across such a knot, so the path is
//! broken there and every smooth stretch is solved on its own.
//!
//! A [`Segment`] is a windowed projection onto a subset of the parent path's
//! knots. It implements the same read contract as a whole path; external
//! indices are remapped into the parent's index range, and control point
//! writes land in the parent's container under the same remapping.

use log::debug;

use kurbo::{Point, Vec2};

use crate::error::SplineError;
use crate::math::equal;
use crate::path::{pt_string, HobbyPath, Path};
use crate::types::{is_unknown_dir, Scalar, EPSILON};

// ---------------------------------------------------------------------------
// Segment view
// ---------------------------------------------------------------------------

/// A window `[start, end]` onto a parent path.
///
/// The segment is itself cyclic only when the parent is cyclic and the
/// window spans the whole path; in that case knot reads fall through to the
/// parent's plain modulo addressing.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    path: &'a Path,
    start: usize,
    end: usize,
}

impl<'a> Segment<'a> {
    pub(crate) fn new(path: &'a Path, start: usize, end: usize) -> Self {
        Self { path, start, end }
    }

    /// First knot index within the parent path.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last knot index within the parent path.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    fn remap(&self, i: usize) -> usize {
        i % self.len() + self.start
    }
}

impl HobbyPath for Segment<'_> {
    fn is_cycle(&self) -> bool {
        self.path.is_cycle() && self.path.len() == self.len()
    }

    fn len(&self) -> usize {
        self.end - self.start + 1
    }

    fn z(&self, i: usize) -> Point {
        if self.is_cycle() {
            self.path.z(i)
        } else {
            self.path.z(self.remap(i))
        }
    }

    fn pre_dir(&self, i: usize) -> Vec2 {
        self.path.pre_dir(self.remap(i))
    }

    fn post_dir(&self, i: usize) -> Vec2 {
        self.path.post_dir(self.remap(i))
    }

    fn pre_curl(&self, i: usize) -> Scalar {
        self.path.pre_curl(self.remap(i))
    }

    fn post_curl(&self, i: usize) -> Scalar {
        self.path.post_curl(self.remap(i))
    }

    fn pre_tension(&self, i: usize) -> Scalar {
        self.path.pre_tension(self.remap(i))
    }

    fn post_tension(&self, i: usize) -> Scalar {
        self.path.post_tension(self.remap(i))
    }

    fn control_slot(&self, i: usize) -> usize {
        self.remap(i)
    }
}

// ---------------------------------------------------------------------------
// Segmenter
// ---------------------------------------------------------------------------

/// Is knot i a breakpoint for splitting the path into segments?
pub(crate) fn is_rough(path: &Path, i: usize) -> bool {
    #[allow(clippy::float_cmp)]
    let has_curl = path.pre_curl(i) != 1.0 || path.post_curl(i) != 1.0;
    let ld = path.pre_dir(i);
    let rd = path.post_dir(i);
    let has_two_dirs = !is_unknown_dir(ld) && !is_unknown_dir(rd) && !equal(ld, rd);
    has_curl || has_two_dirs
}

/// Split a path into segments, breaking it up at rough knots.
///
/// The returned segments cover the path exactly: every join appears in
/// exactly one segment, and every rough knot is a segment boundary.
pub(crate) fn split_segments(path: &Path) -> Vec<Segment<'_>> {
    let n = path.len();
    let mut segments = Vec::new();
    let mut segcnt = 0usize;
    let mut at = 0usize;
    for i in 1..n {
        if is_rough(path, i) {
            segments.push(make_segment(path, at, i));
            segcnt += 1;
            at = i;
        }
    }
    if path.is_cycle() {
        if segcnt == 0 {
            segments.push(make_segment(path, 0, n - 1));
        } else {
            // the final segment carries the wrap back to the first knot
            segments.push(make_segment(path, at, n));
        }
    } else if at != n - 1 {
        segments.push(make_segment(path, at, n - 1));
    }
    segments
}

fn make_segment(path: &Path, from: usize, to: usize) -> Segment<'_> {
    let seg = Segment::new(path, from, to);
    debug!(
        "breaking segment {} - {} of length {}, at {} and {}",
        from,
        to,
        seg.len(),
        pt_string(path.z(from), false),
        pt_string(path.z(to), false)
    );
    seg
}

/// Re-check a single segment right before solving it.
pub(crate) fn validate_segment(seg: &Segment<'_>) -> Result<(), SplineError> {
    if seg.len() < 2 {
        return Err(SplineError::TooFewKnots {
            needed: 2,
            got: seg.len(),
        });
    }
    let limit = if seg.is_cycle() {
        seg.len()
    } else {
        seg.len() - 1
    };
    for i in 0..limit {
        if seg.d(i) <= EPSILON {
            return Err(SplineError::DegenerateSegment(i, (i + 1) % seg.len()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::nullpath;

    #[test]
    fn test_segment_projection() {
        let (path, _) = nullpath()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 2.0))
            .curve()
            .knot(Point::new(3.0, 1.0))
            .end();
        let seg = Segment::new(&path, 0, 1);
        assert_eq!(seg.len(), 2);
        assert!(!seg.is_cycle());
        assert_eq!(seg.z(0), path.z(0));
        assert_eq!(seg.z(1), path.z(1));

        let tail = Segment::new(&path, 1, 2);
        assert_eq!(tail.z(0), path.z(1));
        assert_eq!(tail.control_slot(1), 2);
    }

    #[test]
    fn test_smooth_cycle_stays_whole() {
        let (path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(0.0, 3.0))
            .curve()
            .knot(Point::new(5.0, 3.0))
            .line()
            .dir_knot(Point::new(3.0, -1.0), Vec2::new(0.0, -1.0))
            .curve()
            .cycle();
        let segs = split_segments(&path);
        assert_eq!(segs.len(), 1);
        assert!(segs[0].is_cycle());
        assert_eq!((segs[0].start(), segs[0].end()), (0, 3));
    }

    #[test]
    fn test_rough_knot_splits_open_path() {
        let (mut path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .end();
        path.set_pre_curl(1, 2.0);
        let segs = split_segments(&path);
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start(), segs[0].end()), (0, 1));
        assert_eq!((segs[1].start(), segs[1].end()), (1, 2));
    }

    #[test]
    fn test_rough_knot_splits_cycle_with_wrap() {
        let (mut path, _) = nullpath()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 2.0))
            .curve()
            .knot(Point::new(3.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .curve()
            .cycle();
        path.set_post_curl(2, 3.0);
        let segs = split_segments(&path);
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start(), segs[0].end()), (0, 2));
        assert_eq!((segs[1].start(), segs[1].end()), (2, 4));
        // the wrap segment reaches back to the first knot
        assert!(!segs[1].is_cycle());
        assert_eq!(segs[1].z(2), path.z(0));
    }

    #[test]
    fn test_disagreeing_dirs_are_rough() {
        let (mut path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 1.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .end();
        path.set_pre_dir(1, Vec2::new(0.0, 1.0));
        path.set_post_dir(1, Vec2::new(1.0, 0.0));
        assert!(is_rough(&path, 1));
        assert_eq!(split_segments(&path).len(), 2);
    }

    #[test]
    fn test_agreeing_dirs_stay_smooth() {
        let (path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .dir_knot(Point::new(1.0, 1.0), Vec2::new(1.0, 0.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .end();
        assert!(!is_rough(&path, 1));
        assert_eq!(split_segments(&path).len(), 1);
    }

    #[test]
    fn test_segments_cover_open_path() {
        let (mut path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 2.0))
            .curve()
            .knot(Point::new(2.0, 0.0))
            .curve()
            .knot(Point::new(3.0, 2.0))
            .curve()
            .knot(Point::new(4.0, 0.0))
            .end();
        path.set_pre_curl(1, 2.0);
        path.set_post_curl(3, 2.0);
        let segs = split_segments(&path);
        // consecutive segments share their boundary knots and cover 0..N-1
        assert_eq!(segs[0].start(), 0);
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        assert_eq!(segs[segs.len() - 1].end(), path.len() - 1);
    }

    #[test]
    fn test_validate_segment_degenerate() {
        let (path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 0.0))
            .end();
        let seg = Segment::new(&path, 1, 2);
        assert_eq!(
            validate_segment(&seg),
            Err(SplineError::DegenerateSegment(0, 1))
        );
        let head = Segment::new(&path, 0, 1);
        assert!(validate_segment(&head).is_ok());
    }

    #[test]
    fn test_validate_segment_too_short() {
        let (path, _) = nullpath()
            .knot(Point::new(0.0, 0.0))
            .curve()
            .knot(Point::new(1.0, 0.0))
            .end();
        let seg = Segment::new(&path, 1, 1);
        assert_eq!(
            validate_segment(&seg),
            Err(SplineError::TooFewKnots { needed: 2, got: 1 })
        );
    }
}
