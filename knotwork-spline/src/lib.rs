//! Hobby spline interpolation for MetaFont/MetaPost-like paths.
//!
//! Spline interpolation by Hobby's algorithm produces aesthetically pleasing
//! curves superior to "normal" spline interpolation as used in many graphics
//! programs. The primary sources are:
//!
//! - John D. Hobby, "Smooth, Easy to Compute Interpolating Splines",
//!   *Discrete and Computational Geometry* 1 (1986), pp. 123-140.
//! - D.E. Knuth, *Computers & Typesetting*, Vol. B & D.
//!
//! Clients build a "skeleton" path without any control point information,
//! optionally attaching direction, curl, and tension parameters to knots and
//! joins. In the MetaPost DSL one would write:
//!
//! ```text
//! (0,0)..(2,3)..tension 1.4..(5,3)..(3,-1){left}..cycle
//! ```
//!
//! Here the same path is built with a typed-state builder:
//!
//! ```
//! use knotwork_spline::{find_hobby_controls, nullpath, Point, Vec2};
//!
//! let (path, controls) = nullpath()
//!     .knot(Point::new(0.0, 0.0))
//!     .curve()
//!     .knot(Point::new(2.0, 3.0))
//!     .tension_curve(1.4, 1.4)
//!     .knot(Point::new(5.0, 3.0))
//!     .curve()
//!     .dir_knot(Point::new(3.0, -1.0), Vec2::new(-1.0, 0.0))
//!     .curve()
//!     .cycle();
//! let controls = find_hobby_controls(&path, Some(controls)).unwrap();
//! ```
//!
//! The returned [`Controls`] container holds one pair of cubic Bezier control
//! points per join, so that the curve passes smoothly through every knot.

pub mod builder;
pub mod error;
pub mod hobby;
pub mod math;
pub mod path;
pub mod segment;
pub mod types;

pub use kurbo::{Point, Vec2};

pub use builder::{nullpath, JoinAdder, KnotAdder};
pub use error::SplineError;
pub use hobby::{find_hobby_controls, must_find_hobby_controls, HobbySolver, Verbosity};
pub use path::{as_string, Controls, HobbyPath, Path};
