//! Arithmetic with linear polynomials and an incremental solver for systems
//! of linear equations.
//!
//! Inspired by Donald E. Knuth's MetaFont, John Hobby's MetaPost, and by
//! John D. Ramsdell's `lineqpp` Lua project. MetaFont's declarative equation
//! style lets a program state `a + b = 6; b = 2 + 3a;` and have the system
//! derive `a = 1, b = 5` as soon as enough information is available.
//!
//! The two building blocks:
//!
//! - [`Polynomial`]: a sparse linear polynomial `c + a₁·x.1 + … + aₙ·x.n`,
//!   keyed by variable id with key 0 reserved for the constant term.
//! - [`LinEqSolver`]: a container for equations `0 = p`, ingested one at a
//!   time. Each new equation is normalized against the already-solved
//!   variables, pivoted onto its largest free coefficient, and propagated
//!   through all dependent variables; anything that collapses to a constant
//!   becomes a solved variable.
//!
//! Variable ids are plain integers; a [`VariableResolver`] supplied by the
//! client maps them to real-life names, receives solved-variable
//! notifications, and flags "capsules" (variables that fell out of lexical
//! scope and may be garbage-collected once only one equation mentions them).
//!
//! ```
//! use knotwork_eqs::{LinEqSolver, Polynomial};
//!
//! let mut leq = LinEqSolver::new();
//! // 0 = 6 - a - b  and  0 = 2 + 3a - b
//! leq.add_eq(Polynomial::with_terms(6.0, &[(1, -1.0), (2, -1.0)])).unwrap();
//! leq.add_eq(Polynomial::with_terms(2.0, &[(1, 3.0), (2, -1.0)])).unwrap();
//! let solved = leq.solved_values();
//! assert!((solved[&1] - 1.0).abs() < 1e-6);
//! assert!((solved[&2] - 5.0).abs() < 1e-6);
//! ```

pub mod error;
pub mod polyn;
pub mod solver;

pub use error::EqError;
pub use polyn::{Polynomial, EPSILON};
pub use solver::{LinEqSolver, VariableResolver};
