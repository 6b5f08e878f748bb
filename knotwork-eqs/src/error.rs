use thiserror::Error;

/// Errors reported by polynomial arithmetic and equation ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EqError {
    /// An empty list of equations was supplied to a batch ingestion.
    #[error("empty list of equations")]
    EmptyEquationList,
    /// An equation reduced to `0 = c` with `c` not zero, contradicting
    /// previously accepted equations.
    #[error("inconsistent equation (off by {residue})")]
    InconsistentEquation { residue: f64 },
    /// Product of two non-constant polynomials (not representable in a
    /// linear system).
    #[error("cannot multiply two non-constant polynomials")]
    NonConstantProduct,
    /// Division by a non-constant or zero polynomial.
    #[error("illegal divisor: divisor must be a non-zero constant")]
    IllegalDivisor,
}
