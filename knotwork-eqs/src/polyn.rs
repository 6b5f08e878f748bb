//! Linear polynomials over a sparse term map.
//!
//! A polynomial is `c + a.1 x.1 + a.2 x.2 + … + a.n x.n`. Only the
//! coefficients are stored, keyed by term position in a sorted map; position
//! 0 holds the constant term `c`. In the equation solver the key `i` is
//! read as an internal variable id `x.i`.
//!
//! All operations traverse terms in ascending key order, which makes every
//! derived string and every solver decision deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use crate::error::EqError;
use crate::solver::VariableResolver;

/// Numbers below ε mean zero.
pub const EPSILON: f64 = 1e-7;

/// Is n zero within ε?
pub(crate) fn is0(n: f64) -> bool {
    n.abs() <= EPSILON
}

/// Is n one within ε?
pub(crate) fn is1(n: f64) -> bool {
    (1.0 - n).abs() <= EPSILON
}

/// Round to the ε grid.
pub(crate) fn round_eps(n: f64) -> f64 {
    (n / EPSILON).round() * EPSILON
}

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// A linear polynomial with sparse coefficient storage.
///
/// Operations return new polynomials; the term map itself stays private.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<usize, f64>,
}

impl Polynomial {
    /// A polynomial consisting of just a constant term.
    #[must_use]
    pub fn constant(c: f64) -> Self {
        let mut p = Self::default();
        p.terms.insert(0, c);
        p.zap()
    }

    /// Construct `c + Σ aᵢ·x.i` from a list of (position, coefficient)
    /// terms.
    ///
    /// # Panics
    ///
    /// Panics if a term position is 0 (reserved for the constant).
    #[must_use]
    pub fn with_terms(c: f64, terms: &[(usize, f64)]) -> Self {
        let mut p = Self::constant(c);
        for &(i, a) in terms {
            assert!(i >= 1, "term position must be at least 1");
            p.set_term(i, a);
        }
        p
    }

    /// Set the coefficient of term i. Position 0 sets the constant.
    pub fn set_term(&mut self, i: usize, coeff: f64) {
        self.terms.insert(i, coeff);
    }

    pub(crate) fn remove_term(&mut self, i: usize) {
        self.terms.remove(&i);
    }

    /// Coefficient of term i, 0.0 when absent.
    #[must_use]
    pub fn coeff(&self, i: usize) -> f64 {
        self.terms.get(&i).copied().unwrap_or(0.0)
    }

    /// The constant term.
    #[must_use]
    pub fn constant_value(&self) -> f64 {
        self.coeff(0)
    }

    /// Number of stored terms, the constant slot included.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// All stored term positions, ascending.
    #[must_use]
    pub fn exponents(&self) -> Vec<usize> {
        self.terms.keys().copied().collect()
    }

    /// Does x.i occur in this polynomial with a non-zero coefficient?
    pub(crate) fn contains_term(&self, i: usize) -> bool {
        !is0(self.coeff(i))
    }

    /// Is this a correctly initialized polynomial?
    ///
    /// A default-constructed value has no terms at all, not even the
    /// constant slot; every constructor and every zap establishes it.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.terms.is_empty()
    }

    /// The constant value if this polynomial is just `{ c }`.
    #[must_use]
    pub fn as_constant(&self) -> Option<f64> {
        if self.terms.len() == 1 && self.terms.contains_key(&0) {
            Some(self.constant_value())
        } else {
            None
        }
    }

    /// The variable position if this polynomial is a bare `1·x.i`.
    #[must_use]
    pub fn as_variable(&self) -> Option<usize> {
        if self.terms.len() == 2 && is0(self.constant_value()) {
            let pos = self.terms.keys().copied().find(|&k| k != 0)?;
            if is1(self.coeff(pos)) {
                return Some(pos);
            }
        }
        None
    }

    /// Eliminate all terms with a near-zero coefficient, re-establishing
    /// the constant slot. Idempotent.
    #[must_use]
    pub fn zap(mut self) -> Self {
        self.terms.retain(|_, c| !is0(*c));
        self.terms.entry(0).or_insert(0.0);
        self
    }

    /// Element-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        self.add_or_sub(other, true)
    }

    /// Element-wise difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add_or_sub(other, false)
    }

    fn add_or_sub(&self, other: &Self, add: bool) -> Self {
        let mut result = self.clone();
        for (&pos, &scale2) in &other.terms {
            if is0(scale2) {
                continue;
            }
            let scale1 = result.coeff(pos);
            result.set_term(pos, if add { scale1 + scale2 } else { scale1 - scale2 });
        }
        result
    }

    /// Product. One of the operands must be constant.
    pub fn mul(&self, other: &Self) -> Result<Self, EqError> {
        if let Some(c) = other.as_constant() {
            Ok(self.scaled(c))
        } else if let Some(c) = self.as_constant() {
            Ok(other.scaled(c))
        } else {
            Err(EqError::NonConstantProduct)
        }
    }

    /// Quotient. The divisor must be a non-zero constant.
    pub fn div(&self, other: &Self) -> Result<Self, EqError> {
        match other.as_constant() {
            Some(c) if !is0(c) => Ok(self.scaled(1.0 / c)),
            _ => Err(EqError::IllegalDivisor),
        }
    }

    /// Scale every coefficient by a constant, zapping the result.
    pub(crate) fn scaled(&self, c: f64) -> Self {
        let mut result = self.clone();
        for v in result.terms.values_mut() {
            *v *= c;
        }
        result.zap()
    }

    /// Substitute x.i in `self` by `replacement`, scaled by the current
    /// coefficient of x.i. No-op when x.i is absent.
    ///
    /// # Panics
    ///
    /// Panics when `replacement` itself contains x.i (a cyclic
    /// substitution).
    #[must_use]
    pub(crate) fn substitute(mut self, i: usize, replacement: &Self) -> Self {
        assert!(
            is0(replacement.coeff(i)),
            "cyclic substitution of term {i}"
        );
        let scale_i = self.coeff(i);
        if !is0(scale_i) {
            self.remove_term(i);
            self = self.add(&replacement.scaled(scale_i)).zap();
        }
        self
    }

    /// Position and coefficient of the free term with the largest absolute
    /// coefficient.
    ///
    /// Terms whose position appears in `dependents` are skipped; when no
    /// free term exists the search is repeated without the filter. Ties
    /// resolve to the smallest position (ascending scan).
    ///
    /// # Panics
    ///
    /// Panics on a purely constant polynomial — the caller must never ask
    /// for a pivot in an equation `0 = c`.
    #[must_use]
    pub fn max_coeff(&self, dependents: Option<&BTreeMap<usize, Polynomial>>) -> (usize, f64) {
        let mut maxp = 0usize;
        let mut maxc = 0.0f64;
        let mut coeff = 0.0f64;
        for (&i, &c) in &self.terms {
            if i == 0 {
                continue;
            }
            if let Some(deps) = dependents {
                if deps.contains_key(&i) {
                    continue;
                }
            }
            if c.abs() > maxc {
                maxc = c.abs();
                maxp = i;
                coeff = c;
            }
        }
        if maxp == 0 && dependents.is_some() {
            return self.max_coeff(None);
        }
        assert!(maxp != 0, "no pivot in constant equation 0 = c");
        (maxp, coeff)
    }

    /// Render the polynomial, resolving variable names when a resolver is
    /// given. Terms appear in ascending position order.
    #[must_use]
    pub fn trace_string(&self, resolver: Option<&dyn VariableResolver>) -> String {
        let mut buf = String::new();
        let mut indent = false;
        for (&pos, &val) in &self.terms {
            if pos == 0 {
                match resolver {
                    None => {
                        let _ = write!(buf, "{{ {} }} ", round_eps(val));
                    }
                    Some(_) => {
                        if !is0(val) {
                            let _ = write!(buf, "{}", round_eps(val));
                            indent = true;
                        }
                    }
                }
            } else {
                match resolver {
                    None => {
                        let _ = write!(buf, "{{ {} x.{} }} ", round_eps(val), pos);
                    }
                    Some(r) => {
                        if indent {
                            if val < 0.0 {
                                buf.push_str(" - ");
                            } else {
                                buf.push_str(" + ");
                            }
                        } else {
                            indent = true;
                            if val < 0.0 {
                                buf.push('-');
                            }
                        }
                        if !is0(val.abs() - 1.0) {
                            let _ = write!(buf, "{}", val.abs());
                        }
                        buf.push_str(&r.variable_name(pos));
                    }
                }
            }
        }
        buf
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trace_string(None))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
