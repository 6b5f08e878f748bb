//! Incremental solver for systems of linear equations.
//!
//! Equations arrive one at a time as polynomials `p` meaning `0 = p`. The
//! solver keeps two maps: *dependents* (`x.i` → right-hand-side polynomial
//! over free variables) and *solved* (`x.i` → constant). Every new equation
//! is first normalized against the solved set, then pivoted onto its largest
//! free coefficient and propagated through all dependents; dependents that
//! collapse to constants migrate into the solved set.
//!
//! "Capsule" is a MetaFont term for a variable that has fallen out of
//! lexical scope but may still be algebraically relevant — the classic case
//! is `whatever` in `z0 = whatever[z1,z2]`. After each complete ingestion
//! batch, capsules referenced by only a single equation are retracted
//! together with the equations that mention them.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::{debug, error, info};

use crate::error::EqError;
use crate::polyn::{is0, is1, round_eps, Polynomial};

// ---------------------------------------------------------------------------
// Variable resolver
// ---------------------------------------------------------------------------

/// Links solver variable ids to real-life variable names.
///
/// Terms are keyed by position i in the sparse polynomial map; in equation
/// solving, the same key is interpreted as an internal variable id `x.i`.
/// Example: variable `n[3].a` with id 4711 is `x.4711` internally; the
/// resolver maps the id back to the name, receives a message whenever a
/// variable becomes known, and decides which ids are capsules.
pub trait VariableResolver {
    /// Real-life name of `x.i`.
    fn variable_name(&self, i: usize) -> String;
    /// Message: `x.i` has been solved.
    fn set_variable_solved(&mut self, i: usize, value: f64);
    /// Has `x.i` gone out of scope?
    fn is_capsule(&self, i: usize) -> bool;
}

/// Map from variable id to right-hand-side polynomial.
pub type EquationMap = BTreeMap<usize, Polynomial>;

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// A container for linear equations, solved incrementally as far as the
/// accumulated information allows.
#[derive(Default)]
pub struct LinEqSolver {
    dependents: EquationMap,
    solved: EquationMap,
    resolver: Option<Box<dyn VariableResolver>>,
    show_dependencies: bool,
}

impl LinEqSolver {
    /// A new, empty system of linear equations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a variable resolver for names, notifications, and capsules.
    pub fn set_variable_resolver(&mut self, resolver: Box<dyn VariableResolver>) {
        self.resolver = Some(resolver);
    }

    /// Continuously log the dependency table after each ingested equation.
    pub fn set_show_dependencies(&mut self, on: bool) {
        self.show_dependencies = on;
    }

    /// All currently solved variables as id → value.
    #[must_use]
    pub fn solved_values(&self) -> BTreeMap<usize, f64> {
        self.solved
            .iter()
            .map(|(&i, p)| (i, p.constant_value()))
            .collect()
    }

    /// Add a new equation `0 = p` and solve the (possibly still incomplete)
    /// system as far as possible.
    ///
    /// On an inconsistency the solver state is left unchanged.
    pub fn add_eq(&mut self, p: Polynomial) -> Result<(), EqError> {
        let result = self.add_eq_inner(p, false);
        if self.show_dependencies {
            debug!("{}", self.dump_string());
        }
        result
    }

    /// Add a batch of equations. Capsule harvesting runs only after the
    /// last one, so intermediate states may reference capsules freely.
    pub fn add_eqs(&mut self, list: Vec<Polynomial>) -> Result<(), EqError> {
        let l = list.len();
        if l == 0 {
            error!("given empty list of equations");
            return Err(EqError::EmptyEquationList);
        }
        for (idx, p) in list.into_iter().enumerate() {
            debug!("adding equation {}/{}: 0 = {}", idx + 1, l, self.polyn_string(&p));
            self.add_eq_inner(p, idx + 1 < l)?;
        }
        if self.show_dependencies {
            debug!("{}", self.dump_string());
        }
        Ok(())
    }

    fn add_eq_inner(&mut self, p: Polynomial, cont: bool) -> Result<(), EqError> {
        let p = p.zap();
        info!("new equation: 0 = {}", self.polyn_string(&p));
        // fold the already-known values into the new equation
        let p = self.substitute_solved(None, p, &self.solved);
        if let Some(residue) = p.as_constant() {
            if !is0(residue) {
                return Err(EqError::InconsistentEquation { residue });
            }
            // 0 = 0 after substitution: redundant, drop it
        } else {
            let (i, _) = p.max_coeff(Some(&self.dependents));
            let p = self.activate_towards(i, p);
            let mut new_deps = self.update_dependents(i, &p)?;
            // split solved variables off into the solved set
            let mut new_solved = EquationMap::new();
            let constants: Vec<usize> = new_deps
                .iter()
                .filter(|(_, q)| q.as_constant().is_some())
                .map(|(&k, _)| k)
                .collect();
            for k in constants {
                if let Some(rhs) = new_deps.remove(&k) {
                    new_solved.insert(k, rounded_constant(rhs));
                }
            }
            // fold the fresh constants into the remaining dependents
            let keys: Vec<usize> = new_deps.keys().copied().collect();
            for k in keys {
                if let Some(q) = new_deps.remove(&k) {
                    let q = self.substitute_solved(Some(k), q, &new_solved);
                    if q.as_constant().is_some() {
                        new_solved.insert(k, rounded_constant(q));
                    } else {
                        new_deps.insert(k, q);
                    }
                }
            }
            for (k, rhs) in new_solved {
                self.set_solved(k, rhs);
            }
            self.dependents = new_deps;
        }
        if !cont {
            self.harvest_capsules();
        }
        Ok(())
    }

    /// First pass of ingestion: with the activated equation `x.i = p`, walk
    /// all dependents `x.j = q` and substitute `p` for `x.i` in every
    /// right-hand side. Returns the new dependent set.
    fn update_dependents(&self, pivot: usize, p: &Polynomial) -> Result<EquationMap, EqError> {
        let mut deps = EquationMap::new();
        self.update_dependency(pivot, p.clone(), &mut deps);
        debug!("---------- subst dep --------------");
        for (&j0, q0) in &self.dependents {
            let mut i = pivot;
            let mut j = j0;
            let mut q = q0.clone();
            let Some(current) = deps.get(&i) else {
                unreachable!("dependency for the pivot must exist");
            };
            let mut p = current.clone();
            debug!(
                "(1) p({}) in {} = {}",
                self.var_string(i),
                self.var_string(j),
                self.polyn_string(&q)
            );
            if j == i {
                // two equations with identical left-hand side: re-activate
                // the stored one onto a fresh free variable
                let (k, _) = q.max_coeff(Some(&deps));
                let mut lhs = Polynomial::constant(0.0);
                lhs.set_term(j, -1.0);
                q = q.add(&lhs);
                q = self.activate_towards(k, q);
                j = k;
            }
            self.update_dependency(j, q.clone(), &mut deps);
            if !q.contains_term(i) && p.contains_term(j) {
                std::mem::swap(&mut i, &mut j);
                std::mem::swap(&mut p, &mut q);
            }
            debug!(
                "(2) p({}) in {} = {}",
                self.var_string(i),
                self.var_string(j),
                self.polyn_string(&q)
            );
            if q.contains_term(i) {
                let (lhs, result) = subst(i, &p, j, q);
                match lhs {
                    Some(jj) => {
                        debug!("result: {} = {}", self.var_string(jj), self.polyn_string(&result));
                        self.update_dependency(jj, result, &mut deps);
                    }
                    None => {
                        // the left-hand side was eliminated; what remains is
                        // either a residue or a brand-new equation
                        if let Some(residue) = result.as_constant() {
                            if !is0(residue) {
                                return Err(EqError::InconsistentEquation { residue });
                            }
                        } else {
                            let (k, _) = result.max_coeff(Some(&deps));
                            let activated = self.activate_towards(k, result);
                            self.update_dependency(k, activated, &mut deps);
                        }
                    }
                }
            }
        }
        debug!("-----------------------------------");
        Ok(deps)
    }

    /// Insert or replace `x.i = p` in a set of equations, preferring the
    /// shorter right-hand side on collisions.
    fn update_dependency(&self, i: usize, p: Polynomial, m: &mut EquationMap) {
        if let Some(q) = m.get(&i) {
            if p.term_count() < q.term_count() {
                info!("## {} = {}", self.var_string(i), self.polyn_string(&p));
                m.insert(i, p);
            }
        } else {
            m.insert(i, p);
        }
    }

    /// Substitute every known constant of `solved` into `p`. The optional
    /// `lhs` is only used for trace output.
    fn substitute_solved(
        &self,
        lhs: Option<usize>,
        p: Polynomial,
        solved: &EquationMap,
    ) -> Polynomial {
        let mut p = p;
        for (&i, rhs) in solved {
            let c = rhs.constant_value();
            let coeff = p.coeff(i);
            if is0(coeff) {
                continue;
            }
            let pc = p.constant_value();
            p.set_term(0, pc + coeff * c);
            p.remove_term(i);
            debug!("{} = {}  =>  RHS = {}", self.var_string(i), c, self.polyn_string(&p));
            match lhs {
                Some(j) => info!("## {} = {}", self.var_string(j), self.polyn_string(&p)),
                None => info!("# 0 = {}", self.polyn_string(&p)),
            }
        }
        p
    }

    /// Transform `0 = p(… aᵢ·x.i …)` into the normalized dependency
    /// `x.i = -1/aᵢ · p(…)`.
    fn activate_towards(&self, i: usize, p: Polynomial) -> Polynomial {
        let coeff = p.coeff(i);
        debug_assert!(!is0(coeff), "activation towards a vanishing coefficient");
        let mut p = p;
        p.remove_term(i);
        let p = p.scaled(-1.0 / coeff).zap();
        info!("## {} = {}", self.var_string(i), self.polyn_string(&p));
        p
    }

    /// Mark `x.i` as solved and notify the resolver.
    fn set_solved(&mut self, i: usize, p: Polynomial) {
        let c = p.constant_value();
        info!("#### {} = {}", self.var_string(i), c);
        self.solved.insert(i, p);
        if let Some(resolver) = self.resolver.as_mut() {
            resolver.set_variable_solved(i, c);
        }
    }

    /// A readable name for an internal variable.
    #[must_use]
    pub fn var_string(&self, i: usize) -> String {
        match &self.resolver {
            Some(r) => r.variable_name(i),
            None => format!("x.{i}"),
        }
    }

    /// A readable rendering of a polynomial, using the resolver if present.
    #[must_use]
    pub fn polyn_string(&self, p: &Polynomial) -> String {
        p.trace_string(self.resolver.as_deref())
    }

    // -----------------------------------------------------------------------
    // Capsules
    // -----------------------------------------------------------------------

    /// Remove all equations that depend on a capsule, but only if the
    /// capsule is a loner. A capsule occurring in at least two equations is
    /// still relevant for solving the system and stays.
    fn harvest_capsules(&mut self) {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        {
            let Some(resolver) = self.resolver.as_deref() else {
                return;
            };
            for (&w, pw) in &self.dependents {
                if resolver.is_capsule(w) {
                    *counts.entry(w).or_insert(0) += 1;
                }
                for i in pw.exponents() {
                    if i > 0 && resolver.is_capsule(i) {
                        *counts.entry(i).or_insert(0) += 1;
                    }
                }
            }
            for &j in self.solved.keys() {
                if resolver.is_capsule(j) {
                    *counts.entry(j).or_insert(0) += 1;
                }
            }
        }
        for (pos, count) in counts {
            if count == 1 {
                debug!("capsule {} removed", self.var_string(pos));
                self.retract_variable(pos);
            }
        }
    }

    /// Drop `x.i` from the system together with every dependent equation
    /// whose right-hand side mentions it.
    fn retract_variable(&mut self, i: usize) {
        if self.solved.remove(&i).is_some() {
            debug!("unsolve {}", self.var_string(i));
        }
        self.dependents.remove(&i);
        let stale: Vec<usize> = self
            .dependents
            .iter()
            .filter(|(_, p)| p.contains_term(i))
            .map(|(&j, _)| j)
            .collect();
        for j in stale {
            self.dependents.remove(&j);
        }
    }

    // -----------------------------------------------------------------------
    // Debugging
    // -----------------------------------------------------------------------

    /// Dump all known equations, dependents first, in ascending id order.
    #[must_use]
    pub fn dump_string(&self) -> String {
        let mut s = String::new();
        s.push_str("----------------------------------------------------------------------\n");
        s.push_str("Dependents:                                                        LEQ\n");
        for (&k, p) in &self.dependents {
            let _ = writeln!(s, "\t{} = {}", self.var_string(k), self.polyn_string(p));
        }
        s.push_str("Solved:\n");
        for (&k, p) in &self.solved {
            let _ = writeln!(s, "\t{} = {}", self.var_string(k), p.constant_value());
        }
        s.push_str("----------------------------------------------------------------------\n");
        s
    }
}

/// Round a constant right-hand side onto the ε grid.
fn rounded_constant(mut p: Polynomial) -> Polynomial {
    let c = round_eps(p.constant_value());
    p.set_term(0, c);
    p
}

/// Substitute the dependency `x.i = p` into `x.j = q`.
///
/// `p` may itself mention `x.j`, in which case the resulting equation is
/// resolved for `x.j` again: a unit coefficient eliminates `x.j` entirely
/// (the left-hand side becomes `None` and the caller must re-examine the
/// residue), any other coefficient rescales the right-hand side.
fn subst(i: usize, p: &Polynomial, j: usize, q: Polynomial) -> (Option<usize>, Polynomial) {
    let ai = q.coeff(i);
    if is0(ai) {
        return (Some(j), q);
    }
    let mut q = q;
    q.remove_term(i);
    let mut q = q.add(&p.scaled(ai)).zap();
    let aj = q.coeff(j);
    if is0(aj) {
        (Some(j), q)
    } else if is1(aj) {
        q.remove_term(j);
        (None, q)
    } else {
        let scale = -1.0 / (aj - 1.0);
        q.remove_term(j);
        (Some(j), q.scaled(scale).zap())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
