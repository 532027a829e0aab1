//! The Davis–Putnam procedure: decide satisfiability by eliminating variables
//! through resolution.
//!
//! Unlike DPLL there is no branching and nothing to backtrack to. Each round
//! rewrites the formula into the next one:
//! 1.  unit propagation (a conflict means UNSAT),
//! 2.  pure-literal elimination,
//! 3.  elimination of one variable `v`: every clause mentioning `v` is
//!     replaced by the non-tautological resolvents on `v` of its positive and
//!     negative occurrences.
//!
//! An empty formula is SAT; an empty clause is UNSAT.
//!
//! The clauses removed for each eliminated variable are kept so that, on SAT,
//! a model can be rebuilt by walking the eliminations backwards.

use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::cancel::CancelToken;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SolverError};
use crate::sat::literal::{Literal, Variable};
use crate::sat::observer::{Event, NoopObserver, SolverObserver, TracingObserver};
use crate::sat::preprocessing::PureLiteralElimination;
use crate::sat::propagation::unit_propagate;
use crate::sat::solver::{Limits, SolutionStats, Solver};
use rustc_hash::FxHashSet;
use std::fmt;

/// A variable and the clauses that mentioned it when it was eliminated.
#[derive(Debug, Clone)]
struct Elimination {
    variable: Variable,
    clauses: Vec<Clause>,
}

pub struct DavisPutnam {
    pub cnf: Cnf,
    limits: Limits,
    cancel: CancelToken,
    observer: Box<dyn SolverObserver>,
    stats: SolutionStats,
    solutions: Option<Solutions>,
}

impl DavisPutnam {
    /// # Errors
    ///
    /// * `SolverError::Cancelled` if the token fires between rounds.
    /// * `SolverError::ResourceExhausted` if the clause set outgrows
    ///   `Limits::max_clauses`.
    pub fn solve_observed(&mut self, observer: &mut dyn SolverObserver) -> Result<bool> {
        self.stats = SolutionStats::default();
        self.solutions = None;

        tracing::debug!(
            clauses = self.cnf.len(),
            variables = self.cnf.num_vars,
            "dp: starting elimination"
        );

        if self.cnf.has_empty_clause() {
            return Ok(false);
        }

        let mut clauses = self.cnf.clauses.clone();
        let mut assignment = Assignment::new(self.cnf.num_vars);
        let mut eliminations = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                return Err(SolverError::Cancelled);
            }
            self.stats.rounds += 1;

            match unit_propagate(&mut clauses, &mut assignment, observer) {
                Ok(n) => self.stats.propagations += n,
                Err(conflict) => {
                    self.stats.conflicts += 1;
                    tracing::debug!(literal = %conflict.literal, "dp: conflict during propagation");
                    return Ok(false);
                }
            }
            if clauses.is_empty() {
                return Ok(self.satisfied(assignment, &eliminations));
            }

            self.stats.pure_literals +=
                PureLiteralElimination::apply(&mut clauses, &mut assignment, observer);
            if clauses.is_empty() {
                return Ok(self.satisfied(assignment, &eliminations));
            }

            let Some(variable) = clauses.iter().flat_map(Clause::variables).min() else {
                return Ok(self.satisfied(assignment, &eliminations));
            };

            let elimination = self.eliminate(variable, &mut clauses, observer);
            eliminations.push(elimination);

            observer.notify(&Event::RoundCompleted {
                round: self.stats.rounds,
                clauses: clauses.len(),
            });

            if clauses.iter().any(Clause::is_empty) {
                tracing::debug!(variable, "dp: empty clause after resolution");
                return Ok(false);
            }
            if let Some(limit) = self.limits.max_clauses {
                if clauses.len() > limit {
                    return Err(SolverError::ResourceExhausted {
                        clauses: clauses.len(),
                        limit,
                    });
                }
            }
        }
    }

    /// Replaces every clause mentioning `variable` with the resolvents on it.
    /// Clauses holding both polarities are tautologies and are dropped
    /// without being resolved.
    fn eliminate(
        &mut self,
        variable: Variable,
        clauses: &mut Vec<Clause>,
        observer: &mut dyn SolverObserver,
    ) -> Elimination {
        let pivot = Literal::new(variable, true);

        let (mentioning, rest): (Vec<Clause>, Vec<Clause>) = std::mem::take(clauses)
            .into_iter()
            .partition(|clause| clause.mentions(variable));
        *clauses = rest;

        let (positive, negative): (Vec<&Clause>, Vec<&Clause>) = mentioning
            .iter()
            .filter(|clause| !(clause.contains(pivot) && clause.contains(-pivot)))
            .partition(|clause| clause.contains(pivot));

        let mut seen = FxHashSet::default();
        let mut added = 0;
        for pos in &positive {
            for neg in &negative {
                let resolvent = pos.resolve(neg, pivot);
                if resolvent.is_tautology() || !seen.insert(resolvent.clone()) {
                    continue;
                }
                observer.notify(&Event::ResolventDerived(&resolvent));
                clauses.push(resolvent);
                added += 1;
            }
        }

        self.stats.eliminated_variables += 1;
        self.stats.resolvents += added;
        observer.notify(&Event::VariableEliminated {
            variable,
            removed: mentioning.len(),
            added,
        });

        let kept = positive.len() + negative.len();
        let mut saved = Vec::with_capacity(kept);
        saved.extend(positive.into_iter().cloned());
        saved.extend(negative.into_iter().cloned());

        Elimination {
            variable,
            clauses: saved,
        }
    }

    fn satisfied(&mut self, mut assignment: Assignment, eliminations: &[Elimination]) -> bool {
        tracing::debug!(
            eliminated = self.stats.eliminated_variables,
            "dp: satisfiable"
        );

        let eliminated: FxHashSet<Variable> = eliminations.iter().map(|e| e.variable).collect();
        let num_vars = Variable::try_from(self.cnf.num_vars).unwrap_or(Variable::MAX);

        // Every variable that is neither assigned nor eliminated is free; fix
        // it to false so the backward pass sees a complete assignment.
        for var in 1..=num_vars {
            if assignment[var].is_unassigned() && !eliminated.contains(&var) {
                assignment.assign(Literal::new(var, false));
            }
        }

        for elimination in eliminations.iter().rev() {
            let lit = Self::reconstruct(elimination, &assignment);
            assignment.assign(lit);
        }

        self.solutions = Some(assignment.get_solutions());
        true
    }

    /// The value of an eliminated variable: false unless some clause with the
    /// positive literal has no other true literal.
    fn reconstruct(elimination: &Elimination, assignment: &Assignment) -> Literal {
        let var = elimination.variable;
        let pos = Literal::new(var, true);

        let needs_true = elimination
            .clauses
            .iter()
            .filter(|clause| clause.contains(pos))
            .any(|clause| {
                !clause
                    .iter()
                    .any(|&lit| lit.variable() != var && assignment.is_true(lit))
            });

        if needs_true { pos } else { -pos }
    }
}

impl Solver for DavisPutnam {
    fn new(cnf: Cnf) -> Self {
        Self {
            cnf,
            limits: Limits::default(),
            cancel: CancelToken::default(),
            observer: Box::new(TracingObserver),
            stats: SolutionStats::default(),
            solutions: None,
        }
    }

    fn solve(&mut self) -> Result<bool> {
        let mut observer = std::mem::replace(&mut self.observer, Box::new(NoopObserver));
        let verdict = self.solve_observed(observer.as_mut());
        self.observer = observer;
        verdict
    }

    /// A complete model rebuilt from the eliminations.
    fn solutions(&self) -> Option<Solutions> {
        self.solutions.clone()
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }

    fn set_observer(&mut self, observer: Box<dyn SolverObserver>) {
        self.observer = observer;
    }

    fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }
}

impl fmt::Debug for DavisPutnam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DavisPutnam")
            .field("cnf", &self.cnf)
            .field("limits", &self.limits)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
