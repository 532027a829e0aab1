//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! This module provides the `Dpll` struct, a classical, non-learning
//! backtracking search. Each search node runs:
//! 1.  **Unit propagation:** unit clauses commit their literal and simplify the
//!     formula. A clause emptied this way is a conflict and the node is
//!     abandoned.
//! 2.  **Pure-literal elimination:** literals whose negation no longer occurs
//!     are committed and their clauses dropped.
//! 3.  **Decision:** a literal chosen by the `VariableSelection` heuristic is
//!     tried true, then false.
//!
//! The formula is satisfiable as soon as a node's clause list becomes empty.
//!
//! Instead of native recursion the search keeps an explicit stack of frames,
//! each owning its simplified clause list and assignment. Depth is therefore
//! bounded by `Limits::max_depth` rather than the thread's stack, and every
//! frame is a point where a `CancelToken` is honoured.

use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::cancel::CancelToken;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SolverError};
use crate::sat::literal::Literal;
use crate::sat::observer::{Event, NoopObserver, SolverObserver, TracingObserver};
use crate::sat::preprocessing::PureLiteralElimination;
use crate::sat::propagation::unit_propagate;
use crate::sat::solver::{Limits, SolutionStats, Solver};
use crate::sat::variable_selection::{FirstFound, VariableSelection};
use std::fmt;

/// One pending node of the search tree.
#[derive(Debug, Clone)]
struct Frame {
    clauses: Vec<Clause>,
    assignment: Assignment,
    depth: usize,
}

impl Frame {
    /// The child frame with `lit` forced true: clauses containing `lit` are
    /// satisfied and dropped, and `¬lit` is stripped from the rest.
    ///
    /// Propagation has already removed every unit clause from the parent, so
    /// no clause can be emptied here; one that were would simply be dropped.
    fn branch(&self, lit: Literal) -> Self {
        let falsified = lit.negated();
        let clauses = self
            .clauses
            .iter()
            .filter(|clause| !clause.contains(lit))
            .map(|clause| clause.without(falsified))
            .filter(|clause| !clause.is_empty())
            .collect();

        let mut assignment = self.assignment.clone();
        assignment.assign(lit);

        Self {
            clauses,
            assignment,
            depth: self.depth + 1,
        }
    }
}

/// Represents a DPLL SAT solver.
///
/// Generic over the branching heuristic, so the first-found, Jeroslow–Wang
/// and most-frequent variants share one search procedure.
pub struct Dpll<V: VariableSelection = FirstFound> {
    /// The formula being solved. Never modified; each solve copies it.
    pub cnf: Cnf,
    /// The branching heuristic.
    pub selector: V,
    limits: Limits,
    cancel: CancelToken,
    observer: Box<dyn SolverObserver>,
    stats: SolutionStats,
    solutions: Option<Solutions>,
}

impl<V: VariableSelection> Dpll<V> {
    /// Creates a solver for `cnf` branching with `selector`.
    pub fn with_selector(cnf: Cnf, selector: V) -> Self {
        Self {
            cnf,
            selector,
            limits: Limits::default(),
            cancel: CancelToken::default(),
            observer: Box::new(TracingObserver),
            stats: SolutionStats::default(),
            solutions: None,
        }
    }

    /// Runs the search, reporting events to `observer` instead of the stored
    /// one.
    ///
    /// # Errors
    ///
    /// * `SolverError::Cancelled` if the token fires.
    /// * `SolverError::DepthExceeded` if a frame goes deeper than
    ///   `Limits::max_depth`.
    pub fn solve_observed(&mut self, observer: &mut dyn SolverObserver) -> Result<bool> {
        self.stats = SolutionStats::default();
        self.solutions = None;

        tracing::debug!(
            clauses = self.cnf.len(),
            variables = self.cnf.num_vars,
            "dpll: starting search"
        );

        if self.cnf.has_empty_clause() {
            tracing::debug!("dpll: input contains the empty clause");
            return Ok(false);
        }

        let mut stack = vec![Frame {
            clauses: self.cnf.clauses.clone(),
            assignment: Assignment::new(self.cnf.num_vars),
            depth: 0,
        }];

        while let Some(mut frame) = stack.pop() {
            if self.cancel.is_cancelled() {
                return Err(SolverError::Cancelled);
            }
            if let Some(limit) = self.limits.max_depth {
                if frame.depth > limit {
                    return Err(SolverError::DepthExceeded { limit });
                }
            }
            self.stats.max_depth = self.stats.max_depth.max(frame.depth);

            match unit_propagate(&mut frame.clauses, &mut frame.assignment, observer) {
                Ok(n) => self.stats.propagations += n,
                Err(_) => {
                    self.stats.conflicts += 1;
                    observer.notify(&Event::Conflict { depth: frame.depth });
                    continue;
                }
            }
            if frame.clauses.is_empty() {
                return Ok(self.satisfied(frame));
            }

            self.stats.pure_literals +=
                PureLiteralElimination::apply(&mut frame.clauses, &mut frame.assignment, observer);
            if frame.clauses.is_empty() {
                return Ok(self.satisfied(frame));
            }

            let Some(lit) = self.selector.pick(&frame.clauses) else {
                // Only empty clauses would be left, which propagation rules out.
                return Ok(self.satisfied(frame));
            };

            self.stats.decisions += 1;
            observer.notify(&Event::Decision {
                literal: lit,
                depth: frame.depth,
            });

            // Pushed in reverse so the `lit = true` branch is explored first.
            stack.push(frame.branch(lit.negated()));
            stack.push(frame.branch(lit));
        }

        tracing::debug!(decisions = self.stats.decisions, "dpll: unsatisfiable");
        Ok(false)
    }

    fn satisfied(&mut self, frame: Frame) -> bool {
        tracing::debug!(
            decisions = self.stats.decisions,
            depth = frame.depth,
            "dpll: satisfiable"
        );
        self.solutions = Some(frame.assignment.get_solutions());
        true
    }
}

impl<V: VariableSelection + Default> Solver for Dpll<V> {
    /// Creates a new DPLL solver using the heuristic's default configuration.
    fn new(cnf: Cnf) -> Self {
        Self::with_selector(cnf, V::default())
    }

    fn solve(&mut self) -> Result<bool> {
        let mut observer = std::mem::replace(&mut self.observer, Box::new(NoopObserver));
        let verdict = self.solve_observed(observer.as_mut());
        self.observer = observer;
        verdict
    }

    /// The assignment of the satisfying branch. Variables it leaves out are
    /// "don't care".
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

impl<V: VariableSelection + fmt::Debug> fmt::Debug for Dpll<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dpll")
            .field("cnf", &self.cnf)
            .field("selector", &self.selector)
            .field("limits", &self.limits)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::variable_selection::{Heuristic, JeroslowWang, MostFrequent};

    fn cnf(raw: &[&[i32]]) -> Cnf {
        Cnf::new(raw.iter().map(|c| c.to_vec())).unwrap()
    }

    fn solve_with<V: VariableSelection + Default>(cnf: Cnf) -> (bool, Option<Solutions>) {
        let mut solver = Dpll::<V>::new(cnf);
        let sat = solver.solve().unwrap();
        (sat, solver.solutions())
    }

    #[test]
    fn test_empty_formula_is_sat() {
        let (sat, sol) = solve_with::<FirstFound>(Cnf::default());
        assert!(sat);
        assert!(sol.unwrap().is_empty());
    }

    #[test]
    fn test_empty_clause_is_unsat() {
        let formula = Cnf::from_clauses(vec![Clause::from_i32s([1], 0).unwrap(), Clause::empty()]);
        assert!(!solve_with::<FirstFound>(formula).0);
    }

    #[test]
    fn test_single_unit() {
        let (sat, sol) = solve_with::<FirstFound>(cnf(&[&[1]]));
        assert!(sat);
        assert!(sol.unwrap().check(1));
    }

    #[test]
    fn test_contradicting_units() {
        assert!(!solve_with::<FirstFound>(cnf(&[&[1], &[-1]])).0);
    }

    #[test]
    fn test_two_variable_unsat_with_every_heuristic() {
        let formula = cnf(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]);
        assert!(!solve_with::<FirstFound>(formula.clone()).0);
        assert!(!solve_with::<JeroslowWang>(formula.clone()).0);
        assert!(!solve_with::<MostFrequent>(formula.clone()).0);
        assert!(!solve_with::<Heuristic>(formula).0);
    }

    #[test]
    fn test_model_satisfies_formula() {
        let formula = cnf(&[&[1, 2, 3], &[-1, 2], &[-2, 3]]);
        for heuristic in [Heuristic::First, Heuristic::JeroslowWang, Heuristic::MostFrequent] {
            let mut solver = Dpll::with_selector(formula.clone(), heuristic);
            assert!(solver.solve().unwrap());
            let model = solver.solutions().unwrap();
            assert!(formula.verify(&model), "{heuristic}: {model}");
        }
    }

    #[test]
    fn test_pure_literal_only() {
        let (sat, sol) = solve_with::<FirstFound>(cnf(&[&[1, 2], &[1, -2]]));
        assert!(sat);
        assert!(sol.unwrap().check(1));
    }

    #[test]
    fn test_branching_records_decisions() {
        // Neighbours on a 4-cycle must differ. No units and no pure literals,
        // so the search has to branch.
        let formula = cnf(&[
            &[1, 2],
            &[-1, -2],
            &[2, 3],
            &[-2, -3],
            &[3, 4],
            &[-3, -4],
            &[4, 1],
            &[-4, -1],
        ]);
        let mut solver = Dpll::<FirstFound>::new(formula.clone());
        let mut decisions = Vec::new();
        let mut observer = |event: &Event<'_>| {
            if let Event::Decision { literal, .. } = event {
                decisions.push(literal.to_i32());
            }
        };
        let sat = solver.solve_observed(&mut observer).unwrap();
        assert!(sat);
        assert_eq!(decisions, vec![1]);
        assert_eq!(solver.stats().decisions, decisions.len());
        assert!(formula.verify(&solver.solutions().unwrap()));
    }

    #[test]
    fn test_depth_limit() {
        // 4 variables, every assignment falsifies exactly one clause.
        let mut raw = Vec::new();
        for mask in 0..16_i32 {
            raw.push(
                (1..=4)
                    .map(|v| if mask & (1 << (v - 1)) == 0 { v } else { -v })
                    .collect::<Vec<_>>(),
            );
        }
        let formula = Cnf::new(raw).unwrap();

        let mut solver = Dpll::<FirstFound>::new(formula.clone());
        assert!(!solver.solve().unwrap());
        assert!(solver.stats().conflicts > 0);

        let mut bounded = Dpll::<FirstFound>::new(formula);
        bounded.set_limits(Limits {
            max_depth: Some(1),
            max_clauses: None,
        });
        assert!(matches!(
            bounded.solve(),
            Err(SolverError::DepthExceeded { limit: 1 })
        ));
    }

    #[test]
    fn test_cancellation() {
        let mut solver = Dpll::<FirstFound>::new(cnf(&[&[1, 2]]));
        let token = CancelToken::new();
        solver.set_cancel_token(token.clone());
        token.cancel();
        assert!(matches!(solver.solve(), Err(SolverError::Cancelled)));
    }
}
