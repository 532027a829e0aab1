//! Resolution saturation.
//!
//! Keeps adding resolvents of every clause pair until either the empty clause
//! shows up (UNSAT) or a full round derives nothing new (SAT). The clause set
//! only ever grows, so termination follows from the finite number of clauses
//! over the formula's variables. That number is exponential, which is what
//! `Limits::max_clauses` is for.
//!
//! Saturation proves satisfiability but does not produce a model.

use crate::sat::cancel::CancelToken;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SolverError};
use crate::sat::observer::{Event, NoopObserver, SolverObserver, TracingObserver};
use crate::sat::resolution::resolvents;
use crate::sat::solver::{Limits, SolutionStats, Solver, Solutions};
use rustc_hash::FxHashSet;
use std::fmt;

pub struct Saturation {
    pub cnf: Cnf,
    limits: Limits,
    cancel: CancelToken,
    observer: Box<dyn SolverObserver>,
    stats: SolutionStats,
}

impl Saturation {
    /// # Errors
    ///
    /// * `SolverError::Cancelled` if the token fires.
    /// * `SolverError::ResourceExhausted` once the clause set is larger than
    ///   `Limits::max_clauses`.
    pub fn solve_observed(&mut self, observer: &mut dyn SolverObserver) -> Result<bool> {
        self.stats = SolutionStats::default();

        tracing::debug!(clauses = self.cnf.len(), "resolution: starting saturation");

        if self.cnf.has_empty_clause() {
            return Ok(false);
        }

        // Tautologies are always true, and resolving on them would be unsound.
        let mut known: FxHashSet<Clause> = FxHashSet::default();
        let mut clauses: Vec<Clause> = self
            .cnf
            .iter()
            .filter(|clause| !clause.is_tautology())
            .filter(|clause| known.insert((*clause).clone()))
            .cloned()
            .collect();

        loop {
            if self.cancel.is_cancelled() {
                return Err(SolverError::Cancelled);
            }
            self.stats.rounds += 1;

            let mut fresh = Vec::new();
            for (i, a) in clauses.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    return Err(SolverError::Cancelled);
                }
                for b in &clauses[i + 1..] {
                    if !a.clashes_with(b) {
                        continue;
                    }
                    for resolvent in resolvents(a, b) {
                        if resolvent.is_empty() {
                            self.stats.resolvents += fresh.len() + 1;
                            observer.notify(&Event::ResolventDerived(&resolvent));
                            tracing::debug!(
                                round = self.stats.rounds,
                                "resolution: derived the empty clause"
                            );
                            return Ok(false);
                        }
                        if known.insert(resolvent.clone()) {
                            observer.notify(&Event::ResolventDerived(&resolvent));
                            fresh.push(resolvent);
                            self.check_clause_limit(clauses.len() + fresh.len())?;
                        }
                    }
                }
            }

            let saturated = fresh.is_empty();
            self.stats.resolvents += fresh.len();
            clauses.extend(fresh);

            observer.notify(&Event::RoundCompleted {
                round: self.stats.rounds,
                clauses: clauses.len(),
            });

            if saturated {
                tracing::debug!(
                    rounds = self.stats.rounds,
                    clauses = clauses.len(),
                    "resolution: saturated without the empty clause"
                );
                return Ok(true);
            }
        }
    }

    fn check_clause_limit(&self, clauses: usize) -> Result<()> {
        match self.limits.max_clauses {
            Some(limit) if clauses > limit => {
                Err(SolverError::ResourceExhausted { clauses, limit })
            }
            _ => Ok(()),
        }
    }
}

impl Solver for Saturation {
    fn new(cnf: Cnf) -> Self {
        Self {
            cnf,
            limits: Limits::default(),
            cancel: CancelToken::default(),
            observer: Box::new(TracingObserver),
            stats: SolutionStats::default(),
        }
    }

    fn solve(&mut self) -> Result<bool> {
        let mut observer = std::mem::replace(&mut self.observer, Box::new(NoopObserver));
        let verdict = self.solve_observed(observer.as_mut());
        self.observer = observer;
        verdict
    }

    /// Always `None`: a saturated clause set is not an assignment.
    fn solutions(&self) -> Option<Solutions> {
        None
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

impl fmt::Debug for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saturation")
            .field("cnf", &self.cnf)
            .field("limits", &self.limits)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
