//! Algorithm events and the observers that receive them.
//!
//! Engines and inference primitives report what they do through a
//! `SolverObserver` instead of printing. `TracingObserver` forwards events to
//! `tracing`; any `FnMut(&Event)` closure is an observer too, which is what
//! the tests use to record traces.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};

/// Something noteworthy an algorithm just did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// Unit propagation committed a literal.
    UnitAssigned(Literal),
    /// Pure-literal elimination committed a literal.
    PureLiteral(Literal),
    /// DPLL branched on a literal at the given depth.
    Decision { literal: Literal, depth: usize },
    /// A DPLL branch hit a propagation conflict and was abandoned.
    Conflict { depth: usize },
    /// DP eliminated a variable, replacing its clauses with resolvents.
    VariableEliminated {
        variable: Variable,
        removed: usize,
        added: usize,
    },
    /// A new, non-tautological resolvent was derived.
    ResolventDerived(&'a Clause),
    /// A DP or saturation round finished with the given clause count.
    RoundCompleted { round: usize, clauses: usize },
}

pub trait SolverObserver {
    fn notify(&mut self, event: &Event<'_>);
}

impl<F: FnMut(&Event<'_>)> SolverObserver for F {
    fn notify(&mut self, event: &Event<'_>) {
        self(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolverObserver for NoopObserver {
    fn notify(&mut self, _: &Event<'_>) {}
}

/// Emits each event as a `tracing` record. Per-literal events go out at
/// `TRACE`, structural ones at `DEBUG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SolverObserver for TracingObserver {
    fn notify(&mut self, event: &Event<'_>) {
        match *event {
            Event::UnitAssigned(lit) => tracing::trace!(literal = %lit, "unit assigned"),
            Event::PureLiteral(lit) => tracing::trace!(literal = %lit, "pure literal"),
            Event::Decision { literal, depth } => {
                tracing::trace!(literal = %literal, depth, "decision");
            }
            Event::Conflict { depth } => tracing::trace!(depth, "conflict, backtracking"),
            Event::VariableEliminated {
                variable,
                removed,
                added,
            } => tracing::debug!(variable, removed, added, "variable eliminated"),
            Event::ResolventDerived(clause) => tracing::trace!(%clause, "resolvent derived"),
            Event::RoundCompleted { round, clauses } => {
                tracing::debug!(round, clauses, "round completed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_records_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &Event<'_>| {
                if let Event::UnitAssigned(lit) = event {
                    seen.push(lit.to_i32());
                }
            };
            let observer: &mut dyn SolverObserver = &mut observer;
            observer.notify(&Event::UnitAssigned(Literal::new(3, false)));
            observer.notify(&Event::Conflict { depth: 1 });
        }
        assert_eq!(seen, vec![-3]);
    }

    #[test]
    fn test_tracing_observer_accepts_all_events() {
        let clause = Clause::new([Literal::new(1, true)]);
        let mut observer = TracingObserver;
        observer.notify(&Event::ResolventDerived(&clause));
        observer.notify(&Event::RoundCompleted {
            round: 1,
            clauses: 4,
        });
    }
}
