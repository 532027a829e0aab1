//! Pure-literal elimination.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use crate::sat::observer::{Event, SolverObserver};
use itertools::Itertools;
use rustc_hash::FxHashSet;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PureLiteralElimination;

impl PureLiteralElimination {
    /// Every literal whose negation occurs nowhere in `clauses`, in the order
    /// they are first met.
    #[must_use]
    pub fn find_pures(clauses: &[Clause]) -> Vec<Literal> {
        let present: FxHashSet<Literal> = clauses.iter().flat_map(Clause::iter).copied().collect();

        clauses
            .iter()
            .flat_map(Clause::iter)
            .copied()
            .filter(|lit| !present.contains(&lit.negated()))
            .unique()
            .collect()
    }

    /// Assigns all pure literals of the formula at once and drops every clause
    /// they satisfy. The pure set is computed once from the formula as given,
    /// not refreshed as clauses disappear. Returns the number of pure
    /// literals; `0` means nothing changed.
    pub fn apply(
        clauses: &mut Vec<Clause>,
        assignment: &mut Assignment,
        observer: &mut dyn SolverObserver,
    ) -> usize {
        let pures = Self::find_pures(clauses);
        if pures.is_empty() {
            return 0;
        }

        for &lit in &pures {
            assignment.assign(lit);
            observer.notify(&Event::PureLiteral(lit));
        }

        let pure_set: FxHashSet<Literal> = pures.iter().copied().collect();
        clauses.retain(|clause| !clause.iter().any(|lit| pure_set.contains(lit)));

        pures.len()
    }
}
