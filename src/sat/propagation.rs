#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation over a working clause list.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use crate::sat::observer::{Event, SolverObserver};

/// Propagating `literal` emptied a clause. The branch (DPLL) or the whole
/// formula (DP) is unsatisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub literal: Literal,
}

/// Simplifies `clauses` by `lit`: drops clauses containing it and strips its
/// negation from the rest. Returns `Err` if that leaves an empty clause; the
/// clause list is then partially rewritten and should be discarded.
pub(crate) fn simplify(clauses: &mut Vec<Clause>, lit: Literal) -> Result<(), Conflict> {
    let falsified = lit.negated();
    let mut conflict = false;

    clauses.retain_mut(|clause| {
        if conflict || clause.contains(lit) {
            return false;
        }
        if clause.remove(falsified) && clause.is_empty() {
            conflict = true;
        }
        true
    });

    if conflict {
        Err(Conflict { literal: lit })
    } else {
        Ok(())
    }
}

/// Repeatedly commits the literal of a unit clause and simplifies, until no
/// unit clause remains.
///
/// Returns the number of literals committed, or the `Conflict` that stopped
/// propagation. A conflict is not the same as the formula becoming empty:
/// the former is UNSAT for this branch, the latter SAT.
///
/// The reduced formula does not depend on which unit is taken first, and a
/// formula with no unit clauses is returned untouched.
///
/// # Errors
///
/// `Conflict` when a clause loses its last literal.
pub fn unit_propagate(
    clauses: &mut Vec<Clause>,
    assignment: &mut Assignment,
    observer: &mut dyn SolverObserver,
) -> Result<usize, Conflict> {
    let mut propagated = 0;

    while let Some(lit) = clauses.iter().find_map(Clause::unit) {
        assignment.assign(lit);
        observer.notify(&Event::UnitAssigned(lit));
        propagated += 1;
        simplify(clauses, lit)?;
    }

    Ok(propagated)
}
