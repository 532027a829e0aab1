//! Binary resolution between two clauses.

use crate::sat::clause::Clause;
use smallvec::SmallVec;

/// Resolvents of one clause pair. Usually zero or one, so they stay inline.
pub type Resolvents = SmallVec<[Clause; 2]>;

/// All non-tautological resolvents of `a` and `b`, one per literal of `a`
/// whose negation is in `b`. Every complementary pair is tried, not just the
/// first. An empty clause in the result means the pair is contradictory.
#[must_use]
pub fn resolvents(a: &Clause, b: &Clause) -> Resolvents {
    a.iter()
        .filter(|lit| b.contains(lit.negated()))
        .map(|&pivot| a.resolve(b, pivot))
        .filter(|resolvent| !resolvent.is_tautology())
        .collect()
}
