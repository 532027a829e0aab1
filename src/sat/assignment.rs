//! The set of literals committed true during propagation and search, and the
//! `Solutions` model handed back to callers.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }
}

/// Committed literals, indexed by variable. At most one polarity per
/// variable is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    states: Vec<VarState>,
    assigned: usize,
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, var: Variable) -> &Self::Output {
        self.states
            .get(var as usize)
            .unwrap_or(&VarState::Unassigned)
    }
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars + 1],
            assigned: 0,
        }
    }

    /// Commits `lit` to true.
    pub fn assign(&mut self, lit: Literal) {
        let idx = lit.variable() as usize;
        if idx >= self.states.len() {
            self.states.resize(idx + 1, VarState::Unassigned);
        }

        debug_assert_ne!(
            self.states[idx],
            VarState::Assigned(!lit.polarity()),
            "both polarities of {} committed",
            lit.variable()
        );

        if self.states[idx].is_unassigned() {
            self.assigned += 1;
        }
        self.states[idx] = VarState::Assigned(lit.polarity());
    }

    pub fn assign_all<I: IntoIterator<Item = Literal>>(&mut self, lits: I) {
        for lit in lits {
            self.assign(lit);
        }
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self[var] {
            VarState::Assigned(b) => Some(b),
            VarState::Unassigned => None,
        }
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| if lit.polarity() { b } else { !b })
    }

    #[must_use]
    pub fn is_true(&self, lit: Literal) -> bool {
        self.literal_value(lit) == Some(true)
    }

    /// Number of assigned variables.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.assigned
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// The committed literals in variable order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(var, state)| match state {
                VarState::Assigned(b) => Some(Literal::new(var as Variable, *b)),
                VarState::Unassigned => None,
            })
    }

    #[must_use]
    pub fn get_solutions(&self) -> Solutions {
        Solutions::new(self.literals().map(Literal::to_i32))
    }
}

/// A satisfying model: the literals set true, one per assigned variable,
/// sorted by variable. Variables absent from the model are "don't care".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions(Vec<i32>);

impl Solutions {
    pub fn new<I: IntoIterator<Item = i32>>(lits: I) -> Self {
        Self(
            lits.into_iter()
                .sorted_by_key(|l| (l.unsigned_abs(), *l))
                .dedup()
                .collect(),
        )
    }

    #[must_use]
    pub fn check(&self, lit: i32) -> bool {
        self.0
            .binary_search_by_key(&(lit.unsigned_abs(), lit), |l| (l.unsigned_abs(), *l))
            .is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_query() {
        let mut a = Assignment::new(3);
        assert!(a.is_empty());
        a.assign(Literal::new(2, false));
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.literal_value(Literal::new(2, false)), Some(true));
        assert_eq!(a.literal_value(Literal::new(2, true)), Some(false));
        assert_eq!(a.literal_value(Literal::new(1, true)), None);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_assign_grows_past_initial_size() {
        let mut a = Assignment::new(0);
        a.assign(Literal::new(10, true));
        assert!(a.is_true(Literal::new(10, true)));
        assert!(a[11].is_unassigned());
    }

    #[test]
    fn test_reassigning_same_literal_counts_once() {
        let mut a = Assignment::new(2);
        a.assign_all([Literal::new(1, true), Literal::new(1, true)]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_solutions_from_assignment() {
        let mut a = Assignment::new(4);
        a.assign_all([Literal::new(3, true), Literal::new(1, false)]);
        let sol = a.get_solutions();
        assert_eq!(sol.iter().copied().collect::<Vec<_>>(), vec![-1, 3]);
        assert!(sol.check(3));
        assert!(sol.check(-1));
        assert!(!sol.check(1));
        assert_eq!(sol.to_string(), "-1 3");
    }
}
