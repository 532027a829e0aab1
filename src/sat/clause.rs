#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clauses: disjunctions of literals stored as sorted, duplicate-free sets.
//!
//! Construction sorts and deduplicates but keeps tautologies; deciding when a
//! tautology matters is left to the algorithms (resolution and DP discard
//! tautological resolvents, the input formula is taken as given).

use crate::sat::error::SolverError;
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{self, Display};

/// Inline capacity before a clause spills to the heap.
pub const INLINE_LITERALS: usize = 8;

pub type LiteralStorage = SmallVec<[Literal; INLINE_LITERALS]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: LiteralStorage,
}

impl Clause {
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        let mut literals: LiteralStorage = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    /// Builds a clause from DIMACS integers.
    ///
    /// # Errors
    ///
    /// `SolverError::ZeroLiteral` if any value is `0`.
    pub fn from_i32s<I: IntoIterator<Item = i32>>(
        values: I,
        index: usize,
    ) -> Result<Self, SolverError> {
        let literals: Vec<Literal> = values
            .into_iter()
            .map(|v| Literal::from_i32(v, index))
            .collect::<Result<_, _>>()?;
        Ok(Self::new(literals))
    }

    /// The empty clause: unsatisfiable on its own.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            literals: SmallVec::new_const(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// The single literal of a unit clause.
    #[must_use]
    pub fn unit(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [lit] => Some(*lit),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.literals.iter().map(|lit| lit.variable()).dedup()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.literals.binary_search(&lit).is_ok()
    }

    /// `true` if either polarity of `var` occurs.
    #[must_use]
    pub fn mentions(&self, var: Variable) -> bool {
        self.contains(Literal::new(var, true)) || self.contains(Literal::new(var, false))
    }

    /// Removes `lit` in place, returning whether it was present.
    pub fn remove(&mut self, lit: Literal) -> bool {
        match self.literals.binary_search(&lit) {
            Ok(pos) => {
                self.literals.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// A copy of the clause without `lit`.
    #[must_use]
    pub fn without(&self, lit: Literal) -> Self {
        let mut clause = self.clone();
        clause.remove(lit);
        clause
    }

    /// A clause is a tautology if it holds a literal and its negation. Sorted
    /// storage puts complements side by side, so one pass over adjacent pairs
    /// is enough.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.is_complement_of(*b))
    }

    /// The resolvent of `self` and `other` on `pivot`: `self` without
    /// `pivot` joined with `other` without its negation. Any other occurrence
    /// of the pivot variable survives, so the result may be a tautology;
    /// callers decide whether to keep it.
    #[must_use]
    pub fn resolve(&self, other: &Self, pivot: Literal) -> Self {
        let complement = pivot.negated();
        let literals = self
            .literals
            .iter()
            .filter(|&&lit| lit != pivot)
            .merge(other.literals.iter().filter(|&&lit| lit != complement))
            .dedup()
            .copied()
            .collect();

        Self { literals }
    }

    /// `true` if `self` holds some literal whose negation is in `other`.
    #[must_use]
    pub fn clashes_with(&self, other: &Self) -> bool {
        self.literals.iter().any(|lit| other.contains(lit.negated()))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;
    type IntoIter = core::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}
