//! The formula container: a conjunction of clauses.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::error::SolverError;
use crate::sat::literal::Variable;
use itertools::Itertools;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    /// Highest variable index the formula may mention.
    pub num_vars: usize,
}

impl Cnf {
    /// Builds a formula from raw DIMACS-style clauses, rejecting malformed
    /// input before any solving happens. Duplicate clauses are dropped,
    /// keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// * `SolverError::ZeroLiteral` if a clause contains `0`.
    /// * `SolverError::LiteralOutOfRange` if a clause contains `i32::MIN`.
    /// * `SolverError::EmptyClause` if a clause has no literals.
    pub fn new<I, C>(clauses: I) -> Result<Self, SolverError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let clauses: Vec<Clause> = clauses
            .into_iter()
            .enumerate()
            .map(|(index, values)| {
                let clause = Clause::from_i32s(values, index)?;
                if clause.is_empty() {
                    return Err(SolverError::EmptyClause { index });
                }
                Ok(clause)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self::from_clauses(clauses.into_iter().unique().collect()))
    }

    /// Wraps already-built clauses without validation. The empty clause is
    /// allowed here and makes the formula unsatisfiable.
    #[must_use]
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        let num_vars = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|lit| lit.variable() as usize)
            .max()
            .unwrap_or(0);

        Self { clauses, num_vars }
    }

    /// Raises `num_vars` to a declared count such as a DIMACS header value.
    #[must_use]
    pub fn with_num_vars(mut self, declared: usize) -> Self {
        self.num_vars = self.num_vars.max(declared);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Total literal occurrences across all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// Distinct variables that occur, in ascending order.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.clauses
            .iter()
            .flat_map(Clause::variables)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// `true` if every clause has a literal that `solutions` sets true.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|lit| solutions.check(lit.to_i32())))
    }
}

impl TryFrom<Vec<Vec<i32>>> for Cnf {
    type Error = SolverError;

    fn try_from(clauses: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        Self::new(clauses)
    }
}

impl FromIterator<Clause> for Cnf {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self::from_clauses(iter.into_iter().collect())
    }
}

/// Writes the formula in DIMACS CNF.
impl Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
