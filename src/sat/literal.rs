#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Signed-integer literals.
//!
//! A literal is a nonzero `i32`: its variable is the absolute value and its
//! negation is the arithmetic sign flip. Literals order by variable first and
//! put the negative literal before the positive one, so a sorted clause keeps
//! `-v` and `v` next to each other.

use crate::sat::error::SolverError;
use core::cmp::Ordering;
use core::ops::{Neg, Not};
use std::fmt::{self, Display};

pub type Variable = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal(i32);

impl Literal {
    /// Largest representable variable. `from_i32` rejects `i32::MIN`, so every
    /// variable of a built formula is in `1..=MAX_VARIABLE`.
    pub const MAX_VARIABLE: Variable = i32::MAX.unsigned_abs();

    /// Builds the literal of `var` with the given polarity.
    ///
    /// Callers pass variables taken from a formula, which are always in
    /// `1..=MAX_VARIABLE`.
    ///
    /// # Panics
    ///
    /// If `var` is `0` or above `MAX_VARIABLE`.
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        assert!(
            var != 0 && var <= Self::MAX_VARIABLE,
            "variable out of range"
        );
        #[allow(clippy::cast_possible_wrap)]
        let var = var as i32;

        if polarity { Self(var) } else { Self(-var) }
    }

    /// Checked conversion from a DIMACS integer.
    ///
    /// # Errors
    ///
    /// * `SolverError::ZeroLiteral` if `value` is `0`.
    /// * `SolverError::LiteralOutOfRange` for `i32::MIN`, which has no
    ///   negation.
    ///
    /// `clause` is carried into the error to point at the offending input
    /// clause.
    pub const fn from_i32(value: i32, clause: usize) -> Result<Self, SolverError> {
        match value {
            0 => Err(SolverError::ZeroLiteral { clause }),
            i32::MIN => Err(SolverError::LiteralOutOfRange { value, clause }),
            _ => Ok(Self(value)),
        }
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0.is_positive()
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(-self.0)
    }

    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    /// `true` if `other` is the negation of `self`.
    #[must_use]
    pub const fn is_complement_of(self, other: Self) -> bool {
        self.0 == -other.0
    }
}

impl TryFrom<i32> for Literal {
    type Error = SolverError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value, 0)
    }
}

impl From<Literal> for i32 {
    fn from(lit: Literal) -> Self {
        lit.0
    }
}

impl Ord for Literal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.variable()
            .cmp(&other.variable())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
