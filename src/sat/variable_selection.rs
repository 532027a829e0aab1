#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching heuristics for DPLL.
//!
//! A heuristic is a pure function of the current clause list. Ties are broken
//! in favour of the literal met first when scanning clauses in order; that
//! order is an implementation detail, not a correctness property.

use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use clap::ValueEnum;
use core::ops::Add;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use std::fmt::{self, Display};

pub trait VariableSelection {
    /// The literal to branch on, or `None` if no literal is left.
    fn pick(&self, clauses: &[Clause]) -> Option<Literal>;
}

/// Returns the highest-scoring literal, preferring the earliest on ties.
fn argmax<K>(clauses: &[Clause], score: impl Fn(&Clause) -> K, zero: K) -> Option<Literal>
where
    K: Ord + Copy + Add<Output = K>,
{
    let mut order = Vec::new();
    let mut scores: FxHashMap<Literal, K> = FxHashMap::default();

    for clause in clauses {
        let weight = score(clause);
        for &lit in clause {
            let entry = scores.entry(lit).or_insert_with(|| {
                order.push(lit);
                zero
            });
            *entry = *entry + weight;
        }
    }

    let mut best: Option<(Literal, K)> = None;
    for lit in order {
        let s = scores[&lit];
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((lit, s));
        }
    }
    best.map(|(lit, _)| lit)
}

/// The first literal of the first clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstFound;

impl VariableSelection for FirstFound {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        clauses.iter().find_map(|c| c.iter().next().copied())
    }
}

/// One-sided Jeroslow–Wang: a literal scores `Σ 2^-|C|` over the clauses `C`
/// containing it, which favours literals in short clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JeroslowWang;

impl JeroslowWang {
    #[must_use]
    pub fn weight(clause: &Clause) -> f64 {
        let len = i32::try_from(clause.len()).unwrap_or(i32::MAX);
        0.5_f64.powi(len)
    }
}

impl VariableSelection for JeroslowWang {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        argmax(
            clauses,
            |clause| OrderedFloat(Self::weight(clause)),
            OrderedFloat(0.0),
        )
    }
}

/// The literal with the most occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MostFrequent;

impl VariableSelection for MostFrequent {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        argmax(clauses, |_| 1_usize, 0)
    }
}

/// Runtime choice of heuristic, as exposed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Heuristic {
    #[default]
    First,
    JeroslowWang,
    MostFrequent,
}

impl VariableSelection for Heuristic {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        match self {
            Self::First => FirstFound.pick(clauses),
            Self::JeroslowWang => JeroslowWang.pick(clauses),
            Self::MostFrequent => MostFrequent.pick(clauses),
        }
    }
}

impl Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::JeroslowWang => write!(f, "jeroslow-wang"),
            Self::MostFrequent => write!(f, "most-frequent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(raw: &[&[i32]]) -> Vec<Clause> {
        raw.iter()
            .map(|c| Clause::from_i32s(c.iter().copied(), 0).unwrap())
            .collect()
    }

    fn pick<V: VariableSelection>(selector: &V, raw: &[&[i32]]) -> Option<i32> {
        selector.pick(&clauses(raw)).map(Literal::to_i32)
    }

    #[test]
    fn test_empty_formula_has_no_literal() {
        assert_eq!(pick(&FirstFound, &[]), None);
        assert_eq!(pick(&JeroslowWang, &[]), None);
        assert_eq!(pick(&MostFrequent, &[]), None);
    }

    #[test]
    fn test_first_found() {
        assert_eq!(pick(&FirstFound, &[&[3, -2], &[1]]), Some(-2));
    }

    #[test]
    fn test_jeroslow_wang_prefers_short_clauses() {
        // 4 appears once in a binary clause (0.25); 1 appears in three
        // 4-literal clauses (3 * 0.0625).
        let raw: &[&[i32]] = &[&[1, 2, 3, 5], &[1, -2, 3, 6], &[1, 2, -3, 7], &[4, -5]];
        assert_eq!(pick(&JeroslowWang, raw), Some(4));
    }

    #[test]
    fn test_jeroslow_wang_weight() {
        let c = clauses(&[&[1, 2, 3]]);
        assert!((JeroslowWang::weight(&c[0]) - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn test_most_frequent() {
        let raw: &[&[i32]] = &[&[1, 2, 3, 5], &[1, -2, 3, 6], &[1, 2, -3, 7], &[4, -5]];
        assert_eq!(pick(&MostFrequent, raw), Some(1));
    }

    #[test]
    fn test_ties_go_to_first_met() {
        assert_eq!(pick(&MostFrequent, &[&[2, 3], &[-1]]), Some(2));
        assert_eq!(pick(&JeroslowWang, &[&[2, 3], &[3, 2]]), Some(2));
    }

    #[test]
    fn test_heuristic_enum_dispatch() {
        let raw: &[&[i32]] = &[&[1, 2, 3, 5], &[1, -2, 3, 6], &[1, 2, -3, 7], &[4, -5]];
        assert_eq!(pick(&Heuristic::First, raw), Some(1));
        assert_eq!(pick(&Heuristic::JeroslowWang, raw), Some(4));
        assert_eq!(pick(&Heuristic::MostFrequent, raw), Some(1));
        assert_eq!(Heuristic::JeroslowWang.to_string(), "jeroslow-wang");
    }
}
