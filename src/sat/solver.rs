//! The interface shared by the three engines, their statistics and limits,
//! and runtime dispatch between them.

use crate::sat::cancel::CancelToken;
use crate::sat::cnf::Cnf;
use crate::sat::dp::DavisPutnam;
use crate::sat::dpll::Dpll;
use crate::sat::error::Result;
use crate::sat::observer::SolverObserver;
use crate::sat::saturation::Saturation;
use crate::sat::variable_selection::Heuristic;
use clap::ValueEnum;
use std::fmt::{self, Display};

pub use crate::sat::assignment::Solutions;

/// Counters collected while solving. Engines fill in the fields that apply to
/// them and leave the rest at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub pure_literals: usize,
    pub eliminated_variables: usize,
    pub resolvents: usize,
    pub rounds: usize,
    pub max_depth: usize,
}

/// Resource bounds. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    /// Deepest DPLL decision stack allowed before `DepthExceeded`.
    pub max_depth: Option<usize>,
    /// Largest DP or saturation clause set allowed before `ResourceExhausted`.
    pub max_clauses: Option<usize>,
}

pub trait Solver {
    /// Takes ownership of the formula; every solve works on its own copy.
    fn new(cnf: Cnf) -> Self
    where
        Self: Sized;

    /// Decides the formula: `Ok(true)` is SATISFIABLE, `Ok(false)` UNSATISFIABLE.
    ///
    /// # Errors
    ///
    /// Resource limits, cancellation; never a propagation conflict.
    fn solve(&mut self) -> Result<bool>;

    /// The model found by the last satisfiable solve, if the engine
    /// reconstructs one.
    fn solutions(&self) -> Option<Solutions>;

    fn stats(&self) -> SolutionStats;

    /// Replaces the observer receiving algorithm events.
    fn set_observer(&mut self, observer: Box<dyn SolverObserver>);

    fn set_limits(&mut self, limits: Limits);

    fn set_cancel_token(&mut self, token: CancelToken);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum SolverType {
    #[default]
    Dpll,
    Dp,
    Resolution,
}

impl SolverType {
    pub const ALL: [Self; 3] = [Self::Dpll, Self::Dp, Self::Resolution];

    /// Builds the engine for this type. `heuristic` only affects DPLL.
    #[must_use]
    pub fn to_impl(self, cnf: Cnf, heuristic: Heuristic) -> SolverImpls {
        match self {
            Self::Dpll => SolverImpls::Dpll(Box::new(Dpll::with_selector(cnf, heuristic))),
            Self::Dp => SolverImpls::Dp(Box::new(DavisPutnam::new(cnf))),
            Self::Resolution => SolverImpls::Resolution(Box::new(Saturation::new(cnf))),
        }
    }
}

impl Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dpll => write!(f, "dpll"),
            Self::Dp => write!(f, "dp"),
            Self::Resolution => write!(f, "resolution"),
        }
    }
}

/// One of the three engines, chosen at runtime.
pub enum SolverImpls {
    Dpll(Box<Dpll<Heuristic>>),
    Dp(Box<DavisPutnam>),
    Resolution(Box<Saturation>),
}

impl SolverImpls {
    fn inner(&self) -> &dyn Solver {
        match self {
            Self::Dpll(s) => &**s,
            Self::Dp(s) => &**s,
            Self::Resolution(s) => &**s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Solver {
        match self {
            Self::Dpll(s) => &mut **s,
            Self::Dp(s) => &mut **s,
            Self::Resolution(s) => &mut **s,
        }
    }

    #[must_use]
    pub const fn solver_type(&self) -> SolverType {
        match self {
            Self::Dpll(_) => SolverType::Dpll,
            Self::Dp(_) => SolverType::Dp,
            Self::Resolution(_) => SolverType::Resolution,
        }
    }

    /// # Errors
    ///
    /// See [`Solver::solve`].
    pub fn solve(&mut self) -> Result<bool> {
        self.inner_mut().solve()
    }

    #[must_use]
    pub fn solutions(&self) -> Option<Solutions> {
        self.inner().solutions()
    }

    #[must_use]
    pub fn stats(&self) -> SolutionStats {
        self.inner().stats()
    }

    pub fn set_observer(&mut self, observer: Box<dyn SolverObserver>) {
        self.inner_mut().set_observer(observer);
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.inner_mut().set_limits(limits);
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.inner_mut().set_cancel_token(token);
    }
}

impl fmt::Debug for SolverImpls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SolverImpls")
            .field(&self.solver_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reports_type() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1]]).unwrap();
        for kind in SolverType::ALL {
            let mut solver = kind.to_impl(cnf.clone(), Heuristic::MostFrequent);
            assert_eq!(solver.solver_type(), kind);
            assert!(solver.solve().unwrap(), "{kind}");
        }
    }

    #[test]
    fn test_resolution_has_no_model() {
        let cnf = Cnf::new(vec![vec![1, 2]]).unwrap();
        let mut solver = SolverType::Resolution.to_impl(cnf, Heuristic::First);
        assert!(solver.solve().unwrap());
        assert!(solver.solutions().is_none());
    }

    #[test]
    fn test_cancelled_token_stops_every_engine() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1, 2], vec![1, -2], vec![-1, -2]]).unwrap();
        for kind in SolverType::ALL {
            let mut solver = kind.to_impl(cnf.clone(), Heuristic::First);
            let token = CancelToken::new();
            token.cancel();
            solver.set_cancel_token(token);
            assert!(
                matches!(solver.solve(), Err(crate::sat::error::SolverError::Cancelled)),
                "{kind}"
            );
        }
    }
}
