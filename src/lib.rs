//! Classical CNF satisfiability: resolution saturation, Davis–Putnam variable
//! elimination and DPLL search with pluggable branching heuristics.
//!
//! ```
//! use classic_sat::sat::cnf::Cnf;
//! use classic_sat::sat::solver::{SolverType, Solver};
//! use classic_sat::sat::dpll::Dpll;
//! use classic_sat::sat::variable_selection::JeroslowWang;
//!
//! let cnf = Cnf::new(vec![vec![1, 2, 3], vec![-1, 2], vec![-2, 3]]).unwrap();
//! let mut solver = Dpll::<JeroslowWang>::new(cnf.clone());
//! assert!(solver.solve().unwrap());
//! assert!(cnf.verify(&solver.solutions().unwrap()));
//!
//! for kind in SolverType::ALL {
//!     let mut solver = kind.to_impl(cnf.clone(), Default::default());
//!     assert!(solver.solve().unwrap());
//! }
//! ```

/// The `sat` module holds the formula model, the shared simplification
/// procedures, the three engines and the DIMACS reader.
pub mod sat;
