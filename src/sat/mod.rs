#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod cancel;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod dp;
pub mod dpll;
pub mod error;
pub mod literal;
pub mod observer;
pub mod preprocessing;
pub mod propagation;
pub mod resolution;
pub mod saturation;
pub mod solver;
pub mod variable_selection;
