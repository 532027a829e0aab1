//! Error type shared by the formula model, the DIMACS reader and the engines.
//!
//! Unit-propagation conflicts are deliberately absent: they are a local
//! signal (`propagation::Conflict`) that collapses into a backtrack or an
//! UNSAT verdict and never reaches a caller.

use std::io;
use thiserror::Error;

/// Errors surfaced by formula construction, parsing and solving.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A literal with value `0` was supplied. `0` only terminates DIMACS clauses.
    #[error("literal 0 is not a valid literal (clause {clause})")]
    ZeroLiteral {
        /// Index of the offending clause in the input.
        clause: usize,
    },

    /// A literal whose negation does not fit in an `i32`.
    #[error("literal {value} is out of range (clause {clause})")]
    LiteralOutOfRange {
        /// The offending value.
        value: i32,
        /// Index of the offending clause in the input.
        clause: usize,
    },

    /// A clause with no literals was supplied to the strict formula constructor.
    #[error("clause {index} is empty")]
    EmptyClause {
        /// Index of the offending clause in the input.
        index: usize,
    },

    /// The DIMACS input could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The DPLL search went deeper than the configured bound.
    #[error("search depth exceeded the limit of {limit} decisions")]
    DepthExceeded {
        /// The configured depth bound.
        limit: usize,
    },

    /// The working clause set of DP or saturation outgrew the configured bound.
    #[error("clause set grew to {clauses} clauses, above the limit of {limit}")]
    ResourceExhausted {
        /// Size of the clause set when the bound was hit.
        clauses: usize,
        /// The configured clause bound.
        limit: usize,
    },

    /// The cancellation token fired before a verdict was reached.
    #[error("solve was cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
