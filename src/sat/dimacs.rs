#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader for the DIMACS CNF file format.
//!
//! The format:
//! - Comment lines start with `c`.
//! - The problem line is `p cnf <num_variables> <num_clauses>`.
//! - Literals are whitespace-separated nonzero integers, positive for a
//!   variable and negative for its negation. A `0` ends the current clause.
//!   Clauses may span several lines, or share one.
//! - A `%` line ends the data (used by the SATLIB benchmark sets).
//!
//! Malformed input is reported as `SolverError::Parse` with the offending
//! line number. Writing goes through `Cnf`'s `Display` impl.

use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SolverError};
use crate::sat::literal::Literal;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

/// The counts declared by a `p cnf` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub num_vars: usize,
    pub num_clauses: usize,
}

fn parse_error(line: usize, message: impl Into<String>) -> SolverError {
    SolverError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_header<'a>(line: usize, mut tokens: impl Iterator<Item = &'a str>) -> Result<Header> {
    if tokens.next() != Some("cnf") {
        return Err(parse_error(line, "expected `p cnf <variables> <clauses>`"));
    }

    let mut count = |what: &str| -> Result<usize> {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(line, format!("problem line is missing the {what} count")))?;
        token
            .parse()
            .map_err(|e| parse_error(line, format!("invalid {what} count '{token}': {e}")))
    };

    let num_vars = count("variable")?;
    let num_clauses = count("clause")?;

    if num_vars > Literal::MAX_VARIABLE as usize {
        return Err(parse_error(
            line,
            format!("{num_vars} variables exceed the maximum of {}", Literal::MAX_VARIABLE),
        ));
    }

    if let Some(extra) = tokens.next() {
        return Err(parse_error(
            line,
            format!("unexpected token '{extra}' after problem line"),
        ));
    }

    Ok(Header {
        num_vars,
        num_clauses,
    })
}

/// Parses DIMACS data from any buffered reader.
///
/// A bare `0` (a clause with no literals) is skipped with a warning. A final
/// clause missing its terminating `0` is still accepted.
///
/// # Errors
///
/// * `SolverError::Io` if reading fails.
/// * `SolverError::Parse` for a token that is not an `i32`, a malformed or
///   repeated problem line, or a literal whose variable is larger than the
///   declared count.
/// * `SolverError::LiteralOutOfRange` for `-2147483648`, which has no
///   negation.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf> {
    let mut header: Option<Header> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace().peekable();

        match tokens.peek() {
            None => continue,
            Some(&"%") => break,
            Some(token) if token.starts_with('c') => continue,
            Some(&"p") => {
                tokens.next();
                if header.is_some() {
                    return Err(parse_error(line_no, "duplicate problem line"));
                }
                header = Some(parse_header(line_no, tokens)?);
                continue;
            }
            Some(_) => {}
        }

        for token in tokens {
            let value: i32 = token
                .parse()
                .map_err(|e| parse_error(line_no, format!("invalid literal '{token}': {e}")))?;

            if let Some(h) = header {
                if value.unsigned_abs() as usize > h.num_vars {
                    return Err(parse_error(
                        line_no,
                        format!("literal {value} exceeds the declared {} variables", h.num_vars),
                    ));
                }
            }

            if value == 0 {
                if current.is_empty() {
                    tracing::warn!(line = line_no, "skipping empty clause");
                } else {
                    clauses.push(std::mem::take(&mut current));
                }
            } else {
                current.push(value);
            }
        }
    }

    if !current.is_empty() {
        tracing::trace!("accepting final clause without a terminating 0");
        clauses.push(current);
    }

    if let Some(h) = header {
        if h.num_clauses != clauses.len() {
            tracing::warn!(
                declared = h.num_clauses,
                found = clauses.len(),
                "clause count differs from the problem line"
            );
        }
    }

    let cnf = Cnf::new(clauses)?;
    tracing::debug!(
        clauses = cnf.len(),
        variables = cnf.num_vars,
        "parsed DIMACS input"
    );

    Ok(match header {
        Some(h) => cnf.with_num_vars(h.num_vars),
        None => cnf,
    })
}

/// Parses DIMACS text held in memory, e.g. from the command line.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_text(text: &str) -> Result<Cnf> {
    parse_dimacs(Cursor::new(text))
}

/// Opens and parses a DIMACS file.
///
/// # Errors
///
/// `SolverError::Io` if the file cannot be opened, otherwise see
/// [`parse_dimacs`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}
