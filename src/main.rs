//! # classic-sat
//!
//! `classic-sat` decides CNF formulas with the three classical procedures:
//! 1.  **Resolution saturation**: adds resolvents until the empty clause
//!     appears or nothing new can be derived.
//! 2.  **Davis–Putnam (DP)**: eliminates one variable per round by resolving
//!     away all of its occurrences.
//! 3.  **DPLL**: backtracking search with unit propagation, pure-literal
//!     elimination and a choice of branching heuristic (first-found,
//!     Jeroslow–Wang, most-frequent).
//!
//! ## Usage
//!
//! ```sh
//! classic-sat [OPTIONS] [INPUT] [COMMAND]
//! ```
//!
//! A bare `INPUT` is solved as a DIMACS file, or as a directory of `.cnf`
//! files if it is one.
//!
//! ### Subcommands
//!
//! -   `file <PATH>`: solve one DIMACS file.
//! -   `text --input "<clauses>"`: solve inline DIMACS, e.g. `"1 -2 0 2 3 0"`.
//! -   `dir <PATH>`: solve every `.cnf` file below a directory and print a
//!     summary of solved files, timeouts and solve times.
//! -   `completions <SHELL>`: print a shell completion script.
//!
//! ### Common options
//!
//! -   `--solver <dpll|dp|resolution>` (default `dpll`).
//! -   `--heuristic <first|jeroslow-wang|most-frequent>` (default `first`).
//! -   `--timeout <SECS>`: cancel a solve after this long.
//! -   `--max-depth <N>`, `--max-clauses <N>`: resource bounds.
//! -   `--verify`: check the model against the formula.
//! -   `--stats`: print the statistics table, including jemalloc memory usage.
//! -   `-p, --print-solution`: print the model.
//! -   `--compare`: run every engine and heuristic and check they agree.
//! -   `-v`, `-vv`, `-vvv`: log at info, debug or trace level. `RUST_LOG`
//!     overrides this.
//!
//! ## Example Invocations
//!
//! ```sh
//! classic-sat problem.cnf --verify --stats
//! classic-sat file problem.cnf --solver dp -p
//! classic-sat dir benchmarks/uf20 --timeout 10 --heuristic jeroslow-wang
//! classic-sat text --input "1 2 0 -1 0" --compare
//! ```

mod command_line;

use crate::command_line::cli::{
    Cli, Commands, init_tracing, solve_dir, solve_file, solve_text,
};
use anyhow::bail;
use clap::{CommandFactory, Parser};

/// Global allocator using `tikv-jemallocator`, which also provides the memory
/// figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.input {
            Some(path) if path.is_dir() => solve_dir(&path, &cli.common),
            Some(path) => solve_file(&path, &cli.common),
            None => bail!("no input provided; use --help for more information"),
        },
    }
}
