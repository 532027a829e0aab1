#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use classic_sat::sat::cancel::CancelToken;
use classic_sat::sat::cnf::Cnf;
use classic_sat::sat::dimacs::{parse_file, parse_text};
use classic_sat::sat::error::SolverError;
use classic_sat::sat::solver::{Limits, SolutionStats, Solutions, SolverType};
use classic_sat::sat::variable_selection::Heuristic;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing_subscriber::EnvFilter;

/// Defines the command-line interface for the solver.
#[derive(Parser, Debug)]
#[command(
    name = "classic-sat",
    version,
    about = "Resolution, Davis-Putnam and DPLL on DIMACS CNF"
)]
pub(crate) struct Cli {
    /// A DIMACS .cnf file, or a directory of them, to solve when no
    /// subcommand is given.
    pub input: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// DIMACS clauses, e.g. "1 -2 0 2 3 0". Clauses end with 0 and may
        /// share a line.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file under a directory and print a summary.
    Dir {
        /// Directory to walk recursively.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving command.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// The engine to run.
    #[arg(long, value_enum, default_value_t = SolverType::Dpll)]
    pub solver: SolverType,

    /// Branching heuristic for DPLL. Ignored by the other engines.
    #[arg(long, value_enum, default_value_t = Heuristic::First)]
    pub heuristic: Heuristic,

    /// Give up after this many seconds per formula.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Deepest DPLL decision stack before giving up.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Largest clause set DP or resolution may build before giving up.
    #[arg(long)]
    pub max_clauses: Option<usize>,

    /// Check the model against the formula.
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Print the statistics table after solving.
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Print the satisfying assignment.
    #[arg(short, long, default_value_t = false)]
    pub print_solution: bool,

    /// Run every engine (and every DPLL heuristic) and compare verdicts.
    #[arg(long, default_value_t = false)]
    pub compare: bool,
}

impl CommonOptions {
    pub(crate) const fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_clauses: self.max_clauses,
        }
    }

    /// A fresh token; the deadline starts counting now.
    pub(crate) fn cancel_token(&self) -> CancelToken {
        self.timeout.map_or_else(CancelToken::new, |secs| {
            CancelToken::with_timeout(Duration::from_secs(secs))
        })
    }
}

/// Installs the `tracing` subscriber. Logs go to stderr so that stdout only
/// carries results.
pub(crate) fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One engine run on one formula.
#[derive(Debug)]
pub(crate) struct Run {
    pub solver: SolverType,
    pub heuristic: Heuristic,
    pub result: Result<bool, SolverError>,
    pub solutions: Option<Solutions>,
    pub elapsed: Duration,
    pub stats: SolutionStats,
}

impl Run {
    pub(crate) const fn label(&self) -> &'static str {
        verdict_label(&self.result)
    }

    /// `Some(true)` for a verified model, `None` when there is nothing to check.
    pub(crate) fn verified(&self, cnf: &Cnf) -> Option<bool> {
        self.solutions.as_ref().map(|model| cnf.verify(model))
    }
}

pub(crate) const fn verdict_label(result: &Result<bool, SolverError>) -> &'static str {
    match result {
        Ok(true) => "SAT",
        Ok(false) => "UNSAT",
        Err(SolverError::Cancelled) => "TIMEOUT",
        Err(SolverError::DepthExceeded { .. } | SolverError::ResourceExhausted { .. }) => "LIMIT",
        Err(_) => "ERROR",
    }
}

pub(crate) fn run_solver(
    cnf: &Cnf,
    solver_type: SolverType,
    heuristic: Heuristic,
    common: &CommonOptions,
) -> Run {
    let mut solver = solver_type.to_impl(cnf.clone(), heuristic);
    solver.set_limits(common.limits());
    solver.set_cancel_token(common.cancel_token());

    let time = Instant::now();
    let result = solver.solve();
    let elapsed = time.elapsed();

    tracing::info!(
        solver = %solver_type,
        verdict = verdict_label(&result),
        elapsed = ?elapsed,
        "solve finished"
    );

    Run {
        solver: solver_type,
        heuristic,
        result,
        solutions: solver.solutions(),
        elapsed,
        stats: solver.stats(),
    }
}

/// Parses and solves one file.
///
/// # Errors
///
/// If the file cannot be read or parsed, or see [`solve_and_report`].
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> anyhow::Result<()> {
    let time = Instant::now();
    let cnf = parse_file(path).with_context(|| format!("failed to parse {}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, Some(path), parse_time)
}

/// Parses and solves DIMACS text.
///
/// # Errors
///
/// If the text is not valid DIMACS, or see [`solve_and_report`].
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> anyhow::Result<()> {
    let time = Instant::now();
    let cnf = parse_text(input).context("failed to parse CNF text")?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, None, parse_time)
}

/// Solves `cnf` with the configured engine, or every engine under
/// `--compare`, and prints the outcome.
///
/// # Errors
///
/// * A model that fails verification.
/// * Engines that disagree under `--compare`.
/// * A depth or clause limit was hit.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> anyhow::Result<()> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    tracing::debug!(
        variables = cnf.num_vars,
        clauses = cnf.len(),
        literals = cnf.num_literals(),
        "formula loaded"
    );

    if common.compare {
        return compare_all(cnf, common);
    }

    let run = run_solver(cnf, common.solver, common.heuristic, common);

    if common.verify {
        verify_solution(cnf, &run)?;
    }

    if common.stats {
        let (allocated, resident) = memory_usage()?;
        print_stats(parse_time, cnf, &run, allocated, resident);
    }

    if let (true, Some(model)) = (common.print_solution, run.solutions.as_ref()) {
        println!("Solutions: {model}");
    }

    match run.result {
        Ok(true) => println!("\nSATISFIABLE"),
        Ok(false) => println!("\nUNSATISFIABLE"),
        Err(SolverError::Cancelled) => println!("\nTIMEOUT"),
        Err(e) => return Err(e).context("solver stopped without a verdict"),
    }
    Ok(())
}

/// Checks the model of a satisfiable run.
///
/// # Errors
///
/// If the model leaves a clause unsatisfied.
pub(crate) fn verify_solution(cnf: &Cnf, run: &Run) -> anyhow::Result<()> {
    match (run.result.as_ref().ok(), run.verified(cnf)) {
        (_, Some(true)) => println!("Verified: true"),
        (_, Some(false)) => bail!("{} returned a model that fails verification", run.solver),
        (Some(true), None) => println!("Verified: n/a ({} produces no model)", run.solver),
        _ => {}
    }
    Ok(())
}

fn compare_all(cnf: &Cnf, common: &CommonOptions) -> anyhow::Result<()> {
    let mut runs = Vec::new();
    for solver in SolverType::ALL {
        if solver == SolverType::Dpll {
            for heuristic in [
                Heuristic::First,
                Heuristic::JeroslowWang,
                Heuristic::MostFrequent,
            ] {
                runs.push(run_solver(cnf, solver, heuristic, common));
            }
        } else {
            runs.push(run_solver(cnf, solver, common.heuristic, common));
        }
    }

    println!(
        "{:<12} {:<15} {:>8} {:>12} {:>9}",
        "solver", "heuristic", "result", "time (s)", "verified"
    );
    for run in &runs {
        let heuristic = if run.solver == SolverType::Dpll {
            run.heuristic.to_string()
        } else {
            "-".to_string()
        };
        let verified = match run.verified(cnf) {
            Some(true) => "yes",
            Some(false) => "NO",
            None => "-",
        };
        println!(
            "{:<12} {:<15} {:>8} {:>12.6} {:>9}",
            run.solver.to_string(),
            heuristic,
            run.label(),
            run.elapsed.as_secs_f64(),
            verified
        );
    }

    if runs.iter().any(|run| run.verified(cnf) == Some(false)) {
        bail!("a model failed verification");
    }

    let mut verdicts = runs.iter().filter_map(|run| run.result.as_ref().ok());
    if let Some(first) = verdicts.next() {
        if verdicts.any(|v| v != first) {
            bail!("engines disagree on satisfiability");
        }
    }
    Ok(())
}

/// Tallies a directory run: verdicts, timeouts and solve times.
#[derive(Debug, Default, Clone)]
pub(crate) struct DirSummary {
    pub solved: usize,
    pub timeouts: usize,
    pub failed: usize,
    pub total: usize,
    times: Vec<Duration>,
}

impl DirSummary {
    pub(crate) fn record(&mut self, result: &Result<bool, SolverError>, elapsed: Duration) {
        self.total += 1;
        match result {
            Ok(_) => {
                self.solved += 1;
                self.times.push(elapsed);
            }
            Err(SolverError::Cancelled) => self.timeouts += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// A file that could not be parsed.
    pub(crate) const fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    /// Mean solve time over the files that reached a verdict.
    pub(crate) fn mean(&self) -> Option<Duration> {
        let count = u32::try_from(self.times.len()).ok().filter(|&n| n > 0)?;
        Some(self.times.iter().sum::<Duration>() / count)
    }

    pub(crate) fn min(&self) -> Option<Duration> {
        self.times.iter().min().copied()
    }

    pub(crate) fn max(&self) -> Option<Duration> {
        self.times.iter().max().copied()
    }

    pub(crate) fn print(&self) {
        let secs = |d: Option<Duration>| d.map_or_else(|| "-".to_string(), |d| format!("{:.3}", d.as_secs_f64()));

        println!("\n=========================[ Directory Summary ]=========================");
        stat_line("Files", self.total);
        stat_line("Solved", self.solved);
        stat_line("Timeouts", self.timeouts);
        stat_line("Failed", self.failed);
        stat_line("Mean solve time (s)", secs(self.mean()));
        stat_line("Min solve time (s)", secs(self.min()));
        stat_line("Max solve time (s)", secs(self.max()));
        println!("=====================================================================");
    }
}

/// Solves every `.cnf` file under `path`, one line per file, then prints a
/// summary.
///
/// # Errors
///
/// If `path` is not a directory.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> anyhow::Result<()> {
    if !path.is_dir() {
        bail!("provided path is not a directory: {}", path.display());
    }

    let mut summary = DirSummary::default();

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            tracing::debug!(path = %file_path.display(), "skipping non-CNF file");
            continue;
        }

        let cnf = match parse_file(file_path) {
            Ok(cnf) => cnf,
            Err(e) => {
                tracing::error!(path = %file_path.display(), error = %e, "failed to parse");
                println!("{:<8} {}", "ERROR", file_path.display());
                summary.record_failure();
                continue;
            }
        };

        let run = run_solver(&cnf, common.solver, common.heuristic, common);
        if common.verify && run.verified(&cnf) == Some(false) {
            tracing::error!(path = %file_path.display(), "model failed verification");
        }

        println!(
            "{:<8} {:>10.3}s  {}",
            run.label(),
            run.elapsed.as_secs_f64(),
            file_path.display()
        );
        summary.record(&run.result, run.elapsed);
    }

    summary.print();
    Ok(())
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
///
/// # Errors
///
/// If jemalloc statistics cannot be read.
pub(crate) fn memory_usage() -> anyhow::Result<(f64, f64)> {
    let jemalloc = |e: tikv_jemalloc_ctl::Error| anyhow::anyhow!("jemalloc stats: {e}");

    epoch::advance().map_err(jemalloc)?;
    let allocated = stats::allocated::mib().map_err(jemalloc)?.read().map_err(jemalloc)?;
    let resident = stats::resident::mib().map_err(jemalloc)?.read().map_err(jemalloc)?;

    Ok((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Prints one statistic as a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints a statistic with its rate per second.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints problem and search statistics for one run.
pub(crate) fn print_stats(parse_time: Duration, cnf: &Cnf, run: &Run, allocated: f64, resident: f64) {
    let elapsed_secs = run.elapsed.as_secs_f64();
    let s = &run.stats;

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line("Solver", run.solver);
    match run.solver {
        SolverType::Dpll => {
            stat_line("Heuristic", run.heuristic);
            stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
            stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
            stat_line("Max depth", s.max_depth);
        }
        SolverType::Dp => {
            stat_line("Eliminated variables", s.eliminated_variables);
            stat_line_with_rate("Resolvents", s.resolvents, elapsed_secs);
        }
        SolverType::Resolution => {
            stat_line("Rounds", s.rounds);
            stat_line_with_rate("Resolvents", s.resolvents, elapsed_secs);
        }
    }
    if run.solver != SolverType::Resolution {
        stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
        stat_line("Pure literals", s.pure_literals);
    }
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_path_and_flags() {
        let cli = Cli::try_parse_from([
            "classic-sat",
            "problem.cnf",
            "--solver",
            "dp",
            "--timeout",
            "5",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("problem.cnf")));
        assert_eq!(cli.common.solver, SolverType::Dp);
        assert_eq!(cli.common.timeout, Some(5));
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommand_options() {
        let cli = Cli::try_parse_from([
            "classic-sat",
            "text",
            "--input",
            "1 -2 0",
            "--heuristic",
            "jeroslow-wang",
            "--max-depth",
            "10",
            "--verify",
        ])
        .unwrap();
        let Some(Commands::Text { input, common }) = cli.command else {
            panic!("expected the text subcommand");
        };
        assert_eq!(input, "1 -2 0");
        assert_eq!(common.heuristic, Heuristic::JeroslowWang);
        assert_eq!(
            common.limits(),
            Limits {
                max_depth: Some(10),
                max_clauses: None
            }
        );
        assert!(common.verify);
    }

    #[test]
    fn test_run_solver_reports_model() {
        let cnf = parse_text("1 2 3 0 -1 2 0 -2 3 0").unwrap();
        let run = run_solver(&cnf, SolverType::Dp, Heuristic::First, &CommonOptions::default());
        assert_eq!(run.label(), "SAT");
        assert_eq!(run.verified(&cnf), Some(true));
        assert!(verify_solution(&cnf, &run).is_ok());
    }

    #[test]
    fn test_limits_surface_as_errors() {
        let cnf = parse_text("1 2 0 -1 2 0 1 -2 0 -1 -2 0").unwrap();
        let common = CommonOptions {
            max_clauses: Some(1),
            ..CommonOptions::default()
        };
        let run = run_solver(&cnf, SolverType::Resolution, Heuristic::First, &common);
        assert_eq!(run.label(), "LIMIT");
        assert!(solve_and_report(&cnf, &common, None, Duration::ZERO).is_err());
    }

    #[test]
    fn test_compare_agrees() {
        let cnf = parse_text("1 2 0 -1 2 0 1 -2 0 -1 -2 0").unwrap();
        let common = CommonOptions {
            compare: true,
            ..CommonOptions::default()
        };
        assert!(solve_and_report(&cnf, &common, None, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_dir_summary() {
        let mut summary = DirSummary::default();
        assert_eq!(summary.mean(), None);

        summary.record(&Ok(true), Duration::from_millis(100));
        summary.record(&Ok(false), Duration::from_millis(300));
        summary.record(&Err(SolverError::Cancelled), Duration::from_secs(5));
        summary.record(&Err(SolverError::DepthExceeded { limit: 3 }), Duration::ZERO);
        summary.record_failure();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.solved, 2);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.mean(), Some(Duration::from_millis(200)));
        assert_eq!(summary.min(), Some(Duration::from_millis(100)));
        assert_eq!(summary.max(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(verdict_label(&Ok(true)), "SAT");
        assert_eq!(verdict_label(&Ok(false)), "UNSAT");
        assert_eq!(verdict_label(&Err(SolverError::Cancelled)), "TIMEOUT");
        assert_eq!(
            verdict_label(&Err(SolverError::ResourceExhausted {
                clauses: 9,
                limit: 4
            })),
            "LIMIT"
        );
    }
}
