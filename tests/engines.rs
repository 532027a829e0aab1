use classic_sat::sat::clause::Clause;
use classic_sat::sat::cnf::Cnf;
use classic_sat::sat::dimacs::parse_text;
use classic_sat::sat::dp::DavisPutnam;
use classic_sat::sat::dpll::Dpll;
use classic_sat::sat::observer::{Event, NoopObserver};
use classic_sat::sat::saturation::Saturation;
use classic_sat::sat::solver::{SolverType, Solver};
use classic_sat::sat::variable_selection::{Heuristic, JeroslowWang};

const HEURISTICS: [Heuristic; 3] = [
    Heuristic::First,
    Heuristic::JeroslowWang,
    Heuristic::MostFrequent,
];

fn cnf(raw: &[&[i32]]) -> Cnf {
    Cnf::new(raw.iter().map(|c| c.to_vec())).unwrap()
}

fn random_3cnf(rng: &mut fastrand::Rng, vars: i32, clauses: usize) -> Cnf {
    let raw: Vec<Vec<i32>> = (0..clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let var = rng.i32(1..=vars);
                    if rng.bool() { var } else { -var }
                })
                .collect()
        })
        .collect();
    Cnf::new(raw).unwrap()
}

/// Truth-table satisfiability, for formulas small enough to enumerate.
fn brute_force(cnf: &Cnf) -> bool {
    let vars = cnf.num_vars;
    assert!(vars <= 16);
    (0_u32..1 << vars).any(|mask| {
        cnf.iter().all(|clause| {
            clause.iter().any(|lit| {
                let value = mask & (1 << (lit.variable() - 1)) != 0;
                value == lit.polarity()
            })
        })
    })
}

/// Runs every engine and heuristic, checks every model, and returns the
/// common verdict.
fn agreed_verdict(formula: &Cnf) -> bool {
    let mut verdicts = Vec::new();
    for kind in SolverType::ALL {
        let heuristics: &[Heuristic] = if kind == SolverType::Dpll {
            &HEURISTICS
        } else {
            &[Heuristic::First]
        };
        for &heuristic in heuristics {
            let mut solver = kind.to_impl(formula.clone(), heuristic);
            solver.set_observer(Box::new(NoopObserver));
            let sat = solver.solve().unwrap();
            if let Some(model) = solver.solutions() {
                assert!(sat, "{kind}/{heuristic} returned a model for UNSAT");
                assert!(formula.verify(&model), "{kind}/{heuristic}: {model}\n{formula}");
            } else {
                assert!(
                    !sat || kind == SolverType::Resolution,
                    "{kind}/{heuristic} said SAT without a model"
                );
            }
            verdicts.push(sat);
        }
    }
    assert!(
        verdicts.windows(2).all(|w| w[0] == w[1]),
        "engines disagree on\n{formula}: {verdicts:?}"
    );
    verdicts[0]
}

#[test]
fn test_scenarios() {
    assert!(agreed_verdict(&cnf(&[&[1]])));
    assert!(!agreed_verdict(&cnf(&[&[1], &[-1]])));
    assert!(!agreed_verdict(&cnf(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]])));
    assert!(agreed_verdict(&cnf(&[&[1, 2, 3], &[-1, 2], &[-2, 3]])));
    assert!(agreed_verdict(&cnf(&[&[1, 2], &[1, -2]])));
}

#[test]
fn test_boundaries() {
    assert!(agreed_verdict(&Cnf::default()));
    assert!(!agreed_verdict(&Cnf::from_clauses(vec![Clause::empty()])));
    assert!(!agreed_verdict(&Cnf::from_clauses(vec![
        Clause::from_i32s([1, 2], 0).unwrap(),
        Clause::empty(),
    ])));
}

#[test]
fn test_tautologies_do_not_constrain() {
    assert!(agreed_verdict(&cnf(&[&[1, -1]])));
    assert!(agreed_verdict(&cnf(&[&[1, -1, 2], &[-2, 3], &[-2, -3]])));
    assert!(agreed_verdict(&cnf(&[&[1, -1], &[1, 2], &[-2]])));
    assert!(agreed_verdict(&cnf(&[&[2, -2, 1], &[1, 3], &[-1, -3], &[-3]])));
    assert!(!agreed_verdict(&cnf(&[
        &[1, -1],
        &[2, 3],
        &[-2, 3],
        &[2, -3],
        &[-2, -3]
    ])));
}

#[test]
fn test_random_3cnf_matches_truth_table() {
    let mut rng = fastrand::Rng::with_seed(0x3c4f);
    let (mut sat, mut unsat) = (0, 0);
    for _ in 0..150 {
        let vars = rng.i32(3..=5);
        let clauses = rng.usize(1..=24);
        let formula = random_3cnf(&mut rng, vars, clauses);
        let verdict = agreed_verdict(&formula);
        assert_eq!(verdict, brute_force(&formula), "{formula}");
        if verdict {
            sat += 1;
        } else {
            unsat += 1;
        }
    }
    // Both outcomes must be exercised for the comparison to mean anything.
    assert!(sat > 0 && unsat > 0, "sat={sat} unsat={unsat}");
}

#[test]
fn test_larger_random_instances_dpll_against_dp() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..20 {
        let formula = random_3cnf(&mut rng, 10, 43);

        let mut dpll = Dpll::<JeroslowWang>::new(formula.clone());
        let mut dp = DavisPutnam::new(formula.clone());
        let expected = brute_force(&formula);

        assert_eq!(dpll.solve().unwrap(), expected);
        assert_eq!(dp.solve().unwrap(), expected);
        if expected {
            assert!(formula.verify(&dpll.solutions().unwrap()));
            assert!(formula.verify(&dp.solutions().unwrap()));
        }
    }
}

#[test]
fn test_pigeonhole_three_into_two() {
    // p(i, j) = pigeon i in hole j, variable 2 * (i - 1) + j.
    let p = |i: i32, j: i32| 2 * (i - 1) + j;
    let mut raw: Vec<Vec<i32>> = (1..=3).map(|i| vec![p(i, 1), p(i, 2)]).collect();
    for j in 1..=2 {
        for a in 1..=3 {
            for b in a + 1..=3 {
                raw.push(vec![-p(a, j), -p(b, j)]);
            }
        }
    }
    let formula = Cnf::new(raw).unwrap();
    assert!(!agreed_verdict(&formula));
}

#[test]
fn test_saturation_round_sizes_never_shrink() {
    let formula = parse_text("p cnf 4 5\n1 2 0\n-1 3 0\n-3 4 0\n-2 -4 0\n2 -3 0\n").unwrap();
    let mut sizes = Vec::new();
    let mut observer = |event: &Event<'_>| {
        if let Event::RoundCompleted { clauses, .. } = event {
            sizes.push(*clauses);
        }
    };
    let mut solver = Saturation::new(formula.clone());
    let verdict = solver.solve_observed(&mut observer).unwrap();
    assert_eq!(verdict, brute_force(&formula));
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "{sizes:?}");
}

#[test]
fn test_solving_twice_gives_the_same_answer() {
    let formula = cnf(&[&[1, 2, 3], &[-1, 2], &[-2, 3]]);
    for kind in SolverType::ALL {
        let mut solver = kind.to_impl(formula.clone(), Heuristic::MostFrequent);
        let first = solver.solve().unwrap();
        let stats = solver.stats();
        assert_eq!(solver.solve().unwrap(), first, "{kind}");
        assert_eq!(solver.stats(), stats, "{kind}");
    }
}
