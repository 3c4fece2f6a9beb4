#![cfg(test)]

use proptest::prelude::*;

use crate::config::{Config, Schedule};
use crate::error::{Result, RuntimeError};
use crate::fixtures;
use crate::runtime::{HaltReason, Net, Reducer, Rule, Step, Term, Tree};

fn run(net: Net, config: &Config) -> Result<(String, u64)> {
    let mut reducer = Reducer::new(net, config.clone());
    reducer.execute()?;
    Ok((reducer.net().render_root()?, reducer.steps()))
}

fn run_term(term: &Term, config: &Config) -> Result<(String, u64)> {
    let mut net = Net::new(config);
    net.load(term)?;
    run(net, config)
}

fn checked() -> Config {
    Config {
        verify_each_step: true,
        ..Config::default()
    }
}

#[test]
fn test_rule_closures_conserve_agents() -> Result<(), String> {
    for rule in Rule::ALL {
        let net = fixtures::rule_closure(rule, &checked()).map_err(|e| e.to_string())?;
        let mut reducer = Reducer::new(net, checked());
        loop {
            let before = reducer.net().agent_count();
            match reducer.step().map_err(|e| format!("{rule}: {e}"))? {
                Step::Reduced(fired) => {
                    let after = reducer.net().agent_count();
                    if after + 2 != before + fired.created() {
                        return Err(format!("{rule}: {fired} went from {before} to {after} agents"));
                    }
                }
                Step::Halted(reason) => {
                    assert_eq!(reason, HaltReason::Exhausted);
                    break;
                }
            }
        }
        if reducer.net().agent_count() != 0 {
            return Err(format!("{rule}: {} agents left", reducer.net().agent_count()));
        }
        if reducer.rewrites().count(rule) != 1 {
            return Err(format!("{rule} fired {} times", reducer.rewrites().count(rule)));
        }
    }
    Ok(())
}

#[test]
fn test_fork_app_end_to_end() {
    let net = fixtures::fork_app(&checked()).unwrap();
    let (output, steps) = run(net, &checked()).unwrap();
    assert_eq!(output, "t(t)(t(t)(t))");
    assert_eq!(steps, 6);
}

#[test]
fn test_readback_is_deterministic() {
    let first = run(fixtures::fork_app(&Config::default()).unwrap(), &Config::default());
    for _ in 0..3 {
        let again = run(fixtures::fork_app(&Config::default()).unwrap(), &Config::default());
        assert_eq!(first, again);
    }
}

#[test]
fn test_scenarios_under_every_layout() {
    let layouts = [
        Config::default(),
        Config {
            agent_block_size: 1,
            redex_block_size: 1,
            verify_each_step: true,
            ..Config::default()
        },
        Config {
            agent_block_size: 3,
            redex_block_size: 2,
            schedule: Schedule::Random { seed: 11 },
            verify_each_step: true,
            ..Config::default()
        },
    ];
    for config in &layouts {
        for scenario in fixtures::scenarios() {
            let net = scenario.build(config).unwrap();
            let (output, _) = run(net, config).unwrap();
            assert_eq!(output, scenario.expected, "{}", scenario.name);
        }
    }
}

#[test]
fn test_root_handle_survives_reduction() {
    let mut net = fixtures::fork_app(&Config::default()).unwrap();
    let root = net.handle(net.root().unwrap()).unwrap();
    let app = net.handle(net.follow(net.root().unwrap(), crate::runtime::Port::P0).unwrap().agent).unwrap();
    let mut reducer = Reducer::from(net);
    reducer.execute().unwrap();
    let net = reducer.into_net();
    assert_eq!(net.resolve(root).unwrap().slot(), 0);
    assert!(matches!(net.resolve(app), Err(RuntimeError::StaleHandle { .. })));
}

#[test]
fn test_agent_limit_is_out_of_memory() {
    let config = Config {
        agent_block_size: 8,
        max_agent_blocks: Some(1),
        ..Config::default()
    };
    let net = fixtures::fork_app(&config).unwrap();
    assert_eq!(net.agent_count(), 8);
    let mut reducer = Reducer::new(net, config);
    assert_eq!(
        reducer.execute(),
        Err(RuntimeError::OutOfMemory {
            arena: "agent",
            blocks: 1
        })
    );
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    Just(Tree::Leaf).prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Tree::stem),
            (inner.clone(), inner).prop_map(|(left, right)| Tree::fork(left, right)),
        ]
    })
}

fn arb_term() -> impl Strategy<Value = Term> {
    Just(Term::leaf()).prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..5)
            .prop_map(|args| args.into_iter().fold(Term::leaf(), Term::apply))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identity_returns_its_argument(tree in arb_tree()) {
        let mut net = Net::new(&checked());
        net.load(&fixtures::identity().apply(Term::from(&tree))).unwrap();
        let mut reducer = Reducer::new(net, checked());
        prop_assert_eq!(reducer.execute(), Ok(HaltReason::Exhausted));
        prop_assert_eq!(reducer.net().render_root().unwrap(), tree.to_string());
        prop_assert_eq!(reducer.net().agent_count(), 1 + tree.size());
        prop_assert_eq!(reducer.net().redex_count(), 0);
    }

    #[test]
    fn k_drops_its_second_argument(kept in arb_tree(), dropped in arb_tree()) {
        let term = fixtures::k().apply(Term::from(&kept)).apply(Term::from(&dropped));
        let (output, _) = run_term(&term, &Config::default()).unwrap();
        prop_assert_eq!(output, kept.to_string());
    }

    #[test]
    fn schedules_agree(term in arb_term(), seed in any::<u64>()) {
        let lifo = Config { max_steps: Some(20_000), ..Config::default() };
        // terms that do not normalize in time, or do not normalize to a tree, say nothing
        let Ok(expected) = run_term(&term, &lifo) else { return Ok(()) };
        let random = Config { schedule: Schedule::Random { seed }, ..lifo };
        prop_assert_eq!(run_term(&term, &random), Ok(expected));
    }

    #[test]
    fn wiring_stays_symmetric(term in arb_term(), seed in any::<u64>()) {
        let config = Config {
            agent_block_size: 4,
            redex_block_size: 2,
            schedule: Schedule::Random { seed },
            max_steps: Some(500),
            verify_each_step: true,
            ..Config::default()
        };
        let result = run_term(&term, &config);
        prop_assert!(
            !matches!(result, Err(RuntimeError::StructuralInvariantViolated(_))),
            "{:?}",
            result
        );
    }
}
