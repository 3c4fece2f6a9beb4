use colored::Colorize;
use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::RuntimeError;
use crate::fixtures::{self, Scenario};
use crate::runtime::{Reducer, Rule};

#[derive(Debug)]
pub enum TestStatus {
    Passed,
    Failed(String),
    Error(RuntimeError),
}

impl TestStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

impl Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed(msg) => write!(f, "failed: {msg}"),
            TestStatus::Error(err) => write!(f, "error: {err}"),
        }
    }
}

#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub duration: Duration,
    pub status: TestStatus,
}

const PASSED: &str = "✓";
const FAILED: &str = "✗";

/// Builds the closure net of `rule`, reduces it and expects nothing to be left.
pub fn check_rule(rule: Rule, config: &Config) -> TestResult {
    let start = Instant::now();
    let status = match fixtures::rule_closure(rule, config).and_then(|net| {
        let mut reducer = Reducer::new(net, config.clone());
        reducer.execute()?;
        Ok(reducer)
    }) {
        Ok(reducer) if reducer.net().agent_count() == 0 => TestStatus::Passed,
        Ok(reducer) => TestStatus::Failed(format!(
            "{} agents left after {} steps",
            reducer.net().agent_count(),
            reducer.steps()
        )),
        Err(err) => TestStatus::Error(err),
    };
    TestResult {
        name: rule.name(),
        duration: start.elapsed(),
        status,
    }
}

/// Reduces a scenario and compares its read-back with the expected text.
pub fn check_scenario(scenario: &Scenario, config: &Config) -> TestResult {
    let start = Instant::now();
    let status = match scenario.build(config).and_then(|net| {
        let mut reducer = Reducer::new(net, config.clone());
        reducer.execute()?;
        reducer.net().render_root()
    }) {
        Ok(output) if output == scenario.expected => TestStatus::Passed,
        Ok(output) => TestStatus::Failed(format!(
            "expected {}, got {}",
            scenario.expected, output
        )),
        Err(err) => TestStatus::Error(err),
    };
    TestResult {
        name: scenario.name.to_owned(),
        duration: start.elapsed(),
        status,
    }
}

/// Runs every rule closure and scenario whose name contains `filter`.
pub fn run_checks(config: &Config, filter: Option<&str>) -> bool {
    let selected = |name: &str| filter.map_or(true, |filter| name.contains(filter));

    println!("{}", "Running checks...".bright_blue());
    println!();

    let start_time = Instant::now();
    let groups = [
        (
            "rule closure",
            Rule::ALL
                .into_iter()
                .filter(|rule| selected(&rule.name()))
                .map(|rule| check_rule(rule, config))
                .collect::<Vec<_>>(),
        ),
        (
            "scenarios",
            fixtures::scenarios()
                .iter()
                .filter(|scenario| selected(scenario.name))
                .map(|scenario| check_scenario(scenario, config))
                .collect(),
        ),
    ];

    let mut failed = 0;
    for (group, results) in &groups {
        failed += print_group(group, results);
    }
    let total: usize = groups.iter().map(|(_, results)| results.len()).sum();
    println!();
    let line = summary(total, failed, start_time.elapsed());
    if failed == 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.red());
    }
    failed == 0
}

fn mark(passed: bool) -> colored::ColoredString {
    if passed {
        PASSED.green()
    } else {
        FAILED.red()
    }
}

/// Prints one group with a line per check and returns how many of them failed.
fn print_group(group: &str, results: &[TestResult]) -> usize {
    if results.is_empty() {
        return 0;
    }
    let failed = results.iter().filter(|r| !r.status.is_passed()).count();
    println!("{} {} {}", mark(failed == 0), group.bright_white(), format!("[{}]", results.len()).dimmed());
    for r in results {
        let passed = r.status.is_passed();
        let duration = format!("{:.3}s", r.duration.as_secs_f32()).dimmed();
        println!("  {} {:<12} {}", mark(passed), r.name, duration);
        if !passed {
            println!("    {}", r.status.to_string().red());
        }
    }
    failed
}

fn summary(total: usize, failed: usize, elapsed: Duration) -> String {
    let mut line = format!("{}/{} checks passed", total - failed, total);
    if failed > 0 {
        line += &format!(", {failed} failed");
    }
    line + &format!(" in {:.3}s", elapsed.as_secs_f32())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_closure_passes() {
        for rule in Rule::ALL {
            let result = check_rule(rule, &Config::default());
            assert!(result.status.is_passed(), "{}: {}", result.name, result.status);
        }
    }

    #[test]
    fn test_wrong_expectation_fails() {
        let mut scenario = fixtures::scenario("k-rule").unwrap();
        scenario.expected = "tt";
        let result = check_scenario(&scenario, &Config::default());
        assert_eq!(result.status.to_string(), "failed: expected tt, got t");
    }

    #[test]
    fn test_summary_counts_failures() {
        let elapsed = Duration::from_millis(1500);
        assert_eq!(summary(19, 0, elapsed), "19/19 checks passed in 1.500s");
        assert_eq!(summary(19, 2, elapsed), "17/19 checks passed, 2 failed in 1.500s");
    }
}
