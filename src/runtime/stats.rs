use std::fmt::Write;
use std::time::Duration;

use super::rules::Rule;

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Rewrites {
    per_rule: [u64; Rule::COUNT],
    pub peak_agents: usize,
    pub peak_redexes: usize,
    pub net_duration: Duration,
}

impl core::ops::Add<Rewrites> for Rewrites {
    type Output = Rewrites;

    fn add(mut self, rhs: Rewrites) -> Self::Output {
        for (count, other) in self.per_rule.iter_mut().zip(rhs.per_rule) {
            *count += other;
        }
        self.peak_agents = self.peak_agents.max(rhs.peak_agents);
        self.peak_redexes = self.peak_redexes.max(rhs.peak_redexes);
        self.net_duration += rhs.net_duration;
        self
    }
}

impl Rewrites {
    pub(crate) fn record(&mut self, rule: Rule) {
        self.per_rule[rule.index()] += 1;
    }

    pub(crate) fn observe(&mut self, agents: usize, redexes: usize) {
        self.peak_agents = self.peak_agents.max(agents);
        self.peak_redexes = self.peak_redexes.max(redexes);
    }

    pub fn count(&self, rule: Rule) -> u64 {
        self.per_rule[rule.index()]
    }

    pub fn total(&self) -> u64 {
        self.per_rule.iter().sum()
    }

    pub fn show(&self, elapsed: Duration) -> String {
        let per_second = if self.net_duration.is_zero() {
            0
        } else {
            (self.total() as f64 / self.net_duration.as_secs_f64()) as u64
        };
        let mut out = String::new();
        for rule in Rule::ALL {
            let count = self.count(rule);
            if count > 0 {
                let _ = writeln!(out, "\t{rule}: {count}");
            }
        }
        let _ = write!(
            out,
            "\
            \tTotal reductions: {}\n\
            \tPeak agents: {}\n\
            \tPeak redexes: {}\n\
            \tTotal time (ms): {}\n\
            \tNet time (ms): {}\n\
            \tNet reductions per second: {}\n\
        ",
            self.total(),
            self.peak_agents,
            self.peak_redexes,
            elapsed.as_millis(),
            self.net_duration.as_millis(),
            per_second,
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_lists_only_rules_that_fired() {
        let mut rewrites = Rewrites::default();
        rewrites.record(Rule::ForkApp);
        rewrites.record(Rule::LeafErase);
        rewrites.record(Rule::LeafErase);
        let shown = rewrites.show(Duration::from_millis(3));
        assert!(shown.starts_with("\tL-E: 2\n\tF-A: 1\n"));
        assert!(shown.contains("\tTotal reductions: 3\n"));
        assert!(!shown.contains("S-T"));
    }

    #[test]
    fn test_add_sums_counts_and_keeps_peaks() {
        let mut a = Rewrites::default();
        a.record(Rule::SingleDup);
        a.observe(10, 2);
        let mut b = Rewrites::default();
        b.record(Rule::SingleDup);
        b.observe(4, 5);
        let sum = a + b;
        assert_eq!(sum.count(Rule::SingleDup), 2);
        assert_eq!((sum.peak_agents, sum.peak_redexes), (10, 5));
    }
}
