use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::agent::{AgentKind, AgentPtr, RedexPtr};
use super::net::Net;
use super::rules::Rule;
use super::stats::Rewrites;
use crate::config::{Config, Schedule};
use crate::error::{Result, RuntimeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// No redex was left.
    Exhausted,
    /// The selected redex involves a `Halt` agent. It stays in the redex arena.
    Sentinel,
}

/// The outcome of a single [`Reducer::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Reduced(Rule),
    Halted(HaltReason),
}

enum Scheduler {
    Lifo,
    Random(StdRng),
}

impl Scheduler {
    fn new(schedule: Schedule) -> Self {
        match schedule {
            Schedule::Lifo => Scheduler::Lifo,
            Schedule::Random { seed } => Scheduler::Random(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&mut self, pending: usize) -> Option<RedexPtr> {
        if pending == 0 {
            return None;
        }
        Some(RedexPtr(match self {
            Scheduler::Lifo => pending - 1,
            Scheduler::Random(rng) => rng.gen_range(0..pending),
        }))
    }
}

/// Drives a [`Net`] to normal form, one interaction at a time.
pub struct Reducer {
    net: Net,
    config: Config,
    // set once halted; later steps report it again
    outcome: Option<Result<HaltReason>>,
    scheduler: Scheduler,
    steps: u64,
    rewrites: Rewrites,
}

impl Reducer {
    pub fn new(net: Net, config: Config) -> Self {
        let scheduler = Scheduler::new(config.schedule);
        let mut rewrites = Rewrites::default();
        rewrites.observe(net.agent_count(), net.redex_count());
        Self {
            net,
            config,
            outcome: None,
            scheduler,
            steps: 0,
            rewrites,
        }
    }

    pub fn from(net: Net) -> Self {
        Self::new(net, Config::default())
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn into_net(self) -> Net {
        self.net
    }

    pub fn state(&self) -> State {
        match self.outcome {
            None => State::Running,
            Some(_) => State::Halted,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn rewrites(&self) -> &Rewrites {
        &self.rewrites
    }

    /// Performs one interaction. Once halted, keeps reporting the same outcome without doing
    /// anything. An error halts the reducer as well and is returned again by every later
    /// step; the net is not usable afterwards.
    pub fn step(&mut self) -> Result<Step> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone().map(Step::Halted);
        }
        let result = self.try_step();
        match &result {
            Ok(Step::Reduced(_)) => {}
            Ok(Step::Halted(reason)) => self.outcome = Some(Ok(*reason)),
            Err(err) => self.outcome = Some(Err(err.clone())),
        }
        result
    }

    fn try_step(&mut self) -> Result<Step> {
        let Some(slot) = self.scheduler.pick(self.net.redex_count()) else {
            debug!(steps = self.steps, "no redex left");
            return Ok(Step::Halted(HaltReason::Exhausted));
        };

        let redex = *self.net.redex(slot)?;
        let left = self.net.agent(redex.left)?.kind;
        let right = self.net.agent(redex.right)?.kind;
        if left == AgentKind::Halt || right == AgentKind::Halt {
            debug!(steps = self.steps, "reached a halt sentinel");
            return Ok(Step::Halted(HaltReason::Sentinel));
        }
        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded(limit));
            }
        }
        let rule = Rule::for_pair(left, right)?;

        let redex = self.net.take_redex(slot)?;
        if self.config.check_redexes {
            self.net.check_agent(redex.left)?;
            self.net.check_agent(redex.right)?;
        }
        trace!("{rule}: {} ~ {}", redex.left, redex.right);
        self.net.interact(rule, redex.left, redex.right)?;
        self.release_pair(redex.left, redex.right)?;

        self.steps += 1;
        self.rewrites.record(rule);
        self.rewrites
            .observe(self.net.agent_count(), self.net.redex_count());
        if self.config.verify_each_step {
            self.net.validate()?;
        }
        trace!("{}", self.net);
        Ok(Step::Reduced(rule))
    }

    // higher slot first, so that releasing it never relocates the other one
    fn release_pair(&mut self, a: AgentPtr, b: AgentPtr) -> Result<()> {
        let (high, low) = if a > b { (a, b) } else { (b, a) };
        self.net.free_agent(high)?;
        self.net.free_agent(low)?;
        Ok(())
    }

    /// Steps until halted.
    pub fn execute(&mut self) -> Result<HaltReason> {
        let start = Instant::now();
        let outcome = loop {
            match self.step() {
                Ok(Step::Reduced(_)) => continue,
                Ok(Step::Halted(reason)) => break Ok(reason),
                Err(err) => break Err(err),
            }
        };
        self.rewrites.net_duration += start.elapsed();
        debug!(steps = self.steps, agents = self.net.agent_count(), "execution finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::agent::Port;
    use crate::runtime::net::ConnectMode::Direct;

    fn leaf_erase_pairs(count: usize) -> Net {
        let mut net = Net::default();
        for _ in 0..count {
            let l = net.new_agent(AgentKind::Leaf).unwrap();
            let e = net.new_agent(AgentKind::Erase).unwrap();
            net.connect(e, Port::Main, l, Port::Main, Direct).unwrap();
        }
        net
    }

    #[test]
    fn test_execute_consumes_every_pair() {
        let mut reducer = Reducer::from(leaf_erase_pairs(3));
        assert_eq!(reducer.execute(), Ok(HaltReason::Exhausted));
        assert_eq!(reducer.net().agent_count(), 0);
        assert_eq!(reducer.steps(), 3);
        assert_eq!(reducer.rewrites().count(Rule::LeafErase), 3);
        assert_eq!(reducer.state(), State::Halted);
        assert_eq!(reducer.step(), Ok(Step::Halted(HaltReason::Exhausted)));
    }

    #[test]
    fn test_halt_redex_is_left_in_place() {
        let mut net = leaf_erase_pairs(1);
        let halt = net.new_halt(0).unwrap();
        let l = net.new_agent(AgentKind::Leaf).unwrap();
        net.connect(halt, Port::Main, l, Port::Main, Direct).unwrap();
        let mut reducer = Reducer::from(net);
        assert_eq!(reducer.step(), Ok(Step::Halted(HaltReason::Sentinel)));
        assert_eq!(reducer.net().redex_count(), 2);
        assert_eq!(reducer.net().agent_count(), 4);
        assert_eq!(reducer.step(), Ok(Step::Halted(HaltReason::Sentinel)));
    }

    #[test]
    fn test_operator_pair_is_invalid_ordering() {
        let mut net = Net::default();
        let a = net.new_agent(AgentKind::Erase).unwrap();
        let b = net.new_agent(AgentKind::Erase).unwrap();
        net.connect(a, Port::Main, b, Port::Main, Direct).unwrap();
        let mut reducer = Reducer::from(net);
        assert_eq!(
            reducer.step(),
            Err(RuntimeError::InvalidRedexOrdering {
                left: AgentKind::Erase,
                right: AgentKind::Erase
            })
        );
        assert_eq!(reducer.state(), State::Halted);
        assert_eq!(
            reducer.step(),
            Err(RuntimeError::InvalidRedexOrdering {
                left: AgentKind::Erase,
                right: AgentKind::Erase
            })
        );
        assert_eq!(reducer.net().redex_count(), 1);
    }

    #[test]
    fn test_step_limit() {
        let config = Config {
            max_steps: Some(2),
            ..Config::default()
        };
        let mut reducer = Reducer::new(leaf_erase_pairs(3), config);
        assert_eq!(reducer.execute(), Err(RuntimeError::StepLimitExceeded(2)));
        assert_eq!(reducer.steps(), 2);
        assert_eq!(reducer.step(), Err(RuntimeError::StepLimitExceeded(2)));
    }

    #[test]
    fn test_step_limit_reached_exactly() {
        let config = Config {
            max_steps: Some(3),
            ..Config::default()
        };
        let mut reducer = Reducer::new(leaf_erase_pairs(3), config);
        assert_eq!(reducer.execute(), Ok(HaltReason::Exhausted));
        assert_eq!(reducer.steps(), 3);
        assert_eq!(reducer.net().redex_count(), 0);

        let config = Config {
            max_steps: Some(0),
            ..Config::default()
        };
        let mut net = leaf_erase_pairs(1);
        let halt = net.new_halt(0).unwrap();
        let l = net.new_agent(AgentKind::Leaf).unwrap();
        net.connect(halt, Port::Main, l, Port::Main, Direct).unwrap();
        let mut reducer = Reducer::new(net, config);
        assert_eq!(reducer.step(), Ok(Step::Halted(HaltReason::Sentinel)));
    }

    #[test]
    fn test_random_schedule_consumes_every_pair() {
        let config = Config {
            schedule: Schedule::Random { seed: 7 },
            verify_each_step: true,
            ..Config::default()
        };
        let mut reducer = Reducer::new(leaf_erase_pairs(20), config);
        assert_eq!(reducer.execute(), Ok(HaltReason::Exhausted));
        assert_eq!(reducer.net().agent_count(), 0);
    }
}
