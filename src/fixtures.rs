//! Fixed nets used by `treenet check`, `treenet demo` and the tests.

use crate::config::Config;
use crate::error::Result;
use crate::runtime::agent::{AgentKind, AgentPtr, Constructor, Operator, Port};
use crate::runtime::net::ConnectMode::Direct;
use crate::runtime::{Net, Rule, Term};

/// The smallest net exercising `rule`: its value and operator joined principal to principal,
/// with leaves and erasers plugged into every auxiliary port. Reducing it must leave no
/// agent behind.
pub fn rule_closure(rule: Rule, config: &Config) -> Result<Net> {
    let mut net = Net::new(config);
    let value = net.new_agent(rule.constructor().into())?;
    let children = match rule.constructor() {
        Constructor::Leaf => 0,
        Constructor::Single => 1,
        Constructor::Fork => 2,
    };
    for port in Port::AUX.into_iter().take(children) {
        plug(&mut net, value, port, AgentKind::Leaf)?;
    }

    let op = net.new_agent(rule.operator().into())?;
    // the last auxiliary port of every operator but `E` is its output
    let plugs: &[AgentKind] = match rule.operator() {
        Operator::Erase => &[],
        Operator::Dup => &[AgentKind::Erase, AgentKind::Erase],
        Operator::App => &[AgentKind::Leaf, AgentKind::Erase],
        Operator::Tri => &[AgentKind::Leaf, AgentKind::Leaf, AgentKind::Erase],
        Operator::Quad => &[
            AgentKind::Leaf,
            AgentKind::Leaf,
            AgentKind::Leaf,
            AgentKind::Erase,
        ],
    };
    for (port, kind) in Port::AUX.into_iter().zip(plugs) {
        plug(&mut net, op, port, *kind)?;
    }

    net.connect(value, Port::Main, op, Port::Main, Direct)?;
    Ok(net)
}

fn plug(net: &mut Net, agent: AgentPtr, port: Port, kind: AgentKind) -> Result<()> {
    let stub = net.new_agent(kind)?;
    net.connect(stub, Port::Main, agent, port, Direct)
}

/// `F(S(L), S(L))` applied to `L`, wired by hand with the `Halt` root in slot 0.
pub fn fork_app(config: &Config) -> Result<Net> {
    let mut net = Net::new(config);
    let halt = net.new_halt(1)?;
    let app = net.new_agent(AgentKind::App)?;
    let fork = net.new_agent(AgentKind::Fork)?;
    for port in [Port::P0, Port::P1] {
        let single = net.new_agent(AgentKind::Single)?;
        plug(&mut net, single, Port::P0, AgentKind::Leaf)?;
        net.connect(fork, port, single, Port::Main, Direct)?;
    }
    net.connect(fork, Port::Main, app, Port::Main, Direct)?;
    plug(&mut net, app, Port::P0, AgentKind::Leaf)?;
    net.connect(app, Port::P1, halt, Port::P0, Direct)?;
    Ok(net)
}

/// `t t`, which ignores its second argument.
pub fn k() -> Term {
    Term::stem(Term::leaf())
}

/// `t (t K) K`, the identity.
pub fn identity() -> Term {
    Term::fork(Term::stem(k()), k())
}

pub struct Scenario {
    pub name: &'static str,
    pub about: &'static str,
    pub expected: &'static str,
    build: fn(&Config) -> Result<Net>,
}

impl Scenario {
    pub fn build(&self, config: &Config) -> Result<Net> {
        (self.build)(config)
    }
}

fn load(term: Term, config: &Config) -> Result<Net> {
    let mut net = Net::new(config);
    net.load(&term)?;
    Ok(net)
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "fork-app",
            about: "t(t t)(t t) applied to t, wired by hand",
            expected: "t(t)(t(t)(t))",
            build: fork_app,
        },
        Scenario {
            name: "k-rule",
            about: "t t t t",
            expected: "t",
            build: |config| {
                let term = Term::leaf()
                    .apply(Term::leaf())
                    .apply(Term::leaf())
                    .apply(Term::leaf());
                load(term, config)
            },
        },
        Scenario {
            name: "identity",
            about: "I (t t (t t))",
            expected: "t(t)(tt)",
            build: |config| {
                let arg = Term::fork(Term::leaf(), k());
                load(identity().apply(arg), config)
            },
        },
        Scenario {
            name: "drop-first",
            about: "t t I t (t (t t) t)",
            expected: "t(tt)(t)",
            build: |config| {
                let term = Term::leaf()
                    .apply(Term::leaf())
                    .apply(identity())
                    .apply(Term::leaf())
                    .apply(Term::fork(k(), Term::leaf()));
                load(term, config)
            },
        },
    ]
}

pub fn scenario(name: &str) -> Option<Scenario> {
    scenarios().into_iter().find(|scenario| scenario.name == name)
}
