//! Observational views of a [`Net`]: a plain-text arena dump for tracing and a serializable
//! snapshot for machine-readable dumps. Neither is needed for reduction.

use std::fmt::Display;

use serde::Serialize;

use super::agent::{Agent, AgentKind, AgentPtr, Port, Redex, RedexSlot, Wire};
use super::net::Net;

pub struct Showable<'a, P>(pub P, pub &'a Net);

impl<'a> Display for Showable<'a, (AgentPtr, &'a Agent)> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (ptr, agent) = self.0;
        write!(f, "{:>5}: {}", ptr.slot(), agent.kind)?;
        for port in agent.ports() {
            match agent.port(port) {
                Some(wire) => write!(f, " {port}->{}", Showable(wire, self.1))?,
                None => write!(f, " {port}->_")?,
            }
        }
        if let Some(RedexSlot { redex, .. }) = agent.redex() {
            write!(f, " [redex {}]", redex.slot())?;
        }
        Ok(())
    }
}

impl<'a> Display for Showable<'a, Wire> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.1.agent(self.0.agent) {
            Ok(agent) => write!(f, "{}{}", agent.kind, self.0),
            Err(_) => write!(f, "?{}", self.0),
        }
    }
}

impl<'a> Display for Showable<'a, &'a Redex> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let left = Wire::new(self.0.left, Port::Main);
        let right = Wire::new(self.0.right, Port::Main);
        write!(f, "{} ~ {}", Showable(left, self.1), Showable(right, self.1))
    }
}

impl Display for Net {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "agents ({} in {} blocks):",
            self.agent_count(),
            self.agent_blocks()
        )?;
        for entry in self.agents() {
            writeln!(f, "{}", Showable(entry, self))?;
        }
        writeln!(
            f,
            "redexes ({} in {} blocks):",
            self.redex_count(),
            self.redex_blocks()
        )?;
        for (ptr, redex) in self.redexes() {
            writeln!(f, "{:>5}: {}", ptr.slot(), Showable(redex, self))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentSnapshot {
    pub slot: usize,
    pub kind: AgentKind,
    pub ports: Vec<(Port, Option<Wire>)>,
    pub redex: Option<RedexSlot>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub agents: Vec<AgentSnapshot>,
    pub redexes: Vec<Redex>,
}

impl Net {
    pub fn snapshot(&self, step: u64) -> Snapshot {
        Snapshot {
            step,
            agents: self
                .agents()
                .map(|(ptr, agent)| AgentSnapshot {
                    slot: ptr.slot(),
                    kind: agent.kind,
                    ports: agent.ports().map(|port| (port, agent.port(port))).collect(),
                    redex: agent.redex(),
                })
                .collect(),
            redexes: self.redexes().map(|(_, redex)| *redex).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::net::ConnectMode::Direct;

    fn single_leaf() -> Net {
        let mut net = Net::default();
        let s = net.new_agent(AgentKind::Single).unwrap();
        let l = net.new_agent(AgentKind::Leaf).unwrap();
        let e = net.new_agent(AgentKind::Erase).unwrap();
        net.connect(s, Port::P0, l, Port::Main, Direct).unwrap();
        net.connect(e, Port::Main, s, Port::Main, Direct).unwrap();
        net
    }

    #[test]
    fn test_dump_lists_agents_and_redexes() {
        let shown = single_leaf().to_string();
        assert_eq!(
            shown,
            "agents (3 in 1 blocks):\n\
            \x20   0: S p0->L#1.main main->E#2.main [redex 0]\n\
            \x20   1: L main->S#0.p0\n\
            \x20   2: E main->S#0.main [redex 0]\n\
            redexes (1 in 1 blocks):\n\
            \x20   0: S#0.main ~ E#2.main\n"
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(single_leaf().snapshot(0)).unwrap();
        assert_eq!(json["agents"][0]["kind"], "Single");
        assert_eq!(json["agents"][1]["ports"][0][1]["agent"], 0);
        assert_eq!(json["agents"][1]["ports"][0][1]["port"], "P0");
        assert_eq!(json["redexes"][0]["left"], 0);
        assert_eq!(json["redexes"][0]["right"], 2);
    }
}
