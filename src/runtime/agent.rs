//! Agents, ports and redexes: the records stored in the two arenas of a [`Net`](super::net::Net).

use std::fmt::Display;

use serde::Serialize;

/// The nine agent kinds of the calculus.
///
/// `Leaf`, `Single` and `Fork` are values (constructors); `Erase`, `Dup`, `App`, `Tri`
/// and `Quad` consume values (operators); `Halt` is a sentinel placed by whoever builds
/// the net, usually as its output anchor. Rules never create or consume a `Halt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AgentKind {
    Leaf,
    Single,
    Fork,
    Erase,
    Dup,
    App,
    Tri,
    Quad,
    Halt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constructor {
    Leaf,
    Single,
    Fork,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Erase,
    Dup,
    App,
    Tri,
    Quad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Constructor(Constructor),
    Operator(Operator),
    Sentinel,
}

impl AgentKind {
    pub const ALL: [AgentKind; 9] = [
        AgentKind::Leaf,
        AgentKind::Single,
        AgentKind::Fork,
        AgentKind::Erase,
        AgentKind::Dup,
        AgentKind::App,
        AgentKind::Tri,
        AgentKind::Quad,
        AgentKind::Halt,
    ];

    /// Number of auxiliary ports. `Halt` may also be created with none, see
    /// [`Net::new_halt`](super::net::Net::new_halt).
    pub fn arity(self) -> u8 {
        match self {
            AgentKind::Leaf | AgentKind::Erase => 0,
            AgentKind::Single | AgentKind::Halt => 1,
            AgentKind::Fork | AgentKind::Dup | AgentKind::App => 2,
            AgentKind::Tri => 3,
            AgentKind::Quad => 4,
        }
    }

    pub fn role(self) -> Role {
        match self {
            AgentKind::Leaf => Role::Constructor(Constructor::Leaf),
            AgentKind::Single => Role::Constructor(Constructor::Single),
            AgentKind::Fork => Role::Constructor(Constructor::Fork),
            AgentKind::Erase => Role::Operator(Operator::Erase),
            AgentKind::Dup => Role::Operator(Operator::Dup),
            AgentKind::App => Role::Operator(Operator::App),
            AgentKind::Tri => Role::Operator(Operator::Tri),
            AgentKind::Quad => Role::Operator(Operator::Quad),
            AgentKind::Halt => Role::Sentinel,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            AgentKind::Leaf => 'L',
            AgentKind::Single => 'S',
            AgentKind::Fork => 'F',
            AgentKind::Erase => 'E',
            AgentKind::Dup => 'D',
            AgentKind::App => 'A',
            AgentKind::Tri => 'T',
            AgentKind::Quad => 'Q',
            AgentKind::Halt => 'I',
        }
    }
}

impl From<Constructor> for AgentKind {
    fn from(value: Constructor) -> Self {
        match value {
            Constructor::Leaf => AgentKind::Leaf,
            Constructor::Single => AgentKind::Single,
            Constructor::Fork => AgentKind::Fork,
        }
    }
}

impl From<Operator> for AgentKind {
    fn from(value: Operator) -> Self {
        match value {
            Operator::Erase => AgentKind::Erase,
            Operator::Dup => AgentKind::Dup,
            Operator::App => AgentKind::App,
            Operator::Tri => AgentKind::Tri,
            Operator::Quad => AgentKind::Quad,
        }
    }
}

impl Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A port slot. Auxiliary ports are `P0..P3`, the principal port lives in slot 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Port {
    P0,
    P1,
    P2,
    P3,
    Main,
}

impl Port {
    pub const COUNT: usize = 5;
    pub const AUX: [Port; 4] = [Port::P0, Port::P1, Port::P2, Port::P3];

    pub fn index(self) -> usize {
        match self {
            Port::P0 => 0,
            Port::P1 => 1,
            Port::P2 => 2,
            Port::P3 => 3,
            Port::Main => 4,
        }
    }

    pub fn aux(index: usize) -> Option<Port> {
        Self::AUX.get(index).copied()
    }

    pub fn is_main(self) -> bool {
        self == Port::Main
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Port::Main => write!(f, "main"),
            aux => write!(f, "p{}", aux.index()),
        }
    }
}

/// Index of an agent in the agent arena. Only meaningful until the next release:
/// compaction may move a different record into a freed slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AgentPtr(pub(crate) usize);

impl AgentPtr {
    pub fn slot(self) -> usize {
        self.0
    }
}

impl Display for AgentPtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RedexPtr(pub(crate) usize);

impl RedexPtr {
    pub fn slot(self) -> usize {
        self.0
    }
}

/// A generational agent reference that survives compaction detection: resolving it
/// after its slot was released or overwritten fails with `StaleHandle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub(crate) ptr: AgentPtr,
    pub(crate) generation: u32,
}

/// One end of a wire: an agent and one of its ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Wire {
    pub agent: AgentPtr,
    pub port: Port,
}

impl Wire {
    pub fn new(agent: AgentPtr, port: Port) -> Self {
        Self { agent, port }
    }
}

impl Display for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.agent, self.port)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// Where an agent is recorded in the redex arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RedexSlot {
    pub redex: RedexPtr,
    pub side: Side,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agent {
    pub kind: AgentKind,
    pub arity: u8,
    pub(crate) ports: [Option<Wire>; Port::COUNT],
    pub(crate) redex: Option<RedexSlot>,
}

impl Agent {
    pub(crate) fn new(kind: AgentKind, arity: u8) -> Self {
        Self {
            kind,
            arity,
            ports: [None; Port::COUNT],
            redex: None,
        }
    }

    pub fn port(&self, port: Port) -> Option<Wire> {
        self.ports[port.index()]
    }

    pub fn has_port(&self, port: Port) -> bool {
        port.is_main() || port.index() < self.arity as usize
    }

    /// The auxiliary ports followed by the principal port.
    pub fn ports(&self) -> impl Iterator<Item = Port> {
        (0..self.arity as usize)
            .filter_map(Port::aux)
            .chain(std::iter::once(Port::Main))
    }

    pub fn wires(&self) -> impl Iterator<Item = (Port, Wire)> + '_ {
        self.ports()
            .filter_map(|port| self.port(port).map(|wire| (port, wire)))
    }

    pub fn redex(&self) -> Option<RedexSlot> {
        self.redex
    }
}

/// A pending interaction. After normalization `left` is the constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Redex {
    pub left: AgentPtr,
    pub right: AgentPtr,
}

impl Redex {
    pub fn get(&self, side: Side) -> AgentPtr {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set(&mut self, side: Side, agent: AgentPtr) {
        match side {
            Side::Left => self.left = agent,
            Side::Right => self.right = agent,
        }
    }

    pub fn sides(&self) -> [(Side, AgentPtr); 2] {
        [(Side::Left, self.left), (Side::Right, self.right)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arities() {
        let arities: Vec<u8> = AgentKind::ALL.iter().map(|kind| kind.arity()).collect();
        assert_eq!(arities, vec![0, 1, 2, 0, 2, 2, 3, 4, 1]);
    }

    #[test]
    fn test_ports_end_with_main() {
        let agent = Agent::new(AgentKind::Tri, 3);
        let ports: Vec<Port> = agent.ports().collect();
        assert_eq!(ports, vec![Port::P0, Port::P1, Port::P2, Port::Main]);
        assert!(!agent.has_port(Port::P3));
        assert_eq!(Port::Main.index(), 4);
    }

    #[test]
    fn test_roles() {
        assert_eq!(AgentKind::Fork.role(), Role::Constructor(Constructor::Fork));
        assert_eq!(AgentKind::Quad.role(), Role::Operator(Operator::Quad));
        assert_eq!(AgentKind::Halt.role(), Role::Sentinel);
        assert_eq!(AgentKind::from(Operator::Dup), AgentKind::Dup);
    }
}
