//! The fifteen interaction rules, one for every pairing of a value (`L`, `S`, `F`) with an
//! operator (`E`, `D`, `A`, `T`, `Q`).
//!
//! Each rule receives the two agents of a redex, allocates the agents that replace them and
//! rewires every auxiliary port of the pair onto the replacement. The pair itself is released
//! by the reducer once the rule returns, so a rule may keep reading the old ports through
//! [`ConnectMode`]'s follow modes while it rewires.
//!
//! In the comments below, `x`, `y`, `z` and `r` stand for whatever is on the far end of the
//! operator's auxiliary ports in order, and `m`, `n` for the far ends of the value's children.

use std::fmt::Display;

use super::agent::{AgentKind, AgentPtr, Constructor, Operator, Port, Role};
use super::net::{ConnectMode, Net};
use crate::error::{Result, RuntimeError};

use ConnectMode::{Direct, FollowBoth, FollowDst, FollowSrc};
use Port::{Main, P0, P1, P2, P3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    LeafErase,
    LeafDup,
    LeafApp,
    LeafTri,
    LeafQuad,
    SingleErase,
    SingleDup,
    SingleApp,
    SingleTri,
    SingleQuad,
    ForkErase,
    ForkDup,
    ForkApp,
    ForkTri,
    ForkQuad,
}

impl Rule {
    pub const COUNT: usize = 15;

    pub const ALL: [Rule; Rule::COUNT] = [
        Rule::LeafErase,
        Rule::LeafDup,
        Rule::LeafApp,
        Rule::LeafTri,
        Rule::LeafQuad,
        Rule::SingleErase,
        Rule::SingleDup,
        Rule::SingleApp,
        Rule::SingleTri,
        Rule::SingleQuad,
        Rule::ForkErase,
        Rule::ForkDup,
        Rule::ForkApp,
        Rule::ForkTri,
        Rule::ForkQuad,
    ];

    pub fn of(constructor: Constructor, operator: Operator) -> Rule {
        use Constructor as C;
        use Operator as O;
        match (constructor, operator) {
            (C::Leaf, O::Erase) => Rule::LeafErase,
            (C::Leaf, O::Dup) => Rule::LeafDup,
            (C::Leaf, O::App) => Rule::LeafApp,
            (C::Leaf, O::Tri) => Rule::LeafTri,
            (C::Leaf, O::Quad) => Rule::LeafQuad,
            (C::Single, O::Erase) => Rule::SingleErase,
            (C::Single, O::Dup) => Rule::SingleDup,
            (C::Single, O::App) => Rule::SingleApp,
            (C::Single, O::Tri) => Rule::SingleTri,
            (C::Single, O::Quad) => Rule::SingleQuad,
            (C::Fork, O::Erase) => Rule::ForkErase,
            (C::Fork, O::Dup) => Rule::ForkDup,
            (C::Fork, O::App) => Rule::ForkApp,
            (C::Fork, O::Tri) => Rule::ForkTri,
            (C::Fork, O::Quad) => Rule::ForkQuad,
        }
    }

    /// The rule for a stored redex, whose left agent must be the value.
    pub fn for_pair(left: AgentKind, right: AgentKind) -> Result<Rule> {
        match (left.role(), right.role()) {
            (Role::Constructor(c), Role::Operator(o)) => Ok(Rule::of(c, o)),
            _ => Err(RuntimeError::InvalidRedexOrdering { left, right }),
        }
    }

    pub fn constructor(self) -> Constructor {
        match self.index() / 5 {
            0 => Constructor::Leaf,
            1 => Constructor::Single,
            _ => Constructor::Fork,
        }
    }

    pub fn operator(self) -> Operator {
        match self.index() % 5 {
            0 => Operator::Erase,
            1 => Operator::Dup,
            2 => Operator::App,
            3 => Operator::Tri,
            _ => Operator::Quad,
        }
    }

    /// Position in [`Rule::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Agents allocated by the rule. Each interaction also releases two.
    pub fn created(self) -> usize {
        match self {
            Rule::LeafErase => 0,
            Rule::LeafDup => 2,
            Rule::LeafApp => 1,
            Rule::LeafTri => 1,
            Rule::LeafQuad => 2,
            Rule::SingleErase => 1,
            Rule::SingleDup => 3,
            Rule::SingleApp => 1,
            Rule::SingleTri => 4,
            Rule::SingleQuad => 3,
            Rule::ForkErase => 2,
            Rule::ForkDup => 4,
            Rule::ForkApp => 1,
            Rule::ForkTri => 1,
            Rule::ForkQuad => 4,
        }
    }

    pub fn name(self) -> String {
        format!(
            "{}-{}",
            AgentKind::from(self.constructor()).symbol(),
            AgentKind::from(self.operator()).symbol()
        )
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Net {
    /// Rewrites the redex `value >< op` according to `rule`. Neither agent is released here.
    pub(crate) fn interact(&mut self, rule: Rule, value: AgentPtr, op: AgentPtr) -> Result<()> {
        match rule {
            // L >< E: nothing is left
            Rule::LeafErase => Ok(()),
            Rule::LeafDup => self.leaf_dup(op),
            Rule::LeafApp => self.leaf_app(op),
            Rule::LeafTri => self.leaf_tri(op),
            Rule::LeafQuad => self.leaf_quad(op),
            Rule::SingleErase => self.single_erase(value),
            Rule::SingleDup => self.single_dup(value, op),
            Rule::SingleApp => self.single_app(value, op),
            Rule::SingleTri => self.single_tri(value, op),
            Rule::SingleQuad => self.single_quad(value, op),
            Rule::ForkErase => self.fork_erase(value),
            Rule::ForkDup => self.fork_dup(value, op),
            Rule::ForkApp => self.fork_app(value, op),
            Rule::ForkTri => self.fork_tri(value, op),
            Rule::ForkQuad => self.fork_quad(value, op),
        }
    }

    // L >< D(x, y): x gets a leaf, y gets a leaf
    fn leaf_dup(&mut self, op: AgentPtr) -> Result<()> {
        let l0 = self.new_agent(AgentKind::Leaf)?;
        let l1 = self.new_agent(AgentKind::Leaf)?;
        self.connect(l0, Main, op, P0, FollowDst)?;
        self.connect(l1, Main, op, P1, FollowDst)
    }

    // L >< A(x, r): r gets S(x)
    fn leaf_app(&mut self, op: AgentPtr) -> Result<()> {
        let s = self.new_agent(AgentKind::Single)?;
        self.connect(s, Main, op, P1, FollowDst)?;
        self.connect(s, P0, op, P0, FollowDst)
    }

    // L >< T(x, y, r): x goes to r, y is erased
    fn leaf_tri(&mut self, op: AgentPtr) -> Result<()> {
        let e = self.new_agent(AgentKind::Erase)?;
        self.connect(op, P1, e, Main, FollowSrc)?;
        self.connect(op, P0, op, P2, FollowBoth)
    }

    // L >< Q(x, y, z, r): x goes to r, y and z are erased
    fn leaf_quad(&mut self, op: AgentPtr) -> Result<()> {
        let e0 = self.new_agent(AgentKind::Erase)?;
        let e1 = self.new_agent(AgentKind::Erase)?;
        self.connect(op, P0, op, P3, FollowBoth)?;
        self.connect(op, P1, e0, Main, FollowSrc)?;
        self.connect(op, P2, e1, Main, FollowSrc)
    }

    // S(m) >< E: m is erased
    fn single_erase(&mut self, value: AgentPtr) -> Result<()> {
        let e = self.new_agent(AgentKind::Erase)?;
        self.connect(value, P0, e, Main, FollowSrc)
    }

    // S(m) >< D(x, y): m is duplicated into a and b, x gets S(a), y gets S(b)
    fn single_dup(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let d = self.new_agent(AgentKind::Dup)?;
        let s0 = self.new_agent(AgentKind::Single)?;
        let s1 = self.new_agent(AgentKind::Single)?;
        self.connect(d, P0, s0, P0, Direct)?;
        self.connect(d, P1, s1, P0, Direct)?;
        self.connect(value, P0, d, Main, FollowSrc)?;
        self.connect(s0, Main, op, P0, FollowDst)?;
        self.connect(s1, Main, op, P1, FollowDst)
    }

    // S(m) >< A(x, r): r gets F(m, x)
    fn single_app(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let f = self.new_agent(AgentKind::Fork)?;
        self.connect(f, P0, value, P0, FollowDst)?;
        self.connect(f, P1, op, P0, FollowDst)?;
        self.connect(f, Main, op, P1, FollowDst)
    }

    // S(m) >< T(x, y, r): y is duplicated into a and b, r gets m b (x a)
    fn single_tri(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let xa = self.new_agent(AgentKind::App)?;
        let outer = self.new_agent(AgentKind::App)?;
        let d = self.new_agent(AgentKind::Dup)?;
        let mb = self.new_agent(AgentKind::App)?;
        self.connect(xa, P0, d, P0, Direct)?;
        self.connect(xa, P1, outer, P0, Direct)?;
        self.connect(outer, Main, mb, P1, Direct)?;
        self.connect(d, P1, mb, P0, Direct)?;
        self.connect(op, P0, xa, Main, FollowSrc)?;
        self.connect(op, P2, outer, P1, FollowSrc)?;
        self.connect(op, P1, d, Main, FollowSrc)?;
        self.connect(value, P0, mb, Main, FollowSrc)
    }

    // S(m) >< Q(x, y, z, r): r gets y m, x and z are erased
    fn single_quad(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let a = self.new_agent(AgentKind::App)?;
        let e0 = self.new_agent(AgentKind::Erase)?;
        let e1 = self.new_agent(AgentKind::Erase)?;
        self.connect(a, P0, value, P0, FollowDst)?;
        self.connect(a, P1, op, P3, FollowDst)?;
        self.connect(op, P1, a, Main, FollowSrc)?;
        self.connect(op, P0, e0, Main, FollowSrc)?;
        self.connect(op, P2, e1, Main, FollowSrc)
    }

    // F(m, n) >< E: m and n are erased
    fn fork_erase(&mut self, value: AgentPtr) -> Result<()> {
        let e0 = self.new_agent(AgentKind::Erase)?;
        let e1 = self.new_agent(AgentKind::Erase)?;
        self.connect(value, P0, e0, Main, FollowSrc)?;
        self.connect(value, P1, e1, Main, FollowSrc)
    }

    // F(m, n) >< D(x, y): m into a and c, n into b and d, x gets F(a, b), y gets F(c, d)
    fn fork_dup(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let f0 = self.new_agent(AgentKind::Fork)?;
        let f1 = self.new_agent(AgentKind::Fork)?;
        let dm = self.new_agent(AgentKind::Dup)?;
        let dn = self.new_agent(AgentKind::Dup)?;
        self.connect(f0, P0, dm, P0, Direct)?;
        self.connect(f0, P1, dn, P0, Direct)?;
        self.connect(f1, P0, dm, P1, Direct)?;
        self.connect(f1, P1, dn, P1, Direct)?;
        self.connect(f0, Main, op, P0, FollowDst)?;
        self.connect(f1, Main, op, P1, FollowDst)?;
        self.connect(value, P0, dm, Main, FollowSrc)?;
        self.connect(value, P1, dn, Main, FollowSrc)
    }

    // F(m, n) >< A(x, r): m meets T(n, x, r)
    fn fork_app(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let t = self.new_agent(AgentKind::Tri)?;
        self.connect(t, P0, value, P1, FollowDst)?;
        self.connect(t, P1, op, P0, FollowDst)?;
        self.connect(t, P2, op, P1, FollowDst)?;
        self.connect(value, P0, t, Main, FollowSrc)
    }

    // F(m, n) >< T(x, y, r): y meets Q(m, n, x, r)
    fn fork_tri(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let q = self.new_agent(AgentKind::Quad)?;
        self.connect(q, P0, value, P0, FollowDst)?;
        self.connect(q, P1, value, P1, FollowDst)?;
        self.connect(q, P2, op, P0, FollowDst)?;
        self.connect(q, P3, op, P2, FollowDst)?;
        self.connect(op, P1, q, Main, FollowSrc)
    }

    // F(m, n) >< Q(x, y, z, r): r gets z m n, x and y are erased
    fn fork_quad(&mut self, value: AgentPtr, op: AgentPtr) -> Result<()> {
        let zm = self.new_agent(AgentKind::App)?;
        let zmn = self.new_agent(AgentKind::App)?;
        let e0 = self.new_agent(AgentKind::Erase)?;
        let e1 = self.new_agent(AgentKind::Erase)?;
        self.connect(zm, P1, zmn, Main, Direct)?;
        self.connect(zm, P0, value, P0, FollowDst)?;
        self.connect(zmn, P0, value, P1, FollowDst)?;
        self.connect(zmn, P1, op, P3, FollowDst)?;
        self.connect(op, P2, zm, Main, FollowSrc)?;
        self.connect(op, P0, e0, Main, FollowSrc)?;
        self.connect(op, P1, e1, Main, FollowSrc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total_and_ordered() {
        for (index, rule) in Rule::ALL.iter().enumerate() {
            assert_eq!(rule.index(), index);
            assert_eq!(Rule::of(rule.constructor(), rule.operator()), *rule);
        }
        assert_eq!(Rule::SingleTri.name(), "S-T");
        assert_eq!(Rule::ForkQuad.to_string(), "F-Q");
    }

    #[test]
    fn test_for_pair_requires_value_then_operator() {
        assert_eq!(
            Rule::for_pair(AgentKind::Fork, AgentKind::App),
            Ok(Rule::ForkApp)
        );
        assert_eq!(
            Rule::for_pair(AgentKind::App, AgentKind::Fork),
            Err(RuntimeError::InvalidRedexOrdering {
                left: AgentKind::App,
                right: AgentKind::Fork
            })
        );
        assert!(Rule::for_pair(AgentKind::Leaf, AgentKind::Halt).is_err());
        assert!(Rule::for_pair(AgentKind::Erase, AgentKind::Erase).is_err());
    }

    #[test]
    fn test_every_new_agent_is_fully_wired() {
        // every auxiliary port of the pair gets a sentinel stub
        for rule in Rule::ALL {
            let mut net = Net::default();
            let value = net.new_agent(rule.constructor().into()).unwrap();
            let op = net.new_agent(rule.operator().into()).unwrap();
            for agent in [value, op] {
                let arity = net.agent(agent).unwrap().arity as usize;
                for port in (0..arity).filter_map(Port::aux) {
                    let stub = net.new_halt(1).unwrap();
                    net.connect(agent, port, stub, P0, Direct).unwrap();
                }
            }
            net.connect(value, Main, op, Main, Direct).unwrap();
            let before = net.agent_count();
            let redex = net.take_redex(crate::runtime::agent::RedexPtr(0)).unwrap();
            net.interact(rule, redex.left, redex.right).unwrap();
            assert_eq!(net.agent_count(), before + rule.created(), "{rule}");
            for (ptr, agent) in net.agents().skip(before) {
                for port in agent.ports() {
                    assert!(agent.port(port).is_some(), "{rule}: {ptr}.{port} dangles");
                }
            }
            for (ptr, agent) in net.agents() {
                if agent.kind == AgentKind::Halt {
                    let wire = agent.port(P0).unwrap();
                    assert!(wire.agent != value && wire.agent != op, "{rule}: {ptr} still on the redex");
                }
            }
        }
    }
}
