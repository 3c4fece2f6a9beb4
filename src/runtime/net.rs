use tracing::trace;

use super::agent::{Agent, AgentKind, AgentPtr, Handle, Port, Redex, RedexPtr, RedexSlot, Role, Side, Wire};
use super::arena::BlockStack;
use crate::config::Config;
use crate::error::{corrupt, Result, RuntimeError};

/// How [`Net::connect`] resolves its two endpoints before wiring them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectMode {
    /// Wire the given ports themselves.
    Direct,
    /// Wire whatever is on the far end of the source port instead.
    FollowSrc,
    /// Wire whatever is on the far end of the destination port instead.
    FollowDst,
    FollowBoth,
}

impl ConnectMode {
    fn follows_src(self) -> bool {
        matches!(self, ConnectMode::FollowSrc | ConnectMode::FollowBoth)
    }

    fn follows_dst(self) -> bool {
        matches!(self, ConnectMode::FollowDst | ConnectMode::FollowBoth)
    }
}

/// An interaction net: the agent arena, the arena of pending redexes, and the operations
/// that keep the two consistent with each other.
///
/// Every wire is stored twice, once on each end. Whenever `a.p` holds `b.q`, `b.q` holds `a.p`.
/// Releasing an agent moves the topmost agent into its slot and rewrites everything that
/// pointed at the old slot: the far ends of its wires and its entry in the redex arena.
pub struct Net {
    agents: BlockStack<Agent>,
    redexes: BlockStack<Redex>,
}

impl Default for Net {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Net {
    pub fn new(config: &Config) -> Self {
        Self {
            agents: BlockStack::new("agent", config.agent_block_size, config.max_agent_blocks),
            redexes: BlockStack::new("redex", config.redex_block_size, config.max_redex_blocks),
        }
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn redex_count(&self) -> usize {
        self.redexes.len()
    }

    pub fn agent_blocks(&self) -> usize {
        self.agents.block_count()
    }

    pub fn redex_blocks(&self) -> usize {
        self.redexes.block_count()
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentPtr, &Agent)> + '_ {
        self.agents.iter().map(|(slot, agent)| (AgentPtr(slot), agent))
    }

    pub fn redexes(&self) -> impl Iterator<Item = (RedexPtr, &Redex)> + '_ {
        self.redexes.iter().map(|(slot, redex)| (RedexPtr(slot), redex))
    }

    /// The agent in slot 0, which by convention is the net's root.
    pub fn root(&self) -> Option<AgentPtr> {
        self.agents.get(0).map(|_| AgentPtr(0))
    }

    pub fn agent(&self, ptr: AgentPtr) -> Result<&Agent> {
        self.agents
            .get(ptr.0)
            .ok_or_else(|| corrupt!("agent {ptr} is past the top of the arena ({})", self.agents.len()))
    }

    fn agent_mut(&mut self, ptr: AgentPtr) -> Result<&mut Agent> {
        let len = self.agents.len();
        self.agents
            .get_mut(ptr.0)
            .ok_or_else(|| corrupt!("agent {ptr} is past the top of the arena ({len})"))
    }

    pub fn redex(&self, ptr: RedexPtr) -> Result<&Redex> {
        self.redexes
            .get(ptr.0)
            .ok_or_else(|| corrupt!("redex {} is past the top of the arena", ptr.0))
    }

    pub fn new_agent(&mut self, kind: AgentKind) -> Result<AgentPtr> {
        self.agents.push(Agent::new(kind, kind.arity())).map(AgentPtr)
    }

    /// A `Halt` sentinel with one auxiliary port (the usual output anchor) or none.
    pub fn new_halt(&mut self, arity: u8) -> Result<AgentPtr> {
        if arity > 1 {
            return Err(RuntimeError::InvalidArity {
                kind: AgentKind::Halt,
                arity,
            });
        }
        self.agents.push(Agent::new(AgentKind::Halt, arity)).map(AgentPtr)
    }

    pub fn handle(&self, ptr: AgentPtr) -> Result<Handle> {
        self.agent(ptr)?;
        let generation = self
            .agents
            .generation(ptr.0)
            .ok_or_else(|| corrupt!("agent {ptr} has no generation"))?;
        Ok(Handle { ptr, generation })
    }

    pub fn resolve(&self, handle: Handle) -> Result<AgentPtr> {
        let found = self.agents.generation(handle.ptr.0).unwrap_or(0);
        if self.agents.get(handle.ptr.0).is_none() || found != handle.generation {
            return Err(RuntimeError::StaleHandle {
                slot: handle.ptr.0,
                expected: handle.generation,
                found,
            });
        }
        Ok(handle.ptr)
    }

    /// What is on the far end of `agent.port`.
    pub fn follow(&self, agent: AgentPtr, port: Port) -> Result<Wire> {
        let record = self.agent(agent)?;
        if !record.has_port(port) {
            return Err(corrupt!("{} agent {agent} has no port {port}", record.kind));
        }
        record
            .port(port)
            .ok_or_else(|| corrupt!("port {agent}.{port} is not connected"))
    }

    /// Wires `a.pa` to `b.pb`, first replacing either side by its far end if `mode` says so.
    /// If both resolved ports are principal, the pair is pushed as a new redex.
    pub fn connect(
        &mut self,
        a: AgentPtr,
        pa: Port,
        b: AgentPtr,
        pb: Port,
        mode: ConnectMode,
    ) -> Result<()> {
        let src = if mode.follows_src() {
            self.follow(a, pa)?
        } else {
            Wire::new(a, pa)
        };
        let dst = if mode.follows_dst() {
            self.follow(b, pb)?
        } else {
            Wire::new(b, pb)
        };
        self.link(src, dst)?;
        if src.port.is_main() && dst.port.is_main() {
            self.push_redex(src.agent, dst.agent)?;
        }
        Ok(())
    }

    fn link(&mut self, src: Wire, dst: Wire) -> Result<()> {
        for end in [src, dst] {
            let record = self.agent(end.agent)?;
            if !record.has_port(end.port) {
                return Err(corrupt!("{} agent {} has no port {}", record.kind, end.agent, end.port));
            }
        }
        self.agent_mut(src.agent)?.ports[src.port.index()] = Some(dst);
        self.agent_mut(dst.agent)?.ports[dst.port.index()] = Some(src);
        Ok(())
    }

    fn push_redex(&mut self, a: AgentPtr, b: AgentPtr) -> Result<()> {
        let (left, right) = match (self.agent(a)?.kind.role(), self.agent(b)?.kind.role()) {
            (Role::Operator(_), Role::Constructor(_)) | (Role::Sentinel, _) => (b, a),
            _ => (a, b),
        };
        let slot = RedexPtr(self.redexes.push(Redex { left, right })?);
        self.agent_mut(left)?.redex = Some(RedexSlot {
            redex: slot,
            side: Side::Left,
        });
        self.agent_mut(right)?.redex = Some(RedexSlot {
            redex: slot,
            side: Side::Right,
        });
        Ok(())
    }

    /// Removes a pending redex, compacting the redex arena, and clears its agents'
    /// back-references.
    pub(crate) fn take_redex(&mut self, ptr: RedexPtr) -> Result<Redex> {
        let removed = self
            .redexes
            .swap_remove(ptr.0)
            .ok_or_else(|| corrupt!("redex {} is past the top of the arena", ptr.0))?;
        if let Some(from) = removed.moved_from {
            let moved = *self.redex(ptr)?;
            for (side, agent) in moved.sides() {
                let record = self.agent_mut(agent)?;
                if record.redex != Some(RedexSlot { redex: RedexPtr(from), side }) {
                    return Err(corrupt!("agent {agent} does not point back at redex {from}"));
                }
                record.redex = Some(RedexSlot { redex: ptr, side });
            }
        }
        for (_, agent) in removed.value.sides() {
            self.agent_mut(agent)?.redex = None;
        }
        Ok(removed.value)
    }

    /// Releases an agent. If the topmost agent was moved into its slot, every reference to the
    /// moved agent is retargeted and its old slot is returned.
    pub(crate) fn free_agent(&mut self, ptr: AgentPtr) -> Result<Option<AgentPtr>> {
        let removed = self
            .agents
            .swap_remove(ptr.0)
            .ok_or_else(|| corrupt!("cannot free agent {ptr}, it is past the top of the arena"))?;
        let Some(from) = removed.moved_from.map(AgentPtr) else {
            return Ok(None);
        };
        trace!("agent {from} moved to {ptr}");
        self.retarget(from, ptr)?;
        Ok(Some(from))
    }

    fn retarget(&mut self, old: AgentPtr, new: AgentPtr) -> Result<()> {
        let moved = *self.agent(new)?;
        for (port, wire) in moved.wires() {
            if wire.agent == old {
                self.agent_mut(new)?.ports[port.index()] = Some(Wire::new(new, wire.port));
                continue;
            }
            let neighbor = self.agent_mut(wire.agent)?;
            let back = &mut neighbor.ports[wire.port.index()];
            if *back != Some(Wire::new(old, port)) {
                return Err(corrupt!(
                    "{} does not point back at {old}.{port} while relocating it",
                    wire
                ));
            }
            *back = Some(Wire::new(new, port));
        }
        if let Some(RedexSlot { redex, side }) = moved.redex {
            let record = self
                .redexes
                .get_mut(redex.0)
                .ok_or_else(|| corrupt!("agent {old} points at missing redex {}", redex.0))?;
            if record.get(side) != old {
                return Err(corrupt!("redex {} does not hold agent {old}", redex.0));
            }
            record.set(side, new);
        }
        Ok(())
    }

    /// Checks every wire of one agent: ports in range, neighbors live, edges mirrored.
    pub fn check_agent(&self, ptr: AgentPtr) -> Result<()> {
        let agent = self.agent(ptr)?;
        for (index, wire) in agent.ports.iter().enumerate() {
            let Some(wire) = wire else { continue };
            let port = Port::aux(index).unwrap_or(Port::Main);
            if !agent.has_port(port) {
                return Err(corrupt!("{} agent {ptr} has a wire on missing port {port}", agent.kind));
            }
            let neighbor = self.agent(wire.agent)?;
            if neighbor.port(wire.port) != Some(Wire::new(ptr, port)) {
                return Err(corrupt!(
                    "{ptr}.{port} points at {wire}, which does not point back"
                ));
            }
        }
        Ok(())
    }

    /// Checks every structural invariant of the net.
    pub fn validate(&self) -> Result<()> {
        for (ptr, _) in self.agents() {
            self.check_agent(ptr)?;
        }
        for (ptr, redex) in self.redexes() {
            for (side, agent) in redex.sides() {
                let record = self.agent(agent)?;
                if record.redex != Some(RedexSlot { redex: ptr, side }) {
                    return Err(corrupt!(
                        "agent {agent} does not point back at redex {}",
                        ptr.0
                    ));
                }
            }
            if self.agent(redex.left)?.port(Port::Main) != Some(Wire::new(redex.right, Port::Main)) {
                return Err(corrupt!(
                    "redex {} joins {} and {}, whose principal ports are not connected",
                    ptr.0,
                    redex.left,
                    redex.right
                ));
            }
        }
        for (ptr, agent) in self.agents() {
            if let Some(RedexSlot { redex, side }) = agent.redex {
                if self.redex(redex)?.get(side) != ptr {
                    return Err(corrupt!("agent {ptr} points at redex {} which does not hold it", redex.0));
                }
            }
        }
        Ok(())
    }
}
