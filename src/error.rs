use miette::Diagnostic;
use thiserror::Error;

use crate::runtime::agent::AgentKind;

pub type Result<T, E = RuntimeError> = core::result::Result<T, E>;

/// Every fault the engine detects. All of them are terminal for the net they were raised on:
/// once a reducer reports one, the net may be half-rewritten and must be rebuilt from scratch.
#[derive(Clone, Debug, PartialEq, Eq, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("structural invariant violated: {0}")]
    #[diagnostic(code(treenet::structure))]
    StructuralInvariantViolated(String),

    #[error("cannot dispatch a redex between {left:?} and {right:?}")]
    #[diagnostic(
        code(treenet::dispatch),
        help("a redex must pair a Leaf, Single or Fork with an Erase, Dup, App, Tri or Quad")
    )]
    InvalidRedexOrdering { left: AgentKind, right: AgentKind },

    #[error("out of memory: the {arena} arena cannot grow past {blocks} blocks")]
    #[diagnostic(
        code(treenet::memory),
        help("raise `max_agent_blocks` / `max_redex_blocks` or leave them unbounded")
    )]
    OutOfMemory { arena: &'static str, blocks: usize },

    #[error("stale handle to slot {slot}: generation {expected}, found {found}")]
    #[diagnostic(code(treenet::handle))]
    StaleHandle {
        slot: usize,
        expected: u32,
        found: u32,
    },

    #[error("{kind:?} agents cannot have {arity} auxiliary ports")]
    #[diagnostic(code(treenet::arity))]
    InvalidArity { kind: AgentKind, arity: u8 },

    #[error("reduction did not halt within {0} steps")]
    #[diagnostic(code(treenet::step_limit))]
    StepLimitExceeded(u64),

    #[error("cannot read back a {0:?} agent as a tree")]
    #[diagnostic(
        code(treenet::readback),
        help("read-back only understands nets that reached normal form")
    )]
    Unreadable(AgentKind),

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(treenet::config))]
    InvalidConfig(String),
}

/// Shorthand for raising [`RuntimeError::StructuralInvariantViolated`].
macro_rules! corrupt {
    ($($arg:tt)*) => {
        $crate::error::RuntimeError::StructuralInvariantViolated(format!($($arg)*))
    };
}
pub(crate) use corrupt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_agents() {
        let err = RuntimeError::InvalidRedexOrdering {
            left: AgentKind::Erase,
            right: AgentKind::Leaf,
        };
        assert_eq!(
            err.to_string(),
            "cannot dispatch a redex between Erase and Leaf"
        );
        assert_eq!(
            corrupt!("slot {} is past the top", 7).to_string(),
            "structural invariant violated: slot 7 is past the top"
        );
    }
}
