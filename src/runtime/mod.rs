//! An interaction-net evaluator for tree calculus.
//!
//! [Interaction nets](https://en.wikipedia.org/wiki/Interaction_nets) represent a program as a
//! graph of *agents*. Every agent has one *principal port* and a fixed number of auxiliary
//! ports, and ports are joined pairwise by wires. Two agents joined through their principal
//! ports form a *redex*; reducing it replaces the pair by a small subgraph chosen by their
//! kinds. Computation is nothing more than reducing redexes until none are left.
//!
//! Values are trees built from three constructors: `L` (a leaf), `S` (a leaf with one
//! child) and `F` (a leaf with two children). Five operators consume them: `E` erases, `D`
//! duplicates, `A` applies, and `T` and `Q` are the intermediate states of an application
//! that is inspecting its function. The fifteen rules between them live in [`rules`].
//!
//! Agents and pending redexes live in two block-allocated stacks (see [`arena`]) owned by a
//! [`Net`]. Freeing an agent moves the topmost one into the hole, so both stacks stay dense,
//! at the price of repairing the moved agent's wires and redex entry. All of that is hidden
//! behind [`Net::connect`] and the [`Reducer`], which pops redexes, dispatches them and
//! frees the consumed pairs.
//!
//! Nets are usually built from a [`Term`] with [`Net::load`] and read back with
//! [`Net::readback`].

pub mod agent;
pub mod arena;
pub mod compiler;
pub mod net;
pub mod readback;
pub mod reducer;
pub mod rules;
pub mod show;
pub mod stats;

pub use agent::{AgentKind, AgentPtr, Handle, Port, Wire};
pub use compiler::Term;
pub use net::{ConnectMode, Net};
pub use readback::Tree;
pub use reducer::{HaltReason, Reducer, State, Step};
pub use rules::Rule;
pub use stats::Rewrites;
