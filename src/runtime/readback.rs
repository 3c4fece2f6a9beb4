use std::fmt::Display;

use super::agent::{AgentKind, AgentPtr, Port};
use super::net::Net;
use crate::error::{Result, RuntimeError};

/// A value of the calculus in normal form: a leaf with zero, one or two children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tree {
    Leaf,
    Stem(Box<Tree>),
    Fork(Box<Tree>, Box<Tree>),
}

impl Tree {
    pub fn stem(child: Tree) -> Tree {
        Tree::Stem(Box::new(child))
    }

    pub fn fork(left: Tree, right: Tree) -> Tree {
        Tree::Fork(Box::new(left), Box::new(right))
    }

    /// Number of agents needed to hold the tree.
    pub fn size(&self) -> usize {
        match self {
            Tree::Leaf => 1,
            Tree::Stem(child) => 1 + child.size(),
            Tree::Fork(left, right) => 1 + left.size() + right.size(),
        }
    }

    fn write(&self, out: &mut String) {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || match self {
            Tree::Leaf => out.push('t'),
            Tree::Stem(child) => {
                out.push('t');
                if let Tree::Fork(..) = **child {
                    out.push('(');
                    child.write(out);
                    out.push(')');
                } else {
                    child.write(out);
                }
            }
            Tree::Fork(left, right) => {
                out.push_str("t(");
                left.write(out);
                out.push_str(")(");
                right.write(out);
                out.push(')');
            }
        })
    }
}

/// `t`, `t` followed by the child (parenthesized when it is a fork), or `t(left)(right)`.
impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

impl Net {
    /// Reads the value hanging off an agent. A `Halt` is transparent: it reads through its
    /// auxiliary port, or yields nothing if it has none.
    pub fn readback(&self, ptr: AgentPtr) -> Result<Option<Tree>> {
        let agent = self.agent(ptr)?;
        if agent.kind != AgentKind::Halt {
            return self.read_tree(ptr).map(Some);
        }
        if agent.arity == 0 {
            return Ok(None);
        }
        let wire = self.follow(ptr, Port::P0)?;
        self.read_tree(wire.agent).map(Some)
    }

    /// Renders the value under the root in slot 0. An empty net or a bare `Halt` render as
    /// the empty string.
    pub fn render_root(&self) -> Result<String> {
        let Some(root) = self.root() else {
            return Ok(String::new());
        };
        Ok(self
            .readback(root)?
            .map(|tree| tree.to_string())
            .unwrap_or_default())
    }

    fn read_tree(&self, ptr: AgentPtr) -> Result<Tree> {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
            let agent = self.agent(ptr)?;
            let child = |port| -> Result<Tree> { self.read_tree(self.follow(ptr, port)?.agent) };
            Ok(match agent.kind {
                AgentKind::Leaf => Tree::Leaf,
                AgentKind::Single => Tree::stem(child(Port::P0)?),
                AgentKind::Fork => Tree::fork(child(Port::P0)?, child(Port::P1)?),
                kind => return Err(RuntimeError::Unreadable(kind)),
            })
        })
    }
}
