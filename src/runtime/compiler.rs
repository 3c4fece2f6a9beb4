use super::agent::{AgentKind, AgentPtr, Port, Wire};
use super::net::{ConnectMode, Net};
use super::readback::Tree;
use crate::error::Result;

/// A term of the calculus: the leaf `t` applied to a list of arguments.
///
/// The first two arguments are the children of the value; every argument after that is an
/// application of the value to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Term {
    args: Vec<Term>,
}

impl Term {
    pub fn leaf() -> Term {
        Term::default()
    }

    pub fn stem(child: Term) -> Term {
        Term::leaf().apply(child)
    }

    pub fn fork(left: Term, right: Term) -> Term {
        Term::leaf().apply(left).apply(right)
    }

    pub fn apply(mut self, arg: Term) -> Term {
        self.args.push(arg);
        self
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// Number of applications, counting nested ones.
    pub fn applications(&self) -> usize {
        self.args.len().saturating_sub(2)
            + self.args.iter().map(Term::applications).sum::<usize>()
    }
}

impl From<&Tree> for Term {
    fn from(tree: &Tree) -> Self {
        match tree {
            Tree::Leaf => Term::leaf(),
            Tree::Stem(child) => Term::stem(child.as_ref().into()),
            Tree::Fork(left, right) => Term::fork(left.as_ref().into(), right.as_ref().into()),
        }
    }
}

impl From<Tree> for Term {
    fn from(tree: Tree) -> Self {
        Term::from(&tree)
    }
}

impl Net {
    /// Builds `term` into the net under a fresh `Halt` root and returns the root.
    ///
    /// On an empty net the root lands in slot 0, where nothing can ever relocate it, so
    /// [`Net::render_root`] reads the result once reduction halts.
    pub fn load(&mut self, term: &Term) -> Result<AgentPtr> {
        let root = self.new_halt(1)?;
        let result = self.emit(term)?;
        self.connect(root, Port::P0, result.agent, result.port, ConnectMode::Direct)?;
        Ok(root)
    }

    /// Emits `term` and returns the free port carrying its result.
    fn emit(&mut self, term: &Term) -> Result<Wire> {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
            let split = term.args.len().min(2);
            let (children, args) = term.args.split_at(split);
            let kind = match children.len() {
                0 => AgentKind::Leaf,
                1 => AgentKind::Single,
                _ => AgentKind::Fork,
            };
            let value = self.new_agent(kind)?;
            for (port, child) in Port::AUX.into_iter().zip(children) {
                let end = self.emit(child)?;
                self.connect(value, port, end.agent, end.port, ConnectMode::Direct)?;
            }

            let mut result = Wire::new(value, Port::Main);
            for arg in args {
                let app = self.new_agent(AgentKind::App)?;
                let end = self.emit(arg)?;
                self.connect(app, Port::P0, end.agent, end.port, ConnectMode::Direct)?;
                self.connect(result.agent, result.port, app, Port::Main, ConnectMode::Direct)?;
                result = Wire::new(app, Port::P1);
            }
            Ok(result)
        })
    }
}
