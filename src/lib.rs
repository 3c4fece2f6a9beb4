pub mod config;
pub mod error;
pub mod fixtures;
pub mod runtime;
pub mod test_runner;

#[cfg(test)]
mod test;

pub use config::{Config, Schedule};
pub use error::{Result, RuntimeError};
pub use runtime::{Net, Reducer, Term, Tree};
