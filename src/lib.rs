#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Pattern-driven value generators for benchmark drivers.
//!
//! With `distbench`, a benchmark describes the values it needs with a short pattern string, such
//! as `"u(1,1000)"` for uniform integers or `"z(100000,0.99)"` for zipfian ranks, and gets back an
//! [`IntGenerator`] that any number of threads can draw from at the same time. The same patterns
//! drive a small stage runner that measures how fast each generator produces values.
//!
//! A few key design choices include:
//!
//! - Generators are shared, immutable values. Every draw takes entropy from the caller, so
//! threads never contend on a random number generator.
//! - The zipfian generator keeps its normalization constants consistent under concurrent draws,
//! and can follow a universe that grows while the benchmark is running.
//! - Configuration problems, from a malformed pattern to a bad stage option, are reported as an
//! [`Error`] before any value is generated.
//!
//! More detailed usage could be found in the module-level rustdocs:
//!
//! - [`mod@pattern`] for the pattern grammar of every family.
//! - [`mod@zipfian`] for the zipfian generator and its item count.
//! - [`mod@bench`] for the config format of a benchmark.
//! - [`cmdline()`] for the usage of the default command line interface.

pub mod bench;
mod cmdline;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod random;
pub mod status;
pub mod zipfian;

pub use cmdline::cmdline;
pub use error::{Error, Result};
pub use generator::IntGenerator;
pub use pattern::parse;

pub extern crate toml;
