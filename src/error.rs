//! Errors raised while building generators or benchmark stages.
//!
//! Sampling itself never fails: once a generator is constructed, every draw is pure computation
//! over caller-owned entropy. All errors therefore surface at configuration time, before any load
//! is generated.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A constructor argument is outside the domain of its distribution, e.g. a non-positive
    /// standard deviation or a coin flip outside `[0, 1]`.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A pattern string does not parse into any supported generator family, or it does but the
    /// arguments fail arity, type or domain checks. `pattern` is the raw input.
    #[error("illegal distribution pattern: {pattern} ({reason})")]
    Configuration { pattern: String, reason: String },

    /// The benchmark TOML could not be extracted.
    #[error("cannot load benchmark configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// A benchmark stage has options that cannot run together.
    #[error("invalid benchmark: {0}")]
    Benchmark(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn configuration(pattern: &str, reason: impl ToString) -> Self {
        Self::Configuration {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_carries_pattern() {
        let e = Error::configuration("n(5.0)", "expected 2 arguments, got 1");
        match &e {
            Error::Configuration { pattern, .. } => assert_eq!(pattern, "n(5.0)"),
            _ => panic!("unexpected error kind: {:?}", e),
        }
        let msg = e.to_string();
        assert!(msg.contains("n(5.0)"), "{}", msg);
        assert!(msg.contains("expected 2 arguments"), "{}", msg);
    }
}
