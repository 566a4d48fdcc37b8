//! Textual generator patterns.
//!
//! A pattern is `<tag>(<args>)` where the one-letter tag selects a family and the arguments are
//! comma separated numbers:
//!
//! | Pattern | Family | Arguments |
//! |---|---|---|
//! | `u(lower,upper)` | uniform | inclusive integer bounds, `lower <= upper` |
//! | `n(mean,std)` | normal | `std > 0` |
//! | `b(mean1,std1,mean2,std2,coin)` | bimodal | `std1, std2 > 0`, `coin` in `[0, 1]` |
//! | `z(size[,skew])` | zipfian | `size > 0`, `skew > 0` and not 1, default [`ZIPFIAN_CONSTANT`] |
//!
//! A zipfian pattern draws from `[1, size]`. Whitespace around the pattern and around each
//! argument is ignored. Anything else after the closing `)` is rejected, so `n(1,2)x` is an error
//! rather than `n(1,2)`.
//!
//! Any failure, whether an unknown tag, a wrong number of arguments, a token that is not a number
//! or a value out of the family's domain, is reported as [`Error::Configuration`] with the
//! offending pattern.

use crate::error::{Error, Result};
use crate::generator::{BimodalIntGenerator, IntGenerator, NormalIntGenerator, UniformIntGenerator};
use crate::zipfian::{ZipfianIntGenerator, ZIPFIAN_CONSTANT};
use log::debug;
use std::fmt::Display;
use std::str::FromStr;

/// The supported generator families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Uniform,
    Normal,
    Bimodal,
    Zipfian,
}

impl Family {
    /// All families, in the order [`parse`] tries them.
    pub const ALL: [Family; 4] = [
        Family::Uniform,
        Family::Normal,
        Family::Bimodal,
        Family::Zipfian,
    ];

    pub fn tag(&self) -> char {
        match self {
            Family::Uniform => 'u',
            Family::Normal => 'n',
            Family::Bimodal => 'b',
            Family::Zipfian => 'z',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Uniform => "uniform",
            Family::Normal => "normal",
            Family::Bimodal => "bimodal",
            Family::Zipfian => "zipfian",
        }
    }

    pub fn grammar(&self) -> &'static str {
        match self {
            Family::Uniform => "u(lower,upper)",
            Family::Normal => "n(mean,stdDeviation)",
            Family::Bimodal => "b(mean1,stdDeviation1,mean2,stdDeviation2,coinFlip)",
            Family::Zipfian => "z(size[,skew])",
        }
    }

    /// Parse `pattern` as this family.
    ///
    /// Returns `Ok(None)` if the pattern does not start with this family's `<tag>(` prefix, so a
    /// caller can try the next family.
    pub fn parse(&self, pattern: &str) -> Result<Option<IntGenerator>> {
        let mut chars = pattern.chars();
        if chars.next() != Some(self.tag()) || chars.next() != Some('(') {
            return Ok(None);
        }
        let args = arguments(pattern)?;
        let generator = match self {
            Family::Uniform => {
                arity(pattern, &args, 2, 2)?;
                UniformIntGenerator::new(number(pattern, args[0])?, number(pattern, args[1])?)
                    .map(IntGenerator::Uniform)
            }
            Family::Normal => {
                arity(pattern, &args, 2, 2)?;
                NormalIntGenerator::new(number(pattern, args[0])?, number(pattern, args[1])?)
                    .map(IntGenerator::Normal)
            }
            Family::Bimodal => {
                arity(pattern, &args, 5, 5)?;
                BimodalIntGenerator::new(
                    number(pattern, args[0])?,
                    number(pattern, args[1])?,
                    number(pattern, args[2])?,
                    number(pattern, args[3])?,
                    number(pattern, args[4])?,
                )
                .map(IntGenerator::Bimodal)
            }
            Family::Zipfian => {
                arity(pattern, &args, 1, 2)?;
                let size: u64 = number(pattern, args[0])?;
                let skew: f64 = match args.get(1) {
                    Some(s) => number(pattern, s)?,
                    None => ZIPFIAN_CONSTANT,
                };
                ZipfianIntGenerator::new(1, size, skew).map(IntGenerator::Zipfian)
            }
        };
        match generator {
            Ok(g) => {
                debug!("Parsed pattern {} as {:?}", pattern, g);
                Ok(Some(g))
            }
            Err(e) => {
                debug!("Pattern {} rejected by the {} family: {}", pattern, self.name(), e);
                Err(Error::configuration(pattern, e))
            }
        }
    }
}

/// Parse a pattern of any supported family.
pub fn parse(pattern: &str) -> Result<IntGenerator> {
    let pattern = pattern.trim();
    for family in Family::ALL {
        if let Some(generator) = family.parse(pattern)? {
            return Ok(generator);
        }
    }
    Err(Error::configuration(pattern, "unknown distribution family"))
}

/// The comma separated, trimmed tokens strictly between the first `(` and the final `)`.
fn arguments(pattern: &str) -> Result<Vec<&str>> {
    let open = pattern.find('(');
    let close = pattern.rfind(')');
    match (open, close) {
        (Some(o), Some(c)) if c > o && c == pattern.len() - 1 => {
            Ok(pattern[o + 1..c].split(',').map(str::trim).collect())
        }
        (Some(o), Some(c)) if c > o => Err(Error::configuration(
            pattern,
            format!("unexpected '{}' after ')'", &pattern[c + 1..]),
        )),
        _ => Err(Error::configuration(pattern, "expected <tag>(<args>)")),
    }
}

fn arity(pattern: &str, args: &[&str], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(Error::configuration(
            pattern,
            format!("expected {} arguments, got {}", expected, args.len()),
        ));
    }
    Ok(())
}

fn number<T>(pattern: &str, token: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    token
        .parse::<T>()
        .map_err(|e| Error::configuration(pattern, format!("bad argument '{}': {}", token, e)))
}
