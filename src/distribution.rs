//! Continuous distributions.
//!
//! A [`Distribution`] only holds immutable parameters and consumes entropy lent by the caller, so
//! every implementation here is `Send + Sync` and can be sampled concurrently without any
//! synchronization.

use crate::error::{Error, Result};
use crate::random::Entropy;

/// Produce one real-valued sample.
pub trait Distribution: Send + Sync {
    fn generate(&self, entropy: &mut (impl Entropy + ?Sized)) -> f64;
}

// {{{ uniform

/// Uniform reals in `[lower, upper)`.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformDistribution {
    lower: f64,
    upper: f64,
}

impl UniformDistribution {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "uniform bounds must be finite, got [{}, {})",
                lower, upper
            )));
        }
        if upper < lower {
            return Err(Error::InvalidParameter(format!(
                "uniform upper bound {} is less than lower bound {}",
                upper, lower
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }
}

impl Distribution for UniformDistribution {
    fn generate(&self, entropy: &mut (impl Entropy + ?Sized)) -> f64 {
        self.lower + entropy.next_uniform01() * (self.upper - self.lower)
    }
}

// }}} uniform

// {{{ normal

#[derive(Clone, Debug, PartialEq)]
pub struct NormalDistribution {
    mean: f64,
    std_deviation: f64,
}

impl NormalDistribution {
    pub fn new(mean: f64, std_deviation: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "mean must be finite, got {}",
                mean
            )));
        }
        // written as a negated comparison so that NaN is rejected too
        if !(std_deviation > 0.0) || !std_deviation.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "stdDeviation must be > 0, got {}",
                std_deviation
            )));
        }
        Ok(Self {
            mean,
            std_deviation,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_deviation(&self) -> f64 {
        self.std_deviation
    }
}

impl Distribution for NormalDistribution {
    #[inline]
    fn generate(&self, entropy: &mut (impl Entropy + ?Sized)) -> f64 {
        entropy.next_gaussian() * self.std_deviation + self.mean
    }
}

// }}} normal

// {{{ bimodal

/// A mixture of two normal distributions. Each draw first flips a weighted coin: with probability
/// `coin_flip` the value comes from the first mode, otherwise from the second.
#[derive(Clone, Debug, PartialEq)]
pub struct BimodalDistribution {
    first: NormalDistribution,
    second: NormalDistribution,
    coin_flip: f64,
}

impl BimodalDistribution {
    pub fn new(
        mean1: f64,
        std_deviation1: f64,
        mean2: f64,
        std_deviation2: f64,
        coin_flip: f64,
    ) -> Result<Self> {
        let first = NormalDistribution::new(mean1, std_deviation1)?;
        let second = NormalDistribution::new(mean2, std_deviation2)?;
        if !(0.0..=1.0).contains(&coin_flip) {
            return Err(Error::InvalidParameter(format!(
                "coinFlip must be in [0, 1], got {}",
                coin_flip
            )));
        }
        Ok(Self {
            first,
            second,
            coin_flip,
        })
    }

    pub fn first(&self) -> &NormalDistribution {
        &self.first
    }

    pub fn second(&self) -> &NormalDistribution {
        &self.second
    }

    pub fn coin_flip(&self) -> f64 {
        self.coin_flip
    }
}

impl Distribution for BimodalDistribution {
    fn generate(&self, entropy: &mut (impl Entropy + ?Sized)) -> f64 {
        let d = entropy.next_uniform01();
        if d <= self.coin_flip {
            self.first.generate(entropy)
        } else {
            self.second.generate(entropy)
        }
    }
}

// }}} bimodal

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::worker_rng;

    fn moments(dist: &impl Distribution, n: usize) -> (f64, f64) {
        let mut rng = rand::rng();
        let mut sum = 0.0f64;
        let mut sq = 0.0f64;
        for _ in 0..n {
            let v = dist.generate(&mut rng);
            sum += v;
            sq += v * v;
        }
        let mean = sum / n as f64;
        let std = (sq / n as f64 - mean * mean).sqrt();
        (mean, std)
    }

    #[test]
    fn uniform_bounds() {
        let dist = UniformDistribution::new(-3.0, 5.0).unwrap();
        let mut rng = rand::rng();
        for _ in 0..100000 {
            let v = dist.generate(&mut rng);
            assert!(v >= -3.0 && v < 5.0);
        }
        let (mean, _) = moments(&dist, 1000000);
        assert!((mean - 1.0).abs() < 0.02, "uniform mean: {}", mean);
    }

    #[test]
    fn uniform_invalid() {
        assert!(matches!(
            UniformDistribution::new(5.0, 1.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(UniformDistribution::new(f64::NEG_INFINITY, 1.0).is_err());
        // degenerate range is allowed and always yields the bound
        let dist = UniformDistribution::new(2.0, 2.0).unwrap();
        assert_eq!(dist.generate(&mut rand::rng()), 2.0);
    }

    #[test]
    fn normal_converges() {
        let dist = NormalDistribution::new(100.0, 15.0).unwrap();
        let (mean, std) = moments(&dist, 1000000);
        assert!((mean - 100.0).abs() < 2.0, "normal mean: {}", mean);
        assert!((std - 15.0).abs() < 0.3, "normal std: {}", std);
    }

    #[test]
    fn normal_invalid() {
        for std in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    NormalDistribution::new(1.0, std),
                    Err(Error::InvalidParameter(_))
                ),
                "std {} should be rejected",
                std
            );
        }
    }

    #[test]
    fn bimodal_converges() {
        let dist = BimodalDistribution::new(10.0, 1.0, 50.0, 2.0, 0.3).unwrap();
        // mixture mean: 0.3 * 10 + 0.7 * 50
        let (mean, std) = moments(&dist, 1000000);
        assert!((mean - 38.0).abs() < 0.38, "bimodal mean: {}", mean);
        // mixture variance: sum(w * (s^2 + m^2)) - mean^2
        let var = 0.3 * (1.0 + 100.0) + 0.7 * (4.0 + 2500.0) - 38.0 * 38.0;
        let expected = f64::sqrt(var);
        assert!(
            (std - expected).abs() < expected * 0.02,
            "bimodal std: {} expected {}",
            std,
            expected
        );
    }

    #[test]
    fn bimodal_mixing_ratio() {
        // modes far apart so that the branch of each draw is unambiguous
        let dist = BimodalDistribution::new(0.0, 1.0, 1000.0, 1.0, 0.25).unwrap();
        let mut rng = worker_rng(Some(1), 0);
        let n = 1000000;
        let mut first = 0usize;
        for _ in 0..n {
            if dist.generate(&mut rng) < 500.0 {
                first += 1;
            }
        }
        let ratio = first as f64 / n as f64;
        assert!((ratio - 0.25).abs() < 0.005, "ratio: {}", ratio);
    }

    #[test]
    fn bimodal_coin_flip_edges() {
        let mut rng = rand::rng();
        let all_first = BimodalDistribution::new(0.0, 1.0, 1000.0, 1.0, 1.0).unwrap();
        let all_second = BimodalDistribution::new(0.0, 1.0, 1000.0, 1.0, 0.0).unwrap();
        for _ in 0..10000 {
            assert!(all_first.generate(&mut rng) < 500.0);
            assert!(all_second.generate(&mut rng) > 500.0);
        }
    }

    #[test]
    fn bimodal_invalid() {
        assert!(BimodalDistribution::new(0.0, 0.0, 1.0, 1.0, 0.5).is_err());
        assert!(BimodalDistribution::new(0.0, 1.0, 1.0, -2.0, 0.5).is_err());
        assert!(BimodalDistribution::new(0.0, 1.0, 1.0, 1.0, 1.5).is_err());
        assert!(BimodalDistribution::new(0.0, 1.0, 1.0, 1.0, -0.1).is_err());
        assert!(BimodalDistribution::new(0.0, 1.0, 1.0, 1.0, f64::NAN).is_err());
    }
}
