//! Integer generators.
//!
//! [`IntGenerator`] is a closed set of families. A pattern is parsed once into one of them (see
//! [`crate::pattern`]), and every draw dispatches with a `match`.
//!
//! All draws take an `(idx, all)` pair that places the caller within a batch of `all` concurrent
//! drawers, `idx` being 1-based. [`IntGenerator::next`] is the same as `next_at(rng, 1, 1)`.

use crate::distribution::{BimodalDistribution, Distribution, NormalDistribution};
use crate::error::{Error, Result};
use crate::pattern::Family;
use crate::random::Entropy;
use crate::zipfian::ZipfianIntGenerator;

/// A configured generator of one family.
#[derive(Debug)]
pub enum IntGenerator {
    Uniform(UniformIntGenerator),
    Normal(NormalIntGenerator),
    Bimodal(BimodalIntGenerator),
    Zipfian(ZipfianIntGenerator),
}

impl IntGenerator {
    #[inline]
    pub fn next(&self, entropy: &mut (impl Entropy + ?Sized)) -> i64 {
        self.next_at(entropy, 1, 1)
    }

    /// Draw one value as the `idx`-th of `all` drawers.
    ///
    /// Only the uniform family uses the position, the others ignore it.
    pub fn next_at(&self, entropy: &mut (impl Entropy + ?Sized), idx: usize, all: usize) -> i64 {
        match self {
            IntGenerator::Uniform(g) => g.next_at(entropy, idx, all),
            IntGenerator::Normal(g) => g.next_at(entropy, idx, all),
            IntGenerator::Bimodal(g) => g.next_at(entropy, idx, all),
            IntGenerator::Zipfian(g) => g.next(entropy),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            IntGenerator::Uniform(_) => Family::Uniform,
            IntGenerator::Normal(_) => Family::Normal,
            IntGenerator::Bimodal(_) => Family::Bimodal,
            IntGenerator::Zipfian(_) => Family::Zipfian,
        }
    }

    /// Check that batches of `all` drawers can be served, so that [`Self::next_at`] will not
    /// panic for any `idx` in `1..=all`.
    pub fn check_batch(&self, all: usize) -> Result<()> {
        if all == 0 {
            return Err(Error::InvalidParameter(
                "batch size must be positive".to_string(),
            ));
        }
        if let IntGenerator::Uniform(g) = self {
            if (all as u64) > g.range() {
                return Err(Error::InvalidParameter(format!(
                    "batch size {} exceeds uniform range of {} values",
                    all,
                    g.range()
                )));
            }
        }
        Ok(())
    }
}

// {{{ uniform

/// Uniform integers in the inclusive range `[lower, upper]`.
///
/// With a batch of `all` drawers, the range is cut into `all` contiguous segments whose sizes
/// differ by at most one, and drawer `idx` only draws from segment `idx`. Together the drawers
/// cover the whole range without overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformIntGenerator {
    lower: i64,
    upper: i64,
    range: u64,
}

impl UniformIntGenerator {
    pub fn new(lower: i64, upper: i64) -> Result<Self> {
        if upper < lower {
            return Err(Error::InvalidParameter(format!(
                "uniform upper bound {} is less than lower bound {}",
                upper, lower
            )));
        }
        let range = (upper.wrapping_sub(lower) as u64)
            .checked_add(1)
            .ok_or_else(|| Error::InvalidParameter("uniform range is too wide".to_string()))?;
        Ok(Self {
            lower,
            upper,
            range,
        })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    /// Number of distinct values.
    pub fn range(&self) -> u64 {
        self.range
    }

    /// The `(offset, length)` of segment `idx` out of `all`, offsets relative to `lower`.
    fn segment(&self, idx: usize, all: usize) -> (u64, u64) {
        assert!(
            idx >= 1 && idx <= all,
            "batch index {} should be within 1..={}",
            idx,
            all
        );
        let (idx, all) = (idx as u64, all as u64);
        let base = self.range / all;
        let extra = self.range % all;
        let offset = base * (idx - 1) + (idx - 1).min(extra);
        let len = base + if idx <= extra { 1 } else { 0 };
        assert!(
            len > 0,
            "batch of {} is wider than the uniform range of {}",
            all,
            self.range
        );
        (offset, len)
    }

    pub fn next_at(&self, entropy: &mut (impl Entropy + ?Sized), idx: usize, all: usize) -> i64 {
        let (offset, len) = self.segment(idx, all);
        self.lower
            .wrapping_add((offset + entropy.next_below(len)) as i64)
    }
}

// }}} uniform

// {{{ normal

/// Normal reals truncated toward zero.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalIntGenerator {
    distribution: NormalDistribution,
}

impl NormalIntGenerator {
    pub fn new(mean: f64, std_deviation: f64) -> Result<Self> {
        let distribution = NormalDistribution::new(mean, std_deviation)?;
        Ok(Self { distribution })
    }

    pub fn distribution(&self) -> &NormalDistribution {
        &self.distribution
    }

    /// `idx` and `all` are accepted for interface uniformity and ignored.
    pub fn next_at(&self, entropy: &mut (impl Entropy + ?Sized), _idx: usize, _all: usize) -> i64 {
        self.distribution.generate(entropy) as i64
    }
}

// }}} normal

// {{{ bimodal

/// Bimodal reals truncated toward zero.
#[derive(Clone, Debug, PartialEq)]
pub struct BimodalIntGenerator {
    distribution: BimodalDistribution,
}

impl BimodalIntGenerator {
    pub fn new(
        mean1: f64,
        std_deviation1: f64,
        mean2: f64,
        std_deviation2: f64,
        coin_flip: f64,
    ) -> Result<Self> {
        let distribution =
            BimodalDistribution::new(mean1, std_deviation1, mean2, std_deviation2, coin_flip)?;
        Ok(Self { distribution })
    }

    pub fn distribution(&self) -> &BimodalDistribution {
        &self.distribution
    }

    /// `idx` and `all` are accepted for interface uniformity and ignored.
    pub fn next_at(&self, entropy: &mut (impl Entropy + ?Sized), _idx: usize, _all: usize) -> i64 {
        self.distribution.generate(entropy) as i64
    }
}

// }}} bimodal

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    #[test]
    fn uniform_whole_range() {
        let mut rng = rand::rng();
        let mut dist: HashMap<i64, u64> = HashMap::new();
        let g = IntGenerator::Uniform(UniformIntGenerator::new(-50, 49).unwrap());
        // 100 values, 1m gens so ~10k occurance ea.
        for _ in 0..1000000 {
            let v = g.next(&mut rng);
            assert!((-50..=49).contains(&v));
            *dist.entry(v).or_insert(0) += 1;
        }
        assert_eq!(dist.len(), 100);
        for c in dist.values() {
            assert!(*c < 11000 && *c > 9000, "count: {}", c);
        }
    }

    #[test]
    fn uniform_single_value() {
        let mut rng = rand::rng();
        let g = UniformIntGenerator::new(5, 5).unwrap();
        assert_eq!(g.range(), 1);
        for _ in 0..100 {
            assert_eq!(g.next_at(&mut rng, 1, 1), 5);
        }
    }

    #[test]
    fn uniform_wide_range_reaches_every_residue() {
        let mut rng = rand::rng();
        let g = UniformIntGenerator::new(0, 1 << 60).unwrap();
        let mut odd = 0u64;
        let mut not_multiple_of_128 = 0u64;
        for _ in 0..100000 {
            let v = g.next_at(&mut rng, 1, 1);
            assert!((0..=1 << 60).contains(&v));
            odd += (v & 1) as u64;
            if v % 128 != 0 {
                not_multiple_of_128 += 1;
            }
        }
        assert!(odd > 49000 && odd < 51000, "odd: {}", odd);
        assert!(not_multiple_of_128 > 99000, "{}", not_multiple_of_128);

        // the widest accepted range, offsets past i64::MAX wrap back into it
        let g = UniformIntGenerator::new(i64::MIN, i64::MAX - 1).unwrap();
        let mut positive = 0;
        for _ in 0..10000 {
            if g.next_at(&mut rng, 1, 1) >= 0 {
                positive += 1;
            }
        }
        assert!(positive > 4500 && positive < 5500, "positive: {}", positive);
    }

    #[test]
    fn uniform_invalid() {
        assert!(matches!(
            UniformIntGenerator::new(10, 1),
            Err(Error::InvalidParameter(_))
        ));
        assert!(UniformIntGenerator::new(i64::MIN, i64::MAX).is_err());
        assert!(UniformIntGenerator::new(i64::MIN, i64::MAX - 1).is_ok());
    }

    #[test]
    fn uniform_segments_partition() {
        // 10 values over 3 drawers: 4 + 3 + 3
        let g = UniformIntGenerator::new(1, 10).unwrap();
        assert_eq!(g.segment(1, 3), (0, 4));
        assert_eq!(g.segment(2, 3), (4, 3));
        assert_eq!(g.segment(3, 3), (7, 3));

        let mut rng = rand::rng();
        let mut seen: Vec<Vec<i64>> = vec![Vec::new(); 3];
        for idx in 1..=3 {
            for _ in 0..10000 {
                let v = g.next_at(&mut rng, idx, 3);
                if !seen[idx - 1].contains(&v) {
                    seen[idx - 1].push(v);
                }
            }
            seen[idx - 1].sort();
        }
        assert_eq!(seen[0], vec![1, 2, 3, 4]);
        assert_eq!(seen[1], vec![5, 6, 7]);
        assert_eq!(seen[2], vec![8, 9, 10]);
    }

    #[test]
    #[should_panic(expected = "should be within")]
    fn uniform_batch_index_zero() {
        let g = UniformIntGenerator::new(1, 10).unwrap();
        g.next_at(&mut rand::rng(), 0, 3);
    }

    #[test]
    #[should_panic(expected = "wider than the uniform range")]
    fn uniform_batch_too_wide() {
        let g = UniformIntGenerator::new(1, 3).unwrap();
        g.next_at(&mut rand::rng(), 4, 4);
    }

    #[test]
    fn check_batch() {
        let g = IntGenerator::Uniform(UniformIntGenerator::new(1, 3).unwrap());
        assert!(g.check_batch(3).is_ok());
        assert!(g.check_batch(4).is_err());
        assert!(g.check_batch(0).is_err());
        let g = IntGenerator::Normal(NormalIntGenerator::new(0.0, 1.0).unwrap());
        assert!(g.check_batch(1000).is_ok());
    }

    #[test]
    fn normal_truncates_toward_zero() {
        // mean 0: truncation maps (-1, 1) to 0, so 0 is about twice as common as +1 or -1
        let g = IntGenerator::Normal(NormalIntGenerator::new(0.0, 0.5).unwrap());
        let mut rng = rand::rng();
        let mut dist: HashMap<i64, u64> = HashMap::new();
        for _ in 0..1000000 {
            *dist.entry(g.next(&mut rng)).or_insert(0) += 1;
        }
        // P(|x| < 1) for sigma 0.5 is ~0.954
        let zero = dist[&0] as f64 / 1000000.0;
        assert!((zero - 0.954).abs() < 0.005, "zero: {}", zero);
        let pos = *dist.get(&1).unwrap_or(&0) as f64;
        let neg = *dist.get(&-1).unwrap_or(&0) as f64;
        assert!((pos - neg).abs() / (pos + neg) < 0.05, "pos {} neg {}", pos, neg);
    }

    #[test]
    fn normal_ignores_batch_position() {
        let g = IntGenerator::Normal(NormalIntGenerator::new(1000.0, 10.0).unwrap());
        let mut rng = rand::rng();
        let mut sum = 0i64;
        for _ in 0..100000 {
            sum += g.next_at(&mut rng, 7, 8);
        }
        // truncation shifts the mean down by ~0.5
        let mean = sum as f64 / 100000.0;
        assert!((mean - 999.5).abs() < 0.5, "mean: {}", mean);
    }

    #[test]
    fn bimodal_ignores_batch_position() {
        let g = IntGenerator::Bimodal(
            BimodalIntGenerator::new(100.0, 1.0, 10000.0, 1.0, 0.5).unwrap(),
        );
        let mut rng = rand::rng();
        let mut low = 0;
        for _ in 0..100000 {
            let v = g.next_at(&mut rng, 2, 2);
            assert!((90..110).contains(&v) || (9990..10010).contains(&v));
            if v < 5000 {
                low += 1;
            }
        }
        assert!(low > 48500 && low < 51500, "low: {}", low);
    }

    #[test]
    fn zipfian_dispatch() {
        let g = IntGenerator::Zipfian(ZipfianIntGenerator::new(1, 100, 0.99).unwrap());
        assert_eq!(g.family(), Family::Zipfian);
        let mut rng = rand::rng();
        for _ in 0..10000 {
            let v = g.next_at(&mut rng, 3, 4);
            assert!((1..=100).contains(&v));
        }
    }
}
