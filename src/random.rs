//! Entropy plumbing shared by every generator.
//!
//! Generators never own a random source. Each worker thread owns its own RNG and lends it to the
//! generator on every draw, so random-bit generation is never a point of contention between
//! workers. Any [`rand::Rng`] can be lent, since [`Entropy`] is implemented for all of them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as _, StandardNormal};

/// The two primitives all distributions are built from.
pub trait Entropy {
    /// A uniformly distributed value in `[0, 1)`.
    fn next_uniform01(&mut self) -> f64;

    /// A standard normal value (mean 0, standard deviation 1).
    fn next_gaussian(&mut self) -> f64;

    /// A uniformly distributed integer in `[0, n)`. `n` must be positive.
    fn next_below(&mut self, n: u64) -> u64;
}

impl<R: Rng + ?Sized> Entropy for R {
    #[inline]
    fn next_uniform01(&mut self) -> f64 {
        self.random::<f64>()
    }

    #[inline]
    fn next_gaussian(&mut self) -> f64 {
        StandardNormal.sample(self)
    }

    #[inline]
    fn next_below(&mut self, n: u64) -> u64 {
        self.random_range(0..n)
    }
}

/// Create the RNG owned by worker `worker`.
///
/// With a seed, worker `i` is seeded with `seed + i` so that a run is reproducible per worker.
/// Without one, the RNG is seeded from the operating system.
pub fn worker_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(worker as u64)),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform01_in_range() {
        let mut rng = rand::rng();
        for _ in 0..100000 {
            let u = rng.next_uniform01();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = worker_rng(Some(7), 0);
        let n = 1000000;
        let mut sum = 0.0f64;
        let mut sq = 0.0f64;
        for _ in 0..n {
            let g = rng.next_gaussian();
            sum += g;
            sq += g * g;
        }
        let mean = sum / n as f64;
        let var = sq / n as f64 - mean * mean;
        assert!(mean.abs() < 0.01, "mean: {}", mean);
        assert!((var - 1.0).abs() < 0.01, "var: {}", var);
    }

    #[test]
    fn seeded_workers_are_reproducible() {
        let mut a = worker_rng(Some(42), 3);
        let mut b = worker_rng(Some(42), 3);
        let mut c = worker_rng(Some(42), 4);
        let xa: Vec<f64> = (0..10).map(|_| a.next_uniform01()).collect();
        let xb: Vec<f64> = (0..10).map(|_| b.next_uniform01()).collect();
        let xc: Vec<f64> = (0..10).map(|_| c.next_uniform01()).collect();
        assert_eq!(xa, xb);
        assert_ne!(xa, xc);
    }

    #[test]
    fn below_covers_low_bits() {
        let mut rng = worker_rng(Some(5), 0);
        let n = 1u64 << 60;
        let mut odd = 0;
        for _ in 0..10000 {
            let v = rng.next_below(n);
            assert!(v < n);
            odd += v & 1;
        }
        assert!(odd > 4500 && odd < 5500, "odd: {}", odd);
        for _ in 0..1000 {
            assert_eq!(rng.next_below(1), 0);
        }
    }

    #[test]
    fn dyn_rng_is_entropy() {
        let mut rng = rand::rng();
        let dynrng: &mut dyn rand::RngCore = &mut rng;
        let u = dynrng.next_uniform01();
        assert!((0.0..1.0).contains(&u));
    }
}
