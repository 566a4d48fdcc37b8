//! Zipfian integer generator with a runtime-adjustable item count.
//!
//! This is the rejection-free inverse-transform approximation from Gray et al., "Quickly
//! Generating Billion-Record Synthetic Databases" (SIGMOD '94), as popularized by YCSB. Rank `k`
//! (0-based, relative to `base`) is drawn with probability proportional to `1 / (k + 1)^theta`.
//!
//! ## Normalization
//!
//! Sampling needs `zetan = zeta(n, theta)` for the current item count `n`. Computing it is `O(n)`,
//! so the generator caches it together with `eta` and the count it was computed for. When a caller
//! asks for a larger count the cached sum is extended in place (`O(delta)`). When a caller asks for
//! a smaller count, the sum is recomputed from scratch only if
//! [`ZipfianIntGenerator::allow_item_count_decrease`] was enabled. Otherwise the stale, larger
//! normalization is used as is.
//!
//! ## Concurrency
//!
//! One generator is shared by every worker of a stage. The cached triple `(count_for_zeta, zetan,
//! eta)` is published as a single immutable [`Normalization`] through an [`ArcSwap`]. A draw whose
//! item count matches the published count only loads the current triple and compares, with no
//! lock taken. A mismatching draw takes the recompute [`Mutex`], re-checks (another worker may have
//! done the work already), then recomputes and publishes a whole new triple. A draw therefore
//! never observes `zetan` and `eta` from two different counts.

use crate::error::{Error, Result};
use crate::random::Entropy;
use log::{trace, warn};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The skew used when a pattern does not specify one.
pub const ZIPFIAN_CONSTANT: f64 = 0.99;

/// `initial_sum + sum_{i = st}^{n - 1} 1 / (i + 1)^theta`.
///
/// Terms are always added in increasing `i`, so extending a previous result with
/// `zeta(old_n, new_n, theta, previous)` yields exactly the same value as `zeta(0, new_n, theta, 0)`.
pub fn zeta(st: u64, n: u64, theta: f64, initial_sum: f64) -> f64 {
    let mut sum = initial_sum;
    for i in st..n {
        sum += 1.0 / ((i + 1) as f64).powf(theta);
    }
    sum
}

/// The normalization constants valid for exactly one item count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    /// The item count `zetan` and `eta` were computed for.
    pub count_for_zeta: u64,
    pub zetan: f64,
    pub eta: f64,
}

#[derive(Debug)]
pub struct ZipfianIntGenerator {
    /// Smallest value that can be generated.
    base: i64,
    /// Item count at construction, used by [`Self::next`] and in the closed form.
    items: u64,
    theta: f64,
    alpha: f64,
    zeta2theta: f64,
    half_pow_theta: f64,
    allow_item_count_decrease: bool,
    norm: ArcSwap<Normalization>,
    /// Serializes recomputes, draws never take it on a matching count.
    recompute: Mutex<()>,
    stale_warned: AtomicBool,
}

impl ZipfianIntGenerator {
    /// Create a generator over `[base, base + items - 1]` with skew `theta`.
    ///
    /// `theta` must be positive, finite and different from 1 (where `alpha = 1 / (1 - theta)` is
    /// undefined).
    pub fn new(base: i64, items: u64, theta: f64) -> Result<Self> {
        if items == 0 {
            return Err(Error::InvalidParameter(
                "zipfian size must be > 0".to_string(),
            ));
        }
        if !(theta > 0.0) || !theta.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "zipfian skew must be > 0, got {}",
                theta
            )));
        }
        if theta == 1.0 {
            return Err(Error::InvalidParameter(
                "zipfian skew must not be 1".to_string(),
            ));
        }
        let zeta2theta = zeta(0, 2, theta, 0.0);
        let zetan = zeta(0, items, theta, 0.0);
        let generator = Self {
            base,
            items,
            theta,
            alpha: 1.0 / (1.0 - theta),
            zeta2theta,
            half_pow_theta: 0.5f64.powf(theta),
            allow_item_count_decrease: false,
            norm: ArcSwap::from_pointee(Normalization {
                count_for_zeta: items,
                zetan,
                eta: 0.0,
            }),
            recompute: Mutex::new(()),
            stale_warned: AtomicBool::new(false),
        };
        let eta = generator.eta(zetan);
        generator.norm.store(Arc::new(Normalization {
            count_for_zeta: items,
            zetan,
            eta,
        }));
        Ok(generator)
    }

    /// Whether a request for fewer items than the cached count triggers a from-scratch recompute
    /// (`true`) or is served with the stale normalization (`false`, the default).
    pub fn allow_item_count_decrease(mut self, allow: bool) -> Self {
        self.allow_item_count_decrease = allow;
        self
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn allows_item_count_decrease(&self) -> bool {
        self.allow_item_count_decrease
    }

    /// A consistent copy of the cached normalization.
    pub fn normalization(&self) -> Normalization {
        **self.norm.load()
    }

    /// Draw with the construction-time item count.
    #[inline]
    pub fn next(&self, entropy: &mut (impl Entropy + ?Sized)) -> i64 {
        self.next_with_item_count(entropy, self.items)
    }

    /// Draw after bringing the normalization up to date with `itemcount`.
    pub fn next_with_item_count(&self, entropy: &mut (impl Entropy + ?Sized), itemcount: u64) -> i64 {
        let norm = self.normalization_for(itemcount);
        self.sample_with(entropy.next_uniform01(), &norm)
    }

    /// The closed form itself: map one uniform `u` in `[0, 1)` to a value using `norm`.
    pub fn sample_with(&self, u: f64, norm: &Normalization) -> i64 {
        let uz = u * norm.zetan;
        if uz < 1.0 {
            return self.base;
        }
        if uz < 1.0 + self.half_pow_theta {
            return self.base + 1;
        }
        let rank = (self.items as f64 * (norm.eta * u - norm.eta + 1.0).powf(self.alpha)).floor();
        self.base + rank as i64
    }

    fn eta(&self, zetan: f64) -> f64 {
        (1.0 - (2.0 / self.items as f64).powf(1.0 - self.theta)) / (1.0 - self.zeta2theta / zetan)
    }

    fn needs_recompute(&self, norm: &Normalization, itemcount: u64) -> bool {
        if itemcount > norm.count_for_zeta {
            return true;
        }
        if itemcount < norm.count_for_zeta {
            if self.allow_item_count_decrease {
                return true;
            }
            if !self.stale_warned.load(Ordering::Relaxed)
                && !self.stale_warned.swap(true, Ordering::Relaxed)
            {
                warn!(
                    "zipfian item count decreased from {} to {}, keeping the larger normalization",
                    norm.count_for_zeta, itemcount
                );
            }
        }
        false
    }

    fn normalization_for(&self, itemcount: u64) -> Normalization {
        let current = **self.norm.load();
        if !self.needs_recompute(&current, itemcount) {
            return current;
        }
        let _guard = self.recompute.lock();
        let current = **self.norm.load();
        if !self.needs_recompute(&current, itemcount) {
            return current;
        }
        let zetan = if itemcount > current.count_for_zeta {
            zeta(current.count_for_zeta, itemcount, self.theta, current.zetan)
        } else {
            zeta(0, itemcount, self.theta, 0.0)
        };
        trace!(
            "zipfian normalization recomputed for {} items (was {})",
            itemcount,
            current.count_for_zeta
        );
        let norm = Normalization {
            count_for_zeta: itemcount,
            zetan,
            eta: self.eta(zetan),
        };
        self.norm.store(Arc::new(norm));
        norm
    }
}
