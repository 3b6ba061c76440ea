// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Deterministic random number generation for network construction.

Every construction operation draws from a single explicitly seeded stream
owned by the `BuildContext`, so a fixed seed plus fixed inputs reproduces the
exact same network. Gaussian draws use the Marsaglia polar method on top of
the uniform stream.
*/

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable random stream used by every construction operation.
#[derive(Debug, Clone)]
pub struct NetRng {
    inner: StdRng,
    spare_gauss: Option<f64>,
}

impl NetRng {
    /// Stream with a fixed seed, for reproducible builds
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            spare_gauss: None,
        }
    }

    /// Stream seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
            spare_gauss: None,
        }
    }

    /// Uniform draw in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform draw in [low, high); a degenerate range collapses to `low`
    pub fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Uniform index in [0, n); `n` must be greater than zero
    pub fn pick(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }

    /// Standard normal draw (Marsaglia polar method)
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(spare) = self.spare_gauss.take() {
            return spare;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare_gauss = Some(v * scale);
                return u * scale;
            }
        }
    }

    /// Normal draw with the given mean and standard deviation
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.next_gaussian()
    }

    /// Round a fractional count to an integer with a Bernoulli draw on the
    /// fractional part, so counts are exact in expectation. Negative counts
    /// round to zero.
    pub fn round_count(&mut self, count: f64) -> usize {
        if count <= 0.0 {
            return 0;
        }
        let whole = count.floor();
        let fraction = count - whole;
        let mut n = whole as usize;
        if fraction > 0.0 && self.uniform() < fraction {
            n += 1;
        }
        n
    }

    /// Draw `k` distinct indices from 0..n (optionally excluding one index) by
    /// partial Fisher-Yates shuffle. Returns None when fewer than `k`
    /// candidates exist. With `k` equal to the candidate count the result is
    /// an exact permutation of the candidates.
    pub fn sample_distinct(
        &mut self,
        k: usize,
        n: usize,
        exclude: Option<usize>,
    ) -> Option<Vec<usize>> {
        let mut pool: Vec<usize> = (0..n).filter(|&i| Some(i) != exclude).collect();
        if pool.len() < k {
            return None;
        }
        for i in 0..k {
            let j = self.inner.gen_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(k);
        Some(pool)
    }

    /// Draw `k` indices from 0..n with replacement (optionally excluding one
    /// index). Returns None when no candidate exists at all.
    pub fn sample_with_replacement(
        &mut self,
        k: usize,
        n: usize,
        exclude: Option<usize>,
    ) -> Option<Vec<usize>> {
        let pool: Vec<usize> = (0..n).filter(|&i| Some(i) != exclude).collect();
        if pool.is_empty() {
            return None;
        }
        Some((0..k).map(|_| pool[self.pick(pool.len())]).collect())
    }
}
