//! Number-of-false-alarms arithmetic
//!
//! Everything is evaluated in log space: the binomial tails involved have
//! thousands of terms on large primitives and overflow in plain floats.

use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0` (Lanczos approximation)
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection keeps the series in its accurate range.
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFS[0];
    for (i, c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// `ln C(n, k)`
pub fn ln_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `ln Σ_{i=k..n} C(n,i) p^i (1-p)^(n-i)`, the log probability of at least
/// `k` successes in `n` Bernoulli(p) trials
pub fn ln_binomial_tail(n: u64, k: u64, p: f64) -> f64 {
    if k == 0 {
        return 0.0;
    }
    if k > n || p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return 0.0;
    }
    let (lp, lq) = (p.ln(), (1.0 - p).ln());
    let mut term = ln_binomial(n, k) + k as f64 * lp + (n - k) as f64 * lq;
    let mut terms = Vec::with_capacity((n - k + 1) as usize);
    terms.push(term);
    for i in k..n {
        // C(n, i+1) = C(n, i) * (n - i) / (i + 1)
        term += ((n - i) as f64).ln() - ((i + 1) as f64).ln() + lp - lq;
        terms.push(term);
    }
    log_sum_exp(&terms)
}

fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + terms.iter().map(|t| (t - max).exp()).sum::<f64>().ln()
}

/// Empirical distribution of nonzero gradient magnitudes
///
/// `tail(m)` estimates `P(magnitude >= m)` over the pixel population.
#[derive(Debug, Clone)]
pub struct MagnitudeDistribution {
    sorted: Vec<f32>,
}

impl MagnitudeDistribution {
    /// Collect the nonzero magnitudes of an image
    pub fn from_magnitudes(magnitudes: &[f32]) -> Self {
        let mut sorted: Vec<f32> = magnitudes.iter().copied().filter(|&m| m > 0.0).collect();
        sorted.sort_by(f32::total_cmp);
        Self { sorted }
    }

    /// Size of the population
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when the image had no nonzero magnitude
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Fraction of the population with magnitude >= `m`
    pub fn tail(&self, m: f32) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let below = self.sorted.partition_point(|&v| v < m);
        (self.sorted.len() - below) as f64 / self.sorted.len() as f64
    }
}
