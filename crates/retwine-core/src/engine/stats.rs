//! Statistical kernels for backbone extraction.
//!
//! Scalar reference implementations of the Poisson right-tail probability and
//! the Benjamini–Hochberg false-discovery-rate correction. The Poisson tail
//! is evaluated by log-space term summation to stay finite for any
//! nonnegative mean; no entry may ever come out as NaN or Inf.

use std::f64::consts::PI;

/// Lanczos coefficients (g = 7, 9 terms).
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation).
///
/// Accurate to ~1e-13 relative error for positive arguments, which is far
/// below the resolution the downstream significance cut needs.
pub fn ln_gamma(z: f64) -> f64 {
    if z < 0.5 {
        // Reflection formula: Γ(z)Γ(1-z) = π / sin(πz)
        PI.ln() - (PI * z).sin().abs().ln() - ln_gamma(1.0 - z)
    } else {
        let z = z - 1.0;
        let mut series = LANCZOS[0];
        for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
            series += c / (z + i as f64);
        }
        let t = z + 7.5;
        0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + series.ln()
    }
}

/// Cumulative Poisson probability `P(X ≤ k)` for `X ~ Poisson(mean)`.
///
/// Each term is evaluated in log space as `-mean + j·ln(mean) - lnΓ(j+1)`,
/// so large means never overflow a factorial. `mean = 0` gives 1 for any k.
pub fn poisson_cdf(mean: f64, k: u64) -> f64 {
    debug_assert!(mean >= 0.0, "Poisson mean must be nonnegative");
    if mean == 0.0 {
        return 1.0;
    }
    let ln_mean = mean.ln();
    let mut sum = 0.0;
    for j in 0..=k {
        let ln_term = -mean + j as f64 * ln_mean - ln_gamma(j as f64 + 1.0);
        sum += ln_term.exp();
    }
    sum.min(1.0)
}

/// Right-tail probability `P(X > k) = 1 − P(X ≤ k)`, clamped to `[0, 1]`.
///
/// This is the Poisson approximation to the (more expensive) Poisson-binomial
/// tail used as the per-entry p-value in the backbone extraction.
pub fn poisson_sf(mean: f64, k: u64) -> f64 {
    (1.0 - poisson_cdf(mean, k)).clamp(0.0, 1.0)
}

/// One hypothesis tested by the backbone extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestedEntry {
    /// Source user (row index).
    pub row: u32,
    /// Destination user (column index).
    pub col: u32,
    /// Right-tail p-value for the observed co-propagation count.
    pub p: f64,
}

/// Benjamini–Hochberg procedure at level `alpha` over all tested entries.
///
/// Sorts p-values ascending with a deterministic `(p, row, col)` tie-break,
/// assigns 1-indexed ranks `k` out of `m = entries.len()`, and marks an entry
/// significant iff `p ≤ (k/m)·α`. The correction is global across the entire
/// entry set, not per-row. Returns a mask aligned with the input order;
/// `m = 0` returns an empty mask.
pub fn benjamini_hochberg(entries: &[TestedEntry], alpha: f64) -> Vec<bool> {
    let m = entries.len();
    if m == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_unstable_by(|&a, &b| {
        let ea = &entries[a];
        let eb = &entries[b];
        ea.p.total_cmp(&eb.p)
            .then_with(|| (ea.row, ea.col).cmp(&(eb.row, eb.col)))
    });
    let mut significant = vec![false; m];
    for (rank0, &idx) in order.iter().enumerate() {
        let threshold = (rank0 + 1) as f64 / m as f64 * alpha;
        if entries[idx].p <= threshold {
            significant[idx] = true;
        }
    }
    significant
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn ln_gamma_matches_factorials() {
        assert!((ln_gamma(1.0)).abs() < EPS);
        assert!((ln_gamma(2.0)).abs() < EPS);
        assert!((ln_gamma(5.0) - 24.0f64.ln()).abs() < EPS);
        assert!((ln_gamma(11.0) - 3_628_800.0f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn poisson_cdf_closed_forms() {
        // P(X <= 0) = e^-mean
        assert!((poisson_cdf(2.0, 0) - (-2.0f64).exp()).abs() < EPS);
        // P(X <= 2) for mean 1: e^-1 (1 + 1 + 1/2)
        let expected = (-1.0f64).exp() * 2.5;
        assert!((poisson_cdf(1.0, 2) - expected).abs() < EPS);
    }

    #[test]
    fn poisson_sf_is_a_probability() {
        for &(mean, k) in &[(0.0, 0u64), (0.5, 1), (3.0, 10), (250.0, 200), (250.0, 300)] {
            let p = poisson_sf(mean, k);
            assert!((0.0..=1.0).contains(&p), "sf({mean}, {k}) = {p}");
        }
        assert_eq!(poisson_sf(0.0, 5), 0.0);
    }

    #[test]
    fn poisson_sf_decreases_in_k() {
        let a = poisson_sf(4.0, 2);
        let b = poisson_sf(4.0, 5);
        assert!(a > b);
    }

    fn entry(row: u32, col: u32, p: f64) -> TestedEntry {
        TestedEntry { row, col, p }
    }

    #[test]
    fn bh_marks_small_pvalues_only() {
        let entries = vec![
            entry(0, 1, 0.001),
            entry(1, 2, 0.02),
            entry(2, 3, 0.9),
            entry(3, 4, 0.04),
        ];
        // m = 4, alpha = 0.05: thresholds 0.0125, 0.025, 0.0375, 0.05
        let mask = benjamini_hochberg(&entries, 0.05);
        assert_eq!(mask, vec![true, true, false, false]);
    }

    #[test]
    fn bh_single_entry_compares_against_alpha() {
        let mask = benjamini_hochberg(&[entry(0, 1, 0.04)], 0.05);
        assert_eq!(mask, vec![true]);
        let mask = benjamini_hochberg(&[entry(0, 1, 0.06)], 0.05);
        assert_eq!(mask, vec![false]);
    }

    #[test]
    fn bh_empty_input_is_vacuous() {
        assert!(benjamini_hochberg(&[], 0.05).is_empty());
    }

    #[test]
    fn bh_tie_break_is_deterministic() {
        let entries = vec![entry(5, 1, 0.01), entry(0, 2, 0.01), entry(0, 1, 0.01)];
        let mask_a = benjamini_hochberg(&entries, 0.05);
        let mut reordered = entries.clone();
        reordered.rotate_left(1);
        let mask_b = benjamini_hochberg(&reordered, 0.05);
        // Same entries, same verdicts, regardless of input order.
        for (e, &sig) in entries.iter().zip(&mask_a) {
            let pos = reordered.iter().position(|r| r == e).unwrap();
            assert_eq!(sig, mask_b[pos]);
        }
    }
}
