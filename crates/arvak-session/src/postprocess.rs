//! Post-processing: bitstring normalisation, Jensen-Shannon divergence,
//! and Richardson (zero-noise) extrapolation (spec §4.7).
//!
//! ⟨Z⟩ expectation is not reimplemented here — it is exactly
//! [`arvak_hal::Counts::expectation_z`], computed per measured qubit in
//! [`crate::session::Session::run_cell`].

use std::collections::HashMap;

use arvak_hal::Counts;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// Numerical floor used in place of zero probability mass so that KL
/// divergence terms stay finite.
const JSD_EPSILON: f64 = 1e-12;

/// Reverse a bitstring if the backend reports samples LSB-first, then
/// fold it into a [`Counts`] table (spec §4.7 step 1). Bitstrings of
/// length >= 32 are still recorded, just omitted from the integer map
/// by `Counts` itself.
pub fn build_counts(raw: &HashMap<String, u64>, lsb_first: bool) -> Counts {
    let mut counts = Counts::new();
    for (bitstring, &count) in raw {
        let normalised = if lsb_first {
            bitstring.chars().rev().collect::<String>()
        } else {
            bitstring.clone()
        };
        counts.insert(normalised, count);
    }
    counts
}

/// Bitstring -> integer, respecting the same LSB convention as
/// [`build_counts`]. Returns `None` for bitstrings of 32 bits or more
/// (overflow protection, matching `Counts`'s own policy).
pub fn bitstring_to_int(bitstring: &str, lsb_first: bool) -> Option<u64> {
    if bitstring.len() >= 32 {
        return None;
    }
    let normalised = if lsb_first {
        bitstring.chars().rev().collect::<String>()
    } else {
        bitstring.to_string()
    };
    u64::from_str_radix(&normalised, 2).ok()
}

/// Jensen-Shannon divergence between expected amplitudes and measured
/// counts: `p = |a_k|^2`, `q = c_k / sum(c)`, `JSD(p||q) = 1/2(KL(p|m) +
/// KL(q|m))`, `m = (p+q)/2`.
///
/// The union of bitstrings appearing in either `amplitudes` or `counts`
/// forms the support; a key missing from one side contributes `0` mass
/// there.
pub fn jensen_shannon_divergence(
    amplitudes: &HashMap<String, Complex64>,
    counts: &Counts,
) -> f64 {
    let total = counts.total_shots() as f64;
    let mut support: Vec<&str> = amplitudes.keys().map(String::as_str).collect();
    for key in counts.raw().keys() {
        if !amplitudes.contains_key(key) {
            support.push(key.as_str());
        }
    }

    let p: Vec<f64> = support
        .iter()
        .map(|k| amplitudes.get(*k).map(|a| a.norm_sqr()).unwrap_or(0.0))
        .collect();
    let q: Vec<f64> = support
        .iter()
        .map(|k| {
            if total == 0.0 {
                0.0
            } else {
                counts.get(k) as f64 / total
            }
        })
        .collect();

    let m: Vec<f64> = p.iter().zip(&q).map(|(pi, qi)| 0.5 * (pi + qi)).collect();

    let kl = |a: &[f64], b: &[f64]| -> f64 {
        a.iter()
            .zip(b)
            .map(|(ai, bi)| {
                if *ai <= JSD_EPSILON {
                    0.0
                } else {
                    ai * (ai / bi.max(JSD_EPSILON)).ln()
                }
            })
            .sum()
    };

    0.5 * (kl(&p, &m) + kl(&q, &m))
}

/// Fit a degree-`min(points.len() - 1, 2)` polynomial to `(noise_level,
/// value)` pairs by least squares over the Vandermonde matrix, solved
/// via the normal equations, and evaluate it at `noise_level = 0` — the
/// zero-noise limit produced by gate-folding at levels `{1, 3, 5, ...}`.
///
/// Returns the last observed value unchanged if fewer than two points
/// are supplied (nothing to extrapolate from).
pub fn richardson_extrapolate(points: &[(u32, f64)]) -> f64 {
    if points.len() < 2 {
        return points.last().map(|(_, v)| *v).unwrap_or(0.0);
    }
    let degree = (points.len() - 1).min(2);
    let terms = degree + 1;
    let n = points.len();

    let vander = DMatrix::<f64>::from_fn(n, terms, |row, col| {
        f64::from(points[row].0).powi(col as i32)
    });
    let y_vec = DVector::<f64>::from_fn(n, |row, _| points[row].1);

    let vt = vander.transpose();
    let normal = &vt * &vander;
    let rhs = &vt * &y_vec;

    let coeffs = normal
        .lu()
        .solve(&rhs)
        .unwrap_or_else(|| DVector::zeros(terms));

    coeffs[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_counts_reverses_lsb_first_bitstrings() {
        let mut raw = HashMap::new();
        raw.insert("01".to_string(), 10);
        let counts = build_counts(&raw, true);
        assert_eq!(counts.get("10"), 10);
        assert_eq!(counts.get("01"), 0);
    }

    #[test]
    fn test_build_counts_keeps_msb_first_bitstrings() {
        let mut raw = HashMap::new();
        raw.insert("01".to_string(), 10);
        let counts = build_counts(&raw, false);
        assert_eq!(counts.get("01"), 10);
    }

    #[test]
    fn test_bitstring_to_int_overflow_guard() {
        let long = "1".repeat(32);
        assert_eq!(bitstring_to_int(&long, false), None);
    }

    #[test]
    fn test_jsd_zero_for_matching_distributions() {
        let mut amplitudes = HashMap::new();
        amplitudes.insert("0".to_string(), Complex64::new((0.5f64).sqrt(), 0.0));
        amplitudes.insert("1".to_string(), Complex64::new((0.5f64).sqrt(), 0.0));

        let mut raw = HashMap::new();
        raw.insert("0".to_string(), 500);
        raw.insert("1".to_string(), 500);
        let counts = Counts::from_raw(raw);

        let jsd = jensen_shannon_divergence(&amplitudes, &counts);
        assert!(jsd.abs() < 1e-9);
    }

    #[test]
    fn test_jsd_positive_for_mismatched_distributions() {
        let mut amplitudes = HashMap::new();
        amplitudes.insert("0".to_string(), Complex64::new(1.0, 0.0));
        amplitudes.insert("1".to_string(), Complex64::new(0.0, 0.0));

        let mut raw = HashMap::new();
        raw.insert("0".to_string(), 500);
        raw.insert("1".to_string(), 500);
        let counts = Counts::from_raw(raw);

        let jsd = jensen_shannon_divergence(&amplitudes, &counts);
        assert!(jsd > 0.1);
    }

    #[test]
    fn test_richardson_extrapolate_linear_trend() {
        // value = 1.0 - 0.1 * level; zero-noise limit should recover 1.0.
        let points = vec![(1, 0.9), (3, 0.7), (5, 0.5)];
        let extrapolated = richardson_extrapolate(&points);
        assert!((extrapolated - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_richardson_extrapolate_single_point_passes_through() {
        let points = vec![(1, 0.42)];
        assert_eq!(richardson_extrapolate(&points), 0.42);
    }
}
