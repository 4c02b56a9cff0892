//! Statistical utility functions shared across modules
//!
//! Descriptive statistics and ranking used by the ΔCt aggregation and by
//! the distribution and significance tests. Inputs are assumed finite; the
//! parser never lets NaN into a series.

use std::cmp::Ordering;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(x: &[f64]) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    Some(x.iter().sum::<f64>() / x.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (1 = sample variance)
pub fn variance(x: &[f64], ddof: usize) -> Option<f64> {
    if x.len() <= ddof {
        return None;
    }
    let m = mean(x)?;
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();
    Some(ss / (x.len() - ddof) as f64)
}

/// Sorted copy of `x`
pub fn sorted(x: &[f64]) -> Vec<f64> {
    let mut v = x.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// Median, `None` for an empty slice
pub fn median(x: &[f64]) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    let v = sorted(x);
    let n = v.len();
    if n % 2 == 1 {
        Some(v[n / 2])
    } else {
        Some((v[n / 2 - 1] + v[n / 2]) / 2.0)
    }
}

/// Mean after cutting `proportion` of the observations from each end.
///
/// Matches scipy.stats.trim_mean: the number cut per side is
/// floor(proportion * n).
pub fn trimmed_mean(x: &[f64], proportion: f64) -> Option<f64> {
    if x.is_empty() || !(0.0..0.5).contains(&proportion) {
        return None;
    }
    let v = sorted(x);
    let cut = (proportion * v.len() as f64).floor() as usize;
    mean(&v[cut..v.len() - cut])
}

/// Average ranks (1-based) with ties sharing the mean of their positions.
///
/// Also returns the sizes of every tie group with more than one member,
/// needed for tie corrections.
pub fn average_ranks(x: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut ties = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && x[order[j]] == x[order[i]] {
            j += 1;
        }
        // positions i..j share ranks (i+1)..=j
        let avg = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg;
        }
        if j - i > 1 {
            ties.push(j - i);
        }
        i = j;
    }
    (ranks, ties)
}
