//! Levene's test for equality of variances
//!
//! Each observation is replaced by its absolute deviation from the group
//! center and a one-way ANOVA F statistic is computed on the deviations.
//! Centering on the median (Brown-Forsythe) is the default, as in
//! scipy.stats.levene.

use serde::{Deserialize, Serialize};

use super::pvalue::calculate_pvalue_f;
use crate::error::{DdctError, Result};
use crate::stats;

/// Smallest per-group sample size the test accepts
pub const LEVENE_MIN_SAMPLES: usize = 2;

/// Group center used for the absolute deviations
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum LeveneCenter {
    #[default]
    Median,
    Mean,
    /// Trimmed mean cutting the given proportion from each end
    TrimmedMean(f64),
}

impl LeveneCenter {
    fn center(&self, x: &[f64]) -> Option<f64> {
        match *self {
            LeveneCenter::Median => stats::median(x),
            LeveneCenter::Mean => stats::mean(x),
            LeveneCenter::TrimmedMean(p) => stats::trimmed_mean(x, p),
        }
    }
}

/// Outcome of Levene's test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// F statistic; NaN when every group has constant deviations
    pub statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
}

/// Levene's test across two or more groups
pub fn levene(groups: &[&[f64]], center: LeveneCenter) -> Result<VarianceResult> {
    let k = groups.len();
    if k < 2 {
        return Err(DdctError::InvalidInput {
            reason: format!("Levene's test needs at least 2 groups, got {}", k),
        });
    }
    if let Some(small) = groups.iter().find(|g| g.len() < LEVENE_MIN_SAMPLES) {
        return Err(DdctError::InsufficientSamples {
            test: "Levene",
            required: LEVENE_MIN_SAMPLES,
            got: small.len(),
        });
    }

    let mut deviations: Vec<Vec<f64>> = Vec::with_capacity(k);
    for g in groups {
        let c = center.center(g).ok_or_else(|| DdctError::InvalidInput {
            reason: format!("invalid Levene center {:?}", center),
        })?;
        deviations.push(g.iter().map(|&v| (v - c).abs()).collect());
    }

    let n_total: usize = deviations.iter().map(Vec::len).sum();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / n_total as f64;
    let group_means: Vec<f64> = deviations
        .iter()
        .map(|z| stats::mean(z).unwrap_or(0.0))
        .collect();

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, &m)| z.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, &m)| z.iter().map(|&v| (v - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let statistic = (df_within * between) / (df_between * within);

    Ok(VarianceResult {
        statistic,
        p_value: calculate_pvalue_f(statistic, df_between, df_within),
        df_between,
        df_within,
    })
}
