//! Two-sample location tests
//!
//! Student's pooled t-test, Welch's t-test and the Mann-Whitney U test,
//! all two-sided.

use serde::{Deserialize, Serialize};

use super::pvalue::{calculate_pvalue_t, normal_sf};
use crate::error::{DdctError, Result};
use crate::stats;

/// Smallest per-group sample size the two-sample tests accept
pub const TWO_SAMPLE_MIN_SAMPLES: usize = 2;

// Exact Mann-Whitney distribution is used up to this many (n1 * n2) pairs
const MWU_EXACT_MAX_PAIRS: usize = 2500;
const MWU_EXACT_MAX_SMALL_GROUP: usize = 8;

/// Which significance test was run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestMethod {
    #[serde(rename = "t-test")]
    TTest,
    #[serde(rename = "Welch-t-test")]
    WelchTTest,
    #[serde(rename = "Mann-Whitney-U")]
    MannWhitneyU,
}

impl TestMethod {
    pub fn is_parametric(&self) -> bool {
        !matches!(self, TestMethod::MannWhitneyU)
    }
}

impl std::fmt::Display for TestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestMethod::TTest => write!(f, "t-test"),
            TestMethod::WelchTTest => write!(f, "Welch-t-test"),
            TestMethod::MannWhitneyU => write!(f, "Mann-Whitney-U"),
        }
    }
}

/// Result of a two-sample test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleResult {
    /// t for the t-tests, U of the first sample for Mann-Whitney
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: Option<f64>,
    pub method: TestMethod,
}

fn check_sizes(test: &'static str, x: &[f64], y: &[f64]) -> Result<()> {
    let smallest = x.len().min(y.len());
    if smallest < TWO_SAMPLE_MIN_SAMPLES {
        return Err(DdctError::InsufficientSamples {
            test,
            required: TWO_SAMPLE_MIN_SAMPLES,
            got: smallest,
        });
    }
    Ok(())
}

/// Independent two-sample t-test.
///
/// With `equal_var` the pooled-variance Student test is used, otherwise
/// Welch's approximation. Zero variance in both groups yields a NaN p-value.
pub fn t_test(x: &[f64], y: &[f64], equal_var: bool) -> Result<TwoSampleResult> {
    check_sizes("t-test", x, y)?;

    let nx = x.len() as f64;
    let ny = y.len() as f64;
    let (mean_x, mean_y) = (stats::mean(x).unwrap_or(0.0), stats::mean(y).unwrap_or(0.0));
    let (var_x, var_y) = (
        stats::variance(x, 1).unwrap_or(0.0),
        stats::variance(y, 1).unwrap_or(0.0),
    );

    let (t, df) = if equal_var {
        let sp2 = ((nx - 1.0) * var_x + (ny - 1.0) * var_y) / (nx + ny - 2.0);
        let se = (sp2 * (1.0 / nx + 1.0 / ny)).sqrt();
        ((mean_x - mean_y) / se, nx + ny - 2.0)
    } else {
        let vn_x = var_x / nx;
        let vn_y = var_y / ny;
        let se = (vn_x + vn_y).sqrt();
        let df = (vn_x + vn_y).powi(2) / (vn_x.powi(2) / (nx - 1.0) + vn_y.powi(2) / (ny - 1.0));
        ((mean_x - mean_y) / se, df)
    };

    Ok(TwoSampleResult {
        statistic: t,
        p_value: calculate_pvalue_t(t, df),
        degrees_of_freedom: Some(df),
        method: if equal_var {
            TestMethod::TTest
        } else {
            TestMethod::WelchTTest
        },
    })
}

/// Frequencies of U = 0..=m*n under H0 for group sizes (m, n), no ties.
///
/// Uses f(m, n; u) = f(m - 1, n; u - n) + f(m, n - 1; u).
fn mann_whitney_frequencies(m: usize, n: usize) -> Vec<f64> {
    // prev[j] holds the table for (i - 1, j)
    let mut prev: Vec<Vec<f64>> = vec![vec![1.0]; n + 1];
    for i in 1..=m {
        let mut cur: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        cur.push(vec![1.0]);
        for j in 1..=n {
            let mut freq = vec![0.0; i * j + 1];
            for (u, &c) in cur[j - 1].iter().enumerate() {
                freq[u] += c;
            }
            for (u, &c) in prev[j].iter().enumerate() {
                freq[u + j] += c;
            }
            cur.push(freq);
        }
        prev = cur;
    }
    prev.swap_remove(n)
}

/// Mann-Whitney U test (Wilcoxon rank-sum), two-sided.
///
/// The exact null distribution is used when there are no ties and one group
/// is small; otherwise the normal approximation with tie and continuity
/// correction.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<TwoSampleResult> {
    check_sizes("Mann-Whitney U", x, y)?;

    let n1 = x.len();
    let n2 = y.len();
    let n = n1 + n2;

    let mut combined = Vec::with_capacity(n);
    combined.extend_from_slice(x);
    combined.extend_from_slice(y);
    let (ranks, ties) = stats::average_ranks(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let exact = ties.is_empty()
        && n1.min(n2) <= MWU_EXACT_MAX_SMALL_GROUP
        && n1 * n2 <= MWU_EXACT_MAX_PAIRS;

    let p = if exact {
        let freq = mann_whitney_frequencies(n1.min(n2), n1.max(n2));
        let total: f64 = freq.iter().sum();
        let k = u_max.round() as usize;
        let upper: f64 = freq[k..].iter().sum();
        (2.0 * upper / total).min(1.0)
    } else {
        let nf = n as f64;
        let tie_term: f64 = ties.iter().map(|&t| (t * t * t - t) as f64).sum();
        let sigma = ((n1 * n2) as f64 / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)))).sqrt();
        if sigma > 0.0 {
            let z = (u_max - (n1 * n2) as f64 / 2.0 - 0.5) / sigma;
            (2.0 * normal_sf(z)).min(1.0)
        } else {
            1.0
        }
    };

    Ok(TwoSampleResult {
        statistic: u1,
        p_value: p,
        degrees_of_freedom: None,
        method: TestMethod::MannWhitneyU,
    })
}
