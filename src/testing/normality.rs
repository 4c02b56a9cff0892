//! Shapiro-Wilk normality test
//!
//! Royston's (1995) approximation (Applied Statistics algorithm AS R94),
//! the same one used by R's shapiro.test and scipy.stats.shapiro. Valid
//! for 3 <= n <= 5000.

use serde::{Deserialize, Serialize};

use super::pvalue::{normal_quantile, normal_sf};
use crate::error::{DdctError, Result};
use crate::stats;

/// Smallest sample size the test accepts
pub const SHAPIRO_MIN_SAMPLES: usize = 3;
const SHAPIRO_MAX_SAMPLES: usize = 5000;

const SMALL: f64 = 1e-19;

// Polynomial coefficients from AS R94
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Outcome of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    /// W statistic in (0, 1]
    pub statistic: f64,
    pub p_value: f64,
    pub n: usize,
}

/// c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Half of the antisymmetric coefficient vector a_1..a_{n/2}
fn coefficients(n: usize) -> Vec<f64> {
    let nn2 = n / 2;
    let mut a = vec![0.0; nn2];
    if n == 3 {
        a[0] = std::f64::consts::FRAC_1_SQRT_2;
        return a;
    }

    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=nn2)
        .map(|i| normal_quantile((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    a[0] = a1;
    for i in first..nn2 {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        // exact for n = 3
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        return (pi6 * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0);
    }
    if w >= 1.0 {
        return 1.0;
    }

    let nf = n as f64;
    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let xx = nf.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    normal_sf((y - m) / s)
}

/// Shapiro-Wilk test for normality of `x`
pub fn shapiro_wilk(x: &[f64]) -> Result<NormalityResult> {
    let n = x.len();
    if n < SHAPIRO_MIN_SAMPLES {
        return Err(DdctError::InsufficientSamples {
            test: "Shapiro-Wilk",
            required: SHAPIRO_MIN_SAMPLES,
            got: n,
        });
    }
    if n > SHAPIRO_MAX_SAMPLES {
        log::warn!(
            "Shapiro-Wilk p-value may be inaccurate for n = {} > {}",
            n,
            SHAPIRO_MAX_SAMPLES
        );
    }

    let sorted = stats::sorted(x);
    let range = sorted[n - 1] - sorted[0];
    if range < SMALL {
        log::warn!("Shapiro-Wilk input has zero range; reporting W = 1");
        return Ok(NormalityResult {
            statistic: 1.0,
            p_value: 1.0,
            n,
        });
    }

    let a = coefficients(n);
    let mean = stats::mean(&sorted).unwrap_or(0.0);
    let ssq: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
    let b: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum();
    let w = (b * b / ssq).min(1.0);

    Ok(NormalityResult {
        statistic: w,
        p_value: p_value(w, n),
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapiro_reference_example() {
        // Shapiro & Wilk (1965) weights example; R: W = 0.78881, p = 0.006704
        let x = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
        let r = shapiro_wilk(&x).unwrap();
        assert!((r.statistic - 0.788_815).abs() < 1e-5, "W = {}", r.statistic);
        assert!((r.p_value - 0.006_704).abs() < 1e-5, "p = {}", r.p_value);
    }

    #[test]
    fn test_shapiro_n3_exact() {
        let r = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        assert!((r.statistic - 0.964_286).abs() < 1e-5);
        assert!((r.p_value - 0.636_887).abs() < 1e-5);

        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shapiro_order_independent() {
        let a = shapiro_wilk(&[2.1, 2.3, 1.9, 2.0, 2.2, 2.05, 1.95, 2.15, 2.25, 1.85]).unwrap();
        let b = shapiro_wilk(&[1.85, 2.25, 2.15, 1.95, 2.05, 2.2, 2.0, 1.9, 2.3, 2.1]).unwrap();
        assert!((a.statistic - b.statistic).abs() < 1e-12);
        assert!((a.statistic - 0.970_165).abs() < 1e-5);
        assert!(a.p_value > 0.05);
    }

    #[test]
    fn test_shapiro_skewed_rejects() {
        let x = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 10.0, 50.0, 100.0, 400.0];
        let r = shapiro_wilk(&x).unwrap();
        assert!((r.statistic - 0.481_149).abs() < 1e-5);
        assert!(r.p_value < 1e-4);
    }

    #[test]
    fn test_shapiro_too_few_samples() {
        match shapiro_wilk(&[1.0, 2.0]) {
            Err(DdctError::InsufficientSamples { required, got, .. }) => {
                assert_eq!(required, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected InsufficientSamples, got {:?}", other),
        }
    }

    #[test]
    fn test_shapiro_constant_input() {
        let r = shapiro_wilk(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(r.statistic, 1.0);
        assert_eq!(r.p_value, 1.0);
    }
}
