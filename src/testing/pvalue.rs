//! P-value calculation from test statistics

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Upper-tail probability P(Z > z) of the standard normal
pub fn normal_sf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    standard_normal().map_or(f64::NAN, |normal| normal.sf(z))
}

/// Quantile of the standard normal
pub fn normal_quantile(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    standard_normal().map_or(f64::NAN, |normal| normal.inverse_cdf(p))
}

/// Calculate two-sided p-value from z-statistic
pub fn calculate_pvalue(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    (2.0 * normal_sf(z.abs())).min(1.0)
}

/// Calculate two-sided p-value from t-statistic with given degrees of freedom
pub fn calculate_pvalue_t(stat: f64, df: f64) -> f64 {
    if stat.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => (2.0 * t_dist.sf(stat.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

/// Upper-tail p-value of an F statistic
pub fn calculate_pvalue_f(stat: f64, df1: f64, df2: f64) -> f64 {
    if stat.is_nan() || !(df1 > 0.0) || !(df2 > 0.0) {
        return f64::NAN;
    }
    if stat == f64::INFINITY {
        return 0.0;
    }
    match FisherSnedecor::new(df1, df2) {
        Ok(f_dist) => f_dist.sf(stat.max(0.0)),
        Err(_) => f64::NAN,
    }
}
