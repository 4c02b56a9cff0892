//! Normality-aware choice of significance test
//!
//! The selection is a small state machine:
//!
//! ```text
//! Start -> NormalityChecked -> TestChosen -> ResultReady
//! ```
//!
//! Both groups normal (Shapiro-Wilk) and variances equal (Levene) selects
//! Student's t-test; anything else selects Mann-Whitney U. Each state is its
//! own type so a test can only run after the distribution checks.

use serde::{Deserialize, Serialize};

use super::normality::{shapiro_wilk, NormalityResult};
use super::two_sample::{mann_whitney_u, t_test, TestMethod, TwoSampleResult};
use super::variance::{levene, LeveneCenter, VarianceResult};
use crate::error::Result;

/// Thresholds and switches for test selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// A group is normal when its Shapiro-Wilk p-value exceeds this
    pub normality_alpha: f64,
    /// Variances are equal when Levene's p-value exceeds this
    pub variance_alpha: f64,
    /// A comparison is significant when the test p-value is below this
    pub significance_alpha: f64,
    pub levene_center: LeveneCenter,
    /// Run Welch's t-test when both groups are normal but variances differ
    pub welch_on_unequal_variance: bool,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            normality_alpha: 0.05,
            variance_alpha: 0.05,
            significance_alpha: 0.05,
            levene_center: LeveneCenter::Median,
            welch_on_unequal_variance: false,
        }
    }
}

/// Parametric or rank-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestType {
    Parametric,
    Nonparametric,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Parametric => write!(f, "parametric"),
            TestType::Nonparametric => write!(f, "nonparametric"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    Significant,
    NotSignificant,
}

impl Significance {
    /// Strict `p < alpha`; a NaN p-value is never significant
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Significance::Significant)
    }
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Significant => write!(f, "significant"),
            Significance::NotSignificant => write!(f, "not significant"),
        }
    }
}

/// Normality of both groups and homogeneity of their variances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub control_normality: NormalityResult,
    pub patient_normality: NormalityResult,
    pub variance: VarianceResult,
    pub normality_alpha: f64,
    pub variance_alpha: f64,
}

impl DistributionReport {
    pub fn control_normal(&self) -> bool {
        self.control_normality.p_value > self.normality_alpha
    }

    pub fn patient_normal(&self) -> bool {
        self.patient_normality.p_value > self.normality_alpha
    }

    pub fn equal_variance(&self) -> bool {
        self.variance.p_value > self.variance_alpha
    }
}

/// Shapiro-Wilk on each group and Levene across the pair
pub fn test_distributions(
    control: &[f64],
    patient: &[f64],
    params: &SelectionParams,
) -> Result<DistributionReport> {
    let control_normality = shapiro_wilk(control)?;
    let patient_normality = shapiro_wilk(patient)?;
    let variance = levene(&[control, patient], params.levene_center)?;
    Ok(DistributionReport {
        control_normality,
        patient_normality,
        variance,
        normality_alpha: params.normality_alpha,
        variance_alpha: params.variance_alpha,
    })
}

/// Initial state holding the two ΔCt samples
#[derive(Debug, Clone, Copy)]
pub struct Start<'a> {
    control: &'a [f64],
    patient: &'a [f64],
}

#[derive(Debug, Clone, Copy)]
pub struct NormalityChecked<'a> {
    control: &'a [f64],
    patient: &'a [f64],
    report: DistributionReport,
}

#[derive(Debug, Clone, Copy)]
pub struct TestChosen<'a> {
    control: &'a [f64],
    patient: &'a [f64],
    report: DistributionReport,
    method: TestMethod,
}

/// Terminal state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultReady {
    pub report: DistributionReport,
    pub outcome: TwoSampleResult,
    pub significance: Significance,
}

impl ResultReady {
    pub fn method(&self) -> TestMethod {
        self.outcome.method
    }

    pub fn test_type(&self) -> TestType {
        if self.outcome.method.is_parametric() {
            TestType::Parametric
        } else {
            TestType::Nonparametric
        }
    }
}

impl<'a> Start<'a> {
    pub fn new(control: &'a [f64], patient: &'a [f64]) -> Self {
        Self { control, patient }
    }

    pub fn check_distributions(self, params: &SelectionParams) -> Result<NormalityChecked<'a>> {
        let report = test_distributions(self.control, self.patient, params)?;
        Ok(NormalityChecked {
            control: self.control,
            patient: self.patient,
            report,
        })
    }
}

impl<'a> NormalityChecked<'a> {
    pub fn report(&self) -> &DistributionReport {
        &self.report
    }

    pub fn choose_test(self, params: &SelectionParams) -> TestChosen<'a> {
        let r = &self.report;
        let both_normal = r.control_normal() && r.patient_normal();
        let method = if both_normal && r.equal_variance() {
            TestMethod::TTest
        } else if both_normal && params.welch_on_unequal_variance {
            TestMethod::WelchTTest
        } else {
            TestMethod::MannWhitneyU
        };
        log::debug!(
            "normality p = ({:.4}, {:.4}), Levene p = {:.4} -> {}",
            r.control_normality.p_value,
            r.patient_normality.p_value,
            r.variance.p_value,
            method
        );
        TestChosen {
            control: self.control,
            patient: self.patient,
            report: self.report,
            method,
        }
    }
}

impl<'a> TestChosen<'a> {
    pub fn method(&self) -> TestMethod {
        self.method
    }

    pub fn run(self, params: &SelectionParams) -> Result<ResultReady> {
        let outcome = match self.method {
            TestMethod::TTest => t_test(self.control, self.patient, true)?,
            TestMethod::WelchTTest => t_test(self.control, self.patient, false)?,
            TestMethod::MannWhitneyU => mann_whitney_u(self.control, self.patient)?,
        };
        Ok(ResultReady {
            report: self.report,
            significance: Significance::from_p_value(outcome.p_value, params.significance_alpha),
            outcome,
        })
    }
}

/// Drive the whole selection for one pair of ΔCt samples
pub fn select_and_run(
    control: &[f64],
    patient: &[f64],
    params: &SelectionParams,
) -> Result<ResultReady> {
    Start::new(control, patient)
        .check_distributions(params)?
        .choose_test(params)
        .run(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DdctError;

    const NORMAL_A: [f64; 10] = [-2.05, -1.95, -2.0, -1.9, -2.1, -2.02, -1.98, -1.93, -2.07, -2.0];

    #[test]
    fn test_normal_equal_variance_chooses_t_test() {
        let shifted: Vec<f64> = NORMAL_A.iter().map(|v| v + 0.5).collect();
        let ready = select_and_run(&NORMAL_A, &shifted, &SelectionParams::default()).unwrap();
        assert!(ready.report.control_normal());
        assert!(ready.report.patient_normal());
        assert!(ready.report.equal_variance());
        assert_eq!(ready.method(), TestMethod::TTest);
        assert_eq!(ready.test_type(), TestType::Parametric);
        assert_eq!(ready.significance, Significance::Significant);
    }

    #[test]
    fn test_skewed_chooses_mann_whitney() {
        let skewed = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 10.0, 50.0, 100.0, 400.0];
        let ready = select_and_run(&NORMAL_A, &skewed, &SelectionParams::default()).unwrap();
        assert!(!ready.report.patient_normal());
        assert_eq!(ready.method(), TestMethod::MannWhitneyU);
        assert_eq!(ready.test_type(), TestType::Nonparametric);
    }

    #[test]
    fn test_state_transitions() {
        let control = [-2.0, -1.8, -2.1, -1.9];
        let patient = [-1.0, -1.2, -0.8, -1.1];
        let params = SelectionParams::default();
        let checked = Start::new(&control, &patient).check_distributions(&params).unwrap();
        assert!(checked.report().equal_variance());
        let chosen = checked.choose_test(&params);
        assert_eq!(chosen.method(), TestMethod::TTest);
        let ready = chosen.run(&params).unwrap();
        assert!((ready.outcome.p_value - 0.000_132_32).abs() < 1e-7);
    }

    #[test]
    fn test_welch_opt_in() {
        // both normal, very different spread
        let tight = [10.0, 10.1, 9.9, 10.05, 9.95, 10.02, 9.98, 10.03];
        let wide = [8.0, 12.0, 9.0, 11.0, 10.0, 13.0, 7.0, 10.5];
        let mut params = SelectionParams::default();
        let checked = Start::new(&tight, &wide).check_distributions(&params).unwrap();
        let report = *checked.report();
        assert!(report.control_normal() && report.patient_normal());
        assert!(!report.equal_variance());
        assert_eq!(checked.choose_test(&params).method(), TestMethod::MannWhitneyU);
        params.welch_on_unequal_variance = true;
        assert_eq!(checked.choose_test(&params).method(), TestMethod::WelchTTest);
    }

    #[test]
    fn test_significance_boundary() {
        assert_eq!(Significance::from_p_value(0.05, 0.05), Significance::NotSignificant);
        assert_eq!(Significance::from_p_value(0.0499, 0.05), Significance::Significant);
        assert_eq!(Significance::from_p_value(f64::NAN, 0.05), Significance::NotSignificant);
    }

    #[test]
    fn test_insufficient_samples() {
        let result = select_and_run(&[1.0, 2.0], &[1.0, 2.0, 3.0], &SelectionParams::default());
        assert!(matches!(
            result,
            Err(DdctError::InsufficientSamples { required: 3, got: 2, .. })
        ));
    }
}
