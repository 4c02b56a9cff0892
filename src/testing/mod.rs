//! Statistical testing for differential expression

mod normality;
mod pvalue;
mod selection;
mod two_sample;
mod variance;

pub use normality::{shapiro_wilk, NormalityResult, SHAPIRO_MIN_SAMPLES};
pub use pvalue::{calculate_pvalue, calculate_pvalue_f, calculate_pvalue_t};
pub use selection::{
    select_and_run, test_distributions, DistributionReport, NormalityChecked, ResultReady,
    SelectionParams, Significance, Start, TestChosen, TestType,
};
pub use two_sample::{mann_whitney_u, t_test, TestMethod, TwoSampleResult};
pub use variance::{levene, LeveneCenter, VarianceResult};
