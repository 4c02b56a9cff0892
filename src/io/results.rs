//! Analysis run results structure

use serde::{Deserialize, Serialize};

use crate::data::{DeltaCtSet, GroupSummary, SampleRow};
use crate::error::{DdctError, FailureKind};
use crate::expression::{ComparisonResult, Regulation};
use crate::testing::{ResultReady, Significance, TestMethod, TestType};

/// Outcome of the selected significance test for one (gene, patient group)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTestResult {
    pub gene: String,
    pub group: String,
    /// Shapiro-Wilk p-value of the control ΔCt values
    pub control_normality_p: f64,
    /// Shapiro-Wilk p-value of the patient ΔCt values
    pub patient_normality_p: f64,
    /// Levene p-value across both groups
    pub variance_p: f64,
    pub test_type: TestType,
    pub method: TestMethod,
    pub statistic: f64,
    pub p_value: f64,
    pub significance: Significance,
}

impl StatisticalTestResult {
    pub fn from_ready(gene: &str, group: &str, ready: &ResultReady) -> Self {
        Self {
            gene: gene.to_string(),
            group: group.to_string(),
            control_normality_p: ready.report.control_normality.p_value,
            patient_normality_p: ready.report.patient_normality.p_value,
            variance_p: ready.report.variance.p_value,
            test_type: ready.test_type(),
            method: ready.method(),
            statistic: ready.outcome.statistic,
            p_value: ready.outcome.p_value,
            significance: ready.significance,
        }
    }
}

/// Pipeline stage at which a pair was given up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipStage {
    /// No ΔΔCt could be computed; the pair has no results at all
    Expression,
    /// ΔΔCt is available but the significance test could not run
    Statistics,
}

impl std::fmt::Display for SkipStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipStage::Expression => write!(f, "expression"),
            SkipStage::Statistics => write!(f, "statistics"),
        }
    }
}

/// A (gene, patient group) pair that produced no or partial results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedComparison {
    pub gene: String,
    pub group: String,
    pub stage: SkipStage,
    pub kind: FailureKind,
    pub reason: String,
}

impl SkippedComparison {
    pub fn new(gene: &str, group: &str, stage: SkipStage, error: &DdctError) -> Self {
        Self {
            gene: gene.to_string(),
            group: group.to_string(),
            stage,
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// ΔCt values, summary and raw rows of one analysed group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProfile {
    /// True for the gene's control group
    pub is_control: bool,
    pub delta_ct: DeltaCtSet,
    pub summary: GroupSummary,
    pub rows: Vec<SampleRow>,
}

/// Every result of one submitted dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub comparisons: Vec<ComparisonResult>,
    pub statistics: Vec<StatisticalTestResult>,
    pub groups: Vec<GroupProfile>,
    pub skipped: Vec<SkippedComparison>,
}

impl AnalysisRun {
    /// Comparison for a (gene, patient group) pair
    pub fn comparison(&self, gene: &str, group: &str) -> Option<&ComparisonResult> {
        self.comparisons
            .iter()
            .find(|c| c.gene == gene && c.group == group)
    }

    /// Statistical test result for a (gene, patient group) pair
    pub fn statistics_for(&self, gene: &str, group: &str) -> Option<&StatisticalTestResult> {
        self.statistics
            .iter()
            .find(|s| s.gene == gene && s.group == group)
    }

    /// Skip record for a (gene, patient group) pair
    pub fn skipped_for(&self, gene: &str, group: &str) -> Option<&SkippedComparison> {
        self.skipped
            .iter()
            .find(|s| s.gene == gene && s.group == group)
    }

    /// Profile of a group, control or patient
    pub fn group(&self, gene: &str, group: &str) -> Option<&GroupProfile> {
        self.groups
            .iter()
            .find(|g| g.summary.gene == gene && g.summary.group == group)
    }

    /// All per-sample rows in analysis order
    pub fn sample_rows(&self) -> impl Iterator<Item = &SampleRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    pub fn summary(&self) -> RunSummary {
        let count = |r: Regulation| self.comparisons.iter().filter(|c| c.regulation == r).count();
        RunSummary {
            total_pairs: self.comparisons.len()
                + self
                    .skipped
                    .iter()
                    .filter(|s| s.stage == SkipStage::Expression)
                    .count(),
            compared: self.comparisons.len(),
            tested: self.statistics.len(),
            skipped: self.skipped.len(),
            significant: self
                .statistics
                .iter()
                .filter(|s| s.significance.is_significant())
                .count(),
            parametric: self
                .statistics
                .iter()
                .filter(|s| s.test_type == TestType::Parametric)
                .count(),
            upregulated: count(Regulation::Upregulated),
            downregulated: count(Regulation::Downregulated),
            no_change: count(Regulation::NoChange),
        }
    }
}

/// Counts over one analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_pairs: usize,
    /// Pairs with a ΔΔCt result
    pub compared: usize,
    /// Pairs with a significance test result
    pub tested: usize,
    /// Pairs with no or partial results
    pub skipped: usize,
    pub significant: usize,
    pub parametric: usize,
    pub upregulated: usize,
    pub downregulated: usize,
    pub no_change: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ΔΔCt Analysis Summary")?;
        writeln!(f, "=====================")?;
        writeln!(f, "Gene/group pairs: {}", self.total_pairs)?;
        writeln!(f, "  Compared: {}", self.compared)?;
        writeln!(f, "  Tested: {} ({} parametric)", self.tested, self.parametric)?;
        writeln!(f, "  Skipped or partial: {}", self.skipped)?;
        writeln!(f, "  Significant: {}", self.significant)?;
        writeln!(f, "Regulation:")?;
        writeln!(f, "  Up-regulated: {}", self.upregulated)?;
        writeln!(f, "  Down-regulated: {}", self.downregulated)?;
        writeln!(f, "  No change: {}", self.no_change)?;
        Ok(())
    }
}
