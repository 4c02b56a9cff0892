//! rust_ddct: comparative ΔΔCt qPCR analysis in Rust
//!
//! Computes ΔCt, ΔΔCt and fold change (2^-ΔΔCt) for every
//! (target gene, patient group) pair against the gene's control group, and
//! runs a normality-aware significance test on the ΔCt values
//! (Shapiro-Wilk and Levene select Student's t-test or Mann-Whitney U).
//!
//! # Example
//!
//! ```ignore
//! use rust_ddct::prelude::*;
//!
//! let mut input = ExperimentInput::new();
//! input
//!     .add_gene("GENE1", GroupInput::new("control", "22.5 23.0 22.8", "24.5 24.8 24.6"))
//!     .add_patient(GroupInput::new("patient 1", "19.2 19.6 19.4", "21.4 21.0 21.2"));
//!
//! let run = run_analysis(&input, &AnalysisParams::default());
//! println!("{}", run.summary());
//! ```

pub mod analysis;
pub mod cli;
pub mod data;
pub mod error;
pub mod expression;
pub mod io;
pub mod stats;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{build_profile, run_analysis, AnalysisParams};
    pub use crate::data::{
        compute_delta_ct, parse_ct_values, parse_ct_values_lenient, DeltaCtSet, ExperimentInput,
        GeneInput, GroupInput, GroupSummary, ParsePolicy, SampleRow, SampleSeries, SeriesRole,
    };
    pub use crate::error::{DdctError, FailureKind, Result};
    pub use crate::expression::{compare, compare_summaries, fold_change, ComparisonResult, Regulation};
    pub use crate::io::{
        read_experiment, write_comparisons, write_experiment, write_run_json, write_sample_rows,
        write_skipped,
        AnalysisRun, RunSummary, SkipStage, SkippedComparison, StatisticalTestResult,
    };
    pub use crate::testing::{
        levene, mann_whitney_u, select_and_run, shapiro_wilk, t_test, test_distributions,
        LeveneCenter, SelectionParams, Significance, TestMethod, TestType,
    };
}

use prelude::*;

/// Read an experiment from a JSON file and analyse it
pub fn analyze_file<P: AsRef<std::path::Path>>(path: P, params: &AnalysisParams) -> Result<AnalysisRun> {
    let input = read_experiment(path)?;
    Ok(run_analysis(&input, params))
}
