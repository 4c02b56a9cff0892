//! Input/Output operations for ΔΔCt analysis

mod csv;
mod results;

pub use self::csv::{
    read_experiment, write_comparisons, write_experiment, write_run_json, write_sample_rows,
    write_skipped,
};
pub use results::{
    AnalysisRun, GroupProfile, RunSummary, SkipStage, SkippedComparison, StatisticalTestResult,
};
