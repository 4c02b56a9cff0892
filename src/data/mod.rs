//! Data structures for ΔΔCt analysis

mod input;
pub mod parse;
mod series;

pub use input::{ExperimentInput, GeneInput, GroupInput};
pub use parse::{parse_ct_values, parse_ct_values_lenient, ParsePolicy, ParsedSeries};
pub use series::{
    compute_delta_ct, sample_rows, DeltaCtSet, GroupSummary, SampleRow, SampleSeries, SeriesRole,
};
