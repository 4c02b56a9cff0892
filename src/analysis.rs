//! Gene × patient-group analysis over one submitted dataset
//!
//! Every (gene, patient group) pair is evaluated independently against the
//! gene's control group. A pair that cannot be evaluated is recorded as a
//! `SkippedComparison` and never stops the other pairs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{
    compute_delta_ct, sample_rows, ExperimentInput, GeneInput, GroupInput, GroupSummary,
    ParsePolicy, SeriesRole,
};
use crate::error::{DdctError, Result};
use crate::expression::{compare_summaries, ComparisonResult};
use crate::io::{AnalysisRun, GroupProfile, SkipStage, SkippedComparison, StatisticalTestResult};
use crate::testing::{select_and_run, SelectionParams};

/// Parameters for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub parse_policy: ParsePolicy,
    /// Band around fold change 1 reported as no change; 0 means exact equality
    pub no_change_tolerance: f64,
    pub selection: SelectionParams,
}

/// Everything a single pair contributes to the run
#[derive(Debug, Default)]
struct PairOutcome {
    profile: Option<GroupProfile>,
    comparison: Option<ComparisonResult>,
    statistics: Option<StatisticalTestResult>,
    skipped: Option<SkippedComparison>,
}

#[derive(Debug, Default)]
struct GeneOutcome {
    control: Option<GroupProfile>,
    pairs: Vec<PairOutcome>,
}

/// Parse one group's text and derive its ΔCt profile
pub fn build_profile(
    gene: &str,
    input: &GroupInput,
    is_control: bool,
    policy: ParsePolicy,
) -> Result<GroupProfile> {
    let (target, reference) = input.parse(gene, policy)?;
    let delta_ct = compute_delta_ct(gene, &input.group, &target, &reference);
    if delta_ct.is_empty() {
        return Err(DdctError::EmptySeries {
            gene: gene.to_string(),
            group: input.group.clone(),
            role: SeriesRole::Target,
        });
    }
    let summary = GroupSummary::from_delta_ct(&delta_ct)?;
    Ok(GroupProfile {
        is_control,
        rows: sample_rows(gene, &input.group, &target, &reference),
        delta_ct,
        summary,
    })
}

fn analyze_pair(
    gene: &str,
    control: &std::result::Result<GroupProfile, DdctError>,
    patient_input: &GroupInput,
    params: &AnalysisParams,
) -> PairOutcome {
    let group = patient_input.group.as_str();
    let skip = |stage: SkipStage, e: &DdctError| {
        log::warn!("{} / {}: skipped at {} stage: {}", gene, group, stage, e);
        Some(SkippedComparison::new(gene, group, stage, e))
    };

    let control = match control {
        Ok(c) => c,
        Err(e) => {
            return PairOutcome {
                skipped: skip(SkipStage::Expression, e),
                ..Default::default()
            }
        }
    };

    let patient = match build_profile(gene, patient_input, false, params.parse_policy) {
        Ok(p) => p,
        Err(e) => {
            return PairOutcome {
                skipped: skip(SkipStage::Expression, &e),
                ..Default::default()
            }
        }
    };

    let comparison =
        match compare_summaries(&control.summary, &patient.summary, params.no_change_tolerance) {
            Ok(c) => c,
            Err(e) => {
                return PairOutcome {
                    profile: Some(patient),
                    skipped: skip(SkipStage::Expression, &e),
                    ..Default::default()
                }
            }
        };
    log::debug!(
        "{} / {}: ΔΔCt = {:.4}, fold change = {:.4} ({})",
        gene,
        group,
        comparison.delta_delta_ct,
        comparison.fold_change,
        comparison.regulation
    );

    let (statistics, skipped) = match select_and_run(
        &control.delta_ct.values,
        &patient.delta_ct.values,
        &params.selection,
    ) {
        Ok(ready) => (
            Some(StatisticalTestResult::from_ready(gene, group, &ready)),
            None,
        ),
        Err(e) => (None, skip(SkipStage::Statistics, &e)),
    };

    PairOutcome {
        profile: Some(patient),
        comparison: Some(comparison),
        statistics,
        skipped,
    }
}

fn analyze_gene(gene: &GeneInput, params: &AnalysisParams) -> GeneOutcome {
    if gene.patients.is_empty() {
        log::warn!("Gene {} has no patient groups to compare", gene.gene);
    }
    // control ΔCt is computed once and shared by every patient group
    let control = build_profile(&gene.gene, &gene.control, true, params.parse_policy);

    let pairs: Vec<PairOutcome> = gene
        .patients
        .par_iter()
        .map(|patient| analyze_pair(&gene.gene, &control, patient, params))
        .collect();

    GeneOutcome {
        control: control.ok(),
        pairs,
    }
}

/// Run the full ΔΔCt analysis for one submission
pub fn run_analysis(input: &ExperimentInput, params: &AnalysisParams) -> AnalysisRun {
    log::info!(
        "Analysing {} genes, {} gene/group pairs",
        input.genes.len(),
        input.n_pairs()
    );

    let outcomes: Vec<GeneOutcome> = input
        .genes
        .par_iter()
        .map(|gene| analyze_gene(gene, params))
        .collect();

    let run = outcomes
        .into_iter()
        .fold(AnalysisRun::default(), |mut run, outcome| {
            run.groups.extend(outcome.control);
            for pair in outcome.pairs {
                run.groups.extend(pair.profile);
                run.comparisons.extend(pair.comparison);
                run.statistics.extend(pair.statistics);
                run.skipped.extend(pair.skipped);
            }
            run
        });

    log::info!(
        "{} comparisons, {} tests, {} skipped",
        run.comparisons.len(),
        run.statistics.len(),
        run.skipped.len()
    );
    run
}
