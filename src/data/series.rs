//! Ct series, per-sample ΔCt sets and group summaries

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DdctError, Result};
use crate::stats;

/// Which gene a Ct series was measured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesRole {
    /// Gene of interest
    Target,
    /// Housekeeping/reference gene used for normalisation
    Reference,
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesRole::Target => write!(f, "target"),
            SeriesRole::Reference => write!(f, "reference"),
        }
    }
}

/// Ordered Ct values for one (gene, group, role)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    pub role: SeriesRole,
    pub values: Vec<f64>,
}

impl SampleSeries {
    pub fn new(role: SeriesRole, values: Vec<f64>) -> Self {
        Self { role, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-sample ΔCt = Ct(target) - Ct(reference) for one (gene, group)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaCtSet {
    pub gene: String,
    pub group: String,
    pub values: Vec<f64>,
}

impl DeltaCtSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean ΔCt; `None` for an empty set
    pub fn mean(&self) -> Option<f64> {
        stats::mean(&self.values)
    }
}

/// Compute per-sample ΔCt for one group.
///
/// Both series are truncated to the shorter length; surplus samples of the
/// longer series are dropped. An empty result means the group is unusable.
pub fn compute_delta_ct(
    gene: &str,
    group: &str,
    target: &SampleSeries,
    reference: &SampleSeries,
) -> DeltaCtSet {
    let n = target.len().min(reference.len());
    if target.len() != reference.len() {
        log::warn!(
            "{} / {}: {} target vs {} reference Ct values, using first {}",
            gene,
            group,
            target.len(),
            reference.len(),
            n
        );
    }

    let values = target
        .values
        .iter()
        .zip(reference.values.iter())
        .map(|(&t, &r)| t - r)
        .collect();

    DeltaCtSet {
        gene: gene.to_string(),
        group: group.to_string(),
        values,
    }
}

/// Mean ΔCt of one group; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub gene: String,
    pub group: String,
    pub mean_delta_ct: f64,
    pub n_samples: usize,
}

impl GroupSummary {
    pub fn from_delta_ct(set: &DeltaCtSet) -> Result<Self> {
        let mean_delta_ct = set.mean().ok_or_else(|| DdctError::ComparisonUnavailable {
            reason: format!("no ΔCt values for gene {}, group {}", set.gene, set.group),
        })?;
        Ok(Self {
            gene: set.gene.clone(),
            group: set.group.clone(),
            mean_delta_ct,
            n_samples: set.len(),
        })
    }
}

/// Flattened per-sample row for tabular export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    /// 1-based sample position within the group
    pub sample_index: usize,
    pub gene: String,
    pub group: String,
    pub target_ct: f64,
    pub reference_ct: f64,
    pub delta_ct: f64,
}

/// Per-sample rows for one group, limited to the samples that entered ΔCt
pub fn sample_rows(
    gene: &str,
    group: &str,
    target: &SampleSeries,
    reference: &SampleSeries,
) -> Vec<SampleRow> {
    target
        .values
        .iter()
        .zip(reference.values.iter())
        .enumerate()
        .map(|(i, (&t, &r))| SampleRow {
            sample_index: i + 1,
            gene: gene.to_string(),
            group: group.to_string(),
            target_ct: t,
            reference_ct: r,
            delta_ct: t - r,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(role: SeriesRole, values: &[f64]) -> SampleSeries {
        SampleSeries::new(role, values.to_vec())
    }

    #[test]
    fn test_delta_ct_elementwise() {
        let target = series(SeriesRole::Target, &[22.5, 23.0, 24.0]);
        let reference = series(SeriesRole::Reference, &[24.5, 24.8, 25.0]);
        let set = compute_delta_ct("GAPDH", "control", &target, &reference);
        assert_eq!(set.len(), 3);
        for i in 0..3 {
            assert_eq!(set.values[i], target.values[i] - reference.values[i]);
        }
    }

    #[test]
    fn test_delta_ct_truncates_to_shorter() {
        let target = series(SeriesRole::Target, &[20.0, 21.0, 22.0, 23.0]);
        let reference = series(SeriesRole::Reference, &[18.0, 18.5]);
        let set = compute_delta_ct("g", "p1", &target, &reference);
        assert_eq!(set.values, vec![2.0, 2.5]);
    }

    #[test]
    fn test_delta_ct_empty() {
        let target = series(SeriesRole::Target, &[]);
        let reference = series(SeriesRole::Reference, &[18.0]);
        let set = compute_delta_ct("g", "p1", &target, &reference);
        assert!(set.is_empty());
        assert!(set.mean().is_none());
        assert!(GroupSummary::from_delta_ct(&set).is_err());
    }

    #[test]
    fn test_group_summary() {
        let set = DeltaCtSet {
            gene: "g".to_string(),
            group: "control".to_string(),
            values: vec![-2.0, -1.8],
        };
        let summary = GroupSummary::from_delta_ct(&set).unwrap();
        assert!((summary.mean_delta_ct + 1.9).abs() < 1e-12);
        assert_eq!(summary.n_samples, 2);
    }

    #[test]
    fn test_sample_rows() {
        let target = series(SeriesRole::Target, &[19.2, 19.6, 20.0]);
        let reference = series(SeriesRole::Reference, &[21.4, 21.0]);
        let rows = sample_rows("g", "p1", &target, &reference);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sample_index, 2);
        assert!((rows[1].delta_ct + 1.4).abs() < 1e-12);
    }
}
