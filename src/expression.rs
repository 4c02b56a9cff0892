//! ΔΔCt, fold change and regulation status
//!
//! Fold change follows the Livak 2^-ΔΔCt method, which assumes close to
//! 100% amplification efficiency for both target and reference gene.

use serde::{Deserialize, Serialize};

use crate::data::GroupSummary;
use crate::error::{DdctError, Result};

/// Direction of expression change in the patient group relative to control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regulation {
    NoChange,
    Upregulated,
    Downregulated,
}

impl std::fmt::Display for Regulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regulation::NoChange => write!(f, "no change"),
            Regulation::Upregulated => write!(f, "upregulated"),
            Regulation::Downregulated => write!(f, "downregulated"),
        }
    }
}

/// Expression change of one patient group against the gene's control group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub gene: String,
    pub group: String,
    pub control_mean_delta_ct: f64,
    pub patient_mean_delta_ct: f64,
    pub delta_delta_ct: f64,
    pub fold_change: f64,
    pub regulation: Regulation,
}

/// Fold change 2^-ΔΔCt
pub fn fold_change(delta_delta_ct: f64) -> f64 {
    (-delta_delta_ct).exp2()
}

/// Classify a fold change.
///
/// With `tolerance == 0.0` only an exact fold change of 1 (ΔΔCt exactly 0)
/// is `NoChange`. A positive tolerance widens the band to
/// |fold change - 1| <= tolerance.
pub fn classify(fold_change: f64, tolerance: f64) -> Regulation {
    if (fold_change - 1.0).abs() <= tolerance {
        Regulation::NoChange
    } else if fold_change > 1.0 {
        Regulation::Upregulated
    } else {
        Regulation::Downregulated
    }
}

/// Compare a patient group mean ΔCt against the control mean ΔCt
pub fn compare(
    gene: &str,
    group: &str,
    control_mean: f64,
    patient_mean: f64,
    tolerance: f64,
) -> ComparisonResult {
    let delta_delta_ct = patient_mean - control_mean;
    let fc = fold_change(delta_delta_ct);
    ComparisonResult {
        gene: gene.to_string(),
        group: group.to_string(),
        control_mean_delta_ct: control_mean,
        patient_mean_delta_ct: patient_mean,
        delta_delta_ct,
        fold_change: fc,
        regulation: classify(fc, tolerance),
    }
}

/// Compare two group summaries of the same gene
pub fn compare_summaries(
    control: &GroupSummary,
    patient: &GroupSummary,
    tolerance: f64,
) -> Result<ComparisonResult> {
    if control.gene != patient.gene {
        return Err(DdctError::ComparisonUnavailable {
            reason: format!(
                "control summary is for gene {} but patient summary is for gene {}",
                control.gene, patient.gene
            ),
        });
    }
    Ok(compare(
        &patient.gene,
        &patient.group,
        control.mean_delta_ct,
        patient.mean_delta_ct,
        tolerance,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_means_no_change() {
        for m in [-3.7, 0.0, 1.25, 12.0] {
            let r = compare("g", "p", m, m, 0.0);
            assert_eq!(r.delta_delta_ct, 0.0);
            assert_eq!(r.fold_change, 1.0);
            assert_eq!(r.regulation, Regulation::NoChange);
        }
    }

    #[test]
    fn test_fold_change_known_values() {
        assert_eq!(fold_change(1.0), 0.5);
        assert_eq!(fold_change(-2.0), 4.0);
        assert!((fold_change(0.1) - 0.933_032_991_5).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_patient_mean() {
        let control = -1.9;
        let mut prev = compare("g", "p", control, -4.0, 0.0);
        for step in 1..40 {
            let patient = -4.0 + step as f64 * 0.2;
            let r = compare("g", "p", control, patient, 0.0);
            assert!(r.delta_delta_ct > prev.delta_delta_ct);
            assert!(r.fold_change < prev.fold_change);
            prev = r;
        }
    }

    #[test]
    fn test_regulation_direction() {
        assert_eq!(compare("g", "p", -1.0, -2.0, 0.0).regulation, Regulation::Upregulated);
        assert_eq!(compare("g", "p", -1.0, 0.0, 0.0).regulation, Regulation::Downregulated);
    }

    #[test]
    fn test_exact_equality_is_strict() {
        // tiny but non-zero ΔΔCt is not "no change" without a tolerance
        let r = compare("g", "p", 1.0, 1.0 + 1e-12, 0.0);
        assert_eq!(r.regulation, Regulation::Downregulated);
        let r = compare("g", "p", 1.0, 1.0 + 1e-12, 1e-6);
        assert_eq!(r.regulation, Regulation::NoChange);
    }

    #[test]
    fn test_compare_summaries_gene_mismatch() {
        let control = GroupSummary {
            gene: "A".to_string(),
            group: "control".to_string(),
            mean_delta_ct: -1.9,
            n_samples: 2,
        };
        let patient = GroupSummary {
            gene: "B".to_string(),
            group: "p1".to_string(),
            mean_delta_ct: -1.8,
            n_samples: 2,
        };
        assert!(compare_summaries(&control, &patient, 0.0).is_err());

        let patient = GroupSummary { gene: "A".to_string(), ..patient };
        let r = compare_summaries(&control, &patient, 0.0).unwrap();
        assert!((r.delta_delta_ct - 0.1).abs() < 1e-12);
        assert_eq!(r.regulation, Regulation::Downregulated);
    }
}
