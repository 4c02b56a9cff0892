//! Raw experiment input as supplied by the data-entry front end

use serde::{Deserialize, Serialize};

use super::parse::{parse_with_policy, ParsePolicy};
use super::series::{SampleSeries, SeriesRole};
use crate::error::{DdctError, Result};

/// Raw Ct text blocks for one group of one gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInput {
    pub group: String,
    /// Pasted Ct values of the target gene
    #[serde(default)]
    pub target_ct: String,
    /// Pasted Ct values of the reference gene
    #[serde(default)]
    pub reference_ct: String,
}

impl GroupInput {
    pub fn new(group: &str, target_ct: &str, reference_ct: &str) -> Self {
        Self {
            group: group.to_string(),
            target_ct: target_ct.to_string(),
            reference_ct: reference_ct.to_string(),
        }
    }

    /// Parse both text blocks into series.
    ///
    /// An empty series (no data, or nothing left after dropping invalid
    /// tokens) is reported as `EmptySeries` naming the role.
    pub fn parse(&self, gene: &str, policy: ParsePolicy) -> Result<(SampleSeries, SampleSeries)> {
        let target = parse_role(&self.target_ct, gene, &self.group, SeriesRole::Target, policy)?;
        let reference = parse_role(
            &self.reference_ct,
            gene,
            &self.group,
            SeriesRole::Reference,
            policy,
        )?;
        Ok((target, reference))
    }
}

fn parse_role(
    text: &str,
    gene: &str,
    group: &str,
    role: SeriesRole,
    policy: ParsePolicy,
) -> Result<SampleSeries> {
    let values = parse_with_policy(text, policy)?;
    if values.is_empty() {
        return Err(DdctError::EmptySeries {
            gene: gene.to_string(),
            group: group.to_string(),
            role,
        });
    }
    Ok(SampleSeries::new(role, values))
}

/// One target gene: its control group and the patient groups compared against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneInput {
    pub gene: String,
    pub control: GroupInput,
    #[serde(default)]
    pub patients: Vec<GroupInput>,
}

/// A full submission: the gene panel with all raw Ct text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInput {
    pub genes: Vec<GeneInput>,
}

impl ExperimentInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gene with its control group; returns the gene for adding patient groups
    pub fn add_gene(&mut self, gene: &str, control: GroupInput) -> &mut GeneInput {
        self.genes.push(GeneInput {
            gene: gene.to_string(),
            control,
            patients: Vec::new(),
        });
        let last = self.genes.len() - 1;
        &mut self.genes[last]
    }

    /// Total number of (gene, patient group) pairs
    pub fn n_pairs(&self) -> usize {
        self.genes.iter().map(|g| g.patients.len()).sum()
    }

    /// Reject structurally unusable input (blank or duplicate names)
    pub fn validate(&self) -> Result<()> {
        if self.genes.is_empty() {
            return Err(DdctError::InvalidInput {
                reason: "experiment contains no genes".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for gene in &self.genes {
            if gene.gene.trim().is_empty() {
                return Err(DdctError::InvalidInput {
                    reason: "gene name must not be empty".to_string(),
                });
            }
            if !seen.insert(gene.gene.as_str()) {
                return Err(DdctError::InvalidInput {
                    reason: format!("duplicate gene '{}'", gene.gene),
                });
            }
            let mut groups = std::collections::HashSet::new();
            groups.insert(gene.control.group.as_str());
            for patient in &gene.patients {
                if !groups.insert(patient.group.as_str()) {
                    return Err(DdctError::InvalidInput {
                        reason: format!(
                            "duplicate group '{}' for gene '{}'",
                            patient.group, gene.gene
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl GeneInput {
    pub fn add_patient(&mut self, patient: GroupInput) -> &mut Self {
        self.patients.push(patient);
        self
    }
}
