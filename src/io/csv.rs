//! Reading experiment input and writing tab-separated result tables

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::data::ExperimentInput;
use crate::error::Result;

use super::results::AnalysisRun;

/// Missing values are written as NA, matching common R/spreadsheet import
fn fmt_value(v: f64) -> String {
    if v.is_finite() {
        format!("{:.6}", v)
    } else {
        "NA".to_string()
    }
}

fn fmt_pvalue(v: f64) -> String {
    if v.is_finite() {
        format!("{:.6e}", v)
    } else {
        "NA".to_string()
    }
}

fn tsv_writer<P: AsRef<Path>>(path: P) -> Result<::csv::Writer<File>> {
    Ok(::csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?)
}

/// Read an experiment description from a JSON file
pub fn read_experiment<P: AsRef<Path>>(path: P) -> Result<ExperimentInput> {
    let reader = BufReader::new(File::open(path)?);
    let input: ExperimentInput = serde_json::from_reader(reader)?;
    input.validate()?;
    Ok(input)
}

/// Write an experiment description as pretty-printed JSON
pub fn write_experiment<P: AsRef<Path>>(path: P, input: &ExperimentInput) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, input)?;
    writeln!(writer)?;
    Ok(())
}

/// Write one row per (gene, patient group) with ΔΔCt and test results.
///
/// Pairs skipped before ΔΔCt are not listed; pairs whose test could not run
/// have NA in the test columns.
pub fn write_comparisons<P: AsRef<Path>>(path: P, run: &AnalysisRun) -> Result<()> {
    let mut wtr = tsv_writer(path)?;
    wtr.write_record([
        "gene",
        "group",
        "controlMeanDeltaCt",
        "patientMeanDeltaCt",
        "deltaDeltaCt",
        "foldChange",
        "regulation",
        "testType",
        "testMethod",
        "statistic",
        "pvalue",
        "significance",
        "controlNormalityP",
        "patientNormalityP",
        "varianceP",
    ])?;

    for c in &run.comparisons {
        let mut record = vec![
            c.gene.clone(),
            c.group.clone(),
            fmt_value(c.control_mean_delta_ct),
            fmt_value(c.patient_mean_delta_ct),
            fmt_value(c.delta_delta_ct),
            fmt_value(c.fold_change),
            c.regulation.to_string(),
        ];
        match run.statistics_for(&c.gene, &c.group) {
            Some(s) => record.extend([
                s.test_type.to_string(),
                s.method.to_string(),
                fmt_value(s.statistic),
                fmt_pvalue(s.p_value),
                s.significance.to_string(),
                fmt_pvalue(s.control_normality_p),
                fmt_pvalue(s.patient_normality_p),
                fmt_pvalue(s.variance_p),
            ]),
            None => record.extend(std::iter::repeat("NA".to_string()).take(8)),
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the flattened per-sample rows
pub fn write_sample_rows<P: AsRef<Path>>(path: P, run: &AnalysisRun) -> Result<()> {
    let mut wtr = tsv_writer(path)?;
    wtr.write_record(["sampleIndex", "gene", "group", "targetCt", "referenceCt", "deltaCt"])?;
    for row in run.sample_rows() {
        wtr.write_record([
            row.sample_index.to_string(),
            row.gene.clone(),
            row.group.clone(),
            fmt_value(row.target_ct),
            fmt_value(row.reference_ct),
            fmt_value(row.delta_ct),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the pairs that produced no or partial results, with the reason
pub fn write_skipped<P: AsRef<Path>>(path: P, run: &AnalysisRun) -> Result<()> {
    let mut wtr = tsv_writer(path)?;
    wtr.write_record(["gene", "group", "stage", "kind", "reason"])?;
    for s in &run.skipped {
        wtr.write_record([
            s.gene.clone(),
            s.group.clone(),
            s.stage.to_string(),
            format!("{:?}", s.kind),
            s.reason.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the whole run as pretty-printed JSON
pub fn write_run_json<P: AsRef<Path>>(path: P, run: &AnalysisRun) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, run)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{run_analysis, AnalysisParams};
    use crate::data::GroupInput;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn example_run() -> AnalysisRun {
        let mut input = ExperimentInput::new();
        input
            .add_gene("GENE1", GroupInput::new("control", "22.5 23.0 22.7", "24.5 24.8 24.6"))
            .add_patient(GroupInput::new("p1", "19.2 19.6 19.4", "21.4 21.0 21.1"))
            .add_patient(GroupInput::new("p2", "19.2", "21.4"))
            .add_patient(GroupInput::new("p3", "", ""));
        run_analysis(&input, &AnalysisParams::default())
    }

    #[test]
    fn test_read_experiment() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"genes": [{{"gene": "GENE1",
                "control": {{"group": "control", "target_ct": "22,5\n23,0", "reference_ct": "24.5 24.8"}},
                "patients": [{{"group": "p1", "target_ct": "19.2 19.6", "reference_ct": "21.4 21.0"}}]}}]}}"#
        )
        .unwrap();

        let input = read_experiment(file.path()).unwrap();
        assert_eq!(input.genes.len(), 1);
        assert_eq!(input.n_pairs(), 1);
        assert_eq!(input.genes[0].control.target_ct, "22,5\n23,0");
    }

    #[test]
    fn test_read_experiment_rejects_empty_panel() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"genes": []}}"#).unwrap();
        assert!(read_experiment(file.path()).is_err());
    }

    #[test]
    fn test_write_then_read_experiment() {
        let mut input = ExperimentInput::new();
        input
            .add_gene("GENE1", GroupInput::new("control", "22.5\n23.0", "24.5\n24.8"))
            .add_patient(GroupInput::new("p1", "19.2\n19.6", "21.4\n21.0"));
        let file = NamedTempFile::new().unwrap();
        write_experiment(file.path(), &input).unwrap();
        assert_eq!(read_experiment(file.path()).unwrap(), input);
    }

    #[test]
    fn test_write_comparisons() {
        let run = example_run();
        let file = NamedTempFile::new().unwrap();
        write_comparisons(file.path(), &run).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // header + p1 + p2 (p3 has no ΔΔCt)
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("gene\tgroup\t"));
        assert!(lines[1].starts_with("GENE1\tp1\t"));
        assert!(lines[2].starts_with("GENE1\tp2\t"));
        assert!(lines[2].ends_with("\tNA"));
        assert_eq!(lines[1].split('\t').count(), 15);
    }

    #[test]
    fn test_write_sample_rows_and_skipped() {
        let run = example_run();
        let rows = NamedTempFile::new().unwrap();
        write_sample_rows(rows.path(), &run).unwrap();
        let text = std::fs::read_to_string(rows.path()).unwrap();
        // header + 3 control + 3 p1 + 1 p2
        assert_eq!(text.lines().count(), 8);

        let skipped = NamedTempFile::new().unwrap();
        write_skipped(skipped.path(), &run).unwrap();
        let text = std::fs::read_to_string(skipped.path()).unwrap();
        // p2 statistics, p3 expression
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("EmptySeries"));
        assert!(text.contains("InsufficientSamples"));
    }

    #[test]
    fn test_write_run_json() {
        let run = example_run();
        let file = NamedTempFile::new().unwrap();
        write_run_json(file.path(), &run).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        let back: AnalysisRun = serde_json::from_str(&text).unwrap();
        assert_eq!(back.comparisons.len(), run.comparisons.len());
        assert_eq!(back.skipped, run.skipped);
    }
}
