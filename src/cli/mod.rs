//! Command-line interface for rust_ddct

use clap::{Parser, Subcommand, ValueEnum};

use crate::analysis::AnalysisParams;
use crate::data::ParsePolicy;
use crate::testing::{LeveneCenter, SelectionParams};

#[derive(Parser)]
#[command(name = "rust_ddct")]
#[command(version)]
#[command(about = "Comparative ΔΔCt qPCR expression analysis")]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Center used by Levene's test
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CenterArg {
    Median,
    Mean,
    Trimmed,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ΔΔCt analysis
    #[command(
        about = "Run the ΔΔCt analysis",
        long_about = "Run the ΔΔCt analysis\n\n\
            Computes ΔCt, ΔΔCt and fold change (2^-ΔΔCt) for every gene and patient\n\
            group against the gene's control group, then chooses a significance test:\n\
            Student's t-test when both groups pass Shapiro-Wilk and Levene, otherwise\n\
            Mann-Whitney U.",
        after_long_help = "\
Examples:
  # Basic run, results table only
  rust_ddct run -i experiment.json -o ddct_results.tsv

  # Also write per-sample rows, skipped pairs and the full run as JSON
  rust_ddct run -i experiment.json -o ddct_results.tsv \\
    --samples samples.tsv --skipped skipped.tsv --json run.json

  # Fail on any non-numeric Ct token instead of dropping it
  rust_ddct run -i experiment.json --strict"
    )]
    Run {
        /// Path to experiment JSON file
        #[arg(short, long,
            long_help = "Path to experiment JSON file.\n\
                Format: {\"genes\": [{\"gene\": ..., \"control\": {\"group\": ..., \"target_ct\": ...,\n\
                \"reference_ct\": ...}, \"patients\": [...]}]}\n\
                Ct text may be separated by newlines, spaces, ';' or ','; a lone ',' is a decimal mark.\n\
                Run `rust_ddct template` for a complete example.")]
        input: String,

        /// Output file path [default: ddct_results.tsv]
        #[arg(short, long, default_value = "ddct_results.tsv")]
        output: String,

        /// Per-sample table output path
        #[arg(long)]
        samples: Option<String>,

        /// Skipped-pair table output path
        #[arg(long)]
        skipped: Option<String>,

        /// Full run as JSON output path
        #[arg(long)]
        json: Option<String>,

        /// Significance threshold [default: 0.05]
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,

        /// Shapiro-Wilk threshold [default: 0.05]
        #[arg(long, default_value = "0.05")]
        normality_alpha: f64,

        /// Levene threshold [default: 0.05]
        #[arg(long, default_value = "0.05")]
        variance_alpha: f64,

        /// Levene center [default: median]
        #[arg(long, value_enum, default_value = "median",
            long_help = "Group center for Levene's test.\n\
                median:  Brown-Forsythe variant (default, robust)\n\
                mean:    Levene's original\n\
                trimmed: 10% trimmed mean")]
        levene_center: CenterArg,

        /// Fail a group on any non-numeric Ct token
        #[arg(long)]
        strict: bool,

        /// Use Welch's t-test for normal groups with unequal variances
        #[arg(long,
            long_help = "Run Welch's t-test when both groups are normal but Levene rejects\n\
                equal variances. Without this flag such pairs use Mann-Whitney U.")]
        welch: bool,

        /// Fold-change band around 1 reported as no change [default: 0]
        #[arg(long, default_value = "0",
            long_help = "Tolerance around fold change 1 reported as 'no change'.\n\
                The default 0 reports no change only when ΔΔCt is exactly 0.")]
        no_change_tolerance: f64,

        /// Number of threads (0 = auto) [default: 0]
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },

    /// Write an example experiment JSON file
    #[command(
        long_about = "Write an example experiment JSON file with one gene,\n\
            a control group and two patient groups.",
        after_long_help = "\
Examples:
  rust_ddct template -o experiment.json"
    )]
    Template {
        /// Output file path [default: experiment.json]
        #[arg(short, long, default_value = "experiment.json")]
        output: String,
    },
}

/// Build analysis parameters from `run` arguments
#[allow(clippy::too_many_arguments)]
pub fn analysis_params(
    alpha: f64,
    normality_alpha: f64,
    variance_alpha: f64,
    levene_center: CenterArg,
    strict: bool,
    welch: bool,
    no_change_tolerance: f64,
) -> AnalysisParams {
    AnalysisParams {
        parse_policy: if strict {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Lenient
        },
        no_change_tolerance,
        selection: SelectionParams {
            normality_alpha,
            variance_alpha,
            significance_alpha: alpha,
            levene_center: match levene_center {
                CenterArg::Median => LeveneCenter::Median,
                CenterArg::Mean => LeveneCenter::Mean,
                CenterArg::Trimmed => LeveneCenter::TrimmedMean(0.1),
            },
            welch_on_unequal_variance: welch,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::parse_from([
            "rust_ddct",
            "run",
            "-i",
            "exp.json",
            "--levene-center",
            "mean",
            "--welch",
            "--strict",
        ]);
        match cli.command {
            Some(Commands::Run {
                input,
                output,
                levene_center,
                welch,
                strict,
                alpha,
                ..
            }) => {
                assert_eq!(input, "exp.json");
                assert_eq!(output, "ddct_results.tsv");
                assert_eq!(levene_center, CenterArg::Mean);
                assert!(welch && strict);
                assert_eq!(alpha, 0.05);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_analysis_params_mapping() {
        let params = analysis_params(0.01, 0.1, 0.2, CenterArg::Trimmed, true, false, 0.0);
        assert_eq!(params.parse_policy, ParsePolicy::Strict);
        assert_eq!(params.selection.significance_alpha, 0.01);
        assert_eq!(params.selection.levene_center, LeveneCenter::TrimmedMean(0.1));
        assert!(!params.selection.welch_on_unequal_variance);
    }
}
