//! rust_ddct command-line interface

use clap::Parser;
use log::{info, LevelFilter};

use rust_ddct::cli::{analysis_params, Cli, Commands};
use rust_ddct::analyze_file;
use rust_ddct::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Find the first non-flag argument (potential subcommand)
    let first_positional = args.iter().skip(1).find(|a| !a.starts_with('-'));
    let subcommands = ["run", "template", "help"];
    let has_subcommand = first_positional.map_or(false, |a| subcommands.contains(&a.as_str()));

    if !has_subcommand {
        if args.len() == 1 {
            print_no_args();
            return;
        }
        if args.iter().any(|a| a == "--help") {
            print_long_help();
            return;
        }
        if args.iter().any(|a| a == "-h") {
            print_short_help();
            return;
        }
        if args.iter().any(|a| a == "-V" || a == "--version") {
            println!("rust_ddct {}", VERSION);
            return;
        }
        print_no_args();
        return;
    }

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            input,
            output,
            samples,
            skipped,
            json,
            alpha,
            normality_alpha,
            variance_alpha,
            levene_center,
            strict,
            welch,
            no_change_tolerance,
            threads,
        }) => {
            let params = analysis_params(
                alpha,
                normality_alpha,
                variance_alpha,
                levene_center,
                strict,
                welch,
                no_change_tolerance,
            );
            let outputs = Outputs {
                comparisons: &output,
                samples: samples.as_deref(),
                skipped: skipped.as_deref(),
                json: json.as_deref(),
            };
            run(&input, &outputs, &params, threads)
        }
        Some(Commands::Template { output }) => run_template(&output),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Custom help output
// ---------------------------------------------------------------------------

fn print_no_args() {
    println!("rust_ddct v{}", VERSION);
    println!("Run `rust_ddct -h` for usage or `rust_ddct --help` for detailed information.");
}

fn print_short_help() {
    println!("rust_ddct v{}", VERSION);
    println!();
    println!("Usage: rust_ddct <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  run        Run the ΔΔCt analysis");
    println!("  template   Write an example experiment JSON file");
    println!();
    println!("Run `rust_ddct <COMMAND> -h` for command-specific options.");
}

fn print_long_help() {
    println!("rust_ddct v{}", VERSION);
    println!("Comparative ΔΔCt qPCR expression analysis");
    println!();
    println!("Usage: rust_ddct <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  run        Run the ΔΔCt analysis");
    println!("               - ΔCt, ΔΔCt and fold change (2^-ΔΔCt) per gene and patient group");
    println!("               - Shapiro-Wilk normality and Levene variance checks");
    println!("               - Student's t-test or Mann-Whitney U (Welch opt-in)");
    println!("               - Per-sample, skipped-pair and JSON outputs");
    println!("  template   Write an example experiment JSON file");
    println!();
    println!("Global Options:");
    println!("  -v, --verbose    Enable verbose output");
    println!("  -h               Print short help");
    println!("      --help       Print detailed help");
    println!("  -V, --version    Print version");
    println!();
    println!("Examples:");
    println!("  rust_ddct template -o experiment.json");
    println!();
    println!("  rust_ddct run -i experiment.json -o ddct_results.tsv");
    println!();
    println!("  rust_ddct run -i experiment.json -o ddct_results.tsv \\");
    println!("    --samples samples.tsv --skipped skipped.tsv --levene-center mean --welch");
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

struct Outputs<'a> {
    comparisons: &'a str,
    samples: Option<&'a str>,
    skipped: Option<&'a str>,
    json: Option<&'a str>,
}

fn run(input_path: &str, outputs: &Outputs, params: &AnalysisParams, threads: usize) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let alphas = [
        ("--alpha", params.selection.significance_alpha),
        ("--normality-alpha", params.selection.normality_alpha),
        ("--variance-alpha", params.selection.variance_alpha),
    ];
    for (flag, value) in alphas {
        if !(value > 0.0 && value < 1.0) {
            return Err(DdctError::InvalidInput {
                reason: format!("{} must be in (0, 1), got {}", flag, value),
            });
        }
    }
    if !(params.no_change_tolerance >= 0.0) {
        return Err(DdctError::InvalidInput {
            reason: format!(
                "--no-change-tolerance must be non-negative, got {}",
                params.no_change_tolerance
            ),
        });
    }

    info!("Loading experiment from: {}", input_path);
    let run = analyze_file(input_path, params)?;

    info!("Writing results to: {}", outputs.comparisons);
    write_comparisons(outputs.comparisons, &run)?;

    if let Some(path) = outputs.samples {
        info!("Writing per-sample rows to: {}", path);
        write_sample_rows(path, &run)?;
    }
    if let Some(path) = outputs.skipped {
        info!("Writing skipped pairs to: {}", path);
        write_skipped(path, &run)?;
    }
    if let Some(path) = outputs.json {
        info!("Writing run JSON to: {}", path);
        write_run_json(path, &run)?;
    }

    println!("\n{}", run.summary());
    Ok(())
}

fn run_template(output_path: &str) -> Result<()> {
    let mut input = ExperimentInput::new();
    input
        .add_gene(
            "GENE1",
            GroupInput::new(
                "control",
                "22.5\n23.0\n22.8\n22.6",
                "24.5\n24.8\n24.6\n24.7",
            ),
        )
        .add_patient(GroupInput::new(
            "patient 1",
            "19.2\n19.6\n19.4\n19.5",
            "21.4\n21.0\n21.2\n21.3",
        ))
        .add_patient(GroupInput::new(
            "patient 2",
            "24,1\n24,4\n23,9\n24,2",
            "24,6\n24,5\n24,7\n24,4",
        ));

    info!("Writing example experiment to: {}", output_path);
    write_experiment(output_path, &input)?;
    Ok(())
}
