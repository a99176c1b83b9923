//! anfis-fit - Fit sin(x) on [0, 2π] with a grid of Gaussian rules
//!
//! # Usage
//!
//! ```bash
//! # Default run: 7 rules, 64 samples, up to 2000 epochs
//! anfis-fit
//!
//! # Custom grid and a JSON training config
//! anfis-fit --rules 11 --epochs 500 --config qprop.json
//!
//! # Print every epoch
//! anfis-fit -v
//! ```
//!
//! # Exit Codes
//!
//! - 0: Training finished
//! - 1: Training failed
//! - 2: Invalid arguments or IO error

use std::f64::consts::TAU;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anfis_qprop::{fit, FitConfig, FitReport, GaussianRule, QPropConfig, QPropTraining, Rule};
use anyhow::{bail, Context, Result};

struct Options {
    rules: usize,
    epochs: usize,
    samples: usize,
    config: Option<PathBuf>,
    verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rules: 7,
            epochs: 2000,
            samples: 64,
            config: None,
            verbose: false,
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}\n", e);
            print_help();
            return ExitCode::from(2);
        }
    };

    let config = match &options.config {
        Some(path) => match QPropConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::from(2);
            }
        },
        None => QPropConfig::aggressive(),
    };

    match run(&options, config) {
        Ok((report, rules)) => {
            print!("{}", render_report(&report, &rules, options.verbose));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Training failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-v" | "--verbose" => options.verbose = true,
            "-r" | "--rules" => options.rules = parse_count(arg, iter.next())?,
            "-e" | "--epochs" => options.epochs = parse_count(arg, iter.next())?,
            "-n" | "--samples" => options.samples = parse_count(arg, iter.next())?,
            "-c" | "--config" => {
                let path = iter.next().with_context(|| format!("{} needs a path", arg))?;
                options.config = Some(PathBuf::from(path));
            }
            other => bail!("unknown option: {}", other),
        }
    }

    if options.rules < 2 || options.samples < 3 {
        bail!("need at least 2 rules and 3 samples");
    }
    Ok(Some(options))
}

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize> {
    let value = value.with_context(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .with_context(|| format!("{} expects a non-negative integer, got {:?}", flag, value))
}

/// Evenly spaced Gaussian rules covering [0, 2π], width equal to the spacing
fn rule_grid(n: usize) -> Vec<GaussianRule> {
    let spacing = TAU / (n - 1) as f64;
    (0..n)
        .map(|i| GaussianRule::new(vec![i as f64 * spacing], vec![spacing], vec![0.0]))
        .collect()
}

fn sample_sine(n: usize, offset: f64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let step = TAU / (n - 1) as f64;
    let inputs: Vec<Vec<f64>> = (0..n)
        .map(|i| vec![((i as f64 + offset) * step).min(TAU)])
        .collect();
    let targets = inputs.iter().map(|x| vec![x[0].sin()]).collect();
    (inputs, targets)
}

fn run(options: &Options, config: QPropConfig) -> Result<(FitReport, Vec<GaussianRule>)> {
    let mut rules = rule_grid(options.rules);
    let (inputs, targets) = sample_sine(options.samples, 0.0);
    // Held-out points halfway between the training samples
    let (val_inputs, val_targets) = sample_sine(options.samples - 1, 0.5);

    let mut training = QPropTraining::new(config).context("invalid training config")?;
    let fit_config = FitConfig {
        max_epochs: options.epochs,
        log_every: 0,
    };

    let report = fit(
        &mut training,
        &inputs,
        &targets,
        &mut rules,
        Some((val_inputs.as_slice(), val_targets.as_slice())),
        fit_config,
    )?;
    Ok((report, rules))
}

/// Epoch history (verbose), summary, then the trained rules (verbose)
fn render_report(report: &FitReport, rules: &[GaussianRule], verbose: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, report, rules, verbose);
    out
}

fn write_report(
    out: &mut String,
    report: &FitReport,
    rules: &[GaussianRule],
    verbose: bool,
) -> std::fmt::Result {
    if verbose {
        for m in &report.epochs {
            writeln!(
                out,
                "epoch {:>5}  train {:.6e}  validation {:.6e}",
                m.epoch,
                m.train_error,
                m.validation_error.unwrap_or(f64::NAN)
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "epochs run:        {}", report.epochs.len())?;
    match report.converged_epoch {
        Some(epoch) => writeln!(out, "converged at:      {}", epoch)?,
        None => writeln!(out, "converged at:      - (epoch limit)")?,
    }
    if let Some(e) = report.final_train_error() {
        writeln!(out, "train error:       {:.6e}", e)?;
    }
    if let Some(e) = report.final_validation_error() {
        writeln!(out, "validation error:  {:.6e}", e)?;
    }
    if let Some(best) = report.best_validation_epoch() {
        writeln!(
            out,
            "best validation:   {:.6e} (epoch {})",
            best.validation_error.unwrap_or(f64::NAN),
            best.epoch
        )?;
    }
    writeln!(out, "elapsed:           {} ms", report.elapsed_ms)?;

    if verbose {
        writeln!(out)?;
        writeln!(out, "trained rules:")?;
        for (i, rule) in rules.iter().enumerate() {
            writeln!(
                out,
                "  rule {:>2}: center {:>8.4}  width {:>7.4}  consequent {:>8.4}",
                i,
                rule.centers()[0],
                rule.widths()[0],
                rule.consequent()[0]
            )?;
        }
    }
    Ok(())
}

fn print_help() {
    eprintln!("anfis-fit - Fit sin(x) with an ANFIS rule grid and QProp training");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    anfis-fit [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -r, --rules <N>      Number of Gaussian rules (default 7)");
    eprintln!("    -e, --epochs <N>     Maximum training epochs (default 2000)");
    eprintln!("    -n, --samples <N>    Training samples on [0, 2π] (default 64)");
    eprintln!("    -c, --config <PATH>  JSON training config (default: aggressive preset)");
    eprintln!("    -v, --verbose        Print every epoch and the trained rules");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("EXIT CODES:");
    eprintln!("    0    Training finished");
    eprintln!("    1    Training failed");
    eprintln!("    2    Invalid arguments or IO error");
}
