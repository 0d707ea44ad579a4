use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use omnipd::cpmodel::{CpAnalyzer, CpFitResult, CpModelError};
use omnipd::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use omnipd::model::{predicted_power, ModelParams};
use omnipd::{import, EngineConfig};

/// omniPD - Critical Power Curve Fitting
///
/// Fits the four-parameter omniPD model (CP, W', Pmax, A) to a rider's
/// mean-maximal-power curve and reports the derived metrics.
#[derive(Parser)]
#[command(name = "omnipd")]
#[command(version = "0.1.0")]
#[command(about = "Critical power curve fitting", long_about = None)]
struct Cli {
    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the omniPD model to an MMP curve
    Fit {
        /// CSV file with duration,power rows (seconds, watts)
        #[arg(short, long)]
        file: PathBuf,

        /// Athlete weight in kg (used for per-kg metrics only)
        #[arg(short, long, default_value = "1.0")]
        weight: f64,

        /// Output format (table, json)
        #[arg(short = 'o', long, default_value = "table")]
        format: String,

        /// Engine config file (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Evaluate the model at given durations for known parameters
    Predict {
        /// Critical power in watts
        #[arg(long)]
        cp: f64,

        /// W' in joules
        #[arg(long)]
        w_prime: f64,

        /// Pmax in watts
        #[arg(long)]
        pmax: f64,

        /// Decay coefficient in watts
        #[arg(long, default_value = "5.0")]
        a: f64,

        /// Durations to evaluate, in seconds
        #[arg(required = true)]
        durations: Vec<f64>,
    },
}

#[derive(tabled::Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        file_path: None,
    };
    init_logging(&log_config)?;

    match cli.command {
        Commands::Fit {
            file,
            weight,
            format,
            config,
        } => run_fit(&file, weight, &format, config.as_deref()),
        Commands::Predict {
            cp,
            w_prime,
            pmax,
            a,
            durations,
        } => {
            run_predict(ModelParams::new(cp, w_prime, pmax, a), &durations);
            Ok(())
        }
    }
}

fn run_fit(
    file: &std::path::Path,
    weight: f64,
    format: &str,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let engine_config = EngineConfig::load_or_default(config_path)?;
    let curve = import::read_mmp_csv(file)?;

    println!(
        "{}",
        format!("Fitting omniPD model to {} samples...", curve.len())
            .blue()
            .bold()
    );

    match CpAnalyzer::compute_with(&curve, weight, &engine_config) {
        Ok(result) => {
            match format {
                "json" => print_json(&result, weight)?,
                _ => print_table(&result),
            }
            println!("{}", "✓ Fit completed".green());
            Ok(())
        }
        Err(err) => {
            if let Some(model_err) = err.downcast_ref::<CpModelError>() {
                // Insufficient data is an expected outcome, not a crash
                println!("{}", format!("Cannot compute CP: {model_err}").yellow());
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

fn run_predict(params: ModelParams, durations: &[f64]) {
    println!(
        "{}",
        format!(
            "Model: CP={}W W'={}J Pmax={}W A={}W",
            params.cp, params.w_prime, params.pmax, params.a
        )
        .cyan()
    );
    for &t in durations {
        if t <= 0.0 {
            println!("  {:>8.1}s  {}", t, "invalid duration".red());
            continue;
        }
        println!("  {:>8.1}s  {:7.1} W", t, predicted_power(t, &params));
    }
}

fn print_table(result: &CpFitResult) {
    let option_watts = |value: Option<f64>| match value {
        Some(v) => format!("{v:.0} W"),
        None => "n/a".to_string(),
    };

    let rows = vec![
        MetricRow {
            metric: "CP".to_string(),
            value: format!("{:.0} W", result.cp),
        },
        MetricRow {
            metric: "W'".to_string(),
            value: format!("{:.0} J", result.w_prime),
        },
        MetricRow {
            metric: "Pmax".to_string(),
            value: format!("{:.0} W", result.pmax),
        },
        MetricRow {
            metric: "A".to_string(),
            value: format!("{:.2} W", result.a_param),
        },
        MetricRow {
            metric: "RMSE".to_string(),
            value: format!("{:.2} W", result.rmse),
        },
        MetricRow {
            metric: "MAE".to_string(),
            value: format!("{:.2} W", result.mae),
        },
        MetricRow {
            metric: "CP/kg".to_string(),
            value: format!("{} W/kg", result.cp_kg),
        },
        MetricRow {
            metric: "W'/kg".to_string(),
            value: format!("{} kJ/kg", result.w_prime_kg),
        },
        MetricRow {
            metric: "Pmax/kg".to_string(),
            value: format!("{} W/kg", result.pmax_kg),
        },
        MetricRow {
            metric: "t99".to_string(),
            value: format!("{:.1} s", result.t_99),
        },
        MetricRow {
            metric: "Percentile used".to_string(),
            value: result.used_percentile.to_string(),
        },
        MetricRow {
            metric: "Points used".to_string(),
            value: result.points_used.to_string(),
        },
        MetricRow {
            metric: "Forced long point".to_string(),
            value: match result.forced_long_point {
                Some(rank) => format!("yes (rank {rank:.1})"),
                None => "no".to_string(),
            },
        },
        MetricRow {
            metric: "MMP 1s".to_string(),
            value: option_watts(result.mmp_1s),
        },
        MetricRow {
            metric: "MMP 5s".to_string(),
            value: option_watts(result.mmp_5s),
        },
        MetricRow {
            metric: "MMP 3m".to_string(),
            value: option_watts(result.mmp_3m),
        },
        MetricRow {
            metric: "MMP 6m".to_string(),
            value: option_watts(result.mmp_6m),
        },
        MetricRow {
            metric: "MMP 12m".to_string(),
            value: option_watts(result.mmp_12m),
        },
    ];

    println!("{}", tabled::Table::new(rows));
}

fn print_json(result: &CpFitResult, weight: f64) -> Result<()> {
    let envelope = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "weight_kg": weight,
        "result": result,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
