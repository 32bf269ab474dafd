// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraud_hunter::{
    control_recommendations, detect_columns, render_summary_table, run_analysis,
    write_risk_summary_csv, AnalysisConfig, ColumnMapping, RawTable,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fraud-hunter", version, about = "Forensic anomaly detection for transaction ledgers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every detector over a CSV and export the risk summary
    Analyze {
        /// Transaction CSV file
        csv: PathBuf,

        /// Approval threshold (overrides the config file)
        #[arg(long)]
        threshold: Option<f64>,

        /// Minimum vendor-name similarity, 0-100
        #[arg(long)]
        fuzzy_cutoff: Option<u8>,

        /// JSON config file
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Where risk_summary.csv (and analysis.json) are written
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,

        /// Header of the date column (auto-detected otherwise)
        #[arg(long)]
        date_column: Option<String>,

        /// Header of the amount column (auto-detected otherwise)
        #[arg(long)]
        amount_column: Option<String>,

        /// Header of the vendor column (auto-detected otherwise)
        #[arg(long)]
        vendor_column: Option<String>,

        /// Also write the full report as analysis.json
        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal dashboard
    Dashboard {
        /// Transaction CSV file
        csv: PathBuf,

        /// Initial approval threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// JSON config file
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
}

struct ColumnOverrides {
    date: Option<String>,
    amount: Option<String>,
    vendor: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            csv,
            threshold,
            fuzzy_cutoff,
            config,
            output_dir,
            date_column,
            amount_column,
            vendor_column,
            json,
        } => {
            let config = load_config(&config, threshold, fuzzy_cutoff)?;
            let overrides = ColumnOverrides {
                date: date_column,
                amount: amount_column,
                vendor: vendor_column,
            };
            run_analyze(&csv, &config, &overrides, &output_dir, json)
        }
        Command::Dashboard {
            csv,
            threshold,
            config,
        } => {
            let config = load_config(&config, threshold, None)?;
            run_dashboard(&csv, config)
        }
    }
}

fn load_config(path: &Path, threshold: Option<f64>, fuzzy_cutoff: Option<u8>) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::load_or_default(path)?;

    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(cutoff) = fuzzy_cutoff {
        config = config.with_fuzzy_cutoff(cutoff);
    }

    config.validate().context("Invalid analysis parameters")?;
    Ok(config)
}

fn run_analyze(
    csv_path: &Path,
    config: &AnalysisConfig,
    overrides: &ColumnOverrides,
    output_dir: &Path,
    write_json: bool,
) -> Result<()> {
    println!("🕵️  Fraud Hunter - Forensic Transaction Analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading {:?}...", csv_path);
    let raw = RawTable::from_csv_path(csv_path)?;
    println!("✓ Loaded {} rows", raw.rows.len());

    // 2. Map columns
    let mapping = ColumnMapping::for_dashboard(detect_columns(&raw.headers), raw.headers.len())
        .with_overrides(
            &raw.headers,
            overrides.date.as_deref(),
            overrides.amount.as_deref(),
            overrides.vendor.as_deref(),
        )?;
    let column = |c: usize| raw.headers.get(c).map(String::as_str).unwrap_or("-");
    println!(
        "✓ Columns: date = {}, amount = {}, vendor = {}",
        column(mapping.date),
        column(mapping.amount),
        mapping.vendor.map(column).unwrap_or("-")
    );

    let outcome = raw
        .to_dataset(&mapping)
        .with_context(|| format!("Failed to build dataset from {:?}", csv_path))?;
    for warning in outcome.warnings(&mapping, &raw.headers) {
        println!("⚠️  {}", warning);
    }

    // 3. Run detectors
    println!("\n🔍 Running detectors (threshold {})...", config.threshold_amount);
    let report = run_analysis(&outcome.dataset, config)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 RISK SUMMARY ({} transactions)\n", report.total_transactions);
    print!("{}", render_summary_table(&report));

    for (section, err) in report.failures() {
        println!("❌ {} failed: {}", section.label(), err);
    }

    println!("\n🛡️  CONTROL RECOMMENDATIONS");
    for recommendation in control_recommendations() {
        println!("   - {}", recommendation);
    }

    // 4. Export
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let summary_path = output_dir.join("risk_summary.csv");
    write_risk_summary_csv(&report, &summary_path)?;
    println!("\n💾 Risk summary exported to {:?}", summary_path);

    if write_json {
        let json_path = output_dir.join("analysis.json");
        let json = serde_json::to_string_pretty(&report.to_response())
            .context("Failed to serialize analysis report")?;
        fs::write(&json_path, json)
            .with_context(|| format!("Failed to write {:?}", json_path))?;
        println!("💾 Full report exported to {:?}", json_path);
    }

    if report.is_complete() {
        println!("\n✅ Analysis complete");
    } else {
        println!("\n⚠️  Analysis complete with {} failed section(s)", report.failures().len());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_dashboard(csv_path: &Path, config: AnalysisConfig) -> Result<()> {
    println!("🖥️  Loading Fraud Hunter dashboard...\n");

    let raw = RawTable::from_csv_path(csv_path)?;
    println!("✓ Loaded {} rows from {:?}", raw.rows.len(), csv_path);
    println!("Starting UI... (Press 'q' to quit)\n");

    // stderr logging would draw over the alternate screen
    let previous_level = log::max_level();
    log::set_max_level(log::LevelFilter::Off);

    let mut app = ui::App::new(raw, config);
    let result = ui::run_ui(&mut app);

    log::set_max_level(previous_level);
    result?;

    println!("\n✅ Dashboard closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_dashboard(_csv_path: &Path, _config: AnalysisConfig) -> Result<()> {
    eprintln!("❌ Dashboard not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: fraud-hunter analyze <CSV>");
    std::process::exit(1);
}
