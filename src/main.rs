#![warn(clippy::unwrap_used)]
#![doc = include_str!("../README.md")]

mod categorize;
mod parser;
mod period;
mod report;
mod store;
mod sync;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use parser::IteratorExt;
use report::{PeriodFilter, ReportFilter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::HistoricalStore;
use sync::{FolderSink, StatementSink, SyncConfig};

/// Personal finance dashboard over bank statement (cartola) PDFs
#[derive(Debug, Parser)]
struct Args {
    /// Directory holding one CSV per billing period
    #[arg(long, default_value = "historico")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parses a statement PDF and merges its transactions into the history
    Ingest {
        /// A cartola PDF file
        input: PathBuf,
        /// Password protecting the PDF
        #[arg(long)]
        password: Option<String>,
        /// Prints the raw lines found in the PDF
        #[arg(long)]
        print_lines: bool,
    },
    /// Prints summary figures, category totals and the per-period trend
    Report {
        /// Billing period to report on, or "all"
        #[arg(long, default_value = "all")]
        period: String,
        /// Comma-separated categories to include (default: all)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
    },
    /// Lists the billing periods on disk
    Periods,
    /// Removes one billing period's file entirely
    Delete {
        /// Billing period label, e.g. 2025-07
        period: String,
    },
    /// Writes the consolidated history CSV, optionally pushing it to the
    /// sync folder
    Export {
        /// Destination of the consolidated CSV
        #[arg(long, default_value = sync::DEFAULT_EXPORT_NAME)]
        out: PathBuf,
        /// Copies the CSV into the configured sync folder
        #[arg(long)]
        sync: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Fecha")]
    pub date: NaiveDate,
    #[serde(rename = "Descripción")]
    pub description: String,
    #[serde(rename = "Monto")]
    pub amount: Decimal,
    #[serde(rename = "Categoría")]
    pub category: String,
    #[serde(rename = "Periodo")]
    pub period: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let Args { data_dir, command } = Args::parse();
    let store = HistoricalStore::open(&data_dir)?;
    let sync_config = SyncConfig::from_env();

    match command {
        Command::Ingest {
            input,
            password,
            print_lines,
        } => ingest(&store, &input, password.as_deref(), print_lines),
        Command::Report { period, categories } => print_report(&store, &period, &categories),
        Command::Periods => {
            for period in store.list_periods()? {
                println!("{period}");
            }
            Ok(())
        }
        Command::Delete { period } => {
            store.delete_period(&period)?;
            println!("deleted {period}");
            Ok(())
        }
        Command::Export { out, sync } => export(&store, &sync_config, &out, sync),
    }
}

fn ingest(
    store: &HistoricalStore,
    input: &Path,
    password: Option<&str>,
    print_lines: bool,
) -> Result<()> {
    let bytes =
        fs::read(input).with_context(|| format!("Could not read input file {input:?}"))?;
    let text = match password {
        Some(password) => pdf_extract::extract_text_from_mem_encrypted(&bytes, password),
        None => pdf_extract::extract_text_from_mem(&bytes),
    }
    .with_context(|| {
        format!("Could not extract PDF content from file {input:?} (wrong password or corrupt document?)")
    })?;

    let transactions: Vec<Transaction> = text
        .lines()
        .inspect(|line| {
            if print_lines {
                println!("{line}");
            }
        })
        .transactions()
        .collect();
    if transactions.is_empty() {
        bail!("No transaction lines found in {input:?}");
    }

    for outcome in store.merge_batch(&transactions)? {
        println!(
            "{} {}: {} rows ({} duplicates dropped)",
            if outcome.created { "created" } else { "updated" },
            outcome.period,
            outcome.total,
            outcome.duplicates_dropped
        );
    }
    Ok(())
}

fn print_report(store: &HistoricalStore, period: &str, categories: &[String]) -> Result<()> {
    let rows = store.load_all()?;
    if rows.is_empty() {
        bail!("No cartolas in the history yet; ingest a statement first");
    }
    let mut filter = ReportFilter::all();
    if period != "all" {
        filter.period = PeriodFilter::One(period.to_owned());
    }
    if !categories.is_empty() {
        filter.categories = Some(categories.iter().cloned().collect());
    }

    let summary = report::summarize(&rows, &filter);
    println!("Resumen financiero ({period})");
    println!("  Cargos        $ {:>14}", format_clp(summary.charges));
    println!("  Abonos        $ {:>14}", format_clp(summary.credits));
    println!("  Neto          $ {:>14}", format_clp(summary.net));

    println!();
    println!("Gasto por categoría");
    for (category, total) in report::category_totals(&rows, &filter) {
        println!("  {category:<14}$ {:>14}", format_clp(total));
    }

    println!();
    println!("Neto por cartola");
    for (label, net) in report::period_net_series(&rows) {
        println!("  {label:<14}$ {:>14}", format_clp(net));
    }
    Ok(())
}

fn export(
    store: &HistoricalStore,
    sync_config: &SyncConfig,
    out: &Path,
    push: bool,
) -> Result<()> {
    let rows = store.load_all()?;
    if rows.is_empty() {
        bail!("Nothing to export; the history is empty");
    }
    write_to_csv(&rows, out)?;
    println!("wrote {} rows to {}", rows.len(), out.display());

    if push {
        let sink = FolderSink::from_config(sync_config)?;
        let title = out
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(sync::DEFAULT_EXPORT_NAME);
        let id = sink.upload(out, title)?;
        println!("synced to {id}");
    }
    Ok(())
}

fn write_to_csv(rows: &[Transaction], file: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file)
        .with_context(|| format!("Could not write export file {file:?}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// CLP display formatting: no decimals, dot thousands separators.
fn format_clp(amount: Decimal) -> String {
    let digits = amount.abs().trunc().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    if amount.is_sign_negative() {
        format!("-{grouped}")
    } else {
        grouped
    }
}
