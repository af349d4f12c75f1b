mod console;

use anyhow::Context;
use baseline_core::{
    build_baselines, extract_values, write_baseline, AuditRewriter, AuditTemplate, BaselineAudit,
    BaselineOptions, OutputTarget, ReportSource, ValueTable,
};
use clap::{Parser, ValueEnum};
use comfy_table::{presets::ASCII_FULL, Table};
use console::Console;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Read an audit file and Nessus report(s) and create per-host baseline audits from the observed values"
)]
struct BaselineCli {
    /// Show a timestamp on console output
    #[arg(short, long)]
    timestamp: bool,
    /// Show per-file and per-host progress
    #[arg(short, long)]
    verbose: bool,
    /// Overwrite output files that already exist
    #[arg(short, long)]
    overwrite: bool,
    /// Write every output to this path instead of <audit>.<host>.<ext>
    #[arg(short, long, value_name = "PATH")]
    filename: Option<PathBuf>,
    /// Run summary format
    #[arg(long, default_value_t = SummaryFormat::Table)]
    format: SummaryFormat,
    /// Audit file to use as the template
    audit: PathBuf,
    /// Nessus report(s) to take observed values from; later files win per host
    #[arg(required = true)]
    reports: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Table,
    Json,
    Yaml,
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            SummaryFormat::Table => "table",
            SummaryFormat::Json => "json",
            SummaryFormat::Yaml => "yaml",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    audit: String,
    reports: Vec<String>,
    hosts: usize,
    outputs: &'a [BaselineAudit],
}

fn main() -> anyhow::Result<()> {
    let cli = BaselineCli::parse();
    let console = Console::new(
        cli.verbose,
        cli.timestamp,
        cli.format != SummaryFormat::Table,
    );
    let options = BaselineOptions {
        target: cli
            .filename
            .clone()
            .map_or(OutputTarget::PerHost, OutputTarget::Override),
        overwrite: cli.overwrite,
    };

    console.info("Start");

    console.info("Retrieving values");
    let table = load_values(&cli.reports, &console)?;

    console.info("Applying values");
    console.detail(format_args!("Reading {}", cli.audit.display()));
    let template = AuditTemplate::from_path(&cli.audit)?;
    let rewriter = AuditRewriter::with_default_patterns()?;
    let audits = build_baselines(
        std::slice::from_ref(&template),
        &table,
        &rewriter,
        &options,
    )
    .with_context(|| format!("failed to apply values to {}", cli.audit.display()))?;
    for audit in &audits {
        console.detail(format_args!(
            "Applied {} value(s) for {} ({} item(s))",
            audit.inserted, audit.host, audit.items
        ));
    }

    if audits.is_empty() {
        console.warn("no hosts found in the report(s); nothing to write");
    } else if let OutputTarget::Override(path) = &options.target {
        if audits.len() > 1 {
            console.warn(format_args!(
                "{} outputs share the override path {}; only one can be kept",
                audits.len(),
                path.display()
            ));
        }
    }

    console.info("Outputting files");
    for audit in &audits {
        console.detail(format_args!("Writing {}", audit.path.display()));
        write_baseline(audit, &options)?;
    }

    output_summary(&cli, &table, &audits)?;
    console.info("Done");

    Ok(())
}

fn load_values(paths: &[PathBuf], console: &Console) -> anyhow::Result<ValueTable> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        console.detail(format_args!("Reading {}", path.display()));
        sources.push(ReportSource::from_path(path)?);
    }

    let table = extract_values(&sources)?;
    for (host, values) in table.hosts() {
        console.detail(format_args!(
            "Retrieved {} value(s) from {host}",
            values.len()
        ));
    }
    Ok(table)
}

fn output_summary(
    cli: &BaselineCli,
    table: &ValueTable,
    audits: &[BaselineAudit],
) -> anyhow::Result<()> {
    let summary = RunSummary {
        audit: display_path(&cli.audit),
        reports: cli.reports.iter().map(|path| display_path(path)).collect(),
        hosts: table.len(),
        outputs: audits,
    };

    match cli.format {
        SummaryFormat::Table => {
            if !audits.is_empty() {
                println!("{}", render_summary_table(audits));
            }
        }
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        SummaryFormat::Yaml => {
            let yaml = serde_yaml::to_string(&summary)?;
            print!("{yaml}");
        }
    }

    Ok(())
}

fn render_summary_table(audits: &[BaselineAudit]) -> String {
    let mut display = Table::new();
    display.load_preset(ASCII_FULL);
    display.set_header(vec!["host", "output", "items", "known_good"]);

    for audit in audits {
        display.add_row(vec![
            audit.host.clone(),
            display_path(&audit.path),
            audit.items.to_string(),
            audit.inserted.to_string(),
        ]);
    }

    display.to_string()
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
