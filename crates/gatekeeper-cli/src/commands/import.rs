use crate::commands::{print_json, Context};
use crate::util::now_utc;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use gatekeeper_sync::sheet::{self, ImportReport};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Load a CSV export of the pipeline sheet
    Csv(ImportCsvArgs),
}

#[derive(Debug, Args)]
pub struct ImportCsvArgs {
    pub file: PathBuf,
    /// Replace the current rows instead of appending
    #[arg(long)]
    pub replace: bool,
    #[arg(long)]
    pub dry_run: bool,
}

pub fn import_csv(ctx: &Context<'_>, args: ImportCsvArgs) -> Result<()> {
    let data = fs::read(&args.file)
        .with_context(|| format!("read csv file {}", args.file.display()))?;
    let parsed = sheet::parse_pipeline_csv(&data)?;
    let report = ImportReport {
        imported: parsed.rows.len(),
        skipped: parsed.skipped,
        replaced: args.replace,
        dry_run: args.dry_run,
        warnings: parsed.warnings,
    };

    if !args.dry_run {
        let table = ctx.config.pipeline_table.as_str();
        let repo = ctx.store.pipeline(table);
        repo.ensure_table()?;
        let now = now_utc();
        if args.replace {
            repo.replace_rows(&parsed.rows, now)?;
        } else {
            repo.insert_rows(&parsed.rows, now)?;
        }
        debug!(table, rows = report.imported, replace = args.replace, "pipeline rows imported");
    }

    if ctx.json {
        return print_json(&report);
    }

    let verb = if report.dry_run { "Would import" } else { "Imported" };
    println!(
        "{verb} pipeline rows: {} (skipped {}){}",
        report.imported,
        report.skipped,
        if report.replaced { ", replacing existing rows" } else { "" }
    );
    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in report.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}
