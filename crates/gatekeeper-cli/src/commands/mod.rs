use anyhow::{Context as _, Result};
use gatekeeper_config::AppConfig;
use gatekeeper_core::RecordIndex;
use gatekeeper_store::Store;
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

pub mod check;
pub mod completions;
pub mod import;
pub mod orders;
pub mod prefill;
pub mod resolve;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

impl Context<'_> {
    /// Snapshot of the configured pipeline table.
    pub fn load_index(&self) -> Result<RecordIndex> {
        let table = self.config.pipeline_table.as_str();
        let repo = self.store.pipeline(table);
        let rows = repo
            .read_all()
            .with_context(|| format!("read pipeline table {table}"))?;
        let index = RecordIndex::from_rows(&rows);
        let imported_at = repo
            .last_import()
            .with_context(|| format!("read import log for {table}"))?
            .map(|stamp| stamp.imported_at);
        debug!(
            table,
            rows = rows.len(),
            records = index.len(),
            ?imported_at,
            "pipeline snapshot loaded"
        );
        Ok(index)
    }
}

/// Lookup fields shared by every command that takes a customer.
#[derive(Debug, Clone, clap::Args)]
pub struct CandidateArgs {
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
}

impl CandidateArgs {
    pub fn to_candidate(&self) -> gatekeeper_core::Candidate {
        gatekeeper_core::Candidate::new(
            self.first_name.trim(),
            self.last_name.trim(),
            self.phone.trim(),
        )
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
