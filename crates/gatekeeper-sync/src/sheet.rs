//! CSV export of the pipeline sheet.
//!
//! Columns are located by header rather than by position. Both the English
//! column names and the labels used on the sheet (`Nome`, `Cognome`, ...) are
//! accepted, case-insensitively.

use crate::error::{Result, SyncError};
use gatekeeper_core::domain::PipelineRow;
use serde::Serialize;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub replaced: bool,
    pub dry_run: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub rows: Vec<PipelineRow>,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    FirstName,
    LastName,
    Customer,
    Phone,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let key = header.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "id" | "id_cliente" => Some(Column::Id),
            "first_name" | "firstname" | "nome" => Some(Column::FirstName),
            "last_name" | "lastname" | "cognome" => Some(Column::LastName),
            "customer" | "cliente" => Some(Column::Customer),
            "phone" | "telefono" => Some(Column::Phone),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Customer => "customer",
            Column::Phone => "phone",
        }
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    id: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    customer: Option<usize>,
    phone: Option<usize>,
}

impl ColumnMap {
    fn slot(&mut self, column: Column) -> &mut Option<usize> {
        match column {
            Column::Id => &mut self.id,
            Column::FirstName => &mut self.first_name,
            Column::LastName => &mut self.last_name,
            Column::Customer => &mut self.customer,
            Column::Phone => &mut self.phone,
        }
    }

    fn has_lookup_columns(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.customer.is_some()
            || self.phone.is_some()
    }
}

pub fn parse_pipeline_csv(data: &[u8]) -> Result<ParsedSheet> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(SyncError::Parse("csv file is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut warnings = Vec::new();
    let columns = map_headers(reader.headers()?, &mut warnings)?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warnings.push(format!("line {line}: {err}"));
                skipped += 1;
                continue;
            }
        };

        let cell = |slot: Option<usize>| {
            slot.and_then(|index| record.get(index))
                .unwrap_or_default()
                .to_string()
        };
        let row = PipelineRow {
            id: cell(columns.id),
            first_name: cell(columns.first_name),
            last_name: cell(columns.last_name),
            customer: cell(columns.customer),
            phone: cell(columns.phone),
        };

        if is_blank(&row) {
            skipped += 1;
            continue;
        }
        if columns.id.is_some() && row.id.is_empty() {
            warnings.push(format!(
                "line {line}: missing id, row still matches lookups \
                 but cannot be referenced as an existing customer"
            ));
        }
        rows.push(row);
    }

    Ok(ParsedSheet {
        rows,
        skipped,
        warnings,
    })
}

fn map_headers(headers: &csv::StringRecord, warnings: &mut Vec<String>) -> Result<ColumnMap> {
    let mut columns = ColumnMap::default();
    for (index, header) in headers.iter().enumerate() {
        let Some(column) = Column::from_header(header) else {
            continue;
        };
        let slot = columns.slot(column);
        if slot.is_some() {
            warnings.push(format!(
                "duplicate {} column {:?} ignored",
                column.as_str(),
                header
            ));
            continue;
        }
        *slot = Some(index);
    }

    if !columns.has_lookup_columns() {
        return Err(SyncError::Parse(
            "no name or phone column found in csv header".to_string(),
        ));
    }
    if columns.id.is_none() {
        warnings.push(
            "no id column found; imported rows still match lookups but cannot be referenced by id"
                .to_string(),
        );
    }
    Ok(columns)
}

fn is_blank(row: &PipelineRow) -> bool {
    row.id.is_empty()
        && row.first_name.is_empty()
        && row.last_name.is_empty()
        && row.customer.is_empty()
        && row.phone.is_empty()
}
