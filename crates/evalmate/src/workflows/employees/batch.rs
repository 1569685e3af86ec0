//! Dataset-wide derivation: CSV in, enriched CSV out.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::domain::{EmployeeRecord, FieldMap, FieldValue};
use super::scoring::DerivationGraph;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("unable to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("dataset has no header row")]
    MissingHeader,
}

/// Column holding the record identifier. Its cells are never coerced.
pub const ID_COLUMN: &str = "employee_id";

/// Parsed dataset, columns kept in input order. `cells` holds each row's
/// input text so pass-through columns are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTable {
    pub headers: Vec<String>,
    pub records: Vec<EmployeeRecord>,
    pub cells: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub columns_in: usize,
    pub columns_out: usize,
}

/// Reads every row into a sparse record; empty cells stay absent.
pub fn read_dataset<Rd: Read>(reader: Rd) -> Result<DatasetTable, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_owned).collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(BatchError::MissingHeader);
    }

    let mut records = Vec::new();
    let mut cells = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let mut fields = FieldMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            let value = if header == ID_COLUMN {
                Some(cell.trim())
                    .filter(|id| !id.is_empty())
                    .map(|id| FieldValue::Text(id.to_string()))
            } else {
                FieldValue::from_cell(cell)
            };
            if let Some(value) = value {
                fields.insert(header.clone(), value);
            }
        }
        let employee_id = fields
            .get(ID_COLUMN)
            .map(|value| value.to_string())
            .unwrap_or_else(|| format!("row-{:05}", index + 1));

        let mut record = EmployeeRecord::new(employee_id);
        record.fields = fields;
        records.push(record);
        cells.push(row.iter().map(str::to_owned).collect());
    }

    Ok(DatasetTable {
        headers,
        records,
        cells,
    })
}

/// Input columns first, then every derived column not already present, in
/// pipeline order. Input cells are copied verbatim unless the engine wrote
/// that column for the row. Absent values are written as empty cells.
pub fn write_dataset<W: Write>(
    writer: W,
    table: &DatasetTable,
    derived_columns: &[&str],
) -> Result<usize, BatchError> {
    let mut columns = table.headers.clone();
    for derived in derived_columns {
        if !columns.iter().any(|column| column.as_str() == *derived) {
            columns.push(derived.to_string());
        }
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&columns)?;
    for (row_index, record) in table.records.iter().enumerate() {
        let input = table.cells.get(row_index);
        let row = columns.iter().enumerate().map(|(column_index, column)| {
            if column_index < table.headers.len() && !record.is_engine_written(column) {
                return input
                    .and_then(|cells| cells.get(column_index))
                    .cloned()
                    .unwrap_or_default();
            }
            record
                .get(column)
                .map(|value| value.to_string())
                .unwrap_or_default()
        });
        csv_writer.write_record(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(columns.len())
}

/// Derives every row in parallel and writes the enriched dataset.
pub fn derive_dataset<Rd: Read, W: Write>(
    graph: &DerivationGraph,
    reader: Rd,
    writer: W,
) -> Result<BatchSummary, BatchError> {
    let mut table = read_dataset(reader)?;
    graph.compute_batch(&mut table.records);
    let columns_out = write_dataset(writer, &table, &graph.order())?;

    let summary = BatchSummary {
        rows: table.records.len(),
        columns_in: table.headers.len(),
        columns_out,
    };
    info!(
        rows = summary.rows,
        columns_in = summary.columns_in,
        columns_out = summary.columns_out,
        "dataset derivation complete"
    );
    Ok(summary)
}

pub fn derive_file(
    graph: &DerivationGraph,
    input: &Path,
    output: &Path,
) -> Result<BatchSummary, BatchError> {
    let reader = File::open(input).map_err(|source| BatchError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let writer = File::create(output).map_err(|source| BatchError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    derive_dataset(graph, reader, writer)
}
