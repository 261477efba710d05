// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export of a resolved store back to sheets.
//!
//! The driver walks the pages and hands each one to an [`Exporter`] as a
//! header plus rows of text. [`CsvExporter`] writes one CSV file per page.

use std::path::Path;

use crate::diagnostics::{Category, MessageLogger};
use crate::error::Result;
use crate::fields::FieldRegistry;
use crate::keys::SheetKind;
use crate::params;
use crate::records::{Record, RecordData};
use crate::store::RecordStore;

/// Sink for exported pages.
pub trait Exporter {
    /// Starts a new page with the given header.
    fn process_page(&mut self, name: &str, columns: &[String]) -> Result<()>;

    /// Adds a row to the current page.
    fn add_row(&mut self, values: Vec<String>) -> Result<()>;

    /// Writes everything collected to `destination`.
    fn write(&mut self, destination: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
struct PageBuffer {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Writes `<destination>/<PAGE>.csv` for every exported page.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    delimiter: u8,
    pages: Vec<PageBuffer>,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            pages: Vec::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Number of rows buffered for a page.
    pub fn row_count(&self, name: &str) -> Option<usize> {
        self.pages.iter().find(|p| p.name == name).map(|p| p.rows.len())
    }
}

impl Exporter for CsvExporter {
    fn process_page(&mut self, name: &str, columns: &[String]) -> Result<()> {
        self.pages.push(PageBuffer {
            name: name.to_string(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        });
        Ok(())
    }

    fn add_row(&mut self, values: Vec<String>) -> Result<()> {
        if let Some(page) = self.pages.last_mut() {
            page.rows.push(values);
        }
        Ok(())
    }

    fn write(&mut self, destination: &Path) -> Result<()> {
        std::fs::create_dir_all(destination)?;
        for page in &self.pages {
            let path = destination.join(format!("{}.csv", page.name));
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_path(&path)?;
            writer.write_record(&page.columns)?;
            for row in &page.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            tracing::debug!(page = %page.name, rows = page.rows.len(), path = %path.display(), "page exported");
        }
        Ok(())
    }
}

/// Exports every page of `store` through `exporter` and writes it to
/// `destination`.
///
/// An empty destination is reported as `missing-export-file-name` and
/// nothing is exported. Returns the number of rows written.
pub fn export_store<E: Exporter + ?Sized, L: MessageLogger>(
    store: &RecordStore,
    registry: &FieldRegistry,
    exporter: &mut E,
    destination: &str,
    log: &mut L,
) -> Result<usize> {
    let destination = destination.trim();
    if destination.is_empty() {
        log.error(Category::MissingExportFileName, params![]);
        return Ok(0);
    }

    let mut rows = 0;
    for kind in SheetKind::ALL {
        let Some(page) = store.page(kind) else {
            continue;
        };
        let columns: Vec<String> = if page.columns().is_empty() {
            registry.columns(kind).into_iter().map(str::to_string).collect()
        } else {
            page.columns().to_vec()
        };
        exporter.process_page(kind.as_str(), &columns)?;

        for (_, record) in store.records_of(kind) {
            for row in expand(record) {
                exporter.add_row(row_values(store, registry, &row, &columns))?;
                rows += 1;
            }
        }
    }

    exporter.write(Path::new(destination))?;
    Ok(rows)
}

/// Splits a record into the rows it is written as: a job row followed by
/// one row per task, or one group row per member.
fn expand(record: &Record) -> Vec<Record> {
    match &record.data {
        RecordData::Job(job) => {
            let mut rows = Vec::with_capacity(job.tasks.len() + 1);
            let mut head = record.clone();
            if let Some(j) = head.as_job_mut() {
                j.tasks.clear();
            }
            rows.push(head);
            for task in &job.tasks {
                let mut row = record.clone();
                row.description = task.description.clone();
                if let Some(j) = row.as_job_mut() {
                    j.tasks.clear();
                    j.task_number = task.name.clone();
                    j.duration = task.duration.clone();
                    j.duration_unit = task.duration_unit.clone();
                    j.priors = task.prerequisites.join(",");
                }
                rows.push(row);
            }
            rows
        }
        RecordData::System(group) | RecordData::Zone(group) if group.member_names.len() > 1 => group
            .member_names
            .iter()
            .map(|member| {
                let mut row = record.clone();
                if let Some(g) = row.as_group_mut() {
                    g.member_names = vec![member.clone()];
                }
                row
            })
            .collect(),
        _ => vec![record.clone()],
    }
}

/// Column values of one row: the field binding when the column has one,
/// otherwise the value of a bound attribute of the same name.
fn row_values(store: &RecordStore, registry: &FieldRegistry, record: &Record, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            registry.value(record, column).unwrap_or_else(|| {
                record
                    .attribute(column)
                    .and_then(|a| store.record(a))
                    .and_then(Record::as_attribute)
                    .map(|a| a.value.clone())
                    .unwrap_or_default()
            })
        })
        .collect()
}
