// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row sources: where sheets come from.
//!
//! A source yields, per sheet kind, a header row followed by data rows.
//! Unreadable cells surface as [`CellReadError`] items inside the stream so
//! one bad cell never ends the sheet.

use std::fs::File;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{CellReadError, Error, Result};
use crate::keys::SheetKind;

/// One row, or the cell that could not be read.
pub type Row = std::result::Result<Vec<String>, CellReadError>;

/// Row stream of one sheet, header first.
pub type Rows = Box<dyn Iterator<Item = Row>>;

/// Producer of sheets for the loader.
pub trait RowSource {
    /// Name recorded on every record read from this source.
    fn file_name(&self) -> &str;

    /// Opens a sheet, or returns `Ok(None)` when the source has no such
    /// sheet. An `Err` is fatal for that sheet only.
    fn open_sheet(&self, kind: SheetKind) -> Result<Option<Rows>>;
}

/// In-memory sheets.
///
/// # Example
///
/// ```
/// use cobie_lite_core::{MemorySource, RowSource, SheetKind};
///
/// let source = MemorySource::new("model.xlsx")
///     .with_sheet(SheetKind::Floor, &["Name", "Elevation"], &[&["L1", "0"]]);
/// let rows: Vec<_> = source.open_sheet(SheetKind::Floor).unwrap().unwrap().collect();
/// assert_eq!(rows.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    file_name: String,
    sheets: FxHashMap<SheetKind, Vec<Row>>,
}

impl MemorySource {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            sheets: FxHashMap::default(),
        }
    }

    /// Adds a sheet from a header and plain string rows.
    pub fn with_sheet(mut self, kind: SheetKind, header: &[&str], rows: &[&[&str]]) -> Self {
        let mut all = Vec::with_capacity(rows.len() + 1);
        all.push(Ok(header.iter().map(|s| s.to_string()).collect()));
        all.extend(rows.iter().map(|r| Ok(r.iter().map(|s| s.to_string()).collect())));
        self.sheets.insert(kind, all);
        self
    }

    /// Adds a sheet from raw rows, header included, which may carry cell
    /// errors.
    pub fn with_rows(mut self, kind: SheetKind, rows: Vec<Row>) -> Self {
        self.sheets.insert(kind, rows);
        self
    }
}

impl RowSource for MemorySource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn open_sheet(&self, kind: SheetKind) -> Result<Option<Rows>> {
        Ok(self
            .sheets
            .get(&kind)
            .map(|rows| Box::new(rows.clone().into_iter()) as Rows))
    }
}

/// A directory holding one delimited file per sheet (`Floor.csv`,
/// `Attribute Type.csv`, `value_list.tsv`, ...).
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    file_name: String,
    files: FxHashMap<SheetKind, PathBuf>,
    unsupported: Vec<PathBuf>,
}

fn delimiter_for(path: &Path) -> Option<u8> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(b','),
        "tsv" | "txt" => Some(b'\t'),
        _ => None,
    }
}

impl CsvDirectorySource {
    /// Indexes the sheet files of a directory.
    ///
    /// Files whose stem names a sheet but whose extension is not a
    /// delimited format are remembered in [`Self::unsupported`]; anything
    /// else is ignored.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::UnsupportedFileType(dir.display().to_string()));
        }

        let mut files = FxHashMap::default();
        let mut unsupported = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(kind) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(SheetKind::from_name)
            else {
                continue;
            };
            if delimiter_for(&path).is_some() {
                files.insert(kind, path);
            } else {
                unsupported.push(path);
            }
        }
        unsupported.sort();

        tracing::debug!(dir = %dir.display(), sheets = files.len(), "indexed sheet directory");
        Ok(Self {
            file_name: dir.display().to_string(),
            files,
            unsupported,
        })
    }

    /// Sheet files with an extension that cannot be read.
    pub fn unsupported(&self) -> &[PathBuf] {
        &self.unsupported
    }

    /// Path of the file backing a sheet, if present.
    pub fn path_of(&self, kind: SheetKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }
}

impl RowSource for CsvDirectorySource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn open_sheet(&self, kind: SheetKind) -> Result<Option<Rows>> {
        let Some(path) = self.files.get(&kind) else {
            return Ok(None);
        };
        let delimiter = delimiter_for(path).unwrap_or(b',');
        let file = File::open(path).map_err(|e| Error::SheetRead {
            sheet: kind,
            message: format!("{}: {e}", path.display()),
        })?;
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let rows = reader.into_byte_records().map(|record| {
            let record = record.map_err(|e| CellReadError::new(0, e.to_string()))?;
            record
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    std::str::from_utf8(field)
                        .map(str::to_string)
                        .map_err(|e| CellReadError::new(i, e.to_string()))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        });
        Ok(Some(Box::new(rows)))
    }
}
