// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row-to-record mapping for one sheet.
//!
//! The header row decides what each column feeds: a column override turns
//! it into an attribute, a registry binding into a typed field, and an
//! unknown header either into an extension attribute or, when extension
//! columns are off, into a `missing-property` warning.

use crate::config::{Flags, ParseOptions};
use crate::diagnostics::{Category, MessageLogger};
use crate::fields::{FieldDef, FieldRegistry};
use crate::ids::IdFactory;
use crate::keys::{RecordKey, SheetKind};
use crate::merge::{reconcile, Reconciled};
use crate::params;
use crate::records::Record;
use crate::resolve::ResolutionContext;
use crate::skip::should_skip;
use crate::source::Rows;
use crate::store::RecordStore;
use crate::text::{filter_na, is_blank};

/// What a header column feeds.
#[derive(Debug, Clone)]
enum Column {
    Field(FieldDef),
    /// Demoted by a converted-field override.
    Attribute(String),
    /// Unknown header kept as an extension attribute.
    Extension(String),
    Ignored,
}

/// Counters for one loaded sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read, blank and malformed ones included.
    pub rows: usize,
    /// Rows that became new records.
    pub admitted: usize,
    /// Rows folded into an existing record.
    pub merged: usize,
    pub skipped: usize,
}

/// Fields copied from a row onto the attributes extracted from it.
struct Provenance {
    sheet: SheetKind,
    row_name: String,
    created_by: String,
    created_on: String,
    ext_system: String,
    ext_object: String,
    source_file: String,
}

/// Borrows the parser state a sheet load mutates.
pub(crate) struct Loader<'a, L: MessageLogger> {
    pub store: &'a mut RecordStore,
    pub registry: &'a FieldRegistry,
    pub options: &'a ParseOptions,
    pub cx: &'a mut ResolutionContext,
    pub ids: &'a mut dyn IdFactory,
    pub log: &'a mut L,
}

impl<L: MessageLogger> Loader<'_, L> {
    fn flags(&self) -> Flags {
        self.cx.flags
    }

    fn plan_columns(&mut self, kind: SheetKind, header: &[String]) -> Vec<Column> {
        // Attribute and document rows are keyed by the row they describe,
        // so extension attributes on them would have nothing to bind to.
        let extensions = self.flags().contains(Flags::CONVERT_EXTENSION_COLUMNS)
            && !matches!(kind, SheetKind::Attribute | SheetKind::Document);

        header
            .iter()
            .map(|name| {
                let name = name.trim();
                if name.is_empty() {
                    Column::Ignored
                } else if let Some(attribute) = self.options.converted_field(kind, name) {
                    Column::Attribute(attribute.to_string())
                } else if let Some(def) = self.registry.lookup(kind, name) {
                    Column::Field(*def)
                } else if extensions {
                    Column::Extension(name.to_string())
                } else {
                    self.log.warning(Category::MissingProperty, params![kind, name]);
                    Column::Ignored
                }
            })
            .collect()
    }

    /// Loads one sheet: header row first, then data rows.
    pub fn load_sheet(&mut self, kind: SheetKind, mut rows: Rows, file_name: &str) -> LoadStats {
        let mut stats = LoadStats::default();
        let header = match rows.next() {
            Some(Ok(header)) => header,
            Some(Err(e)) => {
                self.log.error(Category::FileReadError, params![kind, e]);
                return stats;
            }
            None => return stats,
        };
        let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let columns = self.plan_columns(kind, &header);
        self.store.ensure_page(kind).set_columns(header.clone());

        // Spreadsheet numbering: the header is row 1.
        let mut row_number = 1usize;
        for row in rows {
            row_number += 1;
            stats.rows += 1;

            let values = match row {
                Ok(values) => values,
                Err(e) => {
                    let column = header.get(e.column).map(String::as_str).unwrap_or("");
                    self.log.error(
                        Category::InvalidCellValue,
                        params![kind, row_number, column, e.column],
                    );
                    continue;
                }
            };
            if values.iter().all(|v| is_blank(v)) {
                continue;
            }

            match self.load_row(kind, &columns, &values, file_name) {
                Some(Reconciled::Insert) => stats.admitted += 1,
                Some(Reconciled::Merged) => stats.merged += 1,
                Some(Reconciled::Duplicate) | None => stats.skipped += 1,
            }
        }

        tracing::debug!(
            sheet = kind.as_str(),
            rows = stats.rows,
            admitted = stats.admitted,
            merged = stats.merged,
            skipped = stats.skipped,
            "sheet loaded"
        );
        stats
    }

    /// Maps one data row; returns `None` when the row was skipped.
    fn load_row(
        &mut self,
        kind: SheetKind,
        columns: &[Column],
        values: &[String],
        file_name: &str,
    ) -> Option<Reconciled> {
        let flags = self.flags();
        let mut record = Record::new(kind);
        let mut extras: Vec<(&str, String)> = Vec::new();

        for (value, column) in values.iter().zip(columns) {
            match column {
                Column::Field(def) => def.apply(&mut record, &def.prepare(value, flags)),
                Column::Attribute(name) | Column::Extension(name) => {
                    if !is_blank(value) {
                        extras.push((name.as_str(), filter_na(value)));
                    }
                }
                Column::Ignored => {}
            }
        }
        record.source_file = file_name.to_string();

        if should_skip(&record, &self.cx.filters, flags, &mut self.cx.skipped_spaces) {
            return None;
        }

        let mut provenance = Provenance {
            sheet: kind,
            row_name: record.key(),
            created_by: record.created_by.clone(),
            created_on: record.created_on.clone(),
            ext_system: record.ext_system.clone(),
            ext_object: record.ext_object.clone(),
            source_file: record.source_file.clone(),
        };

        let outcome = self.admit(record);
        if let (Reconciled::Insert, Some(key)) = outcome {
            if let Some(r) = self.store.record(key) {
                provenance.row_name = r.key();
            }
        }
        if outcome.0 != Reconciled::Duplicate {
            for (name, value) in extras {
                self.add_extension_attribute(&provenance, name, value);
            }
        }
        Some(outcome.0)
    }

    /// Reconciles against the page and inserts when the record is new.
    fn admit(&mut self, mut record: Record) -> (Reconciled, Option<RecordKey>) {
        let kind = record.kind();
        let existing = self.store.find(kind, &record.key());
        let outcome = match existing.and_then(|k| self.store.record_mut(k)) {
            Some(existing) => reconcile(existing, &record, self.log),
            None => Reconciled::Insert,
        };
        if outcome != Reconciled::Insert {
            return (outcome, existing);
        }
        record.unique_id = self.ids.unique_id(kind);
        (outcome, Some(self.store.insert(record)))
    }

    fn add_extension_attribute(&mut self, row: &Provenance, name: &str, value: String) {
        let mut attr = Record::named(SheetKind::Attribute, name);
        attr.created_by = row.created_by.clone();
        attr.created_on = row.created_on.clone();
        attr.ext_system = row.ext_system.clone();
        attr.ext_object = row.ext_object.clone();
        attr.source_file = row.source_file.clone();
        if let Some(a) = attr.as_attribute_mut() {
            a.sheet_name = row.sheet.as_str().to_string();
            a.row_name = row.row_name.clone();
            a.value = value;
        }

        let flags = self.flags();
        if should_skip(&attr, &self.cx.filters, flags, &mut self.cx.skipped_spaces) {
            return;
        }
        // The first row to supply an attribute keeps it; later rows folded
        // into the same record do not override it.
        if self.store.find(SheetKind::Attribute, &attr.key()).is_some() {
            return;
        }
        attr.unique_id = self.ids.unique_id(SheetKind::Attribute);
        self.store.insert(attr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::error::CellReadError;
    use crate::filter::{FilterEntrySpec, FilterSpec, MatchKind, Polarity};
    use crate::ids::SequentialIdFactory;

    struct Fixture {
        store: RecordStore,
        registry: FieldRegistry,
        options: ParseOptions,
        cx: ResolutionContext,
        ids: SequentialIdFactory,
        log: Diagnostics,
    }

    impl Fixture {
        fn new(options: ParseOptions) -> Self {
            let cx = ResolutionContext::from_options(&options).unwrap();
            Self {
                store: RecordStore::new(),
                registry: FieldRegistry::new(),
                options,
                cx,
                ids: SequentialIdFactory::new(),
                log: Diagnostics::new(),
            }
        }

        fn load(&mut self, kind: SheetKind, rows: Vec<Vec<&str>>, file: &str) -> LoadStats {
            let rows: Vec<_> = rows
                .into_iter()
                .map(|r| Ok(r.into_iter().map(str::to_string).collect()))
                .collect();
            self.load_raw(kind, rows, file)
        }

        fn load_raw(
            &mut self,
            kind: SheetKind,
            rows: Vec<std::result::Result<Vec<String>, CellReadError>>,
            file: &str,
        ) -> LoadStats {
            let mut loader = Loader {
                store: &mut self.store,
                registry: &self.registry,
                options: &self.options,
                cx: &mut self.cx,
                ids: &mut self.ids,
                log: &mut self.log,
            };
            loader.load_sheet(kind, Box::new(rows.into_iter()), file)
        }
    }

    #[test]
    fn rows_become_records_with_ids() {
        let mut fx = Fixture::new(ParseOptions::default());
        let stats = fx.load(
            SheetKind::Floor,
            vec![vec!["Name", "Elevation"], vec!["L1", "0"], vec!["", ""], vec!["L2", "3.5"]],
            "a.xlsx",
        );
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.admitted, 2);

        let l2 = fx.store.get(SheetKind::Floor, "l2").unwrap();
        assert_eq!(l2.unique_id, "FLOOR-2");
        assert_eq!(l2.source_file, "a.xlsx");
        assert_eq!(l2.as_floor().unwrap().elevation, "3.5");
        assert_eq!(fx.store.page(SheetKind::Floor).unwrap().columns(), &["Name", "Elevation"]);
    }

    #[test]
    fn unknown_columns_become_attributes() {
        let mut fx = Fixture::new(ParseOptions::default());
        fx.load(
            SheetKind::Space,
            vec![
                vec!["Name", "CreatedBy", "Room Finish"],
                vec!["101", "a@b.com", "Carpet"],
                vec!["102", "a@b.com", "n/a"],
            ],
            "a.xlsx",
        );
        let attrs: Vec<_> = fx.store.records_of(SheetKind::Attribute).collect();
        assert_eq!(attrs.len(), 1);
        let (_, attr) = attrs[0];
        assert_eq!(attr.name, "Room Finish");
        assert_eq!(attr.created_by, "a@b.com");
        assert_eq!(attr.unique_id, "ATTRIBUTE-1");
        let data = attr.as_attribute().unwrap();
        assert_eq!((data.sheet_name.as_str(), data.row_name.as_str()), ("SPACE", "101"));
        assert_eq!(data.value, "Carpet");
    }

    #[test]
    fn unknown_columns_warn_without_extensions() {
        let options = ParseOptions::default().with_flags(Flags::CONVERT_GUID);
        let mut fx = Fixture::new(options);
        fx.load(SheetKind::Space, vec![vec!["Name", "Finish"], vec!["101", "Carpet"]], "a");
        assert_eq!(fx.log.count(Category::MissingProperty), 1);
        assert!(fx.store.page(SheetKind::Attribute).is_none());
    }

    #[test]
    fn converted_fields_take_precedence() {
        let mut options = ParseOptions::default().with_flags(Flags::NONE);
        options.add_converted_field(SheetKind::Floor, "Height", "Storey Height");
        let mut fx = Fixture::new(options);
        fx.load(SheetKind::Floor, vec![vec!["Name", "Height"], vec!["L1", "3"]], "a");

        let floor = fx.store.get(SheetKind::Floor, "L1").unwrap();
        assert_eq!(floor.as_floor().unwrap().height, "");
        let attr = fx.store.get(SheetKind::Attribute, "FLOOR:L1:Storey Height").unwrap();
        assert_eq!(attr.as_attribute().unwrap().value, "3");
    }

    #[test]
    fn bad_cell_is_logged_and_row_skipped() {
        let mut fx = Fixture::new(ParseOptions::default());
        let stats = fx.load_raw(
            SheetKind::Floor,
            vec![
                Ok(vec!["Name".into(), "Elevation".into()]),
                Err(CellReadError::new(1, "invalid utf-8")),
                Ok(vec!["L2".into(), "3".into()]),
            ],
            "a",
        );
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.admitted, 1);
        let d = fx.log.by_category(Category::InvalidCellValue).next().unwrap();
        assert_eq!(d.params, vec!["FLOOR", "2", "Elevation", "1"]);
        assert_eq!(fx.log.error_count(), 1);
    }

    #[test]
    fn filtered_rows_are_not_admitted() {
        let mut options = ParseOptions::default();
        options.filters.push(FilterSpec {
            polarity: Polarity::Exclude,
            entries: vec![FilterEntrySpec {
                sheet: "SPACE".into(),
                pattern: "104".into(),
                kind: MatchKind::Exact,
            }],
        });
        let mut fx = Fixture::new(options);
        let stats = fx.load(
            SheetKind::Space,
            vec![vec!["Name", "Finish"], vec!["104", "Tile"], vec!["105", "Tile"]],
            "a",
        );
        assert_eq!(stats.skipped, 1);
        assert!(fx.store.find(SheetKind::Space, "104").is_none());
        // The skipped row contributes no extension attributes either.
        assert_eq!(fx.store.page(SheetKind::Attribute).unwrap().len(), 1);
        assert_eq!(fx.ids.issued(SheetKind::Space), 1);
    }

    #[test]
    fn duplicates_within_a_file_are_reported() {
        let mut fx = Fixture::new(ParseOptions::default());
        let stats = fx.load(
            SheetKind::Type,
            vec![vec!["Name", "Color"], vec!["Pump", "Red"], vec!["PUMP", "Blue"]],
            "a",
        );
        assert_eq!(stats.admitted, 1);
        assert_eq!(fx.log.count(Category::Duplicate), 1);
        let pump = fx.store.get(SheetKind::Type, "pump").unwrap();
        assert_eq!(pump.as_type().unwrap().color, "Red");
    }

    #[test]
    fn guid_identifiers_are_converted() {
        let mut fx = Fixture::new(ParseOptions::default());
        fx.load(
            SheetKind::Space,
            vec![vec!["Name", "ExtIdentifier"], vec!["101", "3$$$$$$$$$$$$$$$$$$$$$"]],
            "a",
        );
        let space = fx.store.get(SheetKind::Space, "101").unwrap();
        assert_eq!(space.ext_identifier, "ffffffff-ffff-ffff-ffff-ffffffffffff");
    }
}
