// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The parse run: load every sheet, resolve references, consolidate the
//! attribute type catalog and extract companies.

use std::path::Path;

use crate::attribute_types::{self, AttributeTypeMap};
use crate::companies::extract_companies;
use crate::config::{Flags, ParseOptions};
use crate::derive::{self, Measure};
use crate::diagnostics::{Category, Diagnostics, MessageLogger};
use crate::error::Result;
use crate::export::{export_store, Exporter};
use crate::fields::FieldRegistry;
use crate::ids::{IdFactory, SequentialIdFactory};
use crate::keys::SheetKind;
use crate::loader::{LoadStats, Loader};
use crate::params;
use crate::resolve::{ResolutionContext, Resolver};
use crate::source::{CsvDirectorySource, RowSource};
use crate::store::RecordStore;

/// Outcome of [`CobieParser::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub loaded: LoadStats,
    /// Records visited by the resolver.
    pub resolved: usize,
    /// Records changed by the derivation passes.
    pub derived: usize,
    pub errors: usize,
}

/// Parser for one set of COBie sheets.
///
/// Sheets may come from several sources (files); [`CobieParser::load`] is
/// called once per source and [`CobieParser::resolve`] once at the end.
///
/// ```
/// use cobie_lite_core::{CobieParser, MemorySource, ParseOptions, SheetKind};
///
/// let source = MemorySource::new("site.csv")
///     .with_sheet(SheetKind::Floor, &["Name"], &[&["Level 1"]])
///     .with_sheet(SheetKind::Space, &["Name", "FloorName"], &[&["101", "Level 1"]]);
///
/// let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
/// parser.load(&source);
/// parser.resolve();
///
/// let space = parser.store().get(SheetKind::Space, "101").unwrap();
/// assert!(space.as_space().unwrap().floor.is_some());
/// ```
pub struct CobieParser<L: MessageLogger = Diagnostics> {
    store: RecordStore,
    options: ParseOptions,
    registry: FieldRegistry,
    cx: ResolutionContext,
    ids: Box<dyn IdFactory>,
    log: L,
}

impl CobieParser<Diagnostics> {
    /// Creates a parser collecting diagnostics in memory.
    pub fn new(options: ParseOptions) -> Result<Self> {
        Self::with_logger(options, Diagnostics::new())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.log
    }
}

impl<L: MessageLogger> CobieParser<L> {
    pub fn with_logger(options: ParseOptions, log: L) -> Result<Self> {
        options.validate()?;
        let cx = ResolutionContext::from_options(&options)?;
        Ok(Self {
            store: RecordStore::new(),
            options,
            registry: FieldRegistry::new(),
            cx,
            ids: Box::new(SequentialIdFactory::new()),
            log,
        })
    }

    /// Replaces the identifier factory. Call before loading.
    pub fn with_id_factory(mut self, ids: Box<dyn IdFactory>) -> Self {
        self.ids = ids;
        self
    }

    fn loader(&mut self) -> Loader<'_, L> {
        Loader {
            store: &mut self.store,
            registry: &self.registry,
            options: &self.options,
            cx: &mut self.cx,
            ids: self.ids.as_mut(),
            log: &mut self.log,
        }
    }

    /// Loads every sheet `source` provides, in load order.
    ///
    /// A sheet that cannot be opened is logged as `file_read_error` and
    /// the remaining sheets still load.
    pub fn load(&mut self, source: &dyn RowSource) -> LoadStats {
        let file_name = source.file_name().to_string();
        let mut total = LoadStats::default();
        for kind in SheetKind::LOAD_ORDER {
            let rows = match source.open_sheet(kind) {
                Ok(Some(rows)) => rows,
                Ok(None) => continue,
                Err(e) => {
                    self.log.error(Category::FileReadError, params![kind, e]);
                    continue;
                }
            };
            let stats = self.loader().load_sheet(kind, rows, &file_name);
            total.rows += stats.rows;
            total.admitted += stats.admitted;
            total.merged += stats.merged;
            total.skipped += stats.skipped;
        }
        self.log.info(Category::FileParsed, params![file_name]);
        total
    }

    /// Loads a single sheet by name.
    ///
    /// An unknown sheet name is logged as `class-not-found` and yields
    /// `None`, as does a sheet the source does not have.
    pub fn load_sheet_named(&mut self, source: &dyn RowSource, sheet: &str) -> Option<LoadStats> {
        let Some(kind) = SheetKind::from_name(sheet) else {
            self.log.error(Category::ClassNotFound, params![sheet]);
            return None;
        };
        match source.open_sheet(kind) {
            Ok(Some(rows)) => {
                let file_name = source.file_name().to_string();
                Some(self.loader().load_sheet(kind, rows, &file_name))
            }
            Ok(None) => None,
            Err(e) => {
                self.log.error(Category::FileReadError, params![kind, e]);
                None
            }
        }
    }

    /// Loads a directory holding one CSV file per sheet.
    ///
    /// Files with other extensions are reported as `unsupported-file-type`.
    pub fn parse_directory(&mut self, dir: impl AsRef<Path>) -> Result<LoadStats> {
        let source = CsvDirectorySource::open(dir)?;
        for path in source.unsupported() {
            self.log
                .warning(Category::UnsupportedFileType, params![path.display()]);
        }
        Ok(self.load(&source))
    }

    /// Resolves references, builds the attribute type catalog and extracts
    /// companies. Returns the number of records visited.
    pub fn resolve(&mut self) -> usize {
        let visited = Resolver {
            store: &mut self.store,
            cx: &mut self.cx,
            log: &mut self.log,
        }
        .resolve_all();
        attribute_types::consolidate(
            &mut self.store,
            &self.cx.number_format,
            self.ids.as_mut(),
            &mut self.log,
        );
        extract_companies(&mut self.store, self.cx.flags, self.ids.as_mut());
        visited
    }

    /// Loads `source`, resolves, and runs the configured derivations.
    pub fn execute(&mut self, source: &dyn RowSource) -> RunSummary {
        let loaded = self.load(source);
        let resolved = self.resolve();
        let derived = self.run_derivations();
        RunSummary {
            loaded,
            resolved,
            derived,
            errors: self.log.error_count(),
        }
    }

    // --- Derivations ---

    pub fn spaces_from_attribute(&mut self, name: &str) -> usize {
        derive::spaces_from_attribute(&mut self.store, name)
    }

    pub fn levels_from_attribute(&mut self, name: &str) -> usize {
        derive::levels_from_attribute(&mut self.store, name, &self.cx.filters)
    }

    pub fn area_from_attribute(&mut self, name: &str) -> usize {
        derive::measure_from_attribute(&mut self.store, name, Measure::GrossArea)
    }

    pub fn perimeter_from_attribute(&mut self, name: &str) -> usize {
        derive::measure_from_attribute(&mut self.store, name, Measure::Perimeter)
    }

    pub fn systems_from_attribute(&mut self, name: &str) -> usize {
        derive::systems_from_attribute(&mut self.store, name, self.ids.as_mut())
    }

    pub fn category_from_attribute(&mut self, name: &str) -> usize {
        derive::category_from_attribute(&mut self.store, name)
    }

    /// Tags attribute types with the categories of the records on `sheets`
    /// that use them.
    pub fn associate_categories_with_attribute_types(&mut self, sheets: &[SheetKind]) -> usize {
        attribute_types::associate_categories(
            &mut self.store,
            sheets,
            &mut self.cx.attribute_types,
        )
    }

    /// Runs the derivations the option flags enable. Returns the number of
    /// records changed.
    pub fn run_derivations(&mut self) -> usize {
        let flags = self.cx.flags;
        let names = self.options.derivations.clone();
        let mut changed = 0;

        if flags.contains(Flags::PROMOTE_COMPONENTS) {
            if let Some(name) = &names.space_attribute {
                changed += self.spaces_from_attribute(name);
            }
        }
        if flags.contains(Flags::INFER_LEVELS) {
            let level = names
                .level_attributes
                .iter()
                .rev()
                .find(|name| self.store.find(SheetKind::AttributeType, name).is_some());
            if let Some(name) = level {
                changed += self.levels_from_attribute(name);
            }
        }
        if flags.contains(Flags::PROMOTE_SPACES) {
            if let Some(name) = &names.area_attribute {
                changed += self.area_from_attribute(name);
            }
            if let Some(name) = &names.perimeter_attribute {
                changed += self.perimeter_from_attribute(name);
            }
        }
        if flags.contains(Flags::INFER_SYSTEMS) {
            if let Some(name) = &names.system_attribute {
                changed += self.systems_from_attribute(name);
            }
        }
        if let Some(name) = &names.category_attribute {
            changed += self.category_from_attribute(name);
            let sheets: Vec<SheetKind> = names
                .category_sheets
                .iter()
                .filter_map(|s| SheetKind::from_name(s))
                .collect();
            self.associate_categories_with_attribute_types(&sheets);
        }

        tracing::debug!(changed, "derivations complete");
        changed
    }

    /// Exports the store through `exporter` to `destination`. Returns the
    /// number of rows written.
    pub fn export<E: Exporter + ?Sized>(&mut self, exporter: &mut E, destination: &str) -> Result<usize> {
        export_store(&self.store, &self.registry, exporter, destination, &mut self.log)
    }

    // --- Accessors ---

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.cx
    }

    pub fn attribute_type_map(&self) -> &AttributeTypeMap {
        &self.cx.attribute_types
    }

    pub fn logger(&self) -> &L {
        &self.log
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn error_count(&self) -> usize {
        self.log.error_count()
    }

    /// Consumes the parser, returning the store and the logger.
    pub fn into_parts(self) -> (RecordStore, L) {
        (self.store, self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn unknown_sheet_names_are_reported() {
        let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
        let source = MemorySource::new("a.csv");
        assert!(parser.load_sheet_named(&source, "Furniture").is_none());
        assert_eq!(parser.diagnostics().count(Category::ClassNotFound), 1);
        assert_eq!(parser.error_count(), 1);
    }

    #[test]
    fn load_reports_each_file() {
        let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
        let source = MemorySource::new("a.csv").with_sheet(SheetKind::Floor, &["Name"], &[&["L1"], &["L2"]]);
        let stats = parser.load(&source);
        assert_eq!(stats.admitted, 2);
        let parsed: Vec<_> = parser.diagnostics().by_category(Category::FileParsed).collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].params, vec!["a.csv"]);
    }

    #[test]
    fn single_sheet_by_name() {
        let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
        let source = MemorySource::new("a.csv").with_sheet(SheetKind::AttributeType, &["Name"], &[&["Area"]]);
        let stats = parser.load_sheet_named(&source, "attribute_type").unwrap();
        assert_eq!(stats.admitted, 1);
        assert!(parser.store().find(SheetKind::AttributeType, "area").is_some());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut options = ParseOptions::default();
        options.converted_fields.push(crate::config::ConvertedField {
            sheet: "NOPE".into(),
            column: "Area".into(),
            attribute: "Area".into(),
        });
        assert!(CobieParser::new(options).is_err());
    }

    #[test]
    fn derivations_follow_flags() {
        let options = ParseOptions::default().with_flags(Flags::CONVERT_EXTENSION_COLUMNS | Flags::PROMOTE_SPACES);
        let mut parser = CobieParser::new(options).unwrap();
        let source = MemorySource::new("a.csv")
            .with_sheet(SheetKind::Space, &["Name", "Area", "Room Name"], &[&["101", "20", "101"]]);
        let summary = parser.execute(&source);
        assert_eq!(summary.loaded.admitted, 1);
        // Area is promoted; spaces-from-attribute needs PROMOTE_COMPONENTS.
        assert_eq!(summary.derived, 1);
        let space = parser.store().get(SheetKind::Space, "101").unwrap();
        assert_eq!(space.areas().unwrap().gross_area, "20");
        assert!(space.attribute("Room Name").is_some());
    }
}
