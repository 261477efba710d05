// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # COBie-Lite Core
//!
//! Parser for COBie facility handover sheets. Rows are read from a
//! [`RowSource`], turned into typed records held in an arena-backed
//! [`RecordStore`], and linked together by a multi-pass resolver.
//!
//! ## Overview
//!
//! - **Loading**: one page per sheet, keyed by normalized name; duplicate
//!   rows from the same file are reported, rows from other files are merged
//! - **Resolution**: floors, spaces, components, types, jobs, spares,
//!   groups, assemblies, issues, attributes and documents are linked to the
//!   records they name
//! - **Attribute types**: every bound attribute is given a shared type with
//!   an inferred data kind and a shared value list
//! - **Companies**: contacts naming a company are grouped into `COMPANY`
//!   records
//! - **Derivations**: optional passes promote attributes to spaces, floors,
//!   areas, systems and categories
//! - **Output**: CSV export per page and a JSON snapshot
//!
//! ## Quick Start
//!
//! ```rust
//! use cobie_lite_core::{CobieParser, MemorySource, ParseOptions, SheetKind};
//!
//! let source = MemorySource::new("handover.xlsx")
//!     .with_sheet(SheetKind::Floor, &["Name"], &[&["Level 1"]])
//!     .with_sheet(SheetKind::Space, &["Name", "FloorName"], &[&["101", "Level 1"]])
//!     .with_sheet(SheetKind::Type, &["Name"], &[&["Door"]])
//!     .with_sheet(
//!         SheetKind::Component,
//!         &["Name", "TypeName", "Space"],
//!         &[&["Door 1", "Door", "101"]],
//!     );
//!
//! let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
//! let summary = parser.execute(&source);
//! assert_eq!(summary.errors, 0);
//!
//! let door = parser.store().get(SheetKind::Component, "door 1").unwrap();
//! assert!(door.as_component().unwrap().space.is_some());
//! ```
//!
//! ## Diagnostics
//!
//! Problems in the input never abort a run. They are reported through a
//! [`MessageLogger`] as a [`Category`] plus parameters; [`Diagnostics`]
//! collects them in memory and mirrors them to `tracing`.

pub mod attribute_types;
mod companies;
pub mod config;
mod derive;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod fields;
pub mod filter;
pub mod guid;
pub mod ids;
pub mod keys;
pub mod loader;
pub mod merge;
pub mod numeric;
pub mod page;
pub mod parser;
pub mod records;
pub mod resolve;
pub mod skip;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod text;

pub use attribute_types::AttributeTypeMap;
pub use config::{ConvertedField, DerivationOptions, Flags, ParseOptions};
pub use diagnostics::{Category, Diagnostic, Diagnostics, MessageLogger, Severity};
pub use error::{CellReadError, Error, Result};
pub use export::{export_store, CsvExporter, Exporter};
pub use fields::{FieldDef, FieldRegistry};
pub use filter::{Filter, FilterChain, FilterSpec};
pub use guid::{process_guid, process_revit_unique_id};
pub use ids::{IdFactory, SequentialIdFactory};
pub use keys::{RecordKey, SheetKind};
pub use loader::LoadStats;
pub use numeric::NumberFormat;
pub use page::Page;
pub use parser::{CobieParser, RunSummary};
pub use records::{DataKind, Record, RecordData};
pub use resolve::{resolution_order, ResolutionContext};
pub use snapshot::{PageSnapshot, RecordSnapshot, StoreSnapshot};
pub use source::{CsvDirectorySource, MemorySource, Row, RowSource, Rows};
pub use store::RecordStore;
