// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record keys and sheet kinds.
//!
//! Every admitted record gets a generational [`RecordKey`] from the store's
//! slot map. Reference slots hold these keys rather than the records
//! themselves, so a removed record simply stops resolving.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for any record held by the [`crate::RecordStore`].
    pub struct RecordKey;
}

/// Discriminant for the sheet (page) a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SheetKind {
    Facility,
    Floor,
    Space,
    Type,
    Component,
    Zone,
    System,
    Contact,
    Company,
    Job,
    Resource,
    Spare,
    Assembly,
    Attribute,
    AttributeType,
    ValueList,
    Document,
    Issue,
}

impl SheetKind {
    /// Sheets read from a source, in the order they are loaded.
    ///
    /// Identifier assignment depends on this order, so it never changes
    /// between runs.
    pub const LOAD_ORDER: [SheetKind; 15] = [
        SheetKind::Facility,
        SheetKind::Floor,
        SheetKind::Space,
        SheetKind::Type,
        SheetKind::Component,
        SheetKind::Zone,
        SheetKind::System,
        SheetKind::Contact,
        SheetKind::Job,
        SheetKind::Resource,
        SheetKind::Spare,
        SheetKind::Assembly,
        SheetKind::Attribute,
        SheetKind::Document,
        SheetKind::Issue,
    ];

    /// Every sheet kind, loaded ones first followed by the derived pages.
    pub const ALL: [SheetKind; 18] = [
        SheetKind::Facility,
        SheetKind::Floor,
        SheetKind::Space,
        SheetKind::Type,
        SheetKind::Component,
        SheetKind::Zone,
        SheetKind::System,
        SheetKind::Contact,
        SheetKind::Job,
        SheetKind::Resource,
        SheetKind::Spare,
        SheetKind::Assembly,
        SheetKind::Attribute,
        SheetKind::Document,
        SheetKind::Issue,
        SheetKind::Company,
        SheetKind::AttributeType,
        SheetKind::ValueList,
    ];

    /// Returns the canonical (upper-case) sheet name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Facility => "FACILITY",
            SheetKind::Floor => "FLOOR",
            SheetKind::Space => "SPACE",
            SheetKind::Type => "TYPE",
            SheetKind::Component => "COMPONENT",
            SheetKind::Zone => "ZONE",
            SheetKind::System => "SYSTEM",
            SheetKind::Contact => "CONTACT",
            SheetKind::Company => "COMPANY",
            SheetKind::Job => "JOB",
            SheetKind::Resource => "RESOURCE",
            SheetKind::Spare => "SPARE",
            SheetKind::Assembly => "ASSEMBLY",
            SheetKind::Attribute => "ATTRIBUTE",
            SheetKind::AttributeType => "ATTRIBUTE TYPE",
            SheetKind::ValueList => "VALUE_LIST",
            SheetKind::Document => "DOCUMENT",
            SheetKind::Issue => "ISSUE",
        }
    }

    /// Looks a sheet up by name, ignoring case and surrounding whitespace.
    ///
    /// Spaces and underscores are interchangeable, so `"Attribute_Type"` and
    /// `"value list"` are both recognized.
    pub fn from_name(name: &str) -> Option<SheetKind> {
        let wanted = normalize_sheet_name(name);
        SheetKind::ALL
            .into_iter()
            .find(|kind| normalize_sheet_name(kind.as_str()) == wanted)
    }

    /// Returns `true` for pages the parser creates itself rather than reads.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            SheetKind::Company | SheetKind::AttributeType | SheetKind::ValueList
        )
    }
}

fn normalize_sheet_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_uppercase() })
        .collect()
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
