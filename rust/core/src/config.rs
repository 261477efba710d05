// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse options: behaviour flags, locale, column overrides and filters.
//!
//! Options can be built in code or read from TOML:
//!
//! ```toml
//! flags = ["convert_guid", "convert_extension_columns", "skip_on_null"]
//! locale = "de-DE"
//! vendor_attribute = "Vendor"
//!
//! [[converted_fields]]
//! sheet = "FLOOR"
//! column = "Height"
//! attribute = "Height"
//!
//! [[filters]]
//! polarity = "exclude"
//! entries = [{ sheet = "SPACE", pattern = "104", match = "exact" }]
//! ```

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{FilterChain, FilterSpec};
use crate::keys::SheetKind;
use crate::numeric::NumberFormat;
use crate::text::normalize_key;

/// Behaviour switches of a parse run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Convert compressed 22-character GUIDs to dashed form.
    pub const CONVERT_GUID: Flags = Flags(0x1);
    /// Promote area/perimeter attributes onto spatial records.
    pub const PROMOTE_SPACES: Flags = Flags(0x2);
    /// Derive a component's space from an attribute.
    pub const PROMOTE_COMPONENTS: Flags = Flags(0x4);
    pub const INFER_LEVELS: Flags = Flags(0x8);
    pub const INFER_SYSTEMS: Flags = Flags(0x10);
    /// Skip attributes with no value.
    pub const SKIP_ON_NULL: Flags = Flags(0x20);
    /// Skip attributes whose value merely repeats their name.
    pub const SKIP_ON_NO_VALUE: Flags = Flags(0x40);
    /// Turn columns without a field into attributes.
    pub const CONVERT_EXTENSION_COLUMNS: Flags = Flags(0x80);
    /// Convert Revit unique ids to their export GUIDs.
    pub const CONVERT_UNIQUE_IDS: Flags = Flags(0x100);
    /// Extract a company from every contact, not only type contacts.
    pub const ALL_CONTACTS_ARE_COMPANIES: Flags = Flags(0x200);

    const NAMED: [(&'static str, Flags); 10] = [
        ("convert_guid", Flags::CONVERT_GUID),
        ("promote_spaces", Flags::PROMOTE_SPACES),
        ("promote_components", Flags::PROMOTE_COMPONENTS),
        ("infer_levels", Flags::INFER_LEVELS),
        ("infer_systems", Flags::INFER_SYSTEMS),
        ("skip_on_null", Flags::SKIP_ON_NULL),
        ("skip_on_no_value", Flags::SKIP_ON_NO_VALUE),
        ("convert_extension_columns", Flags::CONVERT_EXTENSION_COLUMNS),
        ("convert_unique_ids", Flags::CONVERT_UNIQUE_IDS),
        ("all_contacts_are_companies", Flags::ALL_CONTACTS_ARE_COMPANIES),
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Keeps only known bits.
    pub const fn from_bits_truncate(bits: u32) -> Flags {
        Flags(bits & 0x3ff)
    }

    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    /// Looks a flag up by its configuration name.
    pub fn from_name(name: &str) -> Option<Flags> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    /// Configuration names of the set flags.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, f)| self.contains(*f))
            .map(|(n, _)| *n)
            .collect()
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl TryFrom<Vec<String>> for Flags {
    type Error = String;

    fn try_from(names: Vec<String>) -> std::result::Result<Self, Self::Error> {
        names.iter().try_fold(Flags::NONE, |acc, name| {
            Flags::from_name(name)
                .map(|f| acc | f)
                .ok_or_else(|| format!("unknown flag: {name}"))
        })
    }
}

impl From<Flags> for Vec<String> {
    fn from(flags: Flags) -> Self {
        flags.names().into_iter().map(str::to_string).collect()
    }
}

/// A column demoted from a typed field to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedField {
    pub sheet: String,
    /// Column header as written in the sheet.
    pub column: String,
    /// Attribute name the column's values are stored under.
    pub attribute: String,
}

/// Attribute names consulted by the secondary derivation passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationOptions {
    pub space_attribute: Option<String>,
    /// Candidates for the level attribute; the last one present in the
    /// attribute-type catalog is used.
    pub level_attributes: Vec<String>,
    pub area_attribute: Option<String>,
    pub perimeter_attribute: Option<String>,
    pub system_attribute: Option<String>,
    pub category_attribute: Option<String>,
    /// Sheets whose categories are associated with attribute types.
    pub category_sheets: Vec<String>,
}

impl Default for DerivationOptions {
    fn default() -> Self {
        Self {
            space_attribute: Some("Room Name".into()),
            level_attributes: vec!["Level".into(), "Schedule Level".into()],
            area_attribute: Some("Area".into()),
            perimeter_attribute: Some("Perimeter".into()),
            system_attribute: Some("System Name".into()),
            category_attribute: Some("OmniClass Number".into()),
            category_sheets: vec![SheetKind::Type.as_str().into()],
        }
    }
}

fn default_flags() -> Flags {
    Flags::CONVERT_GUID | Flags::CONVERT_EXTENSION_COLUMNS | Flags::SKIP_ON_NULL
}

fn default_locale() -> String {
    "en-US".into()
}

/// Options of one parse run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default = "default_flags")]
    pub flags: Flags,
    /// Locale tag deciding numeric separators during type inference.
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub converted_fields: Vec<ConvertedField>,
    /// Attribute naming a component's vendor contact (by company).
    #[serde(default)]
    pub vendor_attribute: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub derivations: DerivationOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            flags: default_flags(),
            locale: default_locale(),
            converted_fields: Vec::new(),
            vendor_attribute: None,
            filters: Vec::new(),
            derivations: DerivationOptions::default(),
        }
    }
}

impl ParseOptions {
    /// Parses and validates options from TOML text.
    pub fn from_toml(input: &str) -> Result<Self> {
        let options: ParseOptions =
            toml::from_str(input).map_err(|e| Error::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Checks sheet names of overrides and compiles filter patterns.
    pub fn validate(&self) -> Result<()> {
        for field in &self.converted_fields {
            if SheetKind::from_name(&field.sheet).is_none() {
                return Err(Error::Config(format!(
                    "converted field {:?} names unknown sheet {:?}",
                    field.column, field.sheet
                )));
            }
            if field.attribute.trim().is_empty() {
                return Err(Error::Config(format!(
                    "converted field {:?} has no attribute name",
                    field.column
                )));
            }
        }
        FilterChain::from_specs(&self.filters)?;
        Ok(())
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Demotes a column of a sheet to an attribute.
    pub fn add_converted_field(&mut self, sheet: SheetKind, column: &str, attribute: &str) {
        self.converted_fields.push(ConvertedField {
            sheet: sheet.as_str().to_string(),
            column: column.to_string(),
            attribute: attribute.to_string(),
        });
    }

    /// Attribute name a column is demoted to, if any.
    pub fn converted_field(&self, sheet: SheetKind, column: &str) -> Option<&str> {
        let column = normalize_key(column);
        self.converted_fields
            .iter()
            .find(|f| {
                SheetKind::from_name(&f.sheet) == Some(sheet) && normalize_key(&f.column) == column
            })
            .map(|f| f.attribute.trim())
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::for_locale(&self.locale)
    }
}
