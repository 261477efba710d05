// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute, AttributeType and ValueList records.

use std::collections::BTreeSet;

use crate::keys::RecordKey;
use crate::numeric::NumberFormat;
use crate::text::filter_na;

/// Data stored for one (sheet, row, name) attribute fact.
#[derive(Debug, Clone, Default)]
pub struct AttributeData {
    /// Upper-cased sheet name of the owning record.
    pub sheet_name: String,
    pub row_name: String,
    pub value: String,
    pub unit: String,
    /// Declared allowed values, comma-separated as written.
    pub allowed_values: String,

    pub owner: Option<RecordKey>,
    pub attribute_type: Option<RecordKey>,
}

impl AttributeData {
    /// Declared allowed values as a set, or `None` when nothing usable was
    /// declared.
    pub fn allowed_value_set(&self) -> Option<BTreeSet<String>> {
        let set: BTreeSet<String> = self
            .allowed_values
            .split(',')
            .map(filter_na)
            .filter(|v| !v.is_empty())
            .collect();
        (!set.is_empty()).then_some(set)
    }
}

/// Inferred value type of an attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind {
    #[default]
    Unset,
    Numeric,
    Alphanumeric,
}

impl DataKind {
    /// Folds one more sample value into the classification.
    ///
    /// Empty samples are ignored and once a type is alphanumeric it stays
    /// alphanumeric.
    pub fn infer(&mut self, sample: &str, format: &NumberFormat) {
        let sample = sample.trim();
        if sample.is_empty() || *self == DataKind::Alphanumeric {
            return;
        }
        *self = if format.is_numeric(sample) {
            DataKind::Numeric
        } else {
            DataKind::Alphanumeric
        };
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Unset => "",
            DataKind::Numeric => "Numeric",
            DataKind::Alphanumeric => "Alphanumeric",
        }
    }
}

/// Data stored for a deduplicated attribute descriptor.
#[derive(Debug, Clone, Default)]
pub struct AttributeTypeData {
    pub data_kind: DataKind,
    pub unit: String,
    /// Allowed values this type was built with.
    pub allowed: Option<BTreeSet<String>>,
    pub categories: BTreeSet<String>,
    /// Upper-cased names of the sheets the attribute appeared on.
    pub used_with: BTreeSet<String>,

    pub value_list: Option<RecordKey>,
}

/// Data stored for a closed set of allowed values.
#[derive(Debug, Clone, Default)]
pub struct ValueListData {
    pub values: BTreeSet<String>,
}

impl ValueListData {
    /// Returns `true` when this list holds exactly `values`.
    pub fn matches(&self, values: &BTreeSet<String>) -> bool {
        &self.values == values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_values_are_trimmed_and_deduplicated() {
        let a = AttributeData {
            allowed_values: " Red,Green , Red, n/a,".into(),
            ..Default::default()
        };
        let set = a.allowed_value_set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("Red") && set.contains("Green"));

        let none = AttributeData {
            allowed_values: " , N/A".into(),
            ..Default::default()
        };
        assert!(none.allowed_value_set().is_none());
    }

    #[test]
    fn data_kind_is_sticky_toward_alphanumeric() {
        let fmt = NumberFormat::default();
        let mut kind = DataKind::Unset;
        kind.infer("", &fmt);
        assert_eq!(kind, DataKind::Unset);
        kind.infer("12.5", &fmt);
        assert_eq!(kind, DataKind::Numeric);
        kind.infer("twelve", &fmt);
        assert_eq!(kind, DataKind::Alphanumeric);
        kind.infer("13", &fmt);
        assert_eq!(kind, DataKind::Alphanumeric);
    }
}
