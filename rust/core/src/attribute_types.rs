// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute type catalog.
//!
//! Bound attribute rows are consolidated into one `ATTRIBUTE TYPE` record
//! per case-normalized attribute name. Each type accumulates the sheets it
//! was used with, an inferred [`DataKind`] and, when allowed values were
//! declared, a [`ValueListData`] record shared by every type with the same
//! value set.
//!
//! When a later attribute declares a different allowed-value set than the
//! type already holds, `vdt_value_list_mismatch` is logged and the later
//! set replaces the earlier one on the same type record. Attributes bound
//! earlier keep pointing at that record, so no binding goes stale.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::diagnostics::{Category, MessageLogger};
use crate::ids::IdFactory;
use crate::keys::{RecordKey, SheetKind};
use crate::numeric::NumberFormat;
use crate::params;
use crate::records::{AttributeTypeData, DataKind, Record, ValueListData};
use crate::store::RecordStore;
use crate::text::normalize_key;

/// Attribute types grouped by the categories of the records using them.
///
/// Type names are stored upper-cased.
#[derive(Debug, Clone, Default)]
pub struct AttributeTypeMap {
    by_category: BTreeMap<String, BTreeSet<String>>,
    by_sheet: BTreeMap<SheetKind, BTreeMap<String, BTreeSet<String>>>,
}

impl AttributeTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `type_name` is used by a `sheet` record of `category`.
    pub fn add(&mut self, sheet: SheetKind, category: &str, type_name: &str) {
        let type_name = normalize_key(type_name);
        self.by_category
            .entry(category.to_string())
            .or_default()
            .insert(type_name.clone());
        self.by_sheet
            .entry(sheet)
            .or_default()
            .entry(category.to_string())
            .or_default()
            .insert(type_name);
    }

    /// Type names used by records of `category` on any sheet.
    pub fn types_for_category(&self, category: &str) -> impl Iterator<Item = &str> {
        self.by_category
            .get(category)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Type names used by `sheet` records of `category`.
    pub fn types_for(&self, sheet: SheetKind, category: &str) -> impl Iterator<Item = &str> {
        self.by_sheet
            .get(&sheet)
            .and_then(|c| c.get(category))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.by_category.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

/// Snapshot of one attribute, taken before the store is mutated.
struct Sample {
    key: RecordKey,
    name: String,
    sheet: String,
    row: String,
    value: String,
    unit: String,
    description: String,
    allowed: Option<BTreeSet<String>>,
}

/// Builds the attribute type catalog from the bound attributes in `store`.
///
/// Every named attribute takes part, bound to an owner or not, except those
/// whose value repeats their name and those already carrying a type, so
/// running this twice changes nothing. Returns the number of types created.
pub(crate) fn consolidate<L: MessageLogger>(
    store: &mut RecordStore,
    format: &NumberFormat,
    ids: &mut dyn IdFactory,
    log: &mut L,
) -> usize {
    let samples: Vec<Sample> = store
        .records_of(SheetKind::Attribute)
        .filter_map(|(key, record)| {
            let a = record.as_attribute()?;
            if a.attribute_type.is_some() || record.name.is_empty() || a.value == record.name {
                return None;
            }
            Some(Sample {
                key,
                name: record.name.clone(),
                sheet: a.sheet_name.clone(),
                row: a.row_name.clone(),
                value: a.value.clone(),
                unit: a.unit.clone(),
                description: record.description.clone(),
                allowed: a.allowed_value_set(),
            })
        })
        .collect();

    let mut value_lists = index_value_lists(store);
    let mut created = 0;

    for sample in samples {
        let type_key = match store.find(SheetKind::AttributeType, &sample.name) {
            Some(existing) => {
                reconcile(store, existing, &sample, format, &mut value_lists, ids, log);
                existing
            }
            None => {
                created += 1;
                create(store, &sample, format, &mut value_lists, ids)
            }
        };
        if let Some(a) = store.record_mut(sample.key).and_then(Record::as_attribute_mut) {
            a.attribute_type = Some(type_key);
        }
    }

    tracing::debug!(created, "attribute types consolidated");
    created
}

fn create(
    store: &mut RecordStore,
    sample: &Sample,
    format: &NumberFormat,
    value_lists: &mut FxHashMap<Vec<String>, RecordKey>,
    ids: &mut dyn IdFactory,
) -> RecordKey {
    let mut data_kind = DataKind::Unset;
    data_kind.infer(&sample.value, format);
    let value_list = sample
        .allowed
        .as_ref()
        .map(|values| get_value_list(store, value_lists, values, ids));

    let mut record = Record::named(SheetKind::AttributeType, &sample.name);
    record.unique_id = ids.unique_id(SheetKind::AttributeType);
    record.description = sample.description.clone();
    if let Some(t) = record.as_attribute_type_mut() {
        *t = AttributeTypeData {
            data_kind,
            unit: sample.unit.clone(),
            allowed: sample.allowed.clone(),
            categories: BTreeSet::new(),
            used_with: BTreeSet::from([sample.sheet.clone()]),
            value_list,
        };
    }
    store.insert(record)
}

fn reconcile<L: MessageLogger>(
    store: &mut RecordStore,
    type_key: RecordKey,
    sample: &Sample,
    format: &NumberFormat,
    value_lists: &mut FxHashMap<Vec<String>, RecordKey>,
    ids: &mut dyn IdFactory,
    log: &mut L,
) {
    let matches = store
        .record(type_key)
        .and_then(Record::as_attribute_type)
        .map_or(true, |t| t.allowed == sample.allowed);

    let replacement = if matches {
        None
    } else {
        log.data_integrity(
            Category::ValueListMismatch,
            params![sample.name, sample.sheet, sample.row],
        );
        Some(
            sample
                .allowed
                .as_ref()
                .map(|values| get_value_list(store, value_lists, values, ids)),
        )
    };

    let Some(record) = store.record_mut(type_key) else {
        return;
    };
    // A description survives only while every attribute agrees on it.
    if record.description != sample.description {
        record.description.clear();
    }
    let Some(t) = record.as_attribute_type_mut() else {
        return;
    };
    t.data_kind.infer(&sample.value, format);
    t.used_with.insert(sample.sheet.clone());
    if t.unit.is_empty() {
        t.unit = sample.unit.clone();
    }
    if let Some(value_list) = replacement {
        t.allowed = sample.allowed.clone();
        t.value_list = value_list;
    }
}

/// Existing value lists by their sorted values.
fn index_value_lists(store: &RecordStore) -> FxHashMap<Vec<String>, RecordKey> {
    store
        .records_of(SheetKind::ValueList)
        .filter_map(|(key, r)| {
            let values = r.as_value_list()?.values.iter().cloned().collect();
            Some((values, key))
        })
        .collect()
}

/// Returns the value list holding exactly `values`, creating it on first
/// use.
fn get_value_list(
    store: &mut RecordStore,
    index: &mut FxHashMap<Vec<String>, RecordKey>,
    values: &BTreeSet<String>,
    ids: &mut dyn IdFactory,
) -> RecordKey {
    let sorted: Vec<String> = values.iter().cloned().collect();
    if let Some(key) = index.get(&sorted) {
        return *key;
    }
    let mut record = Record::new(SheetKind::ValueList);
    record.unique_id = ids.unique_id(SheetKind::ValueList);
    if let Some(list) = record.as_value_list_mut() {
        *list = ValueListData {
            values: values.clone(),
        };
    }
    let key = store.insert(record);
    index.insert(sorted, key);
    key
}

/// Tags the attribute types of every categorised record on `sheets` with
/// the record's category, and records the association in `map`.
///
/// Returns the number of (record, type) pairs visited.
pub(crate) fn associate_categories(
    store: &mut RecordStore,
    sheets: &[SheetKind],
    map: &mut AttributeTypeMap,
) -> usize {
    let mut pairs: Vec<(SheetKind, String, RecordKey)> = Vec::new();
    for &sheet in sheets {
        for (_, record) in store.records_of(sheet) {
            if record.category.is_empty() {
                continue;
            }
            for attribute in record.attributes.values() {
                let type_key = store
                    .record(*attribute)
                    .and_then(Record::as_attribute)
                    .and_then(|a| a.attribute_type);
                if let Some(type_key) = type_key {
                    pairs.push((sheet, record.category.clone(), type_key));
                }
            }
        }
    }

    for (sheet, category, type_key) in &pairs {
        let Some(record) = store.record_mut(*type_key) else {
            continue;
        };
        map.add(*sheet, category, &record.name);
        if let Some(t) = record.as_attribute_type_mut() {
            t.categories.insert(category.clone());
        }
    }
    pairs.len()
}
