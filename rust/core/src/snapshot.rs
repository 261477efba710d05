// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshot of a resolved store.
//!
//! Arena keys are not portable, so every record is given a sequential id
//! (in page order) and references are written as those ids.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::FieldRegistry;
use crate::keys::{RecordKey, SheetKind};
use crate::records::Record;
use crate::store::RecordStore;

/// Serializable representation of a whole store.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub pages: Vec<PageSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub sheet: String,
    pub records: Vec<RecordSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub id: usize,
    pub key: String,
    pub unique_id: String,
    /// Non-empty column values.
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<usize>,
}

impl StoreSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Records of one sheet, or an empty slice.
    pub fn page(&self, kind: SheetKind) -> &[RecordSnapshot] {
        self.pages
            .iter()
            .find(|p| p.sheet == kind.as_str())
            .map(|p| p.records.as_slice())
            .unwrap_or(&[])
    }
}

impl RecordStore {
    /// Serializes the store to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot(&FieldRegistry::new());
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot, reading column values through
    /// `registry`.
    pub fn to_snapshot(&self, registry: &FieldRegistry) -> StoreSnapshot {
        let mut ids: FxHashMap<RecordKey, usize> = FxHashMap::default();
        for kind in SheetKind::ALL {
            for key in self.keys_of(kind) {
                let next = ids.len();
                ids.entry(key).or_insert(next);
            }
        }
        let id_of = |key: Option<RecordKey>| key.and_then(|k| ids.get(&k).copied());

        let pages = SheetKind::ALL
            .into_iter()
            .filter(|kind| self.has_page(*kind))
            .map(|kind| PageSnapshot {
                sheet: kind.as_str().to_string(),
                records: self
                    .records_of(kind)
                    .map(|(key, record)| RecordSnapshot {
                        id: ids.get(&key).copied().unwrap_or_default(),
                        key: record.key(),
                        unique_id: record.unique_id.clone(),
                        fields: field_values(registry, record),
                        parent: id_of(record.parent),
                        attributes: self.attribute_snapshots(record, &id_of),
                    })
                    .collect(),
            })
            .collect();
        StoreSnapshot { pages }
    }

    fn attribute_snapshots(
        &self,
        record: &Record,
        id_of: &impl Fn(Option<RecordKey>) -> Option<usize>,
    ) -> Vec<AttributeSnapshot> {
        let mut attributes: Vec<AttributeSnapshot> = record
            .attributes
            .values()
            .filter_map(|key| {
                let attribute = self.record(*key)?;
                let data = attribute.as_attribute()?;
                Some(AttributeSnapshot {
                    name: attribute.name.clone(),
                    value: data.value.clone(),
                    attribute_type: id_of(data.attribute_type),
                })
            })
            .collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        attributes
    }
}

fn field_values(registry: &FieldRegistry, record: &Record) -> BTreeMap<String, String> {
    registry
        .fields(record.kind())
        .iter()
        .filter_map(|field| {
            let value = (field.get)(record);
            (!value.is_empty()).then(|| (field.column.to_string(), value))
        })
        .collect()
}
