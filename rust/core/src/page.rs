// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pages: ordered, key-indexed record lists for one sheet.

use rustc_hash::FxHashMap;

use crate::keys::{RecordKey, SheetKind};
use crate::text::normalize_key;

/// Records of one sheet kind in insertion order, plus a case-insensitive
/// key index.
///
/// `put` upserts the index (last write wins) but always appends to the
/// ordered list, so a replaced record stays visible to iteration.
#[derive(Debug, Clone)]
pub struct Page {
    kind: SheetKind,
    columns: Vec<String>,
    order: Vec<RecordKey>,
    index: FxHashMap<String, RecordKey>,
}

impl Page {
    pub fn new(kind: SheetKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            order: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    /// Column headers as read from the source, used for export.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.columns = columns;
    }

    /// Returns the record indexed under `key`, or `None` if not found.
    pub fn get(&self, key: &str) -> Option<RecordKey> {
        self.index.get(&normalize_key(key)).copied()
    }

    /// Indexes `record` under `key` (when non-empty) and appends it.
    pub fn put(&mut self, key: &str, record: RecordKey) {
        let key = normalize_key(key);
        if !key.is_empty() {
            self.index.insert(key, record);
        }
        self.order.push(record);
    }

    /// Removes `record` from both the index and the ordered list.
    ///
    /// Returns `false` if the page did not hold it.
    pub fn remove(&mut self, record: RecordKey) -> bool {
        let before = self.order.len();
        self.order.retain(|k| *k != record);
        self.index.retain(|_, k| *k != record);
        before != self.order.len()
    }

    /// Returns `true` if `record` is on this page.
    pub fn contains(&self, record: RecordKey) -> bool {
        self.order.contains(&record)
    }

    /// Record keys in insertion order.
    pub fn keys(&self) -> &[RecordKey] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
