// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for parsed records.
//!
//! The [`RecordStore`] is the single owner of every record. Records live in
//! one slot map with stable, generational keys; each sheet's [`Page`] holds
//! the keys of its records in insertion order together with a
//! case-insensitive name index. Cross-references between records are keys
//! too, so resolution never has to juggle borrowed records.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::keys::{RecordKey, SheetKind};
use crate::page::Page;
use crate::records::Record;

/// The central arena that owns all records and their pages.
///
/// # Example
///
/// ```
/// use cobie_lite_core::{Record, RecordStore, SheetKind};
///
/// let mut store = RecordStore::new();
/// let floor = store.insert(Record::named(SheetKind::Floor, "Level 1"));
///
/// assert_eq!(store.find(SheetKind::Floor, "LEVEL 1"), Some(floor));
/// assert_eq!(store.page(SheetKind::Floor).map(|p| p.len()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct RecordStore {
    pub(crate) records: SlotMap<RecordKey, Record>,
    pub(crate) pages: FxHashMap<SheetKind, Page>,
}

impl RecordStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
            pages: FxHashMap::default(),
        }
    }

    // --- Page operations ---

    /// Returns the page for a sheet kind, or `None` if it was never created.
    pub fn page(&self, kind: SheetKind) -> Option<&Page> {
        self.pages.get(&kind)
    }

    pub fn page_mut(&mut self, kind: SheetKind) -> Option<&mut Page> {
        self.pages.get_mut(&kind)
    }

    /// Returns the page for a sheet kind, creating an empty one if needed.
    pub fn ensure_page(&mut self, kind: SheetKind) -> &mut Page {
        self.pages.entry(kind).or_insert_with(|| Page::new(kind))
    }

    pub fn has_page(&self, kind: SheetKind) -> bool {
        self.pages.contains_key(&kind)
    }

    /// Existing pages in canonical sheet order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        SheetKind::ALL.into_iter().filter_map(|kind| self.pages.get(&kind))
    }

    /// Snapshot of a page's record keys, empty if the page does not exist.
    ///
    /// Passes iterate over this copy so they can mutate the store.
    pub fn keys_of(&self, kind: SheetKind) -> Vec<RecordKey> {
        self.page(kind).map(|p| p.keys().to_vec()).unwrap_or_default()
    }

    // --- Record operations ---

    /// Returns the record for the given key, or `None` if not found.
    pub fn record(&self, key: RecordKey) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn record_mut(&mut self, key: RecordKey) -> Option<&mut Record> {
        self.records.get_mut(key)
    }

    /// Returns the number of records held by the arena.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Looks up a record by sheet and key (case-insensitive).
    pub fn find(&self, kind: SheetKind, key: &str) -> Option<RecordKey> {
        self.page(kind)?.get(key)
    }

    /// Looks up a record by sheet and key, returning the record itself.
    pub fn get(&self, kind: SheetKind, key: &str) -> Option<&Record> {
        self.find(kind, key).and_then(|k| self.records.get(k))
    }

    /// Iterates a page's records in insertion order.
    pub fn records_of(&self, kind: SheetKind) -> impl Iterator<Item = (RecordKey, &Record)> {
        self.page(kind)
            .into_iter()
            .flat_map(|p| p.iter())
            .filter_map(move |k| self.records.get(k).map(|r| (k, r)))
    }

    /// Adds a record to the arena and puts it on its page.
    pub fn insert(&mut self, record: Record) -> RecordKey {
        let kind = record.kind();
        let page_key = record.key();
        let key = self.records.insert(record);
        self.ensure_page(kind).put(&page_key, key);
        key
    }

    /// Removes a record from its page and from the arena.
    ///
    /// References other records still hold to it stop resolving.
    pub fn remove(&mut self, key: RecordKey) -> Option<Record> {
        let record = self.records.remove(key)?;
        if let Some(page) = self.pages.get_mut(&record.kind()) {
            page.remove(key);
        }
        Some(record)
    }

    /// Returns the first well-formed Facility record.
    ///
    /// The Facility is a singleton; rows that refer to it carry no usable
    /// row reference.
    pub fn first_facility(&self) -> Option<RecordKey> {
        self.records_of(SheetKind::Facility)
            .find(|(_, r)| !r.key().trim().is_empty())
            .map(|(k, _)| k)
    }

    /// Name of a referenced record, or empty if the key no longer resolves.
    pub fn name_of(&self, key: Option<RecordKey>) -> String {
        key.and_then(|k| self.records.get(k))
            .map(|r| r.display_name().to_string())
            .unwrap_or_default()
    }
}
