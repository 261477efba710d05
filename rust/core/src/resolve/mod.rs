// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference resolution.
//!
//! After every sheet is loaded, the [`Resolver`] turns the name-valued
//! references each record carries into [`RecordKey`] links. Sheets are
//! visited in a fixed order: attributes first (later passes read them),
//! then the facility, floors and spaces (each attaches to the one before),
//! then everything else.
//!
//! Every link is written idempotently, so resolving twice leaves the store
//! as it was after the first pass. Unresolvable references are logged as
//! data-integrity diagnostics and leave the slot empty.

mod groups;
mod maintenance;
mod references;
mod spatial;

use std::fmt::Display;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::attribute_types::AttributeTypeMap;
use crate::config::{Flags, ParseOptions};
use crate::diagnostics::{Category, MessageLogger};
use crate::error::Result;
use crate::filter::FilterChain;
use crate::keys::{RecordKey, SheetKind};
use crate::numeric::NumberFormat;
use crate::params;
use crate::records::{add_ref, Record};
use crate::store::RecordStore;
use crate::text::normalize_key;

/// Catalogs shared by loading, resolution and the final passes.
///
/// One context belongs to one parser; nothing here is global.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub flags: Flags,
    pub filters: FilterChain,
    pub number_format: NumberFormat,
    pub vendor_attribute: Option<String>,
    /// Normalized names of spaces dropped while loading.
    pub skipped_spaces: FxHashSet<String>,
    /// Upper-cased company name to the first contact naming it.
    pub company_contacts: FxHashMap<String, RecordKey>,
    pub attribute_types: AttributeTypeMap,
}

impl ResolutionContext {
    pub fn from_options(options: &ParseOptions) -> Result<Self> {
        Ok(Self {
            flags: options.flags,
            filters: FilterChain::from_specs(&options.filters)?,
            number_format: options.number_format(),
            vendor_attribute: options
                .vendor_attribute
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            skipped_spaces: FxHashSet::default(),
            company_contacts: FxHashMap::default(),
            attribute_types: AttributeTypeMap::default(),
        })
    }

    /// Returns `true` if a space of this name was dropped while loading.
    pub fn is_space_skipped(&self, name: &str) -> bool {
        self.skipped_spaces.contains(&normalize_key(name))
    }

    /// Returns the contact that first named `company`, or `None` if not
    /// found.
    pub fn company_contact(&self, company: &str) -> Option<RecordKey> {
        self.company_contacts.get(&normalize_key(company)).copied()
    }

    fn index_company_contacts(&mut self, store: &RecordStore) {
        self.company_contacts.clear();
        for (key, record) in store.records_of(SheetKind::Contact) {
            let Some(contact) = record.as_contact() else {
                continue;
            };
            if !contact.company.is_empty() {
                self.company_contacts
                    .entry(normalize_key(&contact.company))
                    .or_insert(key);
            }
        }
    }
}

/// Sheet kinds in resolution order.
pub fn resolution_order() -> impl Iterator<Item = SheetKind> {
    const FIRST: [SheetKind; 4] = [
        SheetKind::Attribute,
        SheetKind::Facility,
        SheetKind::Floor,
        SheetKind::Space,
    ];
    FIRST.into_iter().chain(
        SheetKind::LOAD_ORDER
            .into_iter()
            .filter(|kind| !FIRST.contains(kind)),
    )
}

/// Borrows the parser state one resolution pass mutates.
pub(crate) struct Resolver<'a, L: MessageLogger> {
    pub store: &'a mut RecordStore,
    pub cx: &'a mut ResolutionContext,
    pub log: &'a mut L,
}

impl<L: MessageLogger> Resolver<'_, L> {
    /// Resolves every loaded record. Returns the number of records visited.
    pub fn resolve_all(&mut self) -> usize {
        self.cx.index_company_contacts(self.store);
        let facility = self.store.first_facility();

        let mut visited = 0;
        for kind in resolution_order() {
            for key in self.store.keys_of(kind) {
                self.resolve_record(key, facility);
                visited += 1;
            }
        }
        tracing::debug!(records = visited, "references resolved");
        visited
    }

    fn resolve_record(&mut self, key: RecordKey, facility: Option<RecordKey>) {
        let Some(kind) = self.store.record(key).map(Record::kind) else {
            return;
        };
        if !matches!(kind, SheetKind::Attribute | SheetKind::Document) {
            self.resolve_common(key, kind, facility);
        }
        match kind {
            SheetKind::Attribute => self.resolve_attribute(key),
            SheetKind::Document => self.resolve_document(key),
            SheetKind::Issue => self.resolve_issue(key),
            SheetKind::Floor => self.resolve_floor(key, facility),
            SheetKind::Space => self.resolve_space(key),
            SheetKind::Component => self.resolve_component(key, facility),
            SheetKind::Type => self.resolve_type(key),
            SheetKind::Job => self.resolve_job(key),
            SheetKind::Spare => self.resolve_spare(key),
            SheetKind::Assembly => self.resolve_assembly(key),
            SheetKind::System => self.resolve_group(key, SheetKind::Component),
            SheetKind::Zone => self.resolve_group(key, SheetKind::Space),
            _ => {}
        }
    }

    /// Facility link and creating contact, shared by most kinds.
    fn resolve_common(&mut self, key: RecordKey, kind: SheetKind, facility: Option<RecordKey>) {
        let created_by = self
            .store
            .record(key)
            .map(|r| r.created_by.clone())
            .unwrap_or_default();

        if kind != SheetKind::Facility {
            self.with_record(key, |r| r.facility = facility);
        }
        if created_by.is_empty() || !self.store.has_page(SheetKind::Contact) {
            return;
        }
        match self.store.find(SheetKind::Contact, &created_by) {
            Some(contact) => {
                self.with_record(key, |r| r.creating_contact = Some(contact));
                self.with_record(contact, |c| {
                    if let Some(c) = c.as_contact_mut() {
                        c.admin_contact = true;
                    }
                });
            }
            None => self.unresolved(key, SheetKind::Contact, &created_by),
        }
    }

    // --- Helpers ---

    fn with_record(&mut self, key: RecordKey, f: impl FnOnce(&mut Record)) {
        if let Some(record) = self.store.record_mut(key) {
            f(record);
        }
    }

    /// Kind and display name of a record, for messages.
    fn describe(&self, key: RecordKey) -> (SheetKind, String) {
        self.store
            .record(key)
            .map(|r| (r.kind(), r.display_name().to_string()))
            .unwrap_or((SheetKind::Facility, String::new()))
    }

    /// Logs `vdt_unresolved_ref` for a reference from `key` to `target`.
    fn unresolved(&mut self, key: RecordKey, target: impl Display, target_name: &str) {
        let (kind, name) = self.describe(key);
        self.log.data_integrity(
            Category::UnresolvedRef,
            params![kind, name, target, target_name],
        );
    }

    /// Logs `category` with the source record's kind and name.
    fn missing(&mut self, key: RecordKey, category: Category) {
        let (kind, name) = self.describe(key);
        self.log.data_integrity(category, params![kind, name]);
    }

    /// Logs `vdt_missing_ref` for an empty reference to `target`.
    fn missing_ref(&mut self, key: RecordKey, target: SheetKind) {
        let (kind, name) = self.describe(key);
        self.log
            .data_integrity(Category::MissingRef, params![kind, name, target]);
    }

    /// Marks a contact as referenced by a type, spare or component.
    fn make_type_contact(&mut self, contact: RecordKey) {
        self.with_record(contact, |c| {
            if let Some(c) = c.as_contact_mut() {
                c.type_contact = true;
            }
        });
    }

    /// Finds a contact by email, falling back to the company lookup.
    fn find_contact(&self, name: &str) -> Option<RecordKey> {
        self.store
            .find(SheetKind::Contact, name)
            .or_else(|| self.cx.company_contact(name))
    }

    /// Finds the record a `(sheet, row)` pair names.
    ///
    /// The facility is a singleton and is found without a row name.
    fn find_row(&self, sheet: SheetKind, row: &str) -> Option<RecordKey> {
        if sheet == SheetKind::Facility {
            if let Some(facility) = self.store.first_facility() {
                return Some(facility);
            }
        }
        if row.is_empty() {
            return None;
        }
        self.store.find(sheet, row)
    }
}

/// Appends `key` to a small vector unless present.
fn add_small_ref<A: smallvec::Array<Item = RecordKey>>(list: &mut smallvec::SmallVec<A>, key: RecordKey) {
    if !list.contains(&key) {
        list.push(key);
    }
}

/// Pushes a back-reference onto a record's key list via `select`.
fn push_back_ref(
    store: &mut RecordStore,
    owner: RecordKey,
    key: RecordKey,
    select: impl FnOnce(&mut Record) -> Option<&mut Vec<RecordKey>>,
) {
    if let Some(list) = store.record_mut(owner).and_then(select) {
        add_ref(list, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_with_attributes_then_spatial() {
        let order: Vec<_> = resolution_order().collect();
        assert_eq!(
            &order[..4],
            &[
                SheetKind::Attribute,
                SheetKind::Facility,
                SheetKind::Floor,
                SheetKind::Space
            ]
        );
        assert_eq!(order.len(), SheetKind::LOAD_ORDER.len());
        assert!(!order.contains(&SheetKind::Company));
    }

    #[test]
    fn company_lookup_keeps_first_contact() {
        let mut store = RecordStore::new();
        let mut a = Record::named(SheetKind::Contact, "a@acme.com");
        a.as_contact_mut().unwrap().company = "Acme".into();
        let mut b = Record::named(SheetKind::Contact, "b@acme.com");
        b.as_contact_mut().unwrap().company = "ACME".into();
        let a = store.insert(a);
        store.insert(b);

        let mut cx = ResolutionContext::from_options(&ParseOptions::default()).unwrap();
        cx.index_company_contacts(&store);
        assert_eq!(cx.company_contact("acme"), Some(a));
        assert_eq!(cx.company_contact("Other"), None);
    }
}
