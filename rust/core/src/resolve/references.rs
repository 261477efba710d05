// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sheet-scoped references: attributes, documents, issues and assemblies
//! name their target by `(sheet, row)` instead of by a fixed kind.

use super::{add_small_ref, Resolver};
use crate::diagnostics::{Category, MessageLogger};
use crate::keys::{RecordKey, SheetKind};
use crate::params;
use crate::records::add_ref;

/// Outcome of looking up a `(sheet, row)` pair.
enum RowTarget {
    Found(RecordKey),
    /// Reported already; nothing to bind.
    Reported,
}

impl<L: MessageLogger> Resolver<'_, L> {
    /// Binds an attribute to the record it describes.
    pub(super) fn resolve_attribute(&mut self, key: RecordKey) {
        let Some((name, sheet, row, value)) = self.store.record(key).and_then(|r| {
            let a = r.as_attribute()?;
            Some((
                r.name.clone(),
                a.sheet_name.clone(),
                a.row_name.clone(),
                a.value.clone(),
            ))
        }) else {
            return;
        };

        if value == name {
            self.log
                .data_integrity(Category::ValueIsName, params![name, sheet, row]);
            return;
        }
        let RowTarget::Found(owner) = self.lookup_row(key, &sheet, &row) else {
            return;
        };
        self.with_record(owner, |r| r.add_attribute(&name, key));
        self.with_record(key, |r| {
            r.parent = Some(owner);
            if let Some(a) = r.as_attribute_mut() {
                a.owner = Some(owner);
            }
        });
    }

    /// Attaches a document to the record it describes.
    pub(super) fn resolve_document(&mut self, key: RecordKey) {
        let Some((sheet, row)) = self.store.record(key).and_then(|r| {
            let d = r.as_document()?;
            Some((d.sheet_name.clone(), d.row_name.clone()))
        }) else {
            return;
        };

        let RowTarget::Found(owner) = self.lookup_row(key, &sheet, &row) else {
            return;
        };
        self.with_record(owner, |r| r.add_document(key));
        self.with_record(key, |r| {
            r.parent = Some(owner);
            if let Some(d) = r.as_document_mut() {
                d.owner = Some(owner);
            }
        });
    }

    /// Links an issue to the (up to two) records it is raised against.
    pub(super) fn resolve_issue(&mut self, key: RecordKey) {
        let Some(pairs) = self.store.record(key).and_then(|r| {
            let i = r.as_issue()?;
            Some([
                (i.sheet_name1.clone(), i.row_name1.clone()),
                (i.sheet_name2.clone(), i.row_name2.clone()),
            ])
        }) else {
            return;
        };

        for (sheet, row) in pairs {
            if sheet.is_empty() && row.is_empty() {
                continue;
            }
            let target = match SheetKind::from_name(&sheet) {
                Some(kind) if self.store.has_page(kind) => self.find_row(kind, &row),
                _ => None,
            };
            match target {
                Some(target) => self.with_record(key, |r| {
                    if let Some(i) = r.as_issue_mut() {
                        add_ref(&mut i.related, target);
                    }
                }),
                None => self.unresolved(key, &sheet, &row),
            }
        }
    }

    /// Resolves an assembly's parent and children on the named sheet.
    ///
    /// Resolution stops at the first missing sheet, parent or child list.
    pub(super) fn resolve_assembly(&mut self, key: RecordKey) {
        let Some((sheet, parent_name, child_names)) = self.store.record(key).and_then(|r| {
            let a = r.as_assembly()?;
            Some((
                a.sheet_name.clone(),
                a.parent_name.clone(),
                a.child_names.clone(),
            ))
        }) else {
            return;
        };

        if sheet.is_empty() {
            self.missing(key, Category::MissingSheetRef);
            return;
        }
        if parent_name.is_empty() {
            self.missing(key, Category::MissingParentRef);
            return;
        }
        if child_names.is_empty() {
            self.missing(key, Category::MissingChildRef);
            return;
        }

        let kind = match SheetKind::from_name(&sheet) {
            Some(kind) if self.store.has_page(kind) => kind,
            _ => {
                self.unresolved(key, &sheet, &parent_name);
                return;
            }
        };

        match self.store.find(kind, &parent_name) {
            Some(parent) => self.with_record(key, |r| {
                r.parent = Some(parent);
                if let Some(a) = r.as_assembly_mut() {
                    a.parent_ref = Some(parent);
                }
            }),
            None => self.unresolved(key, kind, &parent_name),
        }

        for child in &child_names {
            if self.cx.filters.is_filtered(kind.as_str(), child) {
                continue;
            }
            match self.store.find(kind, child) {
                Some(found) => self.with_record(key, |r| {
                    if let Some(a) = r.as_assembly_mut() {
                        add_small_ref(&mut a.children, found);
                    }
                }),
                None => self.unresolved(key, kind, child),
            }
        }
    }

    /// Shared `(sheet, row)` lookup for attributes and documents.
    ///
    /// A missing row name is tolerated on the facility sheet, which has a
    /// single row.
    fn lookup_row(&mut self, key: RecordKey, sheet: &str, row: &str) -> RowTarget {
        if sheet.is_empty() {
            self.missing(key, Category::MissingSheetRef);
            return RowTarget::Reported;
        }
        let kind = SheetKind::from_name(sheet);
        if row.is_empty() && kind != Some(SheetKind::Facility) {
            self.missing(key, Category::MissingRowRef);
            return RowTarget::Reported;
        }
        let kind = match kind {
            Some(kind) if self.store.has_page(kind) => kind,
            _ => {
                self.unresolved(key, sheet, row);
                return RowTarget::Reported;
            }
        };
        match self.find_row(kind, row) {
            Some(owner) => RowTarget::Found(owner),
            None => {
                self.unresolved(key, kind, row);
                RowTarget::Reported
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParseOptions;
    use crate::diagnostics::{Category, Diagnostics};
    use crate::keys::SheetKind;
    use crate::records::Record;
    use crate::resolve::{ResolutionContext, Resolver};
    use crate::store::RecordStore;

    fn resolve(store: &mut RecordStore) -> Diagnostics {
        let mut cx = ResolutionContext::from_options(&ParseOptions::default()).unwrap();
        let mut log = Diagnostics::new();
        Resolver {
            store,
            cx: &mut cx,
            log: &mut log,
        }
        .resolve_all();
        log
    }

    fn attribute(name: &str, sheet: &str, row: &str, value: &str) -> Record {
        let mut r = Record::named(SheetKind::Attribute, name);
        let a = r.as_attribute_mut().unwrap();
        a.sheet_name = sheet.into();
        a.row_name = row.into();
        a.value = value.into();
        r
    }

    #[test]
    fn attributes_bind_to_their_rows() {
        let mut store = RecordStore::new();
        let facility = store.insert(Record::named(SheetKind::Facility, "HQ"));
        let space = store.insert(Record::named(SheetKind::Space, "101"));
        let area = store.insert(attribute("Area", "SPACE", "101", "25"));
        let site = store.insert(attribute("Climate", "FACILITY", "", "Temperate"));

        let log = resolve(&mut store);
        assert!(log.is_empty(), "{:?}", log.entries());
        assert_eq!(store.record(space).unwrap().attribute("area"), Some(area));
        assert_eq!(store.record(area).unwrap().as_attribute().unwrap().owner, Some(space));
        assert_eq!(store.record(facility).unwrap().attribute("Climate"), Some(site));
    }

    #[test]
    fn value_equal_to_name_is_not_bound() {
        let mut store = RecordStore::new();
        let space = store.insert(Record::named(SheetKind::Space, "101"));
        let mark = store.insert(attribute("Mark", "SPACE", "101", "Mark"));

        let log = resolve(&mut store);
        assert_eq!(log.count(Category::ValueIsName), 1);
        assert_eq!(log.entries()[0].params, vec!["Mark", "SPACE", "101"]);
        assert!(store.record(space).unwrap().attribute("Mark").is_none());
        assert!(store.record(mark).unwrap().as_attribute().unwrap().owner.is_none());
    }

    #[test]
    fn value_equal_to_name_wins_over_missing_row() {
        let mut store = RecordStore::new();
        store.insert(Record::named(SheetKind::Space, "101"));
        store.insert(attribute("Mark", "SPACE", "999", "Mark"));

        let log = resolve(&mut store);
        assert_eq!(log.count(Category::ValueIsName), 1);
        assert_eq!(log.count(Category::UnresolvedRef), 0);
    }

    #[test]
    fn attribute_reference_errors() {
        let mut store = RecordStore::new();
        store.insert(Record::named(SheetKind::Space, "101"));
        store.insert(attribute("A", "", "101", "1"));
        store.insert(attribute("B", "SPACE", "", "1"));
        store.insert(attribute("C", "FLOOR", "L1", "1"));
        store.insert(attribute("D", "SPACE", "999", "1"));

        let log = resolve(&mut store);
        assert_eq!(log.count(Category::MissingSheetRef), 1);
        assert_eq!(log.count(Category::MissingRowRef), 1);
        assert_eq!(log.count(Category::UnresolvedRef), 2);
    }

    #[test]
    fn documents_attach_to_owner() {
        let mut store = RecordStore::new();
        let ty = store.insert(Record::named(SheetKind::Type, "Pump"));
        let mut doc = Record::named(SheetKind::Document, "Manual");
        {
            let d = doc.as_document_mut().unwrap();
            d.sheet_name = "TYPE".into();
            d.row_name = "pump".into();
        }
        let doc = store.insert(doc);

        resolve(&mut store);
        assert_eq!(store.record(ty).unwrap().documents, vec![doc]);
        assert_eq!(store.record(doc).unwrap().parent, Some(ty));
    }

    #[test]
    fn assembly_stops_at_first_missing_piece() {
        let mut store = RecordStore::new();
        let parent = store.insert(Record::named(SheetKind::Type, "Door Set"));
        let leaf = store.insert(Record::named(SheetKind::Type, "Leaf"));

        let mut full = Record::named(SheetKind::Assembly, "Door");
        {
            let a = full.as_assembly_mut().unwrap();
            a.sheet_name = "TYPE".into();
            a.parent_name = "Door Set".into();
            a.child_names = vec!["Leaf".into(), "Frame".into()];
        }
        let full = store.insert(full);

        let mut no_parent = Record::named(SheetKind::Assembly, "Window");
        {
            let a = no_parent.as_assembly_mut().unwrap();
            a.sheet_name = "TYPE".into();
            a.child_names = vec!["Leaf".into()];
        }
        store.insert(no_parent);

        let log = resolve(&mut store);
        let a = store.record(full).unwrap().as_assembly().unwrap();
        assert_eq!(a.parent_ref, Some(parent));
        assert_eq!(a.children.as_slice(), &[leaf]);
        assert_eq!(log.count(Category::MissingParentRef), 1);
        // "Frame" is not a type.
        assert_eq!(log.count(Category::UnresolvedRef), 1);
    }

    #[test]
    fn issues_link_related_rows() {
        let mut store = RecordStore::new();
        let space = store.insert(Record::named(SheetKind::Space, "101"));
        let mut issue = Record::named(SheetKind::Issue, "Clearance");
        {
            let i = issue.as_issue_mut().unwrap();
            i.sheet_name1 = "SPACE".into();
            i.row_name1 = "101".into();
            i.sheet_name2 = "COMPONENT".into();
            i.row_name2 = "C9".into();
        }
        let issue = store.insert(issue);

        let log = resolve(&mut store);
        assert_eq!(store.record(issue).unwrap().as_issue().unwrap().related, vec![space]);
        assert_eq!(log.count(Category::UnresolvedRef), 1);
    }
}
