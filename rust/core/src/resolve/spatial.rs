// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facility → floor → space → component links.

use super::{push_back_ref, Resolver};
use crate::diagnostics::{Category, MessageLogger};
use crate::keys::{RecordKey, SheetKind};
use crate::params;

impl<L: MessageLogger> Resolver<'_, L> {
    pub(super) fn resolve_floor(&mut self, key: RecordKey, facility: Option<RecordKey>) {
        let Some(facility) = facility else {
            return;
        };
        push_back_ref(self.store, facility, key, |f| {
            f.as_facility_mut().map(|f| &mut f.floors)
        });
        self.with_record(key, |r| r.parent = Some(facility));
    }

    pub(super) fn resolve_space(&mut self, key: RecordKey) {
        let Some(floor_name) = self
            .store
            .record(key)
            .and_then(|r| r.as_space())
            .map(|s| s.floor_name.clone())
        else {
            return;
        };
        if !self.store.has_page(SheetKind::Floor) {
            return;
        }
        if floor_name.is_empty() {
            self.missing_ref(key, SheetKind::Floor);
            return;
        }
        let Some(floor) = self.store.find(SheetKind::Floor, &floor_name) else {
            self.unresolved(key, SheetKind::Floor, &floor_name);
            return;
        };
        self.with_record(key, |r| {
            r.parent = Some(floor);
            if let Some(s) = r.as_space_mut() {
                s.floor = Some(floor);
            }
        });
        push_back_ref(self.store, floor, key, |f| {
            f.as_floor_mut().map(|f| &mut f.spaces)
        });
    }

    /// Attaches a component to its space, or to a floor of the same name,
    /// or to the facility; then resolves its type and vendor.
    pub(super) fn resolve_component(&mut self, key: RecordKey, facility: Option<RecordKey>) {
        let Some((name, space_name, has_list, type_name)) = self.store.record(key).and_then(|r| {
            let c = r.as_component()?;
            Some((
                r.name.clone(),
                c.first_space_name().to_string(),
                c.has_space_list(),
                c.type_name.clone(),
            ))
        }) else {
            return;
        };

        if space_name.is_empty() {
            self.missing_ref(key, SheetKind::Space);
        } else if has_list {
            self.log.data_integrity(Category::SpaceList, params![name]);
        }

        let space = if space_name.is_empty() {
            None
        } else {
            self.store.find(SheetKind::Space, &space_name)
        };

        if let Some(space) = space {
            let floor = self
                .store
                .record(space)
                .and_then(|s| s.as_space())
                .and_then(|s| s.floor);
            self.with_record(key, |r| {
                r.parent = Some(space);
                if let Some(c) = r.as_component_mut() {
                    c.space = Some(space);
                    c.floor = floor;
                }
            });
            push_back_ref(self.store, space, key, |s| {
                s.as_space_mut().map(|s| &mut s.components)
            });
        } else if let Some(floor) = self.find_floor_fallback(&space_name) {
            self.with_record(key, |r| {
                r.parent = Some(floor);
                if let Some(c) = r.as_component_mut() {
                    c.floor = Some(floor);
                }
            });
            push_back_ref(self.store, floor, key, |f| {
                f.as_floor_mut().map(|f| &mut f.components)
            });
        } else {
            if !space_name.is_empty() && self.store.has_page(SheetKind::Space) {
                self.unresolved(key, SheetKind::Space, &space_name);
            }
            if let Some(facility) = facility {
                self.with_record(key, |r| r.parent = Some(facility));
            }
        }

        if !type_name.is_empty() && self.store.has_page(SheetKind::Type) {
            match self.store.find(SheetKind::Type, &type_name) {
                Some(ty) => {
                    self.with_record(key, |r| {
                        if let Some(c) = r.as_component_mut() {
                            c.type_ref = Some(ty);
                        }
                    });
                    push_back_ref(self.store, ty, key, |t| {
                        t.as_type_mut().map(|t| &mut t.components)
                    });
                }
                None => self.unresolved(key, SheetKind::Type, &type_name),
            }
        }

        self.resolve_vendor(key);
    }

    /// Components sometimes name a floor where a space belongs.
    fn find_floor_fallback(&self, name: &str) -> Option<RecordKey> {
        if name.is_empty() {
            return None;
        }
        self.store.find(SheetKind::Floor, name)
    }

    /// Resolves the vendor contact named (by company) in the configured
    /// vendor attribute.
    fn resolve_vendor(&mut self, key: RecordKey) {
        let Some(attribute_name) = self.cx.vendor_attribute.clone() else {
            return;
        };
        let Some(company) = self
            .store
            .record(key)
            .and_then(|r| r.attribute(&attribute_name))
            .and_then(|a| self.store.record(a))
            .and_then(|a| a.as_attribute())
            .map(|a| a.value.trim().to_string())
        else {
            return;
        };
        match self.cx.company_contact(&company) {
            Some(contact) => {
                self.make_type_contact(contact);
                self.with_record(key, |r| {
                    if let Some(c) = r.as_component_mut() {
                        c.vendor = Some(contact);
                    }
                });
            }
            None => self.unresolved(key, SheetKind::Contact, &company),
        }
    }
}
