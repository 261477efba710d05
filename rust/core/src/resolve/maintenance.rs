// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type, Job and Spare references: the operations and maintenance side.

use super::{add_small_ref, push_back_ref, Resolver};
use crate::config::Flags;
use crate::diagnostics::{Category, MessageLogger};
use crate::keys::{RecordKey, SheetKind};
use crate::params;
use crate::records::add_ref;
use crate::text::split_list;

/// Contact columns of the TYPE sheet, with whether they name the
/// manufacturer.
const TYPE_CONTACT_COLUMNS: [(&str, bool); 3] = [
    ("Manufacturer", true),
    ("WarrantyGuarantorParts", false),
    ("WarrantyGuarantorLabor", false),
];

impl<L: MessageLogger> Resolver<'_, L> {
    /// Resolves the manufacturer and warranty guarantor contacts of a type.
    pub(super) fn resolve_type(&mut self, key: RecordKey) {
        let Some(values) = self.store.record(key).and_then(|r| {
            let t = r.as_type()?;
            Some([
                t.manufacturer.clone(),
                t.warranty_guarantor_parts.clone(),
                t.warranty_guarantor_labor.clone(),
            ])
        }) else {
            return;
        };
        if !self.store.has_page(SheetKind::Contact) {
            return;
        }

        for ((column, is_manufacturer), value) in TYPE_CONTACT_COLUMNS.into_iter().zip(values) {
            if value.is_empty() {
                continue;
            }
            if self.cx.flags.contains(Flags::SKIP_ON_NO_VALUE) && value.eq_ignore_ascii_case(column) {
                continue;
            }
            let Some(contact) = self.find_contact(&value) else {
                self.unresolved(key, SheetKind::Contact, &value);
                continue;
            };
            self.make_type_contact(contact);
            if is_manufacturer {
                self.with_record(contact, |c| {
                    if let Some(c) = c.as_contact_mut() {
                        c.manufacturer = true;
                    }
                });
            }
            push_back_ref(self.store, key, contact, |t| {
                t.as_type_mut().map(|t| &mut t.contacts)
            });
        }
    }

    /// Resolves a job's types, task prerequisites and resources.
    pub(super) fn resolve_job(&mut self, key: RecordKey) {
        let Some((type_names, own_task, own_priors, tasks, resources)) =
            self.store.record(key).and_then(|r| {
                let j = r.as_job()?;
                let tasks: Vec<(String, Vec<String>)> = j
                    .tasks
                    .iter()
                    .map(|t| (t.name.clone(), t.prerequisites.clone()))
                    .collect();
                Some((
                    split_list(&j.type_name),
                    j.task_number.clone(),
                    split_list(&j.priors),
                    tasks,
                    j.resource_names.clone(),
                ))
            })
        else {
            return;
        };

        if type_names.is_empty() {
            self.missing_ref(key, SheetKind::Type);
        }
        for name in &type_names {
            match self.store.find(SheetKind::Type, name) {
                Some(ty) => {
                    self.with_record(key, |r| {
                        if let Some(j) = r.as_job_mut() {
                            add_small_ref(&mut j.types, ty);
                        }
                    });
                    push_back_ref(self.store, ty, key, |t| {
                        t.as_type_mut().map(|t| &mut t.jobs)
                    });
                }
                None => self.unresolved(key, SheetKind::Type, name),
            }
        }

        self.check_prerequisites(key, &own_task, &own_priors);
        for (task, prerequisites) in &tasks {
            self.check_prerequisites(key, task, prerequisites);
        }

        for name in &resources {
            let found = self.store.find(SheetKind::Resource, name).or_else(|| {
                let trimmed = name.trim_end_matches('.');
                (trimmed.len() != name.len())
                    .then(|| self.store.find(SheetKind::Resource, trimmed))
                    .flatten()
            });
            match found {
                Some(resource) => {
                    self.with_record(key, |r| {
                        if let Some(j) = r.as_job_mut() {
                            add_ref(&mut j.resources, resource);
                        }
                    });
                    push_back_ref(self.store, resource, key, |r| {
                        r.as_resource_mut().map(|r| &mut r.jobs)
                    });
                }
                None => self.unresolved(key, SheetKind::Resource, name),
            }
        }
    }

    fn check_prerequisites(&mut self, key: RecordKey, task: &str, prerequisites: &[String]) {
        let missing: Vec<&String> = {
            let Some(job) = self.store.record(key).and_then(|r| r.as_job()) else {
                return;
            };
            prerequisites.iter().filter(|p| !job.has_task(p)).collect()
        };
        if missing.is_empty() {
            return;
        }
        let (_, job_name) = self.describe(key);
        for prerequisite in missing {
            self.log.data_integrity(
                Category::TaskPrereqMissing,
                params![job_name, task, prerequisite],
            );
        }
    }

    /// Resolves a spare's type and suppliers.
    pub(super) fn resolve_spare(&mut self, key: RecordKey) {
        let Some((type_name, suppliers)) = self.store.record(key).and_then(|r| {
            let s = r.as_spare()?;
            Some((s.type_name.clone(), s.supplier_names.clone()))
        }) else {
            return;
        };

        if type_name.is_empty() {
            self.missing_ref(key, SheetKind::Type);
        } else {
            match self.store.find(SheetKind::Type, &type_name) {
                Some(ty) => {
                    self.with_record(key, |r| {
                        r.parent = Some(ty);
                        if let Some(s) = r.as_spare_mut() {
                            s.type_ref = Some(ty);
                        }
                    });
                    push_back_ref(self.store, ty, key, |t| {
                        t.as_type_mut().map(|t| &mut t.spares)
                    });
                }
                None => self.unresolved(key, SheetKind::Type, &type_name),
            }
        }

        if !self.store.has_page(SheetKind::Contact) {
            return;
        }
        for name in &suppliers {
            match self.find_contact(name) {
                Some(contact) => {
                    self.make_type_contact(contact);
                    self.with_record(key, |r| {
                        if let Some(s) = r.as_spare_mut() {
                            add_ref(&mut s.suppliers, contact);
                        }
                    });
                }
                None => self.unresolved(key, SheetKind::Contact, name),
            }
        }
    }
}
