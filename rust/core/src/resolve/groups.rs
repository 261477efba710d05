// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::Resolver;
use crate::diagnostics::MessageLogger;
use crate::keys::{RecordKey, SheetKind};
use crate::records::add_ref;

impl<L: MessageLogger> Resolver<'_, L> {
    /// Resolves the members of a System (components) or Zone (spaces).
    ///
    /// Members that were filtered out while loading are dropped silently.
    pub(super) fn resolve_group(&mut self, key: RecordKey, member_kind: SheetKind) {
        let Some(names) = self
            .store
            .record(key)
            .and_then(|r| r.as_group())
            .map(|g| g.member_names.clone())
        else {
            return;
        };
        if names.is_empty() {
            self.missing_ref(key, member_kind);
            return;
        }

        for name in &names {
            if self.cx.filters.is_filtered(member_kind.as_str(), name)
                || (member_kind == SheetKind::Space && self.cx.is_space_skipped(name))
            {
                continue;
            }
            match self.store.find(member_kind, name) {
                Some(member) => self.with_record(key, |r| {
                    if let Some(g) = r.as_group_mut() {
                        add_ref(&mut g.members, member);
                    }
                }),
                None => self.unresolved(key, member_kind, name),
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

    #[test]
    fn systems_and_zones_resolve_members() {
        let mut store = RecordStore::new();
        let ahu = store.insert(Record::named(SheetKind::Component, "AHU-1"));
        let office = store.insert(Record::named(SheetKind::Space, "101"));

        let mut system = Record::named(SheetKind::System, "HVAC");
        system.as_group_mut().unwrap().member_names = vec!["ahu-1".into(), "AHU-9".into()];
        let system = store.insert(system);
        let mut zone = Record::named(SheetKind::Zone, "East");
        zone.as_group_mut().unwrap().member_names = vec!["101".into(), "102".into()];
        let zone = store.insert(zone);
        store.insert(Record::named(SheetKind::Zone, "Empty"));

        let mut cx = ResolutionContext::from_options(&ParseOptions::default()).unwrap();
        cx.skipped_spaces.insert("102".into());
        let mut log = Diagnostics::new();
        Resolver {
            store: &mut store,
            cx: &mut cx,
            log: &mut log,
        }
        .resolve_all();

        assert_eq!(store.record(system).unwrap().as_group().unwrap().members, vec![ahu]);
        assert_eq!(store.record(zone).unwrap().as_group().unwrap().members, vec![office]);
        // AHU-9 is unknown; 102 was dropped while loading.
        assert_eq!(log.count(Category::UnresolvedRef), 1);
        let missing = log.by_category(Category::MissingRef).find(|d| d.params[0] == "ZONE");
        assert_eq!(missing.unwrap().params, vec!["ZONE", "Empty", "SPACE"]);
    }
}
