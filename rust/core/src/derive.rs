// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Secondary derivations: promoting well-known attribute values into typed
//! fields and references once resolution has bound them.
//!
//! Every pass looks the attribute name up in the attribute type catalog
//! first and does nothing when no such type exists. Each returns the number
//! of records it changed, and a second run changes nothing.

use crate::filter::FilterChain;
use crate::ids::IdFactory;
use crate::keys::{RecordKey, SheetKind};
use crate::records::{add_ref, Record, RecordData};
use crate::store::RecordStore;
use crate::text::{push_unique_name, split_list};

/// Catalog spelling of an attribute name, or `None` when no attribute of
/// that name was consolidated.
fn catalog_name(store: &RecordStore, name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return None;
    }
    store
        .get(SheetKind::AttributeType, name)
        .map(|t| t.name.clone())
}

/// Value of the attribute `name` bound to `key`.
fn attribute_value(store: &RecordStore, key: RecordKey, name: &str) -> Option<String> {
    let attribute = store.record(key)?.attribute(name)?;
    let value = store.record(attribute)?.as_attribute()?.value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn detach(store: &mut RecordStore, key: RecordKey, name: &str) {
    if let Some(record) = store.record_mut(key) {
        record.remove_attribute(name);
    }
}

/// Components without a space take the space named by attribute `name`.
pub(crate) fn spaces_from_attribute(store: &mut RecordStore, name: &str) -> usize {
    let Some(name) = catalog_name(store, name) else {
        return 0;
    };
    let mut changed = 0;
    for key in store.keys_of(SheetKind::Component) {
        let has_space = store
            .record(key)
            .and_then(Record::as_component)
            .map_or(true, |c| c.space.is_some());
        if has_space {
            continue;
        }
        let Some(value) = attribute_value(store, key, &name) else {
            continue;
        };
        detach(store, key, &name);
        let Some(space) = store.find(SheetKind::Space, &value) else {
            continue;
        };
        let floor = store
            .record(space)
            .and_then(Record::as_space)
            .and_then(|s| s.floor);
        if let Some(record) = store.record_mut(key) {
            record.parent = Some(space);
            if let Some(c) = record.as_component_mut() {
                c.space = Some(space);
                c.floor = floor;
                if c.space_names.is_empty() {
                    c.space_names = value.clone();
                }
            }
        }
        if let Some(s) = store.record_mut(space).and_then(Record::as_space_mut) {
            add_ref(&mut s.components, key);
        }
        changed += 1;
    }
    changed
}

/// Components and spaces without a floor take the floor named by attribute
/// `name`. A record whose derived floor is filtered out is removed.
pub(crate) fn levels_from_attribute(store: &mut RecordStore, name: &str, filters: &FilterChain) -> usize {
    let Some(name) = catalog_name(store, name) else {
        return 0;
    };
    let mut changed = 0;

    for key in store.keys_of(SheetKind::Component) {
        let placed = store
            .record(key)
            .and_then(Record::as_component)
            .map_or(true, |c| c.space.is_some() || c.floor.is_some());
        if placed {
            // The space column already decided the floor.
            detach(store, key, &name);
            continue;
        }
        let Some(value) = attribute_value(store, key, &name) else {
            continue;
        };
        detach(store, key, &name);
        changed += assign_floor(store, key, &value, filters);
    }

    for key in store.keys_of(SheetKind::Space) {
        let placed = store
            .record(key)
            .and_then(Record::as_space)
            .map_or(true, |s| s.floor.is_some());
        if placed {
            continue;
        }
        let value = attribute_value(store, key, &name);
        detach(store, key, &name);
        if let Some(value) = value {
            changed += assign_floor(store, key, &value, filters);
        }
    }
    changed
}

fn assign_floor(store: &mut RecordStore, key: RecordKey, floor_name: &str, filters: &FilterChain) -> usize {
    if filters.is_filtered(SheetKind::Floor.as_str(), floor_name) {
        store.remove(key);
        return 1;
    }
    let Some(floor) = store.find(SheetKind::Floor, floor_name) else {
        return 0;
    };
    let Some(record) = store.record_mut(key) else {
        return 0;
    };
    record.parent = Some(floor);
    let is_space = match &mut record.data {
        RecordData::Component(c) => {
            c.floor = Some(floor);
            false
        }
        RecordData::Space(s) => {
            s.floor = Some(floor);
            if s.floor_name.is_empty() {
                s.floor_name = floor_name.to_string();
            }
            true
        }
        _ => return 0,
    };
    if let Some(f) = store.record_mut(floor).and_then(Record::as_floor_mut) {
        if is_space {
            add_ref(&mut f.spaces, key);
        } else {
            add_ref(&mut f.components, key);
        }
    }
    1
}

/// Which area measure a derivation fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    GrossArea,
    Perimeter,
}

/// Fills the gross area or perimeter of the facility, floors and spaces
/// from attribute `name`, detaching the attribute.
pub(crate) fn measure_from_attribute(store: &mut RecordStore, name: &str, measure: Measure) -> usize {
    let Some(name) = catalog_name(store, name) else {
        return 0;
    };
    let mut changed = 0;
    for kind in [SheetKind::Facility, SheetKind::Floor, SheetKind::Space] {
        for key in store.keys_of(kind) {
            let value = attribute_value(store, key, &name);
            detach(store, key, &name);
            let (Some(value), Some(areas)) = (value, store.record_mut(key).and_then(Record::areas_mut)) else {
                continue;
            };
            let slot = match measure {
                Measure::GrossArea => &mut areas.gross_area,
                Measure::Perimeter => &mut areas.perimeter,
            };
            if slot.is_empty() {
                *slot = value;
                changed += 1;
            }
        }
    }
    changed
}

/// Adds each component to the systems listed in attribute `name`, creating
/// systems that do not exist yet.
pub(crate) fn systems_from_attribute(store: &mut RecordStore, name: &str, ids: &mut dyn IdFactory) -> usize {
    let Some(name) = catalog_name(store, name) else {
        return 0;
    };
    let facility = store.first_facility();
    let mut changed = 0;

    for key in store.keys_of(SheetKind::Component) {
        let Some(value) = attribute_value(store, key, &name) else {
            continue;
        };
        for system_name in split_list(&value) {
            let system = match store.find(SheetKind::System, &system_name) {
                Some(system) => system,
                None => {
                    let mut record = Record::named(SheetKind::System, &system_name);
                    record.unique_id = ids.unique_id(SheetKind::System);
                    record.facility = facility;
                    store.insert(record)
                }
            };
            let component_name = store.name_of(Some(key));
            if let Some(group) = store.record_mut(system).and_then(Record::as_group_mut) {
                if !group.members.contains(&key) {
                    group.members.push(key);
                    changed += 1;
                }
                push_unique_name(&mut group.member_names, &component_name);
            }
        }
    }
    changed
}

/// Uncategorised records take their category from attribute `name`.
pub(crate) fn category_from_attribute(store: &mut RecordStore, name: &str) -> usize {
    let Some(name) = catalog_name(store, name) else {
        return 0;
    };
    let mut changed = 0;
    for kind in SheetKind::ALL {
        if matches!(kind, SheetKind::AttributeType | SheetKind::ValueList) {
            continue;
        }
        for key in store.keys_of(kind) {
            let uncategorised = store.record(key).map_or(false, |r| r.category.is_empty());
            if !uncategorised {
                continue;
            }
            let Some(value) = attribute_value(store, key, &name) else {
                continue;
            };
            if let Some(record) = store.record_mut(key) {
                record.set_category(&value);
                if !record.category.is_empty() {
                    changed += 1;
                }
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, MatchKind, Polarity};
    use crate::ids::SequentialIdFactory;

    /// Store with one attribute type per name, and a helper binding values.
    struct Fixture {
        store: RecordStore,
    }

    impl Fixture {
        fn new(types: &[&str]) -> Self {
            let mut store = RecordStore::new();
            for name in types {
                store.insert(Record::named(SheetKind::AttributeType, name));
            }
            Self { store }
        }

        fn record(&mut self, kind: SheetKind, name: &str) -> RecordKey {
            self.store.insert(Record::named(kind, name))
        }

        fn bind(&mut self, owner: RecordKey, name: &str, value: &str) -> RecordKey {
            let mut r = Record::named(SheetKind::Attribute, name);
            {
                let a = r.as_attribute_mut().unwrap();
                a.value = value.into();
                a.owner = Some(owner);
            }
            let key = self.store.insert(r);
            self.store.record_mut(owner).unwrap().add_attribute(name, key);
            key
        }
    }

    #[test]
    fn absent_attribute_type_is_a_no_op() {
        let mut fx = Fixture::new(&[]);
        let c = fx.record(SheetKind::Component, "C1");
        fx.bind(c, "Room Name", "101");
        fx.record(SheetKind::Space, "101");
        assert_eq!(spaces_from_attribute(&mut fx.store, "Room Name"), 0);
        assert!(fx.store.record(c).unwrap().attribute("Room Name").is_some());
    }

    #[test]
    fn components_gain_spaces() {
        let mut fx = Fixture::new(&["Room Name"]);
        let space = fx.record(SheetKind::Space, "101");
        let c = fx.record(SheetKind::Component, "C1");
        fx.bind(c, "ROOM NAME", "101");

        assert_eq!(spaces_from_attribute(&mut fx.store, "room name"), 1);
        let record = fx.store.record(c).unwrap();
        assert_eq!(record.as_component().unwrap().space, Some(space));
        assert_eq!(record.parent, Some(space));
        assert!(record.attribute("Room Name").is_none());
        assert_eq!(fx.store.record(space).unwrap().as_space().unwrap().components, vec![c]);

        assert_eq!(spaces_from_attribute(&mut fx.store, "room name"), 0);
    }

    #[test]
    fn levels_assign_or_remove() {
        let mut fx = Fixture::new(&["Level"]);
        let l1 = fx.record(SheetKind::Floor, "L1");
        let placed = fx.record(SheetKind::Component, "C1");
        fx.bind(placed, "Level", "L1");
        let gone = fx.record(SheetKind::Space, "901");
        fx.bind(gone, "Level", "Roof");

        let mut filter = Filter::new(Polarity::Exclude);
        filter.add_entry("FLOOR", "Roof", MatchKind::Exact).unwrap();
        let mut filters = FilterChain::new();
        filters.push(filter);

        assert_eq!(levels_from_attribute(&mut fx.store, "level", &filters), 2);
        assert_eq!(fx.store.record(placed).unwrap().as_component().unwrap().floor, Some(l1));
        assert_eq!(fx.store.record(l1).unwrap().as_floor().unwrap().components, vec![placed]);
        assert!(fx.store.record(gone).is_none());
        assert!(fx.store.find(SheetKind::Space, "901").is_none());
    }

    #[test]
    fn area_and_perimeter_fill_empty_measures() {
        let mut fx = Fixture::new(&["Area", "Perimeter"]);
        let space = fx.record(SheetKind::Space, "101");
        fx.bind(space, "Area", "25.5");
        fx.bind(space, "Perimeter", "21");
        let floor = fx.record(SheetKind::Floor, "L1");
        fx.store.record_mut(floor).unwrap().areas_mut().unwrap().gross_area = "900".into();
        fx.bind(floor, "Area", "1");

        assert_eq!(measure_from_attribute(&mut fx.store, "area", Measure::GrossArea), 1);
        assert_eq!(measure_from_attribute(&mut fx.store, "perimeter", Measure::Perimeter), 1);

        let s = fx.store.record(space).unwrap();
        let area: f64 = s.areas().unwrap().gross_area.parse().unwrap();
        approx::assert_relative_eq!(area, 25.5);
        assert_eq!(s.areas().unwrap().perimeter, "21");
        assert!(s.attribute("Area").is_none());
        assert_eq!(fx.store.record(floor).unwrap().areas().unwrap().gross_area, "900");
        assert!(fx.store.record(floor).unwrap().attribute("Area").is_none());
    }

    #[test]
    fn systems_are_created_on_demand() {
        let mut fx = Fixture::new(&["System Name"]);
        let existing = fx.record(SheetKind::System, "HVAC");
        let ahu = fx.record(SheetKind::Component, "AHU-1");
        fx.bind(ahu, "System Name", "HVAC, Supply Air");
        let mut ids = SequentialIdFactory::new();

        assert_eq!(systems_from_attribute(&mut fx.store, "System Name", &mut ids), 2);
        assert_eq!(fx.store.record(existing).unwrap().as_group().unwrap().members, vec![ahu]);
        let created = fx.store.get(SheetKind::System, "supply air").unwrap();
        assert_eq!(created.unique_id, "SYSTEM-1");
        assert_eq!(created.as_group().unwrap().member_names, vec!["AHU-1"]);

        assert_eq!(systems_from_attribute(&mut fx.store, "System Name", &mut ids), 0);
        assert_eq!(ids.issued(SheetKind::System), 1);
    }

    #[test]
    fn category_only_fills_blanks() {
        let mut fx = Fixture::new(&["OmniClass Number"]);
        let blank = fx.record(SheetKind::Type, "Pump");
        fx.bind(blank, "OmniClass Number", " 23-13 11 ");
        let set = fx.record(SheetKind::Type, "Fan");
        fx.store.record_mut(set).unwrap().category = "Fans".into();
        fx.bind(set, "OmniClass Number", "23-99");

        assert_eq!(category_from_attribute(&mut fx.store, "omniclass number"), 1);
        assert_eq!(fx.store.record(blank).unwrap().category, "23-13 11");
        assert_eq!(fx.store.record(set).unwrap().category, "Fans");
    }
}
