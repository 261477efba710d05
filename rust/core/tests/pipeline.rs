// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end parse runs over in-memory sheets.
//! Covers loading, reference resolution, facility merging and re-resolution.

use cobie_lite_core::{Category, CobieParser, MemorySource, ParseOptions, RecordKey, SheetKind};

/// One floor, one space on it, one type and one component in the space.
fn small_building() -> MemorySource {
    MemorySource::new("building.xlsx")
        .with_sheet(
            SheetKind::Facility,
            &["Name", "ProjectName", "SiteName"],
            &[&["HQ", "Refit", "North Campus"]],
        )
        .with_sheet(SheetKind::Floor, &["Name", "Elevation"], &[&["L1", "0"]])
        .with_sheet(SheetKind::Space, &["Name", "FloorName"], &[&["S1", "L1"]])
        .with_sheet(SheetKind::Type, &["Name", "AssetType"], &[&["Pump", "Fixed"]])
        .with_sheet(
            SheetKind::Component,
            &["Name", "TypeName", "Space"],
            &[&["C1", "Pump", "S1"]],
        )
}

fn key(parser: &CobieParser, kind: SheetKind, name: &str) -> RecordKey {
    parser.store().find(kind, name).unwrap()
}

#[test]
fn floor_space_component_are_linked() {
    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    let summary = parser.execute(&small_building());
    assert_eq!(summary.loaded.admitted, 5);
    assert_eq!(summary.errors, 0);

    let hq = key(&parser, SheetKind::Facility, "HQ");
    let l1 = key(&parser, SheetKind::Floor, "L1");
    let s1 = key(&parser, SheetKind::Space, "S1");
    let c1 = key(&parser, SheetKind::Component, "C1");
    let pump = key(&parser, SheetKind::Type, "Pump");
    let store = parser.store();

    assert_eq!(store.record(hq).unwrap().as_facility().unwrap().floors, vec![l1]);
    assert_eq!(store.record(l1).unwrap().parent, Some(hq));

    let space = store.record(s1).unwrap();
    assert_eq!(space.parent, Some(l1));
    assert_eq!(space.facility, Some(hq));
    assert_eq!(space.as_space().unwrap().floor, Some(l1));
    assert_eq!(space.as_space().unwrap().components, vec![c1]);
    assert_eq!(store.record(l1).unwrap().as_floor().unwrap().spaces, vec![s1]);

    let component = store.record(c1).unwrap().as_component().unwrap();
    assert_eq!(component.space, Some(s1));
    assert_eq!(component.floor, Some(l1));
    assert_eq!(component.type_ref, Some(pump));
    assert_eq!(store.record(pump).unwrap().as_type().unwrap().components, vec![c1]);
}

#[test]
fn component_naming_a_floor_lands_on_it() {
    let source = MemorySource::new("a.xlsx")
        .with_sheet(SheetKind::Facility, &["Name"], &[&["HQ"]])
        .with_sheet(SheetKind::Floor, &["Name"], &[&["Roof"]])
        .with_sheet(SheetKind::Space, &["Name", "FloorName"], &[&["S1", "Roof"]])
        .with_sheet(SheetKind::Component, &["Name", "Space"], &[&["Fan 1", "Roof"], &["Fan 2", "Attic"]]);

    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    parser.execute(&source);

    let roof = key(&parser, SheetKind::Floor, "Roof");
    let hq = key(&parser, SheetKind::Facility, "HQ");
    let fan1 = key(&parser, SheetKind::Component, "Fan 1");
    let fan2 = key(&parser, SheetKind::Component, "Fan 2");
    let store = parser.store();

    let fan = store.record(fan1).unwrap();
    assert_eq!(fan.parent, Some(roof));
    assert_eq!(fan.as_component().unwrap().space, None);
    assert!(store.record(roof).unwrap().as_floor().unwrap().components.contains(&fan1));

    // Neither a space nor a floor: parked on the facility and reported.
    assert_eq!(store.record(fan2).unwrap().parent, Some(hq));
    let unresolved: Vec<_> = parser
        .diagnostics()
        .by_category(Category::UnresolvedRef)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].params.contains(&"Attic".to_string()));
}

#[test]
fn facility_rows_from_two_files_merge() {
    let first = MemorySource::new("architecture.xlsx").with_sheet(
        SheetKind::Facility,
        &["Name", "ProjectName", "SiteName"],
        &[&["HQ", "Refit", ""]],
    );
    let second = MemorySource::new("mechanical.xlsx").with_sheet(
        SheetKind::Facility,
        &["Name", "ProjectName", "SiteName"],
        &[&["HQ", "Other Project", "North Campus"]],
    );

    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    let a = parser.load(&first);
    let b = parser.load(&second);
    assert_eq!(a.admitted, 1);
    assert_eq!(b.merged, 1);
    parser.resolve();

    assert_eq!(parser.store().page(SheetKind::Facility).unwrap().len(), 1);
    let facility = parser.store().get(SheetKind::Facility, "HQ").unwrap();
    let data = facility.as_facility().unwrap();
    // The first file wins; the second only fills blanks.
    assert_eq!(data.project_name, "Refit");
    assert_eq!(data.site_name, "North Campus");
    assert_eq!(parser.diagnostics().count(Category::FileParsed), 2);
}

#[test]
fn resolving_twice_changes_nothing() {
    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    parser.load(&small_building());
    parser.resolve();
    let before = parser.store().to_json().unwrap();
    parser.resolve();
    let after = parser.store().to_json().unwrap();
    assert_eq!(before, after);

    let l1 = parser.store().get(SheetKind::Floor, "L1").unwrap();
    assert_eq!(l1.as_floor().unwrap().spaces.len(), 1);
}

#[test]
fn duplicates_in_one_file_are_reported() {
    let source = MemorySource::new("a.xlsx").with_sheet(SheetKind::Floor, &["Name"], &[&["L1"], &["l1"]]);
    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    let stats = parser.load(&source);
    assert_eq!(stats.admitted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(parser.diagnostics().count(Category::Duplicate), 1);
}

#[test]
fn maintenance_sheets_resolve_against_types() {
    let source = MemorySource::new("a.xlsx")
        .with_sheet(
            SheetKind::Contact,
            &["Email", "Company"],
            &[&["sales@acme.com", "Acme"]],
        )
        .with_sheet(
            SheetKind::Type,
            &["Name", "Manufacturer"],
            &[&["Pump", "sales@acme.com"]],
        )
        .with_sheet(SheetKind::Resource, &["Name"], &[&["Wrench"]])
        .with_sheet(
            SheetKind::Job,
            &["Name", "TypeName", "TaskNumber", "Priors", "ResourceNames"],
            &[&["Service", "Pump", "1", "", "Wrench."]],
        )
        .with_sheet(
            SheetKind::Spare,
            &["Name", "TypeName", "Suppliers"],
            &[&["Seal", "Pump", "sales@acme.com"]],
        );

    let mut parser = CobieParser::new(ParseOptions::default()).unwrap();
    parser.execute(&source);

    let pump = key(&parser, SheetKind::Type, "Pump");
    let job = key(&parser, SheetKind::Job, "Service");
    let wrench = key(&parser, SheetKind::Resource, "Wrench");
    let seal = key(&parser, SheetKind::Spare, "Seal");
    let store = parser.store();

    let t = store.record(pump).unwrap().as_type().unwrap();
    assert_eq!(t.jobs, vec![job]);
    assert_eq!(t.spares, vec![seal]);
    assert_eq!(t.contacts.len(), 1);

    let j = store.record(job).unwrap().as_job().unwrap();
    assert_eq!(j.types.as_slice(), &[pump]);
    assert_eq!(j.resources, vec![wrench]);

    // A manufacturer contact becomes a manufacturing company.
    let company = store.get(SheetKind::Company, "Acme").unwrap();
    assert!(company.as_company().unwrap().manufacturer);
}
