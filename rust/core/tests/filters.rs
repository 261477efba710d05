// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row filters configured through TOML options.

use cobie_lite_core::{Category, CobieParser, MemorySource, ParseOptions, SheetKind};

fn site() -> MemorySource {
    MemorySource::new("site.xlsx")
        .with_sheet(SheetKind::Floor, &["Name"], &[&["L1"], &["L2"]])
        .with_sheet(
            SheetKind::Space,
            &["Name", "FloorName"],
            &[&["S1", "L1"], &["S2", "L1"], &["S3", "L2"]],
        )
        .with_sheet(
            SheetKind::Component,
            &["Name", "Space"],
            &[&["C1", "S1"], &["C2", "S2"], &["C3", "S3"]],
        )
        .with_sheet(SheetKind::Zone, &["Name", "SpaceNames"], &[&["All", "S1,S2,S3"]])
}

fn parse(config: &str) -> CobieParser {
    let options = ParseOptions::from_toml(config).unwrap();
    let mut parser = CobieParser::new(options).unwrap();
    parser.load(&site());
    parser.resolve();
    parser
}

#[test]
fn excluded_space_takes_its_components() {
    let parser = parse(
        r#"
        [[filters]]
        polarity = "exclude"
        entries = [{ sheet = "Space", pattern = "S2" }]
        "#,
    );
    let store = parser.store();
    assert!(store.find(SheetKind::Space, "S2").is_none());
    assert!(store.find(SheetKind::Component, "C2").is_none());
    assert!(store.find(SheetKind::Component, "C1").is_some());

    // The zone keeps its other members and says nothing about S2.
    let zone = store.get(SheetKind::Zone, "All").unwrap();
    assert_eq!(zone.as_group().unwrap().members.len(), 2);
    assert_eq!(parser.diagnostics().count(Category::UnresolvedRef), 0);
}

#[test]
fn excluded_floor_takes_spaces_and_components() {
    let parser = parse(
        r#"
        [[filters]]
        polarity = "exclude"
        entries = [{ sheet = "Floor", pattern = "L2" }]
        "#,
    );
    let store = parser.store();
    assert!(store.find(SheetKind::Floor, "L2").is_none());
    assert!(store.find(SheetKind::Space, "S3").is_none());
    assert!(store.find(SheetKind::Component, "C3").is_none());
    assert_eq!(store.page(SheetKind::Component).unwrap().len(), 2);
}

#[test]
fn include_filter_keeps_matches_only() {
    let parser = parse(
        r#"
        [[filters]]
        polarity = "include"
        entries = [{ sheet = "Component", pattern = "C[12]", match = "regexp" }]
        "#,
    );
    let components = parser.store().page(SheetKind::Component).unwrap();
    assert_eq!(components.len(), 2);
    assert!(parser.store().find(SheetKind::Component, "C3").is_none());
    // Sheets the include filter does not mention are untouched.
    assert_eq!(parser.store().page(SheetKind::Space).unwrap().len(), 3);
}
