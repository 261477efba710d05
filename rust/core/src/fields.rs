// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static column-to-field bindings per sheet kind.
//!
//! Each [`FieldDef`] pairs a column header with a setter used by the loader
//! and a getter used by the exporter and the JSON snapshot. Headers are
//! matched ignoring case, spaces and underscores, so `Floor Name`,
//! `FLOOR_NAME` and `FloorName` all bind to the same field.

use rustc_hash::FxHashMap;

use crate::config::Flags;
use crate::guid::{process_guid, process_revit_unique_id};
use crate::keys::SheetKind;
use crate::records::Record;
use crate::text::{convert_currency, filter_na, split_list, strip_quotes};

pub type Setter = fn(&mut Record, &str);
pub type Getter = fn(&Record) -> String;

/// How a cell value is normalized before its setter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Subject to compressed-GUID conversion.
    Guid,
    /// Subject to compressed-GUID and Revit unique-id conversion.
    Identifier,
}

/// One column binding.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub column: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    /// `None` for computed columns that are only exported.
    pub set: Option<Setter>,
    pub get: Getter,
}

impl FieldDef {
    fn new(column: &'static str, set: Setter, get: Getter) -> Self {
        Self {
            column,
            aliases: &[],
            kind: FieldKind::Text,
            set: Some(set),
            get,
        }
    }

    fn read_only(column: &'static str, get: Getter) -> Self {
        Self {
            column,
            aliases: &[],
            kind: FieldKind::Text,
            set: None,
            get,
        }
    }

    fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Applies identifier conversions enabled by `flags` to a raw value.
    pub fn prepare(&self, value: &str, flags: Flags) -> String {
        let value = value.trim();
        match self.kind {
            FieldKind::Text => value.to_string(),
            FieldKind::Guid if flags.contains(Flags::CONVERT_GUID) => process_guid(value),
            FieldKind::Guid => value.to_string(),
            FieldKind::Identifier => {
                let value = if flags.contains(Flags::CONVERT_GUID) {
                    process_guid(value)
                } else {
                    value.to_string()
                };
                if flags.contains(Flags::CONVERT_UNIQUE_IDS) {
                    process_revit_unique_id(&value)
                } else {
                    value
                }
            }
        }
    }

    /// Runs the setter; read-only fields ignore the value.
    pub fn apply(&self, record: &mut Record, value: &str) {
        if let Some(set) = self.set {
            set(record, value);
        }
    }
}

macro_rules! common_fields {
    ($($column:literal $(| $alias:literal)* => $field:ident),* $(,)?) => {
        vec![$(
            FieldDef::new(
                $column,
                |r, v| r.$field = filter_na(v),
                |r| r.$field.clone(),
            )
            .with_aliases(&[$($alias),*])
        ),*]
    };
}

macro_rules! data_fields {
    ($get:ident, $get_mut:ident; $($column:literal $(| $alias:literal)* => $field:ident),* $(,)?) => {
        vec![$(
            FieldDef::new(
                $column,
                |r, v| {
                    if let Some(d) = r.$get_mut() {
                        d.$field = filter_na(v);
                    }
                },
                |r| r.$get().map(|d| d.$field.clone()).unwrap_or_default(),
            )
            .with_aliases(&[$($alias),*])
        ),*]
    };
}

fn name_field(column: &'static str) -> FieldDef {
    FieldDef::new(column, |r, v| r.name = filter_na(v), |r| r.name.clone())
}

fn leading_fields() -> Vec<FieldDef> {
    let mut fields = common_fields! {
        "CreatedBy" => created_by,
        "CreatedOn" => created_on,
    };
    fields.push(FieldDef::new(
        "Category",
        |r, v| r.set_category(v),
        |r| r.category.clone(),
    ));
    fields
}

fn trailing_fields() -> Vec<FieldDef> {
    let mut fields = common_fields! {
        "ExtSystem" | "ExternalSystem" => ext_system,
        "ExtObject" | "ExternalObject" => ext_object,
        "ExtIdentifier" | "ExternalIdentifier" => ext_identifier,
        "Description" => description,
    };
    fields[2].kind = FieldKind::Identifier;
    fields
}

fn area_fields() -> Vec<FieldDef> {
    data_fields! { areas, areas_mut;
        "GrossArea" => gross_area,
        "NetArea" => net_area,
        "Perimeter" => perimeter,
    }
}

fn member_names(column: &'static str) -> FieldDef {
    FieldDef::new(
        column,
        |r, v| {
            if let Some(g) = r.as_group_mut() {
                g.member_names = split_list(v);
            }
        },
        |r| r.as_group().map(|g| g.member_names.join(",")).unwrap_or_default(),
    )
}

fn facility_fields() -> Vec<FieldDef> {
    let mut fields = data_fields! { as_facility, as_facility_mut;
        "ProjectName" => project_name,
        "SiteName" => site_name,
        "LinearUnits" => linear_units,
        "AreaUnits" => area_units,
        "VolumeUnits" => volume_units,
        "AreaMeasurement" => area_measurement,
        "ExternalProjectObject" => ext_project_object,
        "ExternalSiteObject" => ext_site_object,
        "ExternalFacilityObject" => ext_facility_object,
        "ProjectDescription" => project_description,
        "SiteDescription" => site_description,
        "Phase" => phase,
    };
    fields.push(
        FieldDef::new(
            "CurrencyUnit",
            |r, v| {
                if let Some(f) = r.as_facility_mut() {
                    f.currency_unit = convert_currency(v);
                }
            },
            |r| r.as_facility().map(|f| f.currency_unit.clone()).unwrap_or_default(),
        )
        .with_aliases(&["CurrencyUnits"]),
    );
    let identifiers = data_fields! { as_facility, as_facility_mut;
        "ExternalProjectIdentifier" => ext_project_identifier,
        "ExternalSiteIdentifier" => ext_site_identifier,
        "ExternalFacilityIdentifier" => ext_facility_identifier,
    };
    fields.extend(identifiers.into_iter().map(|f| f.with_kind(FieldKind::Guid)));
    fields.extend(area_fields());
    fields
}

fn floor_fields() -> Vec<FieldDef> {
    let mut fields = data_fields! { as_floor, as_floor_mut;
        "Elevation" => elevation,
        "Height" => height,
        "FloorTag" => floor_tag,
    };
    fields.extend(area_fields());
    fields
}

fn space_fields() -> Vec<FieldDef> {
    let mut fields = data_fields! { as_space, as_space_mut;
        "FloorName" => floor_name,
        "UsableHeight" => usable_height,
    };
    fields.push(FieldDef::new(
        "RoomTag",
        |r, v| {
            let value = filter_na(v);
            let placeholder = value.eq_ignore_ascii_case("room tag") || value.eq_ignore_ascii_case("roomtag");
            if let Some(s) = r.as_space_mut() {
                if !placeholder {
                    s.room_tag = value;
                }
            }
        },
        |r| r.as_space().map(|s| s.room_tag.clone()).unwrap_or_default(),
    ));
    fields.extend(area_fields());
    fields
}

fn type_fields() -> Vec<FieldDef> {
    data_fields! { as_type, as_type_mut;
        "AssetType" => asset_type,
        "Manufacturer" => manufacturer,
        "ModelNumber" => model_number,
        "WarrantyGuarantorParts" => warranty_guarantor_parts,
        "WarrantyDurationParts" => warranty_duration_parts,
        "WarrantyGuarantorLabor" => warranty_guarantor_labor,
        "WarrantyDurationLabor" => warranty_duration_labor,
        "WarrantyDurationUnit" => warranty_duration_unit,
        "WarrantyDescription" => warranty_description,
        "ReplacementCost" => replacement_cost,
        "ExpectedLife" => expected_life,
        "DurationUnit" => duration_unit,
        "NominalLength" => nominal_length,
        "NominalWidth" => nominal_width,
        "NominalHeight" => nominal_height,
        "ModelReference" => model_reference,
        "Shape" => shape,
        "Size" => size,
        "Color" | "Colour" => color,
        "Finish" => finish,
        "Grade" => grade,
        "Material" => material,
        "Constituents" => constituents,
        "Features" => features,
        "AccessibilityPerformance" => accessibility_performance,
        "CodePerformance" => code_performance,
        "SustainabilityPerformance" => sustainability_performance,
    }
}

fn component_fields() -> Vec<FieldDef> {
    data_fields! { as_component, as_component_mut;
        "TypeName" => type_name,
        "Space" | "SpaceNames" => space_names,
        "SerialNumber" => serial_number,
        "InstallationDate" => installation_date,
        "WarrantyStartDate" => warranty_start_date,
        "TagNumber" => tag_number,
        "BarCode" => bar_code,
        "AssetIdentifier" => asset_identifier,
    }
}

fn contact_fields() -> Vec<FieldDef> {
    data_fields! { as_contact, as_contact_mut;
        "Company" => company,
        "Phone" => phone,
        "Department" => department,
        "OrganizationCode" => organization_code,
        "GivenName" => given_name,
        "FamilyName" => family_name,
        "Street" => street,
        "PostalBox" => postal_box,
        "Town" => town,
        "StateRegion" => state_region,
        "PostalCode" => postal_code,
        "Country" => country,
    }
}

fn company_fields() -> Vec<FieldDef> {
    data_fields! { as_company, as_company_mut;
        "Phone" => phone,
        "OrganizationCode" => organization_code,
        "Street" => street,
        "PostalBox" => postal_box,
        "Town" => town,
        "StateRegion" => state_region,
        "PostalCode" => postal_code,
        "Country" => country,
    }
}

fn job_fields() -> Vec<FieldDef> {
    let mut fields = vec![FieldDef::new(
        "TypeName",
        |r, v| {
            if let Some(j) = r.as_job_mut() {
                j.type_name = filter_na(strip_quotes(v.trim()));
            }
        },
        |r| r.as_job().map(|j| j.type_name.clone()).unwrap_or_default(),
    )];
    fields.extend(data_fields! { as_job, as_job_mut;
        "Status" => status,
        "Duration" => duration,
        "DurationUnit" => duration_unit,
        "Start" => start,
        "TaskStartUnit" => task_start_unit,
        "Frequency" => frequency,
        "FrequencyUnit" => frequency_unit,
        "TaskNumber" => task_number,
    });
    fields.push(FieldDef::new(
        "Priors",
        |r, v| {
            if let Some(j) = r.as_job_mut() {
                j.priors = filter_na(strip_quotes(v.trim()));
            }
        },
        |r| r.as_job().map(|j| j.priors.clone()).unwrap_or_default(),
    ));
    fields.push(FieldDef::new(
        "ResourceNames",
        |r, v| {
            if let Some(j) = r.as_job_mut() {
                j.resource_names = split_list(strip_quotes(v.trim()));
            }
        },
        |r| r.as_job().map(|j| j.resource_names.join(",")).unwrap_or_default(),
    ));
    fields
}

fn spare_fields() -> Vec<FieldDef> {
    let mut fields = data_fields! { as_spare, as_spare_mut;
        "TypeName" => type_name,
        "SetNumber" => set_number,
        "PartNumber" => part_number,
    };
    fields.push(FieldDef::new(
        "Suppliers",
        |r, v| {
            if let Some(s) = r.as_spare_mut() {
                s.supplier_names = split_list(v)
                    .iter()
                    .map(|name| filter_na(strip_quotes(name)))
                    .filter(|name| !name.is_empty())
                    .collect();
            }
        },
        |r| r.as_spare().map(|s| s.supplier_names.join(",")).unwrap_or_default(),
    ));
    fields
}

fn assembly_fields() -> Vec<FieldDef> {
    let mut fields = data_fields! { as_assembly, as_assembly_mut;
        "SheetName" => sheet_name,
        "ParentName" => parent_name,
        "AssemblyType" => assembly_type,
    };
    fields.push(FieldDef::new(
        "ChildNames",
        |r, v| {
            if let Some(a) = r.as_assembly_mut() {
                a.child_names = split_list(v);
            }
        },
        |r| r.as_assembly().map(|a| a.child_names.join(",")).unwrap_or_default(),
    ));
    fields
}

fn attribute_fields() -> Vec<FieldDef> {
    let mut fields = vec![FieldDef::new(
        "SheetName",
        |r, v| {
            if let Some(a) = r.as_attribute_mut() {
                a.sheet_name = filter_na(v).to_uppercase();
            }
        },
        |r| r.as_attribute().map(|a| a.sheet_name.clone()).unwrap_or_default(),
    )];
    fields.extend(data_fields! { as_attribute, as_attribute_mut;
        "RowName" => row_name,
        "Value" => value,
        "Unit" => unit,
        "AllowedValues" => allowed_values,
    });
    fields
}

fn attribute_type_fields() -> Vec<FieldDef> {
    let mut fields = vec![FieldDef::read_only("DataType", |r| {
        r.as_attribute_type()
            .map(|t| t.data_kind.as_str().to_string())
            .unwrap_or_default()
    })];
    fields.extend(data_fields! { as_attribute_type, as_attribute_type_mut;
        "Unit" => unit,
    });
    fields.push(FieldDef::read_only("AllowedValues", |r| {
        r.as_attribute_type()
            .and_then(|t| t.allowed.as_ref())
            .map(|values| values.iter().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_default()
    }));
    fields.push(FieldDef::read_only("Categories", |r| {
        r.as_attribute_type()
            .map(|t| t.categories.iter().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_default()
    }));
    fields.push(FieldDef::read_only("UsedWith", |r| {
        r.as_attribute_type()
            .map(|t| t.used_with.iter().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_default()
    }));
    fields
}

fn document_fields() -> Vec<FieldDef> {
    let mut fields = vec![FieldDef::new(
        "SheetName",
        |r, v| {
            if let Some(d) = r.as_document_mut() {
                d.sheet_name = filter_na(v).to_uppercase();
            }
        },
        |r| r.as_document().map(|d| d.sheet_name.clone()).unwrap_or_default(),
    )];
    fields.extend(data_fields! { as_document, as_document_mut;
        "RowName" => row_name,
        "ApprovalBy" => approval_by,
        "Stage" => stage,
        "Directory" => directory,
        "File" => file,
        "Reference" => reference,
    });
    fields
}

fn issue_fields() -> Vec<FieldDef> {
    data_fields! { as_issue, as_issue_mut;
        "Type" => issue_type,
        "Risk" => risk,
        "Chance" => chance,
        "Impact" => impact,
        "SheetName1" => sheet_name1,
        "RowName1" => row_name1,
        "SheetName2" => sheet_name2,
        "RowName2" => row_name2,
        "Owner" => owner,
        "Mitigation" => mitigation,
    }
}

fn fields_for(kind: SheetKind) -> Vec<FieldDef> {
    let mut fields = match kind {
        SheetKind::Contact => vec![name_field("Email")],
        _ => vec![name_field("Name")],
    };
    fields.extend(leading_fields());
    fields.extend(match kind {
        SheetKind::Facility => facility_fields(),
        SheetKind::Floor => floor_fields(),
        SheetKind::Space => space_fields(),
        SheetKind::Type => type_fields(),
        SheetKind::Component => component_fields(),
        SheetKind::Zone => vec![member_names("SpaceNames")],
        SheetKind::System => vec![member_names("ComponentNames")],
        SheetKind::Contact => contact_fields(),
        SheetKind::Company => company_fields(),
        SheetKind::Job => job_fields(),
        SheetKind::Resource => Vec::new(),
        SheetKind::Spare => spare_fields(),
        SheetKind::Assembly => assembly_fields(),
        SheetKind::Attribute => attribute_fields(),
        SheetKind::AttributeType => attribute_type_fields(),
        SheetKind::ValueList => vec![FieldDef::read_only("Values", |r| {
            r.as_value_list()
                .map(|l| l.values.iter().cloned().collect::<Vec<_>>().join(","))
                .unwrap_or_default()
        })],
        SheetKind::Document => document_fields(),
        SheetKind::Issue => issue_fields(),
    });
    fields.extend(trailing_fields());
    fields
}

/// Header normalization: upper-case with spaces and underscores removed.
pub fn column_key(column: &str) -> String {
    column
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Field bindings for every sheet kind, built once per parser.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: FxHashMap<SheetKind, Vec<FieldDef>>,
    index: FxHashMap<(SheetKind, String), usize>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        let mut fields = FxHashMap::default();
        let mut index = FxHashMap::default();
        for kind in SheetKind::ALL {
            let defs = fields_for(kind);
            for (i, def) in defs.iter().enumerate() {
                index.insert((kind, column_key(def.column)), i);
                for alias in def.aliases {
                    index.insert((kind, column_key(alias)), i);
                }
            }
            fields.insert(kind, defs);
        }
        Self { fields, index }
    }

    /// Returns the binding for a column header, or `None` if not found.
    pub fn lookup(&self, kind: SheetKind, column: &str) -> Option<&FieldDef> {
        let i = *self.index.get(&(kind, column_key(column)))?;
        self.fields.get(&kind).and_then(|defs| defs.get(i))
    }

    /// Bindings of a sheet kind in canonical column order.
    pub fn fields(&self, kind: SheetKind) -> &[FieldDef] {
        self.fields.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Canonical column headers of a sheet kind.
    pub fn columns(&self, kind: SheetKind) -> Vec<&'static str> {
        self.fields(kind).iter().map(|f| f.column).collect()
    }

    /// Reads a column's value from a record, or `None` when the column has
    /// no binding for the record's kind.
    pub fn value(&self, record: &Record, column: &str) -> Option<String> {
        self.lookup(record.kind(), column).map(|f| (f.get)(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_match_loosely() {
        let registry = FieldRegistry::new();
        for header in ["FloorName", "Floor Name", "FLOOR_NAME", " floorname "] {
            assert_eq!(
                registry.lookup(SheetKind::Space, header).map(|f| f.column),
                Some("FloorName")
            );
        }
        assert!(registry.lookup(SheetKind::Floor, "FloorName").is_none());
        assert_eq!(
            registry.lookup(SheetKind::Floor, "ExternalIdentifier").map(|f| f.column),
            Some("ExtIdentifier")
        );
    }

    #[test]
    fn setters_trim_and_drop_na() {
        let registry = FieldRegistry::new();
        let mut floor = Record::new(SheetKind::Floor);
        registry.lookup(SheetKind::Floor, "Name").unwrap().apply(&mut floor, " L1 ");
        registry
            .lookup(SheetKind::Floor, "Elevation")
            .unwrap()
            .apply(&mut floor, "n/a");
        registry
            .lookup(SheetKind::Floor, "GrossArea")
            .unwrap()
            .apply(&mut floor, "120");
        assert_eq!(floor.name, "L1");
        assert_eq!(floor.as_floor().unwrap().elevation, "");
        assert_eq!(registry.value(&floor, "Gross Area").as_deref(), Some("120"));
    }

    #[test]
    fn contact_email_is_the_name() {
        let registry = FieldRegistry::new();
        let mut contact = Record::new(SheetKind::Contact);
        registry
            .lookup(SheetKind::Contact, "Email")
            .unwrap()
            .apply(&mut contact, "a@b.com");
        assert_eq!(contact.key(), "a@b.com");
        assert!(registry.lookup(SheetKind::Contact, "Name").is_none());
    }

    #[test]
    fn special_setters() {
        let registry = FieldRegistry::new();

        let mut job = Record::new(SheetKind::Job);
        registry.lookup(SheetKind::Job, "TypeName").unwrap().apply(&mut job, "\"Pump\"");
        registry
            .lookup(SheetKind::Job, "ResourceNames")
            .unwrap()
            .apply(&mut job, "Wrench, Ladder,");
        let j = job.as_job().unwrap();
        assert_eq!(j.type_name, "Pump");
        assert_eq!(j.resource_names, vec!["Wrench", "Ladder"]);

        let mut space = Record::new(SheetKind::Space);
        registry.lookup(SheetKind::Space, "RoomTag").unwrap().apply(&mut space, "ROOM TAG");
        assert_eq!(space.as_space().unwrap().room_tag, "");

        let mut facility = Record::new(SheetKind::Facility);
        registry
            .lookup(SheetKind::Facility, "CurrencyUnits")
            .unwrap()
            .apply(&mut facility, "Dollars");
        assert_eq!(facility.as_facility().unwrap().currency_unit, "USD");

        let mut attr = Record::new(SheetKind::Attribute);
        registry.lookup(SheetKind::Attribute, "SheetName").unwrap().apply(&mut attr, "Space");
        assert_eq!(attr.as_attribute().unwrap().sheet_name, "SPACE");

        let mut system = Record::new(SheetKind::System);
        registry
            .lookup(SheetKind::System, "ComponentNames")
            .unwrap()
            .apply(&mut system, "AHU-1, AHU-2");
        assert_eq!(system.as_group().unwrap().member_names.len(), 2);
    }

    #[test]
    fn identifiers_are_converted_by_flag() {
        let registry = FieldRegistry::new();
        let ext = registry.lookup(SheetKind::Space, "ExtIdentifier").unwrap();
        assert_eq!(ext.kind, FieldKind::Identifier);
        let token = "3$$$$$$$$$$$$$$$$$$$$$";
        assert_eq!(
            ext.prepare(token, Flags::CONVERT_GUID),
            "ffffffff-ffff-ffff-ffff-ffffffffffff"
        );
        assert_eq!(ext.prepare(token, Flags::NONE), token);

        let name = registry.lookup(SheetKind::Space, "Name").unwrap();
        assert_eq!(name.prepare(token, Flags::CONVERT_GUID), token);
    }

    #[test]
    fn computed_columns_are_read_only() {
        let registry = FieldRegistry::new();
        let data_type = registry.lookup(SheetKind::AttributeType, "DataType").unwrap();
        assert!(data_type.set.is_none());
        assert!(registry.columns(SheetKind::ValueList).contains(&"Values"));
    }
}
