// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component, Type, Spare, Assembly and System/Zone records.

use smallvec::SmallVec;

use crate::keys::RecordKey;
use crate::text::push_unique_name;

/// Data stored for a component (installed product instance).
#[derive(Debug, Clone, Default)]
pub struct ComponentData {
    pub type_name: String,
    /// Declared space, possibly a comma-separated list.
    pub space_names: String,
    pub serial_number: String,
    pub installation_date: String,
    pub warranty_start_date: String,
    pub tag_number: String,
    pub bar_code: String,
    pub asset_identifier: String,

    pub space: Option<RecordKey>,
    pub floor: Option<RecordKey>,
    pub type_ref: Option<RecordKey>,
    pub vendor: Option<RecordKey>,
}

impl ComponentData {
    /// First non-blank entry of the declared space list.
    pub fn first_space_name(&self) -> &str {
        self.space_names
            .split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Returns `true` when more than one space was declared.
    pub fn has_space_list(&self) -> bool {
        self.space_names.split(',').count() > 1
    }
}

/// Data stored for a type (product family).
#[derive(Debug, Clone, Default)]
pub struct TypeData {
    pub asset_type: String,
    pub manufacturer: String,
    pub model_number: String,
    pub warranty_guarantor_parts: String,
    pub warranty_duration_parts: String,
    pub warranty_guarantor_labor: String,
    pub warranty_duration_labor: String,
    pub warranty_duration_unit: String,
    pub warranty_description: String,
    pub replacement_cost: String,
    pub expected_life: String,
    pub duration_unit: String,
    pub nominal_length: String,
    pub nominal_width: String,
    pub nominal_height: String,
    pub model_reference: String,
    pub shape: String,
    pub size: String,
    pub color: String,
    pub finish: String,
    pub grade: String,
    pub material: String,
    pub constituents: String,
    pub features: String,
    pub accessibility_performance: String,
    pub code_performance: String,
    pub sustainability_performance: String,

    pub components: Vec<RecordKey>,
    pub spares: Vec<RecordKey>,
    pub jobs: Vec<RecordKey>,
    /// Manufacturer and warranty guarantor contacts.
    pub contacts: Vec<RecordKey>,
}

/// Data stored for a spare part.
#[derive(Debug, Clone, Default)]
pub struct SpareData {
    pub type_name: String,
    pub supplier_names: Vec<String>,
    pub set_number: String,
    pub part_number: String,

    pub type_ref: Option<RecordKey>,
    pub suppliers: Vec<RecordKey>,
}

/// Data stored for an assembly (parent/child composition on one sheet).
#[derive(Debug, Clone, Default)]
pub struct AssemblyData {
    pub sheet_name: String,
    pub parent_name: String,
    pub child_names: Vec<String>,
    pub assembly_type: String,

    pub parent_ref: Option<RecordKey>,
    pub children: SmallVec<[RecordKey; 4]>,
}

/// Member list of a System (components) or Zone (spaces).
#[derive(Debug, Clone, Default)]
pub struct GroupData {
    pub member_names: Vec<String>,

    pub members: Vec<RecordKey>,
}

impl GroupData {
    /// Adds member names not already present (case-insensitive).
    pub fn union_names(&mut self, names: &[String]) {
        for name in names {
            push_unique_name(&mut self.member_names, name);
        }
    }
}
