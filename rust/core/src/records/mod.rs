// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed records.
//!
//! A [`Record`] carries the fields every sheet shares plus a [`RecordData`]
//! variant with the kind-specific fields. Reference slots (`Option<RecordKey>`
//! and key lists) are empty after loading and are filled only by the
//! resolver.

mod asset;
mod attribute;
mod contact;
mod document;
mod job;
mod spatial;

pub use asset::{AssemblyData, ComponentData, GroupData, SpareData, TypeData};
pub use attribute::{AttributeData, AttributeTypeData, DataKind, ValueListData};
pub use contact::{CompanyData, ContactData};
pub use document::{DocumentData, IssueData};
pub use job::{JobData, JobTask, ResourceData, ResourceType};
pub use spatial::{Areas, FacilityData, FloorData, SpaceData};

use rustc_hash::FxHashMap;

use crate::keys::{RecordKey, SheetKind};
use crate::text::{filter_na, normalize_key};

/// Kind-specific part of a record.
#[derive(Debug, Clone)]
pub enum RecordData {
    Facility(FacilityData),
    Floor(FloorData),
    Space(SpaceData),
    Type(TypeData),
    Component(ComponentData),
    Zone(GroupData),
    System(GroupData),
    Contact(ContactData),
    Company(CompanyData),
    Job(JobData),
    Resource(ResourceData),
    Spare(SpareData),
    Assembly(AssemblyData),
    Attribute(AttributeData),
    AttributeType(AttributeTypeData),
    ValueList(ValueListData),
    Document(DocumentData),
    Issue(IssueData),
}

impl RecordData {
    /// Creates empty data for a sheet kind.
    pub fn new(kind: SheetKind) -> Self {
        match kind {
            SheetKind::Facility => RecordData::Facility(FacilityData::default()),
            SheetKind::Floor => RecordData::Floor(FloorData::default()),
            SheetKind::Space => RecordData::Space(SpaceData::default()),
            SheetKind::Type => RecordData::Type(TypeData::default()),
            SheetKind::Component => RecordData::Component(ComponentData::default()),
            SheetKind::Zone => RecordData::Zone(GroupData::default()),
            SheetKind::System => RecordData::System(GroupData::default()),
            SheetKind::Contact => RecordData::Contact(ContactData::default()),
            SheetKind::Company => RecordData::Company(CompanyData::default()),
            SheetKind::Job => RecordData::Job(JobData::default()),
            SheetKind::Resource => RecordData::Resource(ResourceData::default()),
            SheetKind::Spare => RecordData::Spare(SpareData::default()),
            SheetKind::Assembly => RecordData::Assembly(AssemblyData::default()),
            SheetKind::Attribute => RecordData::Attribute(AttributeData::default()),
            SheetKind::AttributeType => RecordData::AttributeType(AttributeTypeData::default()),
            SheetKind::ValueList => RecordData::ValueList(ValueListData::default()),
            SheetKind::Document => RecordData::Document(DocumentData::default()),
            SheetKind::Issue => RecordData::Issue(IssueData::default()),
        }
    }

    /// Returns the sheet kind of this variant.
    pub fn kind(&self) -> SheetKind {
        match self {
            RecordData::Facility(_) => SheetKind::Facility,
            RecordData::Floor(_) => SheetKind::Floor,
            RecordData::Space(_) => SheetKind::Space,
            RecordData::Type(_) => SheetKind::Type,
            RecordData::Component(_) => SheetKind::Component,
            RecordData::Zone(_) => SheetKind::Zone,
            RecordData::System(_) => SheetKind::System,
            RecordData::Contact(_) => SheetKind::Contact,
            RecordData::Company(_) => SheetKind::Company,
            RecordData::Job(_) => SheetKind::Job,
            RecordData::Resource(_) => SheetKind::Resource,
            RecordData::Spare(_) => SheetKind::Spare,
            RecordData::Assembly(_) => SheetKind::Assembly,
            RecordData::Attribute(_) => SheetKind::Attribute,
            RecordData::AttributeType(_) => SheetKind::AttributeType,
            RecordData::ValueList(_) => SheetKind::ValueList,
            RecordData::Document(_) => SheetKind::Document,
            RecordData::Issue(_) => SheetKind::Issue,
        }
    }
}

/// One parsed row.
#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub description: String,
    pub category: String,
    pub created_by: String,
    pub created_on: String,
    pub ext_system: String,
    pub ext_object: String,
    pub ext_identifier: String,
    /// Identifier issued by the [`crate::ids::IdFactory`] on admission.
    pub unique_id: String,
    /// Source the row was read from; drives duplicate reconciliation.
    pub source_file: String,

    pub facility: Option<RecordKey>,
    pub parent: Option<RecordKey>,
    pub creating_contact: Option<RecordKey>,
    /// Bound attributes, keyed by upper-cased attribute name.
    pub attributes: FxHashMap<String, RecordKey>,
    pub documents: Vec<RecordKey>,

    pub data: RecordData,
}

impl Record {
    /// Creates an empty record of the given kind.
    pub fn new(kind: SheetKind) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            created_by: String::new(),
            created_on: String::new(),
            ext_system: String::new(),
            ext_object: String::new(),
            ext_identifier: String::new(),
            unique_id: String::new(),
            source_file: String::new(),
            facility: None,
            parent: None,
            creating_contact: None,
            attributes: FxHashMap::default(),
            documents: Vec::new(),
            data: RecordData::new(kind),
        }
    }

    /// Creates a named record of the given kind.
    pub fn named(kind: SheetKind, name: &str) -> Self {
        let mut record = Self::new(kind);
        record.name = filter_na(name);
        record
    }

    #[inline]
    pub fn kind(&self) -> SheetKind {
        self.data.kind()
    }

    /// Name used in messages and lookups.
    ///
    /// The Facility is a singleton and falls back to its sheet name.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() && self.kind() == SheetKind::Facility {
            SheetKind::Facility.as_str()
        } else {
            &self.name
        }
    }

    /// Page key of this record.
    ///
    /// Attributes and documents are scoped by the row they describe, the
    /// Facility falls back to its sheet name, and everything else uses its
    /// name (or its unique id when unnamed). Page lookups upper-case keys.
    pub fn key(&self) -> String {
        match &self.data {
            RecordData::Attribute(a) => format!("{}:{}:{}", a.sheet_name, a.row_name, self.name),
            RecordData::Document(d) => format!("{}:{}:{}", d.sheet_name, d.row_name, self.name),
            RecordData::Facility(_) => self.display_name().to_string(),
            _ if self.name.is_empty() => self.unique_id.clone(),
            _ => self.name.clone(),
        }
    }

    /// Sets the category unless the value merely repeats the name or the
    /// column header.
    pub fn set_category(&mut self, value: &str) {
        let value = filter_na(value);
        if value.eq_ignore_ascii_case("category") || (!self.name.is_empty() && value == self.name) {
            return;
        }
        self.category = value;
    }

    /// Fills empty common fields from a later duplicate of this record.
    pub fn backfill_from(&mut self, other: &Record) {
        fill(&mut self.category, &other.category);
        fill(&mut self.created_by, &other.created_by);
        fill(&mut self.created_on, &other.created_on);
        fill(&mut self.description, &other.description);
        fill(&mut self.ext_identifier, &other.ext_identifier);
        fill(&mut self.ext_object, &other.ext_object);
        fill(&mut self.ext_system, &other.ext_system);
    }

    // --- Attribute operations ---

    /// Returns the bound attribute with the given name (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<RecordKey> {
        self.attributes.get(&normalize_key(name)).copied()
    }

    /// Binds an attribute under its name, replacing any previous binding.
    pub fn add_attribute(&mut self, name: &str, key: RecordKey) {
        self.attributes.insert(normalize_key(name), key);
    }

    /// Detaches an attribute from this record.
    pub fn remove_attribute(&mut self, name: &str) -> Option<RecordKey> {
        self.attributes.remove(&normalize_key(name))
    }

    pub fn add_document(&mut self, key: RecordKey) {
        add_ref(&mut self.documents, key);
    }

    /// Area fields of Facility, Floor and Space records.
    pub fn areas(&self) -> Option<&Areas> {
        match &self.data {
            RecordData::Facility(d) => Some(&d.areas),
            RecordData::Floor(d) => Some(&d.areas),
            RecordData::Space(d) => Some(&d.areas),
            _ => None,
        }
    }

    pub fn areas_mut(&mut self) -> Option<&mut Areas> {
        match &mut self.data {
            RecordData::Facility(d) => Some(&mut d.areas),
            RecordData::Floor(d) => Some(&mut d.areas),
            RecordData::Space(d) => Some(&mut d.areas),
            _ => None,
        }
    }

    /// Member data of System and Zone records.
    pub fn as_group(&self) -> Option<&GroupData> {
        match &self.data {
            RecordData::Zone(d) | RecordData::System(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupData> {
        match &mut self.data {
            RecordData::Zone(d) | RecordData::System(d) => Some(d),
            _ => None,
        }
    }
}

macro_rules! variant_accessors {
    ($($variant:ident => $data:ty, $as_ref:ident, $as_mut:ident;)*) => {
        impl Record {
            $(
                pub fn $as_ref(&self) -> Option<&$data> {
                    match &self.data {
                        RecordData::$variant(d) => Some(d),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $data> {
                    match &mut self.data {
                        RecordData::$variant(d) => Some(d),
                        _ => None,
                    }
                }
            )*
        }
    };
}

variant_accessors! {
    Facility => FacilityData, as_facility, as_facility_mut;
    Floor => FloorData, as_floor, as_floor_mut;
    Space => SpaceData, as_space, as_space_mut;
    Type => TypeData, as_type, as_type_mut;
    Component => ComponentData, as_component, as_component_mut;
    Contact => ContactData, as_contact, as_contact_mut;
    Company => CompanyData, as_company, as_company_mut;
    Job => JobData, as_job, as_job_mut;
    Resource => ResourceData, as_resource, as_resource_mut;
    Spare => SpareData, as_spare, as_spare_mut;
    Assembly => AssemblyData, as_assembly, as_assembly_mut;
    Attribute => AttributeData, as_attribute, as_attribute_mut;
    AttributeType => AttributeTypeData, as_attribute_type, as_attribute_type_mut;
    ValueList => ValueListData, as_value_list, as_value_list_mut;
    Document => DocumentData, as_document, as_document_mut;
    Issue => IssueData, as_issue, as_issue_mut;
}

/// Copies `value` into `slot` when the slot is empty.
#[inline]
pub(crate) fn fill(slot: &mut String, value: &str) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
    }
}

/// Appends `key` unless the list already holds it.
///
/// Back-reference lists go through this so that resolving twice leaves
/// them unchanged.
#[inline]
pub(crate) fn add_ref(list: &mut Vec<RecordKey>, key: RecordKey) {
    if !list.contains(&key) {
        list.push(key);
    }
}
