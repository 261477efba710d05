// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facility, Floor and Space records.

use crate::keys::RecordKey;

use super::fill;

/// Area measures shared by the spatial kinds.
#[derive(Debug, Clone, Default)]
pub struct Areas {
    pub gross_area: String,
    pub net_area: String,
    pub perimeter: String,
}

/// Data stored for the facility (singleton).
#[derive(Debug, Clone, Default)]
pub struct FacilityData {
    pub project_name: String,
    pub site_name: String,
    pub linear_units: String,
    pub area_units: String,
    pub volume_units: String,
    pub currency_unit: String,
    pub area_measurement: String,
    pub ext_project_object: String,
    pub ext_project_identifier: String,
    pub ext_site_object: String,
    pub ext_site_identifier: String,
    pub ext_facility_object: String,
    pub ext_facility_identifier: String,
    pub project_description: String,
    pub site_description: String,
    pub phase: String,
    pub areas: Areas,

    pub floors: Vec<RecordKey>,
}

impl FacilityData {
    /// Fills every empty field from another facility row.
    pub fn backfill_from(&mut self, other: &FacilityData) {
        fill(&mut self.project_name, &other.project_name);
        fill(&mut self.site_name, &other.site_name);
        fill(&mut self.linear_units, &other.linear_units);
        fill(&mut self.area_units, &other.area_units);
        fill(&mut self.volume_units, &other.volume_units);
        fill(&mut self.currency_unit, &other.currency_unit);
        fill(&mut self.area_measurement, &other.area_measurement);
        fill(&mut self.ext_project_object, &other.ext_project_object);
        fill(&mut self.ext_project_identifier, &other.ext_project_identifier);
        fill(&mut self.ext_site_object, &other.ext_site_object);
        fill(&mut self.ext_site_identifier, &other.ext_site_identifier);
        fill(&mut self.ext_facility_object, &other.ext_facility_object);
        fill(&mut self.ext_facility_identifier, &other.ext_facility_identifier);
        fill(&mut self.project_description, &other.project_description);
        fill(&mut self.site_description, &other.site_description);
        fill(&mut self.phase, &other.phase);
        fill(&mut self.areas.gross_area, &other.areas.gross_area);
        fill(&mut self.areas.net_area, &other.areas.net_area);
        fill(&mut self.areas.perimeter, &other.areas.perimeter);
    }
}

/// Data stored for a floor (level).
#[derive(Debug, Clone, Default)]
pub struct FloorData {
    pub elevation: String,
    pub height: String,
    pub floor_tag: String,
    pub areas: Areas,

    pub spaces: Vec<RecordKey>,
    pub components: Vec<RecordKey>,
}

/// Data stored for a space (room).
#[derive(Debug, Clone, Default)]
pub struct SpaceData {
    pub floor_name: String,
    pub room_tag: String,
    pub usable_height: String,
    pub areas: Areas,

    pub floor: Option<RecordKey>,
    pub components: Vec<RecordKey>,
}
