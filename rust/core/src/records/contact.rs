// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contact and Company records.
//!
//! Contacts are keyed by e-mail address (stored as the record name).
//! Companies are never read from a sheet; they are extracted from contacts
//! once resolution has marked which contacts act for a product type.

use crate::keys::RecordKey;

/// Data stored for a contact (person or organisation, keyed by e-mail).
#[derive(Debug, Clone, Default)]
pub struct ContactData {
    pub company: String,
    pub phone: String,
    pub department: String,
    pub organization_code: String,
    pub given_name: String,
    pub family_name: String,
    pub street: String,
    pub postal_box: String,
    pub town: String,
    pub state_region: String,
    pub postal_code: String,
    pub country: String,

    /// Referenced by some record's CreatedBy.
    pub admin_contact: bool,
    /// Referenced as a manufacturer, guarantor, supplier or vendor.
    pub type_contact: bool,
    pub manufacturer: bool,
    pub company_ref: Option<RecordKey>,
}

impl ContactData {
    /// Returns `true` when enough of the address is present to mail to.
    pub fn is_address_valid(&self) -> bool {
        !self.street.is_empty()
            && !self.town.is_empty()
            && (!self.postal_code.is_empty() || !self.postal_box.is_empty())
    }

    /// Person name if known, otherwise the company name.
    pub fn display_name(&self) -> String {
        match (self.given_name.is_empty(), self.family_name.is_empty()) {
            (false, false) => format!("{} {}", self.given_name, self.family_name),
            (false, true) => self.given_name.clone(),
            (true, false) => self.family_name.clone(),
            (true, true) => self.company.clone(),
        }
    }
}

/// Data stored for a company extracted from contacts.
#[derive(Debug, Clone, Default)]
pub struct CompanyData {
    pub phone: String,
    pub organization_code: String,
    pub street: String,
    pub postal_box: String,
    pub town: String,
    pub state_region: String,
    pub postal_code: String,
    pub country: String,
    /// Sticky: once any linked contact is a manufacturer, so is the company.
    pub manufacturer: bool,

    pub contacts: Vec<RecordKey>,
}

impl CompanyData {
    /// Builds company data from the contact that first names it.
    pub fn from_contact(contact: &ContactData) -> Self {
        Self {
            phone: contact.phone.clone(),
            organization_code: contact.organization_code.clone(),
            street: contact.street.clone(),
            postal_box: contact.postal_box.clone(),
            town: contact.town.clone(),
            state_region: contact.state_region.clone(),
            postal_code: contact.postal_code.clone(),
            country: contact.country.clone(),
            manufacturer: contact.manufacturer,
            contacts: Vec::new(),
        }
    }
}
