// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Company extraction from resolved contacts.

use crate::config::Flags;
use crate::ids::IdFactory;
use crate::keys::{RecordKey, SheetKind};
use crate::records::{add_ref, CompanyData, Record};
use crate::store::RecordStore;

/// Creates or joins a `COMPANY` record for every contact naming a company.
///
/// Only contacts referenced by a type, spare or component take part unless
/// [`Flags::ALL_CONTACTS_ARE_COMPANIES`] is set. A company is a manufacturer
/// as soon as one of its contacts is. Returns the number of companies
/// created.
pub(crate) fn extract_companies(store: &mut RecordStore, flags: Flags, ids: &mut dyn IdFactory) -> usize {
    let all = flags.contains(Flags::ALL_CONTACTS_ARE_COMPANIES);
    let contacts: Vec<(RecordKey, String)> = store
        .records_of(SheetKind::Contact)
        .filter_map(|(key, r)| {
            let c = r.as_contact()?;
            (!c.company.is_empty() && (all || c.type_contact)).then(|| (key, c.company.clone()))
        })
        .collect();

    let mut created = 0;
    for (contact_key, company_name) in contacts {
        let Some(contact) = store
            .record(contact_key)
            .and_then(Record::as_contact)
            .cloned()
        else {
            continue;
        };

        let company_key = match store.find(SheetKind::Company, &company_name) {
            Some(existing) => existing,
            None => {
                let mut record = Record::named(SheetKind::Company, &company_name);
                record.unique_id = ids.unique_id(SheetKind::Company);
                if let Some(c) = record.as_company_mut() {
                    *c = CompanyData::from_contact(&contact);
                }
                created += 1;
                store.insert(record)
            }
        };

        if let Some(company) = store.record_mut(company_key).and_then(Record::as_company_mut) {
            add_ref(&mut company.contacts, contact_key);
            company.manufacturer |= contact.manufacturer;
        }
        if let Some(c) = store.record_mut(contact_key).and_then(Record::as_contact_mut) {
            c.company_ref = Some(company_key);
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdFactory;

    fn contact(store: &mut RecordStore, email: &str, company: &str, type_contact: bool, manufacturer: bool) -> RecordKey {
        let mut r = Record::named(SheetKind::Contact, email);
        {
            let c = r.as_contact_mut().unwrap();
            c.company = company.into();
            c.type_contact = type_contact;
            c.manufacturer = manufacturer;
            c.town = "Springfield".into();
        }
        store.insert(r)
    }

    #[test]
    fn type_contacts_form_companies() {
        let mut store = RecordStore::new();
        let mut ids = SequentialIdFactory::new();
        let a = contact(&mut store, "a@acme.com", "Acme", true, false);
        let b = contact(&mut store, "b@acme.com", "ACME", true, true);
        contact(&mut store, "c@other.com", "Other", false, false);
        contact(&mut store, "d@nowhere.com", "", true, false);

        assert_eq!(extract_companies(&mut store, Flags::NONE, &mut ids), 1);
        let company = store.find(SheetKind::Company, "acme").unwrap();
        let record = store.record(company).unwrap();
        assert_eq!(record.name, "Acme");
        assert_eq!(record.unique_id, "COMPANY-1");
        let data = record.as_company().unwrap();
        assert_eq!(data.contacts, vec![a, b]);
        assert!(data.manufacturer);
        assert_eq!(data.town, "Springfield");
        assert_eq!(store.record(a).unwrap().as_contact().unwrap().company_ref, Some(company));

        // Rerunning joins the same company again.
        assert_eq!(extract_companies(&mut store, Flags::NONE, &mut ids), 0);
        assert_eq!(store.record(company).unwrap().as_company().unwrap().contacts.len(), 2);
    }

    #[test]
    fn all_contacts_flag_includes_everyone_with_a_company() {
        let mut store = RecordStore::new();
        let mut ids = SequentialIdFactory::new();
        contact(&mut store, "a@acme.com", "Acme", false, false);
        contact(&mut store, "c@other.com", "Other", false, false);

        let created = extract_companies(&mut store, Flags::ALL_CONTACTS_ARE_COMPANIES, &mut ids);
        assert_eq!(created, 2);
        assert_eq!(store.page(SheetKind::Company).unwrap().len(), 2);
    }
}
