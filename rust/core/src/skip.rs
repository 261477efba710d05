// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row admission rules: which freshly loaded records are discarded.

use rustc_hash::FxHashSet;

use crate::config::Flags;
use crate::filter::FilterChain;
use crate::keys::SheetKind;
use crate::records::{Record, RecordData};
use crate::text::{filter_na, normalize_key};

/// Decides whether a loaded record is dropped before it reaches its page.
///
/// Spaces that are dropped are remembered in `skipped_spaces` (by
/// normalized name) so that the components inside them go too; spaces are
/// loaded before components, which makes this work in a single pass.
pub fn should_skip(
    record: &Record,
    filters: &FilterChain,
    flags: Flags,
    skipped_spaces: &mut FxHashSet<String>,
) -> bool {
    let base = |r: &Record| filters.is_filtered(r.kind().as_str(), &r.name);

    match &record.data {
        RecordData::Space(space) => {
            let skip = filters.is_filtered(SheetKind::Floor.as_str(), &space.floor_name)
                || base(record);
            if skip {
                skipped_spaces.insert(normalize_key(&record.name));
            }
            skip
        }
        RecordData::Component(component) => {
            let space = component.first_space_name();
            if skipped_spaces.contains(&normalize_key(space)) {
                return true;
            }
            // A component without a space has no floor either.
            if space.is_empty() && filters.is_filtered(SheetKind::Floor.as_str(), "") {
                return true;
            }
            filters.is_filtered(SheetKind::Space.as_str(), space)
                || filters.is_filtered(SheetKind::Type.as_str(), &component.type_name)
                || base(record)
        }
        RecordData::Job(job) => {
            filters.is_filtered(SheetKind::Type.as_str(), &job.type_name) || base(record)
        }
        RecordData::Spare(spare) => {
            filters.is_filtered(SheetKind::Type.as_str(), &spare.type_name) || base(record)
        }
        RecordData::Assembly(assembly) => {
            filters.is_filtered(&assembly.sheet_name, &assembly.parent_name) || base(record)
        }
        RecordData::Attribute(attr) => {
            let value = filter_na(&attr.value);
            if flags.contains(Flags::SKIP_ON_NULL) && value.is_empty() {
                return true;
            }
            if flags.contains(Flags::SKIP_ON_NO_VALUE) && !value.is_empty() && value == record.name {
                return true;
            }
            filters.is_filtered(&attr.sheet_name, &attr.row_name) || base(record)
        }
        RecordData::Document(doc) => {
            if base(record) || filters.is_filtered(&doc.sheet_name, &doc.row_name) {
                return true;
            }
            flags.contains(Flags::SKIP_ON_NULL)
                && flags.contains(Flags::SKIP_ON_NO_VALUE)
                && doc.file.is_empty()
                && doc.reference.is_empty()
        }
        _ => base(record),
    }
}
