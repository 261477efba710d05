// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier issuance for admitted records.

use rustc_hash::FxHashMap;

use crate::keys::SheetKind;

/// Issues identifiers unique within a sheet kind for one parse run.
pub trait IdFactory {
    fn unique_id(&mut self, kind: SheetKind) -> String;
}

/// Per-sheet counters producing ids such as `SPACE-12`.
#[derive(Debug, Default, Clone)]
pub struct SequentialIdFactory {
    counters: FxHashMap<SheetKind, u64>,
}

impl SequentialIdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers issued so far for a sheet kind.
    pub fn issued(&self, kind: SheetKind) -> u64 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }
}

impl IdFactory for SequentialIdFactory {
    fn unique_id(&mut self, kind: SheetKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{}-{}", kind.as_str().replace(' ', "_"), counter)
    }
}
