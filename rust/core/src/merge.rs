// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate reconciliation: what happens when a loaded record's key is
//! already on its page.
//!
//! | kind        | other source file        | same source file             |
//! |-------------|--------------------------|------------------------------|
//! | Facility    | backfill, discard        | backfill, discard            |
//! | Job         | insert (index upserted)  | becomes a task of the job    |
//! | System/Zone | insert (index upserted)  | member names unioned         |
//! | others      | backfill, discard        | `vdt_dup`, discard           |

use crate::diagnostics::{Category, MessageLogger};
use crate::keys::SheetKind;
use crate::params;
use crate::records::{JobData, JobTask, Record};
use crate::text::{push_unique_name, split_list};

/// Result of reconciling a newcomer with the record already on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The newcomer is admitted as a record of its own.
    Insert,
    /// The newcomer was folded into the existing record.
    Merged,
    /// The newcomer repeats a row of the same source and is dropped.
    Duplicate,
}

/// Reconciles `newcomer` against `existing`, mutating `existing` when the
/// two merge.
pub fn reconcile<L: MessageLogger>(
    existing: &mut Record,
    newcomer: &Record,
    log: &mut L,
) -> Reconciled {
    let same_file = existing.source_file == newcomer.source_file;

    match existing.kind() {
        SheetKind::Facility => {
            if let (Some(kept), Some(other)) = (existing.as_facility_mut(), newcomer.as_facility()) {
                kept.backfill_from(other);
            }
            existing.backfill_from(newcomer);
            if existing.name.is_empty() {
                existing.name = newcomer.name.clone();
            }
            Reconciled::Merged
        }
        SheetKind::Job | SheetKind::System | SheetKind::Zone if !same_file => Reconciled::Insert,
        SheetKind::Job => {
            if let (Some(job), Some(other)) = (existing.as_job_mut(), newcomer.as_job()) {
                add_task(job, newcomer, other, log);
            }
            Reconciled::Merged
        }
        SheetKind::System | SheetKind::Zone => {
            if let (Some(group), Some(other)) = (existing.as_group_mut(), newcomer.as_group()) {
                group.union_names(&other.member_names);
            }
            Reconciled::Merged
        }
        _ if !same_file => {
            existing.backfill_from(newcomer);
            Reconciled::Merged
        }
        _ => {
            log.data_integrity(
                Category::Duplicate,
                params![existing.kind(), newcomer.key()],
            );
            Reconciled::Duplicate
        }
    }
}

/// Folds a same-file job row into its owner as an additional task.
fn add_task<L: MessageLogger>(job: &mut JobData, row: &Record, other: &JobData, log: &mut L) {
    let number = lexical_core::parse::<i64>(other.task_number.trim().as_bytes()).ok();
    if number.is_none() {
        log.data_integrity(Category::TaskNumber, params![row.name, other.task_number]);
    }
    job.insert_task(JobTask {
        name: other.task_number.clone(),
        number,
        description: row.description.clone(),
        duration: other.duration.clone(),
        duration_unit: other.duration_unit.clone(),
        prerequisites: split_list(&other.priors),
    });
    for name in &other.resource_names {
        push_unique_name(&mut job.resource_names, name);
    }
}
