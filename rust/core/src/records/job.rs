// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Job (maintenance procedure) and Resource records.

use smallvec::SmallVec;

use crate::keys::RecordKey;

/// One step of a job, built from a same-file duplicate job row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobTask {
    /// Task number as written in the sheet.
    pub name: String,
    /// Parsed task number, `None` when the text is not an integer.
    pub number: Option<i64>,
    pub description: String,
    pub duration: String,
    pub duration_unit: String,
    pub prerequisites: Vec<String>,
}

/// Data stored for a job.
#[derive(Debug, Clone, Default)]
pub struct JobData {
    pub status: String,
    pub type_name: String,
    pub duration: String,
    pub duration_unit: String,
    pub start: String,
    pub task_start_unit: String,
    pub frequency: String,
    pub frequency_unit: String,
    pub task_number: String,
    pub priors: String,
    pub resource_names: Vec<String>,

    pub types: SmallVec<[RecordKey; 2]>,
    pub resources: Vec<RecordKey>,
    /// Additional tasks, ordered by task number.
    pub tasks: Vec<JobTask>,
}

impl JobData {
    /// Inserts a task keeping the list ordered by number.
    ///
    /// Tasks with an unparseable number go after every numbered task, in
    /// arrival order.
    pub fn insert_task(&mut self, task: JobTask) {
        let position = match task.number {
            Some(n) => self
                .tasks
                .iter()
                .position(|t| t.number.map_or(true, |m| m > n))
                .unwrap_or(self.tasks.len()),
            None => self.tasks.len(),
        };
        self.tasks.insert(position, task);
    }

    /// Finds a task by name (case-insensitive).
    pub fn find_task(&self, name: &str) -> Option<&JobTask> {
        let name = name.trim();
        self.tasks.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if `name` names this job's own task or one of its
    /// additional tasks.
    pub fn has_task(&self, name: &str) -> bool {
        self.task_number.eq_ignore_ascii_case(name.trim()) || self.find_task(name).is_some()
    }
}

/// Classification of a resource by its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Unknown,
    Labor,
    Material,
    Tools,
    Training,
}

impl ResourceType {
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "labor" => ResourceType::Labor,
            "material" => ResourceType::Material,
            "tools" => ResourceType::Tools,
            "training" => ResourceType::Training,
            _ => ResourceType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Unknown => "Unknown",
            ResourceType::Labor => "Labor",
            ResourceType::Material => "Material",
            ResourceType::Tools => "Tools",
            ResourceType::Training => "Training",
        }
    }
}

/// Data stored for a resource (labor, material, tool or training).
///
/// Everything a resource carries is in the common fields; its type comes
/// from the category.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    pub jobs: Vec<RecordKey>,
}
