// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document and Issue records.

use crate::keys::RecordKey;

/// Data stored for a document attached to another record.
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    pub sheet_name: String,
    pub row_name: String,
    pub approval_by: String,
    pub stage: String,
    pub directory: String,
    pub file: String,
    pub reference: String,

    pub owner: Option<RecordKey>,
}

impl DocumentData {
    /// Directory and file joined with `/`, or empty without a file.
    pub fn qualified_file_name(&self) -> String {
        if self.file.is_empty() {
            return String::new();
        }
        if self.directory.is_empty() {
            return self.file.clone();
        }
        format!("{}/{}", self.directory.replace('\\', "/"), self.file)
    }
}

/// Data stored for an issue raised against up to two records.
#[derive(Debug, Clone, Default)]
pub struct IssueData {
    pub issue_type: String,
    pub risk: String,
    pub chance: String,
    pub impact: String,
    pub sheet_name1: String,
    pub row_name1: String,
    pub sheet_name2: String,
    pub row_name2: String,
    pub owner: String,
    pub mitigation: String,

    pub related: Vec<RecordKey>,
}
