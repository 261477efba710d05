// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Category-keyed diagnostics collected during a parse run.
//!
//! Nothing below the top-level run aborts on bad data. Instead every
//! suspicious condition becomes a [`Diagnostic`] with positional parameters
//! (sheet, record name, target sheet, target name, ...). Each one is also
//! emitted as a `tracing` event so a subscriber sees it as it happens.

use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    /// A resolvable but suspicious condition in the data itself.
    DataIntegrity,
}

/// Message key of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    ValueIsName,
    Duplicate,
    MissingRef,
    MissingRowRef,
    MissingSheetRef,
    SpaceList,
    UnresolvedRef,
    ValueListMismatch,
    TaskPrereqMissing,
    TaskNumber,
    MissingChildRef,
    MissingParentRef,
    MissingProperty,
    InvalidCellValue,
    ClassNotFound,
    FileReadError,
    MissingExportFileName,
    UnsupportedFileType,
    FileParsed,
}

impl Category {
    /// Returns the message-catalog key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ValueIsName => "vdt_value_is_name",
            Category::Duplicate => "vdt_dup",
            Category::MissingRef => "vdt_missing_ref",
            Category::MissingRowRef => "vdt_missing_row_ref",
            Category::MissingSheetRef => "vdt_missing_sheet_ref",
            Category::SpaceList => "vdt_space_list",
            Category::UnresolvedRef => "vdt_unresolved_ref",
            Category::ValueListMismatch => "vdt_value_list_mismatch",
            Category::TaskPrereqMissing => "vdt_task_prereq_missing",
            Category::TaskNumber => "vdt_task_number",
            Category::MissingChildRef => "vdt_missing_child_ref",
            Category::MissingParentRef => "vdt_missing_parent_ref",
            Category::MissingProperty => "missing-property",
            Category::InvalidCellValue => "invalid-cell-value",
            Category::ClassNotFound => "class-not-found",
            Category::FileReadError => "file_read_error",
            Category::MissingExportFileName => "missing-export-file-name",
            Category::UnsupportedFileType => "unsupported-file-type",
            Category::FileParsed => "file-parsed",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub params: Vec<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category)?;
        if !self.params.is_empty() {
            write!(f, " [{}]", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// Consumer of diagnostics.
pub trait MessageLogger {
    /// Records one message.
    fn log(&mut self, diagnostic: Diagnostic);

    /// Number of error-severity messages logged so far.
    fn error_count(&self) -> usize;

    fn info(&mut self, category: Category, params: Vec<String>) {
        self.log(Diagnostic {
            severity: Severity::Info,
            category,
            params,
        });
    }

    fn warning(&mut self, category: Category, params: Vec<String>) {
        self.log(Diagnostic {
            severity: Severity::Warning,
            category,
            params,
        });
    }

    fn error(&mut self, category: Category, params: Vec<String>) {
        self.log(Diagnostic {
            severity: Severity::Error,
            category,
            params,
        });
    }

    fn data_integrity(&mut self, category: Category, params: Vec<String>) {
        self.log(Diagnostic {
            severity: Severity::DataIntegrity,
            category,
            params,
        });
    }
}

/// Collecting logger that mirrors every message to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in the order they were logged.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Messages of one category.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.category == category)
    }

    /// Number of messages of one category.
    pub fn count(&self, category: Category) -> usize {
        self.by_category(category).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every collected message and resets the error count.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.errors = 0;
    }
}

impl MessageLogger for Diagnostics {
    fn log(&mut self, diagnostic: Diagnostic) {
        let category = diagnostic.category.as_str();
        let params = diagnostic.params.join(", ");
        match diagnostic.severity {
            Severity::Info => tracing::debug!(category, %params, "message"),
            Severity::Warning => tracing::warn!(category, %params, "warning"),
            Severity::Error => {
                self.errors += 1;
                tracing::error!(category, %params, "error");
            }
            Severity::DataIntegrity => tracing::warn!(category, %params, "data integrity"),
        }
        self.entries.push(diagnostic);
    }

    fn error_count(&self) -> usize {
        self.errors
    }
}

/// Builds a positional parameter list from anything printable.
#[macro_export]
macro_rules! params {
    ($($value:expr),* $(,)?) => {
        vec![$($value.to_string()),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_errors_are_counted() {
        let mut log = Diagnostics::new();
        log.warning(Category::MissingProperty, params!["Colour", "SPACE"]);
        log.data_integrity(Category::Duplicate, params!["SPACE", "101"]);
        log.error(Category::InvalidCellValue, params!["SPACE", 3, "Name", 0]);

        assert_eq!(log.len(), 3);
        assert_eq!(log.error_count(), 1);
        assert_eq!(log.count(Category::Duplicate), 1);
        assert_eq!(
            log.entries()[2].params,
            vec!["SPACE", "3", "Name", "0"]
        );
    }

    #[test]
    fn display_includes_params() {
        let diagnostic = Diagnostic {
            severity: Severity::DataIntegrity,
            category: Category::UnresolvedRef,
            params: params!["SPACE", "101", "FLOOR", "L9"],
        };
        assert_eq!(
            diagnostic.to_string(),
            "vdt_unresolved_ref [SPACE, 101, FLOOR, L9]"
        );
    }

    #[test]
    fn clear_resets_error_count() {
        let mut log = Diagnostics::new();
        log.error(Category::FileReadError, params!["FLOOR", "eof"]);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.error_count(), 0);
    }
}
