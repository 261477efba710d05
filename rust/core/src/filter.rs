// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Include/exclude filters gating which rows become records.
//!
//! A [`Filter`] holds per-sheet pattern lists and one polarity. Under
//! `include`, a name is filtered out unless some entry for its sheet
//! matches; under `exclude`, it is filtered out when any entry matches.
//! A sheet with no entries filters nothing under either polarity.
//! Comparisons ignore case and surrounding whitespace.

use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::normalize_key;

/// Whether entries select what to keep or what to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Include,
    Exclude,
}

/// How an entry's pattern is compared with a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Exact,
    Substring,
    /// Full-string regular expression.
    Regexp,
}

#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    Substring(String),
    Regexp(Regex),
}

impl Pattern {
    fn new(pattern: &str, kind: MatchKind) -> Result<Self> {
        Ok(match kind {
            MatchKind::Exact => Pattern::Exact(normalize_key(pattern)),
            MatchKind::Substring => Pattern::Substring(normalize_key(pattern)),
            MatchKind::Regexp => {
                let anchored = format!("^(?:{})$", pattern.trim());
                let regex = RegexBuilder::new(&anchored)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                Pattern::Regexp(regex)
            }
        })
    }

    /// `candidate` is already trimmed and upper-cased.
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Pattern::Exact(p) => candidate == p,
            Pattern::Substring(p) => candidate.contains(p.as_str()),
            Pattern::Regexp(re) => re.is_match(candidate),
        }
    }
}

/// One include or exclude rule set.
#[derive(Debug, Clone)]
pub struct Filter {
    polarity: Polarity,
    entries: FxHashMap<String, Vec<Pattern>>,
}

impl Filter {
    pub fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            entries: FxHashMap::default(),
        }
    }

    /// Builds a filter from its configuration form.
    pub fn from_spec(spec: &FilterSpec) -> Result<Self> {
        let mut filter = Filter::new(spec.polarity);
        for entry in &spec.entries {
            filter.add_entry(&entry.sheet, &entry.pattern, entry.kind)?;
        }
        Ok(filter)
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Appends a pattern for a sheet. Entries are tried in insertion order.
    pub fn add_entry(&mut self, sheet: &str, pattern: &str, kind: MatchKind) -> Result<()> {
        let pattern = Pattern::new(pattern, kind)?;
        self.entries
            .entry(normalize_key(sheet))
            .or_default()
            .push(pattern);
        Ok(())
    }

    fn matches(&self, sheet: &str, name: &str) -> bool {
        let Some(patterns) = self.entries.get(&normalize_key(sheet)) else {
            // Nothing to compare against: include keeps it, exclude keeps it.
            return self.polarity == Polarity::Include;
        };
        let candidate = normalize_key(name);
        patterns.iter().any(|p| p.matches(&candidate))
    }

    /// Returns `true` if `name` on `sheet` must be dropped.
    pub fn is_item_filtered(&self, sheet: &str, name: &str) -> bool {
        let matched = self.matches(sheet, name);
        match self.polarity {
            Polarity::Include => !matched,
            Polarity::Exclude => matched,
        }
    }
}

/// Ordered list of filters; an item is dropped if any filter drops it.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every configured filter.
    pub fn from_specs(specs: &[FilterSpec]) -> Result<Self> {
        let filters = specs.iter().map(Filter::from_spec).collect::<Result<Vec<_>>>()?;
        Ok(Self { filters })
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if any filter drops `name` on `sheet`.
    pub fn is_filtered(&self, sheet: &str, name: &str) -> bool {
        self.filters.iter().any(|f| f.is_item_filtered(sheet, name))
    }
}

/// Configuration form of a [`Filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub polarity: Polarity,
    #[serde(default)]
    pub entries: Vec<FilterEntrySpec>,
}

/// Configuration form of one filter entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntrySpec {
    pub sheet: String,
    pub pattern: String,
    #[serde(rename = "match", default)]
    pub kind: MatchKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_exact_space() {
        let mut filter = Filter::new(Polarity::Exclude);
        filter.add_entry("SPACE", "104", MatchKind::Exact).unwrap();
        assert!(filter.is_item_filtered("SPACE", "104"));
        assert!(!filter.is_item_filtered("SPACE", "105"));
        assert!(!filter.is_item_filtered("FLOOR", "104"));
    }

    #[test]
    fn include_keeps_only_matches() {
        let mut filter = Filter::new(Polarity::Include);
        filter.add_entry("FLOOR", "Level 1", MatchKind::Exact).unwrap();
        assert!(!filter.is_item_filtered("FLOOR", " level 1 "));
        assert!(filter.is_item_filtered("FLOOR", "Level 2"));
        // No entries for the sheet: nothing is filtered.
        assert!(!filter.is_item_filtered("SPACE", "101"));
    }

    #[test]
    fn substring_and_regexp_ignore_case() {
        let mut filter = Filter::new(Polarity::Exclude);
        filter
            .add_entry("COMPONENT", "Duplex Receptacle", MatchKind::Substring)
            .unwrap();
        filter.add_entry("ATTRIBUTE", "^M.*", MatchKind::Regexp).unwrap();
        filter.add_entry("ATTRIBUTE", "obj", MatchKind::Regexp).unwrap();

        assert!(filter.is_item_filtered("component", "Duplex receptacle 12"));
        assert!(filter.is_item_filtered("ATTRIBUTE", "Mark"));
        assert!(filter.is_item_filtered("ATTRIBUTE", "marker"));
        // Regexp entries must match the whole name.
        assert!(!filter.is_item_filtered("ATTRIBUTE", "ObjectType"));
        assert!(filter.is_item_filtered("ATTRIBUTE", "OBJ"));
    }

    #[test]
    fn invalid_regexp_is_an_error() {
        let mut filter = Filter::new(Polarity::Exclude);
        let err = filter.add_entry("SPACE", "(", MatchKind::Regexp).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn chain_drops_if_any_filter_drops() {
        let mut exclude = Filter::new(Polarity::Exclude);
        exclude.add_entry("SPACE", "104", MatchKind::Exact).unwrap();
        let mut include = Filter::new(Polarity::Include);
        include.add_entry("FLOOR", "Level 1", MatchKind::Exact).unwrap();

        let mut chain = FilterChain::new();
        chain.push(exclude);
        chain.push(include);
        assert!(chain.is_filtered("SPACE", "104"));
        assert!(chain.is_filtered("FLOOR", "Level 2"));
        assert!(!chain.is_filtered("SPACE", "101"));
        assert!(!FilterChain::new().is_filtered("SPACE", "104"));
    }

    #[test]
    fn chain_from_specs() {
        let specs = vec![FilterSpec {
            polarity: Polarity::Exclude,
            entries: vec![FilterEntrySpec {
                sheet: "Space".into(),
                pattern: "10.".into(),
                kind: MatchKind::Regexp,
            }],
        }];
        let chain = FilterChain::from_specs(&specs).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.is_filtered("SPACE", "104"));
        assert!(!chain.is_filtered("SPACE", "1040"));
    }
}
