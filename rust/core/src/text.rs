// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell text normalization shared by setters, filters and page lookups.

/// Trims a cell value and maps the "not applicable" markers to empty.
#[inline]
pub fn filter_na(value: &str) -> String {
    let value = value.trim();
    if value.eq_ignore_ascii_case("n/a") || value.eq_ignore_ascii_case("n\\a") {
        String::new()
    } else {
        value.to_string()
    }
}

/// Returns `true` when a cell carries no usable value.
#[inline]
pub fn is_blank(value: &str) -> bool {
    filter_na(value).is_empty()
}

/// Case-normalized key used by every page index.
#[inline]
pub fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// Removes one pair of surrounding double quotes, if present.
pub fn strip_quotes(value: &str) -> &str {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Splits a comma-separated reference list into trimmed, non-empty names.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps spelled-out currency names onto ISO codes.
pub fn convert_currency(value: &str) -> String {
    let value = filter_na(value);
    match value.to_uppercase().as_str() {
        "DOLLAR" | "DOLLARS" => "USD".to_string(),
        "EURO" | "EUROS" => "EUR".to_string(),
        _ => value,
    }
}

/// Adds `name` to `names` unless an equal name (ignoring case) is present.
pub fn push_unique_name(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}
