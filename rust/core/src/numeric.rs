// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Locale-aware numeric recognition used to classify attribute values.

use serde::{Deserialize, Serialize};

/// Decimal and grouping separators of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimal: char,
    pub grouping: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal: '.',
            grouping: ',',
        }
    }
}

impl NumberFormat {
    /// Returns the separators for a locale tag such as `en-US` or `de_DE`.
    ///
    /// Only the language part is consulted; unknown languages use the
    /// English separators.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" | "nl" | "da" | "es" | "it" | "pt" | "id" | "tr" | "el" => Self {
                decimal: ',',
                grouping: '.',
            },
            "fr" | "fi" | "sv" | "nb" | "no" | "cs" | "pl" | "ru" | "sk" | "uk" | "hu" => Self {
                decimal: ',',
                grouping: '\u{a0}',
            },
            _ => Self::default(),
        }
    }

    /// Parses `text` as a number, requiring the whole string to be consumed.
    ///
    /// Accepts an optional leading minus sign, grouping separators in the
    /// integer part, at most one decimal separator and an optional exponent
    /// such as `E5` or `e-3`. Currency signs and trailing text are rejected.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let body = text.strip_prefix('-').unwrap_or(text);
        let mut normalized = String::with_capacity(text.len());
        if body.len() != text.len() {
            normalized.push('-');
        }

        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(at) => (&body[..at], Some(&body[at + 1..])),
            None => (body, None),
        };

        let mut seen_digit = false;
        let mut seen_decimal = false;
        for c in mantissa.chars() {
            if c.is_ascii_digit() {
                seen_digit = true;
                normalized.push(c);
            } else if c == self.decimal && !seen_decimal {
                seen_decimal = true;
                normalized.push('.');
            } else if c == self.grouping && !seen_decimal && seen_digit {
                continue;
            } else {
                return None;
            }
        }
        if !seen_digit {
            return None;
        }

        if let Some(exponent) = exponent {
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            normalized.push('e');
            normalized.push_str(exponent);
        }

        match fast_float::parse_partial::<f64, _>(normalized.as_bytes()) {
            Ok((value, consumed)) if consumed == normalized.len() => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if `text` parses cleanly as a number.
    #[inline]
    pub fn is_numeric(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn english_separators() {
        let fmt = NumberFormat::for_locale("en-US");
        assert_relative_eq!(fmt.parse("1,234.5").unwrap(), 1234.5);
        assert_relative_eq!(fmt.parse("-12").unwrap(), -12.0);
        assert_relative_eq!(fmt.parse("0.25").unwrap(), 0.25);
    }

    #[test]
    fn german_separators() {
        let fmt = NumberFormat::for_locale("de_DE");
        assert_relative_eq!(fmt.parse("1.234,5").unwrap(), 1234.5);
        assert!(fmt.parse("1,2,3").is_none());
    }

    #[test]
    fn exponents_are_numeric() {
        let fmt = NumberFormat::default();
        assert_relative_eq!(fmt.parse("1E5").unwrap(), 100_000.0);
        assert_relative_eq!(fmt.parse("2.5e-3").unwrap(), 0.0025);
        assert_relative_eq!(fmt.parse("-4e+2").unwrap(), -400.0);
        let de = NumberFormat::for_locale("de-DE");
        assert_relative_eq!(de.parse("1,5E2").unwrap(), 150.0);
    }

    #[test]
    fn leftover_text_is_not_numeric() {
        let fmt = NumberFormat::default();
        assert!(!fmt.is_numeric("12 mm"));
        assert!(!fmt.is_numeric("1E"));
        assert!(!fmt.is_numeric("e5"));
        assert!(!fmt.is_numeric("1e5e2"));
        assert!(!fmt.is_numeric("abc"));
        assert!(!fmt.is_numeric("-"));
        assert!(!fmt.is_numeric(""));
        assert!(!fmt.is_numeric(",5"));
    }
}
