// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GUID normalization for external identifiers.
//!
//! Authoring tools export identifiers in three shapes: plain GUIDs
//! (`8-4-4-4-12` hex), 22-character compressed IFC GUIDs (base 64 over
//! `0-9A-Za-z_$`) and Revit unique ids (a GUID followed by an 8-digit hex
//! element id). The conversions here bring the latter two to plain GUIDs and
//! leave anything they cannot convert untouched.

/// Length of a compressed (base 64) GUID.
pub const COMPRESSED_GUID_LEN: usize = 22;

const GUID_LEN: usize = 36;
const DASH_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Returns `true` if `value` is a GUID, optionally wrapped in braces.
pub fn is_guid(value: &str) -> bool {
    let inner = value.strip_prefix('{').unwrap_or(value);
    let inner = inner.strip_suffix('}').unwrap_or(inner);
    is_bare_guid(inner)
}

fn is_bare_guid(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != GUID_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if DASH_POSITIONS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Returns `true` if `value` looks like a Revit unique id: a GUID, a dash
/// and an 8-digit hex element id.
pub fn is_revit_unique_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == GUID_LEN + 9
        && value.is_ascii()
        && is_bare_guid(&value[..GUID_LEN])
        && bytes[GUID_LEN] == b'-'
        && bytes[GUID_LEN + 1..].iter().all(u8::is_ascii_hexdigit)
}

fn base64_digit(c: u8) -> Option<u128> {
    let value = match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'Z' => c - b'A' + 10,
        b'a'..=b'z' => c - b'a' + 36,
        b'_' => 62,
        b'$' => 63,
        _ => return None,
    };
    Some(value as u128)
}

/// Decodes a compressed GUID into dashed `8-4-4-4-12` form.
///
/// Returns `None` if a character is outside the alphabet or the value does
/// not fit in 128 bits.
pub fn base64_to_guid(token: &str) -> Option<String> {
    let mut value: u128 = 0;
    for c in token.bytes() {
        value = value.checked_mul(64)?.checked_add(base64_digit(c)?)?;
    }
    let hex = format!("{value:032x}");
    let guid = format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    );
    is_guid(&guid).then_some(guid)
}

/// Converts a Revit unique id into the GUID Revit writes on IFC export.
///
/// The last eight digits of the GUID part are XOR-ed with the element id.
pub fn revit_unique_id_to_guid(unique_id: &str) -> Option<String> {
    if !is_revit_unique_id(unique_id) {
        return None;
    }
    let base = &unique_id[..28];
    let suffix = u32::from_str_radix(&unique_id[28..36], 16).ok()?;
    let element_id = u32::from_str_radix(&unique_id[37..], 16).ok()?;
    Some(format!("{base}{:08x}", suffix ^ element_id))
}

/// Converts a compressed GUID to dashed form, returning `value` unchanged
/// when it is already a GUID or cannot be converted.
pub fn process_guid(value: &str) -> String {
    if is_guid(value) || value.len() != COMPRESSED_GUID_LEN {
        return value.to_string();
    }
    base64_to_guid(value).unwrap_or_else(|| value.to_string())
}

/// Converts a Revit unique id to its export GUID, returning `value`
/// unchanged for anything else.
pub fn process_revit_unique_id(value: &str) -> String {
    revit_unique_id_to_guid(value)
        .filter(|guid| is_guid(guid))
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_guids() {
        assert!(is_guid("65244c00-5eee-452a-b3b7-e73a38825f23"));
        assert!(is_guid("{65244C00-5EEE-452A-B3B7-E73A38825F23}"));
        assert!(!is_guid("65244c00-5eee-452a-b3b7-e73a38825f2"));
        assert!(!is_guid("65244c00x5eee-452a-b3b7-e73a38825f23"));
        assert!(!is_guid("g5244c00-5eee-452a-b3b7-e73a38825f23"));
    }

    #[test]
    fn decodes_compressed_guid() {
        assert_eq!(
            base64_to_guid("0000000000000000000000").as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(
            base64_to_guid("3$$$$$$$$$$$$$$$$$$$$$").as_deref(),
            Some("ffffffff-ffff-ffff-ffff-ffffffffffff")
        );
        assert_eq!(
            base64_to_guid("0000000000000000000010").as_deref(),
            Some("00000000-0000-0000-0000-000000000040")
        );
    }

    #[test]
    fn rejects_overflowing_or_invalid_tokens() {
        // 4 * 64^21 == 2^128 does not fit.
        assert_eq!(base64_to_guid("4000000000000000000000"), None);
        assert_eq!(base64_to_guid("000000000000000000000-"), None);
    }

    #[test]
    fn process_guid_leaves_unconvertible_values() {
        assert_eq!(
            process_guid("3$$$$$$$$$$$$$$$$$$$$$"),
            "ffffffff-ffff-ffff-ffff-ffffffffffff"
        );
        assert_eq!(process_guid("4000000000000000000000"), "4000000000000000000000");
        assert_eq!(process_guid("short"), "short");
        assert_eq!(
            process_guid("65244c00-5eee-452a-b3b7-e73a38825f23"),
            "65244c00-5eee-452a-b3b7-e73a38825f23"
        );
    }

    #[test]
    fn converts_revit_unique_id() {
        let uid = "65244c00-5eee-452a-b3b7-e73a38825f23-000f55ba";
        assert!(is_revit_unique_id(uid));
        assert_eq!(
            process_revit_unique_id(uid),
            "65244c00-5eee-452a-b3b7-e73a388d0a99"
        );
        assert_eq!(process_revit_unique_id("not-an-id"), "not-an-id");
    }

    #[test]
    fn revit_unique_id_with_multibyte_text_is_kept() {
        let uid = format!("{}\u{e9}{}", "a".repeat(35), "b".repeat(8));
        assert_eq!(uid.len(), GUID_LEN + 9);
        assert!(!is_revit_unique_id(&uid));
        assert_eq!(process_revit_unique_id(&uid), uid);
    }
}
