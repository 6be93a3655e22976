//! Identity types for legacy FluxBB entities

/// Legacy FluxBB identifier (user, post or topic id).
///
/// FluxBB ids and the correspondence-store columns are both 32-bit integers.
pub type LegacyId = i32;

/// Parse a raw query-parameter value into a legacy id.
///
/// Missing, empty and non-numeric values all collapse to `None`, which the
/// resolver treats the same as "no id supplied".
pub fn parse_legacy_id(raw: Option<&str>) -> Option<LegacyId> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<LegacyId>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_legacy_id(Some("501")), Some(501));
        assert_eq!(parse_legacy_id(Some(" 77 ")), Some(77));
    }

    #[test]
    fn test_parse_absent_values() {
        assert_eq!(parse_legacy_id(None), None);
        assert_eq!(parse_legacy_id(Some("")), None);
        assert_eq!(parse_legacy_id(Some("   ")), None);
    }

    #[test]
    fn test_parse_malformed_values() {
        assert_eq!(parse_legacy_id(Some("abc")), None);
        assert_eq!(parse_legacy_id(Some("12abc")), None);
        assert_eq!(parse_legacy_id(Some("1.5")), None);
        // Larger than a postgres integer column
        assert_eq!(parse_legacy_id(Some("99999999999")), None);
    }

    proptest! {
        #[test]
        fn prop_any_i32_parses_back(id in any::<i32>()) {
            prop_assert_eq!(parse_legacy_id(Some(&id.to_string())), Some(id));
        }

        #[test]
        fn prop_alphabetic_never_parses(raw in "[a-zA-Z]{1,12}") {
            prop_assert_eq!(parse_legacy_id(Some(&raw)), None);
        }
    }
}
