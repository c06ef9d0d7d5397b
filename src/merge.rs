// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Filter placeholder names and merge two sources with precedence.
// Author: Lukas Bower

use crate::ids::{CanonicalMapping, PacketId};

const UNKNOWN_PREFIX: &str = "Unknown";
const UNRESOLVED_MARKER: char = '?';

/// Whether `name` marks a packet upstream has not identified yet.
#[must_use]
pub fn is_placeholder(name: &str) -> bool {
    name.starts_with(UNKNOWN_PREFIX) || name.contains(UNRESOLVED_MARKER)
}

/// Remove the extension marker and every placeholder name.
#[must_use]
pub fn drop_unknown(mut mapping: CanonicalMapping) -> CanonicalMapping {
    mapping.remove(PacketId::EXTENSION);
    mapping.retain(|_, name| !is_placeholder(name));
    mapping
}

/// Filter both sides, then let `overlay` win every id collision.
#[must_use]
pub fn merge(base: CanonicalMapping, overlay: CanonicalMapping) -> CanonicalMapping {
    let mut merged = drop_unknown(base);
    merged.extend(drop_unknown(overlay));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(&str, &str)]) -> CanonicalMapping {
        entries
            .iter()
            .map(|(id, name)| (id.parse().unwrap(), (*name).to_owned()))
            .collect()
    }

    #[test]
    fn filter_drops_marker_and_placeholders() {
        let filtered = drop_unknown(mapping(&[
            ("ffff", "Extension"),
            ("0012", "Unknown42"),
            ("0013", "Foo?"),
            ("0014", "Foo"),
        ]));
        assert_eq!(filtered, mapping(&[("0014", "Foo")]));
    }

    #[test]
    fn placeholder_rule_is_case_sensitive() {
        assert!(is_placeholder("Unknown"));
        assert!(is_placeholder("?"));
        assert!(!is_placeholder("unknownPacket"));
        assert!(!is_placeholder("KnownUnknown"));
    }

    #[test]
    fn overlay_takes_precedence() {
        let merged = merge(
            mapping(&[("0001", "OldName")]),
            mapping(&[("0001", "NewName"), ("0002", "Extra")]),
        );
        assert_eq!(merged, mapping(&[("0001", "NewName"), ("0002", "Extra")]));
    }

    #[test]
    fn placeholder_overlay_does_not_erase_base_name() {
        let merged = merge(
            mapping(&[("0301", "Login")]),
            mapping(&[("0301", "Unknown_3_1")]),
        );
        assert_eq!(merged, mapping(&[("0301", "Login")]));
    }

    #[test]
    fn base_extension_entry_never_survives() {
        let merged = merge(mapping(&[("ffff", "Wrapper")]), CanonicalMapping::new());
        assert!(merged.is_empty());
    }
}
