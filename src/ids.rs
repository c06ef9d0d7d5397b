// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Define packet identifiers and the canonical id-to-name mapping.
// Author: Lukas Bower

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

/// Number of hex digits in the external form of a [`PacketId`].
pub const PACKET_ID_DIGITS: usize = 4;

/// Wire identifier of a packet, `(major << 8) | minor`.
///
/// Externally rendered as exactly four lowercase hex digits, so ordering by
/// value matches lexicographic ordering of the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u16);

impl PacketId {
    /// Reserved extension marker, never a real packet.
    pub const EXTENSION: PacketId = PacketId(0xffff);

    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Build an id from its category and code bytes.
    #[must_use]
    pub const fn from_parts(major: u8, minor: u8) -> Self {
        Self(((major as u16) << 8) | minor as u16)
    }

    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn minor(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl From<u16> for PacketId {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Rejected external id string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("packet id {0:?} is not 4 lowercase hex digits")]
pub struct ParsePacketIdError(pub String);

impl FromStr for PacketId {
    type Err = ParsePacketIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == PACKET_ID_DIGITS
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ParsePacketIdError(s.to_owned()));
        }
        u16::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParsePacketIdError(s.to_owned()))
    }
}

impl Serialize for PacketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PacketId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Reconciled id-to-name table for one logical file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMapping(BTreeMap<PacketId, String>);

impl CanonicalMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name, returning the name it replaced.
    pub fn insert(&mut self, id: PacketId, name: impl Into<String>) -> Option<String> {
        self.0.insert(id, name.into())
    }

    pub fn remove(&mut self, id: PacketId) -> Option<String> {
        self.0.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: PacketId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, id: PacketId) -> bool {
        self.0.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(PacketId, &str) -> bool) {
        self.0.retain(|id, name| keep(*id, name));
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PacketId, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl FromIterator<(PacketId, String)> for CanonicalMapping {
    fn from_iter<I: IntoIterator<Item = (PacketId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(PacketId, String)> for CanonicalMapping {
    fn extend<I: IntoIterator<Item = (PacketId, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for CanonicalMapping {
    type Item = (PacketId, String);
    type IntoIter = btree_map::IntoIter<PacketId, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_four_lowercase_hex_digits() {
        assert_eq!(PacketId::new(5).to_string(), "0005");
        assert_eq!(PacketId::from_parts(0x1a, 0x0b).to_string(), "1a0b");
        assert_eq!(PacketId::EXTENSION.to_string(), "ffff");
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "12", "00001", "00A1", "zz00", "+001"] {
            assert!(bad.parse::<PacketId>().is_err(), "{bad} should be rejected");
        }
        assert_eq!("0206".parse::<PacketId>().unwrap(), PacketId::from_parts(2, 6));
    }

    #[test]
    fn mapping_serializes_in_key_order() {
        let mapping: CanonicalMapping = [
            (PacketId::new(0x0102), "B".to_owned()),
            (PacketId::new(0x0001), "A".to_owned()),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"0001":"A","0102":"B"}"#);
    }
}
