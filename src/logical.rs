// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Enumerate the four logical packet files (direction x protocol).
// Author: Lukas Bower

use std::fmt;
use std::str::FromStr;

/// Direction a packet travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Clientbound,
    Serverbound,
}

impl Side {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Clientbound => "clientbound",
            Side::Serverbound => "serverbound",
        }
    }
}

/// Protocol layer a packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Main,
    Tribulle,
}

impl Bound {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Bound::Main => "main",
            Bound::Tribulle => "tribulle",
        }
    }
}

/// One (direction, protocol) combination, persisted and compiled as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalFile {
    pub side: Side,
    pub bound: Bound,
}

impl LogicalFile {
    pub const CLIENTBOUND: LogicalFile = LogicalFile::new(Side::Clientbound, Bound::Main);
    pub const SERVERBOUND: LogicalFile = LogicalFile::new(Side::Serverbound, Bound::Main);
    pub const TRIBULLE_CLIENTBOUND: LogicalFile =
        LogicalFile::new(Side::Clientbound, Bound::Tribulle);
    pub const TRIBULLE_SERVERBOUND: LogicalFile =
        LogicalFile::new(Side::Serverbound, Bound::Tribulle);

    /// Every logical file, in processing order.
    pub const ALL: [LogicalFile; 4] = [
        Self::CLIENTBOUND,
        Self::SERVERBOUND,
        Self::TRIBULLE_CLIENTBOUND,
        Self::TRIBULLE_SERVERBOUND,
    ];

    #[must_use]
    pub const fn new(side: Side, bound: Bound) -> Self {
        Self { side, bound }
    }

    /// Table name, also the stem of the persisted mapping file.
    #[must_use]
    pub fn stem(self) -> &'static str {
        match (self.bound, self.side) {
            (Bound::Main, Side::Clientbound) => "clientbound",
            (Bound::Main, Side::Serverbound) => "serverbound",
            (Bound::Tribulle, Side::Clientbound) => "tribulle_clientbound",
            (Bound::Tribulle, Side::Serverbound) => "tribulle_serverbound",
        }
    }

    /// Name of the persisted canonical mapping, e.g. `tribulle_serverbound.json`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.stem())
    }

    /// Path of the structural source module relative to the packets root.
    #[must_use]
    pub fn structural_path(self) -> String {
        format!("{}/{}.py", self.side.as_str(), self.bound.as_str())
    }
}

impl fmt::Display for LogicalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Name that matches none of the logical files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown packet file {0:?} (expected one of clientbound, serverbound, tribulle_clientbound, tribulle_serverbound)")]
pub struct UnknownLogicalFile(pub String);

impl FromStr for LogicalFile {
    type Err = UnknownLogicalFile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stem = s.strip_suffix(".json").unwrap_or(s);
        LogicalFile::ALL
            .into_iter()
            .find(|file| file.stem() == stem)
            .ok_or_else(|| UnknownLogicalFile(s.to_owned()))
    }
}
