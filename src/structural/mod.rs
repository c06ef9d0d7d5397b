// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Extract statically-known packet ids from structured source text.
// Author: Lukas Bower

//! Structural source adapter.
//!
//! Packet classes in the reference implementation look like
//! `class LoginPacket(ServerboundPacket): id = (26, 8)`. Only literal ids are
//! recognised; nothing is evaluated.

pub mod lexer;
pub mod parser;

use crate::error::SyntaxError;
use crate::ids::{CanonicalMapping, PacketId};
use log::{debug, warn};
use parser::{BaseRef, ClassDecl, Expr};
use std::fmt;

const PACKET_MARKER: &str = "packet";
const NAME_SUFFIX: &str = "Packet";
const ID_FIELD: &str = "id";

/// Why a packet declaration contributed no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoIdAssignment,
    /// The id is computed, referenced or called rather than written out.
    NotLiteral,
    TupleArity(usize),
    OutOfRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoIdAssignment => f.write_str("no id assignment"),
            SkipReason::NotLiteral => f.write_str("id is not an integer literal"),
            SkipReason::TupleArity(arity) => write!(f, "id tuple has {arity} elements"),
            SkipReason::OutOfRange => f.write_str("id does not fit a packet code"),
        }
    }
}

/// Outcome for one declaration that derives from a packet base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Packet { name: String, id: PacketId },
    Skipped { class: String, reason: SkipReason },
}

/// Resolve every top-level packet declaration in `source`.
pub fn scan(source: &str) -> Result<Vec<Resolution>, SyntaxError> {
    let decls = parser::parse_module(source)?;
    Ok(decls
        .iter()
        .filter(|decl| is_packet_decl(decl))
        .map(resolve)
        .collect())
}

/// Map every packet declaration with a literal id to its display name.
///
/// Declarations without a static id are logged and omitted.
pub fn extract_packets(source: &str) -> Result<CanonicalMapping, SyntaxError> {
    let mut mapping = CanonicalMapping::new();
    for resolution in scan(source)? {
        match resolution {
            Resolution::Packet { name, id } => {
                if let Some(previous) = mapping.insert(id, name.clone()) {
                    warn!("packet {id} declared twice: {previous} replaced by {name}");
                }
            }
            Resolution::Skipped { class, reason } => {
                debug!("skipping {class}: {reason}");
            }
        }
    }
    Ok(mapping)
}

fn is_packet_decl(decl: &ClassDecl) -> bool {
    match decl.bases.as_slice() {
        [BaseRef::Name(base)] => base.to_lowercase().contains(PACKET_MARKER),
        _ => false,
    }
}

fn resolve(decl: &ClassDecl) -> Resolution {
    let skipped = |reason| Resolution::Skipped {
        class: decl.name.clone(),
        reason,
    };
    let Some(value) = decl.assignment(ID_FIELD) else {
        return skipped(SkipReason::NoIdAssignment);
    };
    match evaluate_id(value) {
        Ok(id) => Resolution::Packet {
            name: packet_name(&decl.name).to_owned(),
            id,
        },
        Err(reason) => {
            if reason == SkipReason::OutOfRange {
                warn!("{} (line {}): {reason}", decl.name, decl.line);
            }
            skipped(reason)
        }
    }
}

fn evaluate_id(value: &Expr) -> Result<PacketId, SkipReason> {
    match value {
        Expr::Int(code) => u16::try_from(*code)
            .map(PacketId::new)
            .map_err(|_| SkipReason::OutOfRange),
        Expr::Tuple(items) => match items.as_slice() {
            [Expr::Int(major), Expr::Int(minor)] => {
                let major = u8::try_from(*major).map_err(|_| SkipReason::OutOfRange)?;
                let minor = u8::try_from(*minor).map_err(|_| SkipReason::OutOfRange)?;
                Ok(PacketId::from_parts(major, minor))
            }
            [_, _] => Err(SkipReason::NotLiteral),
            other => Err(SkipReason::TupleArity(other.len())),
        },
        Expr::Other => Err(SkipReason::NotLiteral),
    }
}

/// Class name without its trailing `Packet`; a bare `Packet` is kept whole.
pub fn packet_name(class: &str) -> &str {
    match class.strip_suffix(NAME_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => class,
    }
}
