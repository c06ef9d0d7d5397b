// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Recover top-level class declarations and their literal assignments.
// Author: Lukas Bower

use super::lexer::{tokenize, LogicalLine, Token};
use crate::error::SyntaxError;

/// Literal shapes the extractor can evaluate without running code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(u64),
    Tuple(Vec<Expr>),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseRef {
    /// A bare name such as `Packet`.
    Name(String),
    /// Attribute access, call, subscript or starred base.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign { targets: Vec<Target>, value: Expr },
    Other,
}

/// A class header plus the statements directly in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub line: usize,
    pub bases: Vec<BaseRef>,
    pub body: Vec<Statement>,
}

impl ClassDecl {
    /// Value of the last direct assignment to `name`, if any.
    pub fn assignment(&self, name: &str) -> Option<&Expr> {
        self.body.iter().rev().find_map(|statement| match statement {
            Statement::Assign { targets, value }
                if matches!(targets.as_slice(), [Target::Name(target)] if target == name) =>
            {
                Some(value)
            }
            _ => None,
        })
    }
}

/// Parse every class declared at module level.
pub fn parse_module(source: &str) -> Result<Vec<ClassDecl>, SyntaxError> {
    let lines = tokenize(source)?;
    let mut decls = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];
        index += 1;
        if line.indent != 0 {
            continue;
        }
        let Some((mut decl, inline)) = parse_header(line) else {
            continue;
        };

        let body_start = index;
        while index < lines.len() && lines[index].indent > 0 {
            index += 1;
        }
        if inline.is_empty() {
            decl.body = direct_statements(&lines[body_start..index]);
        } else {
            decl.body = split_statements(inline).into_iter().map(parse_statement).collect();
        }
        decls.push(decl);
    }
    Ok(decls)
}

fn direct_statements(body: &[LogicalLine]) -> Vec<Statement> {
    let Some(first) = body.first() else {
        return Vec::new();
    };
    body.iter()
        .filter(|line| line.indent == first.indent)
        .flat_map(|line| split_statements(&line.tokens))
        .map(parse_statement)
        .collect()
}

/// Returns the declaration and any statements following the header colon.
fn parse_header(line: &LogicalLine) -> Option<(ClassDecl, &[Token])> {
    let tokens = line.tokens.as_slice();
    let [first, Token::Name(name), ..] = tokens else {
        return None;
    };
    if !first.is_name("class") {
        return None;
    }

    let mut cursor = 2;
    if tokens.get(cursor).is_some_and(|t| t.is_op("[")) {
        cursor = closing(tokens, cursor)? + 1;
    }
    let mut bases = Vec::new();
    if tokens.get(cursor).is_some_and(|t| t.is_op("(")) {
        let close = closing(tokens, cursor)?;
        bases = parse_bases(&tokens[cursor + 1..close]);
        cursor = close + 1;
    }
    if !tokens.get(cursor).is_some_and(|t| t.is_op(":")) {
        return None;
    }

    let decl = ClassDecl {
        name: name.clone(),
        line: line.line,
        bases,
        body: Vec::new(),
    };
    Some((decl, &tokens[cursor + 1..]))
}

fn parse_bases(args: &[Token]) -> Vec<BaseRef> {
    split_top_level(args, ",")
        .into_iter()
        .filter(|arg| !arg.is_empty())
        .filter(|arg| !is_keyword_argument(arg))
        .map(|arg| match arg {
            [Token::Name(name)] => BaseRef::Name(name.clone()),
            _ => BaseRef::Other,
        })
        .collect()
}

/// `name=value` and `**mapping` are class keywords, not bases.
fn is_keyword_argument(arg: &[Token]) -> bool {
    match arg {
        [Token::Name(_), eq, ..] => eq.is_op("="),
        [unpack, ..] => unpack.is_op("**"),
        [] => false,
    }
}

fn parse_statement(tokens: &[Token]) -> Statement {
    let mut parts = split_top_level(tokens, "=");
    if parts.len() < 2 {
        return Statement::Other;
    }
    let value = parse_expr(parts.pop().unwrap_or_default());
    let targets = parts
        .into_iter()
        .map(|target| match target {
            [Token::Name(name)] => Target::Name(name.clone()),
            _ => Target::Other,
        })
        .collect();
    Statement::Assign { targets, value }
}

/// Evaluate integer and tuple-of-integer literals; anything else is `Other`.
pub fn parse_expr(tokens: &[Token]) -> Expr {
    let mut parts = split_top_level(tokens, ",");
    if parts.len() > 1 {
        if parts.last().is_some_and(|last| last.is_empty()) {
            parts.pop();
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Expr::Other;
        }
        return Expr::Tuple(parts.into_iter().map(parse_expr).collect());
    }

    match tokens {
        [Token::Int(value)] => Expr::Int(*value),
        [open, inner @ .., _] if open.is_op("(") && closing(tokens, 0) == Some(tokens.len() - 1) => {
            if inner.is_empty() {
                Expr::Tuple(Vec::new())
            } else {
                parse_expr(inner)
            }
        }
        _ => Expr::Other,
    }
}

fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    split_top_level(tokens, ";")
        .into_iter()
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Split on `separator` where it appears outside any bracket.
fn split_top_level<'a>(tokens: &'a [Token], separator: &str) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Op(op) if matches!(op.as_str(), "(" | "[" | "{") => depth += 1,
            Token::Op(op) if matches!(op.as_str(), ")" | "]" | "}") => {
                depth = depth.saturating_sub(1);
            }
            Token::Op(op) if depth == 0 && op == separator => {
                parts.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Index of the bracket closing the one at `open`.
fn closing(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Op(op) if matches!(op.as_str(), "(" | "[" | "{") => depth += 1,
            Token::Op(op) if matches!(op.as_str(), ")" | "]" | "}") => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}
