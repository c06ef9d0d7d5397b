// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Split structured source text into indented logical lines of tokens.
// Author: Lukas Bower

use crate::error::SyntaxError;

const THREE_CHAR_OPS: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const TWO_CHAR_OPS: [&str; 20] = [
    "==", "!=", "<=", ">=", "->", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "**",
    "//", "<<", ">>", ":=", "<>",
];
const STRING_PREFIX_CHARS: &str = "rRbBuUfF";
const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Name(String),
    /// Integer literal that fits in a `u64`.
    Int(u64),
    /// Any other numeric literal (float, imaginary, oversized integer).
    Number,
    Str,
    Op(String),
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self, Token::Op(value) if value == op)
    }

    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, Token::Name(value) if value == name)
    }
}

/// One statement line after joining bracketed and backslash continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based line where the statement starts.
    pub line: usize,
    /// Indentation width in columns.
    pub indent: usize,
    pub tokens: Vec<Token>,
}

pub fn tokenize(source: &str) -> Result<Vec<LogicalLine>, SyntaxError> {
    Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        brackets: Vec::new(),
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    brackets: Vec<(char, usize)>,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<LogicalLine>, SyntaxError> {
        let mut lines = Vec::new();
        let mut current: Option<LogicalLine> = None;

        loop {
            if current.is_none() {
                let indent = self.indentation();
                match self.peek() {
                    None => break,
                    Some('\n') | Some('\r') => {
                        self.newline();
                        continue;
                    }
                    Some('#') => {
                        self.skip_comment();
                        continue;
                    }
                    Some('\\') if self.at_continuation() => {
                        self.continuation();
                        continue;
                    }
                    Some(_) => {
                        current = Some(LogicalLine {
                            line: self.line,
                            indent,
                            tokens: Vec::new(),
                        });
                    }
                }
            }

            let Some(c) = self.peek() else { break };
            match c {
                ' ' | '\t' | '\x0c' => self.pos += 1,
                '#' => self.skip_comment(),
                '\\' if self.at_continuation() => self.continuation(),
                '\n' | '\r' => {
                    self.newline();
                    if self.brackets.is_empty() {
                        lines.extend(current.take().filter(|line| !line.tokens.is_empty()));
                    }
                }
                _ => {
                    let token = self.token(c)?;
                    if let Some(line) = current.as_mut() {
                        line.tokens.push(token);
                    }
                }
            }
        }

        if let Some(&(open, line)) = self.brackets.last() {
            return Err(SyntaxError::new(line, format!("'{open}' was never closed")));
        }
        lines.extend(current.filter(|line| !line.tokens.is_empty()));
        Ok(lines)
    }

    fn indentation(&mut self) -> usize {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                '\x0c' => width = 0,
                _ => break,
            }
            self.pos += 1;
        }
        width
    }

    fn newline(&mut self) {
        if self.peek() == Some('\r') {
            self.pos += 1;
            if self.peek() == Some('\n') {
                self.pos += 1;
            }
            self.line += 1;
        } else {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        while !matches!(self.peek(), None | Some('\n') | Some('\r')) {
            self.pos += 1;
        }
    }

    fn at_continuation(&self) -> bool {
        matches!(self.peek_at(1), Some('\n') | Some('\r'))
    }

    fn continuation(&mut self) {
        self.pos += 1;
        self.newline();
    }

    fn token(&mut self, c: char) -> Result<Token, SyntaxError> {
        if c == '\'' || c == '"' {
            return self.string();
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            return Ok(self.number());
        }
        if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|n| n.is_alphanumeric() || n == '_')
            {
                self.pos += 1;
            }
            let name: String = self.chars[start..self.pos].iter().collect();
            let is_prefix = name.len() <= 2 && name.chars().all(|p| STRING_PREFIX_CHARS.contains(p));
            if is_prefix && matches!(self.peek(), Some('\'') | Some('"')) {
                return self.string();
            }
            return Ok(Token::Name(name));
        }
        self.operator(c)
    }

    fn string(&mut self) -> Result<Token, SyntaxError> {
        let start_line = self.line;
        let quote = self.peek().unwrap_or('"');
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        loop {
            let Some(c) = self.bump() else {
                return Err(SyntaxError::new(start_line, "unterminated string literal"));
            };
            match c {
                '\\' => {
                    if self.peek() == Some('\r') {
                        self.newline();
                    } else {
                        self.bump();
                    }
                }
                '\n' | '\r' if !triple => {
                    return Err(SyntaxError::new(start_line, "unterminated string literal"));
                }
                '\r' => {
                    if self.peek() == Some('\n') {
                        self.pos += 1;
                    }
                    self.line += 1;
                }
                c if c == quote => {
                    if !triple {
                        return Ok(Token::Str);
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.pos += 2;
                        return Ok(Token::Str);
                    }
                }
                _ => {}
            }
        }
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        let radix_prefixed = self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && !radix_prefixed
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some('e' | 'E'));
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        parse_int_literal(&text).map_or(Token::Number, Token::Int)
    }

    fn operator(&mut self, c: char) -> Result<Token, SyntaxError> {
        match c {
            '(' | '[' | '{' => self.brackets.push((c, self.line)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, line)) => {
                        return Err(SyntaxError::new(
                            self.line,
                            format!("'{c}' does not match '{open}' opened on line {line}"),
                        ));
                    }
                    None => {
                        return Err(SyntaxError::new(self.line, format!("unmatched '{c}'")));
                    }
                }
            }
            _ => {}
        }

        for width in [3, 2] {
            let candidates: &[&str] = if width == 3 {
                &THREE_CHAR_OPS
            } else {
                &TWO_CHAR_OPS
            };
            if self.pos + width <= self.chars.len() {
                let text: String = self.chars[self.pos..self.pos + width].iter().collect();
                if candidates.contains(&text.as_str()) {
                    self.pos += width;
                    return Ok(Token::Op(text));
                }
            }
        }
        self.pos += 1;
        Ok(Token::Op(c.to_string()))
    }
}

/// Parse an integer literal with optional radix prefix and digit separators.
pub fn parse_int_literal(text: &str) -> Option<u64> {
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    let digits = digits.strip_prefix('_').unwrap_or(digits);
    if digits.is_empty()
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c == '_' || c.is_digit(radix))
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    u64::from_str_radix(&cleaned, radix).ok()
}
