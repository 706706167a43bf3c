//! PHP array catalogs: a PHP file that returns the catalog as an array.
//!
//! ```php
//! <?php
//!
//! return [
//!     'domain' => 'messages',
//!     'plural-forms' => 'nplurals=2; plural=(n != 1);',
//!     'messages' => [
//!         '' => [
//!             'Hello' => 'Bonjour',
//!         ],
//!     ],
//! ];
//! ```
//!
//! The array has the same shape as the JSON catalog. Both the short `[]`
//! and the long `array()` syntax are read, so files produced by
//! `var_export` load as well.

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};

use super::{Generator, Loader, json::JsonCatalog};
use crate::core::{data::Catalog, error::ParseError};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct PhpArrayFormat;

impl Loader for PhpArrayFormat {
    fn load(&self, bytes: &[u8]) -> Result<Catalog> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::new(format!("file is not valid UTF-8: {}", e)))?;
        Ok(parse(content)?)
    }
}

impl Generator for PhpArrayFormat {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        let document = serde_json::to_value(JsonCatalog::from_catalog(catalog))
            .context("Failed to serialize PHP array")?;
        let mut out = String::from("<?php\n\nreturn ");
        write_value(&mut out, &document, 0);
        out.push_str(";\n");
        Ok(out.into_bytes())
    }
}

// ============================================================
// Rendering
// ============================================================

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            write_items(out, depth, items.iter().map(|item| (None, item)));
        }
        Value::Object(map) => {
            write_items(out, depth, map.iter().map(|(k, v)| (Some(k.as_str()), v)));
        }
    }
}

fn write_items<'a>(
    out: &mut String,
    depth: usize,
    items: impl ExactSizeIterator<Item = (Option<&'a str>, &'a Value)>,
) {
    if items.len() == 0 {
        out.push_str("[]");
        return;
    }
    out.push_str("[\n");
    for (key, value) in items {
        out.push_str(&INDENT.repeat(depth + 1));
        if let Some(key) = key {
            write_string(out, key);
            out.push_str(" => ");
        }
        write_value(out, value, depth + 1);
        out.push_str(",\n");
    }
    out.push_str(&INDENT.repeat(depth));
    out.push(']');
}

/// Single-quoted literal: only `\` and `'` need escaping.
fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

// ============================================================
// Parsing
// ============================================================

/// Parse the PHP file into a catalog.
pub fn parse(content: &str) -> Result<Catalog, ParseError> {
    let value = Reader::new(content).document()?;
    let document: JsonCatalog = serde_json::from_value(value)
        .map_err(|e| ParseError::new(format!("invalid PHP array catalog: {}", e)))?;
    document.into_catalog()
}

/// A key in a PHP array literal.
enum Key {
    Int(i64),
    Str(String),
}

/// Reads the subset of PHP a catalog file uses: one `return` of a literal
/// made of arrays, strings, integers, booleans and `null`.
struct Reader {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Reader {
    fn new(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Self {
            chars: content.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn document(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia();
        if !self.eat_word("<?php") {
            return Err(self.error("expected \"<?php\""));
        }
        self.skip_trivia();
        if !self.eat_keyword("return") {
            return Err(self.error("expected \"return\""));
        }
        let value = self.value()?;
        self.skip_trivia();
        if !self.eat(';') {
            return Err(self.error("expected \";\" after the returned array"));
        }
        self.skip_trivia();
        self.eat_word("?>");
        self.skip_trivia();
        if self.peek().is_some() {
            return Err(self.error("unexpected content after the returned array"));
        }
        Ok(value)
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia();
        match self.peek() {
            Some('[') => {
                self.bump();
                self.array(']')
            }
            Some('\'') => Ok(Value::String(self.single_quoted()?)),
            Some('"') => Ok(Value::String(self.double_quoted()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                Ok(Value::Number(Number::from(self.integer()?)))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.identifier();
                match word.to_ascii_lowercase().as_str() {
                    "array" => {
                        self.skip_trivia();
                        if !self.eat('(') {
                            return Err(self.error("expected \"(\" after \"array\""));
                        }
                        self.array(')')
                    }
                    "null" => Ok(Value::Null),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.error(format!("unsupported expression \"{}\"", word))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of file")),
        }
    }

    /// Items up to `close`; the opening bracket is already consumed.
    fn array(&mut self, close: char) -> Result<Value, ParseError> {
        let mut items: Vec<(Option<Key>, Value)> = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat(close) {
                break;
            }
            let first = self.value()?;
            self.skip_trivia();
            let item = if self.eat_word("=>") {
                let key = match first {
                    Value::String(s) => Key::Str(s),
                    Value::Number(n) => match n.as_i64() {
                        Some(i) => Key::Int(i),
                        None => return Err(self.error("array keys must be integers or strings")),
                    },
                    _ => return Err(self.error("array keys must be integers or strings")),
                };
                (Some(key), self.value()?)
            } else {
                (None, first)
            };
            items.push(item);

            self.skip_trivia();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                break;
            }
            return Err(self.error(format!("expected \",\" or \"{}\"", close)));
        }
        Ok(into_value(items))
    }

    fn single_quoted(&mut self) -> Result<String, ParseError> {
        let start_line = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(text),
                Some('\\') => match self.peek() {
                    Some(c @ ('\\' | '\'')) => {
                        self.bump();
                        text.push(c);
                    }
                    _ => text.push('\\'),
                },
                Some(c) => text.push(c),
                None => return Err(ParseError::at(start_line, "unterminated string")),
            }
        }
    }

    fn double_quoted(&mut self) -> Result<String, ParseError> {
        let start_line = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => Some('\n'),
                        Some('t') => Some('\t'),
                        Some('r') => Some('\r'),
                        Some('v') => Some('\u{0b}'),
                        Some('f') => Some('\u{0c}'),
                        Some('e') => Some('\u{1b}'),
                        Some(c @ ('\\' | '"' | '$')) => Some(c),
                        _ => None,
                    };
                    match escaped {
                        Some(c) => {
                            self.bump();
                            text.push(c);
                        }
                        None => text.push('\\'),
                    }
                }
                Some('$') => return Err(self.error("interpolated strings are not supported")),
                Some(c) => text.push(c),
                None => return Err(ParseError::at(start_line, "unterminated string")),
            }
        }
    }

    fn integer(&mut self) -> Result<i64, ParseError> {
        let mut digits = String::new();
        if self.eat('-') {
            digits.push('-');
        }
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            self.bump();
            digits.push(c);
        }
        digits
            .parse()
            .map_err(|_| self.error(format!("invalid integer \"{}\"", digits)))
    }

    fn identifier(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            self.bump();
            word.push(c);
        }
        word
    }

    /// Whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    while self.peek().is_some()
                        && !(self.peek() == Some('*') && self.peek_at(1) == Some('/'))
                    {
                        self.bump();
                    }
                    self.pos = (self.pos + 2).min(self.chars.len());
                }
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.bump();
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        let matches = self.pos + len <= self.chars.len()
            && self.chars[self.pos..self.pos + len]
                .iter()
                .copied()
                .eq(word.chars());
        if matches {
            self.pos += len;
        }
        matches
    }

    /// A word not followed by more identifier characters.
    fn eat_keyword(&mut self, word: &str) -> bool {
        let start = self.pos;
        if self.identifier().eq_ignore_ascii_case(word) {
            return true;
        }
        self.pos = start;
        false
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

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

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.line, message)
    }
}

/// A list when the keys are absent or exactly `0..n`, an object otherwise.
/// An empty array reads as an empty object.
fn into_value(items: Vec<(Option<Key>, Value)>) -> Value {
    let is_list = !items.is_empty()
        && items.iter().enumerate().all(|(i, (key, _))| match key {
            None => true,
            Some(Key::Int(n)) => usize::try_from(*n).is_ok_and(|n| n == i),
            Some(Key::Str(_)) => false,
        });
    if is_list {
        return Value::Array(items.into_iter().map(|(_, value)| value).collect());
    }

    let mut map = Map::new();
    let mut next_index: i64 = 0;
    for (key, value) in items {
        let key = match key {
            Some(Key::Str(s)) => s,
            Some(Key::Int(n)) => {
                next_index = n + 1;
                n.to_string()
            }
            None => {
                let key = next_index.to_string();
                next_index += 1;
                key
            }
        };
        map.insert(key, value);
    }
    Value::Object(map)
}
