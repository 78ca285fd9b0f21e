// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pull-based, bounded-lookahead token reader over a JSON-like grammar.
//!
//! The reader keeps the current grammar [`State`] plus an explicit stack of
//! saved states: entering an object or array pushes the state to resume once
//! it closes, closing pops it. Lookahead never exceeds one token past a
//! separator.

use crate::error::{Error, Result};
use crate::port::{EventKind, Input};

/// Default nesting limit, shared by the writers of both formats.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Just after `{`: a field name or `}`.
    ObjectName,
    /// After a field name: `:`.
    ObjectColon,
    /// After `:`: a value.
    ObjectValue,
    /// After a field value: `,` or `}`.
    ObjectComma,
    /// Just after `[`: a value or `]`.
    ArrayValue,
    /// After an element: `,` or `]`.
    ArrayComma,
    /// Between top-level values.
    End,
}

/// [`Input`] over JSON-like text.
pub struct JsonReader<'a> {
    src: &'a str,
    pos: usize,
    state: State,
    stack: Vec<State>,
    max_depth: usize,
    /// `peek_type_tag` consumed the opening `{` of the next object.
    pre_opened: bool,
}

impl<'a> JsonReader<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            state: State::End,
            stack: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            pre_opened: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn err(&self, reason: impl Into<String>) -> Error {
        Error::malformed(self.pos, reason)
    }

    fn skip_ws(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes().get(self.pos).copied()
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.peek_byte() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.err(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            ))),
            None => Err(self.err(format!("expected '{}', found end of input", expected as char))),
        }
    }

    fn classify(&self, byte: Option<u8>) -> Result<EventKind> {
        match byte {
            None => Ok(EventKind::Eof),
            Some(b'{') => Ok(EventKind::StartObject),
            Some(b'[') => Ok(EventKind::StartArray),
            Some(b'"') => Ok(EventKind::String),
            Some(b't' | b'f') => Ok(EventKind::Bool),
            Some(b'n') => Ok(EventKind::Null),
            Some(b'-' | b'0'..=b'9') => Ok(EventKind::Number),
            Some(b) => Err(self.err(format!("unexpected character '{}'", b as char))),
        }
    }

    /// Consume structural separators before a value and return the state to
    /// resume once that value is complete.
    fn begin_value(&mut self) -> Result<State> {
        if self.pre_opened {
            return Err(self.err("type tag must be followed by an object"));
        }
        match self.state {
            State::End => Ok(State::End),
            State::ObjectColon => {
                self.expect_byte(b':')?;
                self.state = State::ObjectValue;
                Ok(State::ObjectComma)
            }
            State::ObjectValue => Ok(State::ObjectComma),
            State::ArrayValue => {
                if self.peek_byte() == Some(b']') {
                    return Err(self.err("expected array element, found ']'"));
                }
                Ok(State::ArrayComma)
            }
            State::ArrayComma => {
                self.expect_byte(b',')?;
                self.state = State::ArrayValue;
                Ok(State::ArrayComma)
            }
            State::ObjectName | State::ObjectComma => {
                Err(self.err("expected field name, found value"))
            }
        }
    }

    fn push(&mut self, resume: State, next: State) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(self.err(format!("nesting deeper than {}", self.max_depth)));
        }
        self.stack.push(resume);
        self.state = next;
        Ok(())
    }

    fn pop(&mut self) -> Result<()> {
        self.state = self
            .stack
            .pop()
            .ok_or_else(|| self.err("unbalanced close"))?;
        Ok(())
    }

    /// Raw string token including quotes; escapes are not decoded.
    fn scan_string(&mut self) -> Result<&'a str> {
        let (src, bytes) = (self.src, self.bytes());
        let start = self.pos;
        if bytes.get(start) != Some(&b'"') {
            return Err(self.err("expected string"));
        }
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(&src[start..=i]);
                }
                _ => i += 1,
            }
        }
        Err(self.err("unterminated string"))
    }

    fn string_token(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        let raw = self.scan_string()?;
        if !raw.contains('\\') {
            return Ok(raw[1..raw.len() - 1].to_string());
        }
        serde_json::from_str::<String>(raw).map_err(|e| Error::malformed(start, e.to_string()))
    }

    fn number_token(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let bytes = self.bytes();
        let start = self.pos;
        let mut i = start;
        while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        {
            i += 1;
        }
        if i == start {
            return Err(self.err("expected number"));
        }
        self.pos = i;
        let src = self.src;
        Ok(&src[start..i])
    }

    fn literal(&mut self, word: &str) -> Result<()> {
        self.skip_ws();
        if self.src[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", word)))
        }
    }

    fn read_number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let resume = self.begin_value()?;
        let start = self.pos;
        let token = self.number_token()?;
        let value = token
            .parse::<T>()
            .map_err(|_| Error::malformed(start, format!("'{}' is not a valid {}", token, what)))?;
        self.state = resume;
        Ok(value)
    }

    fn read_float<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let resume = self.begin_value()?;
        let start = self.pos;
        let quoted;
        let token = if self.peek_byte() == Some(b'"') {
            quoted = self.string_token()?;
            match quoted.as_str() {
                "NaN" | "Infinity" | "-Infinity" => quoted.as_str(),
                other => {
                    return Err(Error::malformed(
                        start,
                        format!("'{}' is not a valid {}", other, what),
                    ))
                }
            }
        } else {
            self.number_token()?
        };
        let value = token
            .parse::<T>()
            .map_err(|_| Error::malformed(start, format!("'{}' is not a valid {}", token, what)))?;
        self.state = resume;
        Ok(value)
    }

    /// Skip one token-level value while tracking bracket depth.
    fn skip_nested(&mut self) -> Result<()> {
        let mut brackets: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.peek_byte() else {
                return Err(self.err("end of input inside skipped value"));
            };
            match b {
                b'"' => {
                    self.scan_string()?;
                }
                b'{' | b'[' => {
                    brackets.push(if b == b'{' { b'}' } else { b']' });
                    self.pos += 1;
                }
                b'}' | b']' => {
                    if brackets.pop() != Some(b) {
                        return Err(self.err("mismatched bracket in skipped value"));
                    }
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
            if brackets.is_empty() {
                return Ok(());
            }
        }
    }
}

impl Input for JsonReader<'_> {
    fn not_eof(&mut self) -> Result<bool> {
        if self.state != State::End {
            return Ok(true);
        }
        Ok(self.peek_byte().is_some())
    }

    fn current_event(&mut self) -> Result<EventKind> {
        if self.pre_opened {
            return Ok(EventKind::StartObject);
        }
        match self.state {
            State::End | State::ObjectValue => {
                let b = self.peek_byte();
                self.classify(b)
            }
            State::ObjectColon => {
                self.expect_byte(b':')?;
                self.state = State::ObjectValue;
                let b = self.peek_byte();
                self.classify(b)
            }
            State::ObjectName => match self.peek_byte() {
                Some(b'}') => Ok(EventKind::EndObject),
                Some(b'"') => Ok(EventKind::FieldName),
                _ => Err(self.err("expected field name or '}'")),
            },
            State::ObjectComma => match self.peek_byte() {
                Some(b'}') => Ok(EventKind::EndObject),
                Some(b',') => Ok(EventKind::FieldName),
                _ => Err(self.err("expected ',' or '}'")),
            },
            State::ArrayValue => match self.peek_byte() {
                Some(b']') => Ok(EventKind::EndArray),
                b => self.classify(b),
            },
            State::ArrayComma => match self.peek_byte() {
                Some(b']') => Ok(EventKind::EndArray),
                Some(b',') => {
                    // one token of lookahead past the separator
                    let save = self.pos;
                    self.pos += 1;
                    let b = self.peek_byte();
                    self.pos = save;
                    self.classify(b)
                }
                _ => Err(self.err("expected ',' or ']'")),
            },
        }
    }

    fn read_bool(&mut self) -> Result<bool> {
        let resume = self.begin_value()?;
        let value = match self.peek_byte() {
            Some(b't') => {
                self.literal("true")?;
                true
            }
            Some(b'f') => {
                self.literal("false")?;
                false
            }
            _ => return Err(self.err("expected boolean")),
        };
        self.state = resume;
        Ok(value)
    }

    fn read_i8(&mut self) -> Result<i8> {
        self.read_number("i8")
    }

    fn read_char(&mut self) -> Result<char> {
        let start = self.pos;
        let s = self.read_string()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::malformed(
                start,
                format!("'{}' is not a single character", s),
            )),
        }
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.read_number("i16")
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.read_number("i32")
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.read_number("i64")
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.read_number("u64")
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.read_float("f32")
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.read_float("f64")
    }

    fn read_string(&mut self) -> Result<String> {
        let resume = self.begin_value()?;
        let value = self.string_token()?;
        self.state = resume;
        Ok(value)
    }

    fn read_null(&mut self) -> Result<()> {
        let resume = self.begin_value()?;
        self.literal("null")?;
        self.state = resume;
        Ok(())
    }

    fn start_object(&mut self) -> Result<()> {
        if self.pre_opened {
            self.pre_opened = false;
            return Ok(());
        }
        let resume = self.begin_value()?;
        self.expect_byte(b'{')?;
        self.push(resume, State::ObjectName)
    }

    fn read_field_name(&mut self) -> Result<String> {
        match self.state {
            State::ObjectName => {}
            State::ObjectComma => self.expect_byte(b',')?,
            _ => return Err(self.err("field name outside of an object")),
        }
        let name = self.string_token()?;
        self.state = State::ObjectColon;
        Ok(name)
    }

    fn end_object(&mut self) -> Result<()> {
        match self.state {
            State::ObjectName | State::ObjectComma => {
                self.expect_byte(b'}')?;
                self.pop()
            }
            _ => Err(self.err("end_object outside of an object")),
        }
    }

    fn start_array(&mut self) -> Result<()> {
        let resume = self.begin_value()?;
        self.expect_byte(b'[')?;
        self.push(resume, State::ArrayValue)
    }

    fn end_array(&mut self) -> Result<()> {
        match self.state {
            State::ArrayValue | State::ArrayComma => {
                self.expect_byte(b']')?;
                self.pop()
            }
            _ => Err(self.err("end_array outside of an array")),
        }
    }

    fn skip_value(&mut self) -> Result<()> {
        let resume = self.begin_value()?;
        match self.peek_byte() {
            Some(b'{' | b'[') => self.skip_nested()?,
            Some(b'"') => {
                self.scan_string()?;
            }
            Some(b't') => self.literal("true")?,
            Some(b'f') => self.literal("false")?,
            Some(b'n') => self.literal("null")?,
            Some(b'-' | b'0'..=b'9') => {
                self.number_token()?;
            }
            Some(b) => return Err(self.err(format!("unexpected character '{}'", b as char))),
            None => return Err(self.err("expected value, found end of input")),
        }
        self.state = resume;
        Ok(())
    }

    fn peek_type_tag(&mut self, field: &str) -> Result<Option<String>> {
        if self.current_event()? != EventKind::StartObject || self.pre_opened {
            return Ok(None);
        }
        let (save_pos, save_state) = (self.pos, self.state);
        let resume = self.begin_value()?;
        self.expect_byte(b'{')?;
        if self.peek_byte() == Some(b'"') {
            let name = self.string_token()?;
            if name == field && self.peek_byte() == Some(b':') {
                self.pos += 1;
                if self.peek_byte() == Some(b'"') {
                    let tag = self.string_token()?;
                    self.push(resume, State::ObjectComma)?;
                    self.pre_opened = true;
                    return Ok(Some(tag));
                }
            }
        }
        self.pos = save_pos;
        self.state = save_state;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_object_and_array() {
        let mut r = JsonReader::new(r#" {"a": [1, 2], "b": "x\ny"} "#);
        assert_eq!(r.current_event().unwrap(), EventKind::StartObject);
        r.start_object().unwrap();
        assert_eq!(r.current_event().unwrap(), EventKind::FieldName);
        assert_eq!(r.read_field_name().unwrap(), "a");
        assert_eq!(r.current_event().unwrap(), EventKind::StartArray);
        r.start_array().unwrap();
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.current_event().unwrap(), EventKind::Number);
        assert_eq!(r.read_i64().unwrap(), 2);
        assert_eq!(r.current_event().unwrap(), EventKind::EndArray);
        r.end_array().unwrap();
        assert_eq!(r.read_field_name().unwrap(), "b");
        assert_eq!(r.read_string().unwrap(), "x\ny");
        assert_eq!(r.current_event().unwrap(), EventKind::EndObject);
        r.end_object().unwrap();
        assert!(!r.not_eof().unwrap());
    }

    #[test]
    fn test_skip_value_discards_nested_structure() {
        let mut r = JsonReader::new(r#"{"junk": {"x": [1, {"y": "]"}], "z": null}, "keep": 5}"#);
        r.start_object().unwrap();
        assert_eq!(r.read_field_name().unwrap(), "junk");
        r.skip_value().unwrap();
        assert_eq!(r.read_field_name().unwrap(), "keep");
        assert_eq!(r.read_i32().unwrap(), 5);
        r.end_object().unwrap();
    }

    #[test]
    fn test_peek_type_tag_pre_opens_object() {
        let mut r = JsonReader::new(r#"{"@type": "shapes::Circle", "r": 2.5}"#);
        assert_eq!(
            r.peek_type_tag("@type").unwrap().as_deref(),
            Some("shapes::Circle")
        );
        assert_eq!(r.current_event().unwrap(), EventKind::StartObject);
        r.start_object().unwrap();
        assert_eq!(r.read_field_name().unwrap(), "r");
        assert_eq!(r.read_f64().unwrap(), 2.5);
        r.end_object().unwrap();
    }

    #[test]
    fn test_peek_type_tag_absent_restores_position() {
        let mut r = JsonReader::new(r#"{"r": 2.5}"#);
        assert!(r.peek_type_tag("@type").unwrap().is_none());
        r.start_object().unwrap();
        assert_eq!(r.read_field_name().unwrap(), "r");
    }

    #[test]
    fn test_out_of_range_integer_is_malformed() {
        let mut r = JsonReader::new("300");
        assert!(matches!(r.read_i8(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_max_depth() {
        let mut r = JsonReader::new("[[[1]]]").with_max_depth(2);
        r.start_array().unwrap();
        r.start_array().unwrap();
        assert!(r.start_array().is_err());
    }

    #[test]
    fn test_missing_comma_is_rejected() {
        let mut r = JsonReader::new("[1 2]");
        r.start_array().unwrap();
        r.read_i32().unwrap();
        assert!(r.current_event().is_err());
    }
}
