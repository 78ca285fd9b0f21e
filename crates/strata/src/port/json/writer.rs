// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming JSON-like text writer.

use super::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::port::Output;
use std::io::Write;

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// `first`: no field written yet; `awaiting`: a field name is waiting
    /// for its value.
    Object { first: bool, awaiting: bool },
    Array { first: bool },
}

/// [`Output`] producing compact JSON text.
///
/// Several top-level values are separated by a newline. Non-finite floats are
/// written as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
/// Nesting is capped at the reader's limit so output always reads back.
pub struct JsonWriter<W: Write> {
    out: W,
    stack: Vec<Frame>,
    max_depth: usize,
    pending_tag: Option<(String, String)>,
    top_level_values: usize,
    written: usize,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            pending_tag: None,
            top_level_values: 0,
            written: 0,
        }
    }

    /// Limit object/array nesting.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn check_depth(&self) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(Error::validation(format!(
                "value nests deeper than {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Return the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn quoted(&mut self, s: &str) -> Result<()> {
        let escaped = serde_json::to_string(s)
            .map_err(|e| Error::malformed(self.written, e.to_string()))?;
        self.raw(escaped.as_bytes())
    }

    /// Position the stream for a value: separators, pending field checks.
    fn before_value(&mut self) -> Result<()> {
        if self.pending_tag.is_some() {
            return Err(Error::malformed(
                self.written,
                "type tag must be followed by an object",
            ));
        }
        match self.stack.last_mut() {
            None => {
                if self.top_level_values > 0 {
                    self.raw(b"\n")?;
                }
                self.top_level_values += 1;
                Ok(())
            }
            Some(Frame::Array { first }) => {
                let needs_comma = !*first;
                *first = false;
                if needs_comma {
                    self.raw(b",")?;
                }
                Ok(())
            }
            Some(Frame::Object { awaiting, .. }) => {
                if !*awaiting {
                    return Err(Error::malformed(
                        self.written,
                        "object value written without a field name",
                    ));
                }
                *awaiting = false;
                Ok(())
            }
        }
    }

    fn scalar(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        self.raw(text.as_bytes())
    }

    fn float(&mut self, value: f64, text: String) -> Result<()> {
        if value.is_finite() {
            self.scalar(&text)
        } else if value.is_nan() {
            self.write_str("NaN")
        } else if value > 0.0 {
            self.write_str("Infinity")
        } else {
            self.write_str("-Infinity")
        }
    }
}

impl<W: Write> Output for JsonWriter<W> {
    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.scalar(if value { "true" } else { "false" })
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.scalar(&value.to_string())
    }

    fn write_char(&mut self, value: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(value.encode_utf8(&mut buf))
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.scalar(&value.to_string())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.scalar(&value.to_string())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.scalar(&value.to_string())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.scalar(&value.to_string())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.float(f64::from(value), value.to_string())
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.float(value, value.to_string())
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.before_value()?;
        self.quoted(value)
    }

    fn write_null(&mut self) -> Result<()> {
        self.scalar("null")
    }

    fn start_object(&mut self) -> Result<()> {
        self.check_depth()?;
        let tag = self.pending_tag.take();
        self.before_value()?;
        self.raw(b"{")?;
        let mut first = true;
        if let Some((field, tag)) = tag {
            self.quoted(&field)?;
            self.raw(b":")?;
            self.quoted(&tag)?;
            first = false;
        }
        self.stack.push(Frame::Object {
            first,
            awaiting: false,
        });
        Ok(())
    }

    fn write_field(&mut self, name: &str) -> Result<()> {
        let needs_comma = match self.stack.last_mut() {
            Some(Frame::Object { first, awaiting }) if !*awaiting => {
                let needs_comma = !*first;
                *first = false;
                *awaiting = true;
                needs_comma
            }
            _ => {
                return Err(Error::malformed(
                    self.written,
                    "field name outside of an object",
                ))
            }
        };
        if needs_comma {
            self.raw(b",")?;
        }
        self.quoted(name)?;
        self.raw(b":")
    }

    fn end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object {
                awaiting: false, ..
            }) => self.raw(b"}"),
            _ => Err(Error::malformed(self.written, "unbalanced end_object")),
        }
    }

    fn start_array(&mut self) -> Result<()> {
        self.check_depth()?;
        self.before_value()?;
        self.raw(b"[")?;
        self.stack.push(Frame::Array { first: true });
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { .. }) => self.raw(b"]"),
            _ => Err(Error::malformed(self.written, "unbalanced end_array")),
        }
    }

    fn write_type_tag(&mut self, field: &str, tag: &str) -> Result<()> {
        self.pending_tag = Some((field.to_string(), tag.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut JsonWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut writer = JsonWriter::new(Vec::new());
        f(&mut writer).expect("write");
        String::from_utf8(writer.into_inner()).expect("utf8")
    }

    #[test]
    fn test_nested_structure() {
        let text = render(|w| {
            w.start_object()?;
            w.write_field("id")?;
            w.write_i32(7)?;
            w.write_field("tags")?;
            w.start_array()?;
            w.write_str("a\"b")?;
            w.write_null()?;
            w.end_array()?;
            w.end_object()
        });
        assert_eq!(text, r#"{"id":7,"tags":["a\"b",null]}"#);
    }

    #[test]
    fn test_type_tag_becomes_first_field() {
        let text = render(|w| {
            w.write_type_tag("@type", "shapes::Circle")?;
            w.start_object()?;
            w.write_field("r")?;
            w.write_f64(1.5)?;
            w.end_object()
        });
        assert_eq!(text, r#"{"@type":"shapes::Circle","r":1.5}"#);
    }

    #[test]
    fn test_non_finite_floats_are_strings() {
        let text = render(|w| {
            w.start_array()?;
            w.write_f64(f64::NAN)?;
            w.write_f32(f32::NEG_INFINITY)?;
            w.end_array()
        });
        assert_eq!(text, r#"["NaN","-Infinity"]"#);
    }

    #[test]
    fn test_value_without_field_is_rejected() {
        let mut writer = JsonWriter::new(Vec::new());
        writer.start_object().expect("start");
        assert!(writer.write_i32(1).is_err());
    }

    #[test]
    fn test_max_depth() {
        let mut writer = JsonWriter::new(Vec::new()).with_max_depth(2);
        writer.start_array().expect("first");
        writer.start_array().expect("second");
        let err = writer.start_object().unwrap_err();
        assert!(err.is_validation(), "{err}");
    }

    #[test]
    fn test_top_level_values_are_newline_separated() {
        let text = render(|w| {
            w.write_i64(1)?;
            w.write_bool(false)
        });
        assert_eq!(text, "1\nfalse");
    }
}
