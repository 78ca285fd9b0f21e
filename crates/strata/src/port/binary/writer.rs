// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marker-byte stream writer.

use super::marker;
use crate::error::{Error, Result};
use crate::port::json::DEFAULT_MAX_DEPTH;
use crate::port::Output;
use std::io::Write;

/// Generate marker + little-endian payload writers.
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $marker:expr) => {
        fn $name(&mut self, value: $type) -> Result<()> {
            self.put(&[$marker])?;
            self.put(&value.to_le_bytes())
        }
    };
}

/// [`Output`] over any `io::Write`.
pub struct BinaryWriter<W: Write> {
    out: W,
    written: usize,
    depth: usize,
    max_depth: usize,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit object/array nesting, matching the reader's.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bytes written so far.
    pub fn offset(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn open(&mut self, found: u8) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::validation(format!(
                "value nests deeper than {}",
                self.max_depth
            )));
        }
        self.depth += 1;
        self.put(&[found])
    }

    fn close(&mut self, found: u8) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.put(&[found])
    }

    fn put_string(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len()).map_err(|_| {
            Error::validation(format!(
                "string of {} bytes exceeds u32 length prefix",
                value.len()
            ))
        })?;
        self.put(&len.to_le_bytes())?;
        self.put(value.as_bytes())
    }
}

impl<W: Write> Output for BinaryWriter<W> {
    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.put(&[if value { marker::TRUE } else { marker::FALSE }])
    }

    impl_write_le!(write_i8, i8, marker::I8);
    impl_write_le!(write_i16, i16, marker::I16);
    impl_write_le!(write_i32, i32, marker::I32);
    impl_write_le!(write_i64, i64, marker::I64);
    impl_write_le!(write_u64, u64, marker::U64);
    impl_write_le!(write_f32, f32, marker::F32);
    impl_write_le!(write_f64, f64, marker::F64);

    fn write_char(&mut self, value: char) -> Result<()> {
        self.put(&[marker::CHAR])?;
        self.put(&u32::from(value).to_le_bytes())
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.put(&[marker::STR])?;
        self.put_string(value)
    }

    fn write_null(&mut self) -> Result<()> {
        self.put(&[marker::NULL])
    }

    fn start_object(&mut self) -> Result<()> {
        self.open(marker::OBJ)
    }

    fn write_field(&mut self, name: &str) -> Result<()> {
        self.put(&[marker::FIELD])?;
        self.put_string(name)
    }

    fn end_object(&mut self) -> Result<()> {
        self.close(marker::END_OBJ)
    }

    fn start_array(&mut self) -> Result<()> {
        self.open(marker::ARR)
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(marker::END_ARR)
    }

    fn write_type_tag(&mut self, field: &str, tag: &str) -> Result<()> {
        self.put(&[marker::TAG])?;
        self.put_string(field)?;
        self.put_string(tag)
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_layout() {
        let mut w = BinaryWriter::new(Vec::new());
        w.write_i32(0x0102_0304).unwrap();
        w.write_str("hi").unwrap();
        w.write_null().unwrap();
        assert_eq!(
            w.into_inner(),
            vec![
                marker::I32,
                0x04,
                0x03,
                0x02,
                0x01,
                marker::STR,
                2,
                0,
                0,
                0,
                b'h',
                b'i',
                marker::NULL
            ]
        );
    }

    #[test]
    fn test_max_depth() {
        let mut w = BinaryWriter::new(Vec::new()).with_max_depth(1);
        w.start_object().unwrap();
        assert!(w.start_array().unwrap_err().is_validation());
        w.end_object().unwrap();
        w.start_array().unwrap();
    }

    #[test]
    fn test_tagged_object_layout() {
        let mut w = BinaryWriter::new(Vec::new());
        w.write_type_tag("t", "A").unwrap();
        w.start_object().unwrap();
        w.end_object().unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes[0], marker::TAG);
        assert_eq!(&bytes[bytes.len() - 2..], &[marker::OBJ, marker::END_OBJ]);
    }
}
