// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marker-byte stream reader with a one-byte lookahead.

use super::marker;
use crate::error::{Error, Result};
use crate::port::json::DEFAULT_MAX_DEPTH;
use crate::port::{EventKind, Input};
use std::io::{ErrorKind, Read};

/// Generate little-endian scalar readers for a single exact marker.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $marker:expr) => {
        fn $name(&mut self) -> Result<$type> {
            self.expect($marker, stringify!($type))?;
            let mut buf = [0u8; std::mem::size_of::<$type>()];
            self.fill(&mut buf)?;
            Ok(<$type>::from_le_bytes(buf))
        }
    };
}

/// Generate integer readers accepting any integer marker that fits.
macro_rules! impl_read_int {
    ($name:ident, $type:ty) => {
        fn $name(&mut self) -> Result<$type> {
            let at = self.consumed;
            let wide = self.read_integer()?;
            <$type>::try_from(wide).map_err(|_| {
                Error::malformed(
                    at,
                    format!("integer {} out of range for {}", wide, stringify!($type)),
                )
            })
        }
    };
}

/// [`Input`] over any `io::Read`.
pub struct BinaryReader<R: Read> {
    src: R,
    peeked: Option<u8>,
    consumed: usize,
    depth: usize,
    max_depth: usize,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            peeked: None,
            consumed: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit object/array nesting.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bytes consumed so far (excluding the lookahead byte).
    pub fn offset(&self) -> usize {
        self.consumed
    }

    pub fn into_inner(self) -> R {
        self.src
    }

    fn peek_marker(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            let mut byte = [0u8; 1];
            loop {
                match self.src.read(&mut byte) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.peeked = Some(byte[0]);
                        break;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(Error::Io(e)),
                }
            }
        }
        Ok(self.peeked)
    }

    fn next_marker(&mut self) -> Result<u8> {
        let found = self
            .peek_marker()?
            .ok_or_else(|| Error::malformed(self.consumed, "unexpected end of stream"))?;
        self.peeked = None;
        self.consumed += 1;
        Ok(found)
    }

    fn expect(&mut self, wanted: u8, what: &str) -> Result<()> {
        let at = self.consumed;
        let found = self.next_marker()?;
        if found != wanted {
            return Err(Error::malformed(
                at,
                format!("expected {}, found marker 0x{:02x}", what, found),
            ));
        }
        Ok(())
    }

    /// Payload bytes; the lookahead is always empty here.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.src.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::malformed(
                self.consumed,
                "unexpected end of stream in payload",
            )),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn open(&mut self, wanted: u8, what: &str) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::malformed(
                self.consumed,
                format!("nesting deeper than {}", self.max_depth),
            ));
        }
        self.expect(wanted, what)?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, wanted: u8, what: &str) -> Result<()> {
        self.expect(wanted, what)?;
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn read_u32_payload(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// The length prefix is untrusted: the buffer grows with bytes received.
    fn string_payload(&mut self) -> Result<String> {
        let len = self.read_u32_payload()?;
        let at = self.consumed;
        let mut bytes = Vec::new();
        let read = (&mut self.src).take(u64::from(len)).read_to_end(&mut bytes)?;
        self.consumed += read;
        if read as u64 != u64::from(len) {
            return Err(Error::malformed(
                self.consumed,
                format!("string of {} bytes truncated after {}", len, read),
            ));
        }
        String::from_utf8(bytes).map_err(|e| Error::malformed(at, e.to_string()))
    }

    fn discard(&mut self, len: u64) -> Result<()> {
        let copied = std::io::copy(&mut (&mut self.src).take(len), &mut std::io::sink())?;
        if copied != len {
            return Err(Error::malformed(
                self.consumed,
                "unexpected end of stream in payload",
            ));
        }
        self.consumed += len as usize;
        Ok(())
    }

    fn discard_string(&mut self) -> Result<()> {
        let len = self.read_u32_payload()?;
        self.discard(u64::from(len))
    }

    /// Any integer marker, widened.
    fn read_integer(&mut self) -> Result<i128> {
        let at = self.consumed;
        let value = match self.next_marker()? {
            marker::I8 => {
                let mut buf = [0u8; 1];
                self.fill(&mut buf)?;
                i128::from(i8::from_le_bytes(buf))
            }
            marker::I16 => {
                let mut buf = [0u8; 2];
                self.fill(&mut buf)?;
                i128::from(i16::from_le_bytes(buf))
            }
            marker::I32 => {
                let mut buf = [0u8; 4];
                self.fill(&mut buf)?;
                i128::from(i32::from_le_bytes(buf))
            }
            marker::I64 => {
                let mut buf = [0u8; 8];
                self.fill(&mut buf)?;
                i128::from(i64::from_le_bytes(buf))
            }
            marker::U64 => {
                let mut buf = [0u8; 8];
                self.fill(&mut buf)?;
                i128::from(u64::from_le_bytes(buf))
            }
            other => {
                return Err(Error::malformed(
                    at,
                    format!("expected integer, found marker 0x{:02x}", other),
                ))
            }
        };
        Ok(value)
    }

    /// Size of the fixed payload following a scalar marker.
    fn scalar_payload_len(found: u8) -> Option<u64> {
        match found {
            marker::NULL | marker::FALSE | marker::TRUE => Some(0),
            marker::I8 => Some(1),
            marker::I16 => Some(2),
            marker::I32 | marker::F32 | marker::CHAR => Some(4),
            marker::I64 | marker::U64 | marker::F64 => Some(8),
            _ => None,
        }
    }
}

impl<R: Read> Input for BinaryReader<R> {
    fn not_eof(&mut self) -> Result<bool> {
        Ok(self.peek_marker()?.is_some())
    }

    fn current_event(&mut self) -> Result<EventKind> {
        let kind = match self.peek_marker()? {
            None => EventKind::Eof,
            Some(marker::NULL) => EventKind::Null,
            Some(marker::FALSE | marker::TRUE) => EventKind::Bool,
            Some(
                marker::I8
                | marker::I16
                | marker::I32
                | marker::I64
                | marker::U64
                | marker::F32
                | marker::F64,
            ) => EventKind::Number,
            Some(marker::STR | marker::CHAR) => EventKind::String,
            Some(marker::OBJ | marker::TAG) => EventKind::StartObject,
            Some(marker::FIELD) => EventKind::FieldName,
            Some(marker::END_OBJ) => EventKind::EndObject,
            Some(marker::ARR) => EventKind::StartArray,
            Some(marker::END_ARR) => EventKind::EndArray,
            Some(other) => {
                return Err(Error::malformed(
                    self.consumed,
                    format!("unknown marker 0x{:02x}", other),
                ))
            }
        };
        Ok(kind)
    }

    fn read_bool(&mut self) -> Result<bool> {
        let at = self.consumed;
        match self.next_marker()? {
            marker::TRUE => Ok(true),
            marker::FALSE => Ok(false),
            other => Err(Error::malformed(
                at,
                format!("expected bool, found marker 0x{:02x}", other),
            )),
        }
    }

    impl_read_int!(read_i8, i8);
    impl_read_int!(read_i16, i16);
    impl_read_int!(read_i32, i32);
    impl_read_int!(read_i64, i64);
    impl_read_int!(read_u64, u64);

    impl_read_le!(read_f32, f32, marker::F32);

    fn read_f64(&mut self) -> Result<f64> {
        let at = self.consumed;
        match self.next_marker()? {
            marker::F64 => {
                let mut buf = [0u8; 8];
                self.fill(&mut buf)?;
                Ok(f64::from_le_bytes(buf))
            }
            marker::F32 => {
                let mut buf = [0u8; 4];
                self.fill(&mut buf)?;
                Ok(f64::from(f32::from_le_bytes(buf)))
            }
            other => Err(Error::malformed(
                at,
                format!("expected f64, found marker 0x{:02x}", other),
            )),
        }
    }

    fn read_char(&mut self) -> Result<char> {
        self.expect(marker::CHAR, "char")?;
        let at = self.consumed;
        let code = self.read_u32_payload()?;
        char::from_u32(code)
            .ok_or_else(|| Error::malformed(at, format!("invalid char code point {:#x}", code)))
    }

    fn read_string(&mut self) -> Result<String> {
        self.expect(marker::STR, "string")?;
        self.string_payload()
    }

    fn read_null(&mut self) -> Result<()> {
        self.expect(marker::NULL, "null")
    }

    fn start_object(&mut self) -> Result<()> {
        self.open(marker::OBJ, "object")
    }

    fn read_field_name(&mut self) -> Result<String> {
        self.expect(marker::FIELD, "field name")?;
        self.string_payload()
    }

    fn end_object(&mut self) -> Result<()> {
        self.close(marker::END_OBJ, "end of object")
    }

    fn start_array(&mut self) -> Result<()> {
        self.open(marker::ARR, "array")
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(marker::END_ARR, "end of array")
    }

    fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let at = self.consumed;
            let found = self.next_marker()?;
            match found {
                marker::OBJ | marker::ARR => {
                    if self.depth + depth >= self.max_depth {
                        return Err(Error::malformed(
                            at,
                            format!("nesting deeper than {}", self.max_depth),
                        ));
                    }
                    depth += 1;
                }
                marker::END_OBJ | marker::END_ARR => {
                    if depth == 0 {
                        return Err(Error::malformed(at, "unbalanced end marker"));
                    }
                    depth -= 1;
                }
                marker::FIELD | marker::STR => self.discard_string()?,
                marker::TAG => {
                    // The tagged object follows; keep scanning.
                    self.discard_string()?;
                    self.discard_string()?;
                    continue;
                }
                other => match Self::scalar_payload_len(other) {
                    Some(len) => self.discard(len)?,
                    None => {
                        return Err(Error::malformed(
                            at,
                            format!("unknown marker 0x{:02x}", other),
                        ))
                    }
                },
            }
            if depth == 0 && found != marker::FIELD {
                return Ok(());
            }
        }
    }

    fn peek_type_tag(&mut self, field: &str) -> Result<Option<String>> {
        if self.peek_marker()? != Some(marker::TAG) {
            return Ok(None);
        }
        let at = self.consumed;
        self.next_marker()?;
        let name = self.string_payload()?;
        if name != field {
            return Err(Error::malformed(
                at,
                format!("type tag field '{}' where '{}' was expected", name, field),
            ));
        }
        self.string_payload().map(Some)
    }
}
