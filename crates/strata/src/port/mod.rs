// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Format adapter port.
//!
//! The minimal primitive read/write and structural-marker contract every
//! wire format implements. Codecs only ever talk to `dyn Input` /
//! `dyn Output`, so one derived codec serves every backend.
//!
//! Two backends ship with the crate:
//!
//! - [`json`]: pull-based text token reader/writer over a JSON-like grammar
//! - [`binary`]: self-describing marker-byte stream over `io::Read`/`io::Write`
//!
//! # Structural protocol
//!
//! ```text
//! object : start_object (write_field value)* end_object
//! array  : start_array value* end_array
//! tagged : write_type_tag object          (tag becomes the object's first field)
//! ```
//!
//! Readers loop on [`Input::current_event`] until they observe
//! [`EventKind::EndObject`] / [`EventKind::EndArray`].

pub mod binary;
pub mod json;

use crate::error::{Error, Result};

/// Kind of the next event an [`Input`] will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Null,
    Bool,
    Number,
    String,
    StartObject,
    FieldName,
    EndObject,
    StartArray,
    EndArray,
    Eof,
}

/// Write side of a format adapter.
pub trait Output {
    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_i8(&mut self, value: i8) -> Result<()>;
    fn write_char(&mut self, value: char) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_f32(&mut self, value: f32) -> Result<()>;
    fn write_f64(&mut self, value: f64) -> Result<()>;
    fn write_str(&mut self, value: &str) -> Result<()>;

    /// Full-range unsigned 64-bit extension.
    fn write_u64(&mut self, _value: u64) -> Result<()> {
        Err(Error::NotSupported("Output::write_u64"))
    }

    /// Null sentinel.
    fn write_null(&mut self) -> Result<()>;

    fn start_object(&mut self) -> Result<()>;
    fn write_field(&mut self, name: &str) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn start_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;

    /// Dynamic-type hook: attach a discriminator tag to the object opened by
    /// the next `start_object`.
    fn write_type_tag(&mut self, _field: &str, _tag: &str) -> Result<()> {
        Err(Error::NotSupported("Output::write_type_tag"))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Read side of a format adapter.
pub trait Input {
    /// True while at least one more top-level event is available.
    fn not_eof(&mut self) -> Result<bool>;

    /// Peek the kind of the next event without consuming it.
    fn current_event(&mut self) -> Result<EventKind>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_i8(&mut self) -> Result<i8>;
    fn read_char(&mut self) -> Result<char>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_f64(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;

    fn read_u64(&mut self) -> Result<u64> {
        Err(Error::NotSupported("Input::read_u64"))
    }

    /// Consume the null sentinel.
    fn read_null(&mut self) -> Result<()>;

    fn start_object(&mut self) -> Result<()>;
    fn read_field_name(&mut self) -> Result<String>;
    fn end_object(&mut self) -> Result<()>;
    fn start_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;

    /// Skip one whole value (scalar, object or array) without materializing
    /// it.
    fn skip_value(&mut self) -> Result<()>;

    /// Dynamic-type hook: if the next value carries a discriminator tag named
    /// `field`, consume the tag and return it. The object it was attached to
    /// is still opened by the following `start_object`.
    fn peek_type_tag(&mut self, _field: &str) -> Result<Option<String>> {
        Err(Error::NotSupported("Input::peek_type_tag"))
    }
}
