// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Self-describing binary stream backend.
//!
//! Every value starts with a one-byte marker; payloads are little-endian,
//! strings are `u32` length-prefixed UTF-8.
//!
//! ```text
//! NULL | FALSE | TRUE                      no payload
//! I8 i8 | I16 i16 | I32 i32 | I64 i64      integers
//! U64 u64 | F32 f32 | F64 f64 | CHAR u32   scalars
//! STR len:u32 bytes                        string
//! OBJ (FIELD name value)* END_OBJ          object
//! ARR value* END_ARR                       array
//! TAG field tag OBJ ...                    tagged object
//! ```

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use crate::error::{Error, Result};
use crate::port::Input;
use crate::reflect::Reflect;
use crate::registry::Registry;

pub(crate) mod marker {
    pub const NULL: u8 = 0x00;
    pub const FALSE: u8 = 0x01;
    pub const TRUE: u8 = 0x02;
    pub const I8: u8 = 0x03;
    pub const CHAR: u8 = 0x04;
    pub const I16: u8 = 0x05;
    pub const I32: u8 = 0x06;
    pub const I64: u8 = 0x07;
    pub const U64: u8 = 0x08;
    pub const F32: u8 = 0x09;
    pub const F64: u8 = 0x0A;
    pub const STR: u8 = 0x0B;
    pub const OBJ: u8 = 0x10;
    pub const FIELD: u8 = 0x11;
    pub const END_OBJ: u8 = 0x12;
    pub const ARR: u8 = 0x13;
    pub const END_ARR: u8 = 0x14;
    pub const TAG: u8 = 0x15;
}

/// Encode `value` into a new buffer.
pub fn to_vec<T: Reflect>(registry: &Registry, value: &T) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(Vec::new());
    registry.encode(value, &mut writer)?;
    Ok(writer.into_inner())
}

/// Decode one value; trailing bytes are malformed.
pub fn from_slice<T: Reflect>(registry: &Registry, bytes: &[u8]) -> Result<T> {
    let mut reader = BinaryReader::new(bytes);
    let value = registry.decode::<T>(&mut reader)?;
    if reader.not_eof()? {
        return Err(Error::malformed(reader.offset(), "trailing bytes"));
    }
    Ok(value)
}
