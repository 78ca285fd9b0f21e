// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON-like text backend.
//!
//! # Example
//!
//! ```rust
//! use strata::{json, Reflect, Registry};
//!
//! #[derive(Reflect, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let registry = Registry::default();
//! let text = json::to_string(&registry, &Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, r#"{"x":1,"y":2}"#);
//! let back: Point = json::from_str(&registry, &text).unwrap();
//! assert_eq!(back, Point { x: 1, y: 2 });
//! ```

mod reader;
mod writer;

pub use reader::{JsonReader, DEFAULT_MAX_DEPTH};
pub use writer::JsonWriter;

use crate::error::{Error, Result};
use crate::port::Input;
use crate::reflect::Reflect;
use crate::registry::Registry;

/// Encode `value` as JSON text.
pub fn to_string<T: Reflect>(registry: &Registry, value: &T) -> Result<String> {
    let mut writer = JsonWriter::new(Vec::new());
    registry.encode(value, &mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::malformed(0, e.to_string()))
}

/// Decode one value; trailing non-whitespace input is malformed.
pub fn from_str<T: Reflect>(registry: &Registry, text: &str) -> Result<T> {
    let mut reader = JsonReader::new(text);
    let value = registry.decode::<T>(&mut reader)?;
    if reader.not_eof()? {
        return Err(Error::malformed(reader.offset(), "trailing characters"));
    }
    Ok(value)
}
