// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf codecs: primitives, strings, unit enums.
//!
//! Unsigned types travel in the next wider signed slot of the port
//! (`u8` as `i16`, `u16` as `i32`, `u32` as `i64`); `u64`/`usize` use the
//! full-range `u64` extension.

use super::StructuralCodec;
use crate::error::{Error, Result};
use crate::port::{Input, Output};
use crate::reflect::{downcast_ref, EnumOps, NumericKind, PrimitiveKind, Scalar};
use crate::registry::Registry;
use std::any::Any;
use std::sync::Arc;

pub fn write_scalar(out: &mut dyn Output, value: Scalar) -> Result<()> {
    match value {
        Scalar::Bool(v) => out.write_bool(v),
        Scalar::Char(v) => out.write_char(v),
        Scalar::I8(v) => out.write_i8(v),
        Scalar::I16(v) => out.write_i16(v),
        Scalar::I32(v) => out.write_i32(v),
        Scalar::I64(v) => out.write_i64(v),
        Scalar::U8(v) => out.write_i16(i16::from(v)),
        Scalar::U16(v) => out.write_i32(i32::from(v)),
        Scalar::U32(v) => out.write_i64(i64::from(v)),
        Scalar::U64(v) => out.write_u64(v),
        Scalar::Usize(v) => out.write_u64(v as u64),
        Scalar::Isize(v) => out.write_i64(v as i64),
        Scalar::F32(v) => out.write_f32(v),
        Scalar::F64(v) => out.write_f64(v),
    }
}

fn narrow<W: std::fmt::Display + Copy, N: TryFrom<W>>(wide: W, what: &str) -> Result<N> {
    N::try_from(wide).map_err(|_| Error::validation(format!("{} is out of range for {}", wide, what)))
}

pub fn read_scalar(input: &mut dyn Input, kind: PrimitiveKind) -> Result<Scalar> {
    let numeric = match kind {
        PrimitiveKind::Bool => return input.read_bool().map(Scalar::Bool),
        PrimitiveKind::Char => return input.read_char().map(Scalar::Char),
        PrimitiveKind::Numeric(n) => n,
    };
    Ok(match numeric {
        NumericKind::I8 => Scalar::I8(input.read_i8()?),
        NumericKind::I16 => Scalar::I16(input.read_i16()?),
        NumericKind::I32 => Scalar::I32(input.read_i32()?),
        NumericKind::I64 => Scalar::I64(input.read_i64()?),
        NumericKind::U8 => Scalar::U8(narrow(input.read_i16()?, "u8")?),
        NumericKind::U16 => Scalar::U16(narrow(input.read_i32()?, "u16")?),
        NumericKind::U32 => Scalar::U32(narrow(input.read_i64()?, "u32")?),
        NumericKind::U64 => Scalar::U64(input.read_u64()?),
        NumericKind::Usize => Scalar::Usize(narrow(input.read_u64()?, "usize")?),
        NumericKind::Isize => Scalar::Isize(narrow(input.read_i64()?, "isize")?),
        NumericKind::F32 => Scalar::F32(input.read_f32()?),
        NumericKind::F64 => Scalar::F64(input.read_f64()?),
    })
}

pub(crate) struct PrimitiveCodec {
    kind: PrimitiveKind,
}

impl PrimitiveCodec {
    pub(crate) fn new(kind: PrimitiveKind) -> Self {
        Self { kind }
    }
}

impl StructuralCodec for PrimitiveCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, _registry: &Registry) -> Result<()> {
        write_scalar(out, Scalar::from_any(self.kind, value)?)
    }

    fn decode(&self, input: &mut dyn Input, _registry: &Registry) -> Result<Box<dyn Any>> {
        read_scalar(input, self.kind).map(Scalar::into_any)
    }
}

pub(crate) struct StringCodec;

impl StructuralCodec for StringCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, _registry: &Registry) -> Result<()> {
        out.write_str(downcast_ref::<String>(value)?)
    }

    fn decode(&self, input: &mut dyn Input, _registry: &Registry) -> Result<Box<dyn Any>> {
        Ok(Box::new(input.read_string()?))
    }
}

/// Unit enums, encoded by variant name.
pub(crate) struct EnumCodec {
    type_name: &'static str,
    variants: Vec<&'static str>,
    ops: Arc<dyn EnumOps>,
}

impl EnumCodec {
    pub(crate) fn new(
        type_name: &'static str,
        variants: Vec<&'static str>,
        ops: Arc<dyn EnumOps>,
    ) -> Self {
        Self {
            type_name,
            variants,
            ops,
        }
    }
}

impl StructuralCodec for EnumCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, _registry: &Registry) -> Result<()> {
        let ordinal = self.ops.ordinal(value)?;
        let name = self.variants.get(ordinal).ok_or_else(|| {
            Error::validation(format!(
                "ordinal {} out of range for {}",
                ordinal, self.type_name
            ))
        })?;
        out.write_str(name)
    }

    fn decode(&self, input: &mut dyn Input, _registry: &Registry) -> Result<Box<dyn Any>> {
        let name = input.read_string()?;
        let ordinal = self
            .variants
            .iter()
            .position(|v| *v == name)
            .ok_or_else(|| {
                Error::validation(format!("'{}' is not a variant of {}", name, self.type_name))
            })?;
        self.ops.from_ordinal(ordinal)
    }
}
