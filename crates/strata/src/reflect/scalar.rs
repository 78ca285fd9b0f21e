// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Unboxed primitive values.

use super::{NumericKind, PrimitiveKind};
use crate::error::{Error, Result};
use std::any::Any;

/// A primitive value carried without a `Box<dyn Any>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    Isize(isize),
    F32(f32),
    F64(f64),
}

/// Move `value` into `B` when both are the same type.
fn cast<A: Any, B: Any>(value: A) -> Option<B> {
    let mut slot = Some(value);
    (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<B>>()
        .and_then(Option::take)
}

macro_rules! scalar_dispatch {
    ($value:expr, $bind:ident => $body:expr) => {
        match $value {
            Scalar::Bool($bind) => $body,
            Scalar::Char($bind) => $body,
            Scalar::I8($bind) => $body,
            Scalar::I16($bind) => $body,
            Scalar::I32($bind) => $body,
            Scalar::I64($bind) => $body,
            Scalar::U8($bind) => $body,
            Scalar::U16($bind) => $body,
            Scalar::U32($bind) => $body,
            Scalar::U64($bind) => $body,
            Scalar::Usize($bind) => $body,
            Scalar::Isize($bind) => $body,
            Scalar::F32($bind) => $body,
            Scalar::F64($bind) => $body,
        }
    };
}

impl Scalar {
    /// Read a primitive of `kind` out of an erased reference.
    pub fn from_any(kind: PrimitiveKind, value: &dyn Any) -> Result<Self> {
        fn get<T: Any + Copy>(value: &dyn Any) -> Result<T> {
            super::downcast_ref::<T>(value).copied()
        }
        Ok(match kind {
            PrimitiveKind::Bool => Scalar::Bool(get(value)?),
            PrimitiveKind::Char => Scalar::Char(get(value)?),
            PrimitiveKind::Numeric(n) => match n {
                NumericKind::I8 => Scalar::I8(get(value)?),
                NumericKind::I16 => Scalar::I16(get(value)?),
                NumericKind::I32 => Scalar::I32(get(value)?),
                NumericKind::I64 => Scalar::I64(get(value)?),
                NumericKind::U8 => Scalar::U8(get(value)?),
                NumericKind::U16 => Scalar::U16(get(value)?),
                NumericKind::U32 => Scalar::U32(get(value)?),
                NumericKind::U64 => Scalar::U64(get(value)?),
                NumericKind::Usize => Scalar::Usize(get(value)?),
                NumericKind::Isize => Scalar::Isize(get(value)?),
                NumericKind::F32 => Scalar::F32(get(value)?),
                NumericKind::F64 => Scalar::F64(get(value)?),
            },
        })
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Scalar::Bool(_) => PrimitiveKind::Bool,
            Scalar::Char(_) => PrimitiveKind::Char,
            Scalar::I8(_) => PrimitiveKind::Numeric(NumericKind::I8),
            Scalar::I16(_) => PrimitiveKind::Numeric(NumericKind::I16),
            Scalar::I32(_) => PrimitiveKind::Numeric(NumericKind::I32),
            Scalar::I64(_) => PrimitiveKind::Numeric(NumericKind::I64),
            Scalar::U8(_) => PrimitiveKind::Numeric(NumericKind::U8),
            Scalar::U16(_) => PrimitiveKind::Numeric(NumericKind::U16),
            Scalar::U32(_) => PrimitiveKind::Numeric(NumericKind::U32),
            Scalar::U64(_) => PrimitiveKind::Numeric(NumericKind::U64),
            Scalar::Usize(_) => PrimitiveKind::Numeric(NumericKind::Usize),
            Scalar::Isize(_) => PrimitiveKind::Numeric(NumericKind::Isize),
            Scalar::F32(_) => PrimitiveKind::Numeric(NumericKind::F32),
            Scalar::F64(_) => PrimitiveKind::Numeric(NumericKind::F64),
        }
    }

    pub fn into_any(self) -> Box<dyn Any> {
        scalar_dispatch!(self, v => Box::new(v) as Box<dyn Any>)
    }

    /// The value as `T`, when `T` is its exact type.
    pub fn cast<T: Any>(self) -> Option<T> {
        scalar_dispatch!(self, v => cast::<_, T>(v))
    }

    /// Like [`Scalar::cast`], with a `Validation` error on mismatch.
    pub fn expect<T: Any>(self) -> Result<T> {
        self.cast::<T>().ok_or_else(|| {
            Error::validation(format!(
                "{:?} is not a {}",
                self.kind(),
                std::any::type_name::<T>()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_exact_type_only() {
        assert_eq!(Scalar::I32(7).cast::<i32>(), Some(7));
        assert_eq!(Scalar::I32(7).cast::<i64>(), None);
        assert!(Scalar::Bool(true).expect::<u8>().is_err());
    }

    #[test]
    fn test_from_any_and_back() {
        let v = 3.5f64;
        let s = Scalar::from_any(PrimitiveKind::Numeric(NumericKind::F64), &v).unwrap();
        assert_eq!(s, Scalar::F64(3.5));
        let boxed = s.into_any();
        assert_eq!(boxed.downcast_ref::<f64>(), Some(&3.5));
        assert!(Scalar::from_any(PrimitiveKind::Char, &v).is_err());
    }
}
