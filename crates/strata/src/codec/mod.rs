// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec contracts and the derived codec family.
//!
//! Two layers:
//!
//! - [`StructuralCodec`]: encodes/decodes a value that is known to be
//!   present. Derived codecs for objects, collections, maps, enums and leaves
//!   implement it.
//! - [`ErasedCodec`]: the nullable contract every cached codec exposes.
//!   [`NullSafe`] lifts a structural codec into it; `Option`/pointer adapters
//!   implement it directly.
//!
//! [`Codec<T>`] is the typed handle handed out by the registry.

mod collection;
mod dynamic;
mod map;
mod null_safe;
mod object;
mod primitive;
mod proxy;

pub use null_safe::NullSafe;
pub use primitive::{read_scalar, write_scalar};

pub(crate) use collection::{PrimitiveArrayCodec, SequenceCodec};
pub(crate) use dynamic::DynamicCodec;
pub(crate) use map::MapCodec;
pub(crate) use null_safe::{OptionalCodec, PointerCodec};
pub(crate) use object::{FieldCodec, ObjectCodec};
pub(crate) use primitive::{EnumCodec, PrimitiveCodec, StringCodec};
pub(crate) use proxy::{StringProxyCodec, UserCodec};

use crate::error::{Error, Result};
use crate::port::{Input, Output};
use crate::reflect::{downcast_box, Reflect};
use crate::registry::Registry;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Codec for a value that is present.
pub trait StructuralCodec: Send + Sync {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()>;
    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>>;

    /// Values are written as one object (a discriminator tag can be attached).
    fn is_object(&self) -> bool {
        false
    }
}

/// Nullable, type-erased codec.
pub trait ErasedCodec: Send + Sync {
    /// `None` encodes the format's null sentinel.
    fn encode(
        &self,
        value: Option<&dyn Any>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()>;

    /// `None` when the encoded value was null.
    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<Box<dyn Any>>>;

    fn is_object(&self) -> bool {
        false
    }
}

/// User-supplied codec for `T`, registered with
/// [`Registry::register_codec`]. Null handling is added by the registry.
pub trait CustomCodec<T>: Send + Sync {
    fn encode(&self, value: &T, out: &mut dyn Output, registry: &Registry) -> Result<()>;
    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<T>;
}

/// A decoded value that must not be null.
pub(crate) fn require(value: Option<Box<dyn Any>>, what: &str) -> Result<Box<dyn Any>> {
    value.ok_or_else(|| Error::validation(format!("null is not a valid {}", what)))
}

/// Typed handle over a cached codec.
pub struct Codec<T> {
    inner: Arc<dyn ErasedCodec>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _type: PhantomData,
        }
    }
}

impl<T: Reflect> Codec<T> {
    pub(crate) fn new(inner: Arc<dyn ErasedCodec>) -> Self {
        Self {
            inner,
            _type: PhantomData,
        }
    }

    pub fn encode(&self, value: &T, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        self.inner.encode(Some(value as &dyn Any), out, registry)
    }

    pub fn encode_nullable(
        &self,
        value: Option<&T>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()> {
        self.inner.encode(value.map(|v| v as &dyn Any), out, registry)
    }

    pub fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<T> {
        let value = require(
            self.inner.decode(input, registry)?,
            std::any::type_name::<T>(),
        )?;
        downcast_box::<T>(value).map(|b| *b)
    }

    pub fn decode_nullable(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<T>> {
        match self.inner.decode(input, registry)? {
            Some(value) => downcast_box::<T>(value).map(|b| Some(*b)),
            None => Ok(None),
        }
    }

    pub fn erased(&self) -> &Arc<dyn ErasedCodec> {
        &self.inner
    }

    /// True when both handles share one cached codec.
    pub fn same_as(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}
