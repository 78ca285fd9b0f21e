// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Adapters for user-registered codecs.

use super::{CustomCodec, StructuralCodec};
use crate::error::Result;
use crate::port::{Input, Output};
use crate::reflect::downcast_ref;
use crate::registry::Registry;
use std::any::Any;
use std::marker::PhantomData;

/// Erases a typed [`CustomCodec`].
pub(crate) struct UserCodec<T, C> {
    codec: C,
    _type: PhantomData<fn() -> T>,
}

impl<T, C> UserCodec<T, C> {
    pub(crate) fn new(codec: C) -> Self {
        Self {
            codec,
            _type: PhantomData,
        }
    }
}

impl<T: Any, C: CustomCodec<T>> StructuralCodec for UserCodec<T, C> {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        self.codec.encode(downcast_ref::<T>(value)?, out, registry)
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>> {
        Ok(Box::new(self.codec.decode(input, registry)?))
    }
}

type ToText<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type FromText<T> = Box<dyn Fn(&str) -> Result<T> + Send + Sync>;

/// Encodes `T` as a single string.
pub(crate) struct StringProxyCodec<T> {
    to: ToText<T>,
    from: FromText<T>,
}

impl<T> StringProxyCodec<T> {
    pub(crate) fn new(to: ToText<T>, from: FromText<T>) -> Self {
        Self { to, from }
    }
}

impl<T: Any> StructuralCodec for StringProxyCodec<T> {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, _registry: &Registry) -> Result<()> {
        out.write_str(&(self.to)(downcast_ref::<T>(value)?))
    }

    fn decode(&self, input: &mut dyn Input, _registry: &Registry) -> Result<Box<dyn Any>> {
        let text = input.read_string()?;
        Ok(Box::new((self.from)(&text)?))
    }
}
