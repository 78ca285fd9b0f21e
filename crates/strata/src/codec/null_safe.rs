// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Null handling around structural codecs.

use super::{ErasedCodec, StructuralCodec};
use crate::error::Result;
use crate::port::{EventKind, Input, Output};
use crate::reflect::{OptionalOps, PointerOps};
use crate::registry::Registry;
use std::any::Any;
use std::sync::Arc;

/// Lifts a [`StructuralCodec`] into the nullable contract: null is written
/// and recognised here, the inner codec only ever sees present values.
pub struct NullSafe<C> {
    inner: C,
}

impl<C: StructuralCodec> NullSafe<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: StructuralCodec> ErasedCodec for NullSafe<C> {
    fn encode(
        &self,
        value: Option<&dyn Any>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()> {
        match value {
            Some(value) => self.inner.encode(value, out, registry),
            None => out.write_null(),
        }
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<Box<dyn Any>>> {
        if input.current_event()? == EventKind::Null {
            input.read_null()?;
            return Ok(None);
        }
        self.inner.decode(input, registry).map(Some)
    }

    fn is_object(&self) -> bool {
        self.inner.is_object()
    }
}

/// `Option<T>`: `None` maps to the inner codec's null.
pub(crate) struct OptionalCodec {
    inner: Arc<dyn ErasedCodec>,
    ops: Arc<dyn OptionalOps>,
}

impl OptionalCodec {
    pub(crate) fn new(inner: Arc<dyn ErasedCodec>, ops: Arc<dyn OptionalOps>) -> Self {
        Self { inner, ops }
    }
}

impl ErasedCodec for OptionalCodec {
    fn encode(
        &self,
        value: Option<&dyn Any>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()> {
        match value {
            Some(value) => self.inner.encode(self.ops.project(value)?, out, registry),
            None => out.write_null(),
        }
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<Box<dyn Any>>> {
        let inner = self.inner.decode(input, registry)?;
        self.ops.wrap(inner).map(Some)
    }
}

/// `Box<T>` / `Arc<T>`: encoded exactly like `T`.
pub(crate) struct PointerCodec {
    inner: Arc<dyn ErasedCodec>,
    ops: Arc<dyn PointerOps>,
}

impl PointerCodec {
    pub(crate) fn new(inner: Arc<dyn ErasedCodec>, ops: Arc<dyn PointerOps>) -> Self {
        Self { inner, ops }
    }
}

impl ErasedCodec for PointerCodec {
    fn encode(
        &self,
        value: Option<&dyn Any>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()> {
        let target = match value {
            Some(value) => Some(self.ops.deref(value)?),
            None => None,
        };
        self.inner.encode(target, out, registry)
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<Box<dyn Any>>> {
        match self.inner.decode(input, registry)? {
            Some(value) => self.ops.wrap(value).map(Some),
            None => Ok(None),
        }
    }

    fn is_object(&self) -> bool {
        self.inner.is_object()
    }
}
