// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence codecs.

use super::primitive::{read_scalar, write_scalar};
use super::{require, ErasedCodec, StructuralCodec};
use crate::error::{Error, Result};
use crate::port::{EventKind, Input, Output};
use crate::reflect::{PrimitiveKind, Scalar, SequenceBuilder, SequenceOps};
use crate::registry::Registry;
use std::any::Any;
use std::sync::Arc;

/// Arrays and collections of boxed elements.
pub(crate) struct SequenceCodec {
    type_name: &'static str,
    elem: Arc<dyn ErasedCodec>,
    ops: Arc<dyn SequenceOps>,
    fixed_len: Option<usize>,
}

impl SequenceCodec {
    pub(crate) fn new(
        type_name: &'static str,
        elem: Arc<dyn ErasedCodec>,
        ops: Arc<dyn SequenceOps>,
        fixed_len: Option<usize>,
    ) -> Self {
        Self {
            type_name,
            elem,
            ops,
            fixed_len,
        }
    }
}

/// Shared decode loop: `next` reads one element into the builder.
fn decode_elements(
    type_name: &str,
    fixed_len: Option<usize>,
    input: &mut dyn Input,
    mut builder: Box<dyn SequenceBuilder>,
    mut next: impl FnMut(&mut dyn Input, &mut dyn SequenceBuilder) -> Result<bool>,
) -> Result<Box<dyn Any>> {
    input.start_array()?;
    let mut count = 0usize;
    while !matches!(
        input.current_event()?,
        EventKind::EndArray | EventKind::Eof
    ) {
        if let Some(len) = fixed_len {
            if count == len {
                return Err(Error::validation(format!(
                    "{} holds exactly {} elements",
                    type_name, len
                )));
            }
        }
        if !next(input, builder.as_mut())? {
            return Err(Error::validation(format!(
                "duplicate element in {}",
                type_name
            )));
        }
        count += 1;
    }
    input.end_array()?;
    builder.finish()
}

impl StructuralCodec for SequenceCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        out.start_array()?;
        self.ops
            .for_each(value, &mut |item| self.elem.encode(Some(item), out, registry))?;
        out.end_array()
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>> {
        let builder = self.ops.builder(self.fixed_len.unwrap_or(0));
        decode_elements(
            self.type_name,
            self.fixed_len,
            input,
            builder,
            |input, builder| {
                let item = require(self.elem.decode(input, registry)?, "sequence element")?;
                builder.push(item)
            },
        )
    }
}

/// Arrays of primitives: elements never go through `Box<dyn Any>`.
pub(crate) struct PrimitiveArrayCodec {
    type_name: &'static str,
    kind: PrimitiveKind,
    ops: Arc<dyn SequenceOps>,
    fixed_len: Option<usize>,
}

impl PrimitiveArrayCodec {
    pub(crate) fn new(
        type_name: &'static str,
        kind: PrimitiveKind,
        ops: Arc<dyn SequenceOps>,
        fixed_len: Option<usize>,
    ) -> Self {
        Self {
            type_name,
            kind,
            ops,
            fixed_len,
        }
    }
}

impl StructuralCodec for PrimitiveArrayCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, _registry: &Registry) -> Result<()> {
        out.start_array()?;
        self.ops.for_each(value, &mut |item| {
            write_scalar(out, Scalar::from_any(self.kind, item)?)
        })?;
        out.end_array()
    }

    fn decode(&self, input: &mut dyn Input, _registry: &Registry) -> Result<Box<dyn Any>> {
        let builder = self.ops.builder(self.fixed_len.unwrap_or(0));
        decode_elements(
            self.type_name,
            self.fixed_len,
            input,
            builder,
            |input, builder| builder.push_scalar(read_scalar(input, self.kind)?),
        )
    }
}
