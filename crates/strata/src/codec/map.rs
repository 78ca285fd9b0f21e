// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Map codec.
//!
//! String keys encode as an object keyed by the string:
//!
//! ```text
//! {"a": 1, "b": 2}
//! ```
//!
//! Any other key type encodes as an array of entry objects, using the
//! configured key/value field names:
//!
//! ```text
//! [{"key": 1, "value": "x"}, {"key": 2, "value": "y"}]
//! ```

use super::{require, ErasedCodec, StructuralCodec};
use crate::error::{Error, Result};
use crate::port::{EventKind, Input, Output};
use crate::reflect::{downcast_ref, MapBuilder, MapOps};
use crate::registry::Registry;
use std::any::Any;
use std::sync::Arc;

pub(crate) struct MapCodec {
    type_name: &'static str,
    key: Arc<dyn ErasedCodec>,
    value: Arc<dyn ErasedCodec>,
    ops: Arc<dyn MapOps>,
    string_keys: bool,
}

impl MapCodec {
    pub(crate) fn new(
        type_name: &'static str,
        key: Arc<dyn ErasedCodec>,
        value: Arc<dyn ErasedCodec>,
        ops: Arc<dyn MapOps>,
        string_keys: bool,
    ) -> Self {
        Self {
            type_name,
            key,
            value,
            ops,
            string_keys,
        }
    }

    fn insert(&self, builder: &mut dyn MapBuilder, k: Box<dyn Any>, v: Box<dyn Any>) -> Result<()> {
        if builder.insert(k, v)? {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "duplicate key in {}",
                self.type_name
            )))
        }
    }

    fn decode_keyed_object(
        &self,
        input: &mut dyn Input,
        registry: &Registry,
        builder: &mut dyn MapBuilder,
    ) -> Result<()> {
        input.start_object()?;
        while !matches!(
            input.current_event()?,
            EventKind::EndObject | EventKind::Eof
        ) {
            let key = input.read_field_name()?;
            let value = require(self.value.decode(input, registry)?, "map value")?;
            self.insert(builder, Box::new(key), value)?;
        }
        input.end_object()
    }

    fn decode_entry(
        &self,
        input: &mut dyn Input,
        registry: &Registry,
        builder: &mut dyn MapBuilder,
    ) -> Result<()> {
        let config = registry.config();
        let mut key = None;
        let mut value = None;
        input.start_object()?;
        while !matches!(
            input.current_event()?,
            EventKind::EndObject | EventKind::Eof
        ) {
            let field = input.read_field_name()?;
            let slot = if field == config.key_field_name {
                &mut key
            } else if field == config.value_field_name {
                &mut value
            } else if config.fail_on_unrecognised_fields {
                return Err(Error::validation(format!(
                    "unrecognised field '{}' in entry of {}",
                    field, self.type_name
                )));
            } else {
                log::debug!("[MapCodec] skipping field '{}' in {}", field, self.type_name);
                input.skip_value()?;
                continue;
            };
            if slot.is_some() {
                return Err(Error::validation(format!(
                    "field '{}' repeated in entry of {}",
                    field, self.type_name
                )));
            }
            let codec = if field == config.key_field_name {
                &self.key
            } else {
                &self.value
            };
            *slot = Some(require(codec.decode(input, registry)?, "map entry part")?);
        }
        input.end_object()?;
        match (key, value) {
            (Some(k), Some(v)) => self.insert(builder, k, v),
            _ => Err(Error::validation(format!(
                "entry of {} needs both '{}' and '{}'",
                self.type_name, config.key_field_name, config.value_field_name
            ))),
        }
    }
}

impl StructuralCodec for MapCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        if self.string_keys {
            out.start_object()?;
            self.ops.for_each(value, &mut |k, v| {
                out.write_field(downcast_ref::<String>(k)?)?;
                self.value.encode(Some(v), out, registry)
            })?;
            return out.end_object();
        }
        let config = registry.config();
        out.start_array()?;
        self.ops.for_each(value, &mut |k, v| {
            out.start_object()?;
            out.write_field(&config.key_field_name)?;
            self.key.encode(Some(k), out, registry)?;
            out.write_field(&config.value_field_name)?;
            self.value.encode(Some(v), out, registry)?;
            out.end_object()
        })?;
        out.end_array()
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>> {
        let mut builder = self.ops.builder(0);
        if self.string_keys {
            self.decode_keyed_object(input, registry, builder.as_mut())?;
        } else {
            input.start_array()?;
            while !matches!(
                input.current_event()?,
                EventKind::EndArray | EventKind::Eof
            ) {
                self.decode_entry(input, registry, builder.as_mut())?;
            }
            input.end_array()?;
        }
        Ok(builder.finish())
    }

    fn is_object(&self) -> bool {
        self.string_keys
    }
}
