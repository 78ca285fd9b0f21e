// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic type resolution for `Box<dyn Trait>` values.
//!
//! Encoding inspects the runtime type behind the box and writes a
//! discriminator tag unless that type is the interface's default. Decoding
//! reads the tag, checks it against the allow-list, resolves it through the
//! registry and verifies the result implements the interface before any
//! value is built.
//!
//! ```text
//! {"@type": "shapes::Square", "side": 2.0}      object implementor
//! {"@type": "shapes::Label", "value": "text"}   non-object implementor
//! {"radius": 1.0}                               default implementor
//! ```

use super::{require, StructuralCodec};
use crate::error::{Error, Result};
use crate::port::{Input, Output};
use crate::reflect::TypeRef;
use crate::registry::Registry;
use crate::types::{Implementor, InterfaceDescriptor};
use std::any::Any;
use std::sync::Arc;

pub(crate) struct DynamicCodec {
    interface: Arc<InterfaceDescriptor>,
}

impl DynamicCodec {
    pub(crate) fn new(interface: Arc<InterfaceDescriptor>) -> Self {
        Self { interface }
    }

    fn runtime_implementor(&self, concrete: &dyn Any) -> Result<&Implementor> {
        self.interface
            .implementor_by_id(concrete.type_id())
            .ok_or_else(|| {
                Error::config(format!(
                    "runtime value is not a registered implementor of {}",
                    self.interface.name
                ))
            })
    }

    /// Allow-list first, then name resolution, then subtype check.
    fn resolve_tag(&self, tag: &str, registry: &Registry) -> Result<TypeRef> {
        if !registry.config().is_allowed(tag) {
            log::warn!(
                "[DynamicCodec] rejected type tag '{}' for {}: not allow-listed",
                tag,
                self.interface.name
            );
            return Err(Error::validation(format!(
                "type '{}' is not allowed to be decoded",
                tag
            )));
        }
        let ty = registry
            .type_by_name(tag)
            .ok_or_else(|| Error::validation(format!("unknown type tag '{}'", tag)))?;
        if self.interface.implementor(ty).is_none() {
            return Err(Error::validation(format!(
                "type '{}' does not implement {}",
                tag, self.interface.name
            )));
        }
        Ok(ty)
    }
}

impl StructuralCodec for DynamicCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        let concrete = self.interface.ops.concrete(value)?;
        let implementor = self.runtime_implementor(concrete)?;
        let codec = registry.resolve(implementor.ty)?;
        let config = registry.config();

        let is_default = self.interface.default == Some(implementor.ty);
        if is_default || !config.dynamic_type_tags {
            return codec.encode(Some(concrete), out, registry);
        }

        out.write_type_tag(&config.type_field_name, implementor.name)?;
        if codec.is_object() {
            codec.encode(Some(concrete), out, registry)
        } else {
            out.start_object()?;
            out.write_field(&config.value_field_name)?;
            codec.encode(Some(concrete), out, registry)?;
            out.end_object()
        }
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>> {
        let config = registry.config();
        let (ty, tagged) = if config.dynamic_type_tags {
            match input.peek_type_tag(&config.type_field_name)? {
                Some(tag) => (self.resolve_tag(&tag, registry)?, true),
                None => match self.interface.default {
                    Some(default) => (default, false),
                    None => {
                        return Err(Error::validation(format!(
                            "missing '{}' tag for {}",
                            config.type_field_name, self.interface.name
                        )))
                    }
                },
            }
        } else {
            match self.interface.default {
                Some(default) => (default, false),
                None => {
                    return Err(Error::config(format!(
                        "{} has no default implementation and type tags are disabled",
                        self.interface.name
                    )))
                }
            }
        };

        let codec = registry.resolve(ty)?;
        let decoded = if tagged && !codec.is_object() {
            // The tag opened a wrapper object around the value.
            input.start_object()?;
            let field = input.read_field_name()?;
            if field != config.value_field_name {
                return Err(Error::validation(format!(
                    "expected '{}' in tagged value of {}, found '{}'",
                    config.value_field_name, self.interface.name, field
                )));
            }
            let value = codec.decode(input, registry)?;
            input.end_object()?;
            value
        } else {
            codec.decode(input, registry)?
        };
        let concrete = require(decoded, self.interface.name)?;
        self.interface.ops.upcast(concrete)
    }
}
