// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-based object codec.
//!
//! Encoding writes every member in enumeration order. Decoding identifies
//! fields by name, so input order is free; the value is then built with
//! the object's [`ConstructionPlan`].

use super::{ErasedCodec, StructuralCodec};
use crate::error::{Error, Result};
use crate::port::{EventKind, Input, Output};
use crate::reflect::{MemberAccess, OptionalOps};
use crate::registry::Registry;
use crate::types::ConstructionPlan;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// One member with its resolved codec.
pub(crate) struct FieldCodec {
    pub(crate) name: String,
    pub(crate) access: Arc<dyn MemberAccess>,
    pub(crate) codec: Arc<dyn ErasedCodec>,
    pub(crate) nullable: Option<Arc<dyn OptionalOps>>,
}

pub(crate) struct ObjectCodec {
    type_name: &'static str,
    fields: Vec<FieldCodec>,
    index: HashMap<String, usize>,
    plan: ConstructionPlan,
}

impl ObjectCodec {
    pub(crate) fn new(type_name: &'static str, fields: Vec<FieldCodec>, plan: ConstructionPlan) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(slot, f)| (f.name.clone(), slot))
            .collect();
        Self {
            type_name,
            fields,
            index,
            plan,
        }
    }

    /// Read every field of one object into per-member slots.
    fn read_slots(
        &self,
        input: &mut dyn Input,
        registry: &Registry,
    ) -> Result<Vec<Option<Box<dyn Any>>>> {
        let config = registry.config();
        let strict = config.fail_on_unrecognised_fields;
        // A member may legitimately share the tag field's name.
        let tag_field = (config.dynamic_type_tags
            && !self.index.contains_key(&config.type_field_name))
        .then_some(config.type_field_name.as_str());
        let mut slots: Vec<Option<Box<dyn Any>>> = self.fields.iter().map(|_| None).collect();
        let mut seen = vec![false; self.fields.len()];

        if let Some(field) = tag_field {
            match input.peek_type_tag(field) {
                Ok(Some(tag)) => {
                    return Err(Error::validation(format!(
                        "unexpected type tag '{}' on {}: only interface values are tagged",
                        tag, self.type_name
                    )))
                }
                Ok(None) | Err(Error::NotSupported(_)) => {}
                Err(e) => return Err(e),
            }
        }
        input.start_object()?;
        while !matches!(
            input.current_event()?,
            EventKind::EndObject | EventKind::Eof
        ) {
            let name = input.read_field_name()?;
            if tag_field == Some(name.as_str()) {
                return Err(Error::validation(format!(
                    "type tag '{}' in {} must be the first field of the object",
                    name, self.type_name
                )));
            }
            let Some(&slot) = self.index.get(&name) else {
                if strict {
                    return Err(Error::validation(format!(
                        "unrecognised field '{}' for {}",
                        name, self.type_name
                    )));
                }
                log::debug!("[ObjectCodec] skipping unknown field '{}' of {}", name, self.type_name);
                input.skip_value()?;
                continue;
            };
            if seen[slot] {
                return Err(Error::validation(format!(
                    "field '{}' repeated in {}",
                    name, self.type_name
                )));
            }
            seen[slot] = true;
            let field = &self.fields[slot];
            match field.codec.decode(input, registry)? {
                Some(value) => slots[slot] = Some(value),
                None => {
                    return Err(Error::validation(format!(
                        "null is not a valid value for {}.{}",
                        self.type_name, field.name
                    )))
                }
            }
        }
        input.end_object()?;
        Ok(slots)
    }

    /// Set decoded members on a blank instance; absent members keep theirs.
    fn apply(&self, mut instance: Box<dyn Any>, slots: Vec<Option<Box<dyn Any>>>) -> Result<Box<dyn Any>> {
        for (field, slot) in self.fields.iter().zip(slots) {
            if let Some(value) = slot {
                field.access.set(&mut *instance, value)?;
            }
        }
        Ok(instance)
    }

    fn construct(
        &self,
        build: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>,
        slots: Vec<Option<Box<dyn Any>>>,
    ) -> Result<Box<dyn Any>> {
        let mut args = Vec::with_capacity(slots.len());
        for (field, slot) in self.fields.iter().zip(slots) {
            let arg = match (slot, &field.nullable) {
                (Some(value), _) => value,
                (None, Some(ops)) => ops.wrap(None)?,
                (None, None) => {
                    return Err(Error::validation(format!(
                        "missing field '{}' for {}",
                        field.name, self.type_name
                    )))
                }
            };
            args.push(arg);
        }
        build(args)
    }
}

impl StructuralCodec for ObjectCodec {
    fn encode(&self, value: &dyn Any, out: &mut dyn Output, registry: &Registry) -> Result<()> {
        out.start_object()?;
        for field in &self.fields {
            out.write_field(&field.name)?;
            field
                .codec
                .encode(Some(field.access.get(value)?), out, registry)?;
        }
        out.end_object()
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Box<dyn Any>> {
        if let ConstructionPlan::Unavailable(reason) = &self.plan {
            return Err(Error::config(format!("cannot decode: {}", reason)));
        }
        let slots = self.read_slots(input, registry)?;
        match &self.plan {
            ConstructionPlan::NoArgMutate(blank) => self.apply(blank(), slots),
            ConstructionPlan::UserFactory(factory) => self.apply(factory(), slots),
            ConstructionPlan::PositionalConstruct { build, .. } => self.construct(*build, slots),
            ConstructionPlan::Unavailable(reason) => Err(Error::config(reason.clone())),
        }
    }

    fn is_object(&self) -> bool {
        true
    }
}
