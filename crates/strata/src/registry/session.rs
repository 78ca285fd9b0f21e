// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One derivation pass.
//!
//! A session derives a type and everything it reaches that is not cached
//! yet. Before deriving a type the session records a [`Placeholder`] for it;
//! a re-entrant request (a recursive member) gets the placeholder, which is
//! bound to the real codec once the outer derivation finishes. Codecs become
//! visible to other callers only when the whole session is published.

use super::Registry;
use crate::codec::{
    DynamicCodec, EnumCodec, ErasedCodec, FieldCodec, MapCodec, NullSafe, ObjectCodec,
    OptionalCodec, PointerCodec, PrimitiveArrayCodec, PrimitiveCodec, SequenceCodec, StringCodec,
};
use crate::error::{Error, Result};
use crate::port::{Input, Output};
use crate::reflect::{NumericKind, PrimitiveKind, TypeRef};
use crate::types::TypeDescriptor;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

/// Stand-in for a codec still being derived.
pub(crate) struct Placeholder {
    type_name: &'static str,
    target: OnceLock<Weak<dyn ErasedCodec>>,
}

impl Placeholder {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            target: OnceLock::new(),
        }
    }

    fn bind(&self, codec: &Arc<dyn ErasedCodec>) {
        // A placeholder is bound once, by the session that created it.
        let _ = self.target.set(Arc::downgrade(codec));
    }

    fn target(&self) -> Result<Arc<dyn ErasedCodec>> {
        self.target
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::config(format!("codec for {} is not available", self.type_name)))
    }
}

impl ErasedCodec for Placeholder {
    fn encode(
        &self,
        value: Option<&dyn Any>,
        out: &mut dyn Output,
        registry: &Registry,
    ) -> Result<()> {
        self.target()?.encode(value, out, registry)
    }

    fn decode(&self, input: &mut dyn Input, registry: &Registry) -> Result<Option<Box<dyn Any>>> {
        self.target()?.decode(input, registry)
    }

    fn is_object(&self) -> bool {
        self.target().map(|t| t.is_object()).unwrap_or(false)
    }
}

pub(crate) struct Session<'r> {
    registry: &'r Registry,
    finished: HashMap<TypeId, Arc<dyn ErasedCodec>>,
    pending: HashMap<TypeId, Arc<Placeholder>>,
    names: Vec<(&'static str, TypeRef)>,
}

impl<'r> Session<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            finished: HashMap::new(),
            pending: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Cached, already derived in this session, in progress, or derived now.
    pub(crate) fn resolve(&mut self, ty: TypeRef) -> Result<Arc<dyn ErasedCodec>> {
        let id = ty.id();
        if let Some(codec) = self.registry.cached(id) {
            return Ok(codec);
        }
        if let Some(codec) = self.finished.get(&id) {
            return Ok(Arc::clone(codec));
        }
        if let Some(placeholder) = self.pending.get(&id) {
            log::trace!("[Registry] recursive reference to {}", ty.rust_name());
            return Ok(Arc::clone(placeholder) as Arc<dyn ErasedCodec>);
        }

        let placeholder = Arc::new(Placeholder::new(ty.rust_name()));
        self.pending.insert(id, Arc::clone(&placeholder));
        let derived = self.derive(ty);
        self.pending.remove(&id);
        let codec = derived?;
        placeholder.bind(&codec);
        self.finished.insert(id, Arc::clone(&codec));
        Ok(codec)
    }

    /// Every codec derived by this session, with the type names it saw.
    pub(crate) fn finish(self) -> (HashMap<TypeId, Arc<dyn ErasedCodec>>, Vec<(&'static str, TypeRef)>) {
        (self.finished, self.names)
    }

    fn note_names(&mut self, ty: TypeRef, descriptor: &TypeDescriptor) {
        match descriptor {
            TypeDescriptor::Object(object) => self.names.push((object.name, ty)),
            TypeDescriptor::Enum { .. } => self.names.push((ty.info().name, ty)),
            TypeDescriptor::Interface(iface) => self
                .names
                .extend(iface.implementors.iter().map(|i| (i.name, i.ty))),
            _ => {}
        }
    }

    fn derive(&mut self, ty: TypeRef) -> Result<Arc<dyn ErasedCodec>> {
        if let Some(user) = self.registry.user_codec(ty.id()) {
            log::debug!("[Registry] using registered codec for {}", ty.rust_name());
            return Ok(user);
        }
        let descriptor = self.registry.classify(ty)?;
        self.note_names(ty, &descriptor);
        let name = ty.rust_name();

        let codec: Arc<dyn ErasedCodec> = match &*descriptor {
            TypeDescriptor::PrimitiveBool => leaf(PrimitiveKind::Bool),
            TypeDescriptor::PrimitiveChar => leaf(PrimitiveKind::Char),
            TypeDescriptor::PrimitiveNumeric(kind) => leaf(numeric(*kind)),
            TypeDescriptor::BoxedPrimitive { kind, ops } => {
                Arc::new(OptionalCodec::new(leaf(*kind), Arc::clone(ops)))
            }
            TypeDescriptor::String => Arc::new(NullSafe::new(StringCodec)),
            TypeDescriptor::Enum { variants, ops } => Arc::new(NullSafe::new(EnumCodec::new(
                ty.info().name,
                variants.clone(),
                Arc::clone(ops),
            ))),
            TypeDescriptor::Array(seq) | TypeDescriptor::Collection(seq) => {
                let elem = self.resolve(seq.elem)?;
                Arc::new(NullSafe::new(SequenceCodec::new(
                    name,
                    elem,
                    Arc::clone(&seq.ops),
                    seq.fixed_len,
                )))
            }
            TypeDescriptor::PrimitiveArray { kind, seq } => {
                Arc::new(NullSafe::new(PrimitiveArrayCodec::new(
                    name,
                    *kind,
                    Arc::clone(&seq.ops),
                    seq.fixed_len,
                )))
            }
            TypeDescriptor::Map(map) => {
                let key = self.resolve(map.key)?;
                let value = self.resolve(map.value)?;
                let string_keys = map.key.id() == TypeId::of::<String>();
                Arc::new(NullSafe::new(MapCodec::new(
                    name,
                    key,
                    value,
                    Arc::clone(&map.ops),
                    string_keys,
                )))
            }
            TypeDescriptor::Interface(iface) => {
                Arc::new(NullSafe::new(DynamicCodec::new(Arc::new(iface.clone()))))
            }
            TypeDescriptor::Object(object) => {
                let mut fields = Vec::with_capacity(object.members.len());
                for member in &object.members {
                    fields.push(FieldCodec {
                        name: member.name.clone(),
                        access: Arc::clone(&member.access),
                        codec: self.resolve(member.ty)?,
                        nullable: member.nullable.clone(),
                    });
                }
                Arc::new(NullSafe::new(ObjectCodec::new(
                    object.name,
                    fields,
                    object.plan.clone(),
                )))
            }
            TypeDescriptor::Nullable { inner, ops } => {
                let inner = self.resolve(*inner)?;
                Arc::new(OptionalCodec::new(inner, Arc::clone(ops)))
            }
            TypeDescriptor::Pointer { inner, ops } => {
                let inner = self.resolve(*inner)?;
                Arc::new(PointerCodec::new(inner, Arc::clone(ops)))
            }
        };
        log::debug!(
            "[Registry] derived {} codec for {}",
            descriptor.kind_name(),
            name
        );
        Ok(codec)
    }
}

fn numeric(kind: NumericKind) -> PrimitiveKind {
    PrimitiveKind::Numeric(kind)
}

fn leaf(kind: PrimitiveKind) -> Arc<dyn ErasedCodec> {
    Arc::new(NullSafe::new(PrimitiveCodec::new(kind)))
}
