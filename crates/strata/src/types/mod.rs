// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type classifier.
//!
//! Maps a [`TypeRef`] to its [`TypeDescriptor`], memoized by `TypeId`.
//! Classification of one type never classifies another: children are
//! referenced lazily, so recursive definitions terminate.

mod classify;
mod descriptor;

pub use descriptor::{
    ConstructionPlan, Factory, Implementor, InterfaceDescriptor, MemberDescriptor,
    ObjectDescriptor, TypeDescriptor,
};

use crate::config::Config;
use crate::error::Result;
use crate::reflect::TypeRef;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Inputs besides the type itself that influence classification.
pub struct ClassifyContext<'a> {
    pub config: &'a Config,
    pub factories: &'a DashMap<TypeId, Factory>,
}

/// Memoizing classifier.
#[derive(Default)]
pub struct Classifier {
    memo: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `ty`, reusing an earlier result.
    pub fn classify(&self, ty: TypeRef, ctx: &ClassifyContext<'_>) -> Result<Arc<TypeDescriptor>> {
        let id = ty.id();
        if let Some(found) = self.memo.get(&id) {
            return Ok(Arc::clone(found.value()));
        }
        let descriptor = Arc::new(classify::classify(ty, ctx)?);
        log::trace!(
            "[Classifier] {} -> {}",
            ty.rust_name(),
            descriptor.kind_name()
        );
        Ok(Arc::clone(
            self.memo.entry(id).or_insert(descriptor).value(),
        ))
    }

    /// Forget the descriptor of one type so it is classified again.
    pub fn invalidate(&self, id: TypeId) -> bool {
        self.memo.remove(&id).is_some()
    }

    pub fn is_classified(&self, id: TypeId) -> bool {
        self.memo.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

#[cfg(test)]
mod tests;
