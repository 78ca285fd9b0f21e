// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry.
//!
//! The registry owns the configuration, the classifier and the cache of
//! published codecs. Lookups of a cached codec are lock-free; a miss takes
//! the derivation lock, checks the cache again and derives the type (and
//! every type it reaches) in one [`Session`](session::Session). A session
//! that fails publishes nothing, so the cache only ever holds complete codec
//! graphs.
//!
//! # Example
//!
//! ```rust
//! use strata::{Reflect, Registry};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct Sample {
//!     id: u32,
//!     label: String,
//! }
//!
//! let registry = Registry::default();
//! let codec = registry.codec::<Sample>().unwrap();
//! assert!(codec.same_as(&registry.codec::<Sample>().unwrap()));
//! assert!(registry.is_resolved::<Sample>());
//! ```

mod session;

use crate::codec::{Codec, CustomCodec, ErasedCodec, NullSafe, StringProxyCodec, UserCodec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::port::{Input, Output};
use crate::reflect::{Reflect, TypeRef};
use crate::types::{Classifier, ClassifyContext, Factory, TypeDescriptor};
use dashmap::DashMap;
use parking_lot::Mutex;
use session::Session;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Derives, caches and hands out codecs.
pub struct Registry {
    config: Config,
    codecs: DashMap<TypeId, Arc<dyn ErasedCodec>>,
    classifier: Classifier,
    names: DashMap<String, TypeRef>,
    user_codecs: DashMap<TypeId, Arc<dyn ErasedCodec>>,
    factories: DashMap<TypeId, Factory>,
    derive_lock: Mutex<()>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_valid_config(Config::default())
    }
}

impl Registry {
    /// Create a registry; the configuration is validated first.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: Config) -> Self {
        Self {
            config,
            codecs: DashMap::new(),
            classifier: Classifier::new(),
            names: DashMap::new(),
            user_codecs: DashMap::new(),
            factories: DashMap::new(),
            derive_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Codec for `T`, derived on first use.
    pub fn codec<T: Reflect>(&self) -> Result<Codec<T>> {
        self.resolve(TypeRef::of::<T>()).map(Codec::new)
    }

    /// The bundled writers refuse nesting deeper than
    /// [`DEFAULT_MAX_DEPTH`](crate::port::json::DEFAULT_MAX_DEPTH), the
    /// limit their readers apply.
    pub fn encode<T: Reflect>(&self, value: &T, out: &mut dyn Output) -> Result<()> {
        self.codec::<T>()?.encode(value, out, self)
    }

    pub fn encode_nullable<T: Reflect>(&self, value: Option<&T>, out: &mut dyn Output) -> Result<()> {
        self.codec::<T>()?.encode_nullable(value, out, self)
    }

    pub fn decode<T: Reflect>(&self, input: &mut dyn Input) -> Result<T> {
        self.codec::<T>()?.decode(input, self)
    }

    pub fn decode_nullable<T: Reflect>(&self, input: &mut dyn Input) -> Result<Option<T>> {
        self.codec::<T>()?.decode_nullable(input, self)
    }

    /// Classification of `T` without deriving a codec.
    pub fn descriptor<T: Reflect>(&self) -> Result<Arc<TypeDescriptor>> {
        self.classify(TypeRef::of::<T>())
    }

    /// Type registered or derived under `name`.
    pub fn type_by_name(&self, name: &str) -> Option<TypeRef> {
        self.names.get(name).map(|entry| *entry.value())
    }

    /// True once a codec for `T` is published.
    pub fn is_resolved<T: Reflect>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    /// Number of published codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub(crate) fn resolve(&self, ty: TypeRef) -> Result<Arc<dyn ErasedCodec>> {
        if let Some(hit) = self.cached(ty.id()) {
            return Ok(hit);
        }

        let _guard = self.derive_lock.lock();
        if let Some(hit) = self.cached(ty.id()) {
            return Ok(hit);
        }

        let mut session = Session::new(self);
        let codec = session.resolve(ty)?;
        let (finished, names) = session.finish();
        log::debug!(
            "[Registry] publishing {} codec(s) for {}",
            finished.len(),
            ty.rust_name()
        );
        for (name, named) in names {
            self.record_name(name, named);
        }
        for (id, derived) in finished {
            self.codecs.entry(id).or_insert(derived);
        }
        Ok(codec)
    }

    pub(crate) fn cached(&self, id: TypeId) -> Option<Arc<dyn ErasedCodec>> {
        self.codecs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn user_codec(&self, id: TypeId) -> Option<Arc<dyn ErasedCodec>> {
        self.user_codecs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn classify(&self, ty: TypeRef) -> Result<Arc<TypeDescriptor>> {
        let ctx = ClassifyContext {
            config: &self.config,
            factories: &self.factories,
        };
        self.classifier.classify(ty, &ctx)
    }

    fn record_name(&self, name: &'static str, ty: TypeRef) {
        let existing = *self.names.entry(name.to_string()).or_insert(ty).value();
        if existing != ty {
            log::warn!(
                "[Registry] name '{}' already bound to {}, ignoring {}",
                name,
                existing.rust_name(),
                ty.rust_name()
            );
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Use `codec` for `T` instead of a derived one.
    pub fn register_codec<T, C>(&self, codec: C) -> Result<()>
    where
        T: Reflect,
        C: CustomCodec<T> + 'static,
    {
        let erased: Arc<dyn ErasedCodec> = Arc::new(NullSafe::new(UserCodec::<T, C>::new(codec)));
        self.install_codec::<T>(erased)
    }

    /// Encode `T` as a single string through a pair of conversions.
    pub fn register_string_proxy<T, To, From>(&self, to: To, from: From) -> Result<()>
    where
        T: Reflect,
        To: Fn(&T) -> String + Send + Sync + 'static,
        From: Fn(&str) -> Result<T> + Send + Sync + 'static,
    {
        let proxy = StringProxyCodec::<T>::new(Box::new(to), Box::new(from));
        self.install_codec::<T>(Arc::new(NullSafe::new(proxy)))
    }

    /// Build blank instances of `T` with `factory` when decoding.
    pub fn register_factory<T, F>(&self, factory: F) -> Result<()>
    where
        T: Reflect,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let _guard = self.derive_lock.lock();
        self.reject_late::<T>("factory")?;
        let erased: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Any>);
        self.factories.insert(TypeId::of::<T>(), erased);
        // A descriptor classified before the factory existed is stale.
        self.classifier.invalidate(TypeId::of::<T>());
        log::debug!("[Registry] factory registered for {}", std::any::type_name::<T>());
        Ok(())
    }

    /// Make `T` resolvable by its reflected name before it is derived.
    pub fn register_type<T: Reflect>(&self) -> Result<()> {
        let ty = TypeRef::of::<T>();
        let name = ty.info().name;
        let _guard = self.derive_lock.lock();
        let existing = *self.names.entry(name.to_string()).or_insert(ty).value();
        if existing != ty {
            return Err(Error::config(format!(
                "type name '{}' is already bound to {}",
                name,
                existing.rust_name()
            )));
        }
        log::trace!("[Registry] registered name '{}'", name);
        Ok(())
    }

    fn install_codec<T: Reflect>(&self, codec: Arc<dyn ErasedCodec>) -> Result<()> {
        let _guard = self.derive_lock.lock();
        self.reject_late::<T>("codec")?;
        self.user_codecs.insert(TypeId::of::<T>(), codec);
        log::debug!("[Registry] codec registered for {}", std::any::type_name::<T>());
        Ok(())
    }

    /// Registrations must precede the first derivation of their type.
    fn reject_late<T: Reflect>(&self, what: &str) -> Result<()> {
        if self.codecs.contains_key(&TypeId::of::<T>()) {
            log::warn!(
                "[Registry] {} for {} registered after its codec was derived",
                what,
                std::any::type_name::<T>()
            );
            return Err(Error::config(format!(
                "{} for {} registered after its codec was derived",
                what,
                std::any::type_name::<T>()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
