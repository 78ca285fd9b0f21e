// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared helpers: run the same value through every bundled format.

#![allow(dead_code)]

use std::fmt::Debug;
use strata::{binary, json, Reflect, Registry, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    Binary,
}

pub const BACKENDS: [Backend; 2] = [Backend::Json, Backend::Binary];

pub fn encode<T: Reflect>(backend: Backend, registry: &Registry, value: &T) -> Result<Vec<u8>> {
    match backend {
        Backend::Json => json::to_string(registry, value).map(String::into_bytes),
        Backend::Binary => binary::to_vec(registry, value),
    }
}

pub fn decode<T: Reflect>(backend: Backend, registry: &Registry, bytes: &[u8]) -> Result<T> {
    match backend {
        Backend::Json => {
            let text = std::str::from_utf8(bytes).expect("json output is utf-8");
            json::from_str(registry, text)
        }
        Backend::Binary => binary::from_slice(registry, bytes),
    }
}

/// Encode then decode `value` with `backend`.
pub fn roundtrip<T: Reflect>(backend: Backend, registry: &Registry, value: &T) -> Result<T> {
    let bytes = encode(backend, registry, value)?;
    decode(backend, registry, &bytes)
}

/// Assert `decode(encode(v)) == v` for every backend.
pub fn assert_roundtrip<T: Reflect + Debug + PartialEq>(registry: &Registry, value: &T) {
    for backend in BACKENDS {
        let back = roundtrip(backend, registry, value)
            .unwrap_or_else(|e| panic!("{backend:?} roundtrip failed: {e}"));
        assert_eq!(&back, value, "{backend:?} roundtrip changed the value");
    }
}
