// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Strata - format-agnostic object codec engine
//!
//! Strata derives encoders and decoders for arbitrary object graphs from
//! reflected type information, caches them per type and drives them against
//! pluggable format adapters (JSON text and a compact binary stream ship
//! with the crate).
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::{json, Reflect, Registry, Result};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct Reading {
//!     sensor: String,
//!     value: f64,
//!     tags: Vec<String>,
//! }
//!
//! fn main() -> Result<()> {
//!     let registry = Registry::default();
//!     let reading = Reading {
//!         sensor: "t1".into(),
//!         value: 21.5,
//!         tags: vec!["lab".into()],
//!     };
//!     let text = json::to_string(&registry, &reading)?;
//!     assert_eq!(text, r#"{"sensor":"t1","value":21.5,"tags":["lab"]}"#);
//!     assert_eq!(json::from_str::<Reading>(&registry, &text)?, reading);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Registry: config, codec cache, registrations, derivation lock      |
//! +---------------------------------------------------------------------+
//! |  Codecs: object | sequence | map | enum | leaf | dynamic | null    |
//! +---------------------------------------------------------------------+
//! |  Classifier: TypeRef -> TypeDescriptor (members, construction plan) |
//! +---------------------------------------------------------------------+
//! |  Reflect: shapes and erased accessors, #[derive(Reflect)]          |
//! +---------------------------------------------------------------------+
//! |  Port: Output / Input event streams (json, binary)                  |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`registry`] - codec lookup and registration (start here)
//! - [`reflect`] - type metadata consumed by the classifier
//! - [`types`] - classification into descriptors
//! - [`codec`] - codec contracts and derived codecs
//! - [`port`] - format adapter traits and the bundled adapters
//! - [`config`] - engine options

// Generated code refers to `::strata`, including inside this crate.
extern crate self as strata;

pub mod codec;
pub mod config;
pub mod error;
pub mod port;
pub mod reflect;
pub mod registry;
pub mod types;

pub use codec::{Codec, CustomCodec};
pub use config::Config;
pub use error::{Error, Result};
pub use port::{binary, json, EventKind, Input, Output};
pub use reflect::Reflect;
pub use registry::Registry;
pub use strata_codegen::Reflect; // Derive macro (for #[derive(strata::Reflect)])
