// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec engine configuration.
//!
//! A [`Config`] is built once, validated, attached to a
//! [`Registry`](crate::Registry) and never mutated afterwards. Every
//! derivation step reads it; encode/decode calls share it without locking.
//!
//! # Example
//!
//! ```rust
//! use strata::Config;
//!
//! let config = Config::default()
//!     .with_type_field_name("kind")
//!     .with_allowed_package("shapes")
//!     .with_fail_on_unrecognised_fields(false);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Default discriminator field name.
pub const DEFAULT_TYPE_FIELD: &str = "@type";
/// Default map-entry key field name.
pub const DEFAULT_KEY_FIELD: &str = "key";
/// Default map-entry value field name (also used to wrap tagged scalars).
pub const DEFAULT_VALUE_FIELD: &str = "value";

/// Immutable set of named options read by every derivation step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct Config {
    /// Discriminator field/tag name.
    pub type_field_name: String,
    /// Map-entry key field name (non-string keyed maps).
    pub key_field_name: String,
    /// Map-entry value field name (non-string keyed maps).
    pub value_field_name: String,
    /// Enable the dynamic type resolution layer.
    pub dynamic_type_tags: bool,
    /// Strict construction-plan selection.
    pub fail_on_no_type_constructor: bool,
    /// Strict decode of unknown fields.
    pub fail_on_unrecognised_fields: bool,
    /// Exact type names allowed to be materialized from a tag.
    pub allowed_types: BTreeSet<String>,
    /// Module-path prefixes allowed to be materialized from a tag.
    pub allowed_packages: Vec<String>,
    /// Interface name -> default concrete type name.
    pub default_implementations: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            type_field_name: DEFAULT_TYPE_FIELD.to_string(),
            key_field_name: DEFAULT_KEY_FIELD.to_string(),
            value_field_name: DEFAULT_VALUE_FIELD.to_string(),
            dynamic_type_tags: true,
            fail_on_no_type_constructor: true,
            fail_on_unrecognised_fields: true,
            allowed_types: BTreeSet::new(),
            allowed_packages: Vec::new(),
            default_implementations: HashMap::new(),
        }
    }
}

impl Config {
    pub fn with_type_field_name(mut self, name: impl Into<String>) -> Self {
        self.type_field_name = name.into();
        self
    }

    pub fn with_key_field_name(mut self, name: impl Into<String>) -> Self {
        self.key_field_name = name.into();
        self
    }

    pub fn with_value_field_name(mut self, name: impl Into<String>) -> Self {
        self.value_field_name = name.into();
        self
    }

    pub fn with_dynamic_type_tags(mut self, enabled: bool) -> Self {
        self.dynamic_type_tags = enabled;
        self
    }

    pub fn with_fail_on_no_type_constructor(mut self, strict: bool) -> Self {
        self.fail_on_no_type_constructor = strict;
        self
    }

    pub fn with_fail_on_unrecognised_fields(mut self, strict: bool) -> Self {
        self.fail_on_unrecognised_fields = strict;
        self
    }

    /// Allow one exact type name.
    pub fn with_allowed_type(mut self, name: impl Into<String>) -> Self {
        self.allowed_types.insert(name.into());
        self
    }

    /// Allow every type whose qualified name lives under `prefix`.
    pub fn with_allowed_package(mut self, prefix: impl Into<String>) -> Self {
        self.allowed_packages.push(prefix.into());
        self
    }

    /// Override the default concrete implementation of an interface.
    pub fn with_default_implementation(
        mut self,
        interface: impl Into<String>,
        concrete: impl Into<String>,
    ) -> Self {
        self.default_implementations
            .insert(interface.into(), concrete.into());
        self
    }

    /// Check that a type name read from a discriminator tag may be
    /// materialized.
    ///
    /// A package entry matches the name itself or any path below it
    /// (`shapes` matches `shapes::Circle`, not `shapesx::Circle`).
    pub fn is_allowed(&self, type_name: &str) -> bool {
        if self.allowed_types.contains(type_name) {
            return true;
        }
        self.allowed_packages.iter().any(|pkg| {
            let pkg = pkg.trim_end_matches("::");
            type_name
                .strip_prefix(pkg)
                .is_some_and(|rest| rest.starts_with("::"))
        })
    }

    /// Validate structural names.
    pub fn validate(&self) -> Result<()> {
        for (option, value) in [
            ("type_field_name", &self.type_field_name),
            ("key_field_name", &self.key_field_name),
            ("value_field_name", &self.value_field_name),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!("{} must not be empty", option)));
            }
        }
        if self.key_field_name == self.value_field_name {
            return Err(Error::config(format!(
                "key_field_name and value_field_name are both '{}'",
                self.key_field_name
            )));
        }
        if self.type_field_name == self.value_field_name {
            return Err(Error::config(format!(
                "type_field_name and value_field_name are both '{}'",
                self.type_field_name
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "config-loaders")]
impl Config {
    /// Parse a YAML document (missing keys keep their defaults).
    ///
    /// ```yaml
    /// type_field_name: kind
    /// fail_on_unrecognised_fields: false
    /// allowed_packages:
    ///   - shapes
    /// default_implementations:
    ///   "shapes::Shape": shapes::Circle
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }
}
