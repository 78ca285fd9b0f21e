// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::json;
use crate::types::ConstructionPlan;
use crate::Reflect;

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Base {
    id: u32,
}

/// Only an embedded base: no positional constructor, no default.
#[derive(Reflect, Debug, PartialEq)]
struct Sealed {
    #[strata(base)]
    base: Base,
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Inner {
    n: i32,
}

#[derive(Reflect, Debug)]
struct Outer {
    inner: Inner,
    sealed: Sealed,
}

#[derive(Reflect, Default)]
#[strata(default, name = "shared.Name")]
struct First;

#[derive(Reflect, Default)]
#[strata(default, name = "shared.Name")]
struct Second;

#[derive(Reflect, Debug, PartialEq)]
struct Version {
    major: u16,
    minor: u16,
}

#[test]
fn test_invalid_config_rejected() {
    let err = Registry::new(Config::default().with_value_field_name("@type"))
        .err()
        .expect("invalid config");
    assert!(err.is_configuration());
}

#[test]
fn test_failed_session_publishes_nothing() {
    let reg = Registry::default();
    let err = reg.codec::<Outer>().err().expect("strict derivation fails");
    assert!(err.is_configuration());
    assert!(!reg.is_resolved::<Outer>());
    assert!(!reg.is_resolved::<Inner>());
    assert!(reg.is_empty());

    // Unrelated types still derive.
    assert!(reg.codec::<Inner>().is_ok());
    assert!(reg.is_resolved::<Inner>());
}

#[test]
fn test_lazy_construction_failure() {
    let reg = Registry::new(Config::default().with_fail_on_no_type_constructor(false)).unwrap();
    let value = Sealed {
        base: Base { id: 9 },
    };
    let text = json::to_string(&reg, &value).unwrap();
    assert_eq!(text, r#"{"id":9}"#);
    let err = json::from_str::<Sealed>(&reg, &text).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_factory_after_classification_refreshes_plan() {
    let reg = Registry::default();
    assert!(reg.descriptor::<Sealed>().is_err());

    reg.register_factory(|| Sealed {
        base: Base { id: 0 },
    })
    .unwrap();
    let descriptor = reg.descriptor::<Sealed>().unwrap();
    let object = descriptor.as_object().expect("object");
    assert!(matches!(object.plan, ConstructionPlan::UserFactory(_)));

    let decoded: Sealed = json::from_str(&reg, r#"{"id":5}"#).unwrap();
    assert_eq!(decoded.base.id, 5);
}

#[test]
fn test_late_registration_rejected() {
    let reg = Registry::default();
    reg.codec::<Inner>().unwrap();
    let err = reg.register_factory(Inner::default).unwrap_err();
    assert!(err.is_configuration());
    let err = reg
        .register_string_proxy::<Inner, _, _>(|i| i.n.to_string(), |_| Ok(Inner::default()))
        .unwrap_err();
    assert!(err.is_configuration());

    // Registration for a type not derived yet is still accepted.
    assert!(reg.register_factory(Base::default).is_ok());
}

#[test]
fn test_register_type_name_conflict() {
    let reg = Registry::default();
    reg.register_type::<First>().unwrap();
    reg.register_type::<First>().unwrap();
    let err = reg.register_type::<Second>().unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(
        reg.type_by_name("shared.Name").map(|t| t.id()),
        Some(TypeId::of::<First>())
    );
}

#[test]
fn test_derivation_records_object_names() {
    let reg = Registry::default();
    assert!(reg.type_by_name(Inner::type_info().name).is_none());
    reg.codec::<Vec<Inner>>().unwrap();
    assert_eq!(
        reg.type_by_name(Inner::type_info().name).map(|t| t.id()),
        Some(TypeId::of::<Inner>())
    );
}

#[test]
fn test_string_proxy() {
    let reg = Registry::default();
    reg.register_string_proxy::<Version, _, _>(
        |v| format!("{}.{}", v.major, v.minor),
        |text| {
            let (major, minor) = text
                .split_once('.')
                .ok_or_else(|| Error::validation(format!("bad version '{}'", text)))?;
            let parse = |s: &str| {
                s.parse::<u16>()
                    .map_err(|e| Error::validation(e.to_string()))
            };
            Ok(Version {
                major: parse(major)?,
                minor: parse(minor)?,
            })
        },
    )
    .unwrap();

    let versions = vec![Version { major: 1, minor: 2 }, Version { major: 3, minor: 0 }];
    let text = json::to_string(&reg, &versions).unwrap();
    assert_eq!(text, r#"["1.2","3.0"]"#);
    assert_eq!(json::from_str::<Vec<Version>>(&reg, &text).unwrap(), versions);
    assert!(json::from_str::<Version>(&reg, "\"12\"")
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_concurrent_resolution_shares_one_codec() {
    let reg = Registry::default();
    let shared = &reg;
    let handles: Vec<Codec<Vec<Inner>>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || shared.codec::<Vec<Inner>>().expect("codec")))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker"))
            .collect()
    });
    for handle in &handles[1..] {
        assert!(handle.same_as(&handles[0]));
    }
    assert!(reg.is_resolved::<Inner>());
}

#[test]
fn test_descriptor_does_not_publish() {
    let reg = Registry::default();
    reg.descriptor::<Inner>().unwrap();
    assert!(!reg.is_resolved::<Inner>());
}
