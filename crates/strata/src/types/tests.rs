// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::reflect::{NumericKind, PrimitiveKind};
use crate::Reflect;
use std::collections::{BTreeMap, HashSet};

fn ctx<'a>(config: &'a Config, factories: &'a DashMap<TypeId, Factory>) -> ClassifyContext<'a> {
    ClassifyContext { config, factories }
}

fn classify_with<T: crate::reflect::Reflect>(config: &Config) -> Result<Arc<TypeDescriptor>> {
    let factories = DashMap::new();
    Classifier::new().classify(TypeRef::of::<T>(), &ctx(config, &factories))
}

fn classify<T: crate::reflect::Reflect>() -> Arc<TypeDescriptor> {
    classify_with::<T>(&Config::default()).expect("classify")
}

#[derive(Reflect, Default)]
#[strata(default)]
struct Animal {
    name: String,
    legs: u8,
}

#[derive(Reflect, Default)]
#[strata(default)]
struct Dog {
    name: String,
    #[strata(base)]
    animal: Animal,
    #[strata(skip)]
    cache: Vec<u8>,
}

#[derive(Reflect)]
struct Pair {
    left: i32,
    right: Option<String>,
}

#[derive(Reflect)]
struct Opaque {
    #[strata(base)]
    animal: Animal,
}

#[derive(Reflect, Default)]
#[strata(default)]
struct Twice {
    #[strata(rename = "a")]
    first: i32,
    #[strata(rename = "a")]
    second: i32,
}

mod catalog {
    use crate::Reflect;

    #[derive(Reflect, Default)]
    #[strata(default)]
    pub struct Item {
        pub name: String,
    }
}

mod order {
    use crate::Reflect;

    /// Same short name as its base.
    #[derive(Reflect, Default)]
    #[strata(default)]
    pub struct Item {
        pub name: String,
        #[strata(base)]
        pub listed: super::catalog::Item,
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
enum Level {
    Low,
    High,
}

#[test]
fn test_leaf_classification() {
    assert!(matches!(*classify::<bool>(), TypeDescriptor::PrimitiveBool));
    assert!(matches!(*classify::<char>(), TypeDescriptor::PrimitiveChar));
    assert!(matches!(
        *classify::<u16>(),
        TypeDescriptor::PrimitiveNumeric(NumericKind::U16)
    ));
    assert!(matches!(
        *classify::<Option<f64>>(),
        TypeDescriptor::BoxedPrimitive {
            kind: PrimitiveKind::Numeric(NumericKind::F64),
            ..
        }
    ));
    assert!(matches!(*classify::<String>(), TypeDescriptor::String));
    assert!(matches!(*classify::<Level>(), TypeDescriptor::Enum { .. }));
}

#[test]
fn test_container_classification() {
    assert!(matches!(
        *classify::<[i64; 4]>(),
        TypeDescriptor::PrimitiveArray { .. }
    ));
    assert!(matches!(*classify::<[String; 2]>(), TypeDescriptor::Array(_)));
    assert!(matches!(*classify::<Vec<Pair>>(), TypeDescriptor::Collection(_)));
    assert!(matches!(
        *classify::<HashSet<String>>(),
        TypeDescriptor::Collection(_)
    ));
    assert!(matches!(
        *classify::<BTreeMap<u8, String>>(),
        TypeDescriptor::Map(_)
    ));
    assert!(matches!(
        *classify::<Option<Pair>>(),
        TypeDescriptor::Nullable { .. }
    ));
    assert!(matches!(
        *classify::<Box<Pair>>(),
        TypeDescriptor::Pointer { .. }
    ));
}

#[test]
fn test_members_own_first_then_base_with_qualification() {
    let descriptor = classify::<Dog>();
    let object = descriptor.as_object().expect("object");
    let names: Vec<&str> = object.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["name", "Animal.name", "legs"]);
    assert_eq!(object.members[1].declaring_type, "Animal");
    assert_eq!(object.members[2].slot, 2);
    assert!(matches!(object.plan, ConstructionPlan::NoArgMutate(_)));
}

#[test]
fn test_positional_plan_and_nullable_member() {
    let descriptor = classify::<Pair>();
    let object = descriptor.as_object().expect("object");
    match &object.plan {
        ConstructionPlan::PositionalConstruct { arity, params, .. } => {
            assert_eq!(*arity, 2);
            assert_eq!(
                params,
                &vec![TypeRef::of::<i32>(), TypeRef::of::<Option<String>>()]
            );
        }
        other => panic!("unexpected plan {:?}", other),
    }
    assert!(object.member("left").expect("left").nullable.is_none());
    assert!(object.member("right").expect("right").nullable.is_some());
}

#[test]
fn test_missing_constructor_strict_and_lazy() {
    let err = classify_with::<Opaque>(&Config::default()).unwrap_err();
    assert!(err.is_configuration());

    let lenient = Config::default().with_fail_on_no_type_constructor(false);
    let descriptor = classify_with::<Opaque>(&lenient).expect("lazy plan");
    let object = descriptor.as_object().expect("object");
    assert!(matches!(object.plan, ConstructionPlan::Unavailable(_)));
}

#[test]
fn test_factory_plan() {
    let config = Config::default();
    let factories: DashMap<TypeId, Factory> = DashMap::new();
    factories.insert(
        TypeId::of::<Opaque>(),
        Arc::new(|| {
            Box::new(Opaque {
                animal: Animal::default(),
            }) as Box<dyn std::any::Any>
        }),
    );
    let descriptor = Classifier::new()
        .classify(TypeRef::of::<Opaque>(), &ctx(&config, &factories))
        .expect("classify");
    assert!(matches!(
        descriptor.as_object().expect("object").plan,
        ConstructionPlan::UserFactory(_)
    ));
}

#[test]
fn test_same_type_duplicate_name_is_configuration_error() {
    let err = classify_with::<Twice>(&Config::default()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_base_with_same_short_name_is_qualified() {
    let descriptor = classify::<order::Item>();
    let object = descriptor.as_object().expect("object");
    let names: Vec<&str> = object.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["name", "Item.name"]);
    assert_eq!(object.members[1].declaring_type, "Item");
}

#[test]
fn test_nested_option_is_configuration_error() {
    let err = classify_with::<Option<Option<i32>>>(&Config::default()).unwrap_err();
    assert!(err.is_configuration(), "{err}");
    let err = classify_with::<Option<Box<Option<String>>>>(&Config::default()).unwrap_err();
    assert!(err.is_configuration(), "{err}");
    assert!(matches!(
        *classify::<Box<Option<String>>>(),
        TypeDescriptor::Pointer { .. }
    ));
}

#[test]
fn test_memoized() {
    let config = Config::default();
    let factories = DashMap::new();
    let classifier = Classifier::new();
    let a = classifier
        .classify(TypeRef::of::<Pair>(), &ctx(&config, &factories))
        .expect("first");
    let b = classifier
        .classify(TypeRef::of::<Pair>(), &ctx(&config, &factories))
        .expect("second");
    assert!(Arc::ptr_eq(&a, &b));
    assert!(classifier.is_classified(TypeId::of::<Pair>()));
    assert_eq!(classifier.len(), 1);
}
