// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptions of standard library types.

use super::{
    downcast_box, downcast_ref, MapBuilder, MapInfo, MapOps, NumericKind,
    OptionalInfo, OptionalOps, PointerInfo, PointerOps, PrimitiveKind, Reflect, Scalar,
    SequenceBuilder, SequenceInfo, SequenceOps, Shape, TypeInfo, TypeRef,
};
use crate::error::{Error, Result};
use std::any::{type_name, Any};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// Leaves
// ============================================================================

macro_rules! impl_primitive {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::new(stringify!($ty), Shape::Primitive($kind))
                }
            }
        )*
    };
}

impl_primitive! {
    bool => PrimitiveKind::Bool,
    char => PrimitiveKind::Char,
    i8 => PrimitiveKind::Numeric(NumericKind::I8),
    i16 => PrimitiveKind::Numeric(NumericKind::I16),
    i32 => PrimitiveKind::Numeric(NumericKind::I32),
    i64 => PrimitiveKind::Numeric(NumericKind::I64),
    u8 => PrimitiveKind::Numeric(NumericKind::U8),
    u16 => PrimitiveKind::Numeric(NumericKind::U16),
    u32 => PrimitiveKind::Numeric(NumericKind::U32),
    u64 => PrimitiveKind::Numeric(NumericKind::U64),
    usize => PrimitiveKind::Numeric(NumericKind::Usize),
    isize => PrimitiveKind::Numeric(NumericKind::Isize),
    f32 => PrimitiveKind::Numeric(NumericKind::F32),
    f64 => PrimitiveKind::Numeric(NumericKind::F64),
}

impl Reflect for String {
    fn type_info() -> TypeInfo {
        TypeInfo::new("String", Shape::String)
    }
}

// ============================================================================
// Option / Box / Arc
// ============================================================================

struct OptionOps<T>(PhantomData<fn() -> T>);

impl<T: Reflect> OptionalOps for OptionOps<T> {
    fn project<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        Ok(downcast_ref::<Option<T>>(value)?
            .as_ref()
            .map(|v| v as &dyn Any))
    }

    fn wrap(&self, inner: Option<Box<dyn Any>>) -> Result<Box<dyn Any>> {
        let value: Option<T> = match inner {
            Some(b) => Some(*downcast_box::<T>(b)?),
            None => None,
        };
        Ok(Box::new(value))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            Shape::Optional(OptionalInfo {
                inner: TypeRef::of::<T>(),
                ops: Arc::new(OptionOps::<T>(PhantomData)),
            }),
        )
    }
}

struct BoxOps<T>(PhantomData<fn() -> T>);

impl<T: Reflect> PointerOps for BoxOps<T> {
    fn deref<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Any> {
        Ok(&**downcast_ref::<Box<T>>(value)?)
    }

    fn wrap(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>> {
        Ok(Box::new(downcast_box::<T>(inner)?))
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            Shape::Pointer(PointerInfo {
                inner: TypeRef::of::<T>(),
                ops: Arc::new(BoxOps::<T>(PhantomData)),
            }),
        )
    }
}

struct ArcOps<T>(PhantomData<fn() -> T>);

impl<T: Reflect> PointerOps for ArcOps<T> {
    fn deref<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Any> {
        Ok(&**downcast_ref::<Arc<T>>(value)?)
    }

    fn wrap(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>> {
        Ok(Box::new(Arc::<T>::from(downcast_box::<T>(inner)?)))
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            Shape::Pointer(PointerInfo {
                inner: TypeRef::of::<T>(),
                ops: Arc::new(ArcOps::<T>(PhantomData)),
            }),
        )
    }
}

// ============================================================================
// Sequences
// ============================================================================

/// Container-side hooks shared by every sequence impl.
trait Sequence: Any + Sized {
    type Item: Reflect;
    fn visit(&self, f: &mut dyn FnMut(&dyn Any) -> Result<()>) -> Result<()>;
    fn builder(size_hint: usize) -> Box<dyn SequenceBuilder>;
}

struct SeqOps<C>(PhantomData<fn() -> C>);

impl<C: Sequence> SequenceOps for SeqOps<C> {
    fn for_each(
        &self,
        value: &dyn Any,
        f: &mut dyn FnMut(&dyn Any) -> Result<()>,
    ) -> Result<()> {
        downcast_ref::<C>(value)?.visit(f)
    }

    fn builder(&self, size_hint: usize) -> Box<dyn SequenceBuilder> {
        C::builder(size_hint)
    }
}

fn sequence_info<C: Sequence>(fixed_len: Option<usize>) -> SequenceInfo {
    SequenceInfo {
        elem: TypeRef::of::<C::Item>(),
        fixed_len,
        ops: Arc::new(SeqOps::<C>(PhantomData)),
    }
}

/// Incremental target: `add` returns `false` for a rejected duplicate.
trait Extend1<T>: Any {
    fn add(&mut self, item: T) -> bool;
}

impl<T: Any> Extend1<T> for Vec<T> {
    fn add(&mut self, item: T) -> bool {
        self.push(item);
        true
    }
}

impl<T: Any> Extend1<T> for VecDeque<T> {
    fn add(&mut self, item: T) -> bool {
        self.push_back(item);
        true
    }
}

impl<T: Any + Ord> Extend1<T> for BTreeSet<T> {
    fn add(&mut self, item: T) -> bool {
        self.insert(item)
    }
}

impl<T: Any + Eq + Hash> Extend1<T> for HashSet<T> {
    fn add(&mut self, item: T) -> bool {
        self.insert(item)
    }
}

struct Incremental<T, C> {
    target: C,
    _item: PhantomData<fn() -> T>,
}

impl<T: Any, C: Extend1<T>> SequenceBuilder for Incremental<T, C> {
    fn push(&mut self, item: Box<dyn Any>) -> Result<bool> {
        Ok(self.target.add(*downcast_box::<T>(item)?))
    }

    fn push_scalar(&mut self, item: Scalar) -> Result<bool> {
        Ok(self.target.add(item.expect::<T>()?))
    }

    fn finish(self: Box<Self>) -> Result<Box<dyn Any>> {
        Ok(Box::new(self.target))
    }
}

/// Buffer elements, then build the container once.
struct Materialize<T> {
    items: Vec<T>,
    build: fn(Vec<T>) -> Result<Box<dyn Any>>,
}

impl<T: Any> SequenceBuilder for Materialize<T> {
    fn push(&mut self, item: Box<dyn Any>) -> Result<bool> {
        self.items.push(*downcast_box::<T>(item)?);
        Ok(true)
    }

    fn push_scalar(&mut self, item: Scalar) -> Result<bool> {
        self.items.push(item.expect::<T>()?);
        Ok(true)
    }

    fn finish(self: Box<Self>) -> Result<Box<dyn Any>> {
        (self.build)(self.items)
    }
}

/// Iteration-based container described as an incremental sequence.
macro_rules! impl_incremental_sequence {
    ($container:ident, $with_capacity:expr, [$($bound:tt)*]) => {
        impl<T: Reflect $($bound)*> Sequence for $container<T> {
            type Item = T;
            fn visit(&self, f: &mut dyn FnMut(&dyn Any) -> Result<()>) -> Result<()> {
                for item in self.iter() {
                    f(item)?;
                }
                Ok(())
            }

            fn builder(size_hint: usize) -> Box<dyn SequenceBuilder> {
                let make: fn(usize) -> $container<T> = $with_capacity;
                Box::new(Incremental {
                    target: make(size_hint),
                    _item: PhantomData,
                })
            }
        }

        impl<T: Reflect $($bound)*> Reflect for $container<T> {
            fn type_info() -> TypeInfo {
                TypeInfo::new(
                    type_name::<Self>(),
                    Shape::Collection(sequence_info::<Self>(None)),
                )
            }
        }
    };
}

impl_incremental_sequence!(Vec, Vec::with_capacity, []);
impl_incremental_sequence!(VecDeque, VecDeque::with_capacity, []);
impl_incremental_sequence!(BTreeSet, |_| BTreeSet::new(), [+ Ord]);
impl_incremental_sequence!(HashSet, HashSet::with_capacity, [+ Eq + Hash]);

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    type Item = T;
    fn visit(&self, f: &mut dyn FnMut(&dyn Any) -> Result<()>) -> Result<()> {
        for item in self.iter() {
            f(item)?;
        }
        Ok(())
    }

    fn builder(size_hint: usize) -> Box<dyn SequenceBuilder> {
        Box::new(Materialize::<T> {
            items: Vec::with_capacity(size_hint.min(N)),
            build: |items| {
                let len = items.len();
                <[T; N]>::try_from(items)
                    .map(|array| Box::new(array) as Box<dyn Any>)
                    .map_err(|_| {
                        Error::validation(format!("expected {} elements, found {}", N, len))
                    })
            },
        })
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            Shape::Array(sequence_info::<Self>(Some(N))),
        )
    }
}

impl<T: Reflect> Sequence for Box<[T]> {
    type Item = T;
    fn visit(&self, f: &mut dyn FnMut(&dyn Any) -> Result<()>) -> Result<()> {
        for item in self.iter() {
            f(item)?;
        }
        Ok(())
    }

    fn builder(size_hint: usize) -> Box<dyn SequenceBuilder> {
        Box::new(Materialize::<T> {
            items: Vec::with_capacity(size_hint),
            build: |items| Ok(Box::new(items.into_boxed_slice())),
        })
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            Shape::Array(sequence_info::<Self>(None)),
        )
    }
}

// ============================================================================
// Maps
// ============================================================================

trait Mapping: Any + Sized {
    type Key: Reflect;
    type Value: Reflect;

    fn visit(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>) -> Result<()>;
    fn create(size_hint: usize) -> Self;
    /// `false` when the key was already present.
    fn add(&mut self, key: Self::Key, value: Self::Value) -> bool;
}

impl<K: Reflect + Ord, V: Reflect> Mapping for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn visit(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>) -> Result<()> {
        for (k, v) in self.iter() {
            f(k, v)?;
        }
        Ok(())
    }

    fn create(_size_hint: usize) -> Self {
        BTreeMap::new()
    }

    fn add(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }
}

impl<K: Reflect + Eq + Hash, V: Reflect> Mapping for HashMap<K, V> {
    type Key = K;
    type Value = V;

    fn visit(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>) -> Result<()> {
        for (k, v) in self.iter() {
            f(k, v)?;
        }
        Ok(())
    }

    fn create(size_hint: usize) -> Self {
        HashMap::with_capacity(size_hint)
    }

    fn add(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            std::collections::hash_map::Entry::Occupied(_) => false,
        }
    }
}

struct MappingOps<M>(PhantomData<fn() -> M>);

impl<M: Mapping> MapOps for MappingOps<M> {
    fn for_each(
        &self,
        value: &dyn Any,
        f: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>,
    ) -> Result<()> {
        downcast_ref::<M>(value)?.visit(f)
    }

    fn builder(&self, size_hint: usize) -> Box<dyn MapBuilder> {
        Box::new(MappingBuilder(M::create(size_hint)))
    }
}

struct MappingBuilder<M>(M);

impl<M: Mapping> MapBuilder for MappingBuilder<M> {
    fn insert(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<bool> {
        let key = *downcast_box::<M::Key>(key)?;
        let value = *downcast_box::<M::Value>(value)?;
        Ok(self.0.add(key, value))
    }

    fn finish(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.0)
    }
}

fn map_shape<M: Mapping>() -> Shape {
    Shape::Map(MapInfo {
        key: TypeRef::of::<M::Key>(),
        value: TypeRef::of::<M::Value>(),
        ops: Arc::new(MappingOps::<M>(PhantomData)),
    })
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), map_shape::<Self>())
    }
}

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), map_shape::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_ops<T: Reflect>() -> SequenceInfo {
        match T::type_info().shape {
            Shape::Collection(info) | Shape::Array(info) => info,
            other => panic!("not a sequence: {}", other.kind_name()),
        }
    }

    #[test]
    fn test_set_builder_rejects_duplicates() {
        let info = seq_ops::<BTreeSet<i32>>();
        let mut builder = info.ops.builder(2);
        assert!(builder.push(Box::new(1i32)).unwrap());
        assert!(!builder.push_scalar(Scalar::I32(1)).unwrap());
        let built = builder.finish().unwrap();
        assert_eq!(built.downcast_ref::<BTreeSet<i32>>().unwrap().len(), 1);
    }

    #[test]
    fn test_fixed_array_length_mismatch() {
        let info = seq_ops::<[u8; 3]>();
        assert_eq!(info.fixed_len, Some(3));
        let mut builder = info.ops.builder(3);
        builder.push_scalar(Scalar::U8(1)).unwrap();
        let err = builder.finish().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_option_project_and_wrap() {
        let ops = match Option::<String>::type_info().shape {
            Shape::Optional(info) => info.ops,
            _ => panic!("option shape"),
        };
        let some = Some("a".to_string());
        assert!(ops.project(&some).unwrap().is_some());
        let none = ops.wrap(None).unwrap();
        assert_eq!(none.downcast_ref::<Option<String>>(), Some(&None));
    }

    #[test]
    fn test_map_builder_duplicate_key() {
        let ops = match HashMap::<u8, String>::type_info().shape {
            Shape::Map(info) => info.ops,
            _ => panic!("map shape"),
        };
        let mut builder = ops.builder(0);
        assert!(builder
            .insert(Box::new(1u8), Box::new("a".to_string()))
            .unwrap());
        assert!(!builder
            .insert(Box::new(1u8), Box::new("b".to_string()))
            .unwrap());
    }
}
