// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type description layer.
//!
//! A type opts into the codec engine by implementing [`Reflect`], usually via
//! `#[derive(Reflect)]`. The returned [`TypeInfo`] names the type and
//! describes its [`Shape`]: which structural category it belongs to plus the
//! erased accessors the codecs need to read and build values of it.
//!
//! Nested types are referenced through [`TypeRef`], a bundle of function
//! pointers, so a recursive type (a node holding `Option<Box<Self>>`) is
//! described without recursing at description time.
//!
//! ```rust
//! use strata::reflect::{Reflect, Shape};
//!
//! #[derive(strata::Reflect)]
//! struct Sample {
//!     id: u32,
//!     label: Option<String>,
//! }
//!
//! let info = Sample::type_info();
//! assert!(info.name.ends_with("::Sample"));
//! assert!(matches!(info.shape, Shape::Object(_)));
//! ```

mod access;
mod impls;
mod interface;
mod scalar;

pub use access::{take_arg, Chained, FieldAccess, MemberAccess};
pub use scalar::Scalar;

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Compile-time "describe this type" capability.
pub trait Reflect: Any {
    fn type_info() -> TypeInfo;
}

/// Object-safe access to `&dyn Any` for trait objects.
///
/// Traits used behind `Box<dyn Trait>` with [`reflect_interface!`] must
/// extend this trait; the blanket impl covers every concrete type.
///
/// [`reflect_interface!`]: crate::reflect_interface
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Type references
// ============================================================================

/// Lazy handle to a reflected type.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: fn() -> TypeId,
    rust_name: fn() -> &'static str,
    info: fn() -> TypeInfo,
}

impl TypeRef {
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>,
            rust_name: std::any::type_name::<T>,
            info: T::type_info,
        }
    }

    pub fn id(&self) -> TypeId {
        (self.id)()
    }

    /// Compiler-provided name, for diagnostics only.
    pub fn rust_name(&self) -> &'static str {
        (self.rust_name)()
    }

    /// Build the type's description.
    pub fn info(&self) -> TypeInfo {
        (self.info)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.rust_name()).finish()
    }
}

/// Description of one type.
pub struct TypeInfo {
    /// Qualified name: discriminator tag and allow-list key.
    pub name: &'static str,
    pub shape: Shape,
}

impl TypeInfo {
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self { name, shape }
    }

    /// Last `::` segment of the name, generics stripped.
    pub fn short_name(&self) -> &'static str {
        short_name(self.name)
    }
}

pub(crate) fn short_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// Shapes
// ============================================================================

/// Structural category of a type.
pub enum Shape {
    Primitive(PrimitiveKind),
    String,
    /// `Option<T>`: the nullable form of `T`.
    Optional(OptionalInfo),
    /// `Box<T>` / `Arc<T>`: transparent indirection.
    Pointer(PointerInfo),
    /// Unit-only enum.
    Enum(EnumInfo),
    /// Fixed or boxed slice (`[T; N]`, `Box<[T]>`).
    Array(SequenceInfo),
    Collection(SequenceInfo),
    Map(MapInfo),
    /// `Box<dyn Trait>`: concrete type picked at runtime.
    Interface(InterfaceInfo),
    Object(ObjectInfo),
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Primitive(_) => "primitive",
            Shape::String => "string",
            Shape::Optional(_) => "optional",
            Shape::Pointer(_) => "pointer",
            Shape::Enum(_) => "enum",
            Shape::Array(_) => "array",
            Shape::Collection(_) => "collection",
            Shape::Map(_) => "map",
            Shape::Interface(_) => "interface",
            Shape::Object(_) => "object",
        }
    }
}

/// Numeric primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Usize,
    Isize,
    F32,
    F64,
}

/// Primitive leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    Numeric(NumericKind),
}

pub struct OptionalInfo {
    pub inner: TypeRef,
    pub ops: Arc<dyn OptionalOps>,
}

pub struct PointerInfo {
    pub inner: TypeRef,
    pub ops: Arc<dyn PointerOps>,
}

pub struct EnumInfo {
    pub variants: Vec<&'static str>,
    pub ops: Arc<dyn EnumOps>,
}

impl EnumInfo {
    /// Describe a unit-only enum from its variant ordinal mapping.
    pub fn of<E: Any>(
        variants: Vec<&'static str>,
        ordinal: fn(&E) -> usize,
        from_ordinal: fn(usize) -> Option<E>,
    ) -> Self {
        Self {
            variants,
            ops: Arc::new(EnumFns {
                ordinal,
                from_ordinal,
            }),
        }
    }
}

pub struct SequenceInfo {
    pub elem: TypeRef,
    /// Required element count (`[T; N]`).
    pub fixed_len: Option<usize>,
    pub ops: Arc<dyn SequenceOps>,
}

pub struct MapInfo {
    pub key: TypeRef,
    pub value: TypeRef,
    pub ops: Arc<dyn MapOps>,
}

/// `Box<dyn Trait>` description, built by [`reflect_interface!`].
///
/// [`reflect_interface!`]: crate::reflect_interface
pub struct InterfaceInfo {
    /// Trait path.
    pub name: &'static str,
    /// Concrete type used when no tag is present.
    pub default: Option<TypeRef>,
    pub implementors: Vec<TypeRef>,
    pub ops: Arc<dyn InterfaceOps>,
}

/// Named-member aggregate.
pub struct ObjectInfo {
    pub members: Vec<MemberInfo>,
    /// Embedded ancestors; their members follow the type's own.
    pub bases: Vec<BaseInfo>,
    pub no_arg: Option<fn() -> Box<dyn Any>>,
    pub constructors: Vec<Constructor>,
}

impl ObjectInfo {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            bases: Vec::new(),
            no_arg: None,
            constructors: Vec::new(),
        }
    }

    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    pub fn base(mut self, base: BaseInfo) -> Self {
        self.bases.push(base);
        self
    }

    /// Expose `O::default()` as the no-arg constructor.
    pub fn default_constructor<O: Default + Any>(mut self) -> Self {
        let blank: fn() -> Box<dyn Any> = || Box::new(O::default());
        self.no_arg = Some(blank);
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }
}

impl Default for ObjectInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// One declared member.
pub struct MemberInfo {
    pub name: &'static str,
    pub ty: TypeRef,
    pub access: Arc<dyn MemberAccess>,
}

impl MemberInfo {
    /// Member backed by a struct field.
    pub fn field<O: Any, F: Reflect>(
        name: &'static str,
        get: fn(&O) -> &F,
        get_mut: fn(&mut O) -> &mut F,
    ) -> Self {
        Self {
            name,
            ty: TypeRef::of::<F>(),
            access: Arc::new(FieldAccess::new(get, get_mut)),
        }
    }
}

/// An embedded ancestor value.
pub struct BaseInfo {
    pub ty: TypeRef,
    pub access: Arc<dyn MemberAccess>,
}

impl BaseInfo {
    pub fn field<O: Any, B: Reflect>(get: fn(&O) -> &B, get_mut: fn(&mut O) -> &mut B) -> Self {
        Self {
            ty: TypeRef::of::<B>(),
            access: Arc::new(FieldAccess::new(get, get_mut)),
        }
    }
}

/// Positional constructor.
pub struct Constructor {
    pub params: Vec<TypeRef>,
    pub build: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>,
}

impl Constructor {
    pub fn new(params: Vec<TypeRef>, build: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>) -> Self {
        Self { params, build }
    }
}

// ============================================================================
// Erased operations
// ============================================================================

pub trait OptionalOps: Send + Sync {
    fn project<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>>;
    fn wrap(&self, inner: Option<Box<dyn Any>>) -> Result<Box<dyn Any>>;
}

pub trait PointerOps: Send + Sync {
    fn deref<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Any>;
    fn wrap(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>>;
}

pub trait EnumOps: Send + Sync {
    fn ordinal(&self, value: &dyn Any) -> Result<usize>;
    fn from_ordinal(&self, ordinal: usize) -> Result<Box<dyn Any>>;
}

pub trait SequenceOps: Send + Sync {
    fn for_each(
        &self,
        value: &dyn Any,
        f: &mut dyn FnMut(&dyn Any) -> Result<()>,
    ) -> Result<()>;
    /// Incremental containers grow per element; arrays and boxed slices
    /// buffer and construct in `finish`.
    fn builder(&self, size_hint: usize) -> Box<dyn SequenceBuilder>;
}

/// Accumulates decoded elements.
pub trait SequenceBuilder {
    /// `false` when the element was rejected as a duplicate.
    fn push(&mut self, item: Box<dyn Any>) -> Result<bool>;

    /// Unboxed element.
    fn push_scalar(&mut self, item: Scalar) -> Result<bool> {
        self.push(item.into_any())
    }

    fn finish(self: Box<Self>) -> Result<Box<dyn Any>>;
}

pub trait MapOps: Send + Sync {
    fn for_each(
        &self,
        value: &dyn Any,
        f: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>,
    ) -> Result<()>;
    fn builder(&self, size_hint: usize) -> Box<dyn MapBuilder>;
}

pub trait MapBuilder {
    /// `false` when the key was already present.
    fn insert(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<bool>;
    fn finish(self: Box<Self>) -> Box<dyn Any>;
}

pub trait InterfaceOps: Send + Sync {
    /// The concrete value behind a `Box<dyn Trait>`.
    fn concrete<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Any>;
    /// Coerce a decoded implementor into `Box<dyn Trait>`.
    fn upcast(&self, concrete: Box<dyn Any>) -> Result<Box<dyn Any>>;
}

struct EnumFns<E> {
    ordinal: fn(&E) -> usize,
    from_ordinal: fn(usize) -> Option<E>,
}

impl<E: Any> EnumOps for EnumFns<E> {
    fn ordinal(&self, value: &dyn Any) -> Result<usize> {
        Ok((self.ordinal)(downcast_ref::<E>(value)?))
    }

    fn from_ordinal(&self, ordinal: usize) -> Result<Box<dyn Any>> {
        (self.from_ordinal)(ordinal)
            .map(|e| Box::new(e) as Box<dyn Any>)
            .ok_or_else(|| {
                Error::validation(format!(
                    "ordinal {} out of range for {}",
                    ordinal,
                    std::any::type_name::<E>()
                ))
            })
    }
}

// ============================================================================
// Downcast helpers
// ============================================================================

pub fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| Error::mismatch(std::any::type_name::<T>()))
}

pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> Result<&mut T> {
    value
        .downcast_mut::<T>()
        .ok_or_else(|| Error::mismatch(std::any::type_name::<T>()))
}

pub fn downcast_box<T: Any>(value: Box<dyn Any>) -> Result<Box<T>> {
    value
        .downcast::<T>()
        .map_err(|_| Error::mismatch(std::any::type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("a::b::Circle"), "Circle");
        assert_eq!(short_name("Plain"), "Plain");
        assert_eq!(short_name("a::Wrapper<b::C>"), "Wrapper");
    }

    #[test]
    fn test_type_ref_identity() {
        let a = TypeRef::of::<Vec<i32>>();
        let b = TypeRef::of::<Vec<i32>>();
        assert_eq!(a, b);
        assert_ne!(a, TypeRef::of::<Vec<i64>>());
        assert!(matches!(a.info().shape, Shape::Collection(_)));
    }

    #[test]
    fn test_downcast_mismatch_is_validation() {
        let value: Box<dyn Any> = Box::new(5i32);
        assert!(downcast_ref::<i64>(&*value).unwrap_err().is_validation());
        assert_eq!(*downcast_box::<i32>(value).unwrap(), 5);
    }
}
