// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Classified type descriptors.

use crate::error::Result;
use crate::reflect::{
    EnumOps, InterfaceOps, MapInfo, MemberAccess, NumericKind, OptionalOps, PointerOps,
    PrimitiveKind, SequenceInfo, TypeRef,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// User-registered blank-instance factory.
pub type Factory = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Structural classification of one type.
///
/// Children are held as [`TypeRef`]s, never as nested descriptors, so a
/// self-referential definition stays finite.
pub enum TypeDescriptor {
    PrimitiveBool,
    PrimitiveNumeric(NumericKind),
    PrimitiveChar,
    /// `Option<primitive>`.
    BoxedPrimitive {
        kind: PrimitiveKind,
        ops: Arc<dyn OptionalOps>,
    },
    String,
    Enum {
        variants: Vec<&'static str>,
        ops: Arc<dyn EnumOps>,
    },
    Array(SequenceInfo),
    /// Array of a primitive element, coded unboxed.
    PrimitiveArray {
        kind: PrimitiveKind,
        seq: SequenceInfo,
    },
    Collection(SequenceInfo),
    Map(MapInfo),
    Interface(InterfaceDescriptor),
    Object(ObjectDescriptor),
    /// `Option` of a non-primitive.
    Nullable {
        inner: TypeRef,
        ops: Arc<dyn OptionalOps>,
    },
    Pointer {
        inner: TypeRef,
        ops: Arc<dyn PointerOps>,
    },
}

impl TypeDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::PrimitiveBool => "PrimitiveBool",
            TypeDescriptor::PrimitiveNumeric(_) => "PrimitiveNumeric",
            TypeDescriptor::PrimitiveChar => "PrimitiveChar",
            TypeDescriptor::BoxedPrimitive { .. } => "BoxedPrimitive",
            TypeDescriptor::String => "String",
            TypeDescriptor::Enum { .. } => "Enum",
            TypeDescriptor::Array(_) => "Array",
            TypeDescriptor::PrimitiveArray { .. } => "PrimitiveArray",
            TypeDescriptor::Collection(_) => "Collection",
            TypeDescriptor::Map(_) => "Map",
            TypeDescriptor::Interface(_) => "Interface",
            TypeDescriptor::Object(_) => "Object",
            TypeDescriptor::Nullable { .. } => "Nullable",
            TypeDescriptor::Pointer { .. } => "Pointer",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            TypeDescriptor::Object(object) => Some(object),
            _ => None,
        }
    }

    /// True when values are encoded as an object (and can carry a tag
    /// directly).
    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescriptor::Object(_))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Object(object) => f
                .debug_struct("Object")
                .field("name", &object.name)
                .field("members", &object.members)
                .field("plan", &object.plan)
                .finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// One encodable member of an object.
pub struct MemberDescriptor {
    /// Encoded field name, unique within the object.
    pub name: String,
    /// Short name of the type that declares the member.
    pub declaring_type: &'static str,
    pub ty: TypeRef,
    pub access: Arc<dyn MemberAccess>,
    /// Position in enumeration order, also the positional argument index.
    pub slot: usize,
    /// Present when the member is an `Option`.
    pub nullable: Option<Arc<dyn OptionalOps>>,
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("slot", &self.slot)
            .finish()
    }
}

/// How a decoded object is built.
#[derive(Clone)]
pub enum ConstructionPlan {
    /// Blank instance from the no-arg constructor, members set afterwards.
    NoArgMutate(fn() -> Box<dyn Any>),
    /// All members gathered, then passed to the positional constructor.
    PositionalConstruct {
        arity: usize,
        /// Parameter types in member order.
        params: Vec<TypeRef>,
        build: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>,
    },
    /// Blank instance from a registered factory, members set afterwards.
    UserFactory(Factory),
    /// Encoding only; decoding reports the reason.
    Unavailable(String),
}

impl ConstructionPlan {
    pub fn name(&self) -> &'static str {
        match self {
            ConstructionPlan::NoArgMutate(_) => "NoArgMutate",
            ConstructionPlan::PositionalConstruct { .. } => "PositionalConstruct",
            ConstructionPlan::UserFactory(_) => "UserFactory",
            ConstructionPlan::Unavailable(_) => "Unavailable",
        }
    }
}

impl fmt::Debug for ConstructionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionPlan::PositionalConstruct { arity, .. } => {
                write!(f, "PositionalConstruct({})", arity)
            }
            ConstructionPlan::Unavailable(reason) => write!(f, "Unavailable({})", reason),
            other => f.write_str(other.name()),
        }
    }
}

pub struct ObjectDescriptor {
    pub name: &'static str,
    pub members: Vec<MemberDescriptor>,
    pub plan: ConstructionPlan,
}

impl ObjectDescriptor {
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A registered implementor of an interface.
#[derive(Debug, Clone)]
pub struct Implementor {
    pub ty: TypeRef,
    /// Tag name.
    pub name: &'static str,
}

#[derive(Clone)]
pub struct InterfaceDescriptor {
    pub name: &'static str,
    pub default: Option<TypeRef>,
    pub implementors: Vec<Implementor>,
    pub ops: Arc<dyn InterfaceOps>,
}

impl InterfaceDescriptor {
    pub fn implementor(&self, ty: TypeRef) -> Option<&Implementor> {
        self.implementors.iter().find(|i| i.ty == ty)
    }

    pub fn implementor_by_id(&self, id: std::any::TypeId) -> Option<&Implementor> {
        self.implementors.iter().find(|i| i.ty.id() == id)
    }
}
