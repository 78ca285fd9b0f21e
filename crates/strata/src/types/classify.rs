// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Classification rules.

use super::descriptor::{
    ConstructionPlan, Implementor, InterfaceDescriptor, MemberDescriptor, ObjectDescriptor,
    TypeDescriptor,
};
use super::ClassifyContext;
use crate::error::{Error, Result};
use crate::reflect::{
    short_name, BaseInfo, Chained, InterfaceInfo, MemberAccess, MemberInfo, ObjectInfo,
    PrimitiveKind, Shape, TypeRef,
};
use std::collections::HashMap;
use std::sync::Arc;

pub(super) fn classify(ty: TypeRef, ctx: &ClassifyContext<'_>) -> Result<TypeDescriptor> {
    let info = ty.info();
    let name = info.name;
    let descriptor = match info.shape {
        Shape::Primitive(PrimitiveKind::Bool) => TypeDescriptor::PrimitiveBool,
        Shape::Primitive(PrimitiveKind::Char) => TypeDescriptor::PrimitiveChar,
        Shape::Primitive(PrimitiveKind::Numeric(kind)) => TypeDescriptor::PrimitiveNumeric(kind),
        Shape::Optional(opt) if nests_optional(opt.inner) => {
            return Err(Error::config(format!(
                "{} nests an Option in an Option: None and Some(None) both encode as null",
                name
            )))
        }
        Shape::Optional(opt) => match opt.inner.info().shape {
            Shape::Primitive(kind) => TypeDescriptor::BoxedPrimitive { kind, ops: opt.ops },
            _ => TypeDescriptor::Nullable {
                inner: opt.inner,
                ops: opt.ops,
            },
        },
        Shape::Array(seq) => match seq.elem.info().shape {
            Shape::Primitive(kind) => TypeDescriptor::PrimitiveArray { kind, seq },
            _ => TypeDescriptor::Array(seq),
        },
        Shape::Enum(e) => {
            if e.variants.is_empty() {
                return Err(Error::config(format!("enum {} has no variants", name)));
            }
            TypeDescriptor::Enum {
                variants: e.variants,
                ops: e.ops,
            }
        }
        Shape::String => TypeDescriptor::String,
        Shape::Map(map) => TypeDescriptor::Map(map),
        Shape::Collection(seq) => TypeDescriptor::Collection(seq),
        Shape::Pointer(ptr) => TypeDescriptor::Pointer {
            inner: ptr.inner,
            ops: ptr.ops,
        },
        Shape::Interface(iface) => TypeDescriptor::Interface(interface(iface, ctx)?),
        Shape::Object(object) => TypeDescriptor::Object(self::object(ty, name, object, ctx)?),
    };
    Ok(descriptor)
}

/// `true` when `ty` is an `Option`, possibly behind `Box`/`Arc` pointers.
fn nests_optional(mut ty: TypeRef) -> bool {
    loop {
        match ty.info().shape {
            Shape::Optional(_) => return true,
            Shape::Pointer(ptr) => ty = ptr.inner,
            _ => return false,
        }
    }
}

fn interface(info: InterfaceInfo, ctx: &ClassifyContext<'_>) -> Result<InterfaceDescriptor> {
    let implementors: Vec<Implementor> = info
        .implementors
        .iter()
        .map(|ty| Implementor {
            ty: *ty,
            name: ty.info().name,
        })
        .collect();

    let default = match ctx.config.default_implementations.get(info.name) {
        Some(wanted) => {
            let found = implementors
                .iter()
                .find(|i| i.name == wanted.as_str())
                .ok_or_else(|| {
                    Error::config(format!(
                        "default implementation {} is not an implementor of {}",
                        wanted, info.name
                    ))
                })?;
            Some(found.ty)
        }
        None => info.default,
    };
    if let Some(default) = default {
        if !implementors.iter().any(|i| i.ty == default) {
            return Err(Error::config(format!(
                "default type {} is not an implementor of {}",
                default.rust_name(),
                info.name
            )));
        }
    }

    Ok(InterfaceDescriptor {
        name: info.name,
        default,
        implementors,
        ops: info.ops,
    })
}

/// Member before name disambiguation.
struct RawMember {
    name: &'static str,
    /// Full path of the declaring type.
    declared_in: &'static str,
    declaring_type: &'static str,
    ty: TypeRef,
    access: Arc<dyn MemberAccess>,
}

/// Own members first, then each base (recursively) in declaration order.
fn collect_members(
    declared_in: &'static str,
    members: Vec<MemberInfo>,
    bases: Vec<BaseInfo>,
    prefix: Option<&Arc<dyn MemberAccess>>,
    out: &mut Vec<RawMember>,
) -> Result<()> {
    for member in members {
        let access: Arc<dyn MemberAccess> = match prefix {
            Some(outer) => Arc::new(Chained::new(Arc::clone(outer), member.access)),
            None => member.access,
        };
        out.push(RawMember {
            name: member.name,
            declared_in,
            declaring_type: short_name(declared_in),
            ty: member.ty,
            access,
        });
    }
    for base in bases {
        let info = base.ty.info();
        let object = match info.shape {
            Shape::Object(object) => object,
            other => {
                return Err(Error::config(format!(
                    "base {} of {} is a {}, not an object",
                    info.name,
                    declared_in,
                    other.kind_name()
                )))
            }
        };
        let outer: Arc<dyn MemberAccess> = match prefix {
            Some(p) => Arc::new(Chained::new(Arc::clone(p), base.access)),
            None => base.access,
        };
        collect_members(
            info.name,
            object.members,
            object.bases,
            Some(&outer),
            out,
        )?;
    }
    Ok(())
}

/// Qualify shadowed ancestor members as `<DeclaringType>.<name>`.
fn disambiguate(type_name: &str, raw: Vec<RawMember>) -> Result<Vec<MemberDescriptor>> {
    let mut used: HashMap<String, &'static str> = HashMap::with_capacity(raw.len());
    let mut members = Vec::with_capacity(raw.len());
    for (slot, member) in raw.into_iter().enumerate() {
        let name = match used.get(member.name) {
            None => member.name.to_string(),
            Some(&earlier) if earlier == member.declared_in => {
                return Err(Error::config(format!(
                    "{} declares member '{}' twice",
                    type_name, member.name
                )))
            }
            Some(_) => {
                let qualified = format!("{}.{}", member.declaring_type, member.name);
                if used.contains_key(&qualified) {
                    return Err(Error::config(format!(
                        "member '{}' of {} is ambiguous even when qualified",
                        qualified, type_name
                    )));
                }
                log::debug!(
                    "[Classifier] {} shadows {}; encoding it as '{}'",
                    type_name,
                    member.name,
                    qualified
                );
                qualified
            }
        };
        used.insert(name.clone(), member.declared_in);
        let nullable = match member.ty.info().shape {
            Shape::Optional(opt) => Some(opt.ops),
            _ => None,
        };
        members.push(MemberDescriptor {
            name,
            declaring_type: member.declaring_type,
            ty: member.ty,
            access: member.access,
            slot,
            nullable,
        });
    }
    Ok(members)
}

fn object(
    ty: TypeRef,
    name: &'static str,
    info: ObjectInfo,
    ctx: &ClassifyContext<'_>,
) -> Result<ObjectDescriptor> {
    let mut raw = Vec::new();
    collect_members(name, info.members, info.bases, None, &mut raw)?;
    let members = disambiguate(name, raw)?;

    let plan = if let Some(blank) = info.no_arg {
        ConstructionPlan::NoArgMutate(blank)
    } else {
        let mut matching = info.constructors.iter().filter(|c| {
            c.params.len() == members.len()
                && c.params.iter().zip(&members).all(|(p, m)| *p == m.ty)
        });
        match (matching.next(), matching.next()) {
            (Some(ctor), None) => ConstructionPlan::PositionalConstruct {
                arity: ctor.params.len(),
                params: ctor.params.clone(),
                build: ctor.build,
            },
            _ => match ctx.factories.get(&ty.id()) {
                Some(factory) => ConstructionPlan::UserFactory(Arc::clone(factory.value())),
                None => {
                    let reason = format!(
                        "{} has no no-arg constructor, no unique positional constructor \
                         over its {} members and no registered factory",
                        name,
                        members.len()
                    );
                    if ctx.config.fail_on_no_type_constructor {
                        return Err(Error::config(reason));
                    }
                    log::debug!("[Classifier] {}; decoding will fail", reason);
                    ConstructionPlan::Unavailable(reason)
                }
            },
        }
    };
    log::debug!(
        "[Classifier] {}: {} members, plan {}",
        name,
        members.len(),
        plan.name()
    );

    Ok(ObjectDescriptor {
        name,
        members,
        plan,
    })
}
