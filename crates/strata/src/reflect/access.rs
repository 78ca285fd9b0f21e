// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Erased member accessors.

use super::{downcast_box, downcast_mut, downcast_ref};
use crate::error::{Error, Result};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Read, borrow mutably, or replace one member of an erased owner.
pub trait MemberAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Any>;
    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<&'a mut dyn Any>;
    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<()>;
}

/// Accessor for field `F` of struct `O`, built from projection functions.
pub struct FieldAccess<O, F> {
    get: fn(&O) -> &F,
    get_mut: fn(&mut O) -> &mut F,
    _owner: PhantomData<fn() -> (O, F)>,
}

impl<O, F> FieldAccess<O, F> {
    pub fn new(get: fn(&O) -> &F, get_mut: fn(&mut O) -> &mut F) -> Self {
        Self {
            get,
            get_mut,
            _owner: PhantomData,
        }
    }
}

impl<O: Any, F: Any> MemberAccess for FieldAccess<O, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Any> {
        Ok((self.get)(downcast_ref::<O>(owner)?))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<&'a mut dyn Any> {
        Ok((self.get_mut)(downcast_mut::<O>(owner)?))
    }

    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
        let slot = (self.get_mut)(downcast_mut::<O>(owner)?);
        *slot = *downcast_box::<F>(value)?;
        Ok(())
    }
}

/// Member of an embedded ancestor: `outer` reaches the base value,
/// `inner` the member inside it.
pub struct Chained {
    outer: Arc<dyn MemberAccess>,
    inner: Arc<dyn MemberAccess>,
}

impl Chained {
    pub fn new(outer: Arc<dyn MemberAccess>, inner: Arc<dyn MemberAccess>) -> Self {
        Self { outer, inner }
    }
}

impl MemberAccess for Chained {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Any> {
        self.inner.get(self.outer.get(owner)?)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<&'a mut dyn Any> {
        self.inner.get_mut(self.outer.get_mut(owner)?)
    }

    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
        self.inner.set(self.outer.get_mut(owner)?, value)
    }
}

/// Pop the next positional constructor argument as `T`.
pub fn take_arg<T: Any>(args: &mut impl Iterator<Item = Box<dyn Any>>) -> Result<T> {
    let arg = args.next().ok_or_else(|| {
        Error::validation(format!(
            "missing constructor argument of type {}",
            std::any::type_name::<T>()
        ))
    })?;
    downcast_box::<T>(arg).map(|b| *b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        label: String,
    }

    #[test]
    fn test_field_access() {
        let access = FieldAccess::<Derived, String>::new(|o| &o.label, |o| &mut o.label);
        let mut value = Derived::default();
        access.set(&mut value, Box::new("x".to_string())).unwrap();
        let read = access.get(&value).unwrap();
        assert_eq!(read.downcast_ref::<String>().unwrap(), "x");
        assert!(access.set(&mut value, Box::new(1u8)).is_err());
    }

    #[test]
    fn test_chained_reaches_base_member() {
        let outer: Arc<dyn MemberAccess> =
            Arc::new(FieldAccess::<Derived, Base>::new(|o| &o.base, |o| &mut o.base));
        let inner: Arc<dyn MemberAccess> =
            Arc::new(FieldAccess::<Base, u32>::new(|o| &o.id, |o| &mut o.id));
        let chained = Chained::new(outer, inner);
        let mut value = Derived::default();
        chained.set(&mut value, Box::new(9u32)).unwrap();
        assert_eq!(value.base.id, 9);
        assert_eq!(chained.get(&value).unwrap().downcast_ref::<u32>(), Some(&9));
    }

    #[test]
    fn test_take_arg() {
        let args: Vec<Box<dyn Any>> = vec![Box::new(1i32), Box::new("a".to_string())];
        let mut it = args.into_iter();
        assert_eq!(take_arg::<i32>(&mut it).unwrap(), 1);
        assert!(take_arg::<i32>(&mut it).is_err());
        assert!(take_arg::<i32>(&mut it).is_err());
    }
}
