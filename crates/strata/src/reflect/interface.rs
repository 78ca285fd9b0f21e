// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Box<dyn Trait>` descriptions.

/// Implement [`Reflect`](crate::reflect::Reflect) for `Box<dyn Trait>`.
///
/// The trait must extend [`AsAny`](crate::reflect::AsAny). Every listed
/// implementor must itself implement `Reflect` and `Trait`. The optional
/// `default` type is the one a tagless value decodes to, and an instance of it
/// is encoded without a tag.
///
/// ```rust
/// use strata::reflect::AsAny;
/// use strata::{json, reflect_interface, Config, Reflect, Registry};
///
/// pub trait Animal: AsAny {
///     fn legs(&self) -> u32;
/// }
///
/// #[derive(Reflect, Debug, PartialEq)]
/// pub struct Bird {
///     wingspan: f32,
/// }
///
/// impl Animal for Bird {
///     fn legs(&self) -> u32 {
///         2
///     }
/// }
///
/// reflect_interface!(dyn Animal; Bird);
///
/// let config = Config::default().with_allowed_type(Bird::type_info().name);
/// let registry = Registry::new(config).unwrap();
/// let animal: Box<dyn Animal> = Box::new(Bird { wingspan: 0.5 });
/// let text = json::to_string(&registry, &animal).unwrap();
/// let back: Box<dyn Animal> = json::from_str(&registry, &text).unwrap();
/// assert_eq!(back.legs(), 2);
/// ```
#[macro_export]
macro_rules! reflect_interface {
    (@default) => {
        ::std::option::Option::None
    };
    (@default $default:ty) => {
        ::std::option::Option::Some($crate::reflect::TypeRef::of::<$default>())
    };
    (dyn $trait_:ident $(, default = $default:ty)? ; $($impl_:ty),+ $(,)?) => {
        const _: () = {
            struct InterfaceTable;

            impl $crate::reflect::InterfaceOps for InterfaceTable {
                fn concrete<'a>(
                    &self,
                    value: &'a dyn ::std::any::Any,
                ) -> $crate::Result<&'a dyn ::std::any::Any> {
                    let boxed =
                        $crate::reflect::downcast_ref::<::std::boxed::Box<dyn $trait_>>(value)?;
                    ::std::result::Result::Ok($crate::reflect::AsAny::as_any(&**boxed))
                }

                fn upcast(
                    &self,
                    concrete: ::std::boxed::Box<dyn ::std::any::Any>,
                ) -> $crate::Result<::std::boxed::Box<dyn ::std::any::Any>> {
                    $(
                        let concrete = match concrete.downcast::<$impl_>() {
                            ::std::result::Result::Ok(value) => {
                                let object: ::std::boxed::Box<dyn $trait_> = value;
                                return ::std::result::Result::Ok(::std::boxed::Box::new(object));
                            }
                            ::std::result::Result::Err(other) => other,
                        };
                    )+
                    let _ = concrete;
                    ::std::result::Result::Err($crate::Error::Validation(::std::format!(
                        "decoded value does not implement {}",
                        stringify!($trait_)
                    )))
                }
            }

            impl $crate::reflect::Reflect for ::std::boxed::Box<dyn $trait_> {
                fn type_info() -> $crate::reflect::TypeInfo {
                    const NAME: &str = concat!(module_path!(), "::", stringify!($trait_));
                    $crate::reflect::TypeInfo::new(
                        NAME,
                        $crate::reflect::Shape::Interface($crate::reflect::InterfaceInfo {
                            name: NAME,
                            default: $crate::reflect_interface!(@default $($default)?),
                            implementors: ::std::vec![
                                $($crate::reflect::TypeRef::of::<$impl_>()),+
                            ],
                            ops: ::std::sync::Arc::new(InterfaceTable),
                        }),
                    )
                }
            }
        };
    };
}

#[cfg(test)]
mod tests {
    use crate::reflect::{AsAny, Reflect, Shape, TypeRef};

    trait Greeter: AsAny {
        fn greet(&self) -> String;
    }

    #[derive(crate::Reflect, Default)]
    #[strata(default)]
    struct English;

    #[derive(crate::Reflect, Default)]
    #[strata(default)]
    struct French;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    crate::reflect_interface!(dyn Greeter, default = English; English, French);

    #[test]
    fn test_interface_table() {
        let info = <Box<dyn Greeter>>::type_info();
        assert!(info.name.ends_with("::Greeter"));
        let iface = match info.shape {
            Shape::Interface(iface) => iface,
            other => panic!("unexpected shape {}", other.kind_name()),
        };
        assert_eq!(iface.default, Some(TypeRef::of::<English>()));
        assert_eq!(iface.implementors.len(), 2);

        let boxed: Box<dyn Greeter> = Box::new(French);
        let concrete = iface.ops.concrete(&boxed).unwrap();
        assert!(concrete.is::<French>());

        let upcast = iface.ops.upcast(Box::new(French)).unwrap();
        let back = upcast.downcast::<Box<dyn Greeter>>().unwrap();
        assert_eq!(back.greet(), "bonjour");

        assert!(iface.ops.upcast(Box::new(5u8)).unwrap_err().is_validation());
    }
}
