//! Open enumerations over raw integers.
//!
//! Numeric fields read from a file can hold values this crate has never heard of. The types
//! created by [`loose_enum!`] keep every bit pattern around instead of rejecting it, and only
//! give names (and human-readable labels) to the values they know about.

#![no_std]

/// Creates a type that acts like an enum, but internally allows every bit patterns (unknown
/// values). Values written by newer tools than this crate knows about are carried through
/// untouched instead of being rejected.
///
/// The syntax is basically the same as the `bitflags!` macro. Each variant may be followed by
/// `=> "label"` to attach the human-readable label returned by `label()`; variants without one
/// use their own name as a label.
///
/// ```
/// loose_enum::loose_enum! {
///     pub struct Color: u8 {
///         const RED = 1 => "Bright red";
///         const BLUE = 2;
///     }
/// }
///
/// assert_eq!(Color::RED.label(), Some("Bright red"));
/// assert_eq!(Color::BLUE.label(), Some("BLUE"));
/// assert_eq!(Color::from_raw(7).label(), None);
/// ```
#[macro_export]
macro_rules! loose_enum {
    (
        $(#[$($attr:meta)*])*
        $vis:vis struct $name:ident: $inner:ty {
            $(
                $(#[$($variant_attr:meta)*])*
                const $variant:ident = $value:expr $(=> $label:literal)?;
            )*
        }
    ) => {
        $(#[$($attr)*])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name($inner);

        impl $name {
            $(
                $(#[$($variant_attr)*])*
                pub const $variant: Self = Self($value);
            )*

            #[doc = ::core::concat!("Creates a new [`", stringify!($name), "`] from the provided raw value.")]
            #[inline]
            pub const fn from_raw(raw: $inner) -> Self {
                Self(raw)
            }

            #[doc = ::core::concat!("Creates a new [`", stringify!($name), "`] from the provided known value.")]
            ///
            /// If the provided value is not a known variant, this function will return [`None`].
            #[allow(unreachable_patterns)]
            pub fn from_known(raw: $inner) -> Option<Self> {
                match raw {
                    $(
                        $value => Some(Self($value)),
                    )*
                    _ => None,
                }
            }

            #[doc = ::core::concat!("Returns the raw value of this [`", stringify!($name), "`].")]
            #[inline]
            pub const fn as_raw(self) -> $inner {
                self.0
            }

            #[doc = ::core::concat!("Returns whether this [`", stringify!($name), "`] is a known enum value.")]
            #[allow(clippy::manual_range_patterns)]
            pub fn is_known(self) -> bool {
                ::core::matches!(self.0, $(
                    | $value
                )*)
            }

            /// Returns the name of the variant, if the value is known.
            #[allow(unreachable_patterns)]
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $(
                        $value => Some(stringify!($variant)),
                    )*
                    _ => None,
                }
            }

            /// Returns a human-readable description of the value, if it is known.
            #[allow(unreachable_patterns)]
            pub fn label(self) -> Option<&'static str> {
                match self.0 {
                    $(
                        $value => Some($crate::__label!($variant $(, $label)?)),
                    )*
                    _ => None,
                }
            }
        }

        impl ::core::fmt::Debug for $name {
            #[allow(unreachable_patterns)]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self.0 {
                    $(
                        $value => write!(f, stringify!($variant)),
                    )*
                    _ => f.debug_tuple(stringify!($name)).field(&self.0).finish(),
                }
            }
        }

        impl ::core::convert::From<$inner> for $name {
            #[inline]
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __label {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $label:literal) => {
        $label
    };
}
