/// Declares a transparent newtype over a kernel integer with named associated constants.
macro_rules! ffi_enum {
    (
        $( #[$attrs:meta] )*
        $v:vis enum $name:ident: $native:ty {
            $(
                $( #[$variant_attrs:meta] )*
                $variant:ident = $value:expr
            ),+
            $(,)?
        }
    ) => {
        $( #[$attrs] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $v struct $name(pub(crate) $native);

        impl $name {
            $(
                $( #[$variant_attrs] )*
                $v const $variant: Self = Self($value);
            )+

            #[allow(dead_code, unreachable_patterns)]
            fn variant_name(&self) -> Option<&'static str> {
                match self {
                    $(
                        &Self::$variant => Some(stringify!($variant)),
                    )*
                    _ => None,
                }
            }

            #[allow(dead_code)]
            fn from_variant_name(name: &str) -> Option<Self> {
                match name {
                    $(
                        stringify!($variant) => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }
        }
    };
}

/// Implements raw conversions, `FromStr` and `Debug` for an event code type.
///
/// `$prefix` is the C constant prefix (`"ABS_"`, `"EV_"`, ...) that is prepended to the
/// associated constant's name when formatting, and stripped when parsing.
macro_rules! event_code {
    ($type:ident, $prefix:literal) => {
        impl $type {
            #[inline]
            pub const fn from_raw(raw: u16) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u16 {
                self.0
            }

            pub(crate) fn name(self) -> Option<$crate::event::codes::VariantName> {
                Some($crate::event::codes::VariantName::new(
                    $prefix,
                    self.variant_name()?,
                ))
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = $crate::event::codes::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.strip_prefix($prefix)
                    .and_then(Self::from_variant_name)
                    .ok_or($crate::event::codes::UnknownVariant { _p: () })
            }
        }

        impl ::std::fmt::Debug for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.name() {
                    Some(name) => ::std::fmt::Display::fmt(&name, f),
                    None => write!(f, concat!(stringify!($type), "({:#x})"), self.0),
                }
            }
        }
    };
}
