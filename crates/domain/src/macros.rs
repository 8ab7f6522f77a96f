//! Wire-name conversions for the small string-backed enums stored in SQLite
//! and exchanged over the tool surface.
//!
//! # Example
//!
//! ```rust
//! use signalkeeper_domain::impl_wire_enum;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Light {
//!     On,
//!     Off,
//! }
//!
//! impl_wire_enum!(Light {
//!     On => "on",
//!     Off => "off",
//! });
//!
//! assert_eq!(Light::On.as_str(), "on");
//! assert_eq!("OFF".parse::<Light>(), Ok(Light::Off));
//! assert!("dim".parse::<Light>().is_err());
//! ```

/// Generates `as_str`, `ALL`, `Display` and case-insensitive `FromStr` for a
/// fieldless enum. Parse failures return a
/// [`SignalKeeperError::InvalidInput`](crate::SignalKeeperError) listing the
/// accepted values.
#[macro_export]
macro_rules! impl_wire_enum {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum_name] = &[$(Self::$variant),+];

            /// Canonical wire name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::SignalKeeperError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let needle = s.trim();
                $(
                    if needle.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                let accepted: Vec<&str> = vec![$($str),+];
                Err($crate::SignalKeeperError::InvalidInput(format!(
                    "invalid {} '{}': expected one of {}",
                    stringify!($enum_name),
                    s,
                    accepted.join(", ")
                )))
            }
        }
    };
}
