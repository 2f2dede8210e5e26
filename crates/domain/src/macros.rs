//! Macro for declaring enums with a closed wire-token table
//!
//! An API filter or payload field that takes one of a fixed set of values is
//! declared once with `wire_enum!`. The macro generates the enum itself plus
//! every conversion that has to agree on the wire token: query encoding
//! ([`WireEnum`](crate::query::WireEnum)), `Display`, `FromStr` and serde.
//!
//! # Example
//!
//! ```rust
//! use callwire_domain::query::WireEnum;
//! use callwire_domain::wire_enum;
//!
//! wire_enum! {
//!     /// Presence status of a contact.
//!     pub enum PresenceStatus {
//!         Available => "Available",
//!         Away => "Away",
//!         DoNotDisturb => "Do_Not_Disturb",
//!     }
//! }
//!
//! assert_eq!(PresenceStatus::DoNotDisturb.wire_token(), "Do_Not_Disturb");
//! assert_eq!("Away".parse::<PresenceStatus>().ok(), Some(PresenceStatus::Away));
//! assert!("away".parse::<PresenceStatus>().is_err());
//! ```

/// Declares an enum whose members map one-to-one onto wire tokens
///
/// Parsing is exact: the token must match byte for byte. An unknown token is
/// a [`CallwireError::Validation`](crate::CallwireError::Validation) naming
/// the enum type.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $crate::query::WireEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn wire_token(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::query::WireEnum::wire_token(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::CallwireError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::query::WireEnum>::from_wire(s)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str($crate::query::WireEnum::wire_token(*self))
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let token =
                    <::std::string::String as $crate::__private::serde::Deserialize>::deserialize(
                        deserializer,
                    )?;
                <Self as $crate::query::WireEnum>::from_wire(&token)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
