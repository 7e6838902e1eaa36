//! Newtype IDs for type-safe entity references.
//!
//! The backend service identifies every record with an unsigned numeric id.
//! Use the `define_id!` macro to create wrappers that prevent passing a
//! vehicle id where a promotion id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `get()`
/// - `FromStr` so ids can be taken from path segments and form fields
///
/// # Example
///
/// ```rust
/// # use showroom_core::define_id;
/// define_id!(CarId);
/// define_id!(OfferId);
///
/// let car = CarId::new(7);
/// assert_eq!(car.get(), 7);
/// assert_eq!("7".parse::<CarId>().ok(), Some(car));
///
/// // These are different types, so this won't compile:
/// // let _: CarId = OfferId::new(7);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a raw value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(VehicleId);
define_id!(PromotionId);
define_id!(TestimonialId);
define_id!(BlogPostId);
define_id!(CommentId);
define_id!(MediaAssetId);
define_id!(ContactId);
define_id!(CreditSimulationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_trims_whitespace() {
        assert_eq!(" 42 ".parse::<VehicleId>().unwrap(), VehicleId::new(42));
    }

    #[test]
    fn test_id_parse_rejects_negative() {
        assert!("-1".parse::<VehicleId>().is_err());
        assert!("abc".parse::<VehicleId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&PromotionId::new(9)).unwrap();
        assert_eq!(json, "9");
    }
}
