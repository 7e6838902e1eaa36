//! Status and classification enums shared by the site and the admin panel.
//!
//! Every enum here round-trips through the backend as a `snake_case` string
//! and through HTML forms via [`FromStr`](core::str::FromStr).

use serde::{Deserialize, Serialize};

/// Error returned when a form or query value is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire/form value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labeled_enum! {
    /// Sales state of a vehicle in the catalog.
    VehicleStatus ("vehicle status") {
        Available => ("available", "Available"),
        Reserved => ("reserved", "Reserved"),
        Sold => ("sold", "Sold"),
    }
}

labeled_enum! {
    /// Fuel or drivetrain energy source.
    FuelType ("fuel type") {
        Gasoline => ("gasoline", "Gasoline"),
        Ethanol => ("ethanol", "Ethanol"),
        Flex => ("flex", "Flex"),
        Diesel => ("diesel", "Diesel"),
        Hybrid => ("hybrid", "Hybrid"),
        Electric => ("electric", "Electric"),
    }
}

labeled_enum! {
    /// Gearbox type.
    Transmission ("transmission") {
        Manual => ("manual", "Manual"),
        Automatic => ("automatic", "Automatic"),
    }
}

labeled_enum! {
    /// Follow-up state of a contact request.
    LeadStatus ("lead status") {
        New => ("new", "New"),
        Contacted => ("contacted", "Contacted"),
        Closed => ("closed", "Closed"),
    }
}

impl Default for VehicleStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        Self::New
    }
}
