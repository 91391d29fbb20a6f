use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Each entity gets its own type so a `ProductId` can never be passed where a
/// `ColorId` is expected, even though both are UUIDs on the wire.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifies a shopping cart.
    CartId
);
uuid_id!(
    /// Identifies a line item inside a cart.
    CartItemId
);
uuid_id!(
    /// Identifies the customer that owns carts and orders.
    CustomerId
);
uuid_id!(
    /// Identifies a catalog product.
    ProductId
);
uuid_id!(
    /// Identifies a color option of a product.
    ColorId
);
uuid_id!(
    /// Identifies a size option of a product.
    SizeId
);
uuid_id!(
    /// Identifies a node of the category forest.
    CategoryId
);
uuid_id!(
    /// Identifies the marketplace seller of a product.
    SellerId
);
uuid_id!(
    /// Identifies a placed order.
    OrderId
);
uuid_id!(
    /// Identifies a line of a placed order.
    OrderItemId
);
uuid_id!(
    /// Identifies a time-boxed stock reservation.
    ReservationId
);
