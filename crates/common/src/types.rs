use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a serde-transparent UUID newtype with random construction,
/// parsing and conversions to and from `Uuid`.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an ID from its hyphenated text form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s.trim()).map(Self)
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
    /// Unique identifier for an order.
    ///
    /// Wraps a UUID so order ids cannot be mixed up with line item ids
    /// or the opaque string ids owned by the user and product services.
    OrderId
);

uuid_id!(
    /// Unique identifier for a single order line item.
    LineItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_creates_unique_ids() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn order_id_parse_accepts_padded_text() {
        let uuid = Uuid::new_v4();
        let id = OrderId::parse(&format!("  {uuid} ")).unwrap();
        assert_eq!(id.as_uuid(), uuid);
        assert!(OrderId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn order_id_serializes_as_plain_string() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn line_item_ids_are_distinct() {
        assert_ne!(LineItemId::new(), LineItemId::new());
    }

    #[test]
    fn line_item_id_round_trips_through_uuid() {
        let uuid = Uuid::new_v4();
        let id = LineItemId::from(uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(LineItemId::parse(&uuid.to_string()).unwrap(), id);
    }
}
