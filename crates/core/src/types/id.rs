//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All backend
//! identifiers are opaque strings (`"ord_1"`, `"cs_test_abc"`, numeric IDs
//! serialized as strings), so the wrappers hold `String`.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
/// - `Display` that prints the raw identifier
///
/// # Example
///
/// ```rust
/// # use tavola_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("usr_1");
/// let order_id = OrderId::new("ord_1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(PaymentId);
define_id!(SessionId);

/// Key identifying one cart line: the product ID, or a
/// `product:variant` composite when a variant was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Build a line key for a product without variants.
    #[must_use]
    pub fn product(product_id: &ProductId) -> Self {
        Self(product_id.as_str().to_owned())
    }

    /// Build a composite line key for a specific variant of a product.
    #[must_use]
    pub fn variant(product_id: &ProductId, variant_id: &VariantId) -> Self {
        Self(format!("{}:{}", product_id.as_str(), variant_id.as_str()))
    }

    /// Get the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ::core::fmt::Display for LineId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_raw_value() {
        let id = OrderId::new("ord_42");
        assert_eq!(id.to_string(), "ord_42");
        assert_eq!(id.as_str(), "ord_42");
    }

    #[test]
    fn line_id_composite_key() {
        let product = ProductId::new("prod_7");
        let variant = VariantId::new("var_2");

        assert_eq!(LineId::product(&product).as_str(), "prod_7");
        assert_eq!(LineId::variant(&product, &variant).as_str(), "prod_7:var_2");
    }

    #[test]
    fn line_ids_for_different_variants_differ() {
        let product = ProductId::new("prod_7");
        let small = VariantId::new("small");
        let large = VariantId::new("large");

        assert_ne!(
            LineId::variant(&product, &small),
            LineId::variant(&product, &large)
        );
    }
}
