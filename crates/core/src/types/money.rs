//! Monetary amounts on the wire.
//!
//! The backend serializes amounts inconsistently: sometimes JSON numbers,
//! sometimes strings (`"12.50"`), occasionally garbage for products with no
//! price configured. [`decimal_or_zero`] is the single coercion point:
//! anything that is not a parseable decimal decodes as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Deserialize a decimal that may arrive as a number, a numeric string, or
/// something unusable. Non-numeric input decodes as zero rather than failing
/// the whole payload.
///
/// # Errors
///
/// Never fails on malformed amounts; only propagates structural
/// deserialization errors from the underlying format.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Numeric(Decimal),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Numeric(d) => d,
        Raw::Other(_) => Decimal::ZERO,
    })
}
