//! Query-string boundary: typed coercion of URL parameters.
//!
//! Incoming values (payment-return URLs, catalog filters) arrive as raw
//! strings. Rather than scattering ad hoc `"true"` comparisons and number
//! parses around the codebase, everything crosses this boundary as a
//! [`QueryValue`] with one documented coercion rule.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use tavola_core::{CategoryId, OrderId, SessionId};

// ============================================================================
// Typed query values
// ============================================================================

/// A query-string value after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl QueryValue {
    /// Coerce a raw string: case-insensitive `true`/`false` become `Bool`,
    /// anything that parses as a decimal becomes `Number`, the rest stays
    /// `Text` verbatim.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(n) = raw.parse::<Decimal>() {
            return Self::Number(n);
        }
        Self::Text(raw.to_string())
    }

    /// The value as a boolean, if it coerced to one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as text. Numbers and booleans render back to their raw form.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Parse a query string (with or without a leading `?`) into coerced values.
/// Later duplicates of a key win.
#[must_use]
pub fn parse_query(query: &str) -> BTreeMap<String, QueryValue> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), QueryValue::coerce(&v)))
        .collect()
}

// ============================================================================
// Payment-return parameters
// ============================================================================

/// Parameters carried back from the hosted payment page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnParams {
    pub session_id: Option<SessionId>,
    pub order_id: Option<OrderId>,
    pub success: bool,
}

impl ReturnParams {
    /// Extract the payment-return parameters from a raw query string.
    ///
    /// `success` is true only for an explicit boolean `true`; absent,
    /// malformed, or non-boolean values all read as false.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let params = parse_query(query);
        let text = |key: &str| {
            params
                .get(key)
                .map(QueryValue::as_text)
                .filter(|s| !s.is_empty())
        };
        Self {
            session_id: text("session_id").map(SessionId::new),
            order_id: text("order_id").map(OrderId::new),
            success: params
                .get("success")
                .and_then(QueryValue::as_bool)
                .unwrap_or(false),
        }
    }
}

// ============================================================================
// Catalog filters
// ============================================================================

/// Server-side catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub available_only: bool,
}

impl ProductFilter {
    /// Whether the filter constrains anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.is_none() && !self.available_only
    }

    /// Build a filter from a raw query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let params = parse_query(query);
        Self {
            category: params
                .get("category")
                .map(QueryValue::as_text)
                .filter(|s| !s.is_empty())
                .map(CategoryId::new),
            search: params
                .get("search")
                .map(QueryValue::as_text)
                .filter(|s| !s.is_empty()),
            available_only: params
                .get("available")
                .and_then(QueryValue::as_bool)
                .unwrap_or(false),
        }
    }

    /// Render as a query string (no leading `?`), empty when unconstrained.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(format!("category={}", urlencoding::encode(category.as_str())));
        }
        if let Some(search) = &self.search {
            parts.push(format!("search={}", urlencoding::encode(search)));
        }
        if self.available_only {
            parts.push("available=true".to_string());
        }
        parts.join("&")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(QueryValue::coerce("true"), QueryValue::Bool(true));
        assert_eq!(QueryValue::coerce("FALSE"), QueryValue::Bool(false));
        assert_eq!(QueryValue::coerce("12.50"), QueryValue::Number(dec("12.50")));
        assert_eq!(QueryValue::coerce("-3"), QueryValue::Number(dec("-3")));
        assert_eq!(
            QueryValue::coerce("cs_test_a1"),
            QueryValue::Text("cs_test_a1".to_string())
        );
        // "yes"/"1" are not booleans under the rule.
        assert_eq!(QueryValue::coerce("yes"), QueryValue::Text("yes".to_string()));
        assert_eq!(QueryValue::coerce("1"), QueryValue::Number(dec("1")));
    }

    #[test]
    fn parse_query_decodes_and_last_wins() {
        let params = parse_query("?search=penne%20arrabbiata&available=true&search=carbonara");
        assert_eq!(
            params.get("search"),
            Some(&QueryValue::Text("carbonara".to_string()))
        );
        assert_eq!(params.get("available"), Some(&QueryValue::Bool(true)));
    }

    #[test]
    fn return_params_success_requires_explicit_true() {
        assert!(ReturnParams::from_query("success=true&session_id=cs_1").success);
        assert!(!ReturnParams::from_query("success=yes&session_id=cs_1").success);
        assert!(!ReturnParams::from_query("session_id=cs_1").success);
        assert!(!ReturnParams::from_query("success=1").success);
    }

    #[test]
    fn return_params_extracts_ids() {
        let params = ReturnParams::from_query("session_id=cs_test_9&order_id=ord_4&success=true");
        assert_eq!(params.session_id, Some(SessionId::new("cs_test_9")));
        assert_eq!(params.order_id, Some(OrderId::new("ord_4")));
    }

    #[test]
    fn return_params_empty_values_read_as_absent() {
        let params = ReturnParams::from_query("session_id=&success=false");
        assert_eq!(params.session_id, None);
        assert_eq!(params.order_id, None);
    }

    #[test]
    fn filter_round_trips_through_query_string() {
        let filter = ProductFilter {
            category: Some(CategoryId::new("cat_pasta")),
            search: Some("aglio e olio".to_string()),
            available_only: true,
        };
        let qs = filter.to_query_string();
        assert_eq!(qs, "category=cat_pasta&search=aglio%20e%20olio&available=true");
        assert_eq!(ProductFilter::from_query(&qs), filter);
    }

    #[test]
    fn empty_filter_renders_empty() {
        assert!(ProductFilter::default().is_empty());
        assert_eq!(ProductFilter::default().to_query_string(), "");
    }
}
