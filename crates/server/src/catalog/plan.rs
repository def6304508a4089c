//! Catalog query plan compilation.
//!
//! [`QueryPlan::compile`] normalizes an untyped set of listing parameters
//! into a structured plan. It is total: malformed input degrades to
//! defaults, it never reports an error. Existence of a referenced category
//! is deliberately not checked here; only the category-scoped listing path
//! validates the reference.

use serde::Deserialize;
use uuid::Uuid;

/// Default page number when absent or malformed.
const DEFAULT_PAGE: u32 = 1;

/// Default page size when absent or malformed.
const DEFAULT_LIMIT: u32 = 10;

/// Raw listing parameters as they arrive on the query string.
///
/// Everything is an optional string; parsing happens in [`QueryPlan::compile`]
/// so that bad values coerce instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub popular: Option<String>,
    pub search: Option<String>,

    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,

    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,

    pub sort: Option<String>,
}

/// Sort selection for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// Creation time descending.
    Newest,
    /// Popular flag descending, then creation time descending.
    Popular,
    /// Sort order ascending, then creation time descending.
    #[default]
    Standard,
}

impl SortKey {
    /// Map a sort token to a key. Unrecognized tokens fall back to the
    /// standard ordering.
    fn parse(token: &str) -> Self {
        match token {
            "price_asc" => SortKey::PriceAsc,
            "price_desc" => SortKey::PriceDesc,
            "name_asc" => SortKey::NameAsc,
            "name_desc" => SortKey::NameDesc,
            "newest" => SortKey::Newest,
            "popular" => SortKey::Popular,
            _ => SortKey::Standard,
        }
    }
}

/// Normalized filter/sort/page specification for a product listing.
///
/// The active-only predicate is implicit and always present.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Equality filter on the product's category reference.
    pub category: Option<Uuid>,

    /// Restrict to popular-flagged products.
    pub popular_only: bool,

    /// Case-insensitive substring over name OR description.
    pub search: Option<String>,

    /// Inclusive lower price bound.
    pub min_price: Option<f64>,

    /// Inclusive upper price bound.
    pub max_price: Option<f64>,

    /// Sort selection.
    pub sort: SortKey,

    /// 1-based page number, always >= 1.
    pub page: u32,

    /// Page size, always >= 1.
    pub per_page: u32,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            category: None,
            popular_only: false,
            search: None,
            min_price: None,
            max_price: None,
            sort: SortKey::Standard,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_LIMIT,
        }
    }
}

impl QueryPlan {
    /// Compile raw parameters into a plan. Never fails; malformed values
    /// coerce to defaults or are omitted.
    pub fn compile(params: &ListParams) -> Self {
        Self {
            category: nonempty(&params.category).and_then(|v| Uuid::parse_str(v).ok()),
            popular_only: params.popular.as_deref() == Some("true"),
            search: nonempty(&params.search).map(str::to_string),
            min_price: parse_price(&params.min_price),
            max_price: parse_price(&params.max_price),
            sort: nonempty(&params.sort)
                .map(SortKey::parse)
                .unwrap_or_default(),
            page: parse_positive(&params.page, DEFAULT_PAGE),
            per_page: parse_positive(&params.limit, DEFAULT_LIMIT),
        }
    }

    /// Number of rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.per_page)
    }
}

fn nonempty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive(raw: &Option<String>, default: u32) -> u32 {
    nonempty(raw)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

fn parse_price(raw: &Option<String>) -> Option<f64> {
    nonempty(raw)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut p = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => p.page = value,
                "limit" => p.limit = value,
                "category" => p.category = value,
                "popular" => p.popular = value,
                "search" => p.search = value,
                "minPrice" => p.min_price = value,
                "maxPrice" => p.max_price = value,
                "sort" => p.sort = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn empty_params_yield_defaults() {
        let plan = QueryPlan::compile(&ListParams::default());

        assert_eq!(plan, QueryPlan::default());
        assert_eq!(plan.page, 1);
        assert_eq!(plan.per_page, 10);
        assert_eq!(plan.offset(), 0);
    }

    #[test]
    fn malformed_page_and_limit_default() {
        let plan = QueryPlan::compile(&params(&[("page", "abc"), ("limit", "ten")]));
        assert_eq!(plan.page, 1);
        assert_eq!(plan.per_page, 10);
    }

    #[test]
    fn zero_and_negative_coerce_to_defaults() {
        let plan = QueryPlan::compile(&params(&[("page", "0"), ("limit", "-5")]));
        assert_eq!(plan.page, 1);
        assert_eq!(plan.per_page, 10);
    }

    #[test]
    fn no_upper_bound_on_limit() {
        let plan = QueryPlan::compile(&params(&[("limit", "100000")]));
        assert_eq!(plan.per_page, 100_000);
    }

    #[test]
    fn offset_from_page_and_limit() {
        let plan = QueryPlan::compile(&params(&[("page", "3"), ("limit", "25")]));
        assert_eq!(plan.offset(), 50);
    }

    #[test]
    fn popular_requires_literal_true() {
        assert!(QueryPlan::compile(&params(&[("popular", "true")])).popular_only);
        assert!(!QueryPlan::compile(&params(&[("popular", "false")])).popular_only);
        assert!(!QueryPlan::compile(&params(&[("popular", "1")])).popular_only);
        assert!(!QueryPlan::compile(&params(&[("popular", "TRUE")])).popular_only);
        assert!(!QueryPlan::compile(&ListParams::default()).popular_only);
    }

    #[test]
    fn category_parses_as_uuid() {
        let id = Uuid::from_u128(7);
        let plan = QueryPlan::compile(&params(&[("category", &id.to_string())]));
        assert_eq!(plan.category, Some(id));
    }

    #[test]
    fn malformed_category_is_omitted() {
        let plan = QueryPlan::compile(&params(&[("category", "not-a-uuid")]));
        assert_eq!(plan.category, None);
    }

    #[test]
    fn empty_strings_are_omitted() {
        let plan = QueryPlan::compile(&params(&[
            ("category", ""),
            ("search", "  "),
            ("minPrice", ""),
        ]));
        assert_eq!(plan.category, None);
        assert_eq!(plan.search, None);
        assert_eq!(plan.min_price, None);
    }

    #[test]
    fn price_bounds_are_independent() {
        let plan = QueryPlan::compile(&params(&[("minPrice", "10.5")]));
        assert_eq!(plan.min_price, Some(10.5));
        assert_eq!(plan.max_price, None);

        let plan = QueryPlan::compile(&params(&[("maxPrice", "99.9")]));
        assert_eq!(plan.min_price, None);
        assert_eq!(plan.max_price, Some(99.9));
    }

    #[test]
    fn malformed_price_bound_is_omitted() {
        let plan = QueryPlan::compile(&params(&[("minPrice", "cheap"), ("maxPrice", "NaN")]));
        assert_eq!(plan.min_price, None);
        assert_eq!(plan.max_price, None);
    }

    #[test]
    fn sort_tokens_map_exactly() {
        let cases = [
            ("price_asc", SortKey::PriceAsc),
            ("price_desc", SortKey::PriceDesc),
            ("name_asc", SortKey::NameAsc),
            ("name_desc", SortKey::NameDesc),
            ("newest", SortKey::Newest),
            ("popular", SortKey::Popular),
        ];
        for (token, expected) in cases {
            let plan = QueryPlan::compile(&params(&[("sort", token)]));
            assert_eq!(plan.sort, expected, "token {token}");
        }
    }

    #[test]
    fn unknown_sort_falls_back_to_standard() {
        let plan = QueryPlan::compile(&params(&[("sort", "cheapest_first")]));
        assert_eq!(plan.sort, SortKey::Standard);
    }

    #[test]
    fn search_is_kept_verbatim() {
        let plan = QueryPlan::compile(&params(&[("search", "Soup")]));
        assert_eq!(plan.search.as_deref(), Some("Soup"));
    }

    #[test]
    fn compile_never_panics_on_garbage() {
        let plan = QueryPlan::compile(&params(&[
            ("page", "999999999999999999999"),
            ("limit", "∞"),
            ("minPrice", "-inf"),
            ("maxPrice", "1e309"),
            ("sort", "'; DROP TABLE product; --"),
        ]));
        assert_eq!(plan.page, 1);
        assert_eq!(plan.per_page, 10);
        assert_eq!(plan.sort, SortKey::Standard);
        assert_eq!(plan.max_price, None);
    }
}
