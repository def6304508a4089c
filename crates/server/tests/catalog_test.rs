//! Catalog engine integration tests.
//!
//! Exercise the full parameter → plan → SQL pipeline and the envelope math
//! without a database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lokanta_server::catalog::{CatalogQueryBuilder, ListParams, QueryPlan, SortKey};
use lokanta_server::models::{UpdateCategory, UpdateProduct};
use uuid::Uuid;

fn compile(pairs: &[(&str, &str)]) -> QueryPlan {
    let mut params = ListParams::default();
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "page" => params.page = value,
            "limit" => params.limit = value,
            "category" => params.category = value,
            "popular" => params.popular = value,
            "search" => params.search = value,
            "minPrice" => params.min_price = value,
            "maxPrice" => params.max_price = value,
            "sort" => params.sort = value,
            other => panic!("unknown param {other}"),
        }
    }
    QueryPlan::compile(&params)
}

fn render(pairs: &[(&str, &str)]) -> String {
    CatalogQueryBuilder::new(compile(pairs)).build()
}

#[test]
fn listing_defaults_end_to_end() {
    let sql = render(&[]);

    assert!(sql.contains("\"product\".\"is_active\" = TRUE"));
    assert!(sql.contains("LIMIT 10"));
    assert!(sql.contains("OFFSET 0"));

    let order = sql.split("ORDER BY").nth(1).unwrap();
    assert!(order.contains("\"sort_order\" ASC"));
    assert!(order.contains("\"created\" DESC"));
}

#[test]
fn full_filter_combination() {
    let category = Uuid::from_u128(3).to_string();
    let sql = render(&[
        ("category", &category),
        ("popular", "true"),
        ("search", "kebab"),
        ("minPrice", "10"),
        ("maxPrice", "60"),
        ("sort", "price_desc"),
        ("page", "2"),
        ("limit", "5"),
    ]);

    let where_clause = sql.split("WHERE").nth(1).unwrap();
    assert!(where_clause.contains("\"product\".\"category_id\" ="));
    assert!(where_clause.contains(&category));
    assert!(where_clause.contains("\"product\".\"is_popular\" = TRUE"));
    assert!(where_clause.contains("ILIKE"));
    assert!(where_clause.contains("%kebab%"));
    assert!(sql.contains("\"product\".\"price\" >= 10"));
    assert!(sql.contains("\"product\".\"price\" <= 60"));
    assert!(sql.contains("\"price\" DESC"));
    assert!(sql.contains("LIMIT 5"));
    assert!(sql.contains("OFFSET 5"));
}

#[test]
fn popular_sort_orders_popular_first_then_newest() {
    let sql = render(&[("sort", "popular")]);
    let order = sql.split("ORDER BY").nth(1).unwrap();

    let popular_pos = order.find("\"is_popular\" DESC").unwrap();
    let created_pos = order.find("\"created\" DESC").unwrap();
    assert!(popular_pos < created_pos);
}

#[test]
fn malformed_everything_still_renders_default_listing() {
    let sql = render(&[
        ("page", "NaN"),
        ("limit", "-1"),
        ("category", "not-a-uuid"),
        ("popular", "yes"),
        ("minPrice", "free"),
        ("maxPrice", ""),
        ("sort", "hype"),
    ]);

    // Everything malformed degrades to the default active-only listing.
    let where_clause = sql.split("WHERE").nth(1).unwrap();
    assert!(where_clause.contains("\"product\".\"is_active\" = TRUE"));
    assert!(!where_clause.contains("category_id"));
    assert!(!where_clause.contains("is_popular"));
    assert!(!where_clause.contains("ILIKE"));
    assert!(sql.contains("LIMIT 10"));
    assert!(sql.contains("OFFSET 0"));
}

#[test]
fn search_matches_name_or_description_case_insensitively() {
    let sql = render(&[("search", "Soup")]);

    assert!(sql.contains("ILIKE"));
    let where_clause = sql.split("WHERE").nth(1).unwrap();
    let name_pos = where_clause.find("\"product\".\"name\"").unwrap();
    let desc_pos = where_clause.find("\"product\".\"description\"").unwrap();
    let or_pos = where_clause.find(" OR ").unwrap();
    assert!(name_pos < or_pos && or_pos < desc_pos);
}

#[test]
fn count_query_matches_filters_but_not_window() {
    let plan = compile(&[("search", "soup"), ("page", "4"), ("limit", "3")]);
    let builder = CatalogQueryBuilder::new(plan);

    let count = builder.build_count();
    assert!(count.contains("COUNT(*)"));
    assert!(count.contains("%soup%"));
    assert!(!count.contains("LIMIT"));
    assert!(!count.contains("OFFSET"));

    let select = builder.build();
    assert!(select.contains("LIMIT 3"));
    assert!(select.contains("OFFSET 9"));
}

#[test]
fn pagination_item_counts() {
    // For total=25, limit=10: pages hold 10, 10, 5, then 0.
    for (page, expected) in [(1_u32, 10_i64), (2, 10), (3, 5), (4, 0)] {
        let plan = compile(&[("page", &page.to_string()), ("limit", "10")]);
        let skip = i64::try_from(plan.offset()).unwrap();
        let on_page = (25 - skip).clamp(0, 10);
        assert_eq!(on_page, expected, "page {page}");
    }
}

#[test]
fn sort_token_table() {
    for (token, key) in [
        ("price_asc", SortKey::PriceAsc),
        ("price_desc", SortKey::PriceDesc),
        ("name_asc", SortKey::NameAsc),
        ("name_desc", SortKey::NameDesc),
        ("newest", SortKey::Newest),
        ("popular", SortKey::Popular),
        ("unknown", SortKey::Standard),
    ] {
        assert_eq!(compile(&[("sort", token)]).sort, key);
    }
}

#[test]
fn partial_update_distinguishes_omitted_from_null() {
    let keep: UpdateProduct = serde_json::from_str(r#"{"price": 30.0}"#).unwrap();
    assert!(keep.description.is_none());

    let clear: UpdateProduct = serde_json::from_str(r#"{"description": null}"#).unwrap();
    assert_eq!(clear.description, Some(None));

    let set: UpdateProduct = serde_json::from_str(r#"{"description": "new"}"#).unwrap();
    assert_eq!(set.description, Some(Some("new".to_string())));
}

#[test]
fn category_update_payload_presence() {
    let input: UpdateCategory = serde_json::from_str(r#"{"sort_order": 5}"#).unwrap();
    assert!(input.name.is_none());
    assert!(input.description.is_none());
    assert_eq!(input.sort_order, Some(5));
}
