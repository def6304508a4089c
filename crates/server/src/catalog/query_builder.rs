//! Catalog query builder using SeaQuery.
//!
//! Renders a [`QueryPlan`] into the listing SELECT (joined with the category
//! name) and the matching COUNT query. The active-only predicate is always
//! emitted; everything else follows the plan.

use sea_query::extension::postgres::PgExpr;
use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, Order, PostgresQueryBuilder, Query, SelectStatement,
};

use super::plan::{QueryPlan, SortKey};

const PRODUCT: &str = "product";
const CATEGORY: &str = "category";

/// Query builder for catalog listings.
pub struct CatalogQueryBuilder {
    plan: QueryPlan,
}

impl CatalogQueryBuilder {
    /// Create a builder for a compiled plan.
    pub fn new(plan: QueryPlan) -> Self {
        Self { plan }
    }

    /// Build the page SELECT with category join, ordering, and window.
    pub fn build(&self) -> String {
        let mut query = Query::select();

        query.column((Alias::new(PRODUCT), Asterisk));
        query.expr_as(
            Expr::col((Alias::new(CATEGORY), Alias::new("name"))),
            Alias::new("category_name"),
        );

        query.from(Alias::new(PRODUCT));
        query.left_join(
            Alias::new(CATEGORY),
            Expr::col((Alias::new(PRODUCT), Alias::new("category_id")))
                .equals((Alias::new(CATEGORY), Alias::new("id"))),
        );

        self.add_filters(&mut query);
        self.add_sorts(&mut query);

        query.limit(u64::from(self.plan.per_page));
        query.offset(self.plan.offset());

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the COUNT query for the same filters, ignoring pagination.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(PRODUCT));

        self.add_filters(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    /// Add WHERE conditions from the plan. Conditions are conjoined with
    /// AND; the substring search is an OR of its two sub-clauses.
    fn add_filters(&self, query: &mut SelectStatement) {
        query.and_where(product_col("is_active").eq(true));

        if let Some(category_id) = self.plan.category {
            query.and_where(product_col("category_id").eq(category_id));
        }

        if self.plan.popular_only {
            query.and_where(product_col("is_popular").eq(true));
        }

        if let Some(ref search) = self.plan.search {
            let pattern = format!("%{}%", escape_like_wildcards(search));
            let cond = Cond::any()
                .add(product_col("name").ilike(pattern.as_str()))
                .add(product_col("description").ilike(pattern.as_str()));
            query.and_where(cond.into());
        }

        if let Some(min_price) = self.plan.min_price {
            query.and_where(product_col("price").gte(min_price));
        }

        if let Some(max_price) = self.plan.max_price {
            query.and_where(product_col("price").lte(max_price));
        }
    }

    /// Add ORDER BY clauses. Tie-break rules are exact per sort mode.
    fn add_sorts(&self, query: &mut SelectStatement) {
        match self.plan.sort {
            SortKey::PriceAsc => {
                query.order_by((Alias::new(PRODUCT), Alias::new("price")), Order::Asc);
            }
            SortKey::PriceDesc => {
                query.order_by((Alias::new(PRODUCT), Alias::new("price")), Order::Desc);
            }
            SortKey::NameAsc => {
                query.order_by((Alias::new(PRODUCT), Alias::new("name")), Order::Asc);
            }
            SortKey::NameDesc => {
                query.order_by((Alias::new(PRODUCT), Alias::new("name")), Order::Desc);
            }
            SortKey::Newest => {
                query.order_by((Alias::new(PRODUCT), Alias::new("created")), Order::Desc);
            }
            SortKey::Popular => {
                query.order_by((Alias::new(PRODUCT), Alias::new("is_popular")), Order::Desc);
                query.order_by((Alias::new(PRODUCT), Alias::new("created")), Order::Desc);
            }
            SortKey::Standard => {
                query.order_by((Alias::new(PRODUCT), Alias::new("sort_order")), Order::Asc);
                query.order_by((Alias::new(PRODUCT), Alias::new("created")), Order::Desc);
            }
        }
    }
}

fn product_col(name: &str) -> sea_query::SimpleExpr {
    Expr::col((Alias::new(PRODUCT), Alias::new(name))).into()
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::plan::{ListParams, QueryPlan};
    use uuid::Uuid;

    fn build(plan: QueryPlan) -> String {
        CatalogQueryBuilder::new(plan).build()
    }

    #[test]
    fn default_plan_query() {
        let sql = build(QueryPlan::default());

        assert!(sql.contains("FROM \"product\""));
        assert!(sql.contains("LEFT JOIN \"category\""));
        assert!(sql.contains("\"product\".\"is_active\" = TRUE"));
        assert!(sql.contains("LIMIT 10"));
        assert!(sql.contains("OFFSET 0"));
    }

    #[test]
    fn active_filter_always_present() {
        let plan = QueryPlan {
            popular_only: true,
            ..QueryPlan::default()
        };
        let builder = CatalogQueryBuilder::new(plan);

        assert!(builder.build().contains("\"is_active\" = TRUE"));
        assert!(builder.build_count().contains("\"is_active\" = TRUE"));
    }

    #[test]
    fn category_equality_filter() {
        let id = Uuid::nil();
        let sql = build(QueryPlan {
            category: Some(id),
            ..QueryPlan::default()
        });

        // The join condition also mentions category_id; check the WHERE
        // clause specifically.
        let where_clause = sql.split("WHERE").nth(1).unwrap();
        assert!(where_clause.contains("\"product\".\"category_id\" ="));
        assert!(where_clause.contains(&id.to_string()));
    }

    #[test]
    fn no_category_filter_without_category() {
        let sql = build(QueryPlan::default());
        let where_clause = sql.split("WHERE").nth(1).unwrap();
        assert!(!where_clause.contains("category_id"));
    }

    #[test]
    fn popular_filter() {
        let sql = build(QueryPlan {
            popular_only: true,
            ..QueryPlan::default()
        });

        assert!(sql.contains("\"product\".\"is_popular\" = TRUE"));
    }

    #[test]
    fn search_is_case_insensitive_or_over_name_and_description() {
        let sql = build(QueryPlan {
            search: Some("soup".to_string()),
            ..QueryPlan::default()
        });

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("%soup%"));
        assert!(sql.contains("\"product\".\"name\""));
        assert!(sql.contains("\"product\".\"description\""));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn search_wildcards_are_escaped() {
        let sql = build(QueryPlan {
            search: Some("50%_off".to_string()),
            ..QueryPlan::default()
        });

        assert!(
            !sql.contains("%50%_off%"),
            "raw wildcard chars should not survive: {sql}"
        );
    }

    #[test]
    fn price_bounds_are_inclusive_and_independent() {
        let sql = build(QueryPlan {
            min_price: Some(10.0),
            ..QueryPlan::default()
        });
        assert!(sql.contains("\"product\".\"price\" >= 10"));
        assert!(!sql.contains("<="));

        let sql = build(QueryPlan {
            max_price: Some(50.0),
            ..QueryPlan::default()
        });
        assert!(sql.contains("\"product\".\"price\" <= 50"));
        assert!(!sql.contains(">="));
    }

    #[test]
    fn standard_sort_with_tiebreak() {
        let sql = build(QueryPlan::default());
        let order = sql.split("ORDER BY").nth(1).unwrap();

        assert!(order.contains("\"sort_order\" ASC"));
        assert!(order.contains("\"created\" DESC"));
        assert!(
            order.find("sort_order").unwrap() < order.find("created").unwrap(),
            "sort_order must come first: {order}"
        );
    }

    #[test]
    fn price_sorts_have_no_tiebreak() {
        let sql = build(QueryPlan {
            sort: SortKey::PriceAsc,
            ..QueryPlan::default()
        });
        let order = sql.split("ORDER BY").nth(1).unwrap();
        assert!(order.contains("\"price\" ASC"));
        assert!(!order.contains("created"));

        let sql = build(QueryPlan {
            sort: SortKey::PriceDesc,
            ..QueryPlan::default()
        });
        assert!(sql.split("ORDER BY").nth(1).unwrap().contains("\"price\" DESC"));
    }

    #[test]
    fn name_sorts() {
        let sql = build(QueryPlan {
            sort: SortKey::NameAsc,
            ..QueryPlan::default()
        });
        assert!(sql.split("ORDER BY").nth(1).unwrap().contains("\"name\" ASC"));

        let sql = build(QueryPlan {
            sort: SortKey::NameDesc,
            ..QueryPlan::default()
        });
        assert!(sql.split("ORDER BY").nth(1).unwrap().contains("\"name\" DESC"));
    }

    #[test]
    fn newest_sort() {
        let sql = build(QueryPlan {
            sort: SortKey::Newest,
            ..QueryPlan::default()
        });
        let order = sql.split("ORDER BY").nth(1).unwrap();
        assert!(order.contains("\"created\" DESC"));
        assert!(!order.contains("sort_order"));
    }

    #[test]
    fn popular_sort_with_created_tiebreak() {
        let sql = build(QueryPlan {
            sort: SortKey::Popular,
            ..QueryPlan::default()
        });
        let order = sql.split("ORDER BY").nth(1).unwrap();

        assert!(order.contains("\"is_popular\" DESC"));
        assert!(order.contains("\"created\" DESC"));
        assert!(
            order.find("is_popular").unwrap() < order.find("created").unwrap(),
            "popular flag must come first: {order}"
        );
    }

    #[test]
    fn pagination_window() {
        let plan = QueryPlan::compile(&ListParams {
            page: Some("3".to_string()),
            limit: Some("20".to_string()),
            ..ListParams::default()
        });
        let sql = build(plan);

        assert!(sql.contains("LIMIT 20"));
        assert!(sql.contains("OFFSET 40"));
    }

    #[test]
    fn count_query_has_no_window_join_or_order() {
        let plan = QueryPlan {
            search: Some("kebab".to_string()),
            sort: SortKey::Popular,
            ..QueryPlan::default()
        };
        let sql = CatalogQueryBuilder::new(plan).build_count();

        assert!(sql.contains("COUNT(*)"));
        assert!(sql.contains("ILIKE"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("JOIN"));
    }

    #[test]
    fn escape_like_wildcards_function() {
        assert_eq!(escape_like_wildcards("soup"), "soup");
        assert_eq!(escape_like_wildcards("50%"), "50\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
    }
}
