//! Catalog query engine.
//!
//! Turns raw listing parameters into a validated query plan, renders the
//! plan to SQL, and orchestrates the product and category stores into
//! paginated, category-joined results.

pub mod plan;
pub mod query_builder;
pub mod service;

pub use plan::{ListParams, QueryPlan, SortKey};
pub use query_builder::CatalogQueryBuilder;
pub use service::{CatalogProduct, CatalogService, CategoryProducts, CategoryRef, ProductPage};
