//! Data module - dataset loading and cleaning

mod cleaner;
mod loader;

pub use cleaner::{
    clean_all, clean_closed_deals, clean_leads, clean_order_items, clean_orders, clean_products,
    clean_reviews, CleanError, NO_MESSAGE, NO_TITLE, UNKNOWN,
};
pub use loader::{DatasetLoader, LoaderError};

use polars::prelude::DataFrame;
use std::collections::BTreeMap;

/// The evolving table collection, keyed by dataset name. Owned by exactly one
/// pipeline stage at a time.
pub type Datasets = BTreeMap<String, DataFrame>;

/// Dataset names recognized by the cleaning recipes.
pub const LEADS: &str = "leads";
pub const CLOSED_DEALS: &str = "closed_deals";
pub const ORDERS: &str = "orders";
pub const REVIEWS: &str = "reviews";
pub const ORDER_ITEMS: &str = "order_items";
pub const PRODUCTS: &str = "products";
pub const SELLERS: &str = "sellers";
pub const CATEGORY_TRANSLATION: &str = "category_translation";
