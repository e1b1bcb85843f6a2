//! Analysis module - funnel conversion and exploratory aggregates

mod explore;
mod funnel;

pub use explore::{
    column_values, delivery_days, english_category_counts, positive_values, value_counts,
    CategoryCount, DeliveryDays, ExploreError,
};
pub use funnel::{FunnelAnalyzer, FunnelError, FunnelReport};
