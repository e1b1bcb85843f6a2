//! Exploratory aggregates over the cleaned tables.
//! Shapes {label, count} sequences and numeric samples for the reporting layer.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("column `{column}` not found for aggregation")]
    MissingColumn { column: String },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// A single category with its row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

/// Count rows per distinct value of `column`, most frequent first.
///
/// Null labels are skipped; after cleaning none should remain in the columns
/// this is pointed at.
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>, ExploreError> {
    if df.column(column).is_err() {
        return Err(ExploreError::MissingColumn {
            column: column.to_string(),
        });
    }

    let counted = df
        .clone()
        .lazy()
        .group_by([col(column)])
        .agg([len().alias("count")])
        .sort(
            ["count"],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let labels = counted.column(column)?.as_materialized_series().clone();
    let counts = counted.column("count")?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let mut out = Vec::with_capacity(counted.height());
    for i in 0..counted.height() {
        let label = labels.get(i)?;
        if label.is_null() {
            continue;
        }
        out.push(CategoryCount {
            label: label.to_string().trim_matches('"').to_string(),
            count: counts.get(i).unwrap_or(0),
        });
    }
    Ok(out)
}

/// Non-null values of a numeric column, as f64.
pub fn column_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ExploreError> {
    let casted = df
        .column(column)
        .map_err(|_| ExploreError::MissingColumn {
            column: column.to_string(),
        })?
        .cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().flatten().collect())
}

/// Strictly positive values of a numeric column.
pub fn positive_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ExploreError> {
    Ok(column_values(df, column)?
        .into_iter()
        .filter(|v| *v > 0.0)
        .collect())
}

/// Delivery timing (in days) for delivered orders.
#[derive(Debug, Clone, Default)]
pub struct DeliveryDays {
    pub actual: Vec<f64>,
    pub estimated: Vec<f64>,
    pub difference: Vec<f64>,
}

/// Day deltas between purchase and (actual, estimated) delivery for orders
/// with `order_status == "delivered"`. Rows missing a timestamp contribute
/// nothing to the affected sample.
pub fn delivery_days(orders: &DataFrame) -> Result<DeliveryDays, ExploreError> {
    for column in [
        "order_status",
        "order_purchase_timestamp",
        "order_delivered_customer_date",
        "order_estimated_delivery_date",
    ] {
        if orders.column(column).is_err() {
            return Err(ExploreError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let delivered = orders
        .clone()
        .lazy()
        .filter(col("order_status").eq(lit("delivered")))
        .with_columns([
            (col("order_delivered_customer_date") - col("order_purchase_timestamp"))
                .dt()
                .total_days()
                .alias("actual_delivery_days"),
            (col("order_estimated_delivery_date") - col("order_purchase_timestamp"))
                .dt()
                .total_days()
                .alias("estimated_delivery_days"),
        ])
        .with_columns([(col("actual_delivery_days") - col("estimated_delivery_days"))
            .alias("delivery_difference_days")])
        .collect()?;

    Ok(DeliveryDays {
        actual: column_values(&delivered, "actual_delivery_days")?,
        estimated: column_values(&delivered, "estimated_delivery_days")?,
        difference: column_values(&delivered, "delivery_difference_days")?,
    })
}

/// Product category counts by English name, via the translation table.
pub fn english_category_counts(
    products: &DataFrame,
    translation: &DataFrame,
    limit: usize,
) -> Result<Vec<CategoryCount>, ExploreError> {
    let joined = products
        .clone()
        .lazy()
        .join(
            translation.clone().lazy(),
            [col("product_category_name")],
            [col("product_category_name")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let mut counts = value_counts(&joined, "product_category_name_english")?;
    counts.truncate(limit);
    Ok(counts)
}
