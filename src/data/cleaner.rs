//! Cleaner/Normalizer Module
//! Table-specific cleaning recipes, applied in a single pass per dataset.

use log::info;
use polars::prelude::*;
use thiserror::Error;

use super::{Datasets, CLOSED_DEALS, LEADS, ORDERS, ORDER_ITEMS, PRODUCTS, REVIEWS};

/// Sentinel substituted for missing categorical values.
pub const UNKNOWN: &str = "unknown";
/// Sentinel for a missing review comment title.
pub const NO_TITLE: &str = "No Title";
/// Sentinel for a missing review comment message.
pub const NO_MESSAGE: &str = "No Message";

const ORDER_DATE_COLUMNS: [&str; 5] = [
    "order_purchase_timestamp",
    "order_approved_at",
    "order_delivered_carrier_date",
    "order_delivered_customer_date",
    "order_estimated_delivery_date",
];

const PRODUCT_NUMERIC_COLUMNS: [&str; 7] = [
    "product_name_lenght",
    "product_description_lenght",
    "product_photos_qty",
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("table `{table}` is missing required column `{column}`")]
    MissingColumn { table: String, column: String },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Apply the per-table cleaning recipe to every recognized dataset.
///
/// Unrecognized dataset names (reference tables, extras) pass through
/// untouched. The collection is taken and returned by value; no other owner
/// can observe a half-cleaned table.
pub fn clean_all(mut tables: Datasets) -> Result<Datasets, CleanError> {
    for (name, df) in tables.iter_mut() {
        let cleaned = match name.as_str() {
            LEADS => clean_leads(df)?,
            CLOSED_DEALS => clean_closed_deals(df)?,
            ORDERS => clean_orders(df)?,
            REVIEWS => clean_reviews(df)?,
            ORDER_ITEMS => clean_order_items(df)?,
            PRODUCTS => clean_products(df)?,
            _ => continue,
        };
        *df = cleaned;
    }
    Ok(tables)
}

/// Leads: a valid first contact date is required, exact duplicates are
/// removed, and a missing origin becomes `"unknown"`.
pub fn clean_leads(df: &DataFrame) -> Result<DataFrame, CleanError> {
    require_columns(df, LEADS, &["lead_id", "first_contact_date", "origin"])?;

    let parsed = parse_datetime_columns(df, LEADS, &["first_contact_date"])?;

    let kept = parsed
        .clone()
        .lazy()
        .filter(col("first_contact_date").is_not_null())
        .collect()?;
    let dropped = parsed.height() - kept.height();

    let cleaned = kept
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .with_columns([col("origin").fill_null(lit(UNKNOWN))])
        .collect()?;
    let duplicates = kept.height() - cleaned.height();

    info!("{LEADS}: dropped {dropped} row(s) without first_contact_date, removed {duplicates} duplicate(s)");
    Ok(cleaned)
}

/// Closed deals: rows missing `won_date` or `seller_id` are dropped before
/// any filling; categoricals get the `"unknown"` sentinel, flags become
/// concrete booleans, and the declared numerics default to 0.
pub fn clean_closed_deals(df: &DataFrame) -> Result<DataFrame, CleanError> {
    require_columns(
        df,
        CLOSED_DEALS,
        &[
            "lead_id",
            "seller_id",
            "won_date",
            "business_segment",
            "lead_type",
            "lead_behaviour_profile",
            "has_company",
            "has_gtin",
            "average_stock",
            "business_type",
            "declared_product_catalog_size",
            "declared_monthly_revenue",
        ],
    )?;

    let parsed = parse_datetime_columns(df, CLOSED_DEALS, &["won_date"])?;

    let kept = parsed
        .clone()
        .lazy()
        .filter(
            col("won_date")
                .is_not_null()
                .and(col("seller_id").is_not_null()),
        )
        .collect()?;
    let dropped = parsed.height() - kept.height();

    let cleaned = kept
        .lazy()
        .with_columns([
            col("business_segment").fill_null(lit(UNKNOWN)),
            col("lead_type").fill_null(lit(UNKNOWN)),
            col("lead_behaviour_profile").fill_null(lit(UNKNOWN)),
            col("average_stock").fill_null(lit(UNKNOWN)),
            col("business_type").fill_null(lit(UNKNOWN)),
            col("has_company")
                .cast(DataType::Boolean)
                .fill_null(lit(false)),
            col("has_gtin").cast(DataType::Boolean).fill_null(lit(false)),
            col("declared_product_catalog_size")
                .cast(DataType::Float64)
                .fill_null(lit(0.0)),
            col("declared_monthly_revenue")
                .cast(DataType::Float64)
                .fill_null(lit(0.0)),
        ])
        .collect()?;

    info!("{CLOSED_DEALS}: dropped {dropped} row(s) missing won_date or seller_id");
    Ok(cleaned)
}

/// Orders: the five lifecycle timestamps are parsed; malformed or absent
/// values stay behind as nulls for downstream filters to inspect.
pub fn clean_orders(df: &DataFrame) -> Result<DataFrame, CleanError> {
    require_columns(df, ORDERS, &ORDER_DATE_COLUMNS)?;
    parse_datetime_columns(df, ORDERS, &ORDER_DATE_COLUMNS)
}

/// Reviews: timestamps parsed, comment fields sentinel-filled.
pub fn clean_reviews(df: &DataFrame) -> Result<DataFrame, CleanError> {
    require_columns(
        df,
        REVIEWS,
        &[
            "review_creation_date",
            "review_answer_timestamp",
            "review_comment_title",
            "review_comment_message",
        ],
    )?;

    let parsed = parse_datetime_columns(
        df,
        REVIEWS,
        &["review_creation_date", "review_answer_timestamp"],
    )?;

    Ok(parsed
        .lazy()
        .with_columns([
            col("review_comment_title").fill_null(lit(NO_TITLE)),
            col("review_comment_message").fill_null(lit(NO_MESSAGE)),
        ])
        .collect()?)
}

/// Order items: only the shipping limit timestamp needs parsing.
pub fn clean_order_items(df: &DataFrame) -> Result<DataFrame, CleanError> {
    require_columns(df, ORDER_ITEMS, &["shipping_limit_date"])?;
    parse_datetime_columns(df, ORDER_ITEMS, &["shipping_limit_date"])
}

/// Products: missing category becomes `"unknown"`; each physical attribute
/// is filled with its own column median over the non-missing values.
///
/// The medians are computed once per column before any fill, so re-running
/// the recipe on an already-clean table changes nothing.
pub fn clean_products(df: &DataFrame) -> Result<DataFrame, CleanError> {
    let mut required = vec!["product_category_name"];
    required.extend_from_slice(&PRODUCT_NUMERIC_COLUMNS);
    require_columns(df, PRODUCTS, &required)?;

    let missing: usize = PRODUCT_NUMERIC_COLUMNS
        .iter()
        .map(|name| df.column(name).map(|c| c.null_count()).unwrap_or(0))
        .sum();

    let mut exprs = vec![col("product_category_name").fill_null(lit(UNKNOWN))];
    for &name in PRODUCT_NUMERIC_COLUMNS.iter() {
        let as_f64 = col(name).cast(DataType::Float64);
        exprs.push(as_f64.clone().fill_null(as_f64.median()));
    }

    let cleaned = df.clone().lazy().with_columns(exprs).collect()?;
    info!("{PRODUCTS}: median-filled {missing} missing attribute value(s)");
    Ok(cleaned)
}

/// Parse string timestamp columns in place. Malformed values coerce to null
/// instead of raising; the coercion count is logged as a data-quality signal.
/// Columns that already carry a non-string dtype are left alone.
fn parse_datetime_columns(
    df: &DataFrame,
    table: &str,
    columns: &[&str],
) -> Result<DataFrame, CleanError> {
    let mut exprs = Vec::with_capacity(columns.len());
    for &name in columns {
        let column = df.column(name)?;
        if column.dtype() != &DataType::String {
            continue;
        }
        exprs.push(col(name).str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            StrptimeOptions {
                strict: false,
                ..Default::default()
            },
            lit("raise"),
        ));
    }
    if exprs.is_empty() {
        return Ok(df.clone());
    }

    let parsed = df.clone().lazy().with_columns(exprs).collect()?;
    let nulls_after: usize = columns
        .iter()
        .map(|name| parsed.column(name).map(|c| c.null_count()).unwrap_or(0))
        .sum();
    let nulls_before: usize = columns
        .iter()
        .map(|name| df.column(name).map(|c| c.null_count()).unwrap_or(0))
        .sum();
    let coerced = nulls_after.saturating_sub(nulls_before);
    if coerced > 0 {
        info!("{table}: coerced {coerced} malformed timestamp value(s) to null");
    }
    Ok(parsed)
}

fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<(), CleanError> {
    for &column in columns {
        if !df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == column)
        {
            return Err(CleanError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leads_fixture() -> DataFrame {
        df!(
            "lead_id" => ["a", "b", "b", "c"],
            "first_contact_date" => [
                Some("2021-01-01 10:00:00"),
                Some("2021-01-02 09:30:00"),
                Some("2021-01-02 09:30:00"),
                None,
            ],
            "origin" => [None::<&str>, Some("organic_search"), Some("organic_search"), Some("paid_search")],
        )
        .unwrap()
    }

    #[test]
    fn leads_drop_null_dates_and_duplicates() {
        let cleaned = clean_leads(&leads_fixture()).unwrap();

        // c had no contact date, and the second b row was an exact duplicate
        assert_eq!(cleaned.height(), 2);
        assert_eq!(cleaned.column("first_contact_date").unwrap().null_count(), 0);

        let origins = cleaned.column("origin").unwrap();
        assert_eq!(origins.null_count(), 0);
        assert_eq!(origins.str().unwrap().get(0), Some(UNKNOWN));
    }

    #[test]
    fn leads_malformed_date_coerces_to_null_and_is_dropped() {
        let df = df!(
            "lead_id" => ["a", "b"],
            "first_contact_date" => [Some("2021-01-01 10:00:00"), Some("not-a-date")],
            "origin" => [Some("social"), Some("email")],
        )
        .unwrap();

        let cleaned = clean_leads(&df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(
            cleaned.column("lead_id").unwrap().str().unwrap().get(0),
            Some("a")
        );
    }

    #[test]
    fn leads_missing_column_is_reported() {
        let df = df!(
            "lead_id" => ["a"],
            "first_contact_date" => ["2021-01-01 10:00:00"],
        )
        .unwrap();

        match clean_leads(&df) {
            Err(CleanError::MissingColumn { table, column }) => {
                assert_eq!(table, LEADS);
                assert_eq!(column, "origin");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    fn deals_fixture() -> DataFrame {
        df!(
            "lead_id" => ["a", "b", "c"],
            "seller_id" => [Some("s1"), None, Some("s3")],
            "won_date" => [Some("2021-02-01 00:00:00"), Some("2021-02-02 00:00:00"), None],
            "business_segment" => [None::<&str>, Some("pet"), Some("home_decor")],
            "lead_type" => [Some("online_medium"), None, Some("industry")],
            "lead_behaviour_profile" => [None::<&str>, None, Some("cat")],
            "has_company" => [Some(true), None, None],
            "has_gtin" => [None::<bool>, Some(true), None],
            "average_stock" => [None::<&str>, Some("1-5"), None],
            "business_type" => [Some("reseller"), None, None],
            "declared_product_catalog_size" => [Some(120i64), None, None],
            "declared_monthly_revenue" => [None::<f64>, Some(80000.0), None],
        )
        .unwrap()
    }

    #[test]
    fn closed_deals_critical_drops_happen_before_fills() {
        let cleaned = clean_closed_deals(&deals_fixture()).unwrap();

        // b lost its seller_id, c its won_date; only a survives even though
        // every other field of b and c was fillable
        assert_eq!(cleaned.height(), 1);
        for name in [
            "business_segment",
            "lead_type",
            "lead_behaviour_profile",
            "average_stock",
            "business_type",
            "has_company",
            "has_gtin",
            "declared_product_catalog_size",
            "declared_monthly_revenue",
        ] {
            assert_eq!(cleaned.column(name).unwrap().null_count(), 0, "{name}");
        }

        assert_eq!(
            cleaned
                .column("business_segment")
                .unwrap()
                .str()
                .unwrap()
                .get(0),
            Some(UNKNOWN)
        );
        assert_eq!(
            cleaned
                .column("declared_monthly_revenue")
                .unwrap()
                .f64()
                .unwrap()
                .get(0),
            Some(0.0)
        );
        assert_eq!(
            cleaned.column("has_gtin").unwrap().bool().unwrap().get(0),
            Some(false)
        );
    }

    fn products_fixture() -> DataFrame {
        df!(
            "product_id" => ["p1", "p2", "p3"],
            "product_category_name" => [Some("beleza_saude"), None, Some("pet_shop")],
            "product_name_lenght" => [Some(40i64), Some(50), None],
            "product_description_lenght" => [Some(200i64), None, Some(400)],
            "product_photos_qty" => [Some(1i64), Some(3), Some(5)],
            "product_weight_g" => [Some(100.0), None, Some(300.0)],
            "product_length_cm" => [Some(10.0), Some(20.0), Some(30.0)],
            "product_height_cm" => [None::<f64>, Some(4.0), Some(8.0)],
            "product_width_cm" => [Some(12.0), Some(16.0), None],
        )
        .unwrap()
    }

    #[test]
    fn products_fill_with_column_median_of_present_values() {
        let cleaned = clean_products(&products_fixture()).unwrap();

        assert_eq!(
            cleaned
                .column("product_category_name")
                .unwrap()
                .str()
                .unwrap()
                .get(1),
            Some(UNKNOWN)
        );

        // median of {100, 300} is 200
        let weights = cleaned.column("product_weight_g").unwrap();
        assert_eq!(weights.null_count(), 0);
        assert_eq!(weights.f64().unwrap().get(1), Some(200.0));

        // median of {40, 50} is 45
        assert_eq!(
            cleaned
                .column("product_name_lenght")
                .unwrap()
                .f64()
                .unwrap()
                .get(2),
            Some(45.0)
        );
    }

    #[test]
    fn products_recipe_is_idempotent() {
        let once = clean_products(&products_fixture()).unwrap();
        let twice = clean_products(&once).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn reviews_sentinels_and_timestamp_coercion() {
        let df = df!(
            "review_id" => ["r1", "r2"],
            "review_score" => [5i64, 1],
            "review_creation_date" => [Some("2021-03-01 00:00:00"), Some("garbage")],
            "review_answer_timestamp" => [Some("2021-03-02 12:00:00"), None],
            "review_comment_title" => [None::<&str>, Some("ruim")],
            "review_comment_message" => [Some("adorei"), None],
        )
        .unwrap();

        let cleaned = clean_reviews(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(
            cleaned.column("review_creation_date").unwrap().null_count(),
            1
        );
        assert_eq!(
            cleaned
                .column("review_comment_title")
                .unwrap()
                .str()
                .unwrap()
                .get(0),
            Some(NO_TITLE)
        );
        assert_eq!(
            cleaned
                .column("review_comment_message")
                .unwrap()
                .str()
                .unwrap()
                .get(1),
            Some(NO_MESSAGE)
        );
    }

    #[test]
    fn orders_keep_rows_and_mark_invalid_timestamps() {
        let df = df!(
            "order_id" => ["o1", "o2"],
            "order_status" => ["delivered", "canceled"],
            "order_purchase_timestamp" => [Some("2021-01-01 08:00:00"), Some("2021-01-03 09:00:00")],
            "order_approved_at" => [Some("2021-01-01 09:00:00"), None],
            "order_delivered_carrier_date" => [Some("2021-01-02 10:00:00"), None],
            "order_delivered_customer_date" => [Some("2021-01-06 08:00:00"), None],
            "order_estimated_delivery_date" => [Some("2021-01-11 08:00:00"), Some("2021-01-15 08:00:00")],
        )
        .unwrap();

        let cleaned = clean_orders(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert!(matches!(
            cleaned.column("order_purchase_timestamp").unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
        assert_eq!(
            cleaned
                .column("order_delivered_customer_date")
                .unwrap()
                .null_count(),
            1
        );
    }

    #[test]
    fn unknown_tables_pass_through_unmodified() {
        let sellers = df!(
            "seller_id" => ["s1", "s2"],
            "seller_state" => [Some("SP"), None::<&str>],
        )
        .unwrap();

        let mut tables = Datasets::new();
        tables.insert(super::super::SELLERS.to_string(), sellers.clone());

        let cleaned = clean_all(tables).unwrap();
        assert!(cleaned[super::super::SELLERS].equals_missing(&sellers));
    }
}
