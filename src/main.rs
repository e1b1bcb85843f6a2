//! Funnelscope - CRM Marketing Funnel Analysis & Chart Generation
//!
//! Batch pipeline: load the CRM CSV datasets, clean them, explore the main
//! distributions, quantify the marketing funnel, and render summary charts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use env_logger::Env;
use polars::prelude::DataFrame;

use funnelscope::analysis::{self, CategoryCount, FunnelAnalyzer};
use funnelscope::charts::ChartPlotter;
use funnelscope::data::{self, clean_all, DatasetLoader, Datasets};
use funnelscope::report;
use funnelscope::stats::StatsCalculator;

const CHART_DIR: &str = "charts";
const TOP_N: usize = 10;
const REVENUE_BINS: usize = 50;
const DELIVERY_BINS: usize = 50;

fn dataset_sources() -> BTreeMap<String, PathBuf> {
    let entries = [
        (data::CLOSED_DEALS, "data/olist_closed_deals_dataset.csv"),
        (
            data::LEADS,
            "data/olist_marketing_qualified_leads_dataset.csv",
        ),
        (data::SELLERS, "data/olist_sellers_dataset.csv"),
        (data::ORDER_ITEMS, "data/olist_order_items_dataset.csv"),
        (data::ORDERS, "data/olist_orders_dataset.csv"),
        (data::REVIEWS, "data/olist_order_reviews_dataset.csv"),
        (data::PRODUCTS, "data/olist_products_dataset.csv"),
        (
            data::CATEGORY_TRANSLATION,
            "data/product_category_name_translation.csv",
        ),
    ];
    entries
        .iter()
        .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    report::section("1. Loading Datasets");
    let raw = DatasetLoader::load_all(&dataset_sources()).context("loading datasets")?;

    report::section("2. Cleaning and Preparing Data");
    let tables = clean_all(raw).context("cleaning datasets")?;

    std::fs::create_dir_all(CHART_DIR)
        .with_context(|| format!("creating chart directory `{CHART_DIR}`"))?;

    explore(&tables).context("exploratory analysis")?;
    funnel(&tables).context("funnel analysis")?;

    Ok(())
}

/// The descriptive pass: distributions and summaries per dataset.
fn explore(tables: &Datasets) -> anyhow::Result<()> {
    report::section("Initial Exploratory Data Analysis");

    let leads = table(tables, data::LEADS)?;
    let origin_counts = analysis::value_counts(leads, "origin")?;
    report::print_counts("Top 10 Marketing Channels (Origin)", top(&origin_counts));
    ChartPlotter::horizontal_bar_chart(
        &chart_path("mql_origin"),
        "Distribution of Marketing Qualified Leads by Origin",
        "Number of MQLs",
        "Marketing Channel Origin",
        &origin_counts,
    )?;

    let deals = table(tables, data::CLOSED_DEALS)?;
    let segment_counts = analysis::value_counts(deals, "business_segment")?;
    report::print_counts(
        "Top 10 Business Segments for Acquired Sellers",
        top(&segment_counts),
    );
    ChartPlotter::horizontal_bar_chart(
        &chart_path("business_segments"),
        "Distribution of Acquired Sellers by Business Segment",
        "Number of Sellers",
        "Business Segment",
        &segment_counts,
    )?;

    let revenue = analysis::positive_values(deals, "declared_monthly_revenue")?;
    report::print_summary(
        "Declared monthly revenue (acquired sellers > 0)",
        &StatsCalculator::summarize(&revenue),
    );
    // Clip at the 95th percentile so the long tail does not flatten the plot
    let p95 = StatsCalculator::percentile_of(&revenue, 95.0);
    let clipped: Vec<f64> = revenue.iter().copied().filter(|v| *v <= p95).collect();
    ChartPlotter::histogram(
        &chart_path("declared_monthly_revenue"),
        "Distribution of Declared Monthly Revenue (Acquired Sellers > 0)",
        "Declared Monthly Revenue",
        "Number of Sellers",
        &clipped,
        REVENUE_BINS,
    )?;

    let orders = table(tables, data::ORDERS)?;
    let status_counts = analysis::value_counts(orders, "order_status")?;
    report::print_counts("Order Status Distribution", &status_counts);
    ChartPlotter::bar_chart(
        &chart_path("order_status"),
        "Distribution of Order Status",
        "Order Status",
        "Number of Orders",
        &status_counts,
    )?;

    let delivery = analysis::delivery_days(orders)?;
    report::print_summary(
        "Actual delivery days (delivered orders)",
        &StatsCalculator::summarize(&delivery.actual),
    );
    report::print_summary(
        "Estimated delivery days (delivered orders)",
        &StatsCalculator::summarize(&delivery.estimated),
    );
    report::print_summary(
        "Delivery difference in days (actual - estimated)",
        &StatsCalculator::summarize(&delivery.difference),
    );
    ChartPlotter::histogram(
        &chart_path("actual_delivery_days"),
        "Distribution of Actual Delivery Days (Delivered Orders)",
        "Days",
        "Number of Orders",
        &delivery.actual,
        DELIVERY_BINS,
    )?;

    let reviews = table(tables, data::REVIEWS)?;
    let mut score_counts = analysis::value_counts(reviews, "review_score")?;
    score_counts.sort_by(|a, b| b.label.cmp(&a.label));
    report::print_counts("Review Score Distribution", &score_counts);
    score_counts.reverse();
    ChartPlotter::bar_chart(
        &chart_path("review_scores"),
        "Distribution of Review Scores",
        "Review Score (1-5)",
        "Number of Reviews",
        &score_counts,
    )?;

    let products = table(tables, data::PRODUCTS)?;
    let translation = table(tables, data::CATEGORY_TRANSLATION)?;
    let category_counts = analysis::english_category_counts(products, translation, TOP_N)?;
    report::print_counts("Top 10 Product Categories (English)", &category_counts);
    ChartPlotter::horizontal_bar_chart(
        &chart_path("product_categories"),
        "Top 10 Product Categories (English)",
        "Number of Products",
        "Product Category",
        &category_counts,
    )?;

    let sellers = table(tables, data::SELLERS)?;
    let state_counts = analysis::value_counts(sellers, "seller_state")?;
    report::print_counts("Top 10 Seller States", top(&state_counts));
    ChartPlotter::bar_chart(
        &chart_path("seller_states"),
        "Top 10 Seller States",
        "State",
        "Number of Sellers",
        top(&state_counts),
    )?;

    Ok(())
}

/// The funnel pass: conversion metrics and the two funnel charts.
fn funnel(tables: &Datasets) -> anyhow::Result<()> {
    let leads = table(tables, data::LEADS)?;
    let deals = table(tables, data::CLOSED_DEALS)?;

    let funnel = FunnelAnalyzer::analyze(leads, deals)?;
    report::print_funnel(&funnel);

    let stages = funnel.stages();
    ChartPlotter::bar_chart(
        &chart_path("funnel_stages"),
        "Marketing Funnel Conversion (MQLs to Closed Deals)",
        "Funnel Stage",
        "Number of Leads",
        &stages,
    )?;
    ChartPlotter::horizontal_bar_chart(
        &chart_path("funnel_stages_horizontal"),
        "Marketing Funnel (MQLs to Closed Deals)",
        "Number of Leads",
        "Funnel Stage",
        &stages,
    )?;

    Ok(())
}

fn table<'a>(tables: &'a Datasets, name: &str) -> anyhow::Result<&'a DataFrame> {
    tables
        .get(name)
        .with_context(|| format!("dataset `{name}` was not loaded"))
}

fn top(counts: &[CategoryCount]) -> &[CategoryCount] {
    &counts[..counts.len().min(TOP_N)]
}

fn chart_path(name: &str) -> PathBuf {
    Path::new(CHART_DIR).join(format!("{name}.png"))
}
