//! Funnel Analyzer Module
//! Quantifies the two-stage marketing funnel: MQLs -> Closed Deals.

use log::warn;
use polars::prelude::*;
use thiserror::Error;

use super::explore::CategoryCount;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("table `{table}` is missing required column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Outcome of the MQL -> Closed Deal funnel computation.
#[derive(Debug, Clone)]
pub struct FunnelReport {
    /// Lead rows after cleaning.
    pub total_leads: usize,
    /// Joined rows that survived the date-validity filter.
    pub converted_leads: usize,
    /// Joined rows removed because `won_date` or `first_contact_date` was null.
    pub dropped_invalid_dates: usize,
    /// `converted / total * 100`, 0 when there are no leads.
    pub conversion_rate: f64,
    /// Leads whose `lead_id` never appears among the converted rows.
    pub lost_leads: DataFrame,
}

impl FunnelReport {
    /// Stage counts shaped for the chart renderer.
    pub fn stages(&self) -> Vec<CategoryCount> {
        vec![
            CategoryCount {
                label: "MQLs".to_string(),
                count: self.total_leads as u64,
            },
            CategoryCount {
                label: "Closed Deals".to_string(),
                count: self.converted_leads as u64,
            },
        ]
    }
}

/// Joins cleaned leads with closed deals and derives conversion metrics.
pub struct FunnelAnalyzer;

impl FunnelAnalyzer {
    /// Compute the funnel report from cleaned `leads` and `closed_deals`.
    ///
    /// The inner join keeps every matching (lead, deal) pair, so
    /// `converted_leads` is a row count: callers that need a unique-lead
    /// count must guarantee `lead_id` is unique in `closed_deals`. Duplicate
    /// keys are detected and logged rather than silently overcounted.
    pub fn analyze(leads: &DataFrame, deals: &DataFrame) -> Result<FunnelReport, FunnelError> {
        require_column(leads, "leads", "lead_id")?;
        require_column(leads, "leads", "first_contact_date")?;
        require_column(deals, "closed_deals", "lead_id")?;
        require_column(deals, "closed_deals", "won_date")?;

        let total_leads = leads.height();

        let unique_keys = deals.column("lead_id")?.as_materialized_series().n_unique()?;
        if unique_keys < deals.height() {
            warn!(
                "closed_deals carries {} duplicate lead_id value(s); converted_leads counts rows, not leads",
                deals.height() - unique_keys
            );
        }

        let won = leads
            .clone()
            .lazy()
            .join(
                deals.clone().lazy(),
                [col("lead_id")],
                [col("lead_id")],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;

        // The join preserves nulls from either side, so date validity gets
        // re-checked on the joined rows.
        let valid = won
            .clone()
            .lazy()
            .filter(
                col("won_date")
                    .is_not_null()
                    .and(col("first_contact_date").is_not_null()),
            )
            .collect()?;
        let dropped_invalid_dates = won.height() - valid.height();

        let converted_leads = valid.height();
        let conversion_rate = if total_leads == 0 {
            0.0
        } else {
            converted_leads as f64 / total_leads as f64 * 100.0
        };

        // Key difference, not row equality: a lead is lost when its id never
        // shows up among the valid converted rows.
        let lost_leads = leads
            .clone()
            .lazy()
            .join(
                valid.clone().lazy(),
                [col("lead_id")],
                [col("lead_id")],
                JoinArgs::new(JoinType::Anti),
            )
            .collect()?;

        Ok(FunnelReport {
            total_leads,
            converted_leads,
            dropped_invalid_dates,
            conversion_rate,
            lost_leads,
        })
    }
}

fn require_column(
    df: &DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<(), FunnelError> {
    if df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == column)
    {
        Ok(())
    } else {
        Err(FunnelError::MissingColumn { table, column })
    }
}
