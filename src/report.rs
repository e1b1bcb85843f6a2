//! Console Reporter Module
//! Prints aggregates as text. Every display-formatting decision (column
//! widths, float precision) lives here, never in the analysis core.

use crate::analysis::{CategoryCount, FunnelReport};
use crate::stats::Summary;

/// Print a section banner.
pub fn section(title: &str) {
    println!("\n--- {title} ---");
}

/// Print category counts as an aligned two-column table.
pub fn print_counts(heading: &str, counts: &[CategoryCount]) {
    println!("{heading}:");
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| vec![c.label.clone(), c.count.to_string()])
        .collect();
    print!("{}", render_table(&["value", "count"], &rows));
}

/// Print a descriptive summary in the usual count/mean/std/quartile order.
pub fn print_summary(heading: &str, summary: &Summary) {
    println!("{heading}:");
    let rows = vec![
        vec!["count".to_string(), summary.count.to_string()],
        vec!["mean".to_string(), format!("{:.2}", summary.mean)],
        vec!["std".to_string(), format!("{:.2}", summary.std)],
        vec!["min".to_string(), format!("{:.2}", summary.min)],
        vec!["25%".to_string(), format!("{:.2}", summary.p25)],
        vec!["50%".to_string(), format!("{:.2}", summary.median)],
        vec!["75%".to_string(), format!("{:.2}", summary.p75)],
        vec!["max".to_string(), format!("{:.2}", summary.max)],
    ];
    print!("{}", render_table(&["stat", "value"], &rows));
}

/// Print the funnel outcome.
pub fn print_funnel(report: &FunnelReport) {
    section("Quantifying Marketing Funnel Conversion Rates");
    println!("Total MQLs identified: {}", report.total_leads);
    if report.dropped_invalid_dates > 0 {
        println!(
            "Dropped {} joined row(s) with missing won_date or first_contact_date.",
            report.dropped_invalid_dates
        );
    }
    println!("MQLs converted to Closed Deals: {}", report.converted_leads);
    println!(
        "MQL to Won Deal Conversion Rate: {:.2}%",
        report.conversion_rate
    );
    println!(
        "MQLs that did not convert (lost/unresolved): {}",
        report.lost_leads.height()
    );
}

/// Render rows as a width-aligned table with a dashed header separator.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.len());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let mut line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        while line.ends_with(' ') {
            line.pop();
        }
        line
    };

    let mut output = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    output.push_str(&format_row(&header_cells));
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
    output.push_str(&separator.join("  "));
    output.push('\n');

    for row in rows {
        output.push_str(&format_row(row));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns_and_trims_trailing_space() {
        let rows = vec![
            vec!["organic_search".to_string(), "3".to_string()],
            vec!["social".to_string(), "12".to_string()],
        ];
        let rendered = render_table(&["value", "count"], &rows);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "value           count");
        assert!(lines[1].starts_with("--------------"));
        assert_eq!(lines[2], "organic_search  3");
        assert_eq!(lines[3], "social          12");
        for line in &lines {
            assert!(!line.ends_with(' '));
        }
    }
}
