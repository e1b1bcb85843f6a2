//! Chart Plotter Module
//! Renders static PNG charts with plotters from already-shaped aggregates.

use std::path::Path;

use log::info;
use plotters::prelude::*;
use thiserror::Error;

use crate::analysis::CategoryCount;

/// Color palette for bars
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Fill used for histogram buckets
pub const HISTOGRAM_COLOR: RGBColor = RGBColor(91, 155, 213);

const CHART_SIZE: (u32, u32) = (1000, 600);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to render chart: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_err(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}

/// Creates static summary charts from count and value aggregates.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a bar.
    pub fn bar_color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    /// Vertical bar chart of category counts.
    pub fn bar_chart(
        path: &Path,
        title: &str,
        x_label: &str,
        y_label: &str,
        data: &[CategoryCount],
    ) -> Result<(), ChartError> {
        if data.is_empty() {
            return Ok(());
        }
        let max_count = data.iter().map(|c| c.count).max().unwrap_or(0).max(1);
        let labels: Vec<String> = data.iter().map(|c| c.label.clone()).collect();

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(80)
            .y_label_area_size(70)
            .build_cartesian_2d(0i32..data.len() as i32, 0u64..next_tick(max_count))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .x_labels(data.len())
            .x_label_formatter(&|idx: &i32| {
                labels
                    .get(*idx as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(data.iter().enumerate().map(|(i, c)| {
                Rectangle::new(
                    [(i as i32, 0u64), (i as i32 + 1, c.count)],
                    Self::bar_color(i).filled(),
                )
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!("wrote chart {}", path.display());
        Ok(())
    }

    /// Horizontal bar chart of category counts; the first category lands at
    /// the top, matching the order of the printed tables.
    pub fn horizontal_bar_chart(
        path: &Path,
        title: &str,
        x_label: &str,
        y_label: &str,
        data: &[CategoryCount],
    ) -> Result<(), ChartError> {
        if data.is_empty() {
            return Ok(());
        }
        let n = data.len();
        let max_count = data.iter().map(|c| c.count).max().unwrap_or(0).max(1);
        let labels: Vec<String> = data.iter().map(|c| c.label.clone()).collect();

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(180)
            .build_cartesian_2d(0u64..next_tick(max_count), 0i32..n as i32)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .y_labels(n)
            .y_label_formatter(&|idx: &i32| {
                // y grows upward, so the first category maps to the top slot
                let slot = n as i32 - 1 - *idx;
                labels
                    .get(slot as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(data.iter().enumerate().map(|(i, c)| {
                let y = n as i32 - 1 - i as i32;
                Rectangle::new([(0u64, y), (c.count, y + 1)], Self::bar_color(i).filled())
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!("wrote chart {}", path.display());
        Ok(())
    }

    /// Histogram with `bins` equal-width buckets.
    pub fn histogram(
        path: &Path,
        title: &str,
        x_label: &str,
        y_label: &str,
        values: &[f64],
        bins: usize,
    ) -> Result<(), ChartError> {
        let Some((min, max, counts)) = bin_counts(values, bins) else {
            return Ok(());
        };
        let width = (max - min) / counts.len() as f64;
        let max_count = counts.iter().copied().max().unwrap_or(0).max(1);

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(70)
            .build_cartesian_2d(min..max, 0u64..next_tick(max_count))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(counts.iter().enumerate().map(|(i, &count)| {
                let x0 = min + i as f64 * width;
                Rectangle::new([(x0, 0u64), (x0 + width, count)], HISTOGRAM_COLOR.filled())
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!("wrote chart {}", path.display());
        Ok(())
    }
}

/// Bucket finite values into `bins` equal-width counts over [min, max].
/// Returns None when there is nothing to draw.
fn bin_counts(values: &[f64], bins: usize) -> Option<(f64, f64, Vec<u64>)> {
    if bins == 0 {
        return None;
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        max = min + 1.0;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0u64; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some((min, max, counts))
}

/// Headroom above the tallest bar so it never touches the frame.
fn next_tick(max_count: u64) -> u64 {
    max_count + max_count / 10 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_counts_cover_all_values() {
        let (min, max, counts) = bin_counts(&[1.0, 2.0, 3.0, 4.0, 10.0], 3).unwrap();
        assert_eq!(min, 1.0);
        assert_eq!(max, 10.0);
        assert_eq!(counts.iter().sum::<u64>(), 5);
        // the maximum lands in the last bucket, not out of range
        assert_eq!(*counts.last().unwrap(), 1);
    }

    #[test]
    fn bin_counts_handle_constant_samples() {
        let (min, max, counts) = bin_counts(&[5.0, 5.0, 5.0], 4).unwrap();
        assert!(max > min);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn bin_counts_reject_empty_input() {
        assert!(bin_counts(&[], 10).is_none());
        assert!(bin_counts(&[f64::NAN], 10).is_none());
        assert!(bin_counts(&[1.0], 0).is_none());
    }
}
