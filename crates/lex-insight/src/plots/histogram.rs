//! Histogram rendering.

use super::canvas::{
    Align, Area, GRID_GREY, draw_text, draw_text_vertical, format_tick, render_error, render_png,
    text_width, truncate_label,
};
use super::{PlotArtifact, PlotKind};
use crate::error::{AnalysisError, Result};
use plotters::prelude::*;

pub const HISTOGRAM_WIDTH: u32 = 640;
pub const HISTOGRAM_HEIGHT: u32 = 480;

const MARGIN_LEFT: i32 = 72;
const MARGIN_RIGHT: i32 = 24;
const MARGIN_TOP: i32 = 48;
const MARGIN_BOTTOM: i32 = 64;
const Y_TICKS: usize = 5;
const X_TICKS: u32 = 5;

const BAR_FILL: RGBColor = RGBColor(70, 130, 180);
const BAR_EDGE: RGBColor = RGBColor(35, 65, 90);

/// Equal-width bin counts over a value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Bins {
    /// Bin `values` into `bins` equal-width buckets over their full range.
    ///
    /// Identical values get the range `[v - 0.5, v + 0.5]`; no values get
    /// `[0, 1]` with every bucket empty. The maximum lands in the last bin.
    pub fn compute(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = match values.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            })
        }) {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(range) => range,
        };

        let width = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for v in values {
            let index = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self { min, max, counts }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Render the histogram of one column.
pub fn render_histogram(column: &str, values: &[f64], bins: usize) -> Result<PlotArtifact> {
    if bins == 0 {
        return Err(AnalysisError::Render("histogram needs at least one bin".to_string()));
    }

    let binned = Bins::compute(values, bins);
    let title = format!("Histogram of {}", column);
    let png = render_png(HISTOGRAM_WIDTH, HISTOGRAM_HEIGHT, |root| {
        draw_histogram(root, column, &title, &binned)
    })?;

    Ok(PlotArtifact {
        kind: PlotKind::Histogram {
            column: column.to_string(),
        },
        label: title,
        png,
        width: HISTOGRAM_WIDTH,
        height: HISTOGRAM_HEIGHT,
    })
}

fn draw_histogram(root: &Area<'_>, column: &str, title: &str, binned: &Bins) -> Result<()> {
    // Y scale rounded up to a whole tick step.
    let step = binned.max_count().div_ceil(Y_TICKS).max(1);
    let y_max = (step * Y_TICKS) as f64;
    let bin_width = (binned.max - binned.min) / binned.counts.len() as f64;

    let plot = root.margin(MARGIN_TOP, MARGIN_BOTTOM, MARGIN_LEFT, MARGIN_RIGHT);
    let mut chart = ChartBuilder::on(&plot)
        .build_cartesian_2d(binned.min..binned.max, 0.0..y_max)
        .map_err(render_error)?;

    chart
        .draw_series((1..=Y_TICKS).map(|tick| {
            let y = (step * tick) as f64;
            PathElement::new(vec![(binned.min, y), (binned.max, y)], GRID_GREY)
        }))
        .map_err(render_error)?;

    let bars = binned
        .counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(index, &count)| {
            let left = binned.min + bin_width * index as f64;
            [(left, 0.0), (left + bin_width, count as f64)]
        });
    for corners in bars {
        chart
            .draw_series([
                Rectangle::new(corners, BAR_FILL.filled()),
                Rectangle::new(corners, BAR_EDGE.stroke_width(1)),
            ])
            .map_err(render_error)?;
    }

    // Axes
    chart
        .draw_series([
            PathElement::new(vec![(binned.min, 0.0), (binned.min, y_max)], BLACK),
            PathElement::new(vec![(binned.min, 0.0), (binned.max, 0.0)], BLACK),
        ])
        .map_err(render_error)?;

    for tick in 0..=Y_TICKS {
        let value = step * tick;
        let (x, y) = chart.backend_coord(&(binned.min, value as f64));
        root.draw(&PathElement::new(vec![(x - 5, y), (x, y)], BLACK))
            .map_err(render_error)?;
        draw_text(root, (x - 8, y - 4), &value.to_string(), 1, &BLACK, Align::Right)?;
    }

    for tick in 0..=X_TICKS {
        let fraction = f64::from(tick) / f64::from(X_TICKS);
        let value = binned.min + (binned.max - binned.min) * fraction;
        let (x, y) = chart.backend_coord(&(value, 0.0));
        root.draw(&PathElement::new(vec![(x, y), (x, y + 5)], BLACK))
            .map_err(render_error)?;
        draw_text(root, (x, y + 9), &format_tick(value), 1, &BLACK, Align::Center)?;
    }

    let width = HISTOGRAM_WIDTH as i32;
    let title_scale = if text_width(title, 2) <= HISTOGRAM_WIDTH - 16 { 2 } else { 1 };
    let max_chars = ((HISTOGRAM_WIDTH - 16) / (8 * title_scale)) as usize;
    draw_text(
        root,
        (width / 2, 14),
        &truncate_label(title, max_chars),
        title_scale,
        &BLACK,
        Align::Center,
    )?;

    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HISTOGRAM_HEIGHT as i32 - MARGIN_TOP - MARGIN_BOTTOM;
    draw_text(
        root,
        (MARGIN_LEFT + plot_width / 2, HISTOGRAM_HEIGHT as i32 - 24),
        &truncate_label(column, (plot_width / 8) as usize),
        1,
        &BLACK,
        Align::Center,
    )?;
    draw_text_vertical(root, 12, MARGIN_TOP + plot_height / 2, "Frequency", 1, &BLACK)
}
