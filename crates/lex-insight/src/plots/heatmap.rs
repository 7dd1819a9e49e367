//! Correlation heatmap rendering.

use super::canvas::{
    Align, Area, draw_text, draw_text_upward, lerp_color, render_error, render_png, text_width,
    truncate_label,
};
use super::{PlotArtifact, PlotKind};
use crate::error::{AnalysisError, Result};
use crate::profiler::CorrelationMatrix;
use plotters::prelude::*;

pub const HEATMAP_TITLE: &str = "Correlation Matrix";

const GRID_TARGET: u32 = 480;
const MIN_CELL: u32 = 44;
const MAX_CELL: u32 = 96;
const LABEL_CHARS: usize = 12;
const LABEL_SPACE: u32 = LABEL_CHARS as u32 * 8 + 12;
const MARGIN: u32 = 24;
const TITLE_SPACE: u32 = 56;
const COLORBAR_GAP: u32 = 24;
const COLORBAR_WIDTH: u32 = 20;
const COLORBAR_LABELS: u32 = 48;

const NEGATIVE: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const POSITIVE: RGBColor = RGBColor(180, 4, 38);
const UNDEFINED: RGBColor = RGBColor(245, 245, 245);

/// Diverging blue-grey-red colour for a coefficient in `[-1, 1]`.
pub fn coefficient_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return UNDEFINED;
    }
    let value = value.clamp(-1.0, 1.0);
    if value < 0.0 {
        lerp_color(NEUTRAL, NEGATIVE, -value)
    } else {
        lerp_color(NEUTRAL, POSITIVE, value)
    }
}

/// Black or white, whichever reads better on `fill`.
pub fn contrasting_text(fill: RGBColor) -> RGBColor {
    let luminance =
        0.299 * f64::from(fill.0) + 0.587 * f64::from(fill.1) + 0.114 * f64::from(fill.2);
    if luminance < 128.0 { WHITE } else { BLACK }
}

/// Coefficient annotation, two decimals.
pub fn annotation(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Render an annotated heatmap of the matrix.
pub fn render_heatmap(matrix: &CorrelationMatrix) -> Result<PlotArtifact> {
    let n = matrix.len() as u32;
    if n == 0 {
        return Err(AnalysisError::Render(
            "correlation matrix has no columns".to_string(),
        ));
    }

    let cell = (GRID_TARGET / n).clamp(MIN_CELL, MAX_CELL);
    let grid = cell * n;
    let width = MARGIN + LABEL_SPACE + grid + COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_LABELS + MARGIN;
    let height = TITLE_SPACE + grid + LABEL_SPACE + MARGIN;

    let png = render_png(width, height, |root| draw_heatmap(root, matrix, cell))?;

    Ok(PlotArtifact {
        kind: PlotKind::Correlation,
        label: HEATMAP_TITLE.to_string(),
        png,
        width,
        height,
    })
}

fn draw_heatmap(root: &Area<'_>, matrix: &CorrelationMatrix, cell: u32) -> Result<()> {
    let grid = (cell as usize * matrix.len()) as i32;
    let cell = cell as i32;
    let grid_x = (MARGIN + LABEL_SPACE) as i32;
    let grid_y = TITLE_SPACE as i32;

    for row in 0..matrix.len() {
        for col in 0..matrix.len() {
            let value = matrix.get(row, col);
            let fill = coefficient_color(value);
            let x = grid_x + col as i32 * cell;
            let y = grid_y + row as i32 * cell;
            let corners = [(x, y), (x + cell - 1, y + cell - 1)];
            root.draw(&Rectangle::new(corners, fill.filled()))
                .map_err(render_error)?;
            root.draw(&Rectangle::new(corners, WHITE.stroke_width(1)))
                .map_err(render_error)?;
            draw_text(
                root,
                (x + cell / 2, y + cell / 2 - 4),
                &annotation(value),
                1,
                &contrasting_text(fill),
                Align::Center,
            )?;
        }
    }

    for (index, name) in matrix.columns.iter().enumerate() {
        let label = truncate_label(name, LABEL_CHARS);
        let center = index as i32 * cell + cell / 2;
        draw_text(root, (grid_x - 8, grid_y + center - 4), &label, 1, &BLACK, Align::Right)?;
        draw_text_upward(
            root,
            grid_x + center - 4,
            grid_y + grid + 8 + text_width(&label, 1) as i32,
            &label,
            1,
            &BLACK,
        )?;
    }

    // Colour bar from +1 at the top to -1 at the bottom.
    let bar_x = grid_x + grid + COLORBAR_GAP as i32;
    let bar_right = bar_x + COLORBAR_WIDTH as i32 - 1;
    for offset in 0..grid {
        let value = 1.0 - 2.0 * f64::from(offset) / f64::from((grid - 1).max(1));
        let y = grid_y + offset;
        root.draw(&PathElement::new(
            vec![(bar_x, y), (bar_right, y)],
            coefficient_color(value),
        ))
        .map_err(render_error)?;
    }
    root.draw(&Rectangle::new(
        [(bar_x, grid_y), (bar_right, grid_y + grid - 1)],
        BLACK.stroke_width(1),
    ))
    .map_err(render_error)?;

    for (label, fraction) in [("1.0", 0.0), ("0.5", 0.25), ("0.0", 0.5), ("-0.5", 0.75), ("-1.0", 1.0)] {
        let y = grid_y + (f64::from(grid) * fraction).round() as i32;
        let tick_x = bar_right + 1;
        root.draw(&PathElement::new(vec![(tick_x, y), (tick_x + 4, y)], BLACK))
            .map_err(render_error)?;
        draw_text(root, (tick_x + 7, y - 4), label, 1, &BLACK, Align::Left)?;
    }

    draw_text(root, (grid_x + grid / 2, 18), HEATMAP_TITLE, 2, &BLACK, Align::Center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(columns: &[&str], values: Vec<Vec<f64>>) -> CorrelationMatrix {
        CorrelationMatrix {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    #[test]
    fn test_coefficient_color_endpoints() {
        assert_eq!(coefficient_color(1.0), POSITIVE);
        assert_eq!(coefficient_color(-1.0), NEGATIVE);
        assert_eq!(coefficient_color(0.0), NEUTRAL);
        assert_eq!(coefficient_color(f64::NAN), UNDEFINED);
    }

    #[test]
    fn test_contrasting_text() {
        assert_eq!(contrasting_text(POSITIVE), WHITE);
        assert_eq!(contrasting_text(NEUTRAL), BLACK);
    }

    #[test]
    fn test_annotation_format() {
        assert_eq!(annotation(1.0), "1.00");
        assert_eq!(annotation(-0.6), "-0.60");
        assert_eq!(annotation(f64::NAN), "nan");
    }

    #[test]
    fn test_render_single_column() {
        let artifact = render_heatmap(&matrix(&["a"], vec![vec![1.0]])).unwrap();
        assert_eq!(artifact.kind, PlotKind::Correlation);
        assert_eq!(artifact.label, "Correlation Matrix");
        assert_eq!(&artifact.png[..4], b"\x89PNG");
    }

    #[test]
    fn test_render_with_nan_cells() {
        let artifact = render_heatmap(&matrix(
            &["a", "constant_column_with_long_name"],
            vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]],
        ))
        .unwrap();
        // Two 96px cells plus label, colour bar and margin space.
        assert_eq!((artifact.width, artifact.height), (440, 380));
    }

    #[test]
    fn test_cells_are_filled_with_coefficient_colour() {
        let artifact = render_heatmap(&matrix(
            &["a", "b"],
            vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
        ))
        .unwrap();
        let image = image::load_from_memory(&artifact.png).unwrap().to_rgb8();
        // Near the corner of the top-left cell, clear of its annotation.
        let x = MARGIN + LABEL_SPACE + 6;
        let y = TITLE_SPACE + 6;
        assert_eq!(image.get_pixel(x, y).0, [POSITIVE.0, POSITIVE.1, POSITIVE.2]);
        assert_eq!(
            image.get_pixel(x + 96, y).0,
            [NEGATIVE.0, NEGATIVE.1, NEGATIVE.2]
        );
    }

    #[test]
    fn test_render_empty_matrix_fails() {
        assert!(render_heatmap(&matrix(&[], vec![])).is_err());
    }
}
