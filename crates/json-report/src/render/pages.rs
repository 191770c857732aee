//! Page renderers.
//!
//! Each function draws one complete page onto the root [`PageArea`] of a
//! page. Axis labels that plotters cannot place on categorical positions
//! are drawn directly on the root area using backend coordinates.

use super::backend::text_width;
use super::document::PageArea;
use super::palette::{annotation_color, coolwarm, viridis_palette};
use crate::error::Result;
use crate::profiler::statistics::{
    CategoryCount, CorrelationMatrix, box_stats, gaussian_kde, half_span, histogram,
};
use crate::utils::truncate_str;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};

/// Message drawn when no column could be charted.
pub const FALLBACK_MESSAGE: &str = "Unable to generate plots for the provided dataset.";

const FONT: &str = "sans-serif";
const KDE_POINTS: usize = 200;
const LABEL_SIZE: f64 = 10.0;
const MAX_LABEL_CHARS: usize = 28;
/// Divisor for x values whose axis width would not fit in an `f64`.
const WIDE_AXIS_DIVISOR: f64 = 10.0;

const BAR_BLUE: RGBColor = RGBColor(76, 114, 176);
const LINE_BLUE: RGBColor = RGBColor(40, 70, 130);
const BOX_FILL: RGBColor = RGBColor(161, 201, 244);
const EDGE_GREY: RGBColor = RGBColor(60, 60, 60);

fn text_style(size: f64, bold: bool, h_pos: HPos, v_pos: VPos) -> TextStyle<'static> {
    let font = (FONT, size).into_font();
    let font = if bold { font.style(FontStyle::Bold) } else { font };
    TextStyle::from(font).pos(Pos::new(h_pos, v_pos))
}

fn heading_style() -> TextStyle<'static> {
    text_style(16.0, true, HPos::Center, VPos::Top)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Divisor that keeps the width of a `low..high` axis finite.
fn axis_divisor(low: f64, high: f64) -> f64 {
    if half_span(low, high) < f64::MAX / 8.0 {
        1.0
    } else {
        WIDE_AXIS_DIVISOR
    }
}

/// Axis description, noting when values were divided down to fit.
fn axis_description(column: &str, divisor: f64) -> String {
    if divisor == 1.0 {
        column.to_string()
    } else {
        format!("{column} (values / {divisor})")
    }
}

/// `min..max` with 5% padding on each side, clamped to finite values.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let half = half_span(min, max);
    let pad = if half > 0.0 {
        half * 0.1
    } else if max + 0.5 > max {
        0.5
    } else {
        max.abs() * 1e-9
    };
    ((min - pad).max(f64::MIN), (max + pad).min(f64::MAX))
}

/// Size of a label area wide enough for `labels` at the axis font size.
fn label_area_size(labels: &[String], padding: f64) -> i32 {
    let widest = labels
        .iter()
        .map(|label| text_width(label, LABEL_SIZE, false))
        .fold(0.0, f64::max);
    (widest + padding).clamp(30.0, 220.0).ceil() as i32
}

// ============================================================================
// Title page
// ============================================================================

/// Content of the title page.
#[derive(Debug, Clone)]
pub struct TitleSummary<'a> {
    pub title: &'a str,
    pub generated_at: &'a str,
    pub source_file: &'a str,
    pub rows: usize,
    pub columns: usize,
}

impl TitleSummary<'_> {
    /// Page lines, top to bottom; empty strings are spacers.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.title.to_string(),
            String::new(),
            format!("Generated: {}", self.generated_at),
            format!("Source file: {}", self.source_file),
            String::new(),
            "Dataset summary:".to_string(),
            format!("Rows: {}", self.rows),
            format!("Columns: {}", self.columns),
        ]
    }
}

/// Centred title and dataset overview.
pub fn draw_title_page(area: &PageArea<'_>, summary: &TitleSummary<'_>) -> Result<()> {
    let (width, height) = area.dim_in_pixel();
    let lines = summary.lines();
    let center_x = width as i32 / 2;
    let line_height = 24;
    // the block is centred as a whole, blank lines included
    let top = height as i32 / 2 - (lines.len() as i32 - 1) * line_height / 2;

    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let style = if index == 0 {
            text_style(22.0, true, HPos::Center, VPos::Center)
        } else {
            text_style(13.0, false, HPos::Center, VPos::Center)
        };
        area.draw_text(line, &style, (center_x, top + index as i32 * line_height))?;
    }
    Ok(())
}

// ============================================================================
// Numeric column page
// ============================================================================

/// Histogram with density overlay beside a horizontal boxplot.
///
/// `values` must be the column's non-null values and must not be empty.
pub fn draw_numeric_page(area: &PageArea<'_>, column: &str, values: &[f64]) -> Result<()> {
    let body = area.titled(
        &format!("Numeric distribution for '{column}'"),
        heading_style(),
    )?;
    let panels = body.split_evenly((1, 2));
    draw_histogram(&panels[0], column, values)?;
    draw_boxplot(&panels[1], column, values)?;
    Ok(())
}

fn draw_histogram(area: &PageArea<'_>, column: &str, values: &[f64]) -> Result<()> {
    let hist = histogram(values);
    let (low, high) = hist.span();
    let (min, max) = min_max(values);
    let divisor = axis_divisor(low, high);

    // density scaled so its area matches the bar area
    let scale = values.len() as f64 * hist.bin_width();
    let curve: Option<Vec<(f64, f64)>> = gaussian_kde(values, min, max, KDE_POINTS)
        .map(|points| {
            points
                .into_iter()
                .map(|(x, d)| (x / divisor, d * scale))
                .collect()
        });

    let peak = curve
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(hist.max_count() as f64, f64::max);
    let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption("Histogram", (FONT, 14))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((low / divisor)..(high / divisor), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(axis_description(column, divisor))
        .y_desc("Frequency")
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, 11))
        .draw()?;

    chart.draw_series(hist.bins().map(|(start, end, count)| {
        Rectangle::new(
            [(start / divisor, 0.0), (end / divisor, count as f64)],
            BAR_BLUE.filled(),
        )
    }))?;
    chart.draw_series(hist.bins().map(|(start, end, count)| {
        Rectangle::new(
            [(start / divisor, 0.0), (end / divisor, count as f64)],
            WHITE.stroke_width(1),
        )
    }))?;

    if let Some(curve) = curve {
        chart.draw_series(LineSeries::new(curve, LINE_BLUE.stroke_width(2)))?;
    }
    Ok(())
}

fn draw_boxplot(area: &PageArea<'_>, column: &str, values: &[f64]) -> Result<()> {
    let Some(stats) = box_stats(values) else {
        return Ok(());
    };
    let (min, max) = min_max(values);
    let divisor = axis_divisor(min, max);
    let x = |value: f64| value / divisor;
    let (axis_low, axis_high) = padded_range(x(min), x(max));

    let mut chart = ChartBuilder::on(area)
        .caption("Boxplot", (FONT, 14))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(10)
        .build_cartesian_2d(axis_low..axis_high, 0f64..1f64)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_desc(axis_description(column, divisor))
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, 11))
        .draw()?;

    let (box_low, box_high) = (0.3, 0.7);
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x(stats.q1), box_low), (x(stats.q3), box_high)],
        BOX_FILL.filled(),
    )))?;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x(stats.q1), box_low), (x(stats.q3), box_high)],
        EDGE_GREY.stroke_width(1),
    )))?;
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x(stats.median), box_low), (x(stats.median), box_high)],
        EDGE_GREY.stroke_width(2),
    )))?;

    let whiskers = vec![
        vec![(x(stats.whisker_low), 0.5), (x(stats.q1), 0.5)],
        vec![(x(stats.q3), 0.5), (x(stats.whisker_high), 0.5)],
        vec![(x(stats.whisker_low), 0.4), (x(stats.whisker_low), 0.6)],
        vec![(x(stats.whisker_high), 0.4), (x(stats.whisker_high), 0.6)],
    ];
    chart.draw_series(
        whiskers
            .into_iter()
            .map(|points| PathElement::new(points, EDGE_GREY.stroke_width(1))),
    )?;
    chart.draw_series(
        stats
            .fliers
            .iter()
            .map(|value| Circle::new((x(*value), 0.5), 3, EDGE_GREY.stroke_width(1))),
    )?;
    Ok(())
}

// ============================================================================
// Categorical column page
// ============================================================================

/// Horizontal bar chart of the most frequent values, most frequent on top.
pub fn draw_categorical_page(
    area: &PageArea<'_>,
    column: &str,
    categories: &[CategoryCount],
) -> Result<()> {
    if categories.is_empty() {
        return Ok(());
    }
    let slots = categories.len();
    let labels: Vec<String> = categories
        .iter()
        .map(|category| truncate_str(&category.value, MAX_LABEL_CHARS))
        .collect();
    let max_count = categories
        .iter()
        .map(|category| category.count)
        .max()
        .unwrap_or(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Top categories for '{column}'"), heading_style())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(label_area_size(&labels, 30.0))
        .build_cartesian_2d(0f64..max_count * 1.12, -0.5f64..(slots as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_desc("Count")
        .y_desc(column)
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, 11))
        .draw()?;

    // rank 0 sits in the top slot
    let slot_of = |rank: usize| (slots - 1 - rank) as f64;
    let palette = viridis_palette(slots);

    chart.draw_series(categories.iter().enumerate().map(|(rank, category)| {
        let y = slot_of(rank);
        Rectangle::new(
            [(0.0, y - 0.4), (category.count as f64, y + 0.4)],
            palette[rank].filled(),
        )
    }))?;

    let count_style = text_style(LABEL_SIZE, false, HPos::Left, VPos::Center);
    let offset = max_count * 0.01;
    chart.draw_series(categories.iter().enumerate().map(|(rank, category)| {
        Text::new(
            category.count.to_string(),
            (category.count as f64 + offset, slot_of(rank)),
            count_style.clone(),
        )
    }))?;

    let label_style = text_style(LABEL_SIZE, false, HPos::Right, VPos::Center);
    for (rank, label) in labels.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, slot_of(rank)));
        area.draw_text(label, &label_style, (x - 6, y))?;
    }
    Ok(())
}

// ============================================================================
// Correlation page
// ============================================================================

/// Annotated correlation heatmap with a colour bar on a fixed [-1, 1] scale.
pub fn draw_correlation_page(area: &PageArea<'_>, matrix: &CorrelationMatrix) -> Result<()> {
    let size = matrix.size();
    if size == 0 {
        return Ok(());
    }
    let n = size as f64;
    let labels: Vec<String> = matrix
        .columns
        .iter()
        .map(|name| truncate_str(name, MAX_LABEL_CHARS))
        .collect();
    let label_area = label_area_size(&labels, 16.0);

    let body = area.titled("Correlation heatmap", heading_style())?;
    let (width, _) = body.dim_in_pixel();
    let (grid_area, bar_area) = body.split_horizontally(width as i32 - 90);

    let mut chart = ChartBuilder::on(&grid_area)
        .margin(20)
        .x_label_area_size(label_area)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0f64..n, 0f64..n)?;

    // row 0 is drawn at the top
    let row_y = |row: usize| n - 1.0 - row as f64;
    let annotation_size = (12.0 - n * 0.4).max(5.0);

    for (row, coefficients) in matrix.values.iter().enumerate() {
        let y = row_y(row);
        for (col, value) in coefficients.iter().enumerate() {
            let x = col as f64;
            if !value.is_finite() {
                continue;
            }
            let fill = coolwarm(*value);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + 1.0, y + 1.0)],
                fill.filled(),
            )))?;
            let annotation_fill = annotation_color(fill);
            let style = text_style(annotation_size, false, HPos::Center, VPos::Center)
                .color(&annotation_fill);
            chart.draw_series(std::iter::once(Text::new(
                format!("{value:.2}"),
                (x + 0.5, y + 0.5),
                style,
            )))?;
        }
    }

    let row_style = text_style(LABEL_SIZE, false, HPos::Right, VPos::Center);
    let column_style =
        text_style(LABEL_SIZE, false, HPos::Right, VPos::Center).transform(FontTransform::Rotate270);
    for (index, label) in labels.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, row_y(index) + 0.5));
        area.draw_text(label, &row_style, (x - 6, y))?;

        let (x, y) = chart.backend_coord(&(index as f64 + 0.5, 0.0));
        area.draw_text(label, &column_style, (x, y + 6))?;
    }

    draw_color_bar(area, &bar_area, label_area)
}

fn draw_color_bar(root: &PageArea<'_>, bar_area: &PageArea<'_>, bottom: i32) -> Result<()> {
    const STRIPS: usize = 100;

    let mut bar = ChartBuilder::on(bar_area)
        .margin_top(20)
        .margin_bottom(20 + bottom)
        .margin_left(10)
        .margin_right(50)
        .build_cartesian_2d(0f64..1f64, -1f64..1f64)?;

    let step = 2.0 / STRIPS as f64;
    bar.draw_series((0..STRIPS).map(|strip| {
        let low = -1.0 + strip as f64 * step;
        Rectangle::new(
            [(0.0, low), (1.0, low + step)],
            coolwarm(low + step / 2.0).filled(),
        )
    }))?;
    bar.draw_series(std::iter::once(Rectangle::new(
        [(0.0, -1.0), (1.0, 1.0)],
        EDGE_GREY.stroke_width(1),
    )))?;

    let tick_style = text_style(LABEL_SIZE, false, HPos::Left, VPos::Center);
    for tick in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        let (x, y) = bar.backend_coord(&(1.0, tick));
        root.draw_text(&format!("{tick:.1}"), &tick_style, (x + 4, y))?;
    }
    Ok(())
}

// ============================================================================
// Fallback page
// ============================================================================

/// Single centred message for datasets with nothing to chart.
pub fn draw_fallback_page(area: &PageArea<'_>) -> Result<()> {
    let (width, height) = area.dim_in_pixel();
    let style = text_style(14.0, false, HPos::Center, VPos::Center);
    area.draw_text(
        FALLBACK_MESSAGE,
        &style,
        (width as i32 / 2, height as i32 / 2),
    )?;
    Ok(())
}
