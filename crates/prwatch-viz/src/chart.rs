use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use prwatch_core::{MergedTable, PrError, PrResult, DATE_FORMAT};
use prwatch_ts::{BudgetCurve, ChartSummary, GhiBand};
use tracing::info;

use crate::font::TextTolerantBackend;

pub const DEFAULT_SIZE: (u32, u32) = (1600, 900);

const HEADER_HEIGHT: i32 = 90;
const SIDE_PANEL_WIDTH: i32 = 340;
const Y_MAX: f64 = 105.0;
/// PR level at which the budget comparison line is written.
const COMPARISON_TEXT_Y: f64 = 35.0;

const MOVING_AVERAGE_COLOR: RGBColor = RGBColor(0xFF, 0x44, 0x44);
const BUDGET_COLOR: RGBColor = RGBColor(0x2D, 0x50, 0x16);

pub fn band_color(band: GhiBand) -> RGBColor {
    match band {
        GhiBand::Below2 => RGBColor(0x00, 0x00, 0x8B),
        GhiBand::From2To4 => RGBColor(0x41, 0x69, 0xE1),
        GhiBand::From4To6 => RGBColor(0xFF, 0xA5, 0x00),
        GhiBand::Above6 => RGBColor(0x8B, 0x45, 0x13),
        GhiBand::Missing => RGBColor(0x80, 0x80, 0x80),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    /// SVG for a `.svg` extension, PNG otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ChartKind::Svg,
            _ => ChartKind::Png,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub size: (u32, u32),
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self { size: DEFAULT_SIZE }
    }
}

/// Draw the PR chart for `table` into `path`.
///
/// `summary` must have been computed from the same table. An empty table
/// produces an empty frame with the statistics box showing `NaN`.
pub fn render_chart(
    table: &MergedTable,
    summary: &ChartSummary,
    curve: Option<&BudgetCurve>,
    path: &Path,
    options: &ChartOptions,
) -> PrResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let drawn = match ChartKind::from_path(path) {
        ChartKind::Png => {
            let backend = BitMapBackend::new(path, options.size);
            let root = TextTolerantBackend::new(backend).into_drawing_area();
            draw_chart(root, table, summary, curve)
        }
        ChartKind::Svg => {
            let backend = SVGBackend::new(path, options.size);
            let root = TextTolerantBackend::new(backend).into_drawing_area();
            draw_chart(root, table, summary, curve)
        }
    };
    drawn.map_err(|err| PrError::Render(format!("{}: {err:#}", path.display())))?;

    info!("Graph saved to {}", path.display());
    Ok(())
}

fn chart_title(summary: &ChartSummary) -> String {
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!(
            "Performance Ratio Evolution from {} to {}",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        ),
        _ => "Performance Ratio Evolution (no data)".to_string(),
    }
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    table: &MergedTable,
    summary: &ChartSummary,
    curve: Option<&BudgetCurve>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (left, side_area) = root.split_horizontally(width as i32 - SIDE_PANEL_WIDTH);
    let (header, plot_area) = left.split_vertically(HEADER_HEIGHT);

    draw_header(&header, &chart_title(summary))?;

    let origin: NaiveDate = summary.first_date.unwrap_or_default();
    let span = summary
        .last_date
        .map(|last| (last - origin).num_days() as f64)
        .unwrap_or(0.0)
        .max(1.0);
    let offset = |date: NaiveDate| (date - origin).num_days() as f64;
    let date_label = |v: &f64| match origin.checked_add_signed(Duration::days(v.round() as i64)) {
        Some(date) => date.format("%b/%y").to_string(),
        None => String::new(),
    };

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(-1.0..span + 1.0, 0.0..Y_MAX)?;

    chart
        .configure_mesh()
        .x_labels(10)
        .x_label_formatter(&date_label)
        .y_desc("Performance Ratio [%]")
        .label_style(FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal))
        .draw()?;

    for band in GhiBand::ALL {
        let color = band_color(band);
        let points: Vec<(f64, f64)> = table
            .iter()
            .zip(summary.bands.iter())
            .filter(|(_, b)| **b == band)
            .filter_map(|(record, _)| record.pr.map(|pr| (offset(record.date), pr)))
            .collect();
        if points.is_empty() {
            continue;
        }
        chart.draw_series(
            points
                .into_iter()
                .map(|point| Circle::new(point, 3, color.mix(0.7).filled())),
        )?;
    }

    let average_points: Vec<(f64, f64)> = table
        .iter()
        .zip(summary.moving_average.iter())
        .filter_map(|(record, avg)| avg.map(|v| (offset(record.date), v)))
        .collect();
    if !average_points.is_empty() {
        chart
            .draw_series(LineSeries::new(
                average_points,
                MOVING_AVERAGE_COLOR.stroke_width(3),
            ))?
            .label(format!(
                "{}-d moving average of PR",
                summary.moving_average_window
            ))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], MOVING_AVERAGE_COLOR.stroke_width(3))
            });
    }

    if let (Some(curve), Some(last)) = (curve, summary.last_date) {
        let budget_points: Vec<(f64, f64)> = table
            .iter()
            .zip(summary.budget.iter())
            .map(|(record, budget)| (offset(record.date), *budget))
            .collect();
        chart
            .draw_series(LineSeries::new(budget_points, BUDGET_COLOR.stroke_width(3)))?
            .label(curve.legend_label(last))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], BUDGET_COLOR.stroke_width(3))
            });
    }

    if !table.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.4))
            .label_font(FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal))
            .position(SeriesLabelPosition::LowerLeft)
            .draw()?;
    }

    let centered = FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(std::iter::once(Text::new(
        summary.comparison_line(),
        (span / 2.0, COMPARISON_TEXT_Y),
        centered,
    )))?;

    draw_statistics_panel(&side_area, summary)?;

    root.present()?;
    Ok(())
}

/// Title plus the irradiation color key.
fn draw_header<DB>(header: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (width, _) = header.dim_in_pixel();
    let title_style = FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    header.draw(&Text::new(title, (width as i32 / 2, 12), title_style))?;

    let key_font = FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal).color(&BLACK);
    let y = 55;
    let mut x = 80;
    header.draw(&Text::new(
        "Daily Irradiation [kWh/m2]:",
        (x, y),
        key_font.clone(),
    ))?;
    x += 210;
    for band in GhiBand::ALL {
        header.draw(&Rectangle::new(
            [(x, y), (x + 14, y + 14)],
            band_color(band).filled(),
        ))?;
        header.draw(&Text::new(band.label(), (x + 20, y), key_font.clone()))?;
        x += 100;
    }
    Ok(())
}

fn draw_statistics_panel<DB>(panel: &DrawingArea<DB, Shift>, summary: &ChartSummary) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let lines = summary.average_lines();
    let (width, height) = panel.dim_in_pixel();
    let line_height = 24;
    let block = line_height * lines.len() as i32;
    let top = (height as i32 - block) / 2;

    panel.draw(&Rectangle::new(
        [(10, top - 14), (width as i32 - 15, top + block + 6)],
        BLACK.stroke_width(1),
    ))?;
    let font = FontDesc::new(FontFamily::Monospace, 14.0, FontStyle::Normal).color(&BLACK);
    for (idx, line) in lines.iter().enumerate() {
        panel.draw(&Text::new(
            line.as_str(),
            (22, top + idx as i32 * line_height),
            font.clone(),
        ))?;
    }
    Ok(())
}
