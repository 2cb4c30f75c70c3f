use eframe::egui::{Align2, Color32, FontId, Sense, Ui, vec2};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::color;
use crate::data::stats::CorrelationMatrix;

// ---------------------------------------------------------------------------
// Histogram (grouped, shared bin edges)
// ---------------------------------------------------------------------------

/// One named series of raw values for a histogram or scatter.
pub struct Series<'a> {
    pub name: &'a str,
    pub color: Color32,
    pub values: Vec<f64>,
}

/// Overlaid histogram of several series over shared bin edges computed
/// from the combined min/max.
pub fn histogram(ui: &mut Ui, id: &str, series: &[Series<'_>], n_bins: usize, x_label: &str) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for &v in &s.values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        ui.label("No data in the current filter selection.");
        return;
    }
    let span = (max - min).max(f64::EPSILON);
    let width = span / n_bins as f64;

    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("Customers")
        .show(ui, |plot_ui| {
            for s in series {
                let mut counts = vec![0usize; n_bins];
                for &v in &s.values {
                    let bin = (((v - min) / width) as usize).min(n_bins - 1);
                    counts[bin] += 1;
                }
                let bars: Vec<Bar> = counts
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| {
                        Bar::new(min + (i as f64 + 0.5) * width, c as f64)
                            .width(width)
                            .fill(s.color.linear_multiply(0.6))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(s.name).color(s.color));
            }
        });
}

// ---------------------------------------------------------------------------
// Categorical bar chart
// ---------------------------------------------------------------------------

/// Vertical bars over category labels; each bar carries its own color.
pub fn category_bars(ui: &mut Ui, id: &str, bars: &[(String, f64, Color32)], y_label: &str) {
    let labels: Vec<String> = bars.iter().map(|(l, _, _)| l.clone()).collect();
    let chart_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (label, value, color))| {
            Bar::new(i as f64, if value.is_nan() { 0.0 } else { *value })
                .width(0.6)
                .fill(*color)
                .name(label.clone())
        })
        .collect();

    Plot::new(id.to_string())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if (mark.value - i as f64).abs() < 1e-6 && (0..labels.len() as i64).contains(&i) {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show_grid([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars));
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// One point cloud per series, e.g. income vs spend split by loan status.
pub fn scatter(
    ui: &mut Ui,
    id: &str,
    series: &[(String, Color32, Vec<[f64; 2]>)],
    x_label: &str,
    y_label: &str,
) {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for (name, color, points) in series {
                let pts: PlotPoints = points.iter().copied().collect();
                plot_ui.points(
                    Points::new(pts)
                        .name(name)
                        .color(color.linear_multiply(0.7))
                        .radius(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heat grid
// ---------------------------------------------------------------------------

const CELL: [f32; 2] = [56.0, 24.0];

/// Render the correlation matrix as a colored grid: diverging blue/red
/// fill, coefficient printed in each cell, NaN shown as "--" on grey.
pub fn correlation_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let k = matrix.fields.len();

    eframe::egui::Grid::new("correlation_grid")
        .spacing([2.0, 2.0])
        .show(ui, |ui| {
            ui.label("");
            for field in &matrix.fields {
                ui.small(field.name());
            }
            ui.end_row();

            for i in 0..k {
                ui.small(matrix.fields[i].name());
                for j in 0..k {
                    heat_cell(ui, matrix.get(i, j));
                }
                ui.end_row();
            }
        });
}

fn heat_cell(ui: &mut Ui, value: f64) {
    let fill = color::diverging(value);
    let text = if value.is_nan() {
        "--".to_string()
    } else {
        format!("{value:.2}")
    };
    // Dark text on the pale mid-range, light text near the saturated ends.
    let text_color = if value.is_nan() || value.abs() < 0.6 {
        Color32::BLACK
    } else {
        Color32::WHITE
    };

    let (rect, _) = ui.allocate_exact_size(vec2(CELL[0], CELL[1]), Sense::hover());
    ui.painter().rect_filled(rect, 2.0, fill);
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(11.0),
        text_color,
    );
}
