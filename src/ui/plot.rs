use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::color::rank_palette;
use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Category histogram (bottom of the central panel)
// ---------------------------------------------------------------------------

/// Horizontal bar chart of the last search's histogram, top rank on top.
pub fn category_chart(ui: &mut Ui, state: &AppState) {
    let (Some(context), Some(outcome)) = (&state.context, &state.outcome) else {
        return;
    };
    let config = context.config();
    let histogram = &outcome.histogram;
    if histogram.is_empty() {
        ui.label("Nothing to chart.");
        return;
    }

    let n = histogram.len();
    let labels: Vec<String> = histogram.iter().map(|c| category_label(&c.category)).collect();

    // Rank 0 gets the highest y position.
    let bars: Vec<Bar> = histogram
        .iter()
        .zip(rank_palette(n))
        .enumerate()
        .map(|(rank, (entry, color))| {
            Bar::new((n - 1 - rank) as f64, entry.count as f64)
                .name(&labels[rank])
                .fill(color)
                .width(0.7)
        })
        .collect();

    let category_title = config.category_label.clone();
    let count_title = config.count_label.clone();
    let chart = BarChart::new(bars)
        .horizontal()
        .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
            format!("{category_title}: {}\n{count_title}: {}", bar.name, bar.value)
        }));

    Plot::new("category_chart")
        .x_axis_label(&config.count_label)
        .y_axis_label(&config.category_label)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .include_x(0.0)
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 || pos as usize >= n {
                return String::new();
            }
            labels[n - 1 - pos as usize].clone()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

/// Axis text for a category; blank cells still need a visible label.
fn category_label(value: &CellValue) -> String {
    if value.is_missing() {
        String::from("(blank)")
    } else {
        value.to_string()
    }
}
