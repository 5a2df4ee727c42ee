use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Preview of the first matching rows (top of the central panel).
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(context) = &state.context else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading dataset…  (File → Open… to pick another)");
        });
        return;
    };
    let Some(outcome) = &state.outcome else {
        ui.label("Enter a search to see matching rows.");
        return;
    };

    let rows = context.preview(outcome);
    if rows.is_empty() {
        return;
    }
    let columns = context.table().columns();

    ScrollArea::horizontal().id_salt("results_scroll").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .id_salt("results_table")
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(40.0).clip(true), columns.len())
            .header(20.0, |mut header| {
                for name in columns {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let record = rows[row.index()];
                    for value in record {
                        row.col(|ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}
