use eframe::egui::{self, Color32, Key, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – search form
// ---------------------------------------------------------------------------

/// Render the search form and the result summary.
pub fn search_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.config.title);
    ui.separator();

    ui.label(&state.config.search_label);
    let response = ui.add(
        egui::TextEdit::singleline(&mut state.query)
            .desired_width(f32::INFINITY)
            .hint_text("e.g. Main St"),
    );
    let entered = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

    let ready = state.context.is_some();
    let clicked = ui
        .add_enabled(ready, egui::Button::new("Search"))
        .clicked();
    if ready && (clicked || entered) {
        state.submit_search();
    }

    ui.add_space(8.0);

    if state.loading() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Loading dataset…");
        });
    } else if let Some(summary) = state.summary() {
        ui.label(RichText::new(summary).color(Color32::from_rgb(60, 160, 90)));
    }

    if let Some(msg) = &state.status_message {
        ui.add_space(4.0);
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ctx) = &state.context {
            ui.label(format!(
                "{} rows loaded from {}",
                crate::pipeline::format_count(ctx.table().len()),
                ctx.config().source
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.start_load(path.to_string_lossy().into_owned());
    }
}
