use eframe::egui;

use crate::config::SearchConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HomeSearchApp {
    pub state: AppState,
}

impl HomeSearchApp {
    /// Create the app and start loading the configured dataset.
    pub fn new(config: SearchConfig) -> Self {
        let source = config.source.clone();
        let mut state = AppState::new(config);
        state.start_load(source);
        Self { state }
    }
}

impl eframe::App for HomeSearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: search form ----
        egui::SidePanel::left("search_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::search_panel(ui, &mut self.state);
            });

        // ---- Central panel: results and chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::TopBottomPanel::top("results_panel")
                .resizable(true)
                .default_height(260.0)
                .show_inside(ui, |ui| {
                    table::results_table(ui, &self.state);
                });
            plot::category_chart(ui, &self.state);
        });
    }
}
