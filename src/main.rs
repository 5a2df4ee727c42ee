mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

use std::path::Path;

use app::HomeSearchApp;
use config::SearchConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Usage: home-search [CONFIG.json]
    let config = match std::env::args_os().nth(1) {
        Some(path) => match SearchConfig::from_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e:#}");
                eprintln!("error: {e:#}");
                std::process::exit(2);
            }
        },
        None => SearchConfig::homes(),
    };
    log::info!(
        "Searching '{}' on column '{}', charting '{}'",
        config.source,
        config.search_column,
        config.category_column
    );

    let title = config.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(HomeSearchApp::new(config)))),
    )
}
