mod state;
mod ui;

use eframe::egui;
use state::AppState;
use std::path::PathBuf;
use treeheat_core::TreemapConfig;

struct TreeHeatApp {
    state: AppState,
}

impl TreeHeatApp {
    fn new(cc: &eframe::CreationContext<'_>, dataset: Option<PathBuf>) -> Self {
        let config: TreemapConfig = cc
            .storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();
        let mut state = AppState::new(config);
        if let Some(path) = dataset {
            state.open_dataset(&path);
        }
        Self { state }
    }
}

impl eframe::App for TreeHeatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state.config);
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let dataset = std::env::args_os().nth(1).map(PathBuf::from);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "TreeHeat",
        options,
        Box::new(|cc| Ok(Box::new(TreeHeatApp::new(cc, dataset)))),
    )
}
