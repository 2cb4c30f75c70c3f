mod app;
mod color;
mod data;
mod state;
mod ui;

use app::LoanLensApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Loan Lens – Customer Analytics",
        options,
        Box::new(|_cc| {
            let mut app = LoanLensApp::default();
            // Optional dataset path on the command line; otherwise the user
            // opens one via File → Open.
            if let Some(path) = std::env::args().nth(1) {
                ui::panels::load_dataset(&mut app.state, std::path::Path::new(&path));
            }
            Ok(Box::new(app))
        }),
    )
}
