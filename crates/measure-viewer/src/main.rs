#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use measure_viewer::MeasureViewerApp;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    eframe::run_native(
        "Measure Viewer",
        eframe::NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(MeasureViewerApp::new(cc)))),
    )
}
