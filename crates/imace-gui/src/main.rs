mod app;
mod convert;
mod messages;
mod panels;
mod states;
mod workers;

use imace_core::config::ClientConfig;
use imace_core::recent::RecentSearches;
use tracing::warn;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config_path = ClientConfig::default_path();
    let config = ClientConfig::load_or_default(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        ClientConfig::default()
    });
    let recent = load_recent_searches(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0])
            .with_drag_and_drop(true)
            .with_title("Imace"),
        ..Default::default()
    };

    eframe::run_native(
        "Imace",
        options,
        Box::new(move |cc| {
            let app = app::ImaceApp::new(&cc.egui_ctx, config, config_path, recent)?;
            Ok(Box::new(app))
        }),
    )
}

fn load_recent_searches(config: &ClientConfig) -> RecentSearches {
    if !config.persist_recent_searches {
        return RecentSearches::new();
    }
    let Some(path) = RecentSearches::default_path() else {
        return RecentSearches::new();
    };
    RecentSearches::load(path).unwrap_or_else(|e| {
        warn!(error = %e, "Recent searches could not be read; starting empty");
        RecentSearches::new()
    })
}
