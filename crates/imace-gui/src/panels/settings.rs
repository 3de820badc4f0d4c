use imace_core::deletion::DeleteState;
use imace_core::fetch::FetchOp;
use imace_core::model::format_bytes;
use imace_core::pagination::PageSize;
use imace_core::upload::{UploadItem, UploadStatus};

use crate::app::ImaceApp;
use crate::messages::TextureOrigin;
use crate::panels::helpers;
use crate::states::TextureKey;

const PREVIEW_EDGE: f32 = 40.0;
const DANGER: egui::Color32 = egui::Color32::from_rgb(120, 40, 40);

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    egui::SidePanel::right("settings_panel")
        .default_width(300.0)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                upload_section(ui, ctx, app);
                ui.add_space(8.0);
                library_section(ui, app);
                ui.add_space(8.0);
                danger_section(ui, app);
                ui.add_space(8.0);
                preferences_section(ui, app);
            });
        });
}

fn upload_section(ui: &mut egui::Ui, ctx: &egui::Context, app: &mut ImaceApp) {
    let items = app.store.uploads().items().to_vec();
    let uploading = app.store.is_uploading();
    let pending = app.store.uploads().pending_count();

    let status = (!items.is_empty()).then(|| format!("{} file(s)", items.len()));
    helpers::section_header(ui, "Upload", status.as_deref(), None);

    if ui
        .add_enabled(!uploading, egui::Button::new("Choose images..."))
        .clicked()
    {
        app.pick_upload_files(ctx);
    }
    ui.small("or drop image files onto the window");

    let mut cancelled = None;
    for (index, item) in items.iter().enumerate() {
        if staged_row(ui, app, item) {
            cancelled = Some(index);
        }
    }
    if let Some(index) = cancelled {
        app.store.cancel_staged_file(index);
    }

    ui.horizontal(|ui| {
        let label = format!("Upload {pending}");
        if ui
            .add_enabled(pending > 0 && !uploading, egui::Button::new(label))
            .clicked()
        {
            app.start_upload();
        }
        if ui
            .add_enabled(!items.is_empty() && !uploading, egui::Button::new("Clear"))
            .clicked()
        {
            app.store.clear_staged_files();
        }
        if uploading {
            ui.spinner();
            ui.small("Uploading...");
        }
    });

    if app.store.uploads().has_failures() {
        ui.colored_label(
            egui::Color32::from_rgb(230, 110, 100),
            "Upload failed. Press Upload to try again.",
        );
    }
}

/// Returns `true` when the remove button was clicked.
fn staged_row(ui: &mut egui::Ui, app: &mut ImaceApp, item: &UploadItem) -> bool {
    let key = TextureKey::Preview(item.preview);
    let path = item.file.path.clone();
    let texture = app.texture(key, || TextureOrigin::Local(path));

    let mut remove = false;
    ui.horizontal(|ui| {
        match texture {
            Some(tex) => {
                ui.add(
                    egui::Image::new(&tex)
                        .fit_to_exact_size(egui::vec2(PREVIEW_EDGE, PREVIEW_EDGE))
                        .maintain_aspect_ratio(true),
                );
            }
            None => {
                ui.allocate_exact_size(
                    egui::vec2(PREVIEW_EDGE, PREVIEW_EDGE),
                    egui::Sense::hover(),
                );
            }
        }
        ui.vertical(|ui| {
            ui.add(egui::Label::new(&item.file.name).truncate());
            ui.small(item.status.to_string());
        });
        if matches!(item.status, UploadStatus::Staged | UploadStatus::Failed) {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                remove = ui.small_button("✕").on_hover_text("Remove").clicked();
            });
        }
    });
    remove
}

fn library_section(ui: &mut egui::Ui, app: &mut ImaceApp) {
    helpers::section_header(ui, "Library", None, None);

    match app.store.all_images() {
        Some(images) => ui.label(format!("{} image(s) stored", images.len())),
        None => ui.label("Counting images..."),
    };

    if let Some(error) = app.store.error_for(FetchOp::StorageSize) {
        ui.colored_label(egui::Color32::from_rgb(230, 110, 100), error.to_string());
    } else {
        match app.store.storage_size() {
            Some(bytes) => ui.label(format!("Storage used: {}", format_bytes(bytes))),
            None => ui.label("Storage used: ..."),
        };
    }

    if ui.button("Refresh").clicked() {
        app.retry();
    }
}

fn danger_section(ui: &mut egui::Ui, app: &mut ImaceApp) {
    let state = app.store.delete_state();
    let status = (state != DeleteState::Idle).then(|| state.to_string());
    helpers::section_header(ui, "Danger zone", status.as_deref(), Some(DANGER));

    match state {
        DeleteState::Idle => {
            if ui
                .add_enabled(!app.store.is_uploading(), egui::Button::new("Delete all images"))
                .clicked()
            {
                app.store.request_delete();
            }
        }
        DeleteState::Confirming => {
            ui.label("This permanently removes every stored image.");
            ui.horizontal(|ui| {
                if ui
                    .button(egui::RichText::new("Delete everything").color(egui::Color32::RED))
                    .clicked()
                {
                    app.confirm_delete();
                }
                if ui.button("Cancel").clicked() {
                    app.store.cancel_delete_confirm();
                }
            });
        }
        DeleteState::Deleting => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Deleting...");
            });
        }
    }

    if let Some(error) = app.store.delete_error() {
        ui.colored_label(egui::Color32::from_rgb(230, 110, 100), error.to_string());
    }
}

fn preferences_section(ui: &mut egui::Ui, app: &mut ImaceApp) {
    helpers::section_header(ui, "Preferences", None, None);

    helpers::enum_combo(
        ui,
        "Default page size",
        &mut app.config.default_page_size,
        PageSize::ALL,
    );
    ui.add(
        egui::Slider::new(&mut app.config.search_debounce_ms, 0..=2000)
            .text("Search delay (ms)"),
    );
    ui.checkbox(
        &mut app.config.persist_recent_searches,
        "Remember recent searches",
    );

    ui.add_space(4.0);
    ui.small(format!("Server: {}", app.config.base_url));
    ui.small("Server and thread changes apply after restart.");

    if ui.button("Save preferences").clicked() {
        app.save_config();
    }
}
