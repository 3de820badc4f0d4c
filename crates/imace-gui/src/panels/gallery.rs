use imace_core::model::DisplayEntry;
use imace_core::pagination::{PageSize, PagerItem, PaginationState};
use imace_core::view::{GalleryStatus, GalleryView};

use crate::app::ImaceApp;
use crate::messages::TextureOrigin;
use crate::panels::helpers;
use crate::states::TextureKey;

/// Edge of one grid cell, caption excluded.
const CELL: f32 = 180.0;

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    let view = app.store.gallery_view();

    egui::CentralPanel::default().show(ctx, |ui| {
        header(ui, app, &view);
        ui.separator();

        match &view.status {
            GalleryStatus::Loading => helpers::loading(ui, "Loading images..."),
            GalleryStatus::Empty => helpers::placeholder(
                ui,
                "No images yet. Drop files here or use File > Upload Images...",
            ),
            GalleryStatus::Failed(message) => {
                if helpers::error_panel(ui, "Could not reach the image server", message) {
                    app.retry();
                }
            }
            GalleryStatus::Ready => {
                if view.show_pager {
                    let pagination = *app.store.pagination();
                    pager(ui, app, &pagination);
                    ui.add_space(4.0);
                }
                grid(ui, app, &view.entries);
            }
        }
    });
}

fn header(ui: &mut egui::Ui, app: &mut ImaceApp, view: &GalleryView) {
    ui.horizontal(|ui| {
        ui.heading(view.heading());
        if view.status == GalleryStatus::Ready {
            let noun = if view.total_count == 1 { "image" } else { "images" };
            ui.label(format!("{} {noun}", view.total_count));
        }

        if !view.is_search() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut size = app.store.pagination().page_size();
                if helpers::enum_combo(ui, "Page size", &mut size, PageSize::ALL) {
                    app.store.change_page_size(size);
                    app.ui_state.scroll_to_top = true;
                }
            });
        }
    });
}

fn grid(ui: &mut egui::Ui, app: &mut ImaceApp, entries: &[DisplayEntry]) {
    let mut scroll = egui::ScrollArea::vertical().auto_shrink([false, false]);
    if std::mem::take(&mut app.ui_state.scroll_to_top) {
        scroll = scroll.vertical_scroll_offset(0.0);
    }

    let mut opened = None;
    scroll.show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for entry in entries {
                if cell(ui, app, entry) {
                    opened = Some(entry.image_ref().clone());
                }
            }
        });
    });

    if let Some(image_ref) = opened {
        app.open_detail(image_ref);
    }
}

/// One thumbnail with its caption. Returns `true` when clicked.
fn cell(ui: &mut egui::Ui, app: &mut ImaceApp, entry: &DisplayEntry) -> bool {
    let image_ref = entry.image_ref().clone();
    let key = TextureKey::Thumbnail(image_ref.clone());
    let failed = app.textures.is_failed(&key);
    let texture = app.texture(key, || TextureOrigin::Stored(image_ref.clone()));

    let mut clicked = false;
    ui.allocate_ui(egui::vec2(CELL, CELL + 48.0), |ui| {
        ui.vertical(|ui| {
            let response = match &texture {
                Some(tex) => ui.add(
                    egui::Image::new(tex)
                        .fit_to_exact_size(egui::vec2(CELL, CELL))
                        .maintain_aspect_ratio(true)
                        .sense(egui::Sense::click()),
                ),
                None => {
                    let (rect, response) =
                        ui.allocate_exact_size(egui::vec2(CELL, CELL), egui::Sense::click());
                    ui.painter()
                        .rect_filled(rect, 4.0, egui::Color32::from_gray(40));
                    if failed {
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "unavailable",
                            egui::FontId::proportional(12.0),
                            egui::Color32::from_gray(140),
                        );
                    } else {
                        ui.put(
                            egui::Rect::from_center_size(rect.center(), egui::vec2(24.0, 24.0)),
                            egui::Spinner::new(),
                        );
                    }
                    response
                }
            };
            clicked = response.on_hover_text(image_ref.as_str()).clicked();

            ui.add(egui::Label::new(egui::RichText::new(image_ref.file_name()).small()).truncate());
            let similarity = (entry.similarity_fraction(), entry.similarity_label());
            if let (Some(fill), Some(label)) = similarity {
                ui.add(
                    egui::ProgressBar::new(fill)
                        .desired_width(CELL)
                        .desired_height(6.0),
                );
                ui.small(label);
            }
        });
    });
    clicked
}

fn pager(ui: &mut egui::Ui, app: &mut ImaceApp, pagination: &PaginationState) {
    let mut target = None;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(pagination.has_previous(), egui::Button::new("< Prev"))
            .clicked()
        {
            target = Some(pagination.page() - 1);
        }

        for item in pagination.window() {
            match item {
                PagerItem::Page(n) => {
                    if ui
                        .selectable_label(n == pagination.page(), n.to_string())
                        .clicked()
                        && n != pagination.page()
                    {
                        target = Some(n);
                    }
                }
                PagerItem::Ellipsis => {
                    ui.label("…");
                }
            }
        }

        if ui
            .add_enabled(pagination.has_next(), egui::Button::new("Next >"))
            .clicked()
        {
            target = Some(pagination.page() + 1);
        }

        ui.separator();
        let first = pagination.offset() + 1;
        let last = (pagination.offset() + pagination.page_size().get()).min(pagination.total());
        ui.small(format!(
            "Showing {first}-{last} of {}",
            pagination.total()
        ));
    });

    if let Some(page) = target {
        app.change_page(page);
    }
}
