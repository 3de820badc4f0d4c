use imace_core::view::Detail;

use crate::app::ImaceApp;
use crate::messages::TextureOrigin;
use crate::states::TextureKey;

/// Largest size of the image inside the detail window.
const MAX_VIEW: egui::Vec2 = egui::vec2(900.0, 640.0);

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    let Some(detail) = app.store.detail() else {
        return;
    };
    let (key, origin) = match &detail {
        Detail::Image(entry) => {
            let image_ref = entry.image_ref().clone();
            (
                TextureKey::Full(image_ref.clone()),
                TextureOrigin::Stored(image_ref),
            )
        }
        // Same texture as the point's sprite.
        Detail::Point {
            id,
            generation,
            image,
            ..
        } => (
            TextureKey::Point {
                generation: *generation,
                id: id.clone(),
            },
            TextureOrigin::Source(image.clone()),
        ),
    };
    let failed = app.textures.is_failed(&key);
    let texture = app.texture(key, || origin);

    let mut open = true;
    egui::Window::new(detail.title())
        .id(egui::Id::new("image_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            match texture {
                Some(tex) => {
                    ui.add(
                        egui::Image::new(&tex)
                            .max_size(MAX_VIEW)
                            .maintain_aspect_ratio(true),
                    );
                }
                None if failed => {
                    ui.label(
                        egui::RichText::new("Image could not be loaded")
                            .color(egui::Color32::from_rgb(230, 110, 100)),
                    );
                }
                None => {
                    ui.allocate_ui(egui::vec2(320.0, 240.0), |ui| {
                        ui.centered_and_justified(|ui| ui.spinner());
                    });
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                match detail.image_ref() {
                    Some(image_ref) => ui.label(image_ref.as_str()),
                    None => ui.label(detail.title()),
                };
                if let Some(label) = detail.similarity_label() {
                    ui.separator();
                    ui.strong(label);
                }
            });
        });

    let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
    if !open || escape {
        app.store.close_detail();
    }
}
