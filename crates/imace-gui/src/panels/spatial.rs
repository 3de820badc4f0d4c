use imace_core::fetch::FetchOp;
use imace_core::model::PointId;
use imace_core::spatial::{label_for, OrbitCamera};

use crate::app::ImaceApp;
use crate::messages::{TextureOrigin, WorkerCommand};
use crate::panels::helpers;
use crate::states::TextureKey;

/// Sprite edge in scene units before perspective.
const BASE_SPRITE: f32 = 1.6;
/// Radians of orbit per dragged pixel.
const DRAG_SPEED: f32 = 0.01;
const ZOOM_SPEED: f32 = 0.002;

struct Sprite {
    id: PointId,
    rect: egui::Rect,
    texture: Option<egui::TextureHandle>,
}

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        controls(ui, app);
        ui.separator();

        if let Some(error) = app.store.error_for(FetchOp::ImagePoints).map(str::to_string) {
            if helpers::error_panel(ui, "Could not load the image map", &error) {
                app.retry();
            }
            return;
        }
        if !app.store.points_loaded() {
            helpers::loading(ui, "Placing images...");
            return;
        }
        if app.store.spatial().is_empty() {
            helpers::placeholder(ui, "Upload some images to explore them in 3D");
            return;
        }

        canvas(ctx, ui, app);
    });
}

fn controls(ui: &mut egui::Ui, app: &mut ImaceApp) {
    ui.horizontal(|ui| {
        ui.heading("Explore");
        let count = app.store.spatial().entities().len();
        if count > 0 {
            ui.label(format!("{count} images"));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Reset view").clicked() {
                app.store.spatial_mut().camera = OrbitCamera::default();
            }
            let mut auto_rotate = app.store.spatial().auto_rotate_enabled();
            if ui.checkbox(&mut auto_rotate, "Auto-rotate").changed() {
                app.store.spatial_mut().set_auto_rotate(auto_rotate);
            }
        });
    });
}

fn canvas(ctx: &egui::Context, ui: &mut egui::Ui, app: &mut ImaceApp) {
    let rect = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(18));

    handle_orbit(ui, &response, app);

    let sprites = layout_sprites(app, rect);

    // Nearest sprite under the pointer wins; sprites are ordered far to near.
    let hovered = response.hover_pos().and_then(|pos| {
        sprites
            .iter()
            .rev()
            .find(|s| s.rect.contains(pos))
            .map(|s| s.id.clone())
    });
    app.store.spatial_mut().set_hovered(hovered.clone());
    if hovered.is_some() {
        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let painter = ui.painter_at(rect);
    for sprite in &sprites {
        draw_sprite(&painter, sprite);
    }

    if let Some(id) = &hovered {
        if let Some(sprite) = sprites.iter().find(|s| &s.id == id) {
            painter.rect_stroke(
                sprite.rect,
                2.0,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(120, 180, 255)),
                egui::StrokeKind::Outside,
            );
            if let Some(point) = app.store.spatial().entity(id) {
                let label = label_for(point, app.store.all_images());
                painter.text(
                    sprite.rect.center_top() - egui::vec2(0.0, 6.0),
                    egui::Align2::CENTER_BOTTOM,
                    label,
                    egui::FontId::proportional(13.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }

    if response.clicked() {
        if let Some(id) = hovered {
            app.store.click_point(&id);
        }
    }
}

fn handle_orbit(ui: &egui::Ui, response: &egui::Response, app: &mut ImaceApp) {
    if response.dragged_by(egui::PointerButton::Primary) {
        let delta = response.drag_delta();
        app.store
            .spatial_mut()
            .camera
            .drag(delta.x * DRAG_SPEED, delta.y * DRAG_SPEED);
    }

    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
    if scroll != 0.0 && response.hovered() {
        app.store
            .spatial_mut()
            .camera
            .zoom((-scroll * ZOOM_SPEED).exp());
    }
}

/// Screen rectangles for every visible point, far to near. Starts texture
/// loads for points seen for the first time.
fn layout_sprites(app: &mut ImaceApp, rect: egui::Rect) -> Vec<Sprite> {
    let placed: Vec<(PointId, egui::Pos2, f32)> = {
        let spatial = app.store.spatial();
        spatial
            .projected([rect.width(), rect.height()])
            .into_iter()
            .map(|(point, proj)| {
                let center = rect.min + egui::vec2(proj.x, proj.y);
                let edge = BASE_SPRITE * proj.scale * spatial.scale_for(&point.id);
                (point.id.clone(), center, edge)
            })
            .collect()
    };

    placed
        .into_iter()
        .map(|(id, center, edge)| {
            let texture = point_texture(app, &id);
            let size = match &texture {
                Some(tex) => {
                    let [w, h] = tex.size();
                    let aspect = w as f32 / h.max(1) as f32;
                    if aspect >= 1.0 {
                        egui::vec2(edge, edge / aspect)
                    } else {
                        egui::vec2(edge * aspect, edge)
                    }
                }
                None => egui::vec2(edge, edge),
            };
            Sprite {
                rect: egui::Rect::from_center_size(center, size),
                id,
                texture,
            }
        })
        .collect()
}

fn point_texture(app: &mut ImaceApp, id: &PointId) -> Option<egui::TextureHandle> {
    let key = TextureKey::Point {
        generation: app.store.spatial().generation(),
        id: id.clone(),
    };
    if let Some(handle) = app.textures.get(&key) {
        return Some(handle);
    }
    if app.textures.claim(&key) {
        if let Some(point) = app.store.spatial().entity(id) {
            let origin = TextureOrigin::Source(point.image.clone());
            app.send_command(WorkerCommand::LoadTexture { key, origin });
        }
    }
    None
}

fn draw_sprite(painter: &egui::Painter, sprite: &Sprite) {
    match &sprite.texture {
        Some(tex) => {
            painter.image(
                tex.id(),
                sprite.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(sprite.rect, 2.0, egui::Color32::from_gray(60));
        }
    }
}
