use crate::app::ImaceApp;

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area, fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            ui.label(format!("Mode: {}", app.store.mode()));
            ui.separator();
            if app.store.is_idle() {
                ui.label("Idle");
            } else {
                ui.spinner();
                ui.label(format!("{} request(s)", app.store.fetches_in_flight()));
            }
            ui.separator();
            ui.label(format!("Server: {}", app.config.base_url));
            ui.separator();
            ui.label(format!("Textures: {}", app.textures.len()));
        });

        ui.add_space(2.0);
    });
}
