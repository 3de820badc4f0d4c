use crate::app::ImaceApp;
use crate::states::Tab;

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    let upload_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::U);
    let reload_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::NONE, egui::Key::F5);
    let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let upload = egui::Button::new("Upload Images...")
                    .shortcut_text(ctx.format_shortcut(&upload_shortcut));
                if ui.add_enabled(!app.store.is_uploading(), upload).clicked() {
                    ui.close();
                    app.pick_upload_files(ctx);
                }

                let reload =
                    egui::Button::new("Reload").shortcut_text(ctx.format_shortcut(&reload_shortcut));
                if ui.add(reload).clicked() {
                    ui.close();
                    app.retry();
                }

                ui.separator();

                let quit =
                    egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut));
                if ui.add(quit).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                for tab in [Tab::Gallery, Tab::Explore] {
                    if ui
                        .selectable_value(&mut app.ui_state.tab, tab, tab.to_string())
                        .clicked()
                    {
                        ui.close();
                    }
                }
                ui.separator();
                ui.checkbox(&mut app.ui_state.show_settings, "Settings Panel");
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.ui_state.show_about = true;
                }
            });

            ui.separator();
            for tab in [Tab::Gallery, Tab::Explore] {
                ui.selectable_value(&mut app.ui_state.tab, tab, tab.to_string());
            }
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&upload_shortcut)) && !app.store.is_uploading() {
            app.pick_upload_files(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&reload_shortcut)) {
            app.retry();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&quit_shortcut)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}
