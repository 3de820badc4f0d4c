use imace_core::consts::EXAMPLE_SEARCHES;

use crate::app::ImaceApp;

/// Room kept to the right of the search box for the spinner and Clear.
const TRAILING_WIDTH: f32 = 120.0;

pub fn show(ctx: &egui::Context, app: &mut ImaceApp) {
    egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
        ui.add_space(6.0);
        search_row(ui, app);
        ui.add_space(2.0);
        suggestions(ui, app);
        ui.add_space(4.0);
    });
}

fn search_row(ui: &mut egui::Ui, app: &mut ImaceApp) {
    ui.horizontal(|ui| {
        let width = (ui.available_width() - TRAILING_WIDTH).max(120.0);
        let response = ui.add(
            egui::TextEdit::singleline(&mut app.ui_state.search_input)
                .hint_text("Describe the image you are looking for...")
                .desired_width(width),
        );
        if response.changed() {
            app.ui_state.mark_search_edited();
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            let query = app.ui_state.search_input.clone();
            app.submit_search(&query);
        }

        if app.store.is_searching() {
            ui.spinner();
        }
        let has_query =
            !app.store.search_query().is_empty() || !app.ui_state.search_input.is_empty();
        if ui.add_enabled(has_query, egui::Button::new("Clear")).clicked() {
            app.clear_search();
        }
    });
}

fn suggestions(ui: &mut egui::Ui, app: &mut ImaceApp) {
    ui.horizontal_wrapped(|ui| {
        ui.small("Try:");
        for example in EXAMPLE_SEARCHES {
            if ui.small_button(example).clicked() {
                app.submit_search(example);
            }
        }
    });

    let recent = app.store.recent_searches().to_vec();
    if recent.is_empty() {
        return;
    }
    ui.horizontal_wrapped(|ui| {
        ui.small("Recent:");
        for query in &recent {
            if ui.small_button(query).clicked() {
                app.submit_search(query);
            }
        }
        if ui
            .small_button("x")
            .on_hover_text("Forget recent searches")
            .clicked()
        {
            app.store.clear_recent_searches();
        }
    });
}
