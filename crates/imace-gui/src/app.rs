use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use imace_core::config::ClientConfig;
use imace_core::fetch::FetchKey;
use imace_core::model::ImageRef;
use imace_core::recent::RecentSearches;
use imace_core::store::ImageStore;
use imace_core::upload::CandidateFile;
use tracing::{debug, info, warn};

use crate::messages::{TextureOrigin, WorkerCommand, WorkerResult};
use crate::panels;
use crate::states::{Tab, TextureCache, TextureKey, UIState};
use crate::workers;

/// Extensions offered by the upload dialog.
const UPLOAD_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

/// Upper bound on the frame step fed to the scene animation.
const MAX_ANIMATION_STEP: f32 = 0.1;

pub struct ImaceApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_tx: mpsc::Sender<WorkerResult>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub store: ImageStore,
    pub config: ClientConfig,
    pub config_path: Option<PathBuf>,
    pub ui_state: UIState,
    pub textures: TextureCache,
    /// Point set the cached point textures belong to.
    points_generation: u64,
}

impl ImaceApp {
    pub fn new(
        ctx: &egui::Context,
        config: ClientConfig,
        config_path: Option<PathBuf>,
        recent: RecentSearches,
    ) -> anyhow::Result<Self> {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = workers::spawn_worker(&config, result_tx.clone(), ctx.clone())?;

        let mut ui_state = UIState::default();
        ui_state.add_log(format!("Connecting to {}", config.base_url));

        let store = ImageStore::from_config(&config, recent);
        Ok(Self {
            points_generation: store.spatial().generation(),
            cmd_tx,
            result_tx,
            result_rx,
            store,
            textures: TextureCache::new(config.thumbnail_cache_limit),
            config,
            config_path,
            ui_state,
        })
    }

    /// Drain all pending results from the workers.
    fn poll_results(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::Fetched { key, reply } => {
                    if let Some(e) = reply.error() {
                        let hint = if e.is_connection() {
                            format!(" (is the server running at {}?)", self.config.base_url)
                        } else {
                            String::new()
                        };
                        self.ui_state
                            .add_log(format!("ERROR: {} failed: {e}{hint}", key.request.op()));
                    }
                    self.store.apply(&key, reply);
                    self.sync_point_textures();
                }
                WorkerResult::Texture { key, image } => {
                    self.textures.insert(ctx, key, image);
                }
                WorkerResult::TextureFailed { key, message } => {
                    debug!(texture = %key.name(), %message, "Texture unavailable");
                    self.textures.mark_failed(key);
                }
                WorkerResult::UploadDone { result } => {
                    let keys = self.store.finish_upload(result);
                    self.dispatch(keys);
                }
                WorkerResult::DeleteDone { result } => {
                    let deleted = result.is_ok();
                    let keys = self.store.finish_delete(result);
                    if deleted {
                        self.textures.clear();
                        self.ui_state.set_search_now("");
                    }
                    self.dispatch(keys);
                }
                WorkerResult::FilesPicked { paths } => {
                    self.stage_files(paths);
                }
                WorkerResult::Error { message } => {
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
                WorkerResult::Log { message } => {
                    self.ui_state.add_log(message);
                }
            }
        }
    }

    /// Point ids are reused across re-fetches; drop sprites of older sets.
    fn sync_point_textures(&mut self) {
        let generation = self.store.spatial().generation();
        if generation != self.points_generation {
            self.textures.retain_points(generation);
            self.points_generation = generation;
        }
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn dispatch(&self, keys: Vec<FetchKey>) {
        for key in keys {
            self.send_command(WorkerCommand::Fetch { key });
        }
    }

    /// Texture for `key` if decoded; otherwise starts the load once and
    /// returns `None`.
    pub fn texture(
        &mut self,
        key: TextureKey,
        origin: impl FnOnce() -> TextureOrigin,
    ) -> Option<egui::TextureHandle> {
        if let Some(handle) = self.textures.get(&key) {
            return Some(handle);
        }
        if self.textures.claim(&key) {
            self.send_command(WorkerCommand::LoadTexture {
                key,
                origin: origin(),
            });
        }
        None
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// Search immediately, bypassing the typing debounce.
    pub fn submit_search(&mut self, query: &str) {
        let query = self.ui_state.set_search_now(query);
        self.store.set_search_query(&query);
    }

    pub fn clear_search(&mut self) {
        self.ui_state.set_search_now("");
        self.store.clear_search();
    }

    pub fn change_page(&mut self, page: usize) {
        if self.store.change_page(page) {
            self.ui_state.scroll_to_top = true;
        }
    }

    pub fn open_detail(&mut self, image: ImageRef) {
        self.store.open_detail(image);
    }

    pub fn retry(&mut self) {
        self.ui_state.add_log("Reloading...".into());
        self.textures.clear();
        let keys = self.store.retry();
        self.dispatch(keys);
    }

    pub fn pick_upload_files(&self, ctx: &egui::Context) {
        let result_tx = self.result_tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            if let Some(paths) = rfd::FileDialog::new()
                .add_filter("Images", &UPLOAD_EXTENSIONS)
                .add_filter("All files", &["*"])
                .pick_files()
            {
                let _ = result_tx.send(WorkerResult::FilesPicked { paths });
                ctx.request_repaint();
            }
        });
    }

    pub fn stage_files(&mut self, paths: Vec<PathBuf>) {
        let offered = paths.len();
        let files = paths.into_iter().map(CandidateFile::from_path).collect();
        match self.store.set_selected_files(files) {
            Ok(kept) if kept < offered => self.ui_state.add_log(format!(
                "Staged {kept} of {offered} file(s); non-images skipped"
            )),
            Ok(kept) => self.ui_state.add_log(format!("Staged {kept} file(s)")),
            Err(e) => self.ui_state.add_log(format!("ERROR: {e}")),
        }
    }

    pub fn start_upload(&mut self) {
        if let Some(batch) = self.store.begin_upload() {
            self.ui_state
                .add_log(format!("Uploading {} image(s)...", batch.len()));
            self.send_command(WorkerCommand::Upload { batch });
        }
    }

    pub fn confirm_delete(&mut self) {
        if self.store.confirm_delete() {
            self.ui_state.add_log("Deleting all images...".into());
            self.send_command(WorkerCommand::DeleteAll);
        }
    }

    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.ui_state
                .add_log("ERROR: No config directory on this system".into());
            return;
        };
        match self.config.save(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Config saved");
                self.ui_state
                    .add_log(format!("Preferences saved to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "Config save failed");
                self.ui_state.add_log(format!("ERROR: {e}"));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-frame housekeeping
    // -----------------------------------------------------------------------

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let paths: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !paths.is_empty() {
            self.stage_files(paths);
        }
    }

    /// Push the typed query to the store once the debounce has passed.
    fn sync_search(&mut self, ctx: &egui::Context) {
        let debounce = Duration::from_millis(self.config.search_debounce_ms);
        if let Some(query) = self.ui_state.take_settled_search(debounce) {
            self.store.set_search_query(&query);
        } else if let Some(wait) = self.ui_state.search_settles_in(debounce) {
            ctx.request_repaint_after(wait);
        }
    }

    fn issue_requests(&mut self) {
        let mut keys = self.store.poll_requests();
        keys.extend(self.store.request_search());
        self.dispatch(keys);
    }

    fn animate(&mut self, ctx: &egui::Context) {
        if self.ui_state.tab != Tab::Explore {
            return;
        }
        let dt = ctx.input(|i| i.stable_dt).min(MAX_ANIMATION_STEP);
        self.store.spatial_mut().tick(dt);
        if self.store.spatial().is_auto_rotating() {
            ctx.request_repaint();
        }
    }
}

impl eframe::App for ImaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        self.poll_results(ctx);
        self.handle_dropped_files(ctx);
        self.sync_search(ctx);
        self.issue_requests();
        self.animate(ctx);

        panels::menu_bar::show(ctx, self);
        panels::search_bar::show(ctx, self);
        panels::status::show(ctx, self);
        if self.ui_state.show_settings {
            panels::settings::show(ctx, self);
        }
        match self.ui_state.tab {
            Tab::Gallery => panels::gallery::show(ctx, self),
            Tab::Explore => panels::spatial::show(ctx, self),
        }
        panels::detail::show(ctx, self);

        // About dialog
        if self.ui_state.show_about {
            egui::Window::new("About Imace")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Imace");
                        ui.label("Semantic image search client");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.ui_state.show_about = false;
                        }
                    });
                });
        }
    }
}
