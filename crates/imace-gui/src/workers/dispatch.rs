use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context as _;
use imace_core::api::{HttpBackend, ImageBackend};
use imace_core::config::ClientConfig;
use tracing::info;

use crate::messages::{WorkerCommand, WorkerResult};

use super::{media, requests};

/// Spawn the dispatcher thread and its request pool. Returns the command
/// sender.
pub fn spawn_worker(
    config: &ClientConfig,
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> anyhow::Result<mpsc::Sender<WorkerCommand>> {
    let backend: Arc<dyn ImageBackend> = Arc::new(
        HttpBackend::new(config.base_url.clone()).context("Failed to create HTTP client")?,
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .thread_name(|i| format!("imace-request-{i}"))
        .build()
        .context("Failed to build request pool")?;
    info!(
        base_url = %config.base_url,
        threads = config.worker_threads,
        "Worker pool started"
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("imace-dispatch".into())
        .spawn(move || {
            worker_loop(cmd_rx, result_tx, ctx, backend, pool);
        })
        .context("Failed to spawn worker thread")?;

    Ok(cmd_tx)
}

pub(crate) fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

pub(crate) fn send_log(
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
    msg: impl Into<String>,
) {
    send(
        tx,
        ctx,
        WorkerResult::Log {
            message: msg.into(),
        },
    );
}

pub(crate) fn send_error(
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
    msg: impl Into<String>,
) {
    send(
        tx,
        ctx,
        WorkerResult::Error {
            message: msg.into(),
        },
    );
}

/// Hand every command to the pool. Requests are independent; ordering of
/// their results is resolved by the store, not here.
fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
    backend: Arc<dyn ImageBackend>,
    pool: rayon::ThreadPool,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        let tx = tx.clone();
        let ctx = ctx.clone();
        let backend = Arc::clone(&backend);
        pool.spawn(move || match cmd {
            WorkerCommand::Fetch { key } => {
                requests::handle_fetch(key, backend.as_ref(), &tx, &ctx);
            }
            WorkerCommand::LoadTexture { key, origin } => {
                media::handle_load_texture(key, origin, backend.as_ref(), &tx, &ctx);
            }
            WorkerCommand::Upload { batch } => {
                requests::handle_upload(batch, backend.as_ref(), &tx, &ctx);
            }
            WorkerCommand::DeleteAll => {
                requests::handle_delete_all(backend.as_ref(), &tx, &ctx);
            }
        });
    }
}
