use std::sync::mpsc;
use std::time::Instant;

use imace_core::api::{perform, ImageBackend};
use imace_core::fetch::FetchKey;
use imace_core::upload::UploadBatch;
use tracing::debug;

use crate::messages::WorkerResult;

use super::{send, send_error, send_log};

pub(super) fn handle_fetch(
    key: FetchKey,
    backend: &dyn ImageBackend,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let start = Instant::now();
    let reply = perform(backend, &key.request);
    debug!(
        op = %key.request.op(),
        epoch = key.epoch,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Fetch finished"
    );
    send(tx, ctx, WorkerResult::Fetched { key, reply });
}

pub(super) fn handle_upload(
    batch: UploadBatch,
    backend: &dyn ImageBackend,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let start = Instant::now();
    let result = backend.upload(&batch);
    match &result {
        Ok(()) => send_log(
            tx,
            ctx,
            format!(
                "Uploaded {} image(s) in {:.1}s",
                batch.len(),
                start.elapsed().as_secs_f32()
            ),
        ),
        Err(e) => send_error(tx, ctx, format!("{e}")),
    }
    send(tx, ctx, WorkerResult::UploadDone { result });
}

pub(super) fn handle_delete_all(
    backend: &dyn ImageBackend,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let result = backend.delete_all();
    match &result {
        Ok(()) => send_log(tx, ctx, "All images deleted"),
        Err(e) => send_error(tx, ctx, format!("{e}")),
    }
    send(tx, ctx, WorkerResult::DeleteDone { result });
}
