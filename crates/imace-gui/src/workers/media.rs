use std::sync::mpsc;

use imace_core::api::ImageBackend;
use imace_core::error::{ImaceError, Result};
use imace_core::model::ImageSource;
use tracing::debug;

use crate::convert::decode_scaled;
use crate::messages::{TextureOrigin, WorkerResult};
use crate::states::TextureKey;

use super::send;

pub(super) fn handle_load_texture(
    key: TextureKey,
    origin: TextureOrigin,
    backend: &dyn ImageBackend,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let decoded = load_bytes(origin, backend).and_then(|bytes| {
        decode_scaled(&bytes, key.max_edge()).map_err(ImaceError::from)
    });
    match decoded {
        Ok(image) => send(tx, ctx, WorkerResult::Texture { key, image }),
        Err(e) => {
            debug!(texture = %key.name(), error = %e, "Texture load failed");
            send(
                tx,
                ctx,
                WorkerResult::TextureFailed {
                    key,
                    message: e.to_string(),
                },
            );
        }
    }
}

fn load_bytes(origin: TextureOrigin, backend: &dyn ImageBackend) -> Result<Vec<u8>> {
    match origin {
        TextureOrigin::Stored(image) => backend.image_bytes(&image),
        TextureOrigin::Source(ImageSource::Inline(bytes)) => Ok(bytes.to_vec()),
        TextureOrigin::Source(ImageSource::Remote(url)) => backend.fetch_url(&url),
        TextureOrigin::Local(path) => Ok(std::fs::read(path)?),
    }
}
