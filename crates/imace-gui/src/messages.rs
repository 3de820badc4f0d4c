use std::path::PathBuf;

use imace_core::error::Result;
use imace_core::fetch::{FetchKey, FetchReply};
use imace_core::model::{ImageRef, ImageSource};
use imace_core::upload::UploadBatch;

use crate::states::TextureKey;

/// Where the pixels for a texture come from.
pub enum TextureOrigin {
    /// A stored image, fetched through `/image/{ref}`.
    Stored(ImageRef),
    /// The `imageData` of a spatial point.
    Source(ImageSource),
    /// A local file staged for upload.
    Local(PathBuf),
}

/// Commands sent from UI thread to worker pool.
pub enum WorkerCommand {
    /// Run one read request issued by the store.
    Fetch { key: FetchKey },

    /// Download (or read) and decode an image for display.
    LoadTexture { key: TextureKey, origin: TextureOrigin },

    /// Send the staged files as one batch.
    Upload { batch: UploadBatch },

    DeleteAll,
}

/// Results sent from workers back to UI thread.
pub enum WorkerResult {
    Fetched {
        key: FetchKey,
        reply: FetchReply,
    },
    Texture {
        key: TextureKey,
        image: egui::ColorImage,
    },
    TextureFailed {
        key: TextureKey,
        message: String,
    },
    UploadDone {
        result: Result<()>,
    },
    DeleteDone {
        result: Result<()>,
    },
    /// Files chosen in the upload dialog.
    FilesPicked {
        paths: Vec<PathBuf>,
    },
    Error {
        message: String,
    },
    Log {
        message: String,
    },
}
