use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ImaceError, Result};

/// A file offered for upload, before mime filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub name: String,
    /// `None` when the type could not be determined.
    pub mime: Option<String>,
}

impl CandidateFile {
    /// Describe a file on disk, guessing its mime type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime = image::ImageFormat::from_path(path)
            .ok()
            .map(|f| f.to_mime_type().to_string());
        Self {
            path: path.to_path_buf(),
            name,
            mime,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime
            .as_deref()
            .is_some_and(|m| m.starts_with("image/"))
    }
}

/// Locally generated handle the UI uses to find a staged file's preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl PreviewId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
    Staged,
    Uploading,
    Done,
    Cancelled,
    Failed,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => write!(f, "Staged"),
            Self::Uploading => write!(f, "Uploading"),
            Self::Done => write!(f, "Done"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadItem {
    pub file: CandidateFile,
    pub preview: PreviewId,
    pub status: UploadStatus,
}

/// Files handed to the transport for one upload request.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadBatch {
    pub files: Vec<CandidateFile>,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Staged files and their upload lifecycle. At most one batch is in
/// flight at a time.
#[derive(Debug, Default)]
pub struct UploadQueue {
    items: Vec<UploadItem>,
    next_preview: u64,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_uploading(&self) -> bool {
        self.items.iter().any(|i| i.status == UploadStatus::Uploading)
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|i| i.status == UploadStatus::Failed)
    }

    /// Items `begin_upload` would send.
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|i| is_sendable(i.status)).count()
    }

    /// Replace the staged set with the image files among `files`.
    ///
    /// Returns the number of files kept.
    pub fn stage(&mut self, files: Vec<CandidateFile>) -> Result<usize> {
        if self.is_uploading() {
            return Err(ImaceError::UploadInProgress);
        }
        let offered = files.len();
        self.items.clear();
        for file in files.into_iter().filter(CandidateFile::is_image) {
            let preview = PreviewId(self.next_preview);
            self.next_preview += 1;
            self.items.push(UploadItem {
                file,
                preview,
                status: UploadStatus::Staged,
            });
        }
        if self.items.len() < offered {
            debug!(
                offered,
                kept = self.items.len(),
                "Non-image files dropped from selection"
            );
        }
        Ok(self.items.len())
    }

    /// Pull one item out before it is sent. Items already in flight stay.
    pub fn remove_staged(&mut self, index: usize) -> Option<UploadItem> {
        let removable = self
            .items
            .get(index)
            .is_some_and(|i| is_sendable(i.status));
        if !removable {
            return None;
        }
        let mut item = self.items.remove(index);
        item.status = UploadStatus::Cancelled;
        Some(item)
    }

    pub fn clear_staged(&mut self) {
        if self.is_uploading() {
            return;
        }
        self.items.clear();
    }

    /// Move every staged or failed item to `Uploading` as one batch.
    ///
    /// `None` while a batch is already in flight or nothing is pending.
    pub fn begin_upload(&mut self) -> Option<UploadBatch> {
        if self.is_uploading() {
            warn!("Upload requested while a batch is in flight; ignored");
            return None;
        }
        let mut files = Vec::new();
        for item in self.items.iter_mut().filter(|i| is_sendable(i.status)) {
            item.status = UploadStatus::Uploading;
            files.push(item.file.clone());
        }
        let batch = UploadBatch { files };
        if batch.is_empty() {
            return None;
        }
        info!(count = batch.len(), "Upload batch started");
        Some(batch)
    }

    /// Settle the in-flight batch. Success empties the queue; failure keeps
    /// the items (as `Failed`) for retry or removal.
    pub fn finish_upload(&mut self, result: &Result<()>) {
        match result {
            Ok(()) => {
                let mut done = 0;
                for item in self
                    .items
                    .iter_mut()
                    .filter(|i| i.status == UploadStatus::Uploading)
                {
                    item.status = UploadStatus::Done;
                    done += 1;
                }
                info!(count = done, "Upload batch complete");
                self.items.retain(|i| i.status != UploadStatus::Done);
            }
            Err(e) => {
                for item in self
                    .items
                    .iter_mut()
                    .filter(|i| i.status == UploadStatus::Uploading)
                {
                    item.status = UploadStatus::Failed;
                }
                warn!(error = %e, "Upload batch failed");
            }
        }
    }
}

fn is_sendable(status: UploadStatus) -> bool {
    matches!(status, UploadStatus::Staged | UploadStatus::Failed)
}
