//! Backend access.
//!
//! [`ImageBackend`] is the seam between the state layer and the transport.
//! [`HttpBackend`] talks to the real service with a blocking client and is
//! meant to run on worker threads.

use reqwest::blocking::{multipart, Client, Response};
use tracing::{debug, info, warn};

use crate::error::{ImaceError, Result};
use crate::fetch::{FetchReply, FetchRequest};
use crate::model::{
    BrowsePage, ImagePointReply, ImageRef, SearchResult, SpatialPoint, StorageSizeReply,
};
use crate::pagination::PageSize;
use crate::upload::UploadBatch;

/// Operations the backend offers.
pub trait ImageBackend: Send + Sync {
    fn paginated_images(&self, page: usize, page_size: PageSize) -> Result<BrowsePage>;

    fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Every stored image path.
    fn all_images(&self) -> Result<Vec<ImageRef>>;

    fn image_points(&self) -> Result<Vec<SpatialPoint>>;

    fn storage_size(&self) -> Result<u64>;

    /// Raw bytes of a stored image.
    fn image_bytes(&self, image: &ImageRef) -> Result<Vec<u8>>;

    /// Raw bytes behind an arbitrary URL (remote spatial point images).
    fn fetch_url(&self, url: &str) -> Result<Vec<u8>>;

    /// Send all files as one request. No partial success: an error fails
    /// the whole batch.
    fn upload(&self, batch: &UploadBatch) -> Result<()>;

    fn delete_all(&self) -> Result<()>;
}

/// Run a read request and wrap the outcome for the store.
pub fn perform(backend: &dyn ImageBackend, request: &FetchRequest) -> FetchReply {
    match request {
        FetchRequest::Browse(key) => {
            FetchReply::Browse(backend.paginated_images(key.page, key.page_size))
        }
        FetchRequest::Search(query) => FetchReply::Search(backend.search(query)),
        FetchRequest::AllImages => FetchReply::AllImages(backend.all_images()),
        FetchRequest::ImagePoints => FetchReply::ImagePoints(backend.image_points()),
        FetchRequest::StorageSize => FetchReply::StorageSize(backend.storage_size()),
    }
}

pub fn paginated_url(base: &str, page: usize, page_size: PageSize) -> String {
    format!(
        "{base}/paginated_images?page={page}&page_size={}",
        page_size.get()
    )
}

pub fn search_url(base: &str, query: &str) -> String {
    format!("{base}/search?query={}", urlencoding::encode(query))
}

pub fn image_url(base: &str, image: &ImageRef) -> String {
    format!("{base}/image/{}", urlencoding::encode(image.as_str()))
}

/// Absolute form of a possibly server-relative URL.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ImaceError::Connection(e.to_string()))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!(url = %url, "GET");
        let response = self.client.get(url).send()?;
        check_status(response)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        Ok(self.get(url)?.json()?)
    }
}

/// Convert `/image_points` elements. A point whose `imageData` cannot be
/// decoded is skipped so the rest of the scene still loads.
fn points_from_replies(replies: Vec<ImagePointReply>) -> Vec<SpatialPoint> {
    let total = replies.len();
    let points: Vec<SpatialPoint> = replies
        .into_iter()
        .filter_map(|reply| {
            let id = reply.id.clone();
            match SpatialPoint::try_from(reply) {
                Ok(point) => Some(point),
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping image point");
                    None
                }
            }
        })
        .collect();
    if points.len() < total {
        info!(kept = points.len(), total, "Image points loaded with skipped entries");
    }
    points
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ImaceError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

impl ImageBackend for HttpBackend {
    fn paginated_images(&self, page: usize, page_size: PageSize) -> Result<BrowsePage> {
        self.get_json(&paginated_url(&self.base_url, page, page_size))
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let results: Vec<SearchResult> = self.get_json(&search_url(&self.base_url, query))?;
        info!(query, hits = results.len(), "Search answered");
        Ok(results)
    }

    fn all_images(&self) -> Result<Vec<ImageRef>> {
        self.get_json(&format!("{}/images", self.base_url))
    }

    fn image_points(&self) -> Result<Vec<SpatialPoint>> {
        let replies: Vec<ImagePointReply> =
            self.get_json(&format!("{}/image_points", self.base_url))?;
        Ok(points_from_replies(replies))
    }

    fn storage_size(&self) -> Result<u64> {
        let reply: StorageSizeReply = self.get_json(&format!("{}/storage_size", self.base_url))?;
        Ok(reply.size_bytes)
    }

    fn image_bytes(&self, image: &ImageRef) -> Result<Vec<u8>> {
        let bytes = self.get(&image_url(&self.base_url, image))?.bytes()?;
        Ok(bytes.to_vec())
    }

    fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self.get(&resolve_url(&self.base_url, url))?.bytes()?;
        Ok(bytes.to_vec())
    }

    fn upload(&self, batch: &UploadBatch) -> Result<()> {
        let mut form = multipart::Form::new();
        for file in &batch.files {
            let mut part = multipart::Part::file(&file.path)
                .map_err(|e| ImaceError::UploadFailure(format!("{}: {e}", file.name)))?
                .file_name(file.name.clone());
            if let Some(mime) = &file.mime {
                part = part
                    .mime_str(mime)
                    .map_err(|e| ImaceError::UploadFailure(e.to_string()))?;
            }
            form = form.part("files", part);
        }

        let url = format!("{}/upload", self.base_url);
        debug!(url = %url, count = batch.len(), "POST");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ImaceError::UploadFailure(e.to_string()))?;
        check_status(response).map_err(|e| ImaceError::UploadFailure(e.to_string()))?;
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let url = format!("{}/delete_all", self.base_url);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .send()
            .map_err(|e| ImaceError::DeleteFailure(e.to_string()))?;
        check_status(response).map_err(|e| ImaceError::DeleteFailure(e.to_string()))?;
        Ok(())
    }
}
