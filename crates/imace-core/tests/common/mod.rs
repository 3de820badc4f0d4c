#![allow(dead_code)]

use std::sync::Mutex;

use imace_core::api::{perform, ImageBackend};
use imace_core::error::{ImaceError, Result};
use imace_core::fetch::FetchKey;
use imace_core::model::{BrowsePage, ImageRef, ImageSource, PointId, SearchResult, SpatialPoint};
use imace_core::pagination::PageSize;
use imace_core::store::ImageStore;
use imace_core::upload::{CandidateFile, UploadBatch};

/// Paths `img_0.jpg .. img_{n-1}.jpg`.
pub fn image_refs(n: usize) -> Vec<ImageRef> {
    (0..n).map(|i| ImageRef::new(format!("img_{i}.jpg"))).collect()
}

pub fn hits(entries: &[(&str, f32)]) -> Vec<SearchResult> {
    entries
        .iter()
        .map(|(path, score)| SearchResult::new(*path, *score))
        .collect()
}

pub fn browse_page(images: Vec<ImageRef>, total: usize) -> BrowsePage {
    BrowsePage { images, total }
}

pub fn point(id: &str, position: [f32; 3], path: Option<&str>) -> SpatialPoint {
    SpatialPoint {
        id: PointId::new(id),
        position,
        image_ref: path.map(ImageRef::new),
        image: ImageSource::Remote(format!("/thumb/{id}.png")),
    }
}

pub fn candidate(name: &str) -> CandidateFile {
    CandidateFile::from_path(format!("/tmp/uploads/{name}"))
}

pub fn offline() -> ImaceError {
    ImaceError::Connection("connection refused".into())
}

/// In-memory backend with a mutable corpus.
pub struct FakeBackend {
    pub images: Mutex<Vec<ImageRef>>,
    pub search_hits: Mutex<Vec<SearchResult>>,
    pub points: Mutex<Vec<SpatialPoint>>,
    pub fail_reads: Mutex<bool>,
    pub fail_upload: Mutex<bool>,
    pub uploads: Mutex<Vec<usize>>,
}

impl FakeBackend {
    pub fn with_images(n: usize) -> Self {
        Self {
            images: Mutex::new(image_refs(n)),
            search_hits: Mutex::new(Vec::new()),
            points: Mutex::new(Vec::new()),
            fail_reads: Mutex::new(false),
            fail_upload: Mutex::new(false),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.fail_reads.lock().unwrap() {
            Err(offline())
        } else {
            Ok(())
        }
    }
}

impl ImageBackend for FakeBackend {
    fn paginated_images(&self, page: usize, page_size: PageSize) -> Result<BrowsePage> {
        self.check()?;
        let images = self.images.lock().unwrap();
        let start = (page - 1) * page_size.get();
        let slice = images
            .iter()
            .skip(start)
            .take(page_size.get())
            .cloned()
            .collect();
        Ok(browse_page(slice, images.len()))
    }

    fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        self.check()?;
        Ok(self.search_hits.lock().unwrap().clone())
    }

    fn all_images(&self) -> Result<Vec<ImageRef>> {
        self.check()?;
        Ok(self.images.lock().unwrap().clone())
    }

    fn image_points(&self) -> Result<Vec<SpatialPoint>> {
        self.check()?;
        Ok(self.points.lock().unwrap().clone())
    }

    fn storage_size(&self) -> Result<u64> {
        self.check()?;
        Ok(self.images.lock().unwrap().len() as u64 * 1024)
    }

    fn image_bytes(&self, _image: &ImageRef) -> Result<Vec<u8>> {
        self.check()?;
        Ok(Vec::new())
    }

    fn fetch_url(&self, _url: &str) -> Result<Vec<u8>> {
        self.check()?;
        Ok(Vec::new())
    }

    fn upload(&self, batch: &UploadBatch) -> Result<()> {
        if *self.fail_upload.lock().unwrap() {
            return Err(ImaceError::UploadFailure("500".into()));
        }
        self.uploads.lock().unwrap().push(batch.len());
        let mut images = self.images.lock().unwrap();
        for file in &batch.files {
            images.push(ImageRef::new(file.name.clone()));
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.check()?;
        self.images.lock().unwrap().clear();
        self.points.lock().unwrap().clear();
        Ok(())
    }
}

/// Execute `keys` against `backend` and feed every reply back, following
/// up on whatever the store asks for next, until nothing is outstanding.
pub fn settle(store: &mut ImageStore, backend: &dyn ImageBackend, keys: Vec<FetchKey>) {
    let mut pending = keys;
    loop {
        pending.extend(store.poll_requests());
        pending.extend(store.request_search());
        if pending.is_empty() {
            break;
        }
        for key in std::mem::take(&mut pending) {
            let reply = perform(backend, &key.request);
            store.apply(&key, reply);
        }
    }
}
