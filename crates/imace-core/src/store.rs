//! Session-wide state coordinator.
//!
//! `ImageStore` is the single source of truth for the query, search
//! results, browse pagination, the image listing, spatial points, and the
//! upload/delete lifecycles. It never performs I/O itself: operations that
//! need the network hand back [`FetchKey`]s (or an [`UploadBatch`]) for the
//! caller to execute, and the results come back through the `apply_*` /
//! `finish_*` operations, which drop anything whose key is no longer current.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::deletion::{DeleteState, DeletionGuard};
use crate::error::Result;
use crate::fetch::{Applied, BrowseKey, FetchKey, FetchOp, FetchReply, FetchRequest, InFlight};
use crate::model::{BrowsePage, ImageRef, PointId, SearchResult, SpatialPoint};
use crate::pagination::{PageSize, PaginationState};
use crate::recent::RecentSearches;
use crate::spatial::{label_for, SpatialMap};
use crate::upload::{CandidateFile, UploadBatch, UploadItem, UploadQueue};
use crate::view::{resolve_detail, Detail, GalleryView, Mode};

/// What the open detail view was opened on.
#[derive(Debug)]
enum DetailTarget {
    Stored(ImageRef),
    /// Snapshot, so the view survives the points being re-fetched.
    Point { point: SpatialPoint, generation: u64 },
}

#[derive(Debug)]
pub struct ImageStore {
    query: String,
    search_results: Vec<SearchResult>,
    /// Query whose response (success or failure) is currently applied.
    answered_query: Option<String>,

    pagination: PaginationState,
    browse_page: Option<(BrowseKey, BrowsePage)>,

    all_images: Option<Vec<ImageRef>>,
    storage_size: Option<u64>,
    points_loaded: bool,
    spatial: SpatialMap,

    uploads: UploadQueue,
    deletion: DeletionGuard,

    epoch: u64,
    in_flight: InFlight,
    /// Last failure per operation. Blocks automatic refetch until `retry`.
    errors: HashMap<FetchOp, String>,

    detail: Option<DetailTarget>,
    recent: RecentSearches,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageStore {
    /// Fresh session: empty query, page 1, default page size, nothing
    /// staged, delete guard idle, recent searches kept in memory only.
    pub fn new() -> Self {
        Self::with_options(PageSize::default(), RecentSearches::new())
    }

    pub fn from_config(config: &ClientConfig, recent: RecentSearches) -> Self {
        Self::with_options(config.default_page_size, recent)
    }

    fn with_options(page_size: PageSize, recent: RecentSearches) -> Self {
        Self {
            query: String::new(),
            search_results: Vec::new(),
            answered_query: None,
            pagination: PaginationState::new(page_size),
            browse_page: None,
            all_images: None,
            storage_size: None,
            points_loaded: false,
            spatial: SpatialMap::new(),
            uploads: UploadQueue::new(),
            deletion: DeletionGuard::new(),
            epoch: 0,
            in_flight: InFlight::default(),
            errors: HashMap::new(),
            detail: None,
            recent,
        }
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    /// The query is non-empty and its answer has not been applied yet.
    pub fn is_search_pending(&self) -> bool {
        !self.query.is_empty() && self.answered_query.as_deref() != Some(self.query.as_str())
    }

    /// A request for the current query is on the wire.
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
            && self.in_flight.contains(&FetchKey {
                request: FetchRequest::Search(self.query.clone()),
                epoch: self.epoch,
            })
    }

    pub fn mode(&self) -> Mode {
        Mode::derive(
            &self.query,
            self.search_results.len(),
            self.is_search_pending(),
        )
    }

    /// Replace the query. Setting the same value again changes nothing and
    /// returns `false`. A blank query clears the search.
    pub fn set_search_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query == self.query {
            return false;
        }
        if query.is_empty() {
            self.clear_search();
            return true;
        }
        debug!(query, "Search query set");
        self.query = query.to_string();
        self.errors.remove(&FetchOp::Search);
        true
    }

    /// Issue the search for the current query, unless it is empty, already
    /// answered, or already on the wire.
    pub fn request_search(&mut self) -> Option<FetchKey> {
        if !self.is_search_pending() {
            return None;
        }
        self.in_flight
            .begin(FetchRequest::Search(self.query.clone()), self.epoch)
    }

    /// Apply the results for the current query.
    pub fn set_search_results(&mut self, results: Vec<SearchResult>) {
        info!(query = %self.query, hits = results.len(), "Search results applied");
        self.search_results = results;
        self.answered_query = (!self.query.is_empty()).then(|| self.query.clone());
        self.errors.remove(&FetchOp::Search);
        if !self.query.is_empty() {
            self.remember_query();
        }
    }

    pub fn apply_search(&mut self, key: &FetchKey, result: Result<Vec<SearchResult>>) -> Applied {
        self.in_flight.finish(key);
        let FetchRequest::Search(query) = &key.request else {
            return Applied::Stale;
        };
        if key.epoch != self.epoch || *query != self.query {
            debug!(query = %query, current = %self.query, "Stale search response dropped");
            return Applied::Stale;
        }
        match result {
            Ok(results) => self.set_search_results(results),
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                self.search_results.clear();
                self.answered_query = Some(query.clone());
                self.errors.insert(FetchOp::Search, e.to_string());
            }
        }
        Applied::Applied
    }

    /// Drop query and results; back to browsing from page 1.
    pub fn clear_search(&mut self) {
        debug!("Search cleared");
        self.query.clear();
        self.search_results.clear();
        self.answered_query = None;
        self.errors.remove(&FetchOp::Search);
        self.pagination.reset();
    }

    pub fn recent_searches(&self) -> &[String] {
        self.recent.entries()
    }

    pub fn clear_recent_searches(&mut self) {
        self.recent.clear();
        if let Err(e) = self.recent.save() {
            warn!(error = %e, "Could not save recent searches");
        }
    }

    fn remember_query(&mut self) {
        if self.recent.record(&self.query) {
            if let Err(e) = self.recent.save() {
                warn!(error = %e, "Could not save recent searches");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Browse
    // -----------------------------------------------------------------------

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Key of the page the gallery should show; `None` in search mode.
    pub fn browse_key(&self) -> Option<BrowseKey> {
        match self.mode() {
            Mode::Search => None,
            Mode::Browse => Some(BrowseKey {
                page: self.pagination.page(),
                page_size: self.pagination.page_size(),
            }),
        }
    }

    /// The browse page, if one has been received for the current key.
    pub fn browse_page(&self) -> Option<&BrowsePage> {
        let key = self.browse_key()?;
        self.browse_page
            .as_ref()
            .filter(|(k, _)| *k == key)
            .map(|(_, page)| page)
    }

    pub fn begin_browse_fetch(&mut self) -> Option<FetchKey> {
        let key = self.browse_key()?;
        if self.errors.contains_key(&FetchOp::Browse) {
            return None;
        }
        if self.browse_page.as_ref().is_some_and(|(k, _)| *k == key) {
            return None;
        }
        self.in_flight.begin(FetchRequest::Browse(key), self.epoch)
    }

    pub fn apply_browse_page(&mut self, key: &FetchKey, result: Result<BrowsePage>) -> Applied {
        self.in_flight.finish(key);
        let FetchRequest::Browse(browse_key) = &key.request else {
            return Applied::Stale;
        };
        if key.epoch != self.epoch || self.browse_key() != Some(*browse_key) {
            debug!(page = browse_key.page, "Stale browse response dropped");
            return Applied::Stale;
        }
        match result {
            Ok(page) => {
                debug!(
                    page = browse_key.page,
                    images = page.images.len(),
                    total = page.total,
                    "Browse page applied"
                );
                self.pagination.set_total(page.total);
                self.browse_page = Some((*browse_key, page));
                self.errors.remove(&FetchOp::Browse);
            }
            Err(e) => {
                warn!(page = browse_key.page, error = %e, "Browse fetch failed");
                self.errors.insert(FetchOp::Browse, e.to_string());
            }
        }
        Applied::Applied
    }

    /// Returns `true` when the page moved and the view should scroll to top.
    pub fn change_page(&mut self, page: usize) -> bool {
        if self.mode() == Mode::Search {
            return false;
        }
        self.pagination.change_page(page)
    }

    pub fn change_page_size(&mut self, size: PageSize) {
        if size != self.pagination.page_size() {
            debug!(size = size.get(), "Page size changed");
        }
        self.pagination.change_page_size(size);
    }

    // -----------------------------------------------------------------------
    // Listing, spatial points, storage
    // -----------------------------------------------------------------------

    pub fn all_images(&self) -> Option<&[ImageRef]> {
        self.all_images.as_deref()
    }

    pub fn storage_size(&self) -> Option<u64> {
        self.storage_size
    }

    pub fn spatial(&self) -> &SpatialMap {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut SpatialMap {
        &mut self.spatial
    }

    pub fn points_loaded(&self) -> bool {
        self.points_loaded
    }

    /// `None` while the same refresh is already on the wire.
    pub fn fetch_all_images(&mut self) -> Option<FetchKey> {
        self.in_flight.begin(FetchRequest::AllImages, self.epoch)
    }

    pub fn fetch_image_points(&mut self) -> Option<FetchKey> {
        self.in_flight.begin(FetchRequest::ImagePoints, self.epoch)
    }

    pub fn fetch_storage_size(&mut self) -> Option<FetchKey> {
        self.in_flight.begin(FetchRequest::StorageSize, self.epoch)
    }

    pub fn apply_all_images(&mut self, key: &FetchKey, result: Result<Vec<ImageRef>>) -> Applied {
        if !self.settle(key) {
            return Applied::Stale;
        }
        match result {
            Ok(images) => {
                debug!(count = images.len(), "Image listing applied");
                self.all_images = Some(images);
                self.errors.remove(&FetchOp::AllImages);
            }
            Err(e) => self.record_error(FetchOp::AllImages, e.to_string()),
        }
        Applied::Applied
    }

    pub fn apply_image_points(
        &mut self,
        key: &FetchKey,
        result: Result<Vec<SpatialPoint>>,
    ) -> Applied {
        if !self.settle(key) {
            return Applied::Stale;
        }
        match result {
            Ok(points) => {
                self.spatial.replace_points(points);
                self.points_loaded = true;
                self.errors.remove(&FetchOp::ImagePoints);
            }
            Err(e) => self.record_error(FetchOp::ImagePoints, e.to_string()),
        }
        Applied::Applied
    }

    pub fn apply_storage_size(&mut self, key: &FetchKey, result: Result<u64>) -> Applied {
        if !self.settle(key) {
            return Applied::Stale;
        }
        match result {
            Ok(size) => {
                self.storage_size = Some(size);
                self.errors.remove(&FetchOp::StorageSize);
            }
            Err(e) => self.record_error(FetchOp::StorageSize, e.to_string()),
        }
        Applied::Applied
    }

    /// Route a transport reply to the matching `apply_*` operation.
    pub fn apply(&mut self, key: &FetchKey, reply: FetchReply) -> Applied {
        match reply {
            FetchReply::Browse(r) => self.apply_browse_page(key, r),
            FetchReply::Search(r) => self.apply_search(key, r),
            FetchReply::AllImages(r) => self.apply_all_images(key, r),
            FetchReply::ImagePoints(r) => self.apply_image_points(key, r),
            FetchReply::StorageSize(r) => self.apply_storage_size(key, r),
        }
    }

    /// Every fetch the current state is missing that is neither in flight
    /// nor blocked by an unacknowledged error.
    pub fn poll_requests(&mut self) -> Vec<FetchKey> {
        let mut keys = Vec::new();
        keys.extend(self.begin_browse_fetch());
        if self.all_images.is_none() && !self.errors.contains_key(&FetchOp::AllImages) {
            keys.extend(self.fetch_all_images());
        }
        if !self.points_loaded && !self.errors.contains_key(&FetchOp::ImagePoints) {
            keys.extend(self.fetch_image_points());
        }
        if self.storage_size.is_none() && !self.errors.contains_key(&FetchOp::StorageSize) {
            keys.extend(self.fetch_storage_size());
        }
        keys
    }

    pub fn is_fetching(&self, op: FetchOp) -> bool {
        self.in_flight.is_running(op)
    }

    pub fn fetches_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// No fetch is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Drop the key from the in-flight set; `true` if it is still current.
    fn settle(&mut self, key: &FetchKey) -> bool {
        self.in_flight.finish(key);
        if key.epoch != self.epoch {
            debug!(op = %key.request.op(), "Response from an older epoch dropped");
            return false;
        }
        true
    }

    fn record_error(&mut self, op: FetchOp, message: String) {
        warn!(op = %op, error = %message, "Fetch failed");
        self.errors.insert(op, message);
    }

    // -----------------------------------------------------------------------
    // Errors and reload
    // -----------------------------------------------------------------------

    pub fn error_for(&self, op: FetchOp) -> Option<&str> {
        self.errors.get(&op).map(String::as_str)
    }

    /// The error the gallery shows: a failed search takes precedence over a
    /// failed browse fetch.
    pub fn listing_error(&self) -> Option<&str> {
        self.error_for(FetchOp::Search)
            .or_else(|| self.error_for(FetchOp::Browse))
    }

    /// Manual retry: forget errors and cached server data, then fetch
    /// everything again.
    pub fn retry(&mut self) -> Vec<FetchKey> {
        info!("Reloading all data");
        self.errors.clear();
        self.invalidate();
        if !self.query.is_empty() {
            self.answered_query = None;
        }
        let mut keys = self.poll_requests();
        keys.extend(self.request_search());
        keys
    }

    /// Start a new data epoch: responses to earlier keys become stale.
    fn invalidate(&mut self) {
        self.epoch += 1;
        self.browse_page = None;
        self.all_images = None;
        self.storage_size = None;
        self.points_loaded = false;
    }

    // -----------------------------------------------------------------------
    // Uploads
    // -----------------------------------------------------------------------

    pub fn uploads(&self) -> &UploadQueue {
        &self.uploads
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads.is_uploading()
    }

    /// Replace the staged set. Returns how many image files were kept.
    pub fn set_selected_files(&mut self, files: Vec<CandidateFile>) -> Result<usize> {
        self.uploads.stage(files)
    }

    pub fn cancel_staged_file(&mut self, index: usize) -> Option<UploadItem> {
        self.uploads.remove_staged(index)
    }

    pub fn clear_staged_files(&mut self) {
        self.uploads.clear_staged();
    }

    pub fn begin_upload(&mut self) -> Option<UploadBatch> {
        self.uploads.begin_upload()
    }

    /// Settle the upload. On success the listing, browse page, points and
    /// storage size are refreshed; the returned keys must be dispatched.
    pub fn finish_upload(&mut self, result: Result<()>) -> Vec<FetchKey> {
        if !self.uploads.is_uploading() {
            return Vec::new();
        }
        self.uploads.finish_upload(&result);
        if result.is_err() {
            return Vec::new();
        }
        self.invalidate();
        self.poll_requests()
    }

    // -----------------------------------------------------------------------
    // Delete all
    // -----------------------------------------------------------------------

    pub fn delete_state(&self) -> DeleteState {
        self.deletion.state()
    }

    pub fn delete_error(&self) -> Option<&str> {
        self.deletion.last_error()
    }

    pub fn request_delete(&mut self) {
        self.deletion.request_delete();
    }

    pub fn cancel_delete_confirm(&mut self) {
        self.deletion.cancel_delete_confirm();
    }

    /// `true` exactly when the caller must issue the delete call now.
    pub fn confirm_delete(&mut self) -> bool {
        self.deletion.confirm_delete()
    }

    /// Settle the delete. Success empties every view of the corpus and
    /// returns the refresh keys to dispatch.
    pub fn finish_delete(&mut self, result: Result<()>) -> Vec<FetchKey> {
        if !self.deletion.is_deleting() {
            return Vec::new();
        }
        self.deletion.finish_delete(&result);
        if result.is_err() {
            return Vec::new();
        }
        self.clear_search();
        self.close_detail();
        self.pagination.set_total(0);
        self.spatial.clear();
        self.errors.clear();
        self.invalidate();
        self.poll_requests()
    }

    // -----------------------------------------------------------------------
    // Gallery and detail view
    // -----------------------------------------------------------------------

    pub fn gallery_view(&self) -> GalleryView {
        GalleryView::derive(
            self.mode(),
            &self.search_results,
            self.browse_page(),
            self.pagination.page_size(),
            self.listing_error(),
        )
    }

    pub fn open_detail(&mut self, image_ref: ImageRef) {
        debug!(image = %image_ref, "Detail opened");
        self.detail = Some(DetailTarget::Stored(image_ref));
        self.spatial.set_detail_open(true);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.spatial.set_detail_open(false);
    }

    pub fn detail(&self) -> Option<Detail> {
        match self.detail.as_ref()? {
            DetailTarget::Stored(image_ref) => Some(Detail::Image(resolve_detail(
                image_ref,
                &self.search_results,
            ))),
            DetailTarget::Point { point, generation } => Some(Detail::Point {
                id: point.id.clone(),
                generation: *generation,
                label: label_for(point, self.all_images.as_deref()),
                image: point.image.clone(),
            }),
        }
    }

    /// Click on a spatial entity: opens the same detail view as the grid.
    /// Points with a path open the stored image; others show their own
    /// `imageData`. Returns `false` for unknown ids.
    pub fn click_point(&mut self, id: &PointId) -> bool {
        let Some(point) = self.spatial.click(id) else {
            return false;
        };
        match point.image_ref.clone() {
            Some(image_ref) => self.open_detail(image_ref),
            None => {
                debug!(point = %point.id, "Detail opened on point");
                let generation = self.spatial.generation();
                self.detail = Some(DetailTarget::Point { point, generation });
                self.spatial.set_detail_open(true);
            }
        }
        true
    }
}
