mod common;

use common::{candidate, hits, offline, point, settle, FakeBackend};
use imace_core::config::ClientConfig;
use imace_core::deletion::DeleteState;
use imace_core::error::ImaceError;
use imace_core::fetch::{Applied, FetchOp, FetchReply, FetchRequest};
use imace_core::model::{BrowsePage, DisplayEntry, ImageRef, ImageSource, PointId};
use imace_core::pagination::PageSize;
use imace_core::recent::RecentSearches;
use imace_core::store::ImageStore;
use imace_core::upload::UploadStatus;
use imace_core::view::Detail;
use imace_core::view::{GalleryStatus, Mode};

fn loaded(backend: &FakeBackend) -> ImageStore {
    let mut store = ImageStore::new();
    settle(&mut store, backend, Vec::new());
    store
}

// ---------------------------------------------------------------------------
// Initial state
// ---------------------------------------------------------------------------

#[test]
fn test_new_store_starts_browsing_page_one() {
    let store = ImageStore::new();
    assert_eq!(store.mode(), Mode::Browse);
    assert_eq!(store.search_query(), "");
    assert_eq!(store.pagination().page(), 1);
    assert_eq!(store.pagination().page_size(), PageSize::Twelve);
    assert!(store.uploads().is_empty());
    assert_eq!(store.delete_state(), DeleteState::Idle);
    assert_eq!(store.gallery_view().status, GalleryStatus::Loading);
}

#[test]
fn test_from_config_uses_default_page_size() {
    let config = ClientConfig {
        default_page_size: PageSize::ThirtySix,
        ..ClientConfig::default()
    };
    let store = ImageStore::from_config(&config, RecentSearches::new());
    assert_eq!(store.pagination().page_size(), PageSize::ThirtySix);
}

#[test]
fn test_poll_requests_fetches_everything_once() {
    let mut store = ImageStore::new();
    assert!(store.is_idle());
    let keys = store.poll_requests();
    assert!(!store.is_idle());
    let ops: Vec<FetchOp> = keys.iter().map(|k| k.request.op()).collect();
    assert_eq!(
        ops,
        vec![
            FetchOp::Browse,
            FetchOp::AllImages,
            FetchOp::ImagePoints,
            FetchOp::StorageSize
        ]
    );
    // Still in flight: nothing is issued twice.
    assert!(store.poll_requests().is_empty());
    assert_eq!(store.fetches_in_flight(), 4);
}

#[test]
fn test_fetch_all_images_deduplicates_while_in_flight() {
    let mut store = ImageStore::new();
    assert!(store.fetch_all_images().is_some());
    assert!(store.fetch_all_images().is_none());
    assert!(store.fetch_image_points().is_some());
    assert!(store.fetch_image_points().is_none());
}

// ---------------------------------------------------------------------------
// Browse
// ---------------------------------------------------------------------------

#[test]
fn test_browse_view_after_load() {
    let backend = FakeBackend::with_images(30);
    let store = loaded(&backend);
    let view = store.gallery_view();
    assert_eq!(view.mode, Mode::Browse);
    assert_eq!(view.entries.len(), 12);
    assert_eq!(view.total_count, 30);
    assert!(view.show_pager);
    assert_eq!(view.status, GalleryStatus::Ready);
    assert!(matches!(view.entries[0], DisplayEntry::Browse { .. }));
    assert_eq!(store.all_images().map(<[ImageRef]>::len), Some(30));
    assert_eq!(store.storage_size(), Some(30 * 1024));
    assert!(store.is_idle());
}

#[test]
fn test_single_page_hides_pager() {
    let backend = FakeBackend::with_images(5);
    let view = loaded(&backend).gallery_view();
    assert_eq!(view.entries.len(), 5);
    assert!(!view.show_pager);
}

#[test]
fn test_empty_corpus_is_empty_state_not_error() {
    let backend = FakeBackend::with_images(0);
    let view = loaded(&backend).gallery_view();
    assert_eq!(view.status, GalleryStatus::Empty);
    assert_eq!(view.total_count, 0);
    assert!(!view.show_pager);
}

#[test]
fn test_change_page_loads_new_page() {
    let backend = FakeBackend::with_images(30);
    let mut store = loaded(&backend);
    assert!(store.change_page(3));
    assert_eq!(store.gallery_view().status, GalleryStatus::Loading);
    settle(&mut store, &backend, Vec::new());
    let view = store.gallery_view();
    assert_eq!(view.entries.len(), 6);
    assert_eq!(view.entries[0].image_ref().as_str(), "img_24.jpg");
}

#[test]
fn test_change_page_out_of_range_is_noop() {
    let backend = FakeBackend::with_images(30);
    let mut store = loaded(&backend);
    assert!(!store.change_page(0));
    assert!(!store.change_page(4));
    assert_eq!(store.pagination().page(), 1);
}

#[test]
fn test_change_page_size_resets_page() {
    let backend = FakeBackend::with_images(100);
    let mut store = loaded(&backend);
    assert!(store.change_page(5));
    store.change_page_size(PageSize::FortyEight);
    assert_eq!(store.pagination().page(), 1);
    settle(&mut store, &backend, Vec::new());
    assert_eq!(store.gallery_view().entries.len(), 48);
}

#[test]
fn test_stale_browse_page_is_dropped() {
    let backend = FakeBackend::with_images(100);
    let mut store = loaded(&backend);

    assert!(store.change_page(2));
    let page_two = store.begin_browse_fetch().unwrap();
    assert!(store.change_page(3));
    let page_three = store.begin_browse_fetch().unwrap();

    // Page 3 resolves first; the late page 2 response must not overwrite it.
    let three = BrowsePage {
        images: vec![ImageRef::new("third.jpg")],
        total: 100,
    };
    let two = BrowsePage {
        images: vec![ImageRef::new("second.jpg")],
        total: 100,
    };
    assert_eq!(store.apply_browse_page(&page_three, Ok(three)), Applied::Applied);
    assert_eq!(store.apply_browse_page(&page_two, Ok(two)), Applied::Stale);

    let view = store.gallery_view();
    assert_eq!(view.entries[0].image_ref().as_str(), "third.jpg");
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn test_search_single_hit_hides_pager() {
    let backend = FakeBackend::with_images(30);
    *backend.search_hits.lock().unwrap() = hits(&[("a.jpg", 91.23)]);
    let mut store = loaded(&backend);

    assert!(store.set_search_query("dogs playing"));
    settle(&mut store, &backend, Vec::new());

    assert_eq!(store.mode(), Mode::Search);
    let view = store.gallery_view();
    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.total_count, 1);
    assert!(!view.show_pager);
    assert_eq!(view.heading(), "Search Results");
    assert_eq!(
        view.entries[0],
        DisplayEntry::Search {
            image_ref: ImageRef::new("a.jpg"),
            similarity: 91.23
        }
    );
}

#[test]
fn test_pending_query_is_search_mode_without_browse_key() {
    let mut store = ImageStore::new();
    store.set_search_query("cats");
    assert!(store.is_search_pending());
    assert_eq!(store.mode(), Mode::Search);
    assert!(store.browse_key().is_none());
    assert!(store.begin_browse_fetch().is_none());
    let ops: Vec<FetchOp> = store.poll_requests().iter().map(|k| k.request.op()).collect();
    assert!(!ops.contains(&FetchOp::Browse));
}

#[test]
fn test_set_same_query_twice_is_idempotent() {
    let mut store = ImageStore::new();
    assert!(store.set_search_query("cats"));
    assert!(!store.set_search_query("cats"));
    assert!(!store.set_search_query("  cats "));
    let first = store.request_search();
    assert!(first.is_some());
    assert!(store.request_search().is_none());
}

#[test]
fn test_out_of_order_search_responses() {
    let mut store = ImageStore::new();
    store.set_search_query("cat");
    let cat = store.request_search().unwrap();
    store.set_search_query("dog");
    let dog = store.request_search().unwrap();

    assert_eq!(
        store.apply_search(&dog, Ok(hits(&[("dog.jpg", 80.0)]))),
        Applied::Applied
    );
    assert_eq!(
        store.apply_search(&cat, Ok(hits(&[("cat.jpg", 90.0)]))),
        Applied::Stale
    );
    assert_eq!(store.search_results()[0].image_ref.as_str(), "dog.jpg");
}

#[test]
fn test_zero_hits_falls_back_to_browse() {
    let backend = FakeBackend::with_images(30);
    let mut store = loaded(&backend);
    store.set_search_query("nothing matches");
    settle(&mut store, &backend, Vec::new());
    assert!(!store.is_search_pending());
    assert_eq!(store.mode(), Mode::Browse);
    assert_eq!(store.gallery_view().entries.len(), 12);
}

#[test]
fn test_set_search_results_switches_mode() {
    let mut store = ImageStore::new();
    store.set_search_results(hits(&[("a.jpg", 50.0)]));
    assert_eq!(store.mode(), Mode::Search);
    store.set_search_results(Vec::new());
    assert_eq!(store.mode(), Mode::Browse);
}

#[test]
fn test_clear_search_resets_page() {
    let backend = FakeBackend::with_images(100);
    *backend.search_hits.lock().unwrap() = hits(&[("a.jpg", 10.0)]);
    let mut store = loaded(&backend);
    assert!(store.change_page(4));

    store.set_search_query("x");
    settle(&mut store, &backend, Vec::new());
    assert_eq!(store.mode(), Mode::Search);
    assert!(!store.change_page(2));

    store.clear_search();
    assert_eq!(store.mode(), Mode::Browse);
    assert_eq!(store.search_query(), "");
    assert!(store.search_results().is_empty());
    assert_eq!(store.pagination().page(), 1);
}

#[test]
fn test_blank_query_clears_search() {
    let mut store = ImageStore::new();
    store.set_search_results(hits(&[("a.jpg", 10.0)]));
    store.set_search_query("x");
    assert!(store.set_search_query("   "));
    assert_eq!(store.mode(), Mode::Browse);
    assert!(store.search_results().is_empty());
}

#[test]
fn test_browse_response_ignored_after_search_starts() {
    let mut store = ImageStore::new();
    let browse = store.begin_browse_fetch().unwrap();
    store.set_search_query("cats");
    let page = BrowsePage {
        images: vec![ImageRef::new("late.jpg")],
        total: 1,
    };
    assert_eq!(store.apply_browse_page(&browse, Ok(page)), Applied::Stale);
}

#[test]
fn test_successful_search_is_remembered() {
    let mut store = ImageStore::new();
    store.set_search_query("sunset");
    let key = store.request_search().unwrap();
    store.apply_search(&key, Ok(hits(&[("s.jpg", 70.0)])));
    assert_eq!(store.recent_searches(), ["sunset".to_string()]);
}

#[test]
fn test_recent_searches_persist_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.toml");
    let recent = RecentSearches::load(&path).unwrap();
    let mut store = ImageStore::from_config(&ClientConfig::default(), recent);

    store.set_search_query("mountains");
    let key = store.request_search().unwrap();
    store.apply_search(&key, Ok(hits(&[("m.jpg", 60.0)])));

    let reloaded = RecentSearches::load(&path).unwrap();
    assert_eq!(reloaded.entries(), ["mountains".to_string()]);
}

// ---------------------------------------------------------------------------
// Errors and retry
// ---------------------------------------------------------------------------

#[test]
fn test_connection_error_surfaces_and_is_not_retried() {
    let backend = FakeBackend::with_images(30);
    backend.set_fail_reads(true);
    let mut store = loaded(&backend);

    assert!(matches!(store.gallery_view().status, GalleryStatus::Failed(_)));
    assert!(store.error_for(FetchOp::AllImages).is_some());
    assert!(store.poll_requests().is_empty());
}

#[test]
fn test_retry_reloads_everything() {
    let backend = FakeBackend::with_images(30);
    backend.set_fail_reads(true);
    let mut store = loaded(&backend);

    backend.set_fail_reads(false);
    let keys = store.retry();
    assert_eq!(keys.len(), 4);
    settle(&mut store, &backend, keys);
    assert_eq!(store.gallery_view().status, GalleryStatus::Ready);
    assert!(store.listing_error().is_none());
}

#[test]
fn test_failed_search_shows_error() {
    let mut store = ImageStore::new();
    store.set_search_query("cats");
    let key = store.request_search().unwrap();
    store.apply_search(&key, Err(offline()));
    assert!(!store.is_search_pending());
    assert!(store.search_results().is_empty());
    assert!(store.listing_error().is_some());
    assert!(matches!(store.gallery_view().status, GalleryStatus::Failed(_)));
    assert!(store.recent_searches().is_empty());
}

#[test]
fn test_retry_reissues_failed_search() {
    let mut store = ImageStore::new();
    store.set_search_query("cats");
    let key = store.request_search().unwrap();
    store.apply_search(&key, Err(offline()));

    let keys = store.retry();
    assert!(keys
        .iter()
        .any(|k| k.request == FetchRequest::Search("cats".into())));
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[test]
fn test_upload_success_refreshes_listing() {
    let backend = FakeBackend::with_images(2);
    let mut store = loaded(&backend);

    store
        .set_selected_files(vec![candidate("a.png"), candidate("b.jpg")])
        .unwrap();
    let batch = store.begin_upload().unwrap();
    let result = imace_core::api::ImageBackend::upload(&backend, &batch);
    let keys = store.finish_upload(result);

    let ops: Vec<FetchOp> = keys.iter().map(|k| k.request.op()).collect();
    assert!(ops.contains(&FetchOp::AllImages));
    assert!(ops.contains(&FetchOp::Browse));

    settle(&mut store, &backend, keys);
    assert!(store.uploads().is_empty());
    assert_eq!(store.all_images().map(<[ImageRef]>::len), Some(4));
    assert_eq!(store.gallery_view().total_count, 4);
}

#[test]
fn test_listing_from_before_upload_is_stale() {
    let mut store = ImageStore::new();
    let old = store.fetch_all_images().unwrap();

    store.set_selected_files(vec![candidate("a.png")]).unwrap();
    store.begin_upload().unwrap();
    let keys = store.finish_upload(Ok(()));
    assert!(keys.iter().any(|k| k.request == FetchRequest::AllImages));

    let reply = FetchReply::AllImages(Ok(vec![ImageRef::new("old.jpg")]));
    assert_eq!(store.apply(&old, reply), Applied::Stale);
    assert!(store.all_images().is_none());
}

#[test]
fn test_upload_failure_keeps_items_for_retry() {
    let backend = FakeBackend::with_images(0);
    *backend.fail_upload.lock().unwrap() = true;
    let mut store = loaded(&backend);

    store.set_selected_files(vec![candidate("a.png")]).unwrap();
    let batch = store.begin_upload().unwrap();
    let result = imace_core::api::ImageBackend::upload(&backend, &batch);
    assert!(store.finish_upload(result).is_empty());
    assert_eq!(store.uploads().items()[0].status, UploadStatus::Failed);

    // Retry sends the failed item again.
    let retry = store.begin_upload().unwrap();
    assert_eq!(retry.len(), 1);
}

#[test]
fn test_stage_while_uploading_is_rejected() {
    let mut store = ImageStore::new();
    store.set_selected_files(vec![candidate("a.png")]).unwrap();
    store.begin_upload().unwrap();
    assert!(store.is_uploading());
    let err = store.set_selected_files(vec![candidate("b.png")]).unwrap_err();
    assert!(matches!(err, ImaceError::UploadInProgress));
    assert!(store.begin_upload().is_none());
}

#[test]
fn test_cancel_staged_file() {
    let mut store = ImageStore::new();
    store
        .set_selected_files(vec![candidate("a.png"), candidate("b.png")])
        .unwrap();
    let removed = store.cancel_staged_file(0).unwrap();
    assert_eq!(removed.status, UploadStatus::Cancelled);
    assert_eq!(store.uploads().len(), 1);
    assert!(store.cancel_staged_file(5).is_none());
}

#[test]
fn test_finish_upload_without_batch_is_noop() {
    let mut store = ImageStore::new();
    assert!(store.finish_upload(Ok(())).is_empty());
}

// ---------------------------------------------------------------------------
// Delete all
// ---------------------------------------------------------------------------

#[test]
fn test_delete_cancel_issues_nothing() {
    let mut store = ImageStore::new();
    store.request_delete();
    assert_eq!(store.delete_state(), DeleteState::Confirming);
    store.cancel_delete_confirm();
    assert_eq!(store.delete_state(), DeleteState::Idle);
    assert!(store.finish_delete(Ok(())).is_empty());
}

#[test]
fn test_delete_success_empties_every_view() {
    let backend = FakeBackend::with_images(30);
    *backend.points.lock().unwrap() = vec![point("0", [1.0, 0.0, 0.0], None)];
    *backend.search_hits.lock().unwrap() = hits(&[("img_1.jpg", 40.0)]);
    let mut store = loaded(&backend);
    store.set_search_query("x");
    settle(&mut store, &backend, Vec::new());
    assert_eq!(store.spatial().entities().len(), 1);

    store.request_delete();
    assert!(store.confirm_delete());
    assert!(!store.confirm_delete());
    let result = imace_core::api::ImageBackend::delete_all(&backend);
    let keys = store.finish_delete(result);
    assert!(store.spatial().is_empty());
    assert_eq!(store.mode(), Mode::Browse);

    settle(&mut store, &backend, keys);
    assert_eq!(store.delete_state(), DeleteState::Idle);
    assert_eq!(store.gallery_view().status, GalleryStatus::Empty);
    assert_eq!(store.all_images().map(<[ImageRef]>::len), Some(0));
    assert_eq!(store.storage_size(), Some(0));
}

#[test]
fn test_delete_failure_surfaces_error_and_keeps_data() {
    let backend = FakeBackend::with_images(3);
    let mut store = loaded(&backend);
    store.request_delete();
    assert!(store.confirm_delete());
    let keys = store.finish_delete(Err(ImaceError::DeleteFailure("500".into())));
    assert!(keys.is_empty());
    assert_eq!(store.delete_state(), DeleteState::Idle);
    assert!(store.delete_error().is_some());
    assert_eq!(store.gallery_view().entries.len(), 3);
}

// ---------------------------------------------------------------------------
// Detail view
// ---------------------------------------------------------------------------

#[test]
fn test_detail_carries_similarity_from_search() {
    let mut store = ImageStore::new();
    store.set_search_results(hits(&[("a.jpg", 91.23)]));
    store.open_detail(ImageRef::new("a.jpg"));
    assert_eq!(store.detail().and_then(|d| d.similarity()), Some(91.23));
    assert!(!store.spatial().is_auto_rotating());

    store.close_detail();
    assert!(store.detail().is_none());
}

#[test]
fn test_detail_from_browse_has_no_similarity() {
    let mut store = ImageStore::new();
    store.open_detail(ImageRef::new("b.jpg"));
    assert_eq!(
        store.detail(),
        Some(Detail::Image(DisplayEntry::Browse {
            image_ref: ImageRef::new("b.jpg")
        }))
    );
}

#[test]
fn test_click_point_with_path_opens_stored_image() {
    let backend = FakeBackend::with_images(5);
    *backend.points.lock().unwrap() = vec![point("3", [0.0, 0.0, 2.0], Some("dir/cat.jpg"))];
    let mut store = loaded(&backend);
    assert!(store.spatial().is_auto_rotating());

    assert!(store.click_point(&PointId::new("3")));
    assert_eq!(
        store.detail().and_then(|d| d.image_ref().cloned()),
        Some(ImageRef::new("dir/cat.jpg"))
    );
    assert!(!store.spatial().is_auto_rotating());

    store.close_detail();
    assert!(store.spatial().is_auto_rotating());
    assert!(!store.click_point(&PointId::new("99")));
    assert!(store.detail().is_none());
}

#[test]
fn test_click_point_without_path_shows_its_own_image() {
    let backend = FakeBackend::with_images(0);
    *backend.points.lock().unwrap() = vec![point("a1b2", [0.0, 0.0, 0.0], None)];
    let mut store = loaded(&backend);
    assert!(store.all_images().is_some_and(|l| l.is_empty()));

    assert!(store.click_point(&PointId::new("a1b2")));
    assert!(!store.spatial().is_auto_rotating());
    assert_eq!(
        store.detail(),
        Some(Detail::Point {
            id: PointId::new("a1b2"),
            generation: store.spatial().generation(),
            label: "#a1b2".to_string(),
            image: ImageSource::Remote("/thumb/a1b2.png".to_string()),
        })
    );
}

#[test]
fn test_point_detail_never_guesses_from_listing_index() {
    let backend = FakeBackend::with_images(5);
    *backend.points.lock().unwrap() = vec![point("3", [0.0, 0.0, 2.0], None)];
    let mut store = loaded(&backend);

    assert!(store.click_point(&PointId::new("3")));
    let detail = store.detail().unwrap();
    // The listing only names the point; the pixels are its own.
    assert!(detail.image_ref().is_none());
    assert_eq!(detail.title(), "img_3.jpg");
    assert!(matches!(detail, Detail::Point { image: ImageSource::Remote(_), .. }));
}

#[test]
fn test_point_detail_survives_points_refetch() {
    let backend = FakeBackend::with_images(0);
    *backend.points.lock().unwrap() = vec![point("a1b2", [0.0, 0.0, 0.0], None)];
    let mut store = loaded(&backend);
    assert!(store.click_point(&PointId::new("a1b2")));

    let opened_in = store.spatial().generation();

    *backend.points.lock().unwrap() = Vec::new();
    let keys = store.retry();
    settle(&mut store, &backend, keys);

    assert!(store.spatial().is_empty());
    assert_ne!(store.spatial().generation(), opened_in);
    match store.detail() {
        Some(Detail::Point { generation, .. }) => assert_eq!(generation, opened_in),
        other => panic!("expected point detail, got {other:?}"),
    }
}

#[test]
fn test_upload_refetch_starts_new_point_generation() {
    let backend = FakeBackend::with_images(2);
    *backend.points.lock().unwrap() = vec![point("0", [0.0, 0.0, 0.0], None)];
    let mut store = loaded(&backend);
    let before = store.spatial().generation();

    store.set_selected_files(vec![candidate("new.png")]).unwrap();
    let batch = store.begin_upload().unwrap();
    let result = imace_core::api::ImageBackend::upload(&backend, &batch);
    *backend.points.lock().unwrap() = vec![point("0", [1.0, 0.0, 0.0], None)];
    let keys = store.finish_upload(result);
    settle(&mut store, &backend, keys);

    // Same id, new point set: anything keyed by the old generation is stale.
    assert_eq!(store.spatial().entities()[0].position, [1.0, 0.0, 0.0]);
    assert_ne!(store.spatial().generation(), before);
}
