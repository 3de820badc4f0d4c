use imace_core::config::ClientConfig;
use imace_core::consts::DEFAULT_BASE_URL;
use imace_core::pagination::PageSize;

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.default_page_size, PageSize::Twelve);
    assert!(config.persist_recent_searches);
    assert!(config.worker_threads >= 1);
}

#[test]
fn test_empty_file_gives_defaults() {
    assert_eq!(ClientConfig::from_toml("").unwrap(), ClientConfig::default());
}

#[test]
fn test_partial_file_overrides_fields() {
    let config = ClientConfig::from_toml(
        r#"
base_url = "http://gallery.local:9000/"
default_page_size = 24
worker_threads = 0
"#,
    )
    .unwrap();
    assert_eq!(config.base_url, "http://gallery.local:9000");
    assert_eq!(config.default_page_size, PageSize::TwentyFour);
    assert_eq!(config.worker_threads, 1);
    assert_eq!(config.search_debounce_ms, ClientConfig::default().search_debounce_ms);
}

#[test]
fn test_invalid_page_size_is_rejected() {
    assert!(ClientConfig::from_toml("default_page_size = 20").is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imace").join("config.toml");
    let config = ClientConfig {
        base_url: "http://10.0.0.2:8000".into(),
        default_page_size: PageSize::FortyEight,
        persist_recent_searches: false,
        ..ClientConfig::default()
    };
    config.save(&path).unwrap();
    assert_eq!(ClientConfig::load(&path).unwrap(), config);
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert_eq!(
        ClientConfig::load_or_default(Some(missing.as_path())).unwrap(),
        ClientConfig::default()
    );
    assert_eq!(
        ClientConfig::load_or_default(None).unwrap(),
        ClientConfig::default()
    );
}
