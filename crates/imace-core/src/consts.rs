/// Page sizes offered by the pager, smallest first.
pub const PAGE_SIZES: [usize; 5] = [12, 18, 24, 36, 48];

/// Page size used until the user picks another one.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Pages shown on each side of the current page in the pager window.
pub const WINDOW_RADIUS: usize = 2;

/// Maximum number of remembered search strings.
pub const RECENT_SEARCH_LIMIT: usize = 5;

/// Backend address used when no config file overrides it.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Quiet period after the last keystroke before a search is issued.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Threads in the request pool.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Decoded thumbnails kept on the GPU before the cache is flushed.
pub const DEFAULT_THUMBNAIL_CACHE_LIMIT: usize = 256;

/// Highest similarity score the backend reports.
pub const MAX_SIMILARITY: f32 = 100.0;

/// Scale applied to a spatial entity under the pointer.
pub const HOVER_SCALE: f32 = 1.2;

/// Orbit camera zoom limits (scene units from the origin).
pub const CAMERA_MIN_DISTANCE: f32 = 5.0;
pub const CAMERA_MAX_DISTANCE: f32 = 30.0;
pub const CAMERA_START_DISTANCE: f32 = 20.0;

/// Vertical field of view of the orbit camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Auto-rotation speed in radians per second (one orbit every 30s).
pub const AUTO_ROTATE_SPEED: f32 = std::f32::consts::TAU / 30.0;

/// Canned queries offered under the search box.
pub const EXAMPLE_SEARCHES: [&str; 5] = [
    "mountains with snow",
    "sunset over the ocean",
    "people smiling",
    "dogs playing",
    "city skyline",
];
