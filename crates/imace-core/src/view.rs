use std::fmt;

use crate::model::{BrowsePage, DisplayEntry, ImageRef, ImageSource, PointId, SearchResult};
use crate::pagination::{total_pages, PageSize};

/// Which data source the gallery shows. Derived, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browse,
    Search,
}

impl Mode {
    /// `Search` when the active query has results, or is non-empty and
    /// still waiting for its answer. `Browse` otherwise.
    pub fn derive(query: &str, result_count: usize, pending: bool) -> Self {
        if result_count > 0 || (!query.trim().is_empty() && pending) {
            Self::Search
        } else {
            Self::Browse
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browse => write!(f, "Browse"),
            Self::Search => write!(f, "Search"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GalleryStatus {
    /// Nothing received for the current key yet.
    Loading,
    /// A valid response with zero items.
    Empty,
    Ready,
    /// The backend could not be reached; shown with a retry action.
    Failed(String),
}

/// The one list the gallery grid renders.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryView {
    pub mode: Mode,
    pub entries: Vec<DisplayEntry>,
    pub total_count: usize,
    pub show_pager: bool,
    pub status: GalleryStatus,
}

impl GalleryView {
    /// Pick exactly one source: search results in `Search` mode, the
    /// browse page otherwise.
    pub fn derive(
        mode: Mode,
        search_results: &[SearchResult],
        browse_page: Option<&BrowsePage>,
        page_size: PageSize,
        error: Option<&str>,
    ) -> Self {
        let (entries, total_count, show_pager, status) = match mode {
            Mode::Search => {
                let entries: Vec<DisplayEntry> =
                    search_results.iter().map(DisplayEntry::from).collect();
                let status = if entries.is_empty() {
                    GalleryStatus::Loading
                } else {
                    GalleryStatus::Ready
                };
                let count = entries.len();
                (entries, count, false, status)
            }
            Mode::Browse => match browse_page {
                Some(page) => {
                    let entries: Vec<DisplayEntry> = page
                        .images
                        .iter()
                        .map(|r| DisplayEntry::Browse {
                            image_ref: r.clone(),
                        })
                        .collect();
                    let status = if entries.is_empty() {
                        GalleryStatus::Empty
                    } else {
                        GalleryStatus::Ready
                    };
                    let show_pager = total_pages(page.total, page_size) > 1;
                    (entries, page.total, show_pager, status)
                }
                None => (Vec::new(), 0, false, GalleryStatus::Loading),
            },
        };

        let status = match error {
            Some(message) => GalleryStatus::Failed(message.to_string()),
            None => status,
        };

        Self {
            mode,
            entries,
            total_count,
            show_pager: show_pager && matches!(status, GalleryStatus::Ready),
            status,
        }
    }

    pub fn is_search(&self) -> bool {
        self.mode == Mode::Search
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            Mode::Search => "Search Results",
            Mode::Browse => "Gallery",
        }
    }
}

/// What the detail view shows.
#[derive(Clone, Debug, PartialEq)]
pub enum Detail {
    /// A stored image, opened from the grid or from a point with a path.
    Image(DisplayEntry),
    /// A spatial point without a stored path, shown from its own pixels.
    Point {
        id: PointId,
        /// Point set the id belongs to.
        generation: u64,
        label: String,
        image: ImageSource,
    },
}

impl Detail {
    pub fn image_ref(&self) -> Option<&ImageRef> {
        match self {
            Self::Image(entry) => Some(entry.image_ref()),
            Self::Point { .. } => None,
        }
    }

    pub fn similarity(&self) -> Option<f32> {
        match self {
            Self::Image(entry) => entry.similarity(),
            Self::Point { .. } => None,
        }
    }

    pub fn similarity_label(&self) -> Option<String> {
        match self {
            Self::Image(entry) => entry.similarity_label(),
            Self::Point { .. } => None,
        }
    }

    /// Window title: the file name, or the point's label.
    pub fn title(&self) -> &str {
        match self {
            Self::Image(entry) => entry.image_ref().file_name(),
            Self::Point { label, .. } => label,
        }
    }
}

/// The record behind a detail view, whichever surface opened it. Carries
/// the similarity score when the image is among the current search hits.
pub fn resolve_detail(image_ref: &ImageRef, search_results: &[SearchResult]) -> DisplayEntry {
    search_results
        .iter()
        .find(|r| &r.image_ref == image_ref)
        .map(DisplayEntry::from)
        .unwrap_or_else(|| DisplayEntry::Browse {
            image_ref: image_ref.clone(),
        })
}
