use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::MAX_SIMILARITY;
use crate::error::{ImaceError, Result};

/// Path/identifier naming one stored image.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component, for compact labels.
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One hit of a semantic search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "path")]
    pub image_ref: ImageRef,
    #[serde(deserialize_with = "deserialize_similarity")]
    pub similarity: f32,
}

impl SearchResult {
    pub fn new(image_ref: impl Into<ImageRef>, similarity: f32) -> Self {
        Self {
            image_ref: image_ref.into(),
            similarity: normalize_similarity(similarity),
        }
    }
}

/// Clamp to 0..=100 and keep two decimals.
pub fn normalize_similarity(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    (score.clamp(0.0, MAX_SIMILARITY) * 100.0).round() / 100.0
}

fn deserialize_similarity<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f32, D::Error> {
    f32::deserialize(d).map(normalize_similarity)
}

/// A displayable gallery entry. The variant records which data source
/// produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEntry {
    Search { image_ref: ImageRef, similarity: f32 },
    Browse { image_ref: ImageRef },
}

impl DisplayEntry {
    pub fn image_ref(&self) -> &ImageRef {
        match self {
            Self::Search { image_ref, .. } | Self::Browse { image_ref } => image_ref,
        }
    }

    pub fn similarity(&self) -> Option<f32> {
        match self {
            Self::Search { similarity, .. } => Some(*similarity),
            Self::Browse { .. } => None,
        }
    }

    /// Score as a 0.0–1.0 fill for a bar.
    pub fn similarity_fraction(&self) -> Option<f32> {
        self.similarity().map(|s| s / MAX_SIMILARITY)
    }

    /// "91.23% match" for search hits.
    pub fn similarity_label(&self) -> Option<String> {
        self.similarity().map(|s| format!("{s:.2}% match"))
    }
}

impl From<&SearchResult> for DisplayEntry {
    fn from(r: &SearchResult) -> Self {
        Self::Search {
            image_ref: r.image_ref.clone(),
            similarity: r.similarity,
        }
    }
}

/// One page of the browse listing as returned by `/paginated_images`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowsePage {
    pub images: Vec<ImageRef>,
    pub total: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct StorageSizeReply {
    pub size_bytes: u64,
}

/// Where the pixels of a spatial point come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// Decoded bytes of a `data:` URL. Shared so detail and sprite views
    /// can hold the same payload.
    Inline(Arc<[u8]>),
    /// URL to fetch.
    Remote(String),
}

impl ImageSource {
    /// Parse the `imageData` field of an image point.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some(rest) = raw.strip_prefix("data:") else {
            return Ok(Self::Remote(raw.to_string()));
        };
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImaceError::Decode("data URL without payload".into()))?;
        if !meta.ends_with(";base64") {
            return Err(ImaceError::Decode(format!("unsupported data URL encoding: {meta}")));
        }
        let bytes = BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|e| ImaceError::Decode(format!("invalid base64 image data: {e}")))?;
        Ok(Self::Inline(bytes.into()))
    }
}

/// Backend identifiers come as either numbers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric ids index into the full image listing.
    pub fn as_index(&self) -> Option<usize> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PointId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(d)? {
            Raw::Num(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Wire shape of one `/image_points` element.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ImagePointReply {
    pub id: PointId,
    pub position: [f32; 3],
    #[serde(rename = "imageData")]
    pub image_data: String,
    #[serde(default)]
    pub path: Option<ImageRef>,
}

/// A corpus image placed in the 3-D exploration scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialPoint {
    pub id: PointId,
    pub position: [f32; 3],
    /// `None` when the backend omitted the path; labels then come from the
    /// full listing.
    pub image_ref: Option<ImageRef>,
    pub image: ImageSource,
}

impl TryFrom<ImagePointReply> for SpatialPoint {
    type Error = ImaceError;

    fn try_from(reply: ImagePointReply) -> Result<Self> {
        Ok(Self {
            image: ImageSource::parse(&reply.image_data)?,
            id: reply.id,
            position: reply.position,
            image_ref: reply.path,
        })
    }
}

/// Render a byte count the way the settings panel shows it.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
