//! 3-D exploration surface: entities placed at server-supplied positions,
//! hover and click handling, and the orbit camera that drives the view.

use tracing::debug;

use crate::consts::{
    AUTO_ROTATE_SPEED, CAMERA_FOV_DEGREES, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE,
    CAMERA_START_DISTANCE, HOVER_SCALE,
};
use crate::model::{ImageRef, PointId, SpatialPoint};

/// Closest depth still drawn.
const NEAR_PLANE: f32 = 0.1;

/// Elevation is kept away from the poles so the up vector stays defined.
const MAX_ELEVATION: f32 = 1.45;

/// Screen-space placement of a projected point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    /// Distance along the view direction; larger is farther.
    pub depth: f32,
    /// Pixels per scene unit at this depth.
    pub scale: f32,
}

/// Orbit camera looking at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            distance: CAMERA_START_DISTANCE,
        }
    }
}

impl OrbitCamera {
    /// Advance auto-rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f32, rotating: bool) {
        if rotating {
            self.azimuth = (self.azimuth + AUTO_ROTATE_SPEED * dt) % std::f32::consts::TAU;
        }
    }

    /// Rotate by a pointer drag, in radians.
    pub fn drag(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth = (self.azimuth - d_azimuth) % std::f32::consts::TAU;
        self.elevation = (self.elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Multiply the distance by `factor`, within the zoom limits.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance =
                (self.distance * factor).clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        }
    }

    pub fn eye(&self) -> [f32; 3] {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        [
            self.distance * ce * sa,
            self.distance * se,
            self.distance * ce * ca,
        ]
    }

    /// Perspective projection into a `viewport` of `[width, height]` pixels.
    /// `None` for points behind the camera.
    pub fn project(&self, position: [f32; 3], viewport: [f32; 2]) -> Option<Projection> {
        let eye = self.eye();
        let forward = normalize(scale(eye, -1.0));
        let right = normalize(cross(forward, [0.0, 1.0, 0.0]));
        let up = cross(right, forward);

        let v = sub(position, eye);
        let depth = dot(v, forward);
        if depth <= NEAR_PLANE {
            return None;
        }

        let focal = (viewport[1] * 0.5) / (CAMERA_FOV_DEGREES.to_radians() * 0.5).tan();
        let px_per_unit = focal / depth;
        Some(Projection {
            x: viewport[0] * 0.5 + dot(v, right) * px_per_unit,
            y: viewport[1] * 0.5 - dot(v, up) * px_per_unit,
            depth,
            scale: px_per_unit,
        })
    }
}

/// Scene entities plus interaction state for the exploration view.
#[derive(Debug)]
pub struct SpatialMap {
    entities: Vec<SpatialPoint>,
    hovered: Option<PointId>,
    selected: Option<PointId>,
    auto_rotate: bool,
    detail_open: bool,
    /// Bumped on every `replace_points`; ids are only unique within one.
    generation: u64,
    pub camera: OrbitCamera,
}

impl Default for SpatialMap {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            hovered: None,
            selected: None,
            auto_rotate: true,
            detail_open: false,
            generation: 0,
            camera: OrbitCamera::default(),
        }
    }
}

impl SpatialMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<SpatialPoint>) -> Self {
        let mut map = Self::new();
        map.replace_points(points);
        map
    }

    /// Swap in a fresh set of points. Interaction state tied to the old
    /// entities is dropped; the camera is kept.
    pub fn replace_points(&mut self, points: Vec<SpatialPoint>) {
        debug!(count = points.len(), "Spatial points replaced");
        self.entities = points;
        self.hovered = None;
        self.selected = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Identifies the current point set. A `PointId` from an older
    /// generation may name a different image.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clear(&mut self) {
        self.replace_points(Vec::new());
    }

    pub fn entities(&self) -> &[SpatialPoint] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: &PointId) -> Option<&SpatialPoint> {
        self.entities.iter().find(|p| &p.id == id)
    }

    pub fn hovered(&self) -> Option<&PointId> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&PointId> {
        self.selected.as_ref()
    }

    pub fn set_hovered(&mut self, id: Option<PointId>) {
        self.hovered = id.filter(|id| self.entity(id).is_some());
    }

    pub fn scale_for(&self, id: &PointId) -> f32 {
        if self.hovered.as_ref() == Some(id) {
            HOVER_SCALE
        } else {
            1.0
        }
    }

    /// Handle a click on an entity. Returns the clicked point for the
    /// shared detail view; `None` for unknown ids.
    pub fn click(&mut self, id: &PointId) -> Option<SpatialPoint> {
        let point = self.entity(id)?.clone();
        self.selected = Some(id.clone());
        Some(point)
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn auto_rotate_enabled(&self) -> bool {
        self.auto_rotate
    }

    /// Called by the store when the detail view opens or closes.
    pub fn set_detail_open(&mut self, open: bool) {
        self.detail_open = open;
        if !open {
            self.selected = None;
        }
    }

    /// Rotation runs only with something to look at and no detail view open.
    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate && !self.detail_open && !self.entities.is_empty()
    }

    pub fn tick(&mut self, dt: f32) {
        let rotating = self.is_auto_rotating();
        self.camera.advance(dt, rotating);
    }

    /// Entities projected into `viewport`, farthest first so nearer ones
    /// paint over them.
    pub fn projected(&self, viewport: [f32; 2]) -> Vec<(&SpatialPoint, Projection)> {
        let mut out: Vec<_> = self
            .entities
            .iter()
            .filter_map(|p| self.camera.project(p.position, viewport).map(|pr| (p, pr)))
            .collect();
        out.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
        out
    }
}

/// The stored image a point names: its own path, or the listing entry its
/// numeric id indexes. Only used for labels; opening a point never guesses.
pub fn image_ref_for(point: &SpatialPoint, listing: Option<&[ImageRef]>) -> Option<ImageRef> {
    if let Some(r) = &point.image_ref {
        return Some(r.clone());
    }
    let index = point.id.as_index()?;
    listing.and_then(|l| l.get(index)).cloned()
}

pub fn label_for(point: &SpatialPoint, listing: Option<&[ImageRef]>) -> String {
    image_ref_for(point, listing)
        .map(|r| r.file_name().to_string())
        .unwrap_or_else(|| format!("#{}", point.id))
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(a: [f32; 3]) -> [f32; 3] {
    let len = dot(a, a).sqrt();
    if len == 0.0 {
        a
    } else {
        scale(a, 1.0 / len)
    }
}
