use std::collections::HashMap;

use imace_core::model::{ImageRef, PointId};
use imace_core::upload::PreviewId;

/// Longest edge of grid thumbnails, staged previews and scene sprites.
const THUMBNAIL_EDGE: u32 = 320;
/// Longest edge of the image in the detail view.
const FULL_EDGE: u32 = 1600;

/// Identifies one decoded texture.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Thumbnail(ImageRef),
    Full(ImageRef),
    /// A spatial point within one point-set generation.
    Point { generation: u64, id: PointId },
    Preview(PreviewId),
}

impl TextureKey {
    pub fn max_edge(&self) -> u32 {
        match self {
            Self::Full(_) => FULL_EDGE,
            _ => THUMBNAIL_EDGE,
        }
    }

    /// Debug name handed to egui.
    pub fn name(&self) -> String {
        match self {
            Self::Thumbnail(r) => format!("thumb:{r}"),
            Self::Full(r) => format!("full:{r}"),
            Self::Point { generation, id } => format!("point:{generation}:{id}"),
            Self::Preview(p) => format!("preview:{}", p.get()),
        }
    }
}

enum Slot {
    Loading,
    Ready {
        handle: egui::TextureHandle,
        last_used: u64,
    },
    Failed,
}

/// GPU textures keyed by what they show. Least recently drawn textures are
/// released once `limit` is exceeded.
pub struct TextureCache {
    slots: HashMap<TextureKey, Slot>,
    limit: usize,
    frame: u64,
}

impl TextureCache {
    pub fn new(limit: usize) -> Self {
        Self {
            slots: HashMap::new(),
            limit: limit.max(1),
            frame: 0,
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    pub fn get(&mut self, key: &TextureKey) -> Option<egui::TextureHandle> {
        match self.slots.get_mut(key) {
            Some(Slot::Ready { handle, last_used }) => {
                *last_used = self.frame;
                Some(handle.clone())
            }
            _ => None,
        }
    }

    /// `true` the first time `key` is seen; the caller must start the load.
    pub fn claim(&mut self, key: &TextureKey) -> bool {
        if self.slots.contains_key(key) {
            return false;
        }
        self.slots.insert(key.clone(), Slot::Loading);
        true
    }

    pub fn is_failed(&self, key: &TextureKey) -> bool {
        matches!(self.slots.get(key), Some(Slot::Failed))
    }

    pub fn insert(&mut self, ctx: &egui::Context, key: TextureKey, image: egui::ColorImage) {
        // Dropped while loading (cache cleared); the image is no longer wanted.
        if !self.slots.contains_key(&key) {
            return;
        }
        let handle = ctx.load_texture(key.name(), image, egui::TextureOptions::LINEAR);
        self.slots.insert(
            key,
            Slot::Ready {
                handle,
                last_used: self.frame,
            },
        );
        self.evict();
    }

    pub fn mark_failed(&mut self, key: TextureKey) {
        if self.slots.contains_key(&key) {
            self.slots.insert(key, Slot::Failed);
        }
    }

    /// Release point textures that belong to an older point set.
    pub fn retain_points(&mut self, generation: u64) {
        self.slots.retain(|key, _| match key {
            TextureKey::Point { generation: g, .. } => *g == generation,
            _ => true,
        });
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, Slot::Ready { .. }))
            .count()
    }

    fn evict(&mut self) {
        let ready = self.len();
        if ready <= self.limit {
            return;
        }
        let mut by_age: Vec<(u64, TextureKey)> = self
            .slots
            .iter()
            .filter_map(|(k, s)| match s {
                // Textures drawn this frame stay.
                Slot::Ready { last_used, .. } if *last_used < self.frame => {
                    Some((*last_used, k.clone()))
                }
                _ => None,
            })
            .collect();
        by_age.sort_by_key(|(age, _)| *age);
        for (_, key) in by_age.into_iter().take(ready - self.limit) {
            self.slots.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_key(generation: u64, id: &str) -> TextureKey {
        TextureKey::Point {
            generation,
            id: PointId::new(id),
        }
    }

    #[test]
    fn test_point_keys_differ_across_generations() {
        assert_ne!(point_key(1, "0"), point_key(2, "0"));
        assert_eq!(point_key(2, "0").name(), "point:2:0");
    }

    #[test]
    fn test_retain_points_drops_older_generations() {
        let mut cache = TextureCache::new(8);
        let thumb = TextureKey::Thumbnail(ImageRef::new("a.jpg"));
        assert!(cache.claim(&point_key(1, "0")));
        assert!(cache.claim(&point_key(2, "0")));
        assert!(cache.claim(&thumb));

        cache.retain_points(2);

        // Released keys can be claimed again; kept ones cannot.
        assert!(cache.claim(&point_key(1, "0")));
        assert!(!cache.claim(&point_key(2, "0")));
        assert!(!cache.claim(&thumb));
    }
}
