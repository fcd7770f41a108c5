//! Media sources used to simulate uploads

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{MediaItem, MediaKind};

/// Supplies media items for the composer library
pub trait MediaSource {
    /// Produce `count` fresh items with unique IDs
    fn random_items(&mut self, count: usize) -> Vec<MediaItem>;
}

/// Generates placeholder images and videos
pub struct MockMediaSource {
    rng: StdRng,
    generated: usize,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic source for tests and reproducible demos
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self { rng, generated: 0 }
    }

    fn next_item(&mut self) -> MediaItem {
        self.generated += 1;
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string();
        let kind = if self.rng.gen_ratio(1, 4) {
            MediaKind::Video
        } else {
            MediaKind::Image
        };

        let (display_name, full_url) = match kind {
            MediaKind::Image => (
                format!("IMG_{:04}.jpg", self.generated),
                format!("https://picsum.photos/seed/{}/1080/1080", id),
            ),
            MediaKind::Video => (
                format!("VID_{:04}.mp4", self.generated),
                format!("https://media.postdeck.test/video/{}.mp4", id),
            ),
        };
        let thumbnail_url = format!("https://picsum.photos/seed/{}/240/240", id);

        MediaItem {
            id,
            kind,
            display_name,
            full_url,
            thumbnail_url,
        }
    }
}

impl Default for MockMediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for MockMediaSource {
    fn random_items(&mut self, count: usize) -> Vec<MediaItem> {
        (0..count).map(|_| self.next_item()).collect()
    }
}
