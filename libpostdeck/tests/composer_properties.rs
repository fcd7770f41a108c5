//! Randomized operation sequences against the composer invariants
//!
//! Each test replays a few hundred seeded sequences so failures are
//! reproducible from the printed seed.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use libpostdeck::composer::{Composer, ScheduleField};
use libpostdeck::types::{MediaItem, MediaKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const PLATFORMS: &[&str] = &[
    "instagram",
    "facebook",
    "tiktok",
    "x",
    "linkedin",
    "youtube",
    "pinterest",
    "threads",
    "google_business",
];

const SEEDS: u64 = 200;
const STEPS: usize = 60;

fn media(id: usize) -> MediaItem {
    MediaItem {
        id: format!("m{}", id),
        kind: if id % 3 == 0 {
            MediaKind::Video
        } else {
            MediaKind::Image
        },
        display_name: format!("asset-{}", id),
        full_url: format!("https://cdn.example.com/{}", id),
        thumbnail_url: format!("https://cdn.example.com/{}/thumb", id),
    }
}

fn random_items(rng: &mut StdRng) -> Vec<MediaItem> {
    let count = rng.gen_range(1..=6);
    (0..count).map(|_| media(rng.gen_range(0..40))).collect()
}

fn selected(composer: &Composer) -> Vec<String> {
    composer.channels().ids().map(str::to_string).collect()
}

fn pick_selected(rng: &mut StdRng, composer: &Composer) -> Option<String> {
    selected(composer).choose(rng).cloned()
}

fn assert_no_trace(composer: &Composer, platform_id: &str, seed: u64) {
    assert!(
        composer.captions().channel_caption(platform_id).is_none(),
        "seed {}: caption left for {}",
        seed,
        platform_id
    );
    assert!(
        composer.media().selection(platform_id).is_none(),
        "seed {}: media left for {}",
        seed,
        platform_id
    );
    assert!(composer.customization(platform_id).is_none());
    assert!(composer.options().values_for(platform_id).is_empty());
    assert!(composer.schedule().entry(platform_id).is_none());
}

/// One random mutation; returns the removed channel when the step was a removal
fn random_step(rng: &mut StdRng, composer: &mut Composer) -> Option<String> {
    match rng.gen_range(0..10) {
        0 | 1 => {
            let id = PLATFORMS.choose(rng).copied().unwrap_or("x");
            composer.add_channel(id, None).unwrap();
        }
        2 => {
            if let Some(id) = pick_selected(rng, composer) {
                assert!(composer.remove_channel(&id));
                return Some(id);
            }
        }
        3 => {
            if let Some(id) = pick_selected(rng, composer) {
                composer
                    .edit_channel_caption(&id, format!("caption {}", rng.gen::<u16>()))
                    .unwrap();
            }
        }
        4 => {
            if let Some(id) = pick_selected(rng, composer) {
                composer.apply_caption_to_all(&id).unwrap();
            }
        }
        5 => {
            composer.add_master_media(random_items(rng));
        }
        6 => {
            if let Some(id) = pick_selected(rng, composer) {
                composer.add_media_to_channel(&id, random_items(rng)).unwrap();
            }
        }
        7 => {
            if let Some(id) = pick_selected(rng, composer) {
                let held: Vec<String> = composer
                    .effective_media(&id)
                    .iter()
                    .map(|m| m.id.clone())
                    .collect();
                let media_id = held
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| format!("m{}", rng.gen_range(0..40)));
                composer.remove_media_from_channel(&id, &media_id).unwrap();
            }
        }
        8 => {
            let mut master: Vec<MediaItem> = composer
                .media()
                .master_media()
                .iter()
                .map(|m| (**m).clone())
                .collect();
            master.shuffle(rng);
            master.truncate(rng.gen_range(0..=master.len()));
            composer.replace_master_media(master);
        }
        _ => {
            if let Some(id) = pick_selected(rng, composer) {
                let date = NaiveDate::from_ymd_opt(2024, 6, rng.gen_range(1..=30));
                composer
                    .set_schedule_field(&id, ScheduleField::Date(date))
                    .unwrap();
                if id == "x" {
                    composer
                        .set_option_from_str(&id, "reply_settings", "Everyone")
                        .unwrap();
                }
            }
        }
    }
    None
}

#[test]
fn test_cascade_and_referential_integrity() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut composer = Composer::with_defaults();
        composer.set_master_caption("Base caption");

        for _ in 0..STEPS {
            let removed = random_step(&mut rng, &mut composer);

            assert!(
                composer.check_integrity().is_ok(),
                "seed {}: {:?}",
                seed,
                composer.check_integrity()
            );
            assert!(composer.media().master_media().len() <= 20, "seed {}", seed);
            for (platform_id, selection) in composer.media().selections() {
                for item in selection {
                    assert!(
                        composer
                            .media()
                            .master_media()
                            .iter()
                            .any(|m| m.id == item.id),
                        "seed {}: {} holds {} outside master",
                        seed,
                        platform_id,
                        item.id
                    );
                }
            }
            if let Some(id) = removed {
                assert_no_trace(&composer, &id, seed);
            }
        }
    }
}

#[test]
fn test_template_adoption_until_first_edit() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut composer = Composer::with_defaults();
        let master = format!("  launch {}  ", seed);
        composer.set_master_caption(master.clone());

        let mut frozen = false;
        for _ in 0..STEPS {
            let was_empty = composer.channels().is_empty();
            match rng.gen_range(0..6) {
                0..=2 => {
                    let id = PLATFORMS.choose(&mut rng).copied().unwrap_or("x");
                    if composer.add_channel(id, None).unwrap() {
                        let expected = if was_empty || !frozen {
                            master.trim()
                        } else {
                            ""
                        };
                        assert_eq!(
                            composer.effective_caption(id),
                            expected,
                            "seed {}: {} after frozen={}",
                            seed,
                            id,
                            frozen
                        );
                    }
                }
                3 | 4 => {
                    if let Some(id) = pick_selected(&mut rng, &composer) {
                        composer.remove_channel(&id);
                        if composer.channels().is_empty() {
                            frozen = false;
                        }
                    }
                }
                _ => {
                    if let Some(id) = pick_selected(&mut rng, &composer) {
                        composer.edit_channel_caption(&id, "hand edit").unwrap();
                        frozen = true;
                    }
                }
            }
        }
    }
}

#[test]
fn test_apply_to_all_is_idempotent() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut composer = Composer::with_defaults();
        composer.set_master_caption("Shared");

        for _ in 0..20 {
            random_step(&mut rng, &mut composer);
        }
        let Some(source) = pick_selected(&mut rng, &composer) else {
            continue;
        };

        let captions = |composer: &Composer| -> BTreeMap<String, String> {
            composer
                .captions()
                .channel_captions()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        let now = Instant::now();
        composer.apply_caption_to_all_at(&source, now).unwrap();
        let first = captions(&composer);
        composer.apply_caption_to_all_at(&source, now).unwrap();
        let second = captions(&composer);

        assert_eq!(first, second, "seed {}", seed);
        let expected = composer.effective_caption(&source).to_string();
        assert!(first.values().all(|c| *c == expected), "seed {}", seed);
    }
}
