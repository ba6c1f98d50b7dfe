//! # Video Memory Churn Test
//!
//! Seeded random sequences against both allocators, checking after every
//! operation that:
//! - no segment holds more tiles than it has, and placed textures never overlap
//! - the param table's used bytes only drop when compaction recovers a hole,
//!   and then by exactly the recovered amount
//! - compaction only moves sprites down and never resizes them
//! - live param rows never overlap unless they are deliberately shared

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::{BuildProfile, ParamSpaceConfig, TextureSpaceConfig};
use tessera_rendering::{
    Alignment, Defrag, HBiasEntry, Padding, ParamSpaceAllocator, ParamSprite, SegmentLayout,
    TextureSpaceAllocator, TextureSpecId, TransformMode,
};

#[test]
fn test_texture_churn_respects_segment_budget() {
    let config = TextureSpaceConfig {
        bgmap_segments: 4,
        shelves_per_segment: 16,
        reserve_printing_segment: true,
    };

    for seed in 0..8 {
        let mut space = TextureSpaceAllocator::new(config, BuildProfile::Shipping).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut padded: Vec<(u16, u16, u16, u16, u16)> = Vec::new();

        for _ in 0..200 {
            let cols = rng.gen_range(1..=24);
            let rows = rng.gen_range(1..=24);
            let padding = Padding::new(rng.gen_range(0..=1), rng.gen_range(0..=1));
            let alignment = if rng.gen_bool(0.1) {
                Alignment::new(rng.gen_range(0..4), Some(SegmentLayout::W2x1))
            } else {
                Alignment::ANY
            };

            let Ok(id) = space.allocate(cols, rows, padding, alignment) else {
                continue;
            };
            let placement = space.placement(id).unwrap();
            padded.push((
                space.segment(id).unwrap(),
                placement.x - padding.cols,
                placement.y - padding.rows,
                cols + padding.cols * 2,
                rows + padding.rows * 2,
            ));
        }

        for segment in 0..4 {
            let placed: u32 = padded
                .iter()
                .filter(|rect| rect.0 == segment)
                .map(|rect| u32::from(rect.3) * u32::from(rect.4))
                .sum();
            assert_eq!(space.used_tiles(segment), Some(placed));
            assert!(placed <= 4096, "segment {segment} over budget: {placed}");
        }

        for (i, a) in padded.iter().enumerate() {
            assert!(a.1 + a.3 <= 64 && a.2 + a.4 <= 64);
            if a.0 == 3 {
                // Printing segment keeps its bottom rows for text.
                assert!(a.2 + a.4 <= 36);
            }
            for b in &padded[i + 1..] {
                let disjoint = a.0 != b.0
                    || a.1 + a.3 <= b.1
                    || b.1 + b.3 <= a.1
                    || a.2 + a.4 <= b.2
                    || b.2 + b.4 <= a.2;
                assert!(disjoint, "seed {seed}: {a:?} overlaps {b:?}");
            }
        }
    }
}

fn snapshot(table: &ParamSpaceAllocator, live: &[ParamSprite]) -> HashMap<u32, (u32, u32)> {
    live.iter()
        .map(|sprite| {
            let offset = table.offset(sprite.handle).unwrap();
            let size = table.size_of(sprite.handle).unwrap();
            (sprite.handle.0, (offset, size))
        })
        .collect()
}

#[test]
fn test_param_churn_only_slides_down() {
    let mut table =
        ParamSpaceAllocator::new(ParamSpaceConfig::default(), BuildProfile::Shipping).unwrap();
    table.configure(2);

    let mut rng = ChaCha8Rng::seed_from_u64(0x0DEF_7A9);
    let mut live: Vec<ParamSprite> = Vec::new();
    let mut next_handle: u32 = 0;

    for _ in 0..5_000 {
        let before = snapshot(&table, &live);
        let used_before = table.used_bytes();

        match rng.gen_range(0..10) {
            0..=3 => {
                next_handle += 1;
                let texture = TextureSpecId(rng.gen_range(0..6));
                let mut sprite = if rng.gen_bool(0.7) {
                    ParamSprite::new(next_handle, texture, rng.gen_range(1..=28), TransformMode::HBias)
                } else {
                    ParamSprite::new(next_handle, texture, rng.gen_range(1..=4), TransformMode::Affine)
                };
                if rng.gen_bool(0.3) {
                    sprite = sprite.shared();
                    // Overlaid rows all come from one description.
                    sprite.texture_rows = 4;
                    sprite.mode = TransformMode::HBias;
                    sprite.texture = TextureSpecId(100 + sprite.texture.0);
                }
                if table.allocate(sprite).is_ok() {
                    live.push(sprite);
                    assert!(table.used_bytes() >= used_before);
                }
            }
            4..=6 if !live.is_empty() => {
                let sprite = live.swap_remove(rng.gen_range(0..live.len()));
                table.free(sprite.handle).unwrap();
                assert_eq!(table.used_bytes(), used_before);
            }
            7 if !live.is_empty() => {
                // The frame loop finishing some row writes.
                let sprite = live[rng.gen_range(0..live.len())];
                if sprite.mode == TransformMode::HBias {
                    let rows = vec![HBiasEntry { left: 1, right: 2 }; 8];
                    let _ = table.write_rows(sprite.handle, &rows, Some(4)).unwrap();
                }
            }
            _ => {
                let pending = table.pending_free();
                match table.defragment(rng.gen_bool(0.8)) {
                    Defrag::Recovered { bytes } => {
                        assert_eq!(Some(bytes), pending.map(|p| p.recovered_bytes));
                        assert_eq!(table.used_bytes(), used_before - bytes);
                        assert_eq!(table.pending_free(), None);
                    }
                    _ => assert_eq!(table.used_bytes(), used_before),
                }
            }
        }

        let after = snapshot(&table, &live);
        for (handle, (offset, size)) in &after {
            if let Some((old_offset, old_size)) = before.get(handle) {
                assert!(offset <= old_offset, "sprite {handle} moved up");
                assert_eq!(size, old_size, "sprite {handle} resized");
            }
            assert!(offset + size <= table.used_bytes());
        }

        let mut ranges: Vec<(u32, u32)> = after.values().copied().collect();
        ranges.sort_unstable();
        ranges.dedup();
        for pair in ranges.windows(2) {
            assert!(pair[0].0 + pair[0].1 <= pair[1].0, "overlap {pair:?}");
        }
    }

    for sprite in live.drain(..) {
        table.free(sprite.handle).unwrap();
    }
    assert!(matches!(
        table.defragment(false),
        Defrag::Idle | Defrag::Recovered { .. }
    ));
    assert!(table.is_empty());
    assert_eq!(table.used_bytes(), 0);
}
