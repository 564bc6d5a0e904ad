// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Property-based tests for connectivity, correction and the packed format.

use proptest::collection::vec;
use proptest::prelude::*;
use wave_merge::geometry::{Brick, Color, Connectivity, Geometry, Token};
use wave_merge::merge::corrected_total;
use wave_merge::wave::{
    BaseSymmetry, Batch, BatchReader, Counts, PackedLayout, PackedReader, PackedWriter,
    ReaderOptions, Report,
};

fn connectivity(tail: &[u8]) -> Connectivity {
    let colors: Vec<Color> = tail.iter().map(|&c| Color::new(c)).collect();
    Connectivity::new(&colors)
}

/// Two descriptors for the same base.
fn descriptor_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (2usize..=9).prop_flat_map(|base| (vec(0u8..8, base - 1), vec(0u8..8, base - 1)))
}

fn report_strategy(base: u8) -> impl Strategy<Value = Report> {
    let quarter = base % 4 == 0;
    (
        vec(1u8..=9, 1..=2),
        vec(0u8..8, base as usize - 1),
        any::<u32>(),
        any::<u16>(),
        any::<u8>(),
    )
        .prop_map(move |(digits, tail, all, s180, s90)| {
            let token: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
            Report {
                token: token.parse().unwrap(),
                connectivity: connectivity(&tail),
                geometry: None,
                base_symmetry: BaseSymmetry::NONE,
                counts: Counts::new(
                    all as u128,
                    s180 as u128,
                    if quarter { s90 as u128 } else { 0 },
                ),
            }
        })
}

fn symmetry_strategy(base: u8) -> BoxedStrategy<BaseSymmetry> {
    if base % 4 == 0 {
        prop_oneof![
            Just(BaseSymmetry::NONE),
            Just(BaseSymmetry::HALF),
            Just(BaseSymmetry::QUARTER),
        ]
        .boxed()
    } else {
        prop_oneof![Just(BaseSymmetry::NONE), Just(BaseSymmetry::HALF)].boxed()
    }
}

fn geometry_strategy(base: u8) -> impl Strategy<Value = Geometry> {
    vec((any::<bool>(), any::<i16>(), any::<i16>()), base as usize - 1).prop_map(|bricks| {
        let bricks = bricks
            .into_iter()
            // The origin only holds a horizontal brick.
            .map(|(vertical, x, y)| Brick::new(vertical && (x, y) != (0, 0), x, y).unwrap())
            .collect();
        Geometry(bricks)
    })
}

/// One base block: every report shares its symmetry and, for the brick
/// header layout, its geometry.
fn batch_strategy(base: u8, layout: PackedLayout) -> impl Strategy<Value = Batch> {
    (
        symmetry_strategy(base),
        geometry_strategy(base),
        vec(report_strategy(base), 1..6),
    )
        .prop_map(move |(symmetry, geometry, mut reports)| {
            for report in &mut reports {
                report.base_symmetry = symmetry;
                report.geometry = (layout == PackedLayout::BrickHeader).then(|| geometry.clone());
            }
            Batch::new(reports)
        })
}

fn stream_strategy() -> impl Strategy<Value = (u8, PackedLayout, Vec<Batch>)> {
    let layout = prop_oneof![Just(PackedLayout::Compact), Just(PackedLayout::BrickHeader)];
    (3u8..=8, layout).prop_flat_map(|(base, layout)| {
        (Just(base), Just(layout), vec(batch_strategy(base, layout), 0..4))
    })
}

proptest! {
    #[test]
    fn prop_connected_is_symmetric((a, b) in descriptor_pair()) {
        let (a, b) = (connectivity(&a), connectivity(&b));
        prop_assert_eq!(a.connected(&b), b.connected(&a));
    }

    #[test]
    fn prop_self_connected_joins_anything((a, b) in descriptor_pair()) {
        let (a, b) = (connectivity(&a), connectivity(&b));
        if a.is_self_connected() {
            prop_assert!(a.connected(&b));
        }
    }

    #[test]
    fn prop_half_turn_correction(
        asymmetric_pairs in 0u64..1_000_000,
        symmetric in 0u64..1_000_000
    ) {
        let all = 2 * asymmetric_pairs as u128 + symmetric as u128;
        let raw = Counts::new(all, symmetric as u128, 0);
        let token: Token = "131".parse().unwrap();
        let corrected = corrected_total(&raw, BaseSymmetry::HALF, &token).unwrap();
        prop_assert_eq!(corrected, asymmetric_pairs as u128 + symmetric as u128);

        let odd = Counts::new(all + 1, symmetric as u128, 0);
        prop_assert!(corrected_total(&odd, BaseSymmetry::HALF, &token).is_err());
    }

    #[test]
    fn prop_packed_batches_survive_encoding((base, layout, batches) in stream_strategy()) {
        let mut writer = PackedWriter::new(Vec::new(), base, layout).unwrap();
        for batch in &batches {
            writer.write_batch(batch).unwrap();
        }
        let bytes = writer.finish().unwrap();

        let options = ReaderOptions { layout, verify_trailer: true };
        let mut reader = PackedReader::new(&bytes[..], base, options, "prop").unwrap();
        for batch in &batches {
            let next = reader.next_batch().unwrap();
            prop_assert_eq!(next.as_ref(), Some(batch));
        }
        prop_assert!(reader.next_batch().unwrap().is_none());
    }
}
