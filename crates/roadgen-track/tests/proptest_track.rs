//! Property tests for segment generation, sampling, rasterization and the
//! two-segment track lifecycle.
//!
//! Seeds and origins are generated by `proptest`; every segment is built from
//! a [`SeededSource`] so failures shrink to a reproducible case.

use proptest::prelude::*;
use roadgen_track::prelude::*;
use roadgen_track::raster::collect_scanlines;

/// Strategy for finite origin coordinates on a 1/100 grid.
fn coord() -> impl Strategy<Value = f64> {
    (-1_000_000i32..1_000_000i32).prop_map(|v| v as f64 * 0.01)
}

fn rerolled(seed: u64, x: f64, y: f64, config: &TrackConfig) -> CurveSegment {
    CurveSegment::rerolled(Point2::new(x, y), config, &mut SeededSource::new(seed))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn reroll_advances_more_than_a_viewport(seed in any::<u64>(), x in coord(), y in coord()) {
        let config = TrackConfig::default();
        let s = rerolled(seed, x, y, &config);
        prop_assert!(s.end.y < s.origin.y);
        prop_assert!(s.end.y <= s.origin.y - config.viewport_height);
    }

    #[test]
    fn evaluate_interpolates_endpoints(seed in any::<u64>(), x in coord(), y in coord()) {
        let s = rerolled(seed, x, y, &TrackConfig::default());
        prop_assert_eq!(evaluate(&s, 0.0), s.origin);
        prop_assert_eq!(evaluate(&s, 1.0), s.end);
    }

    #[test]
    fn contains_y_matches_closed_range(seed in any::<u64>(), y in coord(), probe in -200.0f64..200.0) {
        let s = rerolled(seed, 0.0, y, &TrackConfig::default());
        prop_assert!(s.contains_y(s.origin.y));
        prop_assert!(s.contains_y(s.end.y));
        let q = y + probe;
        prop_assert_eq!(s.contains_y(q), q >= s.end.y && q <= s.origin.y);
    }

    #[test]
    fn scanlines_cover_the_span_without_gaps(seed in any::<u64>(), x in coord(), y in coord()) {
        let config = TrackConfig::default();
        let s = rerolled(seed, x, y, &config);
        let lines = collect_scanlines(&s, config.raster_step).unwrap();

        let first = s.origin.y.ceil() as i64;
        let last = s.end.y.floor() as i64;
        prop_assert_eq!(lines.first().map(|l| l.y), Some(first));
        prop_assert_eq!(lines.last().map(|l| l.y), Some(last));
        for pair in lines.windows(2) {
            prop_assert_eq!(pair[1].y, pair[0].y - 1);
        }
    }

    #[test]
    fn closest_x_at_endpoints(seed in any::<u64>(), x in coord(), y in coord()) {
        let config = TrackConfig::default();
        let s = rerolled(seed, x, y, &config);
        // Curves are horizontal at both ends, so one step of slack is ample.
        prop_assert!((closest_x(&s, s.origin.y, config.locate_step) - s.origin.x).abs() < 0.05);
        prop_assert!((closest_x(&s, s.end.y, config.locate_step) - s.end.x).abs() < 0.05);
    }

    #[test]
    fn queries_are_pure(seed in any::<u64>(), t in 0.0f64..=1.0, probe in -100.0f64..0.0) {
        let config = TrackConfig::default();
        let s = rerolled(seed, 0.0, 0.0, &config);
        prop_assert_eq!(evaluate(&s, t), evaluate(&s, t));
        prop_assert_eq!(
            closest_x(&s, probe, config.locate_step),
            closest_x(&s, probe, config.locate_step)
        );
    }

    #[test]
    fn taller_viewports_rasterize_with_validated_steps(seed in any::<u64>(), h in 20.0f64..600.0) {
        let max_span = h + 2.0 + (h / 3.0).floor();
        let config = TrackConfig {
            viewport_height: h,
            raster_step: 0.4 / (2.25 * max_span),
            ..Default::default()
        };
        prop_assert!(config.validate().is_ok());
        let s = rerolled(seed, 0.0, 0.0, &config);
        prop_assert!(collect_scanlines(&s, config.raster_step).is_ok());
    }

    #[test]
    fn track_junction_stays_closed(seed in any::<u64>(), ticks in 1usize..400) {
        let mut rng = SeededSource::new(seed);
        let mut track = TrackManager::new(TrackConfig::default(), Point2::new(0.0, 14.4), &mut rng).unwrap();
        let mut cutoff = 14.4;
        for _ in 0..ticks {
            cutoff -= 0.75;
            if let Some(slot) = track.advance_if_needed(cutoff, &mut rng) {
                prop_assert_eq!(track.segment(slot).origin, track.segment(slot.other()).end);
            }
        }
    }
}
