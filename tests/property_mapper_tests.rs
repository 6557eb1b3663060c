use proptest::prelude::*;
use timeline_rs::core::{
    HotZone, HotZoneResolver, LinearTimeMapper, SegmentedTimeMapper, TimeMapping, TimePoint,
    Viewport,
};

fn resolver_from(zones: &[(i64, i64, f64)]) -> HotZoneResolver {
    let mut resolver = HotZoneResolver::new();
    for &(start, len, magnify) in zones {
        let zone = HotZone::new(
            TimePoint::from_millis(start),
            TimePoint::from_millis(start + len),
            magnify,
        )
        .expect("valid zone");
        resolver.add_zone(zone).expect("add zone");
    }
    resolver
}

proptest! {
    #[test]
    fn linear_mapper_round_trips(
        origin in -1.0e12f64..1.0e12,
        pixels_per_ms in 1.0e-9f64..10.0,
        time in -1.0e12f64..1.0e12
    ) {
        let mapper = LinearTimeMapper::new(origin, pixels_per_ms).expect("mapper");
        let back = mapper.pixel_to_ms(mapper.ms_to_pixel(time));
        let tolerance = 1e-6 * (1.0 + time.abs().max(origin.abs()));
        prop_assert!((back - time).abs() <= tolerance);
    }

    #[test]
    fn segmented_mapper_round_trips_and_is_monotonic(
        zones in prop::collection::vec((-50_000i64..50_000, 0i64..20_000, 0.25f64..8.0), 0..6),
        center in -40_000i64..40_000,
        a in -100_000.0f64..100_000.0,
        b in -100_000.0f64..100_000.0
    ) {
        let resolver = resolver_from(&zones);
        let viewport = Viewport::new(TimePoint::from_millis(center), 1_000.0, 0.05)
            .expect("viewport");
        let segments = resolver.segments(-120_000.0, 120_000.0);
        let mapper = SegmentedTimeMapper::for_viewport(&viewport, 1.0, segments)
            .expect("mapper");

        prop_assert!((mapper.ms_to_pixel(center as f64) - 500.0).abs() <= 1e-6);
        for time in [a, b] {
            let back = mapper.pixel_to_ms(mapper.ms_to_pixel(time));
            prop_assert!((back - time).abs() <= 1e-6);
        }
        if a < b {
            prop_assert!(mapper.ms_to_pixel(a) <= mapper.ms_to_pixel(b));
        }
    }

    #[test]
    fn resolved_magnification_is_the_covering_maximum(
        zones in prop::collection::vec((-1_000i64..1_000, 0i64..500, 0.1f64..10.0), 1..8),
        at_ms in -1_500i64..1_500
    ) {
        let resolver = resolver_from(&zones);
        let time = TimePoint::from_millis(at_ms);
        let expected = zones
            .iter()
            .filter(|(start, len, _)| *start <= at_ms && at_ms <= start + len)
            .map(|(_, _, magnify)| *magnify)
            .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
            .unwrap_or(1.0);
        prop_assert_eq!(resolver.magnification_at(time), expected);
    }
}
