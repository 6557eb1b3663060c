use timeline_rs::TimelineError;
use timeline_rs::core::{
    HotZone, HotZoneResolver, RawHotZone, TimePoint, TimeUnit, parse_hot_zones, parse_time_point,
};

fn date(input: &str) -> TimePoint {
    parse_time_point(input).expect("valid date")
}

fn year_2020_resolver() -> HotZoneResolver {
    let mut resolver = HotZoneResolver::new();
    resolver
        .add_zone(HotZone::new(date("2020-01-01"), date("2020-12-31"), 2.0).expect("year zone"))
        .expect("add year zone");
    resolver
        .add_zone(
            HotZone::new(date("2020-06-01"), date("2020-08-31"), 3.0)
                .expect("summer zone")
                .with_unit(TimeUnit::Week),
        )
        .expect("add summer zone");
    resolver
}

#[test]
fn overlapping_zones_resolve_to_maximum_magnification() {
    let resolver = year_2020_resolver();

    assert_eq!(resolver.magnification_at(date("2020-07-15")), 3.0);
    assert_eq!(resolver.magnification_at(date("2020-03-01")), 2.0);
    assert_eq!(resolver.magnification_at(date("2021-01-01")), 1.0);
}

#[test]
fn resolution_reports_winning_zone_metadata() {
    let resolver = year_2020_resolver();

    let inside = resolver.resolve_at(date("2020-07-15"));
    assert_eq!(inside.unit, Some(TimeUnit::Week));
    assert_eq!(inside.zone.map(|(index, _)| index), Some(1));

    let outside = resolver.resolve_at(date("2019-06-01"));
    assert_eq!(outside.unit, None);
    assert!(outside.zone.is_none());
}

#[test]
fn ties_go_to_earliest_zone() {
    let mut resolver = HotZoneResolver::new();
    resolver
        .add_zone(
            HotZone::new(date("2000"), date("2010"), 2.0)
                .expect("first")
                .with_annotation("first"),
        )
        .expect("add first");
    resolver
        .add_zone(
            HotZone::new(date("2005"), date("2015"), 2.0)
                .expect("second")
                .with_annotation("second"),
        )
        .expect("add second");

    let resolution = resolver.resolve_at(date("2007"));
    let (index, zone) = resolution.zone.expect("covered");
    assert_eq!(index, 0);
    assert_eq!(zone.annotation.as_deref(), Some("first"));
}

#[test]
fn zone_boundaries_are_inclusive() {
    let resolver = year_2020_resolver();
    assert_eq!(resolver.magnification_at(date("2020-06-01")), 3.0);
    assert_eq!(resolver.magnification_at(date("2020-08-31")), 3.0);
    assert_eq!(resolver.magnification_at(date("2020-12-31")), 2.0);
}

#[test]
fn custom_base_magnification_applies_outside_zones() {
    let mut resolver = HotZoneResolver::with_base_magnification(0.5).expect("base");
    resolver
        .add_zone(HotZone::new(date("1900"), date("1950"), 4.0).expect("zone"))
        .expect("add");
    assert_eq!(resolver.magnification_at(date("1800")), 0.5);
    assert_eq!(resolver.magnification_at(date("1920")), 4.0);

    let err = HotZoneResolver::with_base_magnification(0.0).expect_err("zero base");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}

#[test]
fn invalid_zones_are_rejected_without_mutation() {
    let mut resolver = year_2020_resolver();

    let err = HotZone::new(date("2021"), date("2020"), 2.0).expect_err("reversed");
    assert!(matches!(err, TimelineError::InvalidHotZone { .. }));

    let err = HotZone::new(date("2020"), date("2021"), -1.0).expect_err("negative");
    assert!(matches!(err, TimelineError::InvalidHotZone { .. }));

    let mut bad = HotZone::new(date("2020"), date("2021"), 2.0).expect("zone");
    bad.magnify = f64::NAN;
    let err = resolver.add_zone(bad.clone()).expect_err("nan magnify");
    assert!(matches!(err, TimelineError::InvalidHotZone { .. }));
    assert_eq!(resolver.len(), 2);

    let good = HotZone::new(date("1990"), date("1991"), 2.0).expect("zone");
    let err = resolver.set_zones(vec![good, bad]).expect_err("batch");
    assert!(matches!(err, TimelineError::InvalidHotZone { .. }));
    assert_eq!(resolver.len(), 2);
}

#[test]
fn removing_out_of_range_index_fails() {
    let mut resolver = year_2020_resolver();
    let err = resolver.remove_zone(5).expect_err("out of range");
    assert_eq!(err, TimelineError::IndexOutOfRange { index: 5, len: 2 });

    let removed = resolver.remove_zone(1).expect("remove");
    assert_eq!(removed.magnify, 3.0);
    assert_eq!(resolver.magnification_at(date("2020-07-15")), 2.0);
}

#[test]
fn zones_in_range_accepts_either_order() {
    let resolver = year_2020_resolver();
    assert_eq!(
        resolver
            .zones_in_range(date("2020-09-01"), date("2020-05-01"))
            .len(),
        2
    );
    assert_eq!(
        resolver
            .zones_in_range(date("2020-10-01"), date("2020-11-01"))
            .len(),
        1
    );
    assert!(
        resolver
            .zones_in_range(date("2021-02-01"), date("2021-03-01"))
            .is_empty()
    );
}

#[test]
fn segments_cover_query_with_piecewise_magnification() {
    let resolver = year_2020_resolver();
    let start = date("2019-12-01").as_f64();
    let end = date("2021-02-01").as_f64();
    let segments = resolver.segments(start, end);

    let magnifications: Vec<f64> = segments.iter().map(|s| s.magnify).collect();
    assert_eq!(magnifications, vec![1.0, 2.0, 3.0, 2.0, 1.0]);
    assert_eq!(segments.first().map(|s| s.start_ms), Some(start));
    assert_eq!(segments.last().map(|s| s.end_ms), Some(end));
}

#[test]
fn raw_zones_parse_and_skip_invalid_entries() {
    let raw: Vec<RawHotZone> = serde_json::from_str(
        r#"[
            {"start": "1939-09-01", "end": "1945-09-02", "magnify": 5, "unit": "month"},
            {"start": "yesterday", "end": "1945", "magnify": 2},
            {"start": "1950", "end": "1940", "magnify": 2},
            {"start": "1960", "end": "1970"}
        ]"#,
    )
    .expect("json");

    let (zones, report) = parse_hot_zones(&raw);
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].unit, Some(TimeUnit::Month));
    assert_eq!(zones[1].magnify, 1.0);
    let skipped: Vec<usize> = report.skipped.iter().map(|item| item.index).collect();
    assert_eq!(skipped, vec![1, 2]);
    assert!(matches!(
        report.skipped[0].error,
        TimelineError::InvalidDate { .. }
    ));
    assert!(matches!(
        report.skipped[1].error,
        TimelineError::InvalidHotZone { .. }
    ));
}
