use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use timeline_rs::TimelineError;
use timeline_rs::api::{
    BandConfig, ENGINE_SNAPSHOT_JSON_SCHEMA_V1, EngineSnapshot, PluginEvent, TimelineEngine,
    TimelineEngineConfig,
};
use timeline_rs::core::{
    HotZone, MS_PER_DAY, RawEvent, RawHotZone, TickConfig, TickStep, TimePoint, TimeUnit,
    TimelineEvent,
};
use timeline_rs::extensions::{PluginContext, TimelinePlugin};
use timeline_rs::interaction::{
    FocusTarget, InteractionMode, Key, KeyInput, NoopPointerCapture, PointerInput,
};
use timeline_rs::sync::SyncState;

struct EventLog {
    events: Rc<RefCell<Vec<PluginEvent>>>,
}

impl TimelinePlugin for EventLog {
    fn id(&self) -> &str {
        "event-log"
    }

    fn on_event(&mut self, event: &PluginEvent, _context: &PluginContext) {
        self.events.borrow_mut().push(event.clone());
    }
}

fn attach_log(engine: &mut TimelineEngine) -> Rc<RefCell<Vec<PluginEvent>>> {
    let events: Rc<RefCell<Vec<PluginEvent>>> = Rc::default();
    engine
        .register_plugin(Box::new(EventLog {
            events: Rc::clone(&events),
        }))
        .expect("register log");
    events
}

/// Overview band at a tenth of the detail band's scale, detail is master.
fn two_band_engine() -> TimelineEngine {
    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("overview", 0.1).with_sync_ratio(0.1))
        .with_band(BandConfig::new("detail", 1.0).master());
    TimelineEngine::new(config).expect("engine")
}

fn point(id: &str, at_ms: i64) -> TimelineEvent {
    TimelineEvent::point(id, TimePoint::from_millis(at_ms), id)
}

#[test]
fn debug_output_summarizes_engine_state() {
    let mut engine = two_band_engine();
    engine.set_events(vec![point("a", 0), point("b", 10)]);
    let text = format!("{engine:?}");
    assert!(text.starts_with("TimelineEngine"));
    assert!(text.contains(r#"bands: ["overview", "detail"]"#));
    assert!(text.contains("events: 2"));
    assert!(text.contains("sync_state: Idle"));
}

#[test]
fn config_validation_rejects_bad_setups() {
    let err = TimelineEngine::new(TimelineEngineConfig::new(TimePoint::from_millis(0)))
        .expect_err("no bands");
    assert!(matches!(err, TimelineError::InvalidData(_)));

    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("a", 1.0))
        .with_band(BandConfig::new("a", 2.0));
    let err = TimelineEngine::new(config).expect_err("duplicate");
    assert_eq!(err, TimelineError::DuplicateBand("a".to_owned()));

    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("a", 1.0))
        .with_base_magnification(0.0);
    let err = TimelineEngine::new(config).expect_err("base magnification");
    assert!(matches!(err, TimelineError::InvalidData(_)));

    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("a", -1.0));
    let err = TimelineEngine::new(config).expect_err("negative scale");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));

    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("a", 1.0).with_sync_ratio(0.0));
    let err = TimelineEngine::new(config).expect_err("sync ratio");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}

#[test]
fn config_loads_from_minimal_json() {
    let config = TimelineEngineConfig::from_json_str(
        r#"{"bands": [{"id": "years", "base_pixels_per_ms": 0.5, "is_master": true}]}"#,
    )
    .expect("config");
    assert_eq!(config.initial_center, TimePoint::from_millis(0));
    assert_eq!(config.bands[0].pixel_width, 1_000.0);
    assert!(config.bands[0].apply_hot_zones);

    let json = config.to_json_pretty().expect("serialize");
    let reloaded = TimelineEngineConfig::from_json_str(&json).expect("reload");
    assert_eq!(reloaded.bands.len(), 1);
    assert_eq!(reloaded.bands[0].id, "years");
    assert!(reloaded.bands[0].is_master);

    let err = TimelineEngineConfig::from_json_str("{").expect_err("broken json");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}

#[test]
fn bands_share_initial_center_and_primary_is_master() {
    let config = TimelineEngineConfig::new(TimePoint::from_millis(5_000))
        .with_band(BandConfig::new("a", 1.0))
        .with_band(BandConfig::from_interval("b", TimeUnit::Second, 100.0).master());
    let engine = TimelineEngine::new(config).expect("engine");

    assert_eq!(engine.band_ids(), vec!["a", "b"]);
    assert_eq!(engine.primary_band(), Some("b"));
    for band_id in ["a", "b"] {
        let viewport = engine.viewport(band_id).expect("viewport");
        assert_abs_diff_eq!(viewport.center_ms(), 5_000.0);
    }
    assert_abs_diff_eq!(
        engine.viewport("b").expect("b").pixels_per_ms(),
        0.1,
        epsilon = 1e-12
    );

    let err = engine.viewport("missing").expect_err("unknown band");
    assert_eq!(err, TimelineError::UnknownBand("missing".to_owned()));
}

#[test]
fn added_bands_follow_primary_center_and_can_be_removed() {
    let mut engine = two_band_engine();
    engine.center_on(TimePoint::from_millis(42_000));
    engine
        .add_band(BandConfig::new("extra", 2.0))
        .expect("add band");
    assert_abs_diff_eq!(
        engine.viewport("extra").expect("extra").center_ms(),
        42_000.0
    );
    assert!(engine.sync().contains("extra"));

    let err = engine
        .add_band(BandConfig::new("extra", 2.0))
        .expect_err("duplicate");
    assert_eq!(err, TimelineError::DuplicateBand("extra".to_owned()));

    assert!(engine.remove_band("extra"));
    assert!(!engine.remove_band("extra"));
    assert!(!engine.sync().contains("extra"));
    assert_eq!(engine.band_count(), 2);
}

#[test]
fn dragging_one_band_scrolls_the_other_by_ratio() {
    let mut engine = two_band_engine();
    let mut capture = NoopPointerCapture;

    engine
        .pointer_down("detail", PointerInput::mouse(100.0, 0.0), &mut capture)
        .expect("down");
    let moved = engine
        .pointer_move("detail", PointerInput::mouse(150.0, 10.0))
        .expect("move");
    assert_abs_diff_eq!(moved.pan_px, 50.0);

    assert_abs_diff_eq!(engine.viewport("detail").expect("detail").center_ms(), -50.0);
    assert_abs_diff_eq!(
        engine.viewport("overview").expect("overview").center_ms(),
        -50.0,
        epsilon = 1e-9
    );
    assert_eq!(engine.sync().state(), &SyncState::Idle);

    for x in [160.0, 170.0] {
        engine
            .pointer_move("detail", PointerInput::mouse(x, 12.0))
            .expect("move");
    }
    assert_abs_diff_eq!(engine.viewport("detail").expect("detail").center_ms(), -70.0);
    assert_abs_diff_eq!(
        engine.viewport("overview").expect("overview").center_ms(),
        -70.0,
        epsilon = 1e-9
    );
}

#[test]
fn bands_stay_in_step_across_moves_within_one_frame() {
    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("detail", 10.0).master().with_sync_ratio(0.1))
        .with_band(BandConfig::new("overview", 10.0).with_sync_ratio(0.1));
    let mut engine = TimelineEngine::new(config).expect("engine");
    let mut capture = NoopPointerCapture;

    engine
        .pointer_down("detail", PointerInput::mouse(0.0, 0.0), &mut capture)
        .expect("down");
    for step in 1..=5 {
        let x = f64::from(step) * 10.0;
        engine
            .pointer_move("detail", PointerInput::mouse(x, f64::from(step)))
            .expect("move");
    }
    engine.scroll_band("detail", 10.0).expect("scroll").expect("propagated");
    engine.on_animation_frame(16.0);

    let detail = engine.viewport("detail").expect("detail").center_ms();
    let overview = engine.viewport("overview").expect("overview").center_ms();
    assert_abs_diff_eq!(detail, -6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(overview, detail, epsilon = 1e-9);
}

#[test]
fn programmatic_scroll_propagates_and_fires_callbacks() {
    let mut engine = two_band_engine();
    let received: Rc<RefCell<Vec<(String, f64)>>> = Rc::default();
    let sink = Rc::clone(&received);
    engine.set_global_scroll_callback(Some(Box::new(move |band_id, delta| {
        sink.borrow_mut().push((band_id.to_owned(), delta));
    })));

    let propagation = engine
        .scroll_band("overview", 10.0)
        .expect("scroll")
        .expect("propagated");
    assert_abs_diff_eq!(
        propagation.delta_for("detail").expect("detail"),
        100.0,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        engine.viewport("detail").expect("detail").center_ms(),
        -100.0,
        epsilon = 1e-9
    );

    let received = received.borrow();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].0, "detail");
    assert_eq!(received[1], ("overview".to_owned(), 10.0));

    let err = engine.scroll_band("overview", f64::NAN).expect_err("nan");
    assert!(matches!(err, TimelineError::InvalidData(_)));
    let err = engine.scroll_band("nope", 1.0).expect_err("unknown");
    assert!(matches!(err, TimelineError::UnknownBand(_)));
}

#[test]
fn momentum_runs_through_animation_frames() {
    let mut engine = two_band_engine();
    let mut capture = NoopPointerCapture;
    engine
        .pointer_down("detail", PointerInput::mouse(100.0, 0.0), &mut capture)
        .expect("down");
    engine
        .pointer_move("detail", PointerInput::mouse(150.0, 10.0))
        .expect("move");
    let up = engine
        .pointer_up("detail", PointerInput::mouse(150.0, 10.0), &mut capture)
        .expect("up");
    assert!(up.momentum_started);
    assert_eq!(
        engine.interaction_mode("detail").expect("mode"),
        InteractionMode::Momentum
    );

    let before = engine.viewport("overview").expect("overview").center_ms();
    assert!(engine.on_animation_frame(16.0));
    let after = engine.viewport("overview").expect("overview").center_ms();
    assert!(after < before, "follower should keep moving back in time");

    let mut frames = 1;
    while engine.on_animation_frame(16.0) {
        frames += 1;
        assert!(frames < 1_000);
    }
    assert_eq!(
        engine.interaction_mode("detail").expect("mode"),
        InteractionMode::Idle
    );
}

#[test]
fn keyboard_and_zoom_apply_to_the_targeted_band() {
    let mut engine = two_band_engine();
    let outcome = engine
        .key(
            "detail",
            KeyInput {
                key: Key::ArrowRight,
                focus: FocusTarget::Band { is_primary: true },
            },
        )
        .expect("key");
    assert!(outcome.prevent_default);
    assert_abs_diff_eq!(
        engine.viewport("detail").expect("detail").center_ms(),
        100.0,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        engine.viewport("overview").expect("overview").center_ms(),
        100.0,
        epsilon = 1e-6
    );

    // Band focus is checked against the engine's primary band.
    let outcome = engine
        .key(
            "overview",
            KeyInput {
                key: Key::ArrowRight,
                focus: FocusTarget::Band { is_primary: true },
            },
        )
        .expect("key");
    assert!(!outcome.handled);
    assert_abs_diff_eq!(
        engine.viewport("overview").expect("overview").center_ms(),
        100.0,
        epsilon = 1e-6
    );
    let outcome = engine
        .key(
            "detail",
            KeyInput {
                key: Key::ArrowLeft,
                focus: FocusTarget::Band { is_primary: false },
            },
        )
        .expect("key");
    assert!(outcome.handled);
    assert_abs_diff_eq!(
        engine.viewport("detail").expect("detail").center_ms(),
        0.0,
        epsilon = 1e-9
    );

    assert!(engine.set_band_zoom("overview", 4.0).expect("zoom"));
    assert!(!engine.set_band_zoom("overview", 4.0).expect("same zoom"));
    assert_abs_diff_eq!(
        engine.viewport("overview").expect("overview").pixels_per_ms(),
        0.4,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(engine.viewport("detail").expect("detail").zoom_level(), 1.0);
}

#[test]
fn raw_data_is_parsed_with_a_report() {
    let mut engine = two_band_engine();
    let log = attach_log(&mut engine);
    let raw: Vec<RawEvent> = serde_json::from_str(
        r#"[
            {"start": "1970-01-01", "title": "Epoch"},
            {"start": "not a date", "title": "Broken"},
            {"start": "1970-01-02", "end": "1970-01-05", "title": "Span"}
        ]"#,
    )
    .expect("json");

    let report = engine.set_raw_events(&raw);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(engine.events().len(), 2);
    assert_eq!(
        log.borrow().last(),
        Some(&PluginEvent::DataUpdated {
            events_len: 2,
            skipped: 1,
        })
    );

    let zones: Vec<RawHotZone> = serde_json::from_str(
        r#"[{"start": "1970", "end": "1971", "magnify": 2}, {"start": "?", "end": "1971"}]"#,
    )
    .expect("json");
    let report = engine.set_raw_hot_zones(&zones).expect("zones");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(engine.hot_zones().len(), 1);
}

#[test]
fn hot_zones_magnify_band_mapping() {
    let mut engine = two_band_engine();
    engine
        .add_hot_zone(
            HotZone::new(
                TimePoint::from_millis(-10_000),
                TimePoint::from_millis(10_000),
                2.0,
            )
            .expect("zone"),
        )
        .expect("add zone");

    let (start, end) = engine.visible_range("detail").expect("range");
    assert_abs_diff_eq!(start, -250.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end, 250.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        engine
            .time_to_pixel("detail", TimePoint::from_millis(0))
            .expect("pixel"),
        500.0,
        epsilon = 1e-9
    );
    assert_eq!(
        engine.pixel_to_time("detail", 750.0).expect("time"),
        TimePoint::from_millis(125)
    );

    let err = engine.remove_hot_zone(3).expect_err("bad index");
    assert_eq!(err, TimelineError::IndexOutOfRange { index: 3, len: 1 });
    engine.clear_hot_zones();
    let (start, end) = engine.visible_range("detail").expect("range");
    assert_abs_diff_eq!(end - start, 1_000.0, epsilon = 1e-9);
}

#[test]
fn bands_can_opt_out_of_hot_zones() {
    let config = TimelineEngineConfig::new(TimePoint::from_millis(0))
        .with_band(BandConfig::new("plain", 1.0).with_hot_zones_applied(false));
    let mut engine = TimelineEngine::new(config).expect("engine");
    engine
        .add_hot_zone(
            HotZone::new(TimePoint::from_millis(-100), TimePoint::from_millis(100), 5.0)
                .expect("zone"),
        )
        .expect("add");
    let (start, end) = engine.visible_range("plain").expect("range");
    assert_abs_diff_eq!(start, -500.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end, 500.0, epsilon = 1e-9);
}

#[test]
fn active_hot_zones_follow_the_viewport() {
    let mut engine = two_band_engine();
    engine
        .set_hot_zones(vec![
            HotZone::new(TimePoint::from_millis(100), TimePoint::from_millis(200), 1.0)
                .expect("near"),
            HotZone::new(
                TimePoint::from_millis(50_000),
                TimePoint::from_millis(60_000),
                1.0,
            )
            .expect("far"),
        ])
        .expect("zones");

    let active = engine.active_hot_zones("detail").expect("active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].start, TimePoint::from_millis(100));

    // The overview band spans ten seconds around the new center.
    engine.center_on(TimePoint::from_millis(50_000));
    assert_eq!(engine.active_hot_zones("overview").expect("active").len(), 1);
}

#[test]
fn band_layout_is_cached_until_inputs_change() {
    let mut engine = two_band_engine();
    engine.set_events(vec![point("a", 0), point("b", 5), point("c", 400)]);
    let log = attach_log(&mut engine);

    let first = engine.band_layout("detail").expect("layout");
    assert_eq!(first.layout.len(), 3);
    assert_eq!(first.layout.track_count, 2);
    assert!(!first.virtualized.is_virtualized);

    let second = engine.band_layout("detail").expect("cached");
    assert_eq!(first, second);
    let computed = |log: &Rc<RefCell<Vec<PluginEvent>>>| {
        log.borrow()
            .iter()
            .filter(|event| matches!(event, PluginEvent::LayoutComputed { .. }))
            .count()
    };
    assert_eq!(computed(&log), 1);

    engine.add_event(point("d", 450));
    let third = engine.band_layout("detail").expect("recomputed");
    assert_eq!(third.layout.len(), 4);
    assert_eq!(computed(&log), 2);

    engine.resize_band("detail", 400.0).expect("resize");
    engine.band_layout("detail").expect("recomputed");
    assert_eq!(computed(&log), 3);

    let err = engine.resize_band("detail", 0.0).expect_err("zero width");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));
}

#[test]
fn large_datasets_are_virtualized_per_band() {
    let config = TimelineEngineConfig::new(TimePoint::from_millis(5_000 * MS_PER_DAY))
        .with_band(BandConfig::from_interval("days", TimeUnit::Day, 10.0));
    let mut engine = TimelineEngine::new(config).expect("engine");
    engine.set_events(
        (0..10_000)
            .map(|day| point(&format!("day-{day}"), day * MS_PER_DAY))
            .collect(),
    );

    let layout = engine.band_layout("days").expect("layout");
    assert!(layout.virtualized.is_virtualized);
    assert!((199..=203).contains(&layout.virtualized.indices.len()));
    assert_eq!(layout.layout.len(), layout.virtualized.indices.len());

    let stats = engine.virtualization_stats("days").expect("stats");
    assert_eq!(stats.total, 10_000);
    assert!(stats.render_percentage < 3.0);

    let visible = engine.visible_events("days").expect("visible");
    assert!((99..=102).contains(&visible.len()));
}

#[test]
fn ticks_use_band_scale_or_zone_unit() {
    let center = TimePoint::from_ymd(2020, 1, 15).expect("date");
    let config = TimelineEngineConfig::new(center)
        .with_band(BandConfig::from_interval("days", TimeUnit::Day, 100.0));
    let mut engine = TimelineEngine::new(config).expect("engine");

    let ticks = engine.ticks("days").expect("ticks");
    assert!((9..=11).contains(&ticks.len()));
    assert!(ticks.iter().all(|tick| tick.unit == TimeUnit::Day));
    assert!(ticks.windows(2).all(|pair| pair[1].x - pair[0].x >= 56.0));
    let (start, end) = engine.visible_range("days").expect("range");
    assert!(
        ticks
            .iter()
            .all(|tick| tick.time.as_f64() >= start.floor() && tick.time.as_f64() <= end.ceil())
    );

    engine
        .add_hot_zone(
            HotZone::new(
                TimePoint::from_ymd(2020, 1, 1).expect("start"),
                TimePoint::from_ymd(2020, 1, 31).expect("end"),
                1.0,
            )
            .expect("zone")
            .with_unit(TimeUnit::Hour),
        )
        .expect("add");
    let ticks = engine.ticks("days").expect("ticks");
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|tick| tick.unit == TimeUnit::Hour));

    engine.set_tick_config(TickConfig {
        forced_step: Some(TickStep::new(TimeUnit::Week, 1).expect("step")),
        ..TickConfig::default()
    });
    let ticks = engine.ticks("days").expect("ticks");
    assert!(ticks.iter().all(|tick| tick.unit == TimeUnit::Week));
}

#[test]
fn snapshot_round_trips_through_json_contract() {
    let mut engine = two_band_engine();
    engine.set_events(vec![point("a", 0)]);
    engine.scroll_band("detail", 20.0).expect("scroll");

    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.bands.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["overview", "detail"]
    );
    assert!(snapshot.bands["detail"].is_master);
    assert_eq!(snapshot.events_len, 1);
    assert_eq!(snapshot.sync_state, SyncState::Idle);

    let json = engine.snapshot_json_contract_v1_pretty().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("value");
    assert_eq!(
        value["schema_version"],
        serde_json::json!(ENGINE_SNAPSHOT_JSON_SCHEMA_V1)
    );

    let parsed = EngineSnapshot::from_json_compat_str(&json).expect("contract");
    assert_eq!(parsed.events_len, 1);
    assert_eq!(parsed.bands.len(), 2);
    assert_eq!(parsed.sync_state, snapshot.sync_state);

    let bare = snapshot.to_json_pretty().expect("bare json");
    let parsed = EngineSnapshot::from_json_compat_str(&bare).expect("bare");
    assert_eq!(parsed.bands.len(), 2);

    let mut future = value;
    future["schema_version"] = serde_json::json!(2);
    let err = EngineSnapshot::from_json_compat_str(&future.to_string()).expect_err("version");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}
