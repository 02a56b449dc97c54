mod common;

use common::{digits, Page, ScrollScript};
use folio_motion_core::{
    Config, CountFormat, CoreEvent, ElementId, Engine, MonitorKind, MotionError, Rect, Role,
};

const FRAME_MS: f64 = 16.0;

#[test]
fn counter_reaches_formatted_target_and_stops() {
    let mut page = Page::mount("stats-only");
    page.scroll_to(0.0);
    assert!(page.engine.counter_running("stat-big"));

    page.run_frames(FRAME_MS, 1300.0);
    assert_eq!(page.dom.text("stat-big").as_deref(), Some("1,500"));
    assert!(!page.engine.wants_frame());

    let texts = page.texts("stat-big");
    // first paint is one frame into the ease-out curve
    assert_eq!(texts.first().map(String::as_str), Some("59"));
    let values: Vec<u64> = texts.iter().map(|t| digits(t)).collect();
    assert!(
        values.windows(2).all(|w| w[0] <= w[1]),
        "counter must never count down: {values:?}"
    );

    let finished: Vec<&CoreEvent> = page
        .log
        .iter()
        .flat_map(|o| o.events.iter())
        .filter(|e| matches!(e, CoreEvent::CounterFinished { .. }))
        .collect();
    assert_eq!(finished.len(), 1);
    assert!(matches!(
        finished[0],
        CoreEvent::CounterFinished { target: 1500, .. }
    ));

    // no further updates once complete
    let before = page.texts("stat-big").len();
    page.run_frames(FRAME_MS, 2000.0);
    assert_eq!(page.texts("stat-big").len(), before);
}

#[test]
fn counter_finishes_exactly_at_duration() {
    let mut page = Page::mount("stats-only");
    page.scroll_to(0.0);
    page.run_frames(FRAME_MS, 1184.0);
    assert!(page.engine.counter_running("stat-big"));
    assert_ne!(page.dom.text("stat-big").as_deref(), Some("1,500"));
    page.run_frames(FRAME_MS, 1200.0);
    assert!(!page.engine.counter_running("stat-big"));
    assert_eq!(page.dom.text("stat-big").as_deref(), Some("1,500"));
}

#[test]
fn bars_collapse_on_load() {
    let page = Page::mount("portfolio");
    for bar in page.layout.handles(Role::Bar) {
        assert_eq!(page.dom.node(bar).width.as_deref(), Some("0"), "{bar}");
    }
    for section in page.layout.handles(Role::Section) {
        assert!(page.dom.has_class(section, "reveal"), "{section}");
        assert!(!page.dom.has_class(section, "in"), "{section}");
    }
}

#[test]
fn scripted_scroll_session() {
    let script: ScrollScript = folio_test_fixtures::pages::scroll("portfolio")
        .expect("scroll fixture")
        .expect("portfolio has a scroll script");
    let mut page = Page::mount("portfolio");

    // step 0: top of page
    let step = &script.steps[0];
    page.run_frames(script.frame_ms, step.at_ms);
    page.scroll_to(step.scroll_y);
    assert!(page.dom.has_class("hero", "in"));
    assert!(!page.dom.has_class("about", "in"));
    assert!(!page.engine.counter_running("stat-projects"));

    // step 1: stats scroll into view
    let step = &script.steps[1];
    page.run_frames(script.frame_ms, step.at_ms);
    page.scroll_to(step.scroll_y);
    assert!(page.dom.has_class("about", "in"));
    assert!(page.dom.has_class("hero", "in"), "43% of hero still visible");
    assert!(page.engine.counter_running("stat-projects"));

    // step 2: skills; counters have long finished
    let step = &script.steps[2];
    page.run_frames(script.frame_ms, step.at_ms);
    assert_eq!(page.dom.text("stat-projects").as_deref(), Some("1,500"));
    assert_eq!(page.dom.text("stat-clients").as_deref(), Some("48"));
    assert_eq!(page.dom.text("stat-coffee").as_deref(), Some("0"));
    page.scroll_to(step.scroll_y);
    assert!(!page.dom.has_class("hero", "in"));
    assert!(page.dom.has_class("about", "in"), "20% of about still visible");
    assert!(page.dom.has_class("skills", "in"));
    assert!(page.engine.wants_frame(), "bar writes pending");
    assert_eq!(page.engine.bar_width("bar-rust"), Some("0"));

    // step 3: back to top; bars settled during the frames before it
    let step = &script.steps[3];
    page.run_frames(script.frame_ms, step.at_ms);
    assert_eq!(page.dom.node("bar-rust").width.as_deref(), Some("90%"));
    assert_eq!(page.dom.node("bar-ts").width.as_deref(), Some("75%"));
    assert_eq!(
        page.dom.node("bar-css").width.as_deref(),
        Some("0"),
        "uncaptured bar animates to its collapsed width"
    );
    page.scroll_to(step.scroll_y);
    assert!(page.dom.has_class("hero", "in"));
    assert!(!page.dom.has_class("about", "in"));
    assert!(!page.dom.has_class("skills", "in"));

    // step 4: stats again; counters replay from zero
    let step = &script.steps[4];
    page.run_frames(script.frame_ms, step.at_ms);
    let written_before = page.texts("stat-projects").len();
    page.scroll_to(step.scroll_y);
    assert!(page.engine.counter_running("stat-projects"));
    page.run_frames(script.frame_ms, step.at_ms + script.frame_ms);
    let replay = &page.texts("stat-projects")[written_before..];
    assert_eq!(replay.first().map(String::as_str), Some("59"));
    page.run_frames(script.frame_ms, step.at_ms + 1300.0);
    assert_eq!(page.dom.text("stat-projects").as_deref(), Some("1,500"));
    assert!(!page.engine.wants_frame());
}

#[test]
fn retrigger_restarts_instead_of_racing() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_counter("n", Some("100")).expect("observe");
    eng.report(MonitorKind::Dispatch, "n", 1.0, 0.0).expect("report");
    let mut now = 0.0;
    while now < 600.0 {
        now += FRAME_MS;
        eng.tick(now);
    }
    eng.report(MonitorKind::Dispatch, "n", 0.0, now).expect("leave");
    eng.report(MonitorKind::Dispatch, "n", 1.0, now).expect("re-enter");
    let restart = now;

    let out = eng.tick(now + FRAME_MS);
    let stale = out
        .events
        .iter()
        .filter(|e| matches!(e, CoreEvent::StaleDropped { .. }))
        .count();
    assert_eq!(stale, 1, "the superseded run's frame is dropped");
    let texts: Vec<_> = out
        .changes
        .iter()
        .filter(|c| c.handle() == "n")
        .collect();
    assert_eq!(texts.len(), 1, "exactly one run writes per frame");

    now += FRAME_MS;
    while now < restart + 1184.0 {
        now += FRAME_MS;
        eng.tick(now);
    }
    assert!(eng.counter_running("n"), "restarted run has its own clock");
    let out = eng.tick(restart + 1200.0);
    assert_eq!(out.last_text("n"), Some("100"));
    assert!(!eng.counter_running("n"));
}

#[test]
fn leaving_the_viewport_does_not_cancel() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_counter("n", Some("10")).expect("observe");
    eng.report(MonitorKind::Dispatch, "n", 0.5, 0.0).expect("report");
    eng.report(MonitorKind::Dispatch, "n", 0.0, 10.0).expect("report");
    let out = eng.tick(1200.0);
    assert_eq!(out.last_text("n"), Some("10"));
}

#[test]
fn bar_retrigger_drops_pending_write() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_bar("b", "70%").expect("observe");
    let collapse = eng.drain_outputs();
    assert_eq!(collapse.changes.len(), 1);

    eng.report(MonitorKind::Dispatch, "b", 1.0, 0.0).expect("enter");
    eng.report(MonitorKind::Dispatch, "b", 0.0, 20.0).expect("leave");
    eng.report(MonitorKind::Dispatch, "b", 1.0, 30.0).expect("enter again");
    let out = eng.tick(50.0);
    assert!(
        !out.changes.iter().any(|c| c.handle() == "b" && matches!(c, folio_motion_core::Change::Width { width, .. } if width == "70%")),
        "first write was superseded"
    );
    let out = eng.tick(80.0);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, CoreEvent::BarSettled { width, .. } if width == "70%")));
    assert_eq!(eng.bar_width("b"), Some("70%"));
    assert!(!eng.wants_frame());
}

#[test]
fn reveal_is_idempotent_under_repeated_reports() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_section("s").expect("observe");
    eng.drain_outputs();
    eng.report(MonitorKind::Reveal, "s", 0.5, 0.0).expect("report");
    eng.report(MonitorKind::Reveal, "s", 0.6, 1.0).expect("report");
    eng.report(MonitorKind::Reveal, "s", 0.9, 2.0).expect("report");
    let out = eng.drain_outputs();
    assert_eq!(out.changes.len(), 1);
    assert!(eng.is_revealed("s"));

    eng.report(MonitorKind::Reveal, "s", 0.1, 3.0).expect("report");
    assert!(!eng.is_revealed("s"));
    eng.report(MonitorKind::Reveal, "s", 0.15, 4.0).expect("report");
    assert!(eng.is_revealed("s"), "15% is enough to reveal");
}

#[test]
fn dispatch_and_reveal_thresholds_are_independent() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_counter("x", Some("5")).expect("counter");
    eng.observe_section("x").expect("section on the same node");
    eng.report(MonitorKind::Reveal, "x", 0.2, 0.0).expect("reveal");
    eng.report(MonitorKind::Dispatch, "x", 0.2, 0.0).expect("dispatch");
    assert!(eng.is_revealed("x"));
    assert!(!eng.counter_running("x"), "20% is below the counter threshold");
    assert_eq!(eng.element_id("x", Role::Section), Some(ElementId(1)));
}

#[test]
fn stop_disconnects_and_start_reattaches() {
    let mut page = Page::mount("stats-only");
    page.engine.stop();
    assert!(!page.engine.is_running());
    page.scroll_to(0.0);
    assert!(!page.engine.counter_running("stat-big"));
    assert!(!page.engine.wants_frame());

    page.engine.start();
    page.scroll_to(0.0);
    assert!(page.engine.counter_running("stat-big"));
}

#[test]
fn host_errors() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_section("s").expect("observe");
    assert!(matches!(
        eng.observe_section("s"),
        Err(MotionError::DuplicateHandle { .. })
    ));
    assert!(matches!(
        eng.report(MonitorKind::Reveal, "missing", 1.0, 0.0),
        Err(MotionError::UnknownHandle { .. })
    ));
    // sections are not watched by the dispatch monitor
    assert!(eng.report(MonitorKind::Dispatch, "s", 1.0, 0.0).is_err());

    let bad = Config {
        dispatch_threshold: -0.1,
        ..Config::default()
    };
    assert!(matches!(Engine::new(bad), Err(MotionError::Config(_))));
}

#[test]
fn recompute_skips_unplaced_elements() {
    let mut eng = Engine::new(Config::default()).expect("engine");
    eng.observe_section("placed").expect("observe");
    eng.observe_section("detached").expect("observe");
    eng.drain_outputs();
    let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
    eng.recompute(
        &viewport,
        |h| (h == "placed").then(|| Rect::new(0.0, 0.0, 10.0, 10.0)),
        0.0,
    );
    let out = eng.drain_outputs();
    assert_eq!(out.changes.len(), 1);
    assert_eq!(out.changes[0].handle(), "placed");
}

#[derive(Debug)]
struct Lakh;

/// South Asian grouping: last three digits, then pairs.
impl CountFormat for Lakh {
    fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        if digits.len() <= 3 {
            return digits;
        }
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    }
}

#[test]
fn counter_text_uses_the_host_formatter() {
    let mut eng = Engine::with_format(Config::default(), Lakh).expect("engine");
    eng.observe_counter("big", Some("1500000")).expect("observe");
    eng.observe_counter("small", Some("1500")).expect("observe");
    eng.report(MonitorKind::Dispatch, "big", 1.0, 0.0).expect("report");
    eng.report(MonitorKind::Dispatch, "small", 1.0, 0.0).expect("report");
    let out = eng.tick(1200.0);
    assert_eq!(out.last_text("big"), Some("15,00,000"));
    assert_eq!(out.last_text("small"), Some("1,500"));
}

#[test]
fn invalid_config_is_rejected_with_a_custom_formatter() {
    let bad = Config {
        reveal_threshold: 1.5,
        ..Config::default()
    };
    assert!(matches!(
        Engine::with_format(bad, Lakh),
        Err(MotionError::Config(_))
    ));
}
