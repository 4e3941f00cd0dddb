use std::io::Cursor;

use super::*;
use crate::{
    assets::{convention::ConventionTable, fetch::MemoryFetcher},
    render::canvas::CpuCanvas,
};

const DT: f64 = 1.0 / 60.0;

fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Frame `i` is a solid image whose red channel is `i`.
fn seed(fetcher: &MemoryFetcher, class: ViewportClass, ext: &str, count: u32) {
    let table = ConventionTable::default();
    for i in 0..count {
        fetcher.insert(
            table.frame_path_with_ext(class, FrameIndex(i), ext),
            png_bytes([i as u8, 40, 80, 255]),
        );
    }
}

fn viewport(width: f64) -> Viewport {
    Viewport::new(width, 8.0, 1.0).unwrap()
}

fn wide_fetcher() -> Arc<MemoryFetcher> {
    let fetcher = Arc::new(MemoryFetcher::new());
    seed(&fetcher, ViewportClass::Wide, "jpg", 240);
    fetcher
}

fn mount(host: &Host, fetcher: &Arc<MemoryFetcher>) -> ScrollReel {
    ScrollReel::mount(
        host,
        ReelConfig::default(),
        Arc::clone(fetcher) as Arc<dyn FrameFetcher>,
        Dispatch::Inline,
        Some(Box::new(CpuCanvas::new())),
    )
    .unwrap()
}

fn red_at_center(reel: &ScrollReel) -> u8 {
    let snap = reel.snapshot().unwrap();
    snap.pixel(snap.width / 2, snap.height / 2).unwrap()[0]
}

#[test]
fn mount_requests_the_wide_sequence() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let reel = mount(&host, &fetcher);

    assert_eq!(
        fetcher.requests(),
        ConventionTable::default().request_paths(ViewportClass::Wide, 240)
    );
    let state = reel.state();
    assert_eq!(state.class, ViewportClass::Wide);
    assert_eq!(state.frame_index, 0);
    assert_eq!(state.canvas_opacity, 1.0);
    assert_eq!(state.load, LoadProgress { loaded: 0, total: 240 });
    assert!(state.loading_bar);
}

#[test]
fn first_tick_paints_frame_zero() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);

    let report = reel.tick(DT).unwrap();
    assert_eq!(report.load_events.len(), 240);
    assert!(matches!(
        report.paint,
        Some(PaintOutcome::Painted {
            index: FrameIndex(0),
            ..
        })
    ));
    assert!(red_at_center(&reel) <= 2);

    let state = reel.state();
    assert!(state.load.is_complete());
    assert!(!state.loading_bar);
}

#[test]
fn scrolling_to_the_end_lands_on_the_last_frame() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);
    reel.tick(DT).unwrap();

    host.scroll_to(1.0);
    let ticks = reel.settle(DT, 2_000).unwrap();
    assert!(ticks < 2_000);

    let state = reel.state();
    assert_eq!(state.raw_frame, 239.0);
    assert_eq!(state.frame_index, 239);
    assert_eq!(state.frame_position, 239.0);
    assert_eq!(state.canvas_opacity, 0.0);
    assert_eq!(reel.last_painted(), Some(FrameIndex(239)));
    assert!(red_at_center(&reel) >= 237);

    // Fully faded canvas shows only the page background.
    let page = reel.composite().unwrap();
    assert_eq!(page.pixel(1, 1), Some([5, 5, 5, 255]));
}

#[test]
fn frame_position_lags_the_scroll() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);
    reel.tick(DT).unwrap();

    host.scroll_to(0.5);
    let mut last = 0.0;
    for _ in 0..30 {
        let report = reel.tick(DT).unwrap();
        assert!(report.frame_position >= last);
        last = report.frame_position;
    }
    let state = reel.state();
    assert!(state.frame_position > 0.0);
    assert!(state.frame_position < state.raw_frame);
}

#[test]
fn narrowing_below_the_breakpoint_reloads_compact() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);
    reel.tick(DT).unwrap();
    let before = red_at_center(&reel);
    fetcher.clear_requests();

    // No compact frames are available: every slot fails twice.
    host.resize_to(viewport(600.0));
    let report = reel.tick(DT).unwrap();
    assert_eq!(report.class_changed, Some(ViewportClass::Compact));
    assert!(matches!(report.paint, Some(PaintOutcome::Skipped { .. })));

    let state = reel.state();
    assert_eq!(state.class, ViewportClass::Compact);
    assert_eq!(state.load, LoadProgress { loaded: 0, total: 240 });
    assert!(state.loading_bar);

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 480);
    assert_eq!(requests[0], "/frames-mobile/frame-001.png");
    assert_eq!(fetcher.request_count("/frames-mobile/frame-001.jpg"), 1);

    // The last wide frame stays on screen.
    assert_eq!(red_at_center(&reel), before);
}

#[test]
fn resize_within_a_class_only_repaints() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);
    reel.tick(DT).unwrap();
    let generation = reel.loader().generation();
    fetcher.clear_requests();

    host.resize_to(viewport(1280.0));
    let report = reel.tick(DT).unwrap();
    assert_eq!(report.class_changed, None);
    assert!(matches!(report.paint, Some(PaintOutcome::Painted { .. })));
    assert!(fetcher.requests().is_empty());
    assert_eq!(reel.loader().generation(), generation);
    assert_eq!(reel.snapshot().unwrap().width, 1280);
    assert_eq!(reel.canvas_stats().unwrap().resizes, 2);
}

#[test]
fn missing_canvas_still_tracks_scroll_and_loads() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = ScrollReel::mount(
        &host,
        ReelConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
        Dispatch::Inline,
        None,
    )
    .unwrap();

    host.scroll_to(1.0);
    let report = reel.tick(DT).unwrap();
    assert_eq!(report.paint, None);
    assert!(reel.snapshot().is_none());
    assert!(reel.composite().is_none());
    assert!(reel.state().load.is_complete());
    assert_eq!(reel.state().raw_frame, 239.0);
}

#[test]
fn invalid_config_is_rejected_before_subscribing() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let config = ReelConfig {
        frame_count: 0,
        ..ReelConfig::default()
    };
    let err = ScrollReel::mount(
        &host,
        config,
        Arc::clone(&fetcher) as Arc<dyn FrameFetcher>,
        Dispatch::Inline,
        None,
    );
    assert!(err.is_err());
    assert_eq!(host.scroll.listener_count(), 0);
    assert!(fetcher.requests().is_empty());
}

#[test]
fn dropping_the_reel_unsubscribes() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let reel = mount(&host, &fetcher);
    assert_eq!(host.scroll.listener_count(), 1);
    assert_eq!(host.resize.listener_count(), 1);

    drop(reel);
    assert_eq!(host.scroll.listener_count(), 0);
    assert_eq!(host.resize.listener_count(), 0);
    host.scroll_to(0.5);
}

#[test]
fn state_serializes_to_json() {
    let host = Host::new(viewport(1024.0));
    let fetcher = wide_fetcher();
    let mut reel = mount(&host, &fetcher);
    reel.tick(DT).unwrap();

    let json = serde_json::to_value(reel.state()).unwrap();
    assert_eq!(json["class"], "wide");
    assert_eq!(json["load"]["loaded"], 240);
    assert_eq!(json["overlays"][0]["id"], "hero");
}
