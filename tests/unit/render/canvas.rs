use super::*;
use crate::render::fit::FitMode;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PreparedFrame {
    let data: Vec<u8> = std::iter::repeat_n(rgba, (width * height) as usize)
        .flatten()
        .collect();
    PreparedFrame {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

fn size(width: u32, height: u32) -> BackingSize {
    BackingSize { width, height }
}

#[test]
fn new_canvas_is_empty() {
    let canvas = CpuCanvas::new();
    assert_eq!(canvas.backing_size(), BackingSize::default());
    assert_eq!(canvas.stats(), CanvasStats::default());
    assert!(canvas.snapshot().data.is_empty());
}

#[test]
fn resize_allocates_transparent_store() {
    let mut canvas = CpuCanvas::new();
    canvas.resize(size(8, 4)).unwrap();
    let snap = canvas.snapshot();
    assert_eq!((snap.width, snap.height), (8, 4));
    assert_eq!(snap.data.len(), 8 * 4 * 4);
    assert!(snap.data.iter().all(|&b| b == 0));
    assert_eq!(canvas.stats().resizes, 1);
}

#[test]
fn resize_rejects_oversized_store() {
    let mut canvas = CpuCanvas::new();
    assert!(matches!(
        canvas.resize(size(70_000, 10)),
        Err(FilmrollError::Render(_))
    ));
}

#[test]
fn cover_draw_fills_canvas() {
    let mut canvas = CpuCanvas::new();
    canvas.resize(size(16, 8)).unwrap();
    let frame = solid(4, 4, [255, 0, 0, 255]);
    let placement = FitMode::Cover.place(canvas.backing_size(), frame.width, frame.height);
    canvas.draw_frame(&frame, placement.transform()).unwrap();

    let snap = canvas.snapshot();
    for (x, y) in [(1, 1), (8, 4), (14, 6)] {
        let px = snap.pixel(x, y).unwrap();
        assert!(px[0] > 200 && px[3] == 255, "({x},{y}) -> {px:?}");
    }
    assert_eq!(canvas.stats().draws, 1);
}

#[test]
fn width_constrained_draw_leaves_gutter() {
    let mut canvas = CpuCanvas::new();
    canvas.resize(size(20, 20)).unwrap();
    let frame = solid(10, 10, [0, 0, 255, 255]);
    let placement = FitMode::WidthConstrained { margin: 0.5 }.place(
        canvas.backing_size(),
        frame.width,
        frame.height,
    );
    canvas.draw_frame(&frame, placement.transform()).unwrap();

    let snap = canvas.snapshot();
    assert_eq!(snap.pixel(1, 1).unwrap()[3], 0);
    assert_eq!(snap.pixel(18, 10).unwrap()[3], 0);
    let center = snap.pixel(10, 10).unwrap();
    assert!(center[2] > 200 && center[3] == 255, "{center:?}");
}

#[test]
fn clear_resets_pixels() {
    let mut canvas = CpuCanvas::new();
    canvas.resize(size(4, 4)).unwrap();
    let frame = solid(4, 4, [10, 20, 30, 255]);
    canvas.draw_frame(&frame, Affine::IDENTITY).unwrap();
    canvas.clear();
    assert!(canvas.snapshot().data.iter().all(|&b| b == 0));
    assert_eq!(canvas.stats().clears, 1);
}

#[test]
fn zero_size_canvas_ignores_draws() {
    let mut canvas = CpuCanvas::new();
    canvas.resize(size(0, 10)).unwrap();
    let frame = solid(2, 2, [1, 2, 3, 255]);
    canvas.draw_frame(&frame, Affine::IDENTITY).unwrap();
    canvas.clear();
    assert_eq!(canvas.stats().draws, 0);
    assert!(canvas.snapshot().data.is_empty());
}

#[test]
fn flatten_over_applies_opacity_and_background() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 255, 255, 255, 0, 0, 0, 0],
        premultiplied: true,
    };
    let full = frame.flatten_over([5, 5, 5, 255], 1.0);
    assert_eq!(full.data, vec![255, 255, 255, 255, 5, 5, 5, 255]);
    assert!(!full.premultiplied);

    let faded = frame.flatten_over([5, 5, 5, 255], 0.0);
    assert_eq!(faded.data, vec![5, 5, 5, 255, 5, 5, 5, 255]);
}

#[test]
fn unavailable_context_is_a_render_error() {
    assert!(create_canvas(CanvasKind::Cpu).is_ok());
    assert!(matches!(
        create_canvas(CanvasKind::Unavailable),
        Err(FilmrollError::Render(_))
    ));
}
