use super::*;
use crate::foundation::core::Size;
use crate::scene::layer::LayerPatch;

fn px(buf: &(u32, u32, Vec<u8>), x: u32, y: u32) -> [u8; 4] {
    let (w, _, data) = buf;
    let i = ((y * w + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

fn assert_near(got: [u8; 4], want: [u8; 4]) {
    for c in 0..4 {
        assert!(
            got[c].abs_diff(want[c]) <= 2,
            "channel {c}: got {got:?}, want {want:?}"
        );
    }
}

fn surface_for(state: &CanvasState, images: &ImageStore) -> CpuSurface {
    let mut surface = CpuSurface::new(CpuSurfaceOpts::default()).unwrap();
    surface.attach(state, images);
    surface.set_view(ViewTransform::IDENTITY);
    surface
}

fn green_store() -> ImageStore {
    let mut images = ImageStore::new();
    let rgba = [0u8, 255, 0, 255].repeat(8);
    images.insert("green", DecodedImage::from_rgba8(4, 2, rgba).unwrap());
    images
}

#[test]
fn not_ready_until_attached() {
    let mut surface = CpuSurface::new(CpuSurfaceOpts::default()).unwrap();
    assert!(!surface.is_ready());
    let err = surface
        .snapshot(Rect::new(0.0, 0.0, 10.0, 10.0), &SnapshotOpts::default())
        .unwrap_err();
    assert!(err.to_string().contains("no canvas attached"));

    surface.attach(&CanvasState::new(), &ImageStore::new());
    assert!(surface.is_ready());
    surface.detach();
    assert!(!surface.is_ready());
}

#[test]
fn attach_adopts_canvas_view() {
    let state = CanvasState::new();
    let mut surface = CpuSurface::new(CpuSurfaceOpts::default()).unwrap();
    surface.attach(&state, &ImageStore::new());
    assert_eq!(surface.view(), state.view());
}

#[test]
fn node_visibility_round_trips() {
    let mut surface = CpuSurface::new(CpuSurfaceOpts::default()).unwrap();
    assert!(surface.node_visible(TRANSFORMER_NODE));
    surface.set_node_visible(TRANSFORMER_NODE, false);
    assert!(!surface.node_visible(TRANSFORMER_NODE));
    assert!(surface.node_visible("other"));
    surface.set_node_visible(TRANSFORMER_NODE, true);
    assert!(surface.node_visible(TRANSFORMER_NODE));
}

#[test]
fn background_fills_slide_strip() {
    let mut state = CanvasState::new();
    state.set_background(Color::rgb(255, 0, 0));
    let mut surface = surface_for(&state, &ImageStore::new());

    let inside = surface
        .render_premul(Rect::new(2000.0, 500.0, 2010.0, 510.0), 1.0)
        .unwrap();
    assert_near(px(&inside, 5, 5), [255, 0, 0, 255]);

    // Below the 1080-tall strip nothing is drawn.
    let outside = surface
        .render_premul(Rect::new(0.0, 1100.0, 10.0, 1110.0), 1.0)
        .unwrap();
    assert_eq!(px(&outside, 5, 5), [0, 0, 0, 0]);
}

#[test]
fn view_transform_moves_content() {
    let mut state = CanvasState::new();
    state.set_background(Color::rgb(255, 0, 0));
    let mut surface = surface_for(&state, &ImageStore::new());
    surface.set_view(ViewTransform::new(Vec2::new(-100.0, 0.0), 1.0).unwrap());
    // Screen x in [-50, -40) is canvas x in [50, 60).
    let buf = surface
        .render_premul(Rect::new(-50.0, 0.0, -40.0, 10.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 5, 5), [255, 0, 0, 255]);
}

#[test]
fn shapes_and_selection_outline() {
    let mut state = CanvasState::new();
    let id = state.add_shape(ShapeKind::Rect);
    state.set_selection([id]);
    let mut surface = surface_for(&state, &ImageStore::new());
    let region = Rect::new(140.0, 140.0, 260.0, 260.0);

    let with_outline = surface.render_premul(region, 2.0).unwrap();
    assert_near(px(&with_outline, 60, 60), [0x3b, 0x82, 0xf6, 255]);
    assert_near(px(&with_outline, 20, 120), [0, 161, 255, 255]);

    surface.set_node_visible(TRANSFORMER_NODE, false);
    let hidden = surface.render_premul(region, 2.0).unwrap();
    assert_near(px(&hidden, 20, 120), [0x3b, 0x82, 0xf6, 255]);
}

#[test]
fn circle_is_centered_on_position() {
    let mut state = CanvasState::new();
    state.add_shape(ShapeKind::Circle);
    let mut surface = surface_for(&state, &ImageStore::new());
    let buf = surface
        .render_premul(Rect::new(100.0, 100.0, 200.0, 200.0), 1.0)
        .unwrap();
    // Center at (150, 150), radius 50.
    assert_near(px(&buf, 50, 50), [0x3b, 0x82, 0xf6, 255]);
    assert_near(px(&buf, 1, 1), [255, 255, 255, 255]);
}

#[test]
fn image_frame_draws_cropped_picture() {
    let mut state = CanvasState::new();
    let id = state.upload_image(Size::new(40.0, 40.0), "green").unwrap();
    state
        .update_layer(&id, &LayerPatch::position(0.0, 0.0))
        .unwrap();
    let mut surface = surface_for(&state, &green_store());
    let buf = surface
        .render_premul(Rect::new(0.0, 0.0, 40.0, 40.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 20, 20), [0, 255, 0, 255]);
}

#[test]
fn undecoded_image_shows_placeholder() {
    let mut state = CanvasState::new();
    let id = state.upload_image(Size::new(40.0, 40.0), "not-loaded").unwrap();
    state
        .update_layer(&id, &LayerPatch::position(0.0, 0.0))
        .unwrap();
    let mut surface = surface_for(&state, &ImageStore::new());
    let buf = surface
        .render_premul(Rect::new(0.0, 0.0, 40.0, 40.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 20, 20), [0xe2, 0xe8, 0xf0, 255]);
}

#[test]
fn polaroid_card_surrounds_picture() {
    let mut state = CanvasState::new();
    let id = state.upload_image(Size::new(200.0, 200.0), "green").unwrap();
    let patch = LayerPatch {
        x: Some(0.0),
        y: Some(0.0),
        variant: Some(FrameVariant::Polaroid),
        ..LayerPatch::default()
    };
    state.update_layer(&id, &patch).unwrap();
    let mut surface = surface_for(&state, &green_store());
    let buf = surface
        .render_premul(Rect::new(0.0, 0.0, 200.0, 200.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 5, 5), [255, 255, 255, 255]);
    assert_near(px(&buf, 100, 100), [0, 255, 0, 255]);
    // Bottom margin is three times the padding.
    assert_near(px(&buf, 100, 170), [255, 255, 255, 255]);
}

#[test]
fn vintage_frame_tints_picture_and_draws_border() {
    let mut state = CanvasState::new();
    let id = state.upload_image(Size::new(100.0, 100.0), "green").unwrap();
    let patch = LayerPatch {
        x: Some(0.0),
        y: Some(0.0),
        variant: Some(FrameVariant::Vintage),
        ..LayerPatch::default()
    };
    state.update_layer(&id, &patch).unwrap();
    let mut surface = surface_for(&state, &green_store());
    let buf = surface
        .render_premul(Rect::new(0.0, 0.0, 100.0, 100.0), 1.0)
        .unwrap();
    let center = px(&buf, 50, 50);
    assert!(center[1] < 250 && center[0] > 0, "got {center:?}");
    assert_near(px(&buf, 0, 50), [0x5c, 0x40, 0x33, 255]);
}

#[test]
fn text_without_font_is_skipped() {
    let mut state = CanvasState::new();
    state.add_text();
    let mut surface = surface_for(&state, &ImageStore::new());
    let buf = surface
        .render_premul(Rect::new(100.0, 100.0, 140.0, 140.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 20, 20), [255, 255, 255, 255]);
}

#[test]
fn snapshot_encodes_requested_format() {
    let state = CanvasState::new();
    let mut surface = surface_for(&state, &ImageStore::new());
    let region = Rect::new(0.0, 0.0, 30.0, 20.0);

    let jpeg = surface.snapshot(region, &SnapshotOpts::default()).unwrap();
    assert_eq!(jpeg.encoding, ImageEncoding::Jpeg);
    assert_eq!((jpeg.width, jpeg.height), (60, 40));
    assert_eq!(&jpeg.bytes[..2], &[0xff, 0xd8]);

    let png_opts = SnapshotOpts::default().with_encoding(ImageEncoding::Png);
    let png = surface.snapshot(region, &png_opts).unwrap();
    let decoded = image::load_from_memory(&png.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (60, 40));
    assert_eq!(decoded.get_pixel(30, 20).0, [255, 255, 255, 255]);
}

#[test]
fn clear_color_fills_outside_the_strip() {
    let state = CanvasState::new();
    let opts = CpuSurfaceOpts::default().with_clear_rgba(Some([0, 0, 255, 255]));
    let mut surface = CpuSurface::new(opts).unwrap();
    surface.attach(&state, &ImageStore::new());
    surface.set_view(ViewTransform::IDENTITY);
    let buf = surface
        .render_premul(Rect::new(-20.0, -20.0, -10.0, -10.0), 1.0)
        .unwrap();
    assert_near(px(&buf, 5, 5), [0, 0, 255, 255]);
}

#[test]
fn bad_font_bytes_are_rejected() {
    let opts = CpuSurfaceOpts::default().with_font_bytes(Some(b"nope".to_vec()));
    assert!(CpuSurface::new(opts).is_err());
}
