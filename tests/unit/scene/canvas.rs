use super::*;
use crate::scene::layer::{FrameVariant, ImageLayer};

fn image_of(layer: &Layer) -> &ImageLayer {
    match &layer.kind {
        LayerKind::Image(img) => img,
        other => panic!("expected image layer, got {other:?}"),
    }
}

#[test]
fn fresh_state_matches_editor_defaults() {
    let s = CanvasState::new();
    assert_eq!(s.slides().count, 3);
    assert_eq!(s.slides().slide_height(), 1080.0);
    assert_eq!(s.background(), Color::WHITE);
    assert_eq!(s.view().zoom, 0.5);
    assert_eq!(s.view().pan, Vec2::new(100.0, 100.0));
    assert!(s.layers().is_empty());
    assert!(s.selection().is_empty());
}

#[test]
fn slide_settings_validate() {
    let mut s = CanvasState::new();
    assert!(s.set_slide_count(0).is_err());
    assert_eq!(s.slides().count, 3);
    s.set_slide_count(5).unwrap();
    s.set_aspect(SlideAspect::Portrait);
    assert_eq!(s.slides().count, 5);
    assert_eq!(s.slides().slide_height(), 1350.0);
}

#[test]
fn view_setters_reject_out_of_range_zoom() {
    let mut s = CanvasState::new();
    assert!(s.set_zoom(0.05).is_err());
    assert!(s.set_zoom(6.0).is_err());
    assert_eq!(s.view(), INITIAL_VIEW);
    s.set_zoom(2.0).unwrap();
    s.set_pan(Vec2::new(-10.0, 3.0)).unwrap();
    assert_eq!(s.view().zoom, 2.0);
    assert_eq!(s.view().pan, Vec2::new(-10.0, 3.0));
    assert!(s.set_pan(Vec2::new(f64::NAN, 0.0)).is_err());
}

#[test]
fn wheel_zoom_stops_at_bounds() {
    let mut s = CanvasState::new();
    s.set_zoom(5.0).unwrap();
    let before = s.view();
    assert!(!s.wheel_zoom(Point::new(10.0, 10.0), -1.0));
    assert_eq!(s.view(), before);
    assert!(s.wheel_zoom(Point::new(10.0, 10.0), 1.0));
    assert!(s.view().zoom < 5.0);
}

#[test]
fn removing_selected_layer_prunes_only_that_id() {
    let mut s = CanvasState::new();
    let a = s.add_text();
    let b = s.add_shape(ShapeKind::Rect);
    let c = s.add_shape(ShapeKind::Circle);
    s.set_selection([a.clone(), b.clone(), c.clone()]);

    let removed = s.remove_layer(&b).unwrap();
    assert_eq!(removed.id, b);
    assert_eq!(s.selection(), [a, c]);
    assert_eq!(s.layers().len(), 2);
}

#[test]
fn removing_unknown_layer_is_a_no_op() {
    let mut s = CanvasState::new();
    let a = s.add_text();
    s.set_selection([a.clone()]);
    assert!(s.remove_layer(&LayerId::from("ghost")).is_none());
    assert_eq!(s.selection(), [a]);
    assert_eq!(s.layers().len(), 1);
}

#[test]
fn selection_skips_unknown_and_repeated_ids() {
    let mut s = CanvasState::new();
    let a = s.add_text();
    s.set_selection([a.clone(), LayerId::from("ghost"), a.clone()]);
    assert_eq!(s.selection(), [a.clone()]);
    assert!(s.is_selected(&a));
    s.clear_selection();
    assert!(!s.is_selected(&a));
}

#[test]
fn toolbar_defaults() {
    let mut s = CanvasState::new();
    let t = s.add_text();
    let layer = s.layer(&t).unwrap();
    assert_eq!((layer.x, layer.y), (100.0, 100.0));
    let LayerKind::Text(text) = &layer.kind else {
        panic!("expected text");
    };
    assert_eq!(text.text, DEFAULT_TEXT);
    assert_eq!(text.width, Some(200.0));
    assert_eq!(text.font_size, 24.0);

    let r = s.add_shape(ShapeKind::Rect);
    let layer = s.layer(&r).unwrap();
    assert_eq!((layer.x, layer.y), (150.0, 150.0));
    assert_eq!(layer.size(), Some(Size::new(100.0, 100.0)));
    assert_eq!(s.layers().ids(), [t, r]);
}

#[test]
fn dropped_image_is_fitted_and_centered_on_pointer() {
    let mut s = CanvasState::new();
    // Screen (600, 350) at pan (100, 100) and zoom 0.5 is canvas (1000, 500).
    let id = s
        .place_dropped_image(Point::new(600.0, 350.0), Size::new(2000.0, 1000.0), "big.png")
        .unwrap();
    let layer = s.layer(&id).unwrap();
    let img = image_of(layer);
    assert_eq!((img.width, img.height), (500.0, 250.0));
    assert_eq!((layer.x, layer.y), (750.0, 375.0));
    assert_eq!(img.source.as_deref(), Some("big.png"));
}

#[test]
fn uploaded_image_lands_at_toolbar_origin() {
    let mut s = CanvasState::new();
    let id = s.upload_image(Size::new(300.0, 200.0), "small.png").unwrap();
    let layer = s.layer(&id).unwrap();
    assert_eq!((layer.x, layer.y), (100.0, 100.0));
    assert_eq!(image_of(layer).width, 300.0);

    assert!(s.upload_image(Size::new(0.0, 200.0), "bad.png").is_err());
    assert_eq!(s.layers().len(), 1);
}

#[test]
fn template_uses_current_slide_size() {
    let mut s = CanvasState::new();
    let ids = s.apply_template("grid-2x2", 1);
    assert_eq!(ids.len(), 4);
    assert_eq!(s.layers().ids(), ids);
    assert_eq!(s.layer(&ids[0]).unwrap().x, 1130.0);

    assert!(s.apply_template("missing", 0).is_empty());
    assert_eq!(s.layers().len(), 4);
}

#[test]
fn commit_transform_bakes_image_scale() {
    let mut s = CanvasState::new();
    let id = s.upload_image(Size::new(200.0, 100.0), "a.png").unwrap();
    let patch = LayerPatch {
        x: Some(40.0),
        scale_x: Some(2.0),
        scale_y: Some(0.01),
        ..LayerPatch::default()
    };
    assert!(s.commit_transform(&id, &patch).unwrap());
    let layer = s.layer(&id).unwrap();
    assert_eq!(layer.x, 40.0);
    assert_eq!((layer.scale_x, layer.scale_y), (1.0, 1.0));
    let img = image_of(layer);
    assert_eq!((img.width, img.height), (400.0, 5.0));

    assert!(!s.commit_transform(&LayerId::from("ghost"), &patch).unwrap());
}

#[test]
fn crop_wheel_clamps_zoom() {
    let mut s = CanvasState::new();
    let id = s.upload_image(Size::new(200.0, 100.0), "a.png").unwrap();
    assert!(s.crop_wheel(&id, -1.0).unwrap());
    assert!((image_of(s.layer(&id).unwrap()).crop.zoom - 1.05).abs() < 1e-12);

    for _ in 0..10 {
        s.crop_wheel(&id, 1.0).unwrap();
    }
    assert_eq!(image_of(s.layer(&id).unwrap()).crop.zoom, 1.0);

    let shape = s.add_shape(ShapeKind::Rect);
    assert!(s.crop_wheel(&shape, -1.0).is_err());
}

#[test]
fn panoramic_layer_belongs_to_two_slides() {
    let mut s = CanvasState::new();
    s.apply_template("panoramic-bridge", 0);
    assert_eq!(s.layers_on_slide(0).len(), 1);
    assert_eq!(s.layers_on_slide(1).len(), 1);
    assert!(s.layers_on_slide(2).is_empty());
    assert_eq!(
        image_of(s.layers_on_slide(1)[0]).variant,
        FrameVariant::Default
    );
}

fn saved_with_two_shapes() -> serde_json::Value {
    let mut s = CanvasState::new();
    let a = s.add_shape(ShapeKind::Rect);
    let b = s.add_shape(ShapeKind::Circle);
    s.set_selection([a, b]);
    serde_json::to_value(&s).unwrap()
}

#[test]
fn loading_prunes_selection_of_unknown_ids() {
    let mut json = saved_with_two_shapes();
    let kept = json["selection"][1].clone();
    json["selection"] = serde_json::json!(["ghost", kept]);

    let s: CanvasState = serde_json::from_value(json).unwrap();
    assert_eq!(s.layers().len(), 2);
    assert_eq!(s.selection().len(), 1);
    assert_eq!(serde_json::to_value(&s.selection()[0]).unwrap(), kept);
}

#[test]
fn loading_rejects_repeated_layer_ids() {
    let mut json = saved_with_two_shapes();
    let first = json["layers"][0]["id"].clone();
    json["layers"][1]["id"] = first;
    assert!(serde_json::from_value::<CanvasState>(json).is_err());
}

#[test]
fn loading_rejects_invalid_grid_and_view() {
    let mut zero_slides = saved_with_two_shapes();
    zero_slides["slides"]["count"] = serde_json::json!(0);
    assert!(serde_json::from_value::<CanvasState>(zero_slides).is_err());

    let mut wild_zoom = saved_with_two_shapes();
    wild_zoom["view"]["zoom"] = serde_json::json!(50.0);
    assert!(serde_json::from_value::<CanvasState>(wild_zoom).is_err());
}

#[test]
fn missing_selection_loads_empty() {
    let mut json = saved_with_two_shapes();
    json.as_object_mut().unwrap().remove("selection");
    let s: CanvasState = serde_json::from_value(json).unwrap();
    assert!(s.selection().is_empty());
    assert_eq!(s.layers().len(), 2);
}
