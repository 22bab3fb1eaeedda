use super::*;

#[test]
fn slide_aspect_heights() {
    assert_eq!(SlideAspect::Square.height(), 1080.0);
    assert_eq!(SlideAspect::Portrait.height(), 1350.0);
    assert_eq!(SlideAspect::from_height(1350.0), Some(SlideAspect::Portrait));
    assert_eq!(SlideAspect::from_height(1200.0), None);
}

#[test]
fn slide_grid_rejects_zero_slides() {
    assert!(SlideGrid::new(0, SlideAspect::Square).is_err());
    let g = SlideGrid::new(4, SlideAspect::Portrait).unwrap();
    assert_eq!(g.total_width(), 4320.0);
    assert_eq!(g.slide_height(), 1350.0);
}

#[test]
fn slide_grid_bounds_and_lookup() {
    let g = SlideGrid::default();
    assert_eq!(g.count, 3);
    assert_eq!(g.slide_bounds(2), Rect::new(2160.0, 0.0, 3240.0, 1080.0));
    assert_eq!(g.slide_at(0.0), Some(0));
    assert_eq!(g.slide_at(1079.9), Some(0));
    assert_eq!(g.slide_at(1080.0), Some(1));
    assert_eq!(g.slide_at(3240.0), None);
    assert_eq!(g.slide_at(-1.0), None);
}

#[test]
fn generated_layer_ids_are_distinct() {
    let a = LayerId::generate();
    let b = LayerId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 32);
    assert_eq!(LayerId::from("x").to_string(), "x");
}

#[test]
fn slide_grid_json_goes_through_validation() {
    let g: SlideGrid = serde_json::from_str(r#"{"count":2}"#).unwrap();
    assert_eq!(g, SlideGrid::new(2, SlideAspect::Square).unwrap());
    let err = serde_json::from_str::<SlideGrid>(r#"{"count":0,"aspect":"portrait"}"#).unwrap_err();
    assert!(err.to_string().contains("slide"), "{err}");
}
