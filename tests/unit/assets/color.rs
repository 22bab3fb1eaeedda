use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Color::parse_hex("#e2e8f0").unwrap(), Color::PLACEHOLDER);
    assert_eq!(Color::parse_hex("3B82F6").unwrap(), Color::SHAPE_BLUE);
    assert_eq!(Color::parse_hex("#fff").unwrap(), Color::WHITE);
    assert_eq!(
        Color::parse_hex("#00000080").unwrap(),
        Color::rgba(0, 0, 0, 0x80)
    );
    assert!(Color::parse_hex("#12345").is_err());
    assert!(Color::parse_hex("#gg0000").is_err());
}

#[test]
fn hex_output_omits_opaque_alpha() {
    assert_eq!(Color::rgb(0x70, 0x42, 0x14).to_hex(), "#704214");
    assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
}

#[test]
fn serde_uses_hex_strings() {
    let json = serde_json::to_string(&Color::SHAPE_BLUE).unwrap();
    assert_eq!(json, "\"#3b82f6\"");
    let back: Color = serde_json::from_str("\"#5c4033\"").unwrap();
    assert_eq!(back, Color::rgb(0x5c, 0x40, 0x33));
    assert!(serde_json::from_str::<Color>("\"red\"").is_err());
}

#[test]
fn guide_contrast_follows_background_brightness() {
    assert_eq!(Color::WHITE.guide_contrast(), Color::rgba(0, 0, 0, 77));
    assert_eq!(Color::BLACK.guide_contrast(), Color::rgba(255, 255, 255, 77));
    assert_eq!(Color::rgb(128, 128, 128).guide_contrast().r, 0);
}

#[test]
fn opacity_scales_alpha() {
    assert_eq!(Color::rgb(0x70, 0x42, 0x14).with_opacity(0.2).a, 51);
    assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
}
