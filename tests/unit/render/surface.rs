use super::*;

#[test]
fn default_opts_match_export_contract() {
    let opts = SnapshotOpts::default();
    assert_eq!(opts.pixel_ratio, 2.0);
    assert_eq!(opts.encoding, ImageEncoding::Jpeg);
    assert_eq!(opts.quality, 0.9);
    opts.validate().unwrap();
}

#[test]
fn encoding_extensions() {
    assert_eq!(ImageEncoding::Jpeg.extension(), "jpg");
    assert_eq!(ImageEncoding::Png.extension(), "png");
    assert_eq!(ImageEncoding::Png.mime_type(), "image/png");
}

#[test]
fn output_size_scales_by_pixel_ratio() {
    let opts = SnapshotOpts::default();
    let size = opts
        .output_size(Rect::new(1080.0, 0.0, 2160.0, 1350.0))
        .unwrap();
    assert_eq!(size, (2160, 2700));
}

#[test]
fn invalid_opts_are_rejected() {
    let bad_ratio = SnapshotOpts::default().with_pixel_ratio(0.0);
    assert!(bad_ratio.validate().is_err());

    let bad_quality = SnapshotOpts {
        quality: 1.5,
        ..SnapshotOpts::default()
    };
    assert!(bad_quality.validate().is_err());

    let opts = SnapshotOpts::default();
    assert!(opts.output_size(Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
    assert!(
        opts.output_size(Rect::new(0.0, 0.0, 40_000.0, 10.0))
            .is_err()
    );
}
