use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CarouselError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CarouselError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(CarouselError::render("x").to_string().contains("render error:"));
    assert!(CarouselError::encode("x").to_string().contains("encode error:"));
    assert!(
        CarouselError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CarouselError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
