use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FilmrollError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FilmrollError::asset("x").to_string().contains("asset error:"));
    assert!(
        FilmrollError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        FilmrollError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FilmrollError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
